//! rapier2d-backed implementation of the [`RigidBodyWorld`] capability
//! surface.

use rapier2d::prelude::*;

use super::{CollisionClass, Kinematics, PhysicsError, RigidBodyWorld, Vertex};

/// Interaction groups for `CollisionClass`. Wheels are members of GROUP_2
/// but only filter GROUP_1, so wheel/wheel pairs are rejected while
/// wheel/terrain pairs collide.
fn interaction_groups(class: CollisionClass) -> InteractionGroups {
    match class {
        CollisionClass::Terrain => InteractionGroups::new(Group::GROUP_1, Group::ALL),
        CollisionClass::Wheel => InteractionGroups::new(Group::GROUP_2, Group::GROUP_1),
    }
}

/// A self-contained rapier2d world advancing with a fixed timestep.
pub struct RapierWorld {
    pipeline: PhysicsPipeline,
    gravity: Vector<Real>,
    integration_parameters: IntegrationParameters,
    islands: IslandManager,
    broad_phase: DefaultBroadPhase,
    narrow_phase: NarrowPhase,
    bodies: RigidBodySet,
    colliders: ColliderSet,
    impulse_joints: ImpulseJointSet,
    multibody_joints: MultibodyJointSet,
    ccd_solver: CCDSolver,
}

impl RapierWorld {
    /// Create an empty world with the given gravity and timestep.
    pub fn new(gravity: Vertex, time_step: f32) -> Self {
        let mut integration_parameters = IntegrationParameters::default();
        integration_parameters.dt = time_step;

        Self {
            pipeline: PhysicsPipeline::new(),
            gravity: vector![gravity.0, gravity.1],
            integration_parameters,
            islands: IslandManager::new(),
            broad_phase: DefaultBroadPhase::new(),
            narrow_phase: NarrowPhase::new(),
            bodies: RigidBodySet::new(),
            colliders: ColliderSet::new(),
            impulse_joints: ImpulseJointSet::new(),
            multibody_joints: MultibodyJointSet::new(),
            ccd_solver: CCDSolver::new(),
        }
    }
}

impl RigidBodyWorld for RapierWorld {
    type Body = RigidBodyHandle;
    type Fixture = ColliderHandle;

    fn create_static_edges(&mut self, segments: &[(Vertex, Vertex)]) -> RigidBodyHandle {
        let body = self.bodies.insert(RigidBodyBuilder::fixed().build());
        for &((x0, y0), (x1, y1)) in segments {
            let collider = ColliderBuilder::segment(point![x0, y0], point![x1, y1])
                .collision_groups(interaction_groups(CollisionClass::Terrain))
                .build();
            self.colliders
                .insert_with_parent(collider, body, &mut self.bodies);
        }
        body
    }

    fn create_dynamic_body(&mut self, kinematics: &Kinematics) -> RigidBodyHandle {
        let body = RigidBodyBuilder::dynamic()
            .translation(vector![kinematics.position.0, kinematics.position.1])
            .linvel(vector![
                kinematics.linear_velocity.0,
                kinematics.linear_velocity.1
            ])
            .angvel(kinematics.angular_velocity)
            .rotation(kinematics.angle)
            .can_sleep(true)
            .build();
        self.bodies.insert(body)
    }

    fn create_fixture(
        &mut self,
        body: RigidBodyHandle,
        vertices: &[Vertex],
        density: f32,
        friction: f32,
        class: CollisionClass,
    ) -> Result<ColliderHandle, PhysicsError> {
        let points: Vec<Point<Real>> = vertices.iter().map(|&(x, y)| point![x, y]).collect();
        // The fixture is the convex hull of the vertex ring: slightly
        // concave mutations still yield a valid wheel, only sets with no
        // hull at all are rejected.
        let builder = ColliderBuilder::convex_hull(&points)
            .ok_or(PhysicsError::DegenerateShape(vertices.len()))?;
        let collider = builder
            .density(density)
            .friction(friction)
            .collision_groups(interaction_groups(class))
            .build();
        Ok(self
            .colliders
            .insert_with_parent(collider, body, &mut self.bodies))
    }

    fn destroy_fixture(&mut self, fixture: ColliderHandle) {
        self.colliders
            .remove(fixture, &mut self.islands, &mut self.bodies, true);
    }

    fn kinematics(&self, body: RigidBodyHandle) -> Kinematics {
        let body = &self.bodies[body];
        Kinematics {
            position: (body.translation().x, body.translation().y),
            linear_velocity: (body.linvel().x, body.linvel().y),
            angular_velocity: body.angvel(),
            angle: body.rotation().angle(),
        }
    }

    fn set_kinematics(&mut self, body: RigidBodyHandle, kinematics: &Kinematics) {
        let body = &mut self.bodies[body];
        body.set_position(
            Isometry::new(
                vector![kinematics.position.0, kinematics.position.1],
                kinematics.angle,
            ),
            true,
        );
        body.set_linvel(
            vector![
                kinematics.linear_velocity.0,
                kinematics.linear_velocity.1
            ],
            true,
        );
        body.set_angvel(kinematics.angular_velocity, true);
    }

    fn is_awake(&self, body: RigidBodyHandle) -> bool {
        !self.bodies[body].is_sleeping()
    }

    fn step(&mut self) -> Result<(), PhysicsError> {
        self.pipeline.step(
            &self.gravity,
            &self.integration_parameters,
            &mut self.islands,
            &mut self.broad_phase,
            &mut self.narrow_phase,
            &mut self.bodies,
            &mut self.colliders,
            &mut self.impulse_joints,
            &mut self.multibody_joints,
            &mut self.ccd_solver,
            None,
            &(),
            &(),
        );

        // A non-finite body means the solver blew up; nothing downstream of
        // this state can be trusted.
        for (handle, body) in self.bodies.iter() {
            if body.is_dynamic() && !self.kinematics(handle).is_finite() {
                return Err(PhysicsError::NonFiniteState);
            }
        }
        Ok(())
    }
}
