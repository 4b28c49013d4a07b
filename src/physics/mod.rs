//! Physics module - the narrow rigid-body capability surface the optimizer
//! consumes, plus the rapier2d implementation.
//!
//! The evolutionary core never talks to a physics engine directly. It is
//! written against [`RigidBodyWorld`], which exposes exactly what the
//! optimizer needs: static edge terrain, dynamic bodies, convex polygon
//! fixtures that can be destroyed and rebuilt, kinematic state access, the
//! engine's sleep classification, and a fixed-timestep advance. Any engine
//! implementing this trait substitutes transparently.

mod rapier;

pub use rapier::RapierWorld;

/// A 2D point or vector in world/local coordinates.
pub type Vertex = (f32, f32);

/// The full kinematic state of a rigid body.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Kinematics {
    /// World position of the body origin.
    pub position: Vertex,
    /// Linear velocity.
    pub linear_velocity: Vertex,
    /// Angular velocity in rad/s.
    pub angular_velocity: f32,
    /// Rotation angle in radians.
    pub angle: f32,
}

impl Kinematics {
    /// True when every component is finite.
    pub fn is_finite(&self) -> bool {
        self.position.0.is_finite()
            && self.position.1.is_finite()
            && self.linear_velocity.0.is_finite()
            && self.linear_velocity.1.is_finite()
            && self.angular_velocity.is_finite()
            && self.angle.is_finite()
    }
}

/// Collision filtering classes. Wheels collide with terrain but never with
/// each other, so the whole population shares one world.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollisionClass {
    Terrain,
    Wheel,
}

/// Physics backend errors.
#[derive(Debug, thiserror::Error)]
pub enum PhysicsError {
    /// The engine rejected a polygon fixture (no valid convex hull).
    #[error("degenerate polygon: no convex shape from {0} vertices")]
    DegenerateShape(usize),
    /// A dynamic body reached a non-finite state; the simulation is no
    /// longer trustworthy and the run must abort.
    #[error("simulation diverged: non-finite state on a dynamic body")]
    NonFiniteState,
}

/// Capability surface of a 2D rigid-body engine.
///
/// Handle types are engine-specific; the core only stores and passes them
/// back. The world exclusively owns body and fixture memory.
pub trait RigidBodyWorld {
    type Body: Copy;
    type Fixture: Copy;

    /// Build an immovable body out of line segments (terrain).
    fn create_static_edges(&mut self, segments: &[(Vertex, Vertex)]) -> Self::Body;

    /// Create a dynamic body at the given kinematic state, with no fixture.
    fn create_dynamic_body(&mut self, kinematics: &Kinematics) -> Self::Body;

    /// Attach a convex polygon fixture to a body. Fails if the vertex set
    /// has no valid convex shape.
    fn create_fixture(
        &mut self,
        body: Self::Body,
        vertices: &[Vertex],
        density: f32,
        friction: f32,
        class: CollisionClass,
    ) -> Result<Self::Fixture, PhysicsError>;

    /// Detach and free a fixture. The owning body is untouched.
    fn destroy_fixture(&mut self, fixture: Self::Fixture);

    /// Read a body's kinematic state.
    fn kinematics(&self, body: Self::Body) -> Kinematics;

    /// Overwrite a body's kinematic state, waking it.
    fn set_kinematics(&mut self, body: Self::Body, kinematics: &Kinematics);

    /// Engine's "still actively simulated" classification.
    fn is_awake(&self, body: Self::Body) -> bool;

    /// Advance the simulation by one fixed timestep.
    fn step(&mut self) -> Result<(), PhysicsError>;
}
