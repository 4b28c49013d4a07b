//! A population member: one genome bound to a live physics body.

use log::warn;

use crate::physics::{CollisionClass, Kinematics, PhysicsError, RigidBodyWorld};
use crate::schema::{Config, ResetNoiseConfig};

use super::genome::{GenomeRng, MutationParams, Vertices, WheelGenome};

/// Bounded redraw attempts when a mutated shape is rejected by the engine.
const MAX_MUTATION_RETRIES: u32 = 8;

/// One wheel of the population.
///
/// The member holds non-owning handles into the physics world. Its body is
/// created once and lives for the whole run; only the fixture is destroyed
/// and rebuilt when the genome changes. The kinematic state captured at
/// construction is the reset target for every episode.
pub struct PopulationMember<W: RigidBodyWorld> {
    genome: WheelGenome,
    body: W::Body,
    fixture: W::Fixture,
    initial: Kinematics,
    density: f32,
    friction: f32,
}

impl<W: RigidBodyWorld> PopulationMember<W> {
    /// Create a dynamic body at the configured initial pose/velocity and
    /// attach a fixture built from the diameter-scaled base genome.
    pub fn spawn(world: &mut W, config: &Config) -> Result<Self, PhysicsError> {
        let wheel = &config.env.wheel;
        let initial = Kinematics {
            position: (wheel.init_position.x, wheel.init_position.y),
            linear_velocity: (wheel.init_linear_velocity.x, wheel.init_linear_velocity.y),
            angular_velocity: wheel.init_angular_velocity,
            angle: wheel.init_angle.to_radians(),
        };

        let genome = WheelGenome::base(wheel.diam);
        let body = world.create_dynamic_body(&initial);
        let fixture = world.create_fixture(
            body,
            genome.vertices(),
            wheel.density,
            wheel.friction,
            CollisionClass::Wheel,
        )?;

        Ok(Self {
            genome,
            body,
            fixture,
            initial,
            density: wheel.density,
            friction: wheel.friction,
        })
    }

    pub fn genome(&self) -> &WheelGenome {
        &self.genome
    }

    pub fn body(&self) -> W::Body {
        self.body
    }

    pub fn initial(&self) -> &Kinematics {
        &self.initial
    }

    /// Restore the body to the recorded initial kinematic state. Exact and
    /// idempotent; the genome is untouched.
    pub fn reset(&self, world: &mut W) {
        world.set_kinematics(self.body, &self.initial);
    }

    /// Reset with Gaussian noise injected into the restored state.
    pub fn reset_with_noise(&self, world: &mut W, noise: &ResetNoiseConfig, rng: &mut GenomeRng) {
        let perturbed = Kinematics {
            position: (
                self.initial.position.0 + rng.gauss(noise.position.x),
                self.initial.position.1 + rng.gauss(noise.position.y),
            ),
            linear_velocity: (
                self.initial.linear_velocity.0 + rng.gauss(noise.linear_velocity.x),
                self.initial.linear_velocity.1 + rng.gauss(noise.linear_velocity.y),
            ),
            angular_velocity: self.initial.angular_velocity + rng.gauss(noise.angular_velocity),
            angle: self.initial.angle + rng.gauss(noise.angle).to_radians(),
        };
        world.set_kinematics(self.body, &perturbed);
    }

    /// Replace this member's genome with a mutated copy of `source` and
    /// rebuild the fixture. The body's pose and velocity are left as-is; a
    /// subsequent `reset` restarts the rollout cleanly.
    ///
    /// If the engine rejects a mutated shape as degenerate, the draw is
    /// retried a bounded number of times; when every retry fails the
    /// unmutated source vertices are kept, so the member always ends up with
    /// a live fixture.
    pub fn mutate(
        &mut self,
        world: &mut W,
        source: &Vertices,
        params: MutationParams,
        rng: &mut GenomeRng,
    ) -> Result<(), PhysicsError> {
        world.destroy_fixture(self.fixture);

        for attempt in 0..MAX_MUTATION_RETRIES {
            let vertices = rng.mutate_vertices(source, params);
            match self.attach(world, &vertices) {
                Ok(fixture) => {
                    self.fixture = fixture;
                    self.genome = WheelGenome::from_vertices(vertices);
                    return Ok(());
                }
                Err(err) => {
                    warn!(
                        "mutation produced a degenerate shape (attempt {}/{}): {}",
                        attempt + 1,
                        MAX_MUTATION_RETRIES,
                        err
                    );
                }
            }
        }

        // The source came from a member that had a valid fixture, so this
        // only fails if the world itself is broken.
        warn!("mutation retries exhausted; keeping parent vertices");
        self.fixture = self.attach(world, source)?;
        self.genome = WheelGenome::from_vertices(*source);
        Ok(())
    }

    fn attach(&self, world: &mut W, vertices: &Vertices) -> Result<W::Fixture, PhysicsError> {
        world.create_fixture(
            self.body,
            vertices,
            self.density,
            self.friction,
            CollisionClass::Wheel,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::mock::MockWorld;
    use crate::schema::Vec2Config;

    fn config() -> Config {
        let mut config = Config::default();
        config.env.wheel.init_position = Vec2Config { x: -18.0, y: 14.0 };
        config.env.wheel.init_linear_velocity = Vec2Config { x: 0.25, y: -0.5 };
        config.env.wheel.init_angular_velocity = 1.5;
        config.env.wheel.init_angle = 90.0;
        config
    }

    fn params(p: f32, rho: f32) -> MutationParams {
        MutationParams {
            p,
            rho,
            clip_radius: 0.5,
        }
    }

    #[test]
    fn spawn_records_initial_state_with_angle_in_radians() {
        let mut world = MockWorld::new();
        let member = PopulationMember::spawn(&mut world, &config()).unwrap();

        assert_eq!(member.initial().position, (-18.0, 14.0));
        assert_eq!(member.initial().linear_velocity, (0.25, -0.5));
        assert_eq!(member.initial().angular_velocity, 1.5);
        assert_eq!(member.initial().angle, 90.0f32.to_radians());
        assert_eq!(world.kinematics(member.body()), *member.initial());
    }

    #[test]
    fn reset_restores_state_bit_for_bit() {
        let mut world = MockWorld::new();
        let member = PopulationMember::spawn(&mut world, &config()).unwrap();

        let body = member.body();
        world.set_kinematics(
            body,
            &Kinematics {
                position: (3.12, -7.9),
                linear_velocity: (-2.0, 0.01),
                angular_velocity: -12.0,
                angle: 0.33,
            },
        );

        member.reset(&mut world);
        assert_eq!(world.kinematics(body), *member.initial());

        // Idempotent: a second reset changes nothing.
        member.reset(&mut world);
        assert_eq!(world.kinematics(body), *member.initial());
    }

    #[test]
    fn mutate_swaps_fixture_and_leaves_pose_alone() {
        let mut world = MockWorld::new();
        let mut member = PopulationMember::spawn(&mut world, &config()).unwrap();
        let body = member.body();

        world.set_position(body, (5.0, 5.0));
        let before = world.kinematics(body);

        let source = *member.genome().vertices();
        let mut rng = GenomeRng::new(1);
        member
            .mutate(&mut world, &source, params(1.0, 0.1), &mut rng)
            .unwrap();

        assert_eq!(world.live_fixture_count(body), 1);
        assert_eq!(world.live_vertices(body), member.genome().vertices());
        assert_eq!(world.kinematics(body), before);
    }

    #[test]
    fn mutate_retries_after_rejected_shapes() {
        let mut world = MockWorld::new();
        let mut member = PopulationMember::spawn(&mut world, &config()).unwrap();

        world.fail_fixtures = 2;
        let source = *member.genome().vertices();
        let mut rng = GenomeRng::new(1);
        member
            .mutate(&mut world, &source, params(1.0, 0.1), &mut rng)
            .unwrap();

        assert_eq!(world.live_fixture_count(member.body()), 1);
    }

    #[test]
    fn mutate_falls_back_to_source_when_retries_exhaust() {
        let mut world = MockWorld::new();
        let mut member = PopulationMember::spawn(&mut world, &config()).unwrap();

        world.fail_fixtures = MAX_MUTATION_RETRIES;
        let source = *member.genome().vertices();
        let mut rng = GenomeRng::new(1);
        member
            .mutate(&mut world, &source, params(1.0, 0.3), &mut rng)
            .unwrap();

        assert_eq!(member.genome().vertices(), &source);
        assert_eq!(world.live_fixture_count(member.body()), 1);
    }

    #[test]
    fn reset_with_noise_perturbs_around_initial_state() {
        let mut config = config();
        config.env.wheel.reset_noise = Some(ResetNoiseConfig {
            position: Vec2Config { x: 0.1, y: 0.1 },
            linear_velocity: Vec2Config { x: 0.0, y: 0.0 },
            angular_velocity: 0.0,
            angle: 0.0,
        });

        let mut world = MockWorld::new();
        let member = PopulationMember::spawn(&mut world, &config).unwrap();
        let noise = config.env.wheel.reset_noise.as_ref().unwrap();

        let mut rng = GenomeRng::new(5);
        member.reset_with_noise(&mut world, noise, &mut rng);

        let state = world.kinematics(member.body());
        // Velocity/angle sigmas are zero, so only the position moves.
        assert_eq!(state.linear_velocity, member.initial().linear_velocity);
        assert_eq!(state.angle, member.initial().angle);
        assert!((state.position.0 - member.initial().position.0).abs() < 1.0);
    }
}
