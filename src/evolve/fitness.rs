//! Fitness scoring and elite selection.
//!
//! Fitness is the net horizontal displacement of a wheel from its own
//! recorded initial x-position. Displacement rather than raw position keeps
//! the score invariant to where the world origin happens to sit.

use crate::physics::RigidBodyWorld;

use super::member::PopulationMember;

/// Result of scoring a completed episode.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Evaluation {
    /// Index of the best-scoring member, ties broken by population order.
    pub elite_index: usize,
    /// The elite's horizontal displacement.
    pub fitness: f32,
}

/// Horizontal displacement of one member from its initial x-position.
pub fn displacement<W: RigidBodyWorld>(world: &W, member: &PopulationMember<W>) -> f32 {
    world.kinematics(member.body()).position.0 - member.initial().position.0
}

/// Score the whole population and pick the elite.
///
/// Called exactly once per generation, after termination and before any
/// mutation. Panics on an empty population (excluded by config validation).
pub fn evaluate<W: RigidBodyWorld>(world: &W, members: &[PopulationMember<W>]) -> Evaluation {
    let mut best = Evaluation {
        elite_index: 0,
        fitness: displacement(world, &members[0]),
    };
    for (index, member) in members.iter().enumerate().skip(1) {
        let fitness = displacement(world, member);
        if fitness > best.fitness {
            best = Evaluation {
                elite_index: index,
                fitness,
            };
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::RigidBodyWorld;
    use crate::physics::mock::MockWorld;
    use crate::schema::Config;

    fn population(world: &mut MockWorld, n: usize) -> Vec<PopulationMember<MockWorld>> {
        let config = Config::default();
        (0..n)
            .map(|_| PopulationMember::spawn(world, &config).unwrap())
            .collect()
    }

    #[test]
    fn fitness_is_displacement_not_raw_position() {
        let mut world = MockWorld::new();
        let members = population(&mut world, 1);

        let x0 = members[0].initial().position.0;
        world.set_position(members[0].body(), (x0 + 4.5, 0.0));

        assert_eq!(displacement(&world, &members[0]), 4.5);
    }

    #[test]
    fn picks_argmax_member() {
        let mut world = MockWorld::new();
        let members = population(&mut world, 4);
        let x0 = members[0].initial().position.0;

        world.set_position(members[0].body(), (x0 + 1.0, 0.0));
        world.set_position(members[1].body(), (x0 + 7.0, 0.0));
        world.set_position(members[2].body(), (x0 - 3.0, 0.0));
        world.set_position(members[3].body(), (x0 + 2.0, 0.0));

        let eval = evaluate(&world, &members);
        assert_eq!(eval.elite_index, 1);
        assert_eq!(eval.fitness, 7.0);
    }

    #[test]
    fn ties_break_to_first_occurrence() {
        let mut world = MockWorld::new();
        let members = population(&mut world, 3);
        let x0 = members[0].initial().position.0;

        world.set_position(members[0].body(), (x0 + 2.0, 0.0));
        world.set_position(members[1].body(), (x0 + 5.0, 0.0));
        world.set_position(members[2].body(), (x0 + 5.0, 0.0));

        assert_eq!(evaluate(&world, &members).elite_index, 1);
    }

    #[test]
    fn negative_displacement_can_still_win() {
        let mut world = MockWorld::new();
        let members = population(&mut world, 2);
        let x0 = members[0].initial().position.0;

        world.set_position(members[0].body(), (x0 - 1.0, 0.0));
        world.set_position(members[1].body(), (x0 - 6.0, 0.0));

        let eval = evaluate(&world, &members);
        assert_eq!(eval.elite_index, 0);
        assert_eq!(eval.fitness, -1.0);
    }
}
