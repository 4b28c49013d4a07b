//! Episode boundaries: when does a rollout end?

use crate::physics::RigidBodyWorld;

use super::member::PopulationMember;

/// True iff at least one member's body is still actively simulated. Once
/// every wheel has settled, further stepping wastes time.
pub fn is_awake<W: RigidBodyWorld>(world: &W, members: &[PopulationMember<W>]) -> bool {
    members.iter().any(|member| world.is_awake(member.body()))
}

/// Outcome of observing the population after a physics step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Running,
    Terminated,
}

/// Tracks the per-episode iteration counter and decides termination.
///
/// An episode terminates when every wheel has gone to sleep or when the
/// iteration cap is hit, whichever comes first. There is no failure phase;
/// engine failures surface as errors from the stepping call itself.
#[derive(Debug)]
pub struct EpisodeController {
    n_max_iterations: u64,
    iteration: u64,
}

impl EpisodeController {
    pub fn new(n_max_iterations: u64) -> Self {
        Self {
            n_max_iterations,
            iteration: 0,
        }
    }

    /// Steps taken in the current episode.
    pub fn iteration(&self) -> u64 {
        self.iteration
    }

    /// Observe the world after one physics step: either the episode keeps
    /// running (and the iteration counter advances) or it terminates.
    pub fn advance<W: RigidBodyWorld>(
        &mut self,
        world: &W,
        members: &[PopulationMember<W>],
    ) -> Phase {
        if !is_awake(world, members) || (self.iteration + 1) % self.n_max_iterations == 0 {
            Phase::Terminated
        } else {
            self.iteration += 1;
            Phase::Running
        }
    }

    /// Re-enter the running phase with the iteration counter cleared.
    pub fn restart(&mut self) {
        self.iteration = 0;
    }
}
