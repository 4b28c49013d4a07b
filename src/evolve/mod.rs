//! Evolutionary core: population, episodes, fitness, mutation, and the
//! generational loop.
//!
//! The strategy is deliberately minimal: a single population, a single
//! elite, and Gaussian vertex mutation. The components are:
//!
//! - **Genome** (`genome`): the 16-vertex wheel shape and its mutation
//!   operator, driven by one seedable RNG.
//! - **Population member** (`member`): a genome bound to a live physics
//!   body; owns reset and mutate against that body.
//! - **Episode control** (`episode`): iteration counting and the
//!   all-asleep / iteration-cap termination rule.
//! - **Fitness** (`fitness`): horizontal displacement scoring and elite
//!   selection.
//! - **Generation loop** (`search`): the top-level driver composing the
//!   above once per physics tick.

mod episode;
mod fitness;
mod genome;
mod member;
mod search;

pub use episode::{EpisodeController, Phase, is_awake};
pub use fitness::{Evaluation, displacement, evaluate};
pub use genome::{GenomeRng, MutationParams, VERTEX_COUNT, Vertices, WheelGenome};
pub use member::PopulationMember;
pub use search::{GenerationLoop, GenerationReport, next_generation};
