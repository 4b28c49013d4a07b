//! Genetic Wheels - rediscovering the wheel with genetic optimization.
//!
//! A population of 16-vertex polygon "wheels" is dropped onto an inclined
//! plane under 2D rigid-body physics. When every wheel has come to rest (or
//! an iteration cap is hit), the wheel that rolled the farthest is selected
//! as the elite, its vertices are broadcast to the whole population, and
//! each member re-mutates them independently before the next rollout.
//!
//! # Architecture
//!
//! - `schema`: configuration types loaded from JSON
//! - `physics`: the rigid-body capability surface and its rapier2d backend
//! - `evolve`: genome, population, episode control, fitness, and the
//!   generational loop
//! - `metrics`: scalar sinks for per-generation summaries
//!
//! # Example
//!
//! ```rust,no_run
//! use genetic_wheels::{
//!     evolve::GenerationLoop,
//!     metrics::LogMetrics,
//!     physics::RapierWorld,
//!     schema::Config,
//! };
//!
//! let config = Config::default();
//! config.validate().unwrap();
//!
//! let world = RapierWorld::new(
//!     (config.env.gravity.x, config.env.gravity.y),
//!     config.sim.time_step,
//! );
//! let mut driver = GenerationLoop::new(world, &config).unwrap();
//!
//! // Run ten generations and report the scores.
//! driver.run_generations(&mut LogMetrics, 10).unwrap();
//! ```

pub mod evolve;
pub mod metrics;
pub mod physics;
pub mod schema;

// Re-export commonly used types
pub use evolve::{GenerationLoop, GenerationReport, WheelGenome};
pub use metrics::MetricsSink;
pub use physics::{RapierWorld, RigidBodyWorld};
pub use schema::Config;
