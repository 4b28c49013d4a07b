//! Schema module - configuration types for the optimizer and environment.

mod config;

pub use config::*;
