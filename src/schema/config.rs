//! Configuration types for the genetic wheels optimizer.

use serde::{Deserialize, Serialize};

/// Default fixed physics timestep (60 Hz, matching the classic testbed).
fn default_time_step() -> f32 {
    1.0 / 60.0
}

/// Top-level run configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Simulation environment: gravity, terrain, wheel physical parameters.
    pub env: EnvConfig,
    /// Evolutionary optimizer parameters.
    pub optimizer: OptimizerConfig,
    /// Fixed-timestep integration parameters.
    #[serde(default)]
    pub sim: SimConfig,
    /// RNG seed for reproducible runs. Random when absent.
    #[serde(default)]
    pub seed: Option<u64>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            env: EnvConfig::default(),
            optimizer: OptimizerConfig::default(),
            sim: SimConfig::default(),
            seed: None,
        }
    }
}

/// A 2D vector as it appears in configuration files.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Vec2Config {
    pub x: f32,
    pub y: f32,
}

/// Environment parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnvConfig {
    /// World gravity vector.
    pub gravity: Vec2Config,
    /// Inclined plane endpoints.
    pub inclined_plane: PlaneConfig,
    /// Wheel physical parameters and initial kinematic state.
    pub wheel: WheelConfig,
}

impl Default for EnvConfig {
    fn default() -> Self {
        Self {
            gravity: Vec2Config { x: 0.0, y: -9.81 },
            inclined_plane: PlaneConfig::default(),
            wheel: WheelConfig::default(),
        }
    }
}

/// Inclined plane geometry. The slope runs from `(x0, y0)` down to
/// `(x1, y1)`; a 4 m wall is raised at each end to keep wheels in play.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PlaneConfig {
    pub x0: f32,
    pub y0: f32,
    pub x1: f32,
    pub y1: f32,
}

impl Default for PlaneConfig {
    fn default() -> Self {
        Self {
            x0: -20.0,
            y0: 12.0,
            x1: 26.0,
            y1: 0.0,
        }
    }
}

/// Wheel parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WheelConfig {
    /// Wheel diameter; also bounds mutated vertices to `0.5 * diam`.
    pub diam: f32,
    /// Fixture density.
    pub density: f32,
    /// Fixture friction coefficient.
    pub friction: f32,
    /// Spawn position.
    pub init_position: Vec2Config,
    /// Spawn linear velocity.
    pub init_linear_velocity: Vec2Config,
    /// Spawn angular velocity in rad/s.
    pub init_angular_velocity: f32,
    /// Spawn angle in degrees.
    pub init_angle: f32,
    /// Optional Gaussian noise injected into the reset pose. Off when absent.
    #[serde(default)]
    pub reset_noise: Option<ResetNoiseConfig>,
}

impl Default for WheelConfig {
    fn default() -> Self {
        Self {
            diam: 1.0,
            density: 1.0,
            friction: 0.5,
            init_position: Vec2Config { x: -18.0, y: 14.0 },
            init_linear_velocity: Vec2Config { x: 0.0, y: 0.0 },
            init_angular_velocity: 0.0,
            init_angle: 0.0,
            reset_noise: None,
        }
    }
}

/// Standard deviations for per-episode reset-state noise.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResetNoiseConfig {
    /// Position sigma per axis.
    pub position: Vec2Config,
    /// Linear velocity sigma per axis.
    pub linear_velocity: Vec2Config,
    /// Angular velocity sigma in rad/s.
    pub angular_velocity: f32,
    /// Angle sigma in degrees.
    pub angle: f32,
}

/// Evolutionary optimizer parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptimizerConfig {
    /// Population size.
    pub n_wheels: usize,
    /// Episode length cap in physics steps.
    pub n_max_iterations: u64,
    /// Per-coordinate probability of applying Gaussian noise.
    pub mutation_probability: f32,
    /// Standard deviation of the Gaussian perturbation.
    pub mutation_rate: f32,
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        Self {
            n_wheels: 16,
            n_max_iterations: 1200,
            mutation_probability: 0.1,
            mutation_rate: 0.05,
        }
    }
}

/// Fixed-timestep integration parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimConfig {
    /// Physics timestep in seconds.
    #[serde(default = "default_time_step")]
    pub time_step: f32,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            time_step: default_time_step(),
        }
    }
}

impl Config {
    /// Validate configuration parameters. Called once at startup; a failure
    /// here aborts the run before any physics state is created.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.optimizer.n_wheels == 0 {
            return Err(ConfigError::EmptyPopulation);
        }
        if self.optimizer.n_max_iterations == 0 {
            return Err(ConfigError::InvalidMaxIterations);
        }
        let p = self.optimizer.mutation_probability;
        if !p.is_finite() || !(0.0..=1.0).contains(&p) {
            return Err(ConfigError::InvalidMutationProbability(p));
        }
        let rho = self.optimizer.mutation_rate;
        if !rho.is_finite() || rho < 0.0 {
            return Err(ConfigError::InvalidMutationRate(rho));
        }
        if self.env.wheel.diam <= 0.0 {
            return Err(ConfigError::InvalidDiameter(self.env.wheel.diam));
        }
        if self.env.wheel.density <= 0.0 {
            return Err(ConfigError::InvalidDensity(self.env.wheel.density));
        }
        if self.sim.time_step <= 0.0 {
            return Err(ConfigError::InvalidTimeStep);
        }
        let plane = &self.env.inclined_plane;
        if plane.x0 == plane.x1 && plane.y0 == plane.y1 {
            return Err(ConfigError::DegeneratePlane);
        }
        Ok(())
    }
}

/// Configuration validation errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("optimizer.n_wheels must be non-zero")]
    EmptyPopulation,
    #[error("optimizer.n_max_iterations must be non-zero")]
    InvalidMaxIterations,
    #[error("optimizer.mutation_probability must be in [0, 1], got {0}")]
    InvalidMutationProbability(f32),
    #[error("optimizer.mutation_rate must be non-negative, got {0}")]
    InvalidMutationRate(f32),
    #[error("env.wheel.diam must be positive, got {0}")]
    InvalidDiameter(f32),
    #[error("env.wheel.density must be positive, got {0}")]
    InvalidDensity(f32),
    #[error("sim.time_step must be positive")]
    InvalidTimeStep,
    #[error("env.inclined_plane endpoints must be distinct")]
    DegeneratePlane,
}
