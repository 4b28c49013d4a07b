//! Wheel genome representation and the mutation operator.
//!
//! A genome is a fixed ring of 16 local vertices. New populations start from
//! a square outline (four vertices per edge) scaled by the configured wheel
//! diameter; evolution perturbs individual coordinates with Gaussian noise
//! and clamps them so the wheel never outgrows its bounding circle.

use rand::prelude::*;
use rand_distr::StandardNormal;

use crate::physics::Vertex;
use crate::schema::OptimizerConfig;

/// Number of vertices in every genome, constant for the whole run.
pub const VERTEX_COUNT: usize = 16;

/// A genome's vertex ring.
pub type Vertices = [Vertex; VERTEX_COUNT];

/// Unit square outline with subdivided edges, counter-clockwise. Chosen so
/// the shape stays convex under small perturbations.
const BASE_VERTICES: Vertices = [
    (-0.5, -0.5),
    (-0.25, -0.5),
    (0.0, -0.5),
    (0.25, -0.5),
    (0.5, -0.5),
    (0.5, -0.25),
    (0.5, 0.0),
    (0.5, 0.25),
    (0.5, 0.5),
    (0.25, 0.5),
    (0.0, 0.5),
    (-0.25, 0.5),
    (-0.5, 0.5),
    (-0.5, 0.25),
    (-0.5, 0.0),
    (-0.5, -0.25),
];

/// One candidate wheel shape.
#[derive(Debug, Clone, PartialEq)]
pub struct WheelGenome {
    vertices: Vertices,
}

impl WheelGenome {
    /// The initial genome: the base outline scaled by `diam`.
    pub fn base(diam: f32) -> Self {
        let mut vertices = BASE_VERTICES;
        for (x, y) in &mut vertices {
            *x *= diam;
            *y *= diam;
        }
        Self { vertices }
    }

    /// Build a genome directly from a vertex ring.
    pub fn from_vertices(vertices: Vertices) -> Self {
        Self { vertices }
    }

    pub fn vertices(&self) -> &Vertices {
        &self.vertices
    }
}

/// Mutation operator parameters.
///
/// Invariants (enforced by `Config::validate`): `0 <= p <= 1`, `rho >= 0`,
/// `clip_radius = 0.5 * diam`.
#[derive(Debug, Clone, Copy)]
pub struct MutationParams {
    /// Per-coordinate probability of perturbation.
    pub p: f32,
    /// Standard deviation of the Gaussian perturbation.
    pub rho: f32,
    /// Maximum coordinate magnitude after mutation.
    pub clip_radius: f32,
}

impl MutationParams {
    pub fn new(optimizer: &OptimizerConfig, diam: f32) -> Self {
        Self {
            p: optimizer.mutation_probability,
            rho: optimizer.mutation_rate,
            clip_radius: 0.5 * diam,
        }
    }
}

/// Seedable random source for all genome operations.
///
/// A single instance is threaded through mutation explicitly so runs are
/// reproducible; there is no global RNG state anywhere in the crate.
pub struct GenomeRng {
    rng: StdRng,
}

impl GenomeRng {
    /// Create from seed.
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Create with a random seed.
    pub fn from_entropy() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    /// Draw a mutated vertex ring from `source`: each coordinate is
    /// independently perturbed by `N(0, rho)` with probability `p`, then
    /// clamped to `[-clip_radius, clip_radius]`.
    pub fn mutate_vertices(&mut self, source: &Vertices, params: MutationParams) -> Vertices {
        let mut vertices = *source;
        for (x, y) in &mut vertices {
            *x = self.mutate_coord(*x, params);
            *y = self.mutate_coord(*y, params);
        }
        vertices
    }

    fn mutate_coord(&mut self, value: f32, params: MutationParams) -> f32 {
        let mutated = if self.rng.gen_bool(params.p as f64) {
            let noise: f32 = self.rng.sample(StandardNormal);
            value + noise * params.rho
        } else {
            value
        };
        mutated.clamp(-params.clip_radius, params.clip_radius)
    }

    /// Gaussian draw with the given standard deviation (reset-pose noise).
    pub fn gauss(&mut self, sigma: f32) -> f32 {
        let noise: f32 = self.rng.sample(StandardNormal);
        noise * sigma
    }
}
