//! The generational optimization loop.
//!
//! Each tick advances the physics world by one fixed step and asks the
//! episode controller whether the rollout is over. At a boundary the
//! population is scored, the elite's vertices are broadcast and re-mutated
//! into every member (a (1, λ)-style strategy with no unmutated survivor,
//! so best fitness is not monotone across generations), every body is reset
//! to its recorded initial state, and summary scalars go to the metrics
//! sink.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

use log::{debug, info};

use crate::metrics::MetricsSink;
use crate::physics::{PhysicsError, RigidBodyWorld};
use crate::schema::{Config, ResetNoiseConfig};

use super::episode::{EpisodeController, Phase};
use super::fitness;
use super::genome::{GenomeRng, MutationParams, Vertices};
use super::member::PopulationMember;

/// Summary of one completed generation.
#[derive(Debug, Clone, Copy)]
pub struct GenerationReport {
    /// Index of the generation that just completed.
    pub generation: u64,
    /// Index of its elite member.
    pub elite_index: usize,
    /// The elite's horizontal displacement.
    pub best_fitness: f32,
    /// Wall time spent on the episode, including the boundary bookkeeping.
    pub elapsed_seconds: f64,
}

/// Broadcast the elite's vertices to every member (the elite included) and
/// mutate each independently, so siblings diverge even though they share a
/// parent.
pub fn next_generation<W: RigidBodyWorld>(
    world: &mut W,
    members: &mut [PopulationMember<W>],
    elite_index: usize,
    params: MutationParams,
    rng: &mut GenomeRng,
) -> Result<(), PhysicsError> {
    let source: Vertices = *members[elite_index].genome().vertices();
    for member in members.iter_mut() {
        member.mutate(world, &source, params, rng)?;
    }
    Ok(())
}

/// Top-level driver owning the world, the population, and the counters.
pub struct GenerationLoop<W: RigidBodyWorld> {
    world: W,
    members: Vec<PopulationMember<W>>,
    controller: EpisodeController,
    params: MutationParams,
    rng: GenomeRng,
    reset_noise: Option<ResetNoiseConfig>,
    generation: u64,
    episode_started: Instant,
    cancelled: Arc<AtomicBool>,
}

impl<W: RigidBodyWorld> GenerationLoop<W> {
    /// Build the environment inside `world` (inclined plane plus one wall at
    /// each end) and spawn the population.
    pub fn new(mut world: W, config: &Config) -> Result<Self, PhysicsError> {
        let plane = &config.env.inclined_plane;
        let top = (plane.x0, plane.y0);
        let bottom = (plane.x1, plane.y1);
        world.create_static_edges(&[
            (top, bottom),
            (bottom, (bottom.0, bottom.1 + 4.0)),
            (top, (top.0, top.1 + 4.0)),
        ]);

        let members = (0..config.optimizer.n_wheels)
            .map(|_| PopulationMember::spawn(&mut world, config))
            .collect::<Result<Vec<_>, _>>()?;

        let rng = match config.seed {
            Some(seed) => GenomeRng::new(seed),
            None => GenomeRng::from_entropy(),
        };

        info!(
            "population of {} wheels spawned (p={}, rho={})",
            members.len(),
            config.optimizer.mutation_probability,
            config.optimizer.mutation_rate
        );

        Ok(Self {
            world,
            members,
            controller: EpisodeController::new(config.optimizer.n_max_iterations),
            params: MutationParams::new(&config.optimizer, config.env.wheel.diam),
            rng,
            reset_noise: config.env.wheel.reset_noise.clone(),
            generation: 0,
            episode_started: Instant::now(),
            cancelled: Arc::new(AtomicBool::new(false)),
        })
    }

    /// Handle that makes `run` stop after the in-progress generation.
    pub fn cancel_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.cancelled)
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn iteration(&self) -> u64 {
        self.controller.iteration()
    }

    pub fn population(&self) -> &[PopulationMember<W>] {
        &self.members
    }

    pub fn world(&self) -> &W {
        &self.world
    }

    /// Advance one physics step. Returns a report when this step closed a
    /// generation.
    pub fn tick<M: MetricsSink>(
        &mut self,
        metrics: &mut M,
    ) -> Result<Option<GenerationReport>, PhysicsError> {
        self.world.step()?;

        match self.controller.advance(&self.world, &self.members) {
            Phase::Running => Ok(None),
            Phase::Terminated => {
                let eval = fitness::evaluate(&self.world, &self.members);
                debug!(
                    "generation {} terminated after {} iterations (elite {})",
                    self.generation,
                    self.controller.iteration(),
                    eval.elite_index
                );

                next_generation(
                    &mut self.world,
                    &mut self.members,
                    eval.elite_index,
                    self.params,
                    &mut self.rng,
                )?;

                for member in &self.members {
                    match &self.reset_noise {
                        Some(noise) => member.reset_with_noise(&mut self.world, noise, &mut self.rng),
                        None => member.reset(&mut self.world),
                    }
                }

                let elapsed_seconds = self.episode_started.elapsed().as_secs_f64();
                metrics.add_scalar("Score", eval.fitness, self.generation);
                metrics.add_scalar("Time_Generation", elapsed_seconds as f32, self.generation);

                let report = GenerationReport {
                    generation: self.generation,
                    elite_index: eval.elite_index,
                    best_fitness: eval.fitness,
                    elapsed_seconds,
                };

                self.generation += 1;
                self.controller.restart();
                self.episode_started = Instant::now();

                Ok(Some(report))
            }
        }
    }

    /// Run until `generations` more boundaries complete or the loop is
    /// cancelled. Cancellation is observed only at a boundary, so a partial
    /// episode is never scored. Returns the number of generations completed.
    pub fn run_generations<M: MetricsSink>(
        &mut self,
        metrics: &mut M,
        generations: u64,
    ) -> Result<u64, PhysicsError> {
        let mut completed = 0;
        while completed < generations {
            if let Some(report) = self.tick(metrics)? {
                completed += 1;
                info!(
                    "generation {}: elite {} fitness {:.3} ({:.2}s)",
                    report.generation,
                    report.elite_index,
                    report.best_fitness,
                    report.elapsed_seconds
                );
                if self.cancelled.load(Ordering::Relaxed) {
                    info!("stop requested; halting after generation {}", report.generation);
                    break;
                }
            }
        }
        Ok(completed)
    }

    /// Run indefinitely until cancelled.
    pub fn run<M: MetricsSink>(&mut self, metrics: &mut M) -> Result<u64, PhysicsError> {
        self.run_generations(metrics, u64::MAX)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::NullMetrics;
    use crate::physics::mock::MockWorld;
    use crate::schema::Config;

    /// Metrics sink that records every scalar it receives.
    #[derive(Default)]
    struct RecordingMetrics {
        scalars: Vec<(String, f32, u64)>,
    }

    impl MetricsSink for RecordingMetrics {
        fn add_scalar(&mut self, name: &str, value: f32, step: u64) {
            self.scalars.push((name.to_string(), value, step));
        }
    }

    fn config(n_wheels: usize, n_max_iterations: u64, p: f32, rho: f32) -> Config {
        let mut config = Config::default();
        config.optimizer.n_wheels = n_wheels;
        config.optimizer.n_max_iterations = n_max_iterations;
        config.optimizer.mutation_probability = p;
        config.optimizer.mutation_rate = rho;
        config.seed = Some(42);
        config
    }

    #[test]
    fn counters_advance_exactly_once_per_boundary() {
        // All mock bodies stay awake, so every episode runs to the cap.
        let config = config(4, 300, 0.1, 0.05);
        let mut driver = GenerationLoop::new(MockWorld::new(), &config).unwrap();
        let mut metrics = RecordingMetrics::default();

        let mut boundaries = 0u64;
        for generation in 0..5 {
            assert_eq!(driver.generation(), generation);
            loop {
                let before = driver.iteration();
                if let Some(report) = driver.tick(&mut metrics).unwrap() {
                    assert_eq!(report.generation, generation);
                    assert_eq!(driver.iteration(), 0);
                    boundaries += 1;
                    break;
                }
                assert_eq!(driver.iteration(), before + 1);
            }
        }

        assert_eq!(boundaries, 5);
        assert_eq!(driver.generation(), 5);
        // 300 steps per episode on the mock world.
        assert_eq!(driver.world().steps, 5 * 300);
    }

    #[test]
    fn emits_score_and_time_per_generation() {
        let config = config(3, 50, 0.1, 0.05);
        let mut driver = GenerationLoop::new(MockWorld::new(), &config).unwrap();
        let mut metrics = RecordingMetrics::default();

        driver.run_generations(&mut metrics, 3).unwrap();

        let scores: Vec<_> = metrics
            .scalars
            .iter()
            .filter(|(name, _, _)| name == "Score")
            .collect();
        let times: Vec<_> = metrics
            .scalars
            .iter()
            .filter(|(name, _, _)| name == "Time_Generation")
            .collect();
        assert_eq!(scores.len(), 3);
        assert_eq!(times.len(), 3);
        for (generation, (_, _, step)) in scores.iter().enumerate() {
            assert_eq!(*step, generation as u64);
        }
    }

    #[test]
    fn zero_probability_broadcasts_elite_unchanged() {
        let config = config(4, 10, 0.0, 10.0);
        let mut driver = GenerationLoop::new(MockWorld::new(), &config).unwrap();

        let elite = driver.population()[0].genome().clone();
        driver.run_generations(&mut NullMetrics, 1).unwrap();

        for member in driver.population() {
            assert_eq!(member.genome(), &elite);
        }
    }

    #[test]
    fn zero_rate_broadcasts_elite_unchanged() {
        let config = config(4, 10, 1.0, 0.0);
        let mut driver = GenerationLoop::new(MockWorld::new(), &config).unwrap();

        let elite = driver.population()[0].genome().clone();
        driver.run_generations(&mut NullMetrics, 1).unwrap();

        for member in driver.population() {
            assert_eq!(member.genome(), &elite);
        }
    }

    #[test]
    fn members_reset_to_initial_state_at_boundary() {
        let config = config(2, 10, 0.5, 0.1);
        let mut driver = GenerationLoop::new(MockWorld::new(), &config).unwrap();

        driver.run_generations(&mut NullMetrics, 1).unwrap();

        for member in driver.population() {
            assert_eq!(driver.world().kinematics(member.body()), *member.initial());
        }
    }

    #[test]
    fn cancellation_stops_after_completed_generation() {
        let config = config(2, 10, 0.1, 0.05);
        let mut driver = GenerationLoop::new(MockWorld::new(), &config).unwrap();

        driver.cancel_handle().store(true, Ordering::Relaxed);
        let completed = driver.run(&mut NullMetrics).unwrap();

        assert_eq!(completed, 1);
        assert_eq!(driver.generation(), 1);
        assert_eq!(driver.iteration(), 0);
    }
}
