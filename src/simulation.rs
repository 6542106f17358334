/*
 * Simulation Module
 *
 * The driver that owns the flock and runs it one tick at a time.
 *
 * Each tick is a small task graph over the committed (front) buffer:
 *
 *     front ──┬──> reducer ──────────┐
 *             └──> kernel ──> back ──┴──> swap / publish
 *
 * The reducer and the kernel only read the front buffer, so they run
 * concurrently under `rayon::join`; the swap waits for both. The kernel writes
 * the back buffer exclusively, and the swap makes it the new front.
 *
 * Lifecycle: Uninitialized -> Initialized -> {Ticking -> Initialized}* -> Shutdown
 */

use std::time::Instant;

use glam::Vec3;
use log::{debug, trace, warn};
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::boid::Transform;
use crate::buffer::{BufferId, DoubleBuffer, NoisePhases};
use crate::center;
use crate::debug::TickStats;
use crate::error::{FlockError, Result};
use crate::params::{self, ExecutionMode, Pipeline, SimulationConfig, Weights};
use crate::physics::{self, KernelParams, StageScratch};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SimulationState {
    Uninitialized,
    Initialized,
    Ticking,
    Shutdown,
}

// Everything allocated at initialize and released at shutdown
struct Flock {
    buffers: DoubleBuffer,
    phases: NoisePhases,
    scratch: StageScratch,
    center: Vec3,
}

/// What a tick publishes. Borrowing the simulation keeps the buffer frozen
/// until the result is dropped.
#[derive(Clone, Copy, Debug)]
pub struct TickResult<'a> {
    pub transforms: &'a [Transform],
    pub buffer_id: BufferId,
    pub flock_center: Vec3,
    pub stats: TickStats,
}

pub struct Simulation {
    state: SimulationState,
    config: SimulationConfig,
    flock: Option<Flock>,
    elapsed: f32,
    ticks: u64,
    last_stats: Option<TickStats>,
}

impl Default for Simulation {
    fn default() -> Self {
        Self::new()
    }
}

impl Simulation {
    pub fn new() -> Self {
        Self {
            state: SimulationState::Uninitialized,
            config: SimulationConfig::default(),
            flock: None,
            elapsed: 0.0,
            ticks: 0,
            last_stats: None,
        }
    }

    pub fn with_config(config: SimulationConfig) -> Result<Self> {
        let mut sim = Self::new();
        sim.initialize(config)?;
        Ok(sim)
    }

    /// Spawn the population and allocate both buffers.
    pub fn initialize(&mut self, config: SimulationConfig) -> Result<()> {
        match self.state {
            SimulationState::Uninitialized => {}
            SimulationState::Shutdown => return Err(FlockError::ShutDown),
            SimulationState::Initialized | SimulationState::Ticking => {
                return Err(FlockError::AlreadyInitialized)
            }
        }
        config.validate()?;

        let mut rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        let transforms: Vec<Transform> = (0..config.agent_count)
            .map(|_| {
                Transform::random(
                    &mut rng,
                    config.origin,
                    config.spawn_radius,
                    config.spawn_rotation.normalize(),
                    config.spawn_jitter,
                )
            })
            .collect();
        let phases = NoisePhases::random(&mut rng, config.agent_count);
        let center = center::reduce(&transforms, config.mode.resolve(config.agent_count));

        debug!(
            "initialized flock of {} agents (seed {:?}, mode {:?}, pipeline {:?})",
            config.agent_count, config.seed, config.mode, config.pipeline
        );

        self.flock = Some(Flock {
            buffers: DoubleBuffer::new(transforms),
            phases,
            scratch: StageScratch::default(),
            center,
        });
        self.config = config;
        self.elapsed = 0.0;
        self.ticks = 0;
        self.last_stats = None;
        self.state = SimulationState::Initialized;
        Ok(())
    }

    /// Advance one tick with explicit inputs.
    pub fn tick(
        &mut self,
        delta_time: f32,
        weights: Weights,
        goal: Option<Vec3>,
    ) -> Result<TickResult<'_>> {
        self.check_live()?;
        params::validate_delta_time(delta_time)?;
        weights.validate()?;
        params::validate_goal(goal)?;

        let flock = self.flock.as_mut().ok_or(FlockError::NotInitialized)?;
        self.state = SimulationState::Ticking;
        let start = Instant::now();

        let agent_count = flock.buffers.len();
        let mode = self.config.mode.resolve(agent_count);
        let pipeline = self.config.pipeline;
        let chunk_size = self
            .config
            .chunk_size
            .unwrap_or_else(|| physics::default_chunk_size(agent_count));

        let kernel_params = KernelParams {
            weights,
            time: self.elapsed,
            delta_time,
            separation_distance: self.config.separation_distance,
            max_speed: self.config.max_speed,
            goal,
            wind: self.config.wind,
        };

        let Flock {
            buffers,
            phases,
            scratch,
            center: flock_center,
        } = flock;

        let new_center = {
            let (src, dst) = buffers.split();
            let src = src.as_slice();
            let dst = dst.as_mut_slice();
            let phases = phases.as_slice();

            let mut kernel = move || match pipeline {
                Pipeline::Fused => {
                    physics::run_fused(src, dst, phases, &kernel_params, mode, chunk_size)
                }
                Pipeline::Staged => physics::run_staged(
                    src,
                    dst,
                    phases,
                    &kernel_params,
                    mode,
                    chunk_size,
                    scratch,
                ),
            };

            match mode {
                ExecutionMode::Sequential => {
                    let c = center::reduce(src, mode);
                    kernel();
                    c
                }
                ExecutionMode::Parallel | ExecutionMode::Auto => {
                    let (c, ()) = rayon::join(|| center::reduce(src, mode), kernel);
                    c
                }
            }
        };

        // Both branches of the graph are done; publish
        *flock_center = new_center;
        buffers.swap();

        self.elapsed += delta_time;
        self.ticks += 1;
        let stats = TickStats {
            tick: self.ticks,
            agent_count,
            elapsed: start.elapsed(),
            mode,
            pipeline,
            chunk_size: (mode == ExecutionMode::Parallel).then_some(chunk_size),
        };
        self.last_stats = Some(stats);
        self.state = SimulationState::Initialized;

        trace!(
            "tick {} ({} agents, {:?}/{:?}) took {:?}",
            stats.tick,
            agent_count,
            mode,
            pipeline,
            stats.elapsed
        );

        let front = buffers.front();
        Ok(TickResult {
            transforms: front.as_slice(),
            buffer_id: front.id(),
            flock_center: new_center,
            stats,
        })
    }

    /// Advance one tick using the stored weights and goal.
    pub fn step(&mut self, delta_time: f32) -> Result<TickResult<'_>> {
        let weights = self.config.weights;
        let goal = self.config.goal;
        self.tick(delta_time, weights, goal)
    }

    /// Release the flock. Calling it again is a no-op.
    pub fn shutdown(&mut self) {
        if self.state == SimulationState::Shutdown {
            return;
        }
        if self.state == SimulationState::Ticking {
            warn!("shutting down a simulation whose last tick never completed");
        }
        self.flock = None;
        self.last_stats = None;
        self.state = SimulationState::Shutdown;
        debug!("simulation shut down after {} ticks", self.ticks);
    }

    fn check_live(&self) -> Result<()> {
        match self.state {
            SimulationState::Initialized => Ok(()),
            SimulationState::Uninitialized => Err(FlockError::NotInitialized),
            SimulationState::Shutdown => Err(FlockError::ShutDown),
            SimulationState::Ticking => {
                warn!("tick requested while tick {} is still in flight", self.ticks + 1);
                Err(FlockError::TickInFlight)
            }
        }
    }

    fn live_flock(&self) -> Result<&Flock> {
        match self.state {
            SimulationState::Uninitialized => Err(FlockError::NotInitialized),
            SimulationState::Shutdown => Err(FlockError::ShutDown),
            _ => self.flock.as_ref().ok_or(FlockError::NotInitialized),
        }
    }

    pub fn state(&self) -> SimulationState {
        self.state
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn weights(&self) -> &Weights {
        &self.config.weights
    }

    pub fn weights_mut(&mut self) -> &mut Weights {
        &mut self.config.weights
    }

    pub fn goal(&self) -> Option<Vec3> {
        self.config.goal
    }

    pub fn set_goal(&mut self, goal: Option<Vec3>) -> Result<()> {
        params::validate_goal(goal)?;
        self.config.goal = goal;
        Ok(())
    }

    pub fn wind(&self) -> Vec3 {
        self.config.wind
    }

    pub fn set_wind(&mut self, wind: Vec3) -> Result<()> {
        params::validate_wind(wind)?;
        self.config.wind = wind;
        Ok(())
    }

    pub fn set_separation_distance(&mut self, distance: f32) -> Result<()> {
        params::validate_separation_distance(distance)?;
        self.config.separation_distance = distance;
        Ok(())
    }

    pub fn set_max_speed(&mut self, speed: f32) -> Result<()> {
        params::validate_max_speed(speed)?;
        self.config.max_speed = speed;
        Ok(())
    }

    pub fn set_mode(&mut self, mode: ExecutionMode) {
        self.config.mode = mode;
    }

    pub fn set_pipeline(&mut self, pipeline: Pipeline) {
        self.config.pipeline = pipeline;
    }

    /// Mean agent position of the committed buffer.
    pub fn flock_center(&self) -> Result<Vec3> {
        self.live_flock().map(|f| f.center)
    }

    /// The committed buffer, as published by the last tick.
    pub fn transforms(&self) -> Result<&[Transform]> {
        self.live_flock().map(|f| f.buffers.front().as_slice())
    }

    pub fn current_buffer_id(&self) -> Result<BufferId> {
        self.live_flock().map(|f| f.buffers.front().id())
    }

    pub fn noise_phases(&self) -> Result<&[f32]> {
        self.live_flock().map(|f| f.phases.as_slice())
    }

    pub fn agent_count(&self) -> usize {
        self.flock.as_ref().map_or(0, |f| f.buffers.len())
    }

    /// Simulation time accumulated from tick deltas; drives the speed noise.
    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    pub fn tick_count(&self) -> u64 {
        self.ticks
    }

    pub fn last_stats(&self) -> Option<&TickStats> {
        self.last_stats.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seeded(agent_count: usize) -> SimulationConfig {
        SimulationConfig {
            agent_count,
            seed: Some(42),
            ..SimulationConfig::default()
        }
    }

    #[test]
    fn lifecycle_transitions() {
        let mut sim = Simulation::new();
        assert_eq!(sim.state(), SimulationState::Uninitialized);
        assert_eq!(sim.step(0.1).err(), Some(FlockError::NotInitialized));

        sim.initialize(seeded(8)).unwrap();
        assert_eq!(sim.state(), SimulationState::Initialized);
        assert_eq!(sim.initialize(seeded(8)), Err(FlockError::AlreadyInitialized));

        sim.step(0.1).unwrap();
        assert_eq!(sim.state(), SimulationState::Initialized);

        sim.shutdown();
        sim.shutdown();
        assert_eq!(sim.state(), SimulationState::Shutdown);
        assert_eq!(sim.step(0.1).err(), Some(FlockError::ShutDown));
        assert_eq!(sim.transforms().err(), Some(FlockError::ShutDown));
        assert_eq!(sim.initialize(seeded(8)), Err(FlockError::ShutDown));
    }

    #[test]
    fn interrupted_tick_is_reported() {
        let mut sim = Simulation::with_config(seeded(4)).unwrap();
        // What a panic escaping the kernel leaves behind
        sim.state = SimulationState::Ticking;
        assert_eq!(sim.step(0.1).err(), Some(FlockError::TickInFlight));
    }

    #[test]
    fn rejects_bad_tick_inputs() {
        let mut sim = Simulation::with_config(seeded(4)).unwrap();
        assert!(matches!(
            sim.step(-0.01),
            Err(FlockError::Configuration { field: "delta_time", .. })
        ));
        let weights = Weights {
            rotation_speed: -1.0,
            ..Weights::default()
        };
        assert!(sim.tick(0.1, weights, None).is_err());
        assert!(sim.tick(0.1, Weights::default(), Some(Vec3::NAN)).is_err());
        assert!(sim.set_max_speed(-2.0).is_err());
        assert!(sim.set_separation_distance(f32::NAN).is_err());
        assert!(sim.set_wind(Vec3::new(f32::INFINITY, 0.0, 0.0)).is_err());
        assert_eq!(sim.wind(), Vec3::ZERO);

        // Rejected input leaves the flock untouched
        assert_eq!(sim.tick_count(), 0);
        assert_eq!(sim.state(), SimulationState::Initialized);
    }

    #[test]
    fn zero_delta_time_keeps_positions() {
        let mut sim = Simulation::with_config(seeded(16)).unwrap();
        let before = sim.transforms().unwrap().to_vec();
        let result = sim.step(0.0).unwrap();
        for (a, b) in before.iter().zip(result.transforms) {
            assert_eq!(a.position, b.position);
        }
    }

    #[test]
    fn sequential_and_parallel_ticks_agree() {
        let run = |mode, pipeline| {
            let mut sim = Simulation::with_config(SimulationConfig {
                mode,
                pipeline,
                ..seeded(24)
            })
            .unwrap();
            for _ in 0..4 {
                sim.step(0.05).unwrap();
            }
            assert_eq!(sim.last_stats().unwrap().mode, mode);
            (sim.transforms().unwrap().to_vec(), sim.flock_center().unwrap())
        };

        let reference = run(ExecutionMode::Sequential, Pipeline::Fused);
        assert_eq!(run(ExecutionMode::Sequential, Pipeline::Staged), reference);
        assert_eq!(run(ExecutionMode::Parallel, Pipeline::Fused), reference);
        assert_eq!(run(ExecutionMode::Parallel, Pipeline::Staged), reference);
    }

    #[test]
    fn elapsed_time_and_stats_advance() {
        let mut sim = Simulation::with_config(SimulationConfig {
            mode: ExecutionMode::Parallel,
            chunk_size: Some(5),
            ..seeded(20)
        })
        .unwrap();
        sim.step(0.25).unwrap();
        sim.step(0.25).unwrap();

        assert_eq!(sim.tick_count(), 2);
        assert!((sim.elapsed() - 0.5).abs() < 1.0e-6);
        let stats = sim.last_stats().unwrap();
        assert_eq!(stats.tick, 2);
        assert_eq!(stats.mode, ExecutionMode::Parallel);
        assert_eq!(stats.chunk_size, Some(5));
    }
}
