/*
 * Simulation Parameters Module
 *
 * This module defines the tuning values for the flock:
 * - `Weights`: per-rule scaling, may change between any two ticks
 * - `SimulationConfig`: population and spawn settings fixed at initialization,
 *   plus the constants a host may retune per tick
 * - Execution mode and pipeline selection for the kernel
 * - Slider ranges and change detection for interactive hosts
 */

use glam::{Quat, Vec3};

use crate::error::{FlockError, Result};

// Below this population the parallel dispatch overhead outweighs the work
pub const PARALLEL_THRESHOLD: usize = 64;

/// Per-rule weights. Setting any one to zero removes exactly that rule.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Weights {
    pub cohesion: f32,
    pub separation: f32,
    pub alignment: f32,
    /// Pull toward the goal point, when one is set.
    pub tendency: f32,
    /// Scale of the configured wind vector.
    pub wind: f32,
    /// Amplitude of the speed noise.
    pub noise: f32,
    /// How fast headings turn toward the steering direction, per second.
    pub rotation_speed: f32,
}

impl Default for Weights {
    fn default() -> Self {
        Self {
            cohesion: 1.0,
            separation: 1.0,
            alignment: 1.0,
            tendency: 1.0,
            wind: 1.0,
            noise: 1.0,
            rotation_speed: 4.0,
        }
    }
}

impl Weights {
    // Every rule and the noise switched off; headings hold still
    pub fn zero() -> Self {
        Self {
            cohesion: 0.0,
            separation: 0.0,
            alignment: 0.0,
            tendency: 0.0,
            wind: 0.0,
            noise: 0.0,
            rotation_speed: 0.0,
        }
    }

    pub fn validate(&self) -> Result<()> {
        let fields = [
            ("weights.cohesion", self.cohesion),
            ("weights.separation", self.separation),
            ("weights.alignment", self.alignment),
            ("weights.tendency", self.tendency),
            ("weights.wind", self.wind),
            ("weights.noise", self.noise),
            ("weights.rotation_speed", self.rotation_speed),
        ];
        for (field, value) in fields {
            if !value.is_finite() {
                return Err(FlockError::config(field, format!("must be finite, got {value}")));
            }
        }
        if self.rotation_speed < 0.0 {
            return Err(FlockError::config(
                "weights.rotation_speed",
                format!("must be >= 0, got {}", self.rotation_speed),
            ));
        }
        Ok(())
    }
}

/// How the kernel is dispatched.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExecutionMode {
    /// Always split the flock across the rayon pool.
    Parallel,
    /// Run everything on the calling thread.
    Sequential,
    /// Sequential below `PARALLEL_THRESHOLD` agents, parallel otherwise.
    Auto,
}

impl ExecutionMode {
    pub fn resolve(self, agent_count: usize) -> ExecutionMode {
        match self {
            ExecutionMode::Auto if agent_count < PARALLEL_THRESHOLD => ExecutionMode::Sequential,
            ExecutionMode::Auto => ExecutionMode::Parallel,
            mode => mode,
        }
    }
}

/// How the rule passes are sequenced inside one tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Pipeline {
    /// One pass evaluates every rule per agent.
    Fused,
    /// One pass per rule into scratch, then an integration pass.
    Staged,
}

#[derive(Clone, Debug, PartialEq)]
pub struct SimulationConfig {
    pub agent_count: usize,
    pub spawn_radius: f32,
    pub origin: Vec3,
    pub spawn_rotation: Quat,
    /// Slerp factor from `spawn_rotation` toward a random rotation.
    pub spawn_jitter: f32,
    pub separation_distance: f32,
    pub max_speed: f32,
    pub goal: Option<Vec3>,
    /// Constant drift applied to the whole flock, scaled by `weights.wind`.
    pub wind: Vec3,
    pub weights: Weights,
    /// `None` seeds from OS entropy.
    pub seed: Option<u64>,
    pub mode: ExecutionMode,
    pub pipeline: Pipeline,
    /// Agents per parallel task; `None` splits evenly across the pool.
    pub chunk_size: Option<usize>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            agent_count: 512,
            spawn_radius: 20.0,
            origin: Vec3::ZERO,
            spawn_rotation: Quat::IDENTITY,
            spawn_jitter: 0.3,
            separation_distance: 10.0,
            max_speed: 2.0,
            goal: None,
            wind: Vec3::ZERO,
            weights: Weights::default(),
            seed: None,
            mode: ExecutionMode::Auto,
            pipeline: Pipeline::Fused,
            chunk_size: None,
        }
    }
}

impl SimulationConfig {
    pub fn with_agents(agent_count: usize) -> Self {
        Self {
            agent_count,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.agent_count == 0 {
            return Err(FlockError::config("agent_count", "must be at least 1"));
        }
        if !self.spawn_radius.is_finite() || self.spawn_radius < 0.0 {
            return Err(FlockError::config(
                "spawn_radius",
                format!("must be finite and >= 0, got {}", self.spawn_radius),
            ));
        }
        if !self.origin.is_finite() {
            return Err(FlockError::config("origin", "must be finite"));
        }
        if !self.spawn_rotation.is_finite() || self.spawn_rotation.length_squared() == 0.0 {
            return Err(FlockError::config("spawn_rotation", "must be a finite non-zero quaternion"));
        }
        if !self.spawn_jitter.is_finite() || !(0.0..=1.0).contains(&self.spawn_jitter) {
            return Err(FlockError::config(
                "spawn_jitter",
                format!("must be within [0, 1], got {}", self.spawn_jitter),
            ));
        }
        validate_separation_distance(self.separation_distance)?;
        validate_max_speed(self.max_speed)?;
        validate_goal(self.goal)?;
        validate_wind(self.wind)?;
        if self.chunk_size == Some(0) {
            return Err(FlockError::config("chunk_size", "must be at least 1"));
        }
        self.weights.validate()
    }
}

pub(crate) fn validate_separation_distance(value: f32) -> Result<()> {
    if !value.is_finite() || value < 0.0 {
        return Err(FlockError::config(
            "separation_distance",
            format!("must be finite and >= 0, got {value}"),
        ));
    }
    Ok(())
}

pub(crate) fn validate_max_speed(value: f32) -> Result<()> {
    if !value.is_finite() || value < 0.0 {
        return Err(FlockError::config(
            "max_speed",
            format!("must be finite and >= 0, got {value}"),
        ));
    }
    Ok(())
}

pub(crate) fn validate_goal(goal: Option<Vec3>) -> Result<()> {
    match goal {
        Some(g) if !g.is_finite() => Err(FlockError::config("goal", "must be finite")),
        _ => Ok(()),
    }
}

pub(crate) fn validate_wind(wind: Vec3) -> Result<()> {
    if !wind.is_finite() {
        return Err(FlockError::config("wind", "must be finite"));
    }
    Ok(())
}

pub(crate) fn validate_delta_time(value: f32) -> Result<()> {
    if !value.is_finite() || value < 0.0 {
        return Err(FlockError::config(
            "delta_time",
            format!("must be finite and >= 0, got {value}"),
        ));
    }
    Ok(())
}

// A snapshot of tunable values used for change detection
#[derive(Clone, Debug, PartialEq)]
pub struct ParamSnapshot {
    agent_count: usize,
    separation_distance: f32,
    max_speed: f32,
    goal: Option<Vec3>,
    wind: Vec3,
    weights: Weights,
    mode: ExecutionMode,
    pipeline: Pipeline,
}

/// What changed between two snapshots.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ParamChanges {
    /// The population size changed; the flock must be re-initialized.
    pub needs_reset: bool,
    /// Anything changed at all.
    pub any: bool,
}

impl SimulationConfig {
    pub fn snapshot(&self) -> ParamSnapshot {
        ParamSnapshot {
            agent_count: self.agent_count,
            separation_distance: self.separation_distance,
            max_speed: self.max_speed,
            goal: self.goal,
            wind: self.wind,
            weights: self.weights,
            mode: self.mode,
            pipeline: self.pipeline,
        }
    }

    pub fn detect_changes(&self, previous: &ParamSnapshot) -> ParamChanges {
        let current = self.snapshot();
        ParamChanges {
            needs_reset: current.agent_count != previous.agent_count,
            any: current != *previous,
        }
    }

    // Get parameter ranges for UI sliders
    pub fn agent_count_range() -> std::ops::RangeInclusive<usize> {
        2..=8192
    }

    pub fn max_speed_range() -> std::ops::RangeInclusive<f32> {
        0.0..=20.0
    }

    pub fn separation_distance_range() -> std::ops::RangeInclusive<f32> {
        0.0..=50.0
    }

    pub fn weight_range() -> std::ops::RangeInclusive<f32> {
        0.0..=3.0
    }

    pub fn rotation_speed_range() -> std::ops::RangeInclusive<f32> {
        0.0..=20.0
    }

    // Per-axis range for the wind vector
    pub fn wind_range() -> std::ops::RangeInclusive<f32> {
        -10.0..=10.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert!(SimulationConfig::default().validate().is_ok());
        assert!(Weights::default().validate().is_ok());
        assert!(Weights::zero().validate().is_ok());
    }

    #[test]
    fn rejects_bad_configuration() {
        let cases = [
            SimulationConfig::with_agents(0),
            SimulationConfig {
                separation_distance: -1.0,
                ..Default::default()
            },
            SimulationConfig {
                max_speed: -0.5,
                ..Default::default()
            },
            SimulationConfig {
                spawn_radius: f32::NAN,
                ..Default::default()
            },
            SimulationConfig {
                chunk_size: Some(0),
                ..Default::default()
            },
            SimulationConfig {
                goal: Some(Vec3::new(f32::INFINITY, 0.0, 0.0)),
                ..Default::default()
            },
            SimulationConfig {
                wind: Vec3::new(0.0, f32::NAN, 0.0),
                ..Default::default()
            },
        ];
        for config in cases {
            assert!(
                matches!(config.validate(), Err(FlockError::Configuration { .. })),
                "accepted {config:?}"
            );
        }
    }

    #[test]
    fn auto_mode_resolves_by_population() {
        assert_eq!(ExecutionMode::Auto.resolve(8), ExecutionMode::Sequential);
        assert_eq!(ExecutionMode::Auto.resolve(PARALLEL_THRESHOLD), ExecutionMode::Parallel);
        assert_eq!(ExecutionMode::Sequential.resolve(10_000), ExecutionMode::Sequential);
        assert_eq!(ExecutionMode::Parallel.resolve(2), ExecutionMode::Parallel);
    }

    #[test]
    fn change_detection_flags_population_resets() {
        let mut config = SimulationConfig::default();
        let before = config.snapshot();
        assert_eq!(config.detect_changes(&before), ParamChanges::default());

        config.weights.alignment = 2.0;
        let changes = config.detect_changes(&before);
        assert!(changes.any);
        assert!(!changes.needs_reset);

        let tuned = config.snapshot();
        config.wind = Vec3::X;
        let changes = config.detect_changes(&tuned);
        assert!(changes.any && !changes.needs_reset);

        config.agent_count = 100;
        assert!(config.detect_changes(&before).needs_reset);
    }
}
