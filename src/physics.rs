/*
 * Physics Module
 *
 * The flocking kernel. For one agent it reads every other agent out of the
 * frozen previous-tick buffer and produces that agent's next transform:
 * - Separation: linear fall-off repulsion from agents closer than the threshold
 * - Alignment: the mean heading of the rest of the flock
 * - Cohesion: a unit vector toward the mean position of the rest of the flock
 * - Tendency: a unit vector toward the goal, when one is set
 * - Wind: a constant drift shared by the whole flock
 * The weighted sum becomes a target heading that the agent turns toward
 * smoothly, and Perlin noise modulates its speed.
 *
 * Evaluation is a pure function of (read buffer, index, inputs), so the flock
 * can be split across threads in any order. Two dispatch pipelines are
 * provided: fused (all rules in one pass) and staged (one pass per rule
 * followed by an integration pass). Both produce bit-identical results.
 */

use glam::Vec3;
use rayon::prelude::*;

use crate::boid::Transform;
use crate::math::{self, EPSILON};
use crate::params::{ExecutionMode, Weights};

// Noise can add at most this fraction of max speed
pub const SPEED_NOISE_SCALE: f32 = 0.9;

// Quaternions closer than this (1 - |dot|) count as the same orientation
const ROTATION_EPSILON: f32 = 1.0e-7;

/// Everything the kernel needs besides the buffer, fixed for one tick.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct KernelParams {
    pub weights: Weights,
    /// Simulation time, the first noise coordinate.
    pub time: f32,
    pub delta_time: f32,
    pub separation_distance: f32,
    pub max_speed: f32,
    pub goal: Option<Vec3>,
    /// Constant drift added to every agent's steering direction.
    pub wind: Vec3,
}

impl KernelParams {
    // Weighted rule sum plus the flock-wide wind
    #[inline]
    pub fn direction(&self, steer: &Steering) -> Vec3 {
        steer.direction(&self.weights) + self.wind * self.weights.wind
    }
}

/// Unweighted per-rule contributions for one agent.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Steering {
    pub separation: Vec3,
    pub alignment: Vec3,
    pub cohesion: Vec3,
    pub tendency: Vec3,
}

impl Steering {
    // Combine the rules; each weight scales only its own term
    #[inline]
    pub fn direction(&self, weights: &Weights) -> Vec3 {
        self.separation * weights.separation
            + self.alignment * weights.alignment
            + self.cohesion * weights.cohesion
            + self.tendency * weights.tendency
    }
}

// Repulsion of `current` away from `other`: zero at and beyond `max_dist`,
// and zero for coincident agents instead of dividing by zero
#[inline]
pub fn separation_vector(current: Vec3, other: Vec3, max_dist: f32) -> Vec3 {
    let diff = current - other;
    let dist = diff.length();
    if dist <= EPSILON || dist >= max_dist {
        return Vec3::ZERO;
    }

    let scalar = (1.0 - dist / max_dist).clamp(0.0, 1.0);
    diff * (scalar / dist)
}

// 1 / (N - 1), or zero when there is nobody else to average over
#[inline]
fn peer_scale(count: usize) -> f32 {
    if count <= 1 {
        0.0
    } else {
        1.0 / (count - 1) as f32
    }
}

#[inline]
fn finish_alignment(sum: Vec3, count: usize) -> Vec3 {
    sum * peer_scale(count)
}

#[inline]
fn finish_cohesion(sum: Vec3, position: Vec3, count: usize) -> Vec3 {
    if count <= 1 {
        return Vec3::ZERO;
    }
    math::normalize_safe(sum * peer_scale(count) - position)
}

pub fn separation(agents: &[Transform], index: usize, max_dist: f32) -> Vec3 {
    let current = agents[index].position;
    let mut separation = Vec3::ZERO;
    for (j, other) in agents.iter().enumerate() {
        if j == index {
            continue;
        }
        separation += separation_vector(current, other.position, max_dist);
    }
    separation
}

pub fn alignment(agents: &[Transform], index: usize) -> Vec3 {
    let mut alignment = Vec3::ZERO;
    for (j, other) in agents.iter().enumerate() {
        if j == index {
            continue;
        }
        alignment += other.forward();
    }
    finish_alignment(alignment, agents.len())
}

pub fn cohesion(agents: &[Transform], index: usize) -> Vec3 {
    let mut cohesion = Vec3::ZERO;
    for (j, other) in agents.iter().enumerate() {
        if j == index {
            continue;
        }
        cohesion += other.position;
    }
    finish_cohesion(cohesion, agents[index].position, agents.len())
}

#[inline]
pub fn tendency(position: Vec3, goal: Option<Vec3>) -> Vec3 {
    match goal {
        Some(goal) => math::normalize_safe(goal - position),
        None => Vec3::ZERO,
    }
}

// All four rules in a single sweep over the flock
pub fn steering(
    agents: &[Transform],
    index: usize,
    separation_distance: f32,
    goal: Option<Vec3>,
) -> Steering {
    let current = agents[index].position;

    let mut separation = Vec3::ZERO;
    let mut alignment = Vec3::ZERO;
    let mut cohesion = Vec3::ZERO;

    for (j, other) in agents.iter().enumerate() {
        if j == index {
            continue;
        }

        separation += separation_vector(current, other.position, separation_distance);
        alignment += other.forward();
        cohesion += other.position;
    }

    Steering {
        separation,
        alignment: finish_alignment(alignment, agents.len()),
        cohesion: finish_cohesion(cohesion, current, agents.len()),
        tendency: tendency(current, goal),
    }
}

// Turn toward `direction` and move forward at the noise-modulated speed
pub fn integrate(
    current: &Transform,
    direction: Vec3,
    noise_phase: f32,
    params: &KernelParams,
) -> Transform {
    let mut rotation = current.rotation.normalize();

    let target_dir = math::normalize_safe(direction);
    if target_dir != Vec3::ZERO {
        let heading = rotation * Vec3::Z;
        let target = (math::quaternion_between(heading, target_dir) * rotation).normalize();

        if 1.0 - target.dot(rotation).abs() > ROTATION_EPSILON {
            // Exponential approach: never reaches the target in a single tick
            let t = 1.0 - (-params.weights.rotation_speed * params.delta_time).exp();
            rotation = rotation.slerp(target, t).normalize();
        }
    }

    let forward = rotation * Vec3::Z;

    let pulse = (math::noise01(params.time, noise_phase) * 2.0 - 1.0).abs();
    let speed = params.max_speed * (1.0 + pulse * params.weights.noise * SPEED_NOISE_SCALE);

    Transform {
        position: current.position + forward * speed * params.delta_time,
        rotation,
    }
}

/// Compute the next transform of agent `index` from the frozen `agents` snapshot.
pub fn evaluate(
    agents: &[Transform],
    index: usize,
    noise_phase: f32,
    params: &KernelParams,
) -> Transform {
    let steer = steering(agents, index, params.separation_distance, params.goal);
    integrate(&agents[index], params.direction(&steer), noise_phase, params)
}

// Split evenly across the rayon pool
pub fn default_chunk_size(count: usize) -> usize {
    std::cmp::max(count / rayon::current_num_threads(), 1)
}

// Fill `out[i] = f(i)` for every index, either on this thread or in parallel
// chunks. `mode` must already be resolved.
fn for_each_agent<T, F>(out: &mut [T], mode: ExecutionMode, chunk_size: usize, f: F)
where
    T: Send,
    F: Fn(usize) -> T + Sync,
{
    match mode {
        ExecutionMode::Sequential => {
            for (i, slot) in out.iter_mut().enumerate() {
                *slot = f(i);
            }
        }
        ExecutionMode::Parallel | ExecutionMode::Auto => {
            let chunk_size = chunk_size.max(1);
            out.par_chunks_mut(chunk_size)
                .enumerate()
                .for_each(|(chunk_idx, chunk)| {
                    for (i_in_chunk, slot) in chunk.iter_mut().enumerate() {
                        *slot = f(chunk_idx * chunk_size + i_in_chunk);
                    }
                });
        }
    }
}

/// One pass per agent: read `src`, write `dst`.
pub fn run_fused(
    src: &[Transform],
    dst: &mut [Transform],
    phases: &[f32],
    params: &KernelParams,
    mode: ExecutionMode,
    chunk_size: usize,
) {
    debug_assert_eq!(src.len(), dst.len());
    debug_assert_eq!(src.len(), phases.len());

    for_each_agent(dst, mode, chunk_size, |i| evaluate(src, i, phases[i], params));
}

/// Per-rule scratch for the staged pipeline, reused across ticks.
#[derive(Clone, Debug, Default)]
pub struct StageScratch {
    separation: Vec<Vec3>,
    alignment: Vec<Vec3>,
    cohesion: Vec<Vec3>,
    tendency: Vec<Vec3>,
}

impl StageScratch {
    pub fn with_capacity(count: usize) -> Self {
        let mut scratch = Self::default();
        scratch.resize(count);
        scratch
    }

    fn resize(&mut self, count: usize) {
        self.separation.resize(count, Vec3::ZERO);
        self.alignment.resize(count, Vec3::ZERO);
        self.cohesion.resize(count, Vec3::ZERO);
        self.tendency.resize(count, Vec3::ZERO);
    }

    pub fn steering(&self, index: usize) -> Steering {
        Steering {
            separation: self.separation[index],
            alignment: self.alignment[index],
            cohesion: self.cohesion[index],
            tendency: self.tendency[index],
        }
    }
}

/// Separation, alignment, cohesion and tendency as separate passes, each
/// completing before the next starts, then integration into `dst`.
pub fn run_staged(
    src: &[Transform],
    dst: &mut [Transform],
    phases: &[f32],
    params: &KernelParams,
    mode: ExecutionMode,
    chunk_size: usize,
    scratch: &mut StageScratch,
) {
    debug_assert_eq!(src.len(), dst.len());
    debug_assert_eq!(src.len(), phases.len());

    scratch.resize(src.len());

    let max_dist = params.separation_distance;
    for_each_agent(&mut scratch.separation, mode, chunk_size, |i| {
        separation(src, i, max_dist)
    });
    for_each_agent(&mut scratch.alignment, mode, chunk_size, |i| alignment(src, i));
    for_each_agent(&mut scratch.cohesion, mode, chunk_size, |i| cohesion(src, i));
    for_each_agent(&mut scratch.tendency, mode, chunk_size, |i| {
        tendency(src[i].position, params.goal)
    });

    let scratch = &*scratch;
    for_each_agent(dst, mode, chunk_size, |i| {
        let direction = params.direction(&scratch.steering(i));
        integrate(&src[i], direction, phases[i], params)
    });
}
