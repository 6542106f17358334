/*
 * Center Module
 *
 * Mean position of the flock, read from the same frozen buffer the kernel
 * reads during a tick. Hosts use it to recenter a following camera.
 */

use glam::Vec3;
use rayon::prelude::*;

use crate::boid::Transform;
use crate::params::ExecutionMode;

// Positions are summed in fixed-size blocks and the block sums are added in
// index order, so both modes give bit-identical results on any pool size
const BLOCK_SIZE: usize = 256;

fn block_sum(block: &[Transform]) -> Vec3 {
    block.iter().map(|t| t.position).sum()
}

pub fn reduce(agents: &[Transform], mode: ExecutionMode) -> Vec3 {
    if agents.is_empty() {
        return Vec3::ZERO;
    }

    let sum: Vec3 = match mode {
        ExecutionMode::Sequential => agents.chunks(BLOCK_SIZE).map(block_sum).sum(),
        ExecutionMode::Parallel | ExecutionMode::Auto => agents
            .par_chunks(BLOCK_SIZE)
            .map(block_sum)
            .collect::<Vec<_>>()
            .into_iter()
            .sum(),
    };

    sum / agents.len() as f32
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(points: &[[f32; 3]]) -> Vec<Transform> {
        points
            .iter()
            .map(|p| Transform::looking(Vec3::from_array(*p), Vec3::Z))
            .collect()
    }

    #[test]
    fn square_centers_on_its_middle() {
        let agents = at(&[[0.0, 0.0, 0.0], [2.0, 0.0, 0.0], [0.0, 2.0, 0.0], [2.0, 2.0, 0.0]]);
        for mode in [ExecutionMode::Sequential, ExecutionMode::Parallel] {
            assert!((reduce(&agents, mode) - Vec3::new(1.0, 1.0, 0.0)).length() < 1.0e-6);
        }
    }

    #[test]
    fn empty_flock_centers_on_origin() {
        assert_eq!(reduce(&[], ExecutionMode::Parallel), Vec3::ZERO);
    }

    #[test]
    fn parallel_matches_sequential_on_large_flocks() {
        let agents: Vec<Transform> = (0..5000)
            .map(|i| {
                let f = i as f32;
                Transform::looking(Vec3::new(f.sin() * 50.0, f * 0.01, f.cos() * 50.0), Vec3::Z)
            })
            .collect();
        let seq = reduce(&agents, ExecutionMode::Sequential);
        let par = reduce(&agents, ExecutionMode::Parallel);
        assert_eq!(seq, par);
        for _ in 0..8 {
            assert_eq!(reduce(&agents, ExecutionMode::Parallel), par);
        }
    }
}
