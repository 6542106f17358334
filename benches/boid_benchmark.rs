/*
 * Boid Flock Benchmark
 *
 * Measures the O(N²) steering kernel in both pipelines and execution modes,
 * the flock-center reducer, and a full driver tick, so the parallel speedup
 * and the cost of the staged passes can be compared directly.
 */

use boid_flock::center;
use boid_flock::physics::{self, KernelParams, StageScratch};
use boid_flock::{ExecutionMode, Pipeline, Simulation, SimulationConfig, Transform, Weights};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use glam::{Quat, Vec3};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::time::Duration;

const SIZES: [usize; 4] = [64, 256, 1024, 2048];

fn flock(n: usize) -> (Vec<Transform>, Vec<f32>) {
    let mut rng = StdRng::seed_from_u64(7);
    let transforms = (0..n)
        .map(|_| Transform::random(&mut rng, Vec3::ZERO, 40.0, Quat::IDENTITY, 0.5))
        .collect();
    let phases = (0..n).map(|i| i as f32 * 0.37).collect();
    (transforms, phases)
}

fn kernel_params() -> KernelParams {
    KernelParams {
        weights: Weights::default(),
        time: 1.5,
        delta_time: 1.0 / 60.0,
        separation_distance: 10.0,
        max_speed: 2.0,
        goal: Some(Vec3::new(0.0, 0.0, 100.0)),
        wind: Vec3::new(0.2, 0.0, 0.0),
    }
}

// Benchmark the fused kernel, sequential versus parallel
fn bench_fused_kernel(c: &mut Criterion) {
    let mut group = c.benchmark_group("fused_kernel");
    let params = kernel_params();

    for &n in SIZES.iter() {
        let (src, phases) = flock(n);
        let mut dst = src.clone();
        let chunk = physics::default_chunk_size(n);

        for mode in [ExecutionMode::Sequential, ExecutionMode::Parallel] {
            group.bench_with_input(BenchmarkId::new(format!("{:?}", mode), n), &n, |b, _| {
                b.iter(|| {
                    physics::run_fused(black_box(&src), &mut dst, &phases, &params, mode, chunk);
                    black_box(&dst);
                });
            });
        }
    }

    group.finish();
}

// Benchmark the staged pipeline with its scratch reused across iterations
fn bench_staged_kernel(c: &mut Criterion) {
    let mut group = c.benchmark_group("staged_kernel");
    let params = kernel_params();

    for &n in SIZES.iter() {
        let (src, phases) = flock(n);
        let mut dst = src.clone();
        let mut scratch = StageScratch::with_capacity(n);
        let chunk = physics::default_chunk_size(n);

        group.bench_with_input(BenchmarkId::from_parameter(n), &n, |b, _| {
            b.iter(|| {
                physics::run_staged(
                    black_box(&src),
                    &mut dst,
                    &phases,
                    &params,
                    ExecutionMode::Parallel,
                    chunk,
                    &mut scratch,
                );
                black_box(&dst);
            });
        });
    }

    group.finish();
}

// Benchmark the flock-center reduction
fn bench_center(c: &mut Criterion) {
    let mut group = c.benchmark_group("flock_center");

    for &n in [1024usize, 16384].iter() {
        let (transforms, _) = flock(n);
        for mode in [ExecutionMode::Sequential, ExecutionMode::Parallel] {
            group.bench_with_input(BenchmarkId::new(format!("{:?}", mode), n), &n, |b, _| {
                b.iter(|| black_box(center::reduce(black_box(&transforms), mode)));
            });
        }
    }

    group.finish();
}

// Benchmark complete ticks through the driver
fn bench_tick(c: &mut Criterion) {
    let mut group = c.benchmark_group("simulation_tick");
    group.measurement_time(Duration::from_secs(10));

    for &n in SIZES.iter() {
        for pipeline in [Pipeline::Fused, Pipeline::Staged] {
            let mut sim = Simulation::with_config(SimulationConfig {
                agent_count: n,
                seed: Some(11),
                pipeline,
                ..SimulationConfig::default()
            })
            .unwrap();

            group.bench_with_input(BenchmarkId::new(format!("{:?}", pipeline), n), &n, |b, _| {
                b.iter(|| {
                    let result = sim.step(1.0 / 60.0).unwrap();
                    black_box(result.flock_center);
                });
            });
        }
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_fused_kernel,
    bench_staged_kernel,
    bench_center,
    bench_tick
);
criterion_main!(benches);
