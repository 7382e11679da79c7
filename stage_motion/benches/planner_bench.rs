//! Planner and group pool benchmarks.
//!
//! Permutation expansion grows as N(N-1)*2; the pool benchmark measures one
//! uncontended acquire/release round trip against the simulated channel.

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use stage_hal::drivers::simulation::{SimChannel, into_shared};
use stage_motion::cycle::permutation_sequence;
use stage_motion::group::GroupPool;
use std::hint::black_box;
use std::time::Duration;

fn positions(n: usize) -> Vec<f64> {
    (0..n).map(|i| i as f64 * 2.5).collect()
}

fn bench_permutation_sequence(c: &mut Criterion) {
    let mut group = c.benchmark_group("permutation_sequence");
    for n in [4usize, 16, 64] {
        let input = positions(n);
        group.bench_with_input(BenchmarkId::from_parameter(n), &input, |b, input| {
            b.iter(|| permutation_sequence(black_box(input)));
        });
    }
    group.finish();
}

fn bench_pool_round_trip(c: &mut Criterion) {
    let sim = SimChannel::shared();
    let pool = GroupPool::new(into_shared(sim.clone()));

    c.bench_function("group_pool_acquire_release", |b| {
        b.iter(|| {
            let group = pool.acquire(&[], Duration::ZERO).unwrap();
            pool.release(black_box(&group)).unwrap();
            sim.lock().clear();
        });
    });
}

criterion_group!(benches, bench_permutation_sequence, bench_pool_round_trip);
criterion_main!(benches);
