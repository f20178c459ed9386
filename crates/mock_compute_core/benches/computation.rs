//! Benchmarks for the compute-mode workload using Criterion.rs.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use mock_compute_core::workload::run_synthetic_computation;

fn bench_synthetic_computation(c: &mut Criterion) {
    let cases = vec![
        ("ring_small", 1_024usize, 1_000_000u64),
        ("ring_medium", 1 << 16, 1_000_000),
        ("ring_unbounded", 1 << 24, 1_000_000),
    ];

    let mut group = c.benchmark_group("synthetic_computation");
    for (name, ring_capacity, iterations) in cases {
        group.bench_with_input(
            BenchmarkId::from_parameter(name),
            &(ring_capacity, iterations),
            |b, &(ring_capacity, iterations)| {
                b.iter(|| black_box(run_synthetic_computation(ring_capacity, iterations)));
            },
        );
    }
    group.finish();
}

criterion_group!(benches, bench_synthetic_computation);
criterion_main!(benches);
