//! Criterion benchmarks replaying seeded churn workloads.

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use heapmm_alloc::{FreeListHeap, HeapConfig};
use heapmm_bench::{generate, replay, ChurnProfile};

const SEED: u64 = 42;

fn bench_churn(c: &mut Criterion) {
    let mut group = c.benchmark_group("churn");
    group.sample_size(20);

    for (name, profile) in [
        ("alloc_free", ChurnProfile::alloc_free().with_steps(20_000)),
        ("mixed", ChurnProfile::mixed().with_steps(20_000)),
    ] {
        let ops = generate(&profile, SEED);
        group.throughput(Throughput::Elements(ops.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(name), &ops, |b, ops| {
            b.iter(|| {
                let mut heap = FreeListHeap::new(HeapConfig::with_capacity(1 << 30)).unwrap();
                black_box(replay(&mut heap, ops))
            });
        });
    }
    group.finish();
}

criterion_group!(benches, bench_churn);
criterion_main!(benches);
