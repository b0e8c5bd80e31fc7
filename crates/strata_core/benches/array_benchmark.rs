//! # DynamicArray Benchmark
//!
//! Push throughput under geometric growth, and the cost of the
//! uninitialised-resize fill path against element-by-element pushes.
//!
//! Run with: `cargo bench --package strata_core --bench array_benchmark`

#![allow(missing_docs)]
#![allow(unsafe_code)]

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use strata_core::{from_bytes, to_bytes, DynamicArray};

/// Benchmark: push_back from empty at several sizes.
fn bench_push_back(c: &mut Criterion) {
    let mut group = c.benchmark_group("push_back");

    for count in [1_000u64, 100_000, 1_000_000] {
        group.bench_with_input(BenchmarkId::from_parameter(count), &count, |b, &count| {
            b.iter(|| {
                let mut values = DynamicArray::new();
                for i in 0..count {
                    values.push_back(black_box(i));
                }
                values.len()
            });
        });
    }

    group.finish();
}

/// Benchmark: fill via resize_uninitialised, the bulk-write path.
fn bench_uninitialised_fill(c: &mut Criterion) {
    const COUNT: usize = 1_000_000;

    c.bench_function("resize_uninitialised_fill_1M", |b| {
        b.iter(|| {
            let mut values: DynamicArray<u64> = DynamicArray::new();
            // SAFETY: every slot is written below before any read.
            unsafe { values.resize_uninitialised(COUNT) };
            let base = values.as_mut_ptr();
            for i in 0..COUNT {
                // SAFETY: `i < len`; the slot is written without being read.
                unsafe { base.add(i).write(i as u64) };
            }
            black_box(values.len())
        });
    });
}

/// Benchmark: sum by iterator over a filled array.
fn bench_iterate(c: &mut Criterion) {
    let values: DynamicArray<u64> = (0..1_000_000).collect();

    c.bench_function("iterate_sum_1M", |b| {
        b.iter(|| black_box(values.iter().sum::<u64>()));
    });
}

/// Benchmark: wire encode and decode of 100k elements.
fn bench_wire_round_trip(c: &mut Criterion) {
    let values: DynamicArray<i32> = (0..100_000).collect();
    let encoded = to_bytes(&values);

    c.bench_function("wire_encode_100k", |b| {
        b.iter(|| black_box(to_bytes(&values)));
    });
    c.bench_function("wire_decode_100k", |b| {
        b.iter(|| black_box(from_bytes::<DynamicArray<i32>>(&encoded)));
    });
}

criterion_group!(
    benches,
    bench_push_back,
    bench_uninitialised_fill,
    bench_iterate,
    bench_wire_round_trip,
);

criterion_main!(benches);
