//! # StructureOfArrays Benchmark
//!
//! Column-streaming updates against the row-at-a-time accessors, plus
//! swap-remove churn.
//!
//! Run with: `cargo bench --package strata_core --bench soa_benchmark`

#![allow(missing_docs)]

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use strata_core::StructureOfArrays;

const ROWS: usize = 100_000;

type Particles = StructureOfArrays<(f32, f32, f32, f32)>;

fn particles() -> Particles {
    let mut soa = Particles::new();
    soa.reserve(ROWS);
    for i in 0..ROWS {
        soa.push_row((i as f32, 0.0, 1.0, 0.5));
    }
    soa
}

/// Benchmark: integrate one column from another through slices.
fn bench_column_update(c: &mut Criterion) {
    let mut soa = particles();

    c.bench_function("soa_column_update_100k", |b| {
        b.iter(|| {
            let velocity: Vec<f32> = soa.data_slice::<2>().to_vec();
            for (x, v) in soa.data_slice_mut::<0>().iter_mut().zip(&velocity) {
                *x += v * 0.016;
            }
            black_box(soa.data_slice::<0>()[0])
        });
    });
}

/// Benchmark: the same update through per-row accessors.
fn bench_row_update(c: &mut Criterion) {
    let mut soa = particles();

    c.bench_function("soa_row_update_100k", |b| {
        b.iter(|| {
            for row in 0..soa.len() {
                let v = *soa.at::<2>(row);
                *soa.at_mut::<0>(row) += v * 0.016;
            }
            black_box(*soa.at::<0>(0))
        });
    });
}

/// Benchmark: push then swap-remove every row from the front.
fn bench_push_remove_churn(c: &mut Criterion) {
    c.bench_function("soa_push_remove_10k", |b| {
        b.iter(|| {
            let mut soa = Particles::new();
            for _ in 0..10_000 {
                soa.push_back();
            }
            while !soa.is_empty() {
                soa.remove_at(0);
            }
            black_box(soa.len())
        });
    });
}

criterion_group!(
    benches,
    bench_column_update,
    bench_row_update,
    bench_push_remove_churn,
);
criterion_main!(benches);
