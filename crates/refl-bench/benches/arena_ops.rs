//! Criterion micro-benchmarks for record allocation and name interning.

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, Criterion};
use refl_bench::header_profile;
use refl_core::{DeclAttrs, DeclKind};
use refl_db::{DbConfig, DeclDb, StringPool};

fn bench_allocate_10k(c: &mut Criterion) {
    c.bench_function("allocate_10k", |b| {
        b.iter(|| {
            let mut db = DeclDb::with_config(&DbConfig::bare()).unwrap();
            for _ in 0..10_000 {
                black_box(db.allocate(DeclKind::Field, DeclAttrs::empty()).unwrap());
            }
            db
        });
    });
}

fn bench_intern_10k(c: &mut Criterion) {
    let names: Vec<String> = (0..10_000).map(|i| format!("field_{i}")).collect();
    c.bench_function("intern_10k", |b| {
        b.iter(|| {
            let mut pool = StringPool::new(128, false);
            for name in &names {
                black_box(pool.intern(name).unwrap());
            }
            pool
        });
    });
    c.bench_function("intern_10k_dedup", |b| {
        b.iter(|| {
            let mut pool = StringPool::new(128, true);
            for name in names.iter().cycle().take(20_000) {
                black_box(pool.intern(name).unwrap());
            }
            pool
        });
    });
}

fn bench_build_header(c: &mut Criterion) {
    c.bench_function("build_header_500x12", |b| {
        b.iter(|| header_profile(black_box(500), 12).unwrap());
    });
}

criterion_group!(
    benches,
    bench_allocate_10k,
    bench_intern_10k,
    bench_build_header
);
criterion_main!(benches);
