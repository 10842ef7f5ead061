//! Criterion micro-benchmarks for secondary arena reservation and reset.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use lumen_arena::StackAllocator;
use lumen_core::{ParticleId, Secondary};
use rayon::prelude::*;

const CAPACITY: usize = 1 << 16;

fn secondary(i: usize) -> Secondary {
    Secondary {
        particle: ParticleId((i % 3) as u32),
        energy: i as f64,
        direction: [1.0, 0.0, 0.0],
    }
}

fn bench_allocate_serial(c: &mut Criterion) {
    let mut arena = StackAllocator::<Secondary>::new(CAPACITY);
    c.bench_function("allocate_serial_2x32k", |b| {
        b.iter(|| {
            arena.clear();
            for i in 0..CAPACITY / 2 {
                let r = arena.allocate(2).unwrap();
                r.write_all([secondary(i), secondary(i + 1)]).unwrap();
            }
            black_box(arena.size());
        });
    });
}

fn bench_allocate_parallel(c: &mut Criterion) {
    let mut arena = StackAllocator::<Secondary>::new(CAPACITY);
    c.bench_function("allocate_parallel_2x32k", |b| {
        b.iter(|| {
            arena.clear();
            (0..CAPACITY / 2).into_par_iter().for_each(|i| {
                if let Ok(r) = arena.allocate(2) {
                    let _ = r.write_all([secondary(i), secondary(i + 1)]);
                }
            });
            black_box(arena.size());
        });
    });
}

fn bench_exhausted_allocate(c: &mut Criterion) {
    let arena = StackAllocator::<Secondary>::new(4);
    let _ = arena.allocate(5);
    c.bench_function("allocate_when_exhausted", |b| {
        b.iter(|| black_box(arena.allocate(1).is_err()));
    });
}

fn bench_read_back(c: &mut Criterion) {
    let arena = StackAllocator::<Secondary>::new(CAPACITY);
    let r = arena.allocate(CAPACITY).unwrap();
    r.write_all((0..CAPACITY).map(secondary)).unwrap();
    let span = r.span();
    c.bench_function("read_back_64k", |b| {
        b.iter(|| black_box(arena.get(span).map(|s| s.energy).sum::<f64>()));
    });
}

criterion_group!(
    benches,
    bench_allocate_serial,
    bench_allocate_parallel,
    bench_exhausted_allocate,
    bench_read_back
);
criterion_main!(benches);
