//! Criterion benchmarks for the step loop on the reference shower.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use lumen_bench::{reference_input, reference_primaries, reference_profile, stress_input};
use lumen_engine::{DiagnosticSet, Stepper, Transporter};

fn bench_step_1k_slots(c: &mut Criterion) {
    let input = reference_input(42);
    let mut diagnostics = DiagnosticSet::new(&input);
    let mut stepper = Stepper::new(reference_profile(input)).unwrap();
    stepper.load_primaries(&reference_primaries(50_000, 10.0)).unwrap();

    // Warm up: fill every slot
    stepper.step(&mut diagnostics).unwrap();

    c.bench_function("step_1k_slots", |b| {
        b.iter(|| {
            if stepper.has_work() && stepper.steps() < stepper.max_steps() {
                black_box(stepper.step(&mut diagnostics).unwrap());
            }
        });
    });
}

fn bench_step_16k_slots(c: &mut Criterion) {
    let input = stress_input(42);
    let mut diagnostics = DiagnosticSet::new(&input);
    let mut stepper = Stepper::new(reference_profile(input)).unwrap();
    stepper.load_primaries(&reference_primaries(500_000, 10.0)).unwrap();

    stepper.step(&mut diagnostics).unwrap();

    c.bench_function("step_16k_slots", |b| {
        b.iter(|| {
            if stepper.has_work() && stepper.steps() < stepper.max_steps() {
                black_box(stepper.step(&mut diagnostics).unwrap());
            }
        });
    });
}

fn bench_full_run_256(c: &mut Criterion) {
    let primaries = reference_primaries(256, 10.0);
    let mut group = c.benchmark_group("full_run");
    group.sample_size(10);
    group.bench_function("256_photons", |b| {
        b.iter(|| {
            let transporter = Transporter::new(reference_profile(reference_input(42))).unwrap();
            black_box(transporter.run(&primaries).unwrap().fingerprint());
        });
    });
    group.finish();
}

criterion_group!(
    benches,
    bench_step_1k_slots,
    bench_step_16k_slots,
    bench_full_run_256
);
criterion_main!(benches);
