use criterion::{criterion_group, criterion_main, Criterion};
extern crate solenoid_field as lib;

use lib::constant::PI;
use lib::magnetic::layer_pool;
use lib::{EngineConfiguration, FieldPoint, GridFieldEngine, GridSpec, Solenoid};

fn reference_solenoid() -> Solenoid {
    Solenoid::new(0.25, 0.28, 1.31, 200.0, 0.0, 768, 64).expect("valid solenoid")
}

fn point_benchmark(c: &mut Criterion) {
    let solenoid = reference_solenoid();
    let polar = FieldPoint::polar(0.0, 0.0, 0.0);
    let cartesian = FieldPoint::cartesian(0.0, 0.0, 0.0);
    let pool = layer_pool(None).expect("could not build layer pool");

    c.bench_function("sequential polar point", |b| {
        b.iter(|| solenoid.field_at(&polar))
    });
    c.bench_function("sequential cartesian point", |b| {
        b.iter(|| solenoid.field_at(&cartesian))
    });
    c.bench_function("layer parallel polar point", |b| {
        b.iter(|| solenoid.field_at_parallel(&polar, &pool))
    });
    c.bench_function("layer parallel cartesian point", |b| {
        b.iter(|| solenoid.field_at_parallel(&cartesian, &pool))
    });
}

fn grid_benchmark(c: &mut Criterion) {
    let solenoid = reference_solenoid();
    let grid = GridSpec::new([0.0, 0.24], [0.0, 2.0 * PI], [-1.0, 1.0], [2, 2, 16])
        .expect("valid grid");
    let mut group = c.benchmark_group("grid");
    group.sample_size(10);
    for &workers in &[1, 2, 4, 8] {
        let engine = GridFieldEngine::new(&solenoid, EngineConfiguration::with_workers(workers))
            .expect("valid configuration");
        group.bench_function(format!("{} workers", workers), |b| {
            b.iter(|| engine.compute_grid(&grid).expect("grid computation failed"))
        });
    }
    group.finish();
}

criterion_group!(benches, point_benchmark, grid_benchmark);
criterion_main!(benches);
