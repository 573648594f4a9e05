//! Benchmarks for field sampling and a full advection tick.
//!
//! Run with: cargo bench --package flow-field

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use flow_field::{IdwField, ParticleConfig, ParticleEngine};
use map_common::{LatLng, Viewport};
use test_utils::{japan_bounds, national_viewport, random_wind_samples};

fn bench_idw_sample(c: &mut Criterion) {
    let mut group = c.benchmark_group("idw_sample");
    let query = LatLng::new(36.0, 138.0);

    for count in [6usize, 50, 200] {
        let field = IdwField::new(random_wind_samples(1, count, &japan_bounds(), 10.0));
        group.bench_with_input(BenchmarkId::from_parameter(count), &field, |b, field| {
            b.iter(|| field.sample(black_box(query)))
        });
    }

    group.finish();
}

fn bench_tick(c: &mut Criterion) {
    let mut group = c.benchmark_group("advection_tick");
    group.sample_size(30);
    let vp = national_viewport();

    for samples in [6usize, 50] {
        let config = ParticleConfig {
            seed: Some(42),
            ..Default::default()
        };
        let mut engine = ParticleEngine::new(config, vp.size()).unwrap();
        engine.set_wind_samples(random_wind_samples(2, samples, &japan_bounds(), 10.0));
        engine.start();

        group.bench_function(BenchmarkId::from_parameter(samples), |b| {
            b.iter(|| engine.tick(black_box(&vp)))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_idw_sample, bench_tick);
criterion_main!(benches);
