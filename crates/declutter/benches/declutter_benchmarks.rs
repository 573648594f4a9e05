//! Benchmarks for a full selection pass.
//!
//! Run with: cargo bench --package declutter

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use declutter::Declutter;
use map_common::StationLevel;
use test_utils::{
    japan_bounds, mixed_level_catalog, national_viewport, random_catalog, tokyo_viewport,
};

fn bench_national_view(c: &mut Criterion) {
    let mut group = c.benchmark_group("declutter_national");
    let vp = national_viewport();

    for count in [500usize, 1700, 5000] {
        let catalog = random_catalog(42, count, &japan_bounds(), StationLevel::Coarse);
        group.bench_with_input(BenchmarkId::from_parameter(count), &catalog, |b, catalog| {
            b.iter(|| Declutter::default().run(black_box(catalog), &vp))
        });
    }

    group.finish();
}

fn bench_zoom_sweep(c: &mut Criterion) {
    let mut group = c.benchmark_group("declutter_zoom");
    let catalog = mixed_level_catalog(7, 2000, &japan_bounds());

    for zoom in [6u32, 8, 10, 12] {
        let vp = tokyo_viewport(zoom);
        group.bench_with_input(BenchmarkId::from_parameter(zoom), &vp, |b, vp| {
            b.iter(|| Declutter::default().run(black_box(&catalog), vp))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_national_view, bench_zoom_sweep);
criterion_main!(benches);
