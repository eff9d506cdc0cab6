#![allow(clippy::expect_used, clippy::unwrap_used, missing_docs)]
//! Benchmark for map rendering and clustering.

use cheshire_viz::aggregate::BinGrid;
use cheshire_viz::prelude::*;
use cheshire_viz::scale::ProjectedPoint;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

fn geo_rows(n: usize) -> RowSet {
    RowSet::from_records((0..n).map(|i| {
        let t = i as f64 / n as f64;
        let lat = 40.0 + (t * 37.0 * std::f64::consts::PI).sin() * 2.0;
        let lon = -3.0 + (t * 11.0 * std::f64::consts::PI).cos() * 4.0;
        vec![("lat", Value::from(lat)), ("lon", Value::from(lon)), ("value", Value::from((i % 97) as f64))]
    }))
    .expect("row-set should build")
}

fn map_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("map");
    let rows = geo_rows(10_000);
    let viewport = Viewport::new(120, 40).expect("viewport should be valid");
    let ctx = RenderContext::default();

    for subtype in [
        MapSubtype::Points,
        MapSubtype::Clusters,
        MapSubtype::Density,
        MapSubtype::Heatmap,
        MapSubtype::BrailleHeatmap,
    ] {
        let options = ChartOptions::map(subtype);
        group.bench_with_input(BenchmarkId::from_parameter(format!("{subtype:?}")), &options, |b, opts| {
            b.iter(|| render(black_box(&rows), opts, viewport, &ctx).expect("render should succeed"));
        });
    }

    group.finish();
}

fn cluster_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("clusters");

    for n in [1_000usize, 10_000, 50_000] {
        let points: Vec<ProjectedPoint> = (0..n)
            .map(|i| ProjectedPoint {
                x: (i * 7919 % 240) as u32,
                y: (i * 104_729 % 160) as u32,
                weight: 1.0,
                key: None,
            })
            .collect();

        group.bench_with_input(BenchmarkId::from_parameter(n), &points, |b, pts| {
            b.iter(|| BinGrid::from_points(240, 160, black_box(pts)).clusters());
        });
    }

    group.finish();
}

criterion_group!(benches, map_benchmark, cluster_benchmark);
criterion_main!(benches);
