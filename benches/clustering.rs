//! Benchmarks for neighbourhood clustering and the full inference pipeline.
//!
//! Run with: `cargo bench --bench clustering`
//! Compare with `--no-default-features` for the single-threaded path.

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use homeloc::synthetic::VisitScenario;
use homeloc::{
    ClusterConfig, DaySets, Haversine, InferenceConfig, MetricKind, PointRecord, cluster_points,
    cluster_with_metric, infer_home_work,
};
use std::hint::black_box;

fn bench_cluster_scaling(c: &mut Criterion) {
    let mut group = c.benchmark_group("cluster_scaling");
    group.sample_size(10);

    for per_place in [500, 2_000, 5_000] {
        let points = VisitScenario::commuter(per_place, 1).generate("bench");
        let config = ClusterConfig::new(0.01, 100);

        group.bench_with_input(
            BenchmarkId::new("haversine", points.len()),
            &points,
            |b, pts| b.iter(|| cluster_points(black_box(pts), &config)),
        );

        let accurate = config.clone().with_metric(MetricKind::AccuracyAware);
        group.bench_with_input(
            BenchmarkId::new("accuracy_aware", points.len()),
            &points,
            |b, pts| b.iter(|| cluster_points(black_box(pts), &accurate)),
        );
    }

    group.finish();
}

fn bench_index_vs_full_scan(c: &mut Criterion) {
    let mut group = c.benchmark_group("index_vs_full_scan");
    group.sample_size(10);

    let points = VisitScenario::commuter(1_000, 2).generate("bench");
    let unpruned = |a: &PointRecord, b: &PointRecord| {
        use homeloc::DistanceMetric;
        Haversine.distance(a, b)
    };

    group.bench_function("rtree", |b| {
        b.iter(|| cluster_with_metric(black_box(&points), 0.01, 100, &Haversine))
    });
    group.bench_function("full_scan", |b| {
        b.iter(|| cluster_with_metric(black_box(&points), 0.01, 100, &unpruned))
    });

    group.finish();
}

fn bench_pipeline(c: &mut Criterion) {
    let points = VisitScenario::commuter(2_500, 3).generate("bench");
    let config = InferenceConfig::new(ClusterConfig::new(0.05, 50), DaySets::reference_window());

    c.bench_function("infer_home_work_5k", |b| {
        b.iter(|| infer_home_work(black_box(&points), &config))
    });
}

criterion_group!(
    benches,
    bench_cluster_scaling,
    bench_index_vs_full_scan,
    bench_pipeline
);
criterion_main!(benches);
