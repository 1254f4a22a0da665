//! Benchmarks for marker clustering.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use tablemate_core::config::ClusterConfig;
use tablemate_core::Restaurant;
use tablemate_discovery::ClusterEngine;
use tablemate_geo::BoundingBox;

fn create_restaurants(count: usize) -> Vec<Restaurant> {
    (0..count)
        .map(|i| {
            let lat = 37.45 + (i as f64 * 0.00137) % 0.15;
            let lng = 126.90 + (i as f64 * 0.00091) % 0.20;
            Restaurant::new(i.to_string(), format!("restaurant {}", i)).at(lat, lng)
        })
        .collect()
}

fn bench_cluster_by_zoom(c: &mut Criterion) {
    let engine = ClusterEngine::new(ClusterConfig::default(), BoundingBox::SOUTH_KOREA);
    let restaurants = create_restaurants(500);
    let mut group = c.benchmark_group("cluster_500");

    for zoom in [11.0, 14.0, 17.0] {
        group.bench_with_input(BenchmarkId::from_parameter(zoom), &zoom, |b, &zoom| {
            b.iter(|| engine.cluster(black_box(&restaurants), zoom))
        });
    }

    group.finish();
}

fn bench_cluster_by_size(c: &mut Criterion) {
    let engine = ClusterEngine::new(ClusterConfig::default(), BoundingBox::SOUTH_KOREA);
    let mut group = c.benchmark_group("cluster_zoom_14");

    for size in [100, 1000, 2000] {
        let restaurants = create_restaurants(size);
        group.bench_with_input(BenchmarkId::from_parameter(size), &restaurants, |b, restaurants| {
            b.iter(|| engine.cluster(black_box(restaurants), 14.0))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_cluster_by_zoom, bench_cluster_by_size);
criterion_main!(benches);
