//! Benchmarks pour la génération des cotes et des aires

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use geo::{Geometry, LineString, Polygon};
use parcel_engine::labels::{area_collection, area_labels, length_collection, length_labels};
use parcel_engine::model::SubParcel;
use parcel_engine::{AttributeConfig, RenderedFeature};
use serde_json::json;

/// Polygone régulier à `n` sommets autour d'un centre, rayon ~20 m
fn regular_polygon(center: (f64, f64), n: usize) -> Geometry {
    let radius = 0.0002;
    let coords: Vec<(f64, f64)> = (0..n)
        .map(|i| {
            let t = i as f64 / n as f64 * std::f64::consts::TAU;
            (center.0 + radius * t.cos(), center.1 + radius * t.sin())
        })
        .collect();
    Geometry::Polygon(Polygon::new(LineString::from(coords), vec![]))
}

fn sub_parcels(count: usize, vertices: usize) -> Vec<SubParcel> {
    let attrs = AttributeConfig::default();
    (0..count)
        .filter_map(|i| {
            let feature = RenderedFeature::new(
                Some(format!("s{}", i)),
                regular_polygon((106.7 + i as f64 * 0.0005, 10.78), vertices),
                json!({ "gid": "G1", "dientich": 120.5, "chucnangsdd": "ODT" })
                    .as_object()
                    .cloned()
                    .unwrap_or_default(),
            );
            SubParcel::from_feature(&feature, &attrs, "?")
        })
        .collect()
}

fn bench_length_labels(c: &mut Criterion) {
    let mut group = c.benchmark_group("length_labels");

    for vertices in [4usize, 16, 64, 256] {
        let subs = sub_parcels(4, vertices);
        group.throughput(Throughput::Elements((4 * vertices) as u64));
        group.bench_with_input(BenchmarkId::from_parameter(vertices), &subs, |b, subs| {
            b.iter(|| {
                let labels = length_labels(black_box(subs));
                black_box(length_collection(&labels))
            })
        });
    }

    group.finish();
}

fn bench_area_labels(c: &mut Criterion) {
    let subs = sub_parcels(32, 32);

    c.bench_function("area_labels_32", |b| {
        b.iter(|| {
            let labels = area_labels(black_box(&subs));
            black_box(area_collection(&labels))
        })
    });
}

criterion_group!(benches, bench_length_labels, bench_area_labels);
criterion_main!(benches);
