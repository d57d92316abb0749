//! Benchmarks for BVH construction and queries.
//!
//! Run with: cargo bench -p vcad-kernel-bvh

#![allow(missing_docs)]

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use vcad_kernel_bvh::{Aabb3, BuildOptions, Bvh, Point3, Primitive, Ray, SplitMethod, Vec3};

/// A jittered grid of small blocks, roughly what a fixture plate with many
/// clamps and bolts looks like.
fn grid_scene(side: usize) -> Vec<Primitive<usize>> {
    let mut prims = Vec::with_capacity(side * side * side);
    for x in 0..side {
        for y in 0..side {
            for z in 0..side {
                let i = prims.len();
                let jitter = (i % 7) as f64 * 0.05;
                let min = [x as f64 * 2.0 + jitter, y as f64 * 2.0, z as f64 * 2.0 - jitter];
                let max = [min[0] + 1.5, min[1] + 1.0, min[2] + 1.25];
                prims.push(Primitive::new(i, Aabb3::from_arrays(min, max)));
            }
        }
    }
    prims
}

fn bench_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("build");
    for method in [SplitMethod::Sah, SplitMethod::Median, SplitMethod::Equal] {
        let options = BuildOptions {
            split_method: method,
            ..Default::default()
        };
        group.bench_with_input(
            BenchmarkId::new(format!("{method:?}"), 4096),
            &options,
            |b, options| {
                b.iter(|| Bvh::build(black_box(grid_scene(16)), options));
            },
        );
    }
    group.finish();
}

fn bench_queries(c: &mut Criterion) {
    let bvh = Bvh::build(grid_scene(16), &BuildOptions::default()).unwrap();
    let region = Aabb3::from_arrays([10.0, 10.0, 10.0], [14.0, 14.0, 14.0]);

    c.bench_function("query", |b| {
        b.iter(|| bvh.query(black_box(&region)));
    });

    c.bench_function("find_unique_pairs", |b| {
        b.iter(|| bvh.find_unique_pairs());
    });

    let boxes = Bvh::build(
        grid_scene(16)
            .into_iter()
            .map(|p| Primitive::new(p.aabb, p.aabb))
            .collect(),
        &BuildOptions::default(),
    )
    .unwrap();
    let ray = Ray::new(Point3::new(-5.0, 7.3, 9.1), Vec3::new(1.0, 0.1, 0.05));
    c.bench_function("raycast", |b| {
        b.iter(|| boxes.raycast(black_box(&ray), f64::INFINITY));
    });
}

criterion_group!(benches, bench_build, bench_queries);
criterion_main!(benches);
