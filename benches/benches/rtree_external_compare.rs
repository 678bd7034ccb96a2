// Copyright 2025 the Tessera Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Compares the bundled R-tree with `rstar` on the same grid workloads.

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use rstar::primitives::Rectangle;
use rstar::{AABB, RTree as RStarTree};
use tessera_index::{Aabb2D, Index, RTreeF64};

fn gen_grid(n: usize, cell: f64, scale: f64) -> Vec<Aabb2D<f64>> {
    let mut out = Vec::with_capacity(n * n);
    for y in 0..n {
        for x in 0..n {
            out.push(Aabb2D::from_xywh(
                x as f64 * cell,
                y as f64 * cell,
                cell * scale,
                cell * scale,
            ));
        }
    }
    out
}

fn to_rstar(r: &Aabb2D<f64>) -> Rectangle<[f64; 2]> {
    Rectangle::from_corners([r.min_x, r.min_y], [r.max_x, r.max_y])
}

fn bench_bulk_load(c: &mut Criterion) {
    let mut group = c.benchmark_group("external_bulk_load");
    for &n in &[64usize, 128] {
        let rects = gen_grid(n, 10.0, 1.5);
        group.throughput(Throughput::Elements(rects.len() as u64));
        group.bench_function(BenchmarkId::new("tessera", n), |b| {
            b.iter(|| {
                let mut idx: Index<f64, u32, RTreeF64> = Index::new();
                idx.extend(rects.iter().copied().zip(0..));
                idx
            });
        });
        group.bench_function(BenchmarkId::new("rstar", n), |b| {
            b.iter(|| RStarTree::bulk_load(rects.iter().map(to_rstar).collect()));
        });
    }
    group.finish();
}

fn bench_point_queries(c: &mut Criterion) {
    let mut group = c.benchmark_group("external_point_queries");
    for &n in &[64usize, 128] {
        let rects = gen_grid(n, 10.0, 1.5);
        let extent = n as f64 * 10.0;
        let points: Vec<(f64, f64)> = (0..1000)
            .map(|i| {
                let t = i as f64 / 1000.0;
                ((t * 7919.0) % extent, (t * 104_729.0) % extent)
            })
            .collect();

        let mut ours: Index<f64, u32, RTreeF64> = Index::new();
        ours.extend(rects.iter().copied().zip(0..));
        let theirs = RStarTree::bulk_load(rects.iter().map(to_rstar).collect());

        group.throughput(Throughput::Elements(points.len() as u64));
        group.bench_function(BenchmarkId::new("tessera", n), |b| {
            b.iter(|| {
                points
                    .iter()
                    .map(|&(x, y)| ours.query_point(black_box(x), black_box(y)).count())
                    .sum::<usize>()
            });
        });
        group.bench_function(BenchmarkId::new("rstar", n), |b| {
            b.iter(|| {
                points
                    .iter()
                    .map(|&(x, y)| theirs.locate_all_at_point(&black_box([x, y])).count())
                    .sum::<usize>()
            });
        });
        group.bench_function(BenchmarkId::new("rstar_envelope", n), |b| {
            b.iter(|| {
                points
                    .iter()
                    .map(|&(x, y)| {
                        let env = AABB::from_point(black_box([x, y]));
                        theirs.locate_in_envelope_intersecting(&env).count()
                    })
                    .sum::<usize>()
            });
        });
    }
    group.finish();
}

criterion_group!(benches, bench_bulk_load, bench_point_queries);
criterion_main!(benches);
