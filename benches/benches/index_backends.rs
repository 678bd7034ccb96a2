// Copyright 2025 the Tessera Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Backend comparison on pick-shaped workloads: many small dot bounds scattered across a
//! block of 256px tiles, probed by cursor points and drag rectangles.

use criterion::{
    BatchSize, BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main,
};
use tessera_index::{Aabb2D, Backend, FlatVec, Index, RTreeF64};

const TILE_PX: f64 = 256.0;

/// splitmix64; deterministic so runs are comparable.
struct Seq(u64);

impl Seq {
    fn unit(&mut self) -> f64 {
        self.0 = self.0.wrapping_add(0x9E37_79B9_7F4A_7C15);
        let mut z = self.0;
        z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
        z ^= z >> 31;
        (z >> 11) as f64 / (1_u64 << 53) as f64
    }
}

/// `count` dots of radius 1..=`max_radius` px inside a `tiles` x `tiles` block.
fn dot_bounds(count: usize, tiles: u32, max_radius: f64) -> Vec<Aabb2D<f64>> {
    let extent = f64::from(tiles) * TILE_PX;
    let mut seq = Seq(0x7E55_E2A0_0D07_5EED);
    (0..count)
        .map(|_| {
            let (x, y) = (seq.unit() * extent, seq.unit() * extent);
            let r = 1.0 + seq.unit() * (max_radius - 1.0);
            Aabb2D::new(x - r, y - r, x + r, y + r)
        })
        .collect()
}

fn cursor_points(count: usize, tiles: u32) -> Vec<(f64, f64)> {
    let extent = f64::from(tiles) * TILE_PX;
    let mut seq = Seq(0x00C0_FFEE);
    (0..count)
        .map(|_| (seq.unit() * extent, seq.unit() * extent))
        .collect()
}

fn drag_rects(count: usize, tiles: u32, max_side: f64) -> Vec<Aabb2D<f64>> {
    let extent = f64::from(tiles) * TILE_PX;
    let mut seq = Seq(0xD2A6_0000);
    (0..count)
        .map(|_| {
            let (x, y) = (seq.unit() * extent, seq.unit() * extent);
            Aabb2D::from_xywh(x, y, 2.0 + seq.unit() * max_side, 2.0 + seq.unit() * max_side)
        })
        .collect()
}

fn loaded<B: Backend<f64> + Default>(dots: &[Aabb2D<f64>]) -> Index<f64, u32, B> {
    let mut index = Index::new();
    index.extend(dots.iter().copied().zip(0..));
    index
}

fn per_backend(
    c: &mut Criterion,
    group: &str,
    elements: impl Fn(usize) -> u64,
    mut run: impl FnMut(&mut criterion::Bencher<'_>, usize, bool),
) {
    let mut group = c.benchmark_group(group);
    for &dots in &[1_000_usize, 10_000, 50_000] {
        group.throughput(Throughput::Elements(elements(dots)));
        group.bench_function(BenchmarkId::new("FlatVec", dots), |b| run(b, dots, false));
        group.bench_function(BenchmarkId::new("RTree", dots), |b| run(b, dots, true));
    }
    group.finish();
}

fn bench_tile_load(c: &mut Criterion) {
    fn run<B: Backend<f64> + Default>(b: &mut criterion::Bencher<'_>, dots: &[Aabb2D<f64>]) {
        b.iter_batched(
            Index::<f64, u32, B>::new,
            |mut index| {
                index.extend(dots.iter().copied().zip(0..));
                index
            },
            BatchSize::SmallInput,
        );
    }

    per_backend(c, "tile_load", |n| n as u64, |b, n, rtree| {
        let dots = dot_bounds(n, 4, 6.0);
        if rtree {
            run::<RTreeF64>(b, &dots);
        } else {
            run::<FlatVec<f64>>(b, &dots);
        }
    });
}

fn bench_cursor_pick(c: &mut Criterion) {
    fn run<B: Backend<f64> + Default>(
        b: &mut criterion::Bencher<'_>,
        dots: &[Aabb2D<f64>],
        points: &[(f64, f64)],
    ) {
        let index = loaded::<B>(dots);
        b.iter(|| {
            points
                .iter()
                .filter(|&&(x, y)| index.query_point(black_box(x), black_box(y)).next().is_some())
                .count()
        });
    }

    let points = cursor_points(1_000, 4);
    per_backend(c, "cursor_pick", |_| points.len() as u64, |b, n, rtree| {
        let dots = dot_bounds(n, 4, 6.0);
        if rtree {
            run::<RTreeF64>(b, &dots, &points);
        } else {
            run::<FlatVec<f64>>(b, &dots, &points);
        }
    });
}

fn bench_drag_select(c: &mut Criterion) {
    fn run<B: Backend<f64> + Default>(
        b: &mut criterion::Bencher<'_>,
        dots: &[Aabb2D<f64>],
        drags: &[Aabb2D<f64>],
    ) {
        let index = loaded::<B>(dots);
        b.iter(|| {
            drags
                .iter()
                .map(|&q| index.query_rect(black_box(q)).count())
                .sum::<usize>()
        });
    }

    let drags = drag_rects(500, 4, 64.0);
    per_backend(c, "drag_select", |_| drags.len() as u64, |b, n, rtree| {
        let dots = dot_bounds(n, 4, 6.0);
        if rtree {
            run::<RTreeF64>(b, &dots, &drags);
        } else {
            run::<FlatVec<f64>>(b, &dots, &drags);
        }
    });
}

fn bench_churn(c: &mut Criterion) {
    let dots = dot_bounds(10_000, 4, 6.0);
    c.bench_function("rtree_remove_reinsert_tile", |b| {
        b.iter_batched(
            || {
                let mut index = Index::<f64, u32, RTreeF64>::new();
                let keys = index.extend(dots.iter().copied().zip(0..));
                (index, keys)
            },
            |(mut index, keys)| {
                // Evict the first quarter, then reload it one dot at a time.
                for &key in &keys[..keys.len() / 4] {
                    index.remove(key);
                }
                for (i, &dot) in dots[..dots.len() / 4].iter().enumerate() {
                    index.insert(dot, i as u32);
                }
                index
            },
            BatchSize::SmallInput,
        );
    });
}

criterion_group!(
    benches,
    bench_tile_load,
    bench_cursor_pick,
    bench_drag_select,
    bench_churn
);
criterion_main!(benches);
