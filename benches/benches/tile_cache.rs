// Copyright 2025 the Tessera Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use kurbo::Point;
use tessera_pyramid::{Coord, LoadTicket, TileCache, TileCacheConfig, TileEventMask, TileLayer};

struct Layer {
    tickets: Vec<LoadTicket>,
    center: Point,
}

impl TileLayer for Layer {
    fn request_tile(&mut self, ticket: LoadTicket) {
        self.tickets.push(ticket);
    }

    fn is_tile_visible(&self, _coord: Coord) -> bool {
        true
    }

    fn view_center(&self) -> Point {
        self.center
    }
}

/// The `side × side` tiles at zoom `z` starting at column/row `x0`, `y0`.
fn view(z: u32, x0: i64, y0: i64, side: i64) -> Vec<Coord> {
    let mut out = Vec::new();
    for y in y0..y0 + side {
        for x in x0..x0 + side {
            out.push(Coord::new(z, x, y));
        }
    }
    out
}

fn load(cache: &mut TileCache<u64, ()>, layer: &mut Layer, coords: &[Coord]) {
    cache.request_tiles(coords.iter().copied(), layer);
    for ticket in std::mem::take(&mut layer.tickets) {
        let uid = ticket.id().uid;
        cache.settle(ticket, Ok(uid), &*layer, 0);
    }
}

fn config() -> TileCacheConfig {
    TileCacheConfig::default()
        .with_capacity(512)
        .with_event_mask(TileEventMask::empty())
}

fn bench_pan(c: &mut Criterion) {
    let mut group = c.benchmark_group("tile_cache_pan");
    for &side in &[8i64, 16] {
        let frames: Vec<_> = (0..64).map(|step| view(10, step, step / 2, side)).collect();
        let tiles: usize = frames.iter().map(Vec::len).sum();
        group.throughput(Throughput::Elements(tiles as u64));
        group.bench_function(BenchmarkId::from_parameter(side), |b| {
            b.iter(|| {
                let mut cache = TileCache::new(config());
                let mut layer = Layer {
                    tickets: Vec::new(),
                    center: Point::new(0.5, 0.5),
                };
                for frame in &frames {
                    load(&mut cache, &mut layer, frame);
                    cache.drain_events().for_each(drop);
                }
                cache.len()
            });
        });
    }
    group.finish();
}

fn bench_lod_lookup(c: &mut Criterion) {
    let mut cache = TileCache::new(config());
    let mut layer = Layer {
        tickets: Vec::new(),
        center: Point::new(0.0, 0.0),
    };
    // Coarse coverage plus a scattering of finer tiles.
    load(&mut cache, &mut layer, &view(2, 0, 0, 4));
    load(&mut cache, &mut layer, &view(5, 0, 0, 12));
    load(&mut cache, &mut layer, &view(7, 8, 8, 16));

    let exact = view(5, 0, 0, 12);
    let missing = view(4, 0, 0, 16);
    let mut group = c.benchmark_group("tile_cache_available_lod");
    group.throughput(Throughput::Elements(exact.len() as u64));
    group.bench_function("exact", |b| {
        b.iter(|| {
            exact
                .iter()
                .filter_map(|c| cache.available_lod(black_box(*c)))
                .count()
        });
    });
    group.throughput(Throughput::Elements(missing.len() as u64));
    group.bench_function("fallback", |b| {
        b.iter(|| {
            missing
                .iter()
                .filter_map(|c| cache.available_lod(black_box(*c)))
                .map(|partials| partials.len())
                .sum::<usize>()
        });
    });
    group.finish();
}

criterion_group!(benches, bench_pan, bench_lod_lookup);
criterion_main!(benches);
