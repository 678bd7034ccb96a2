// Copyright 2025 the Tessera Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use tessera_lru::EvictionCache;

fn bench_insert_evict(c: &mut Criterion) {
    let mut group = c.benchmark_group("lru_insert_evict");
    for &cap in &[64usize, 1024, 16_384] {
        let ops = cap * 4;
        group.throughput(Throughput::Elements(ops as u64));
        group.bench_function(BenchmarkId::from_parameter(cap), |b| {
            b.iter(|| {
                let mut evicted = 0usize;
                let mut cache = EvictionCache::with_listener(cap, |_k: u64, _v: u64| evicted += 1);
                for k in 0..ops as u64 {
                    cache.insert(black_box(k), k);
                }
                drop(cache);
                evicted
            });
        });
    }
    group.finish();
}

fn bench_hot_set_gets(c: &mut Criterion) {
    let mut group = c.benchmark_group("lru_hot_set_get");
    for &cap in &[64usize, 1024, 16_384] {
        let mut cache = EvictionCache::new(cap);
        for k in 0..cap as u64 {
            cache.insert(k, k);
        }
        let ops = 10_000usize;
        group.throughput(Throughput::Elements(ops as u64));
        group.bench_function(BenchmarkId::from_parameter(cap), |b| {
            b.iter(|| {
                let mut sum = 0u64;
                // Stride through the keys so every get moves an entry to the front.
                for i in 0..ops as u64 {
                    let k = (i * 7) % cap as u64;
                    sum += cache.get(&black_box(k)).copied().unwrap_or(0);
                }
                sum
            });
        });
    }
    group.finish();
}

fn bench_mixed_churn(c: &mut Criterion) {
    let mut group = c.benchmark_group("lru_mixed_churn");
    let cap = 4096usize;
    let ops = 20_000usize;
    group.throughput(Throughput::Elements(ops as u64));
    group.bench_function("get_or_insert", |b| {
        b.iter(|| {
            let mut cache = EvictionCache::new(cap);
            let mut misses = 0usize;
            let mut x = 0x2545_F491_4F6C_DD1D_u64;
            for _ in 0..ops {
                x ^= x << 13;
                x ^= x >> 7;
                x ^= x << 17;
                // Keys span twice the capacity, so roughly half the lookups miss.
                let k = x % (cap as u64 * 2);
                if cache.get(&k).is_none() {
                    misses += 1;
                    cache.insert(k, k);
                }
            }
            misses
        });
    });
    group.finish();
}

criterion_group!(
    benches,
    bench_insert_evict,
    bench_hot_set_gets,
    bench_mixed_churn
);
criterion_main!(benches);
