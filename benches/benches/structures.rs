// Copyright 2025 the Quilt Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use criterion::{BatchSize, Criterion, Throughput, black_box, criterion_group, criterion_main};
use quilt_index::{Aabb2D, TickGrid};
use quilt_lru::LruCache;
use quilt_tiling::{RegionMask, TileCoord, TileId, tile_coord, tile_id};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn gen_random_rects(count: usize, world: f64, max_side: f64) -> Vec<Aabb2D<f64>> {
    let mut rng = StdRng::seed_from_u64(0xCAFE_F00D);
    (0..count)
        .map(|_| {
            let x = rng.gen_range(0.0..world);
            let y = rng.gen_range(0.0..world);
            let w = rng.gen_range(1.0..max_side);
            let h = rng.gen_range(1.0..max_side);
            Aabb2D::new(x, y, x + w, y + h)
        })
        .collect()
}

fn bench_tiling(c: &mut Criterion) {
    let mut group = c.benchmark_group("tiling");
    let side = 256_u32;
    group.throughput(Throughput::Elements(u64::from(side * side)));
    group.bench_function("tile_id_256x256", |b| {
        b.iter(|| {
            let mut acc = 0_u64;
            for y in 0..side {
                for x in 0..side {
                    acc ^= tile_id(TileCoord::new(x, y)).0;
                }
            }
            black_box(acc)
        });
    });
    group.bench_function("tile_coord_256x256", |b| {
        b.iter(|| {
            let mut acc = 0_u32;
            for id in 0..u64::from(side * side) {
                acc ^= tile_coord(TileId(id)).x;
            }
            black_box(acc)
        });
    });
    group.bench_function("mask_fill_and_scan", |b| {
        b.iter(|| {
            let mask = RegionMask::from_tiles((0..4096).step_by(3).map(TileId));
            black_box(mask.tile_ids().count())
        });
    });
    group.finish();
}

fn bench_lru(c: &mut Criterion) {
    let mut group = c.benchmark_group("lru");
    for &limit in &[64_usize, 2048] {
        let keys: Vec<u32> = {
            let mut rng = StdRng::seed_from_u64(7);
            (0..10_000).map(|_| rng.gen_range(0..(limit as u32 * 2))).collect()
        };
        group.throughput(Throughput::Elements(keys.len() as u64));
        group.bench_function(format!("churn_limit{limit}"), |b| {
            b.iter_batched(
                || LruCache::<u32, u64>::new(limit),
                |mut cache| {
                    for &k in &keys {
                        if cache.get(&k).is_none() {
                            cache.set(k, u64::from(k));
                        }
                    }
                    black_box(cache.stats())
                },
                BatchSize::SmallInput,
            );
        });
    }
    group.finish();
}

fn bench_tick_grid(c: &mut Criterion) {
    let mut group = c.benchmark_group("tick_grid");
    for &n in &[100_usize, 400, 1000] {
        let rects = gen_random_rects(n, 2000.0, 80.0);
        group.throughput(Throughput::Elements(n as u64));
        group.bench_function(format!("build_n{n}"), |b| {
            b.iter(|| {
                let grid = TickGrid::build(rects.iter().copied().zip(0_u32..));
                black_box(grid.len())
            });
        });

        let grid = TickGrid::build(rects.iter().copied().zip(0_u32..));
        group.bench_function(format!("query_point_n{n}"), |b| {
            let mut rng = StdRng::seed_from_u64(11);
            b.iter(|| {
                let x = rng.gen_range(0.0..2000.0);
                let y = rng.gen_range(0.0..2000.0);
                black_box(grid.query_point(x, y))
            });
        });
        group.bench_function(format!("query_rect_n{n}"), |b| {
            b.iter(|| {
                let hits = grid.query_rect(Aabb2D::new(500.0, 500.0, 900.0, 900.0));
                black_box(hits.len())
            });
        });
    }
    group.finish();
}

criterion_group!(benches, bench_tiling, bench_lru, bench_tick_grid);
criterion_main!(benches);
