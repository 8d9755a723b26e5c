// Copyright 2025 the Quilt Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use criterion::{BatchSize, Criterion, black_box, criterion_group, criterion_main};
use kurbo::{Point, Size, Vec2};
use quilt_scene::{Color, Raster, Scene, SceneConfig, ShapeDesc, ShapeId, Surface, TileCacheConfig};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const WIDTH: u32 = 1280;
const HEIGHT: u32 = 720;

fn gen_shapes(count: usize) -> Vec<ShapeDesc> {
    let mut rng = StdRng::seed_from_u64(0x5EED);
    (0..count)
        .map(|i| {
            let x = rng.gen_range(0.0..1800.0);
            let y = rng.gen_range(0.0..1200.0);
            let color = Color::rgb(rng.r#gen(), rng.r#gen(), rng.r#gen());
            let desc = match i % 3 {
                0 => ShapeDesc::rect(x, y, rng.gen_range(8.0..60.0), rng.gen_range(8.0..60.0)),
                1 => ShapeDesc::circle(Point::new(x, y), rng.gen_range(4.0..30.0)),
                _ => ShapeDesc::triangle(
                    Point::new(x, y),
                    Point::new(x + rng.gen_range(5.0..50.0), y),
                    Point::new(x, y + rng.gen_range(5.0..50.0)),
                ),
            };
            desc.with_color(color)
        })
        .collect()
}

fn scene(count: usize) -> Scene<Raster> {
    let config = SceneConfig::default()
        .with_tile_size(256)
        .with_tile_cache(TileCacheConfig::default().with_blocks(50, 200));
    let mut scene = Scene::new(config).expect("valid config");
    scene
        .resize(Size::new(f64::from(WIDTH), f64::from(HEIGHT)))
        .expect("resize");
    scene.extend(gen_shapes(count)).expect("valid shapes");
    scene
}

fn bench_render(c: &mut Criterion) {
    let mut group = c.benchmark_group("render");
    group.sample_size(20);
    for &n in &[500_usize, 2000] {
        group.bench_function(format!("cold_n{n}"), |b| {
            b.iter_batched(
                || (scene(n), Raster::create(WIDTH, HEIGHT)),
                |(mut scene, mut target)| {
                    scene.render_scene(&mut target).expect("render");
                    black_box(target.pixel(0, 0))
                },
                BatchSize::LargeInput,
            );
        });

        let mut warm = scene(n);
        let mut target = Raster::create(WIDTH, HEIGHT);
        warm.render_scene(&mut target).expect("render");
        group.bench_function(format!("cached_n{n}"), |b| {
            b.iter(|| {
                warm.render_scene(&mut target).expect("render");
                black_box(target.pixel(0, 0))
            });
        });

        let mut edited = scene(n);
        edited.render_scene(&mut target).expect("render");
        let mut step = 1.0;
        group.bench_function(format!("move_then_render_n{n}"), |b| {
            b.iter(|| {
                step = -step;
                let damage = edited
                    .move_shape(ShapeId(0), Vec2::new(step, 0.0))
                    .expect("move");
                edited.render_scene(&mut target).expect("render");
                black_box(damage.evicted.len())
            });
        });
    }
    group.finish();
}

fn bench_pan(c: &mut Criterion) {
    let mut group = c.benchmark_group("pan");
    group.sample_size(20);
    let mut scene = scene(1000);
    let mut target = Raster::create(WIDTH, HEIGHT);
    scene.render_scene(&mut target).expect("render");
    let mut dir = 1.0;
    group.bench_function("pan_across_tile_edge", |b| {
        b.iter(|| {
            dir = -dir;
            let changed = scene.pan(Vec2::new(300.0 * dir, 0.0)).expect("pan");
            scene.render_scene(&mut target).expect("render");
            black_box(changed)
        });
    });
    group.finish();
}

criterion_group!(benches, bench_render, bench_pan);
criterion_main!(benches);
