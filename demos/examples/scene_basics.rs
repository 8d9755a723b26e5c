// Copyright 2025 the Quilt Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Build a random scene, render it twice, and show how the second pass hits the cache.
//!
//! Run:
//! - `cargo run -p quilt_demos --example scene_basics`

use kurbo::{Point, Rect, Size};
use quilt_scene::{Color, Raster, Scene, SceneConfig, ShapeDesc, Surface};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const WIDTH: u32 = 960;
const HEIGHT: u32 = 640;

fn main() {
    let mut rng = StdRng::seed_from_u64(42);
    let descs: Vec<ShapeDesc> = (0..300)
        .map(|i| {
            let x = rng.gen_range(0.0..1500.0);
            let y = rng.gen_range(0.0..1000.0);
            let color = Color::rgb(rng.r#gen(), rng.r#gen(), rng.r#gen());
            let desc = if i % 2 == 0 {
                ShapeDesc::rect(x, y, rng.gen_range(10.0..80.0), rng.gen_range(10.0..80.0))
            } else {
                ShapeDesc::circle(Point::new(x, y), rng.gen_range(5.0..40.0))
            };
            desc.with_color(color).with_label(format!("shape {i}"))
        })
        .collect();

    let mut scene: Scene<Raster> = Scene::new(SceneConfig::default().with_tile_size(320)).unwrap();
    scene
        .resize(Size::new(f64::from(WIDTH), f64::from(HEIGHT)))
        .unwrap();
    scene.extend(descs).unwrap();
    println!(
        "{} shapes, {} visible tiles",
        scene.len(),
        scene.visible_tiles().len()
    );

    let mut target = Raster::create(WIDTH, HEIGHT);
    scene.render_scene(&mut target).unwrap();
    println!("after first render:  {:?}", scene.cache_stats());
    scene.render_scene(&mut target).unwrap();
    println!("after second render: {:?}", scene.cache_stats());
    println!("cached entries: {}", scene.tile_cache().len());

    let probe = Point::new(400.0, 300.0);
    match scene.hit_test(probe) {
        Some(id) => {
            let shape = scene.shape(id).unwrap();
            println!("topmost at {probe:?}: {id:?} ({})", shape.label());
        }
        None => println!("nothing at {probe:?}"),
    }

    let picked = scene.select_range(Rect::new(0.0, 0.0, 200.0, 200.0)).len();
    println!("{picked} shapes show through the top-left 200×200");
}
