// Copyright 2025 the Quilt Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Drive a scene with pointer events: drag a shape, pan the camera, zoom with the wheel.
//!
//! Each step prints which tiles were invalidated and how the cache behaved on the next
//! render.
//!
//! Run:
//! - `cargo run -p quilt_demos --example scene_interaction`

use kurbo::{Point, Size};
use quilt_scene::{Color, Damage, Raster, Scene, SceneConfig, ShapeDesc, ShapeId, Surface};

fn report(step: &str, damage: Option<&Damage>, scene: &mut Scene<Raster>, target: &mut Raster) {
    let before = scene.cache_stats();
    scene.render_scene(target).unwrap();
    let after = scene.cache_stats();
    let tiles: Vec<_> = damage
        .map(|d| d.tiles.tile_ids().map(|t| t.0).collect())
        .unwrap_or_default();
    println!(
        "{step:<24} damaged tiles {tiles:?}, render: {} hits, {} misses",
        after.hits - before.hits,
        after.misses - before.misses
    );
}

fn main() {
    let mut scene: Scene<Raster> = Scene::new(SceneConfig::default().with_tile_size(200)).unwrap();
    scene.resize(Size::new(600.0, 400.0)).unwrap();
    let ids = scene
        .extend([
            ShapeDesc::rect(40.0, 40.0, 100.0, 80.0).with_color(Color::RED),
            ShapeDesc::circle(Point::new(300.0, 150.0), 50.0).with_color(Color::BLUE),
            ShapeDesc::triangle(
                Point::new(420.0, 300.0),
                Point::new(560.0, 300.0),
                Point::new(490.0, 220.0),
            )
            .with_color(Color::rgb(22, 163, 74))
            .with_link(ShapeId(0)),
        ])
        .unwrap();
    let mut target = Raster::create(600, 400);
    report("initial", None, &mut scene, &mut target);

    // Drag the rectangle across the tile edge at x = 200.
    println!("pointer down on the rectangle -> {:?}", scene.pointer_down(Point::new(60.0, 60.0)));
    let damage = scene.pointer_move(Point::new(160.0, 60.0)).unwrap();
    report("drag rectangle", damage.as_ref(), &mut scene, &mut target);
    scene.pointer_up();
    println!("rectangle now at {:?}", scene.shape(ids[0]).unwrap().params());

    // Drag empty space to pan.
    scene.pointer_down(Point::new(590.0, 10.0));
    scene.pointer_move(Point::new(390.0, 10.0)).unwrap();
    scene.pointer_up();
    println!("camera origin {:?}", scene.viewport().origin());
    report("pan", None, &mut scene, &mut target);

    let changed = scene.wheel(Point::new(300.0, 200.0), -750.0).unwrap();
    println!("zoomed to {} (tile set changed: {changed})", scene.viewport().scale());
    report("zoom", None, &mut scene, &mut target);

    let damage = scene.set_color(ids[1], Color::rgb(234, 179, 8)).unwrap();
    report("recolor circle", Some(&damage), &mut scene, &mut target);

    let damage = scene.set_label(ids[2], "triangle").unwrap();
    println!("relabel evicts nothing: {}", damage.evicted.is_empty());
}
