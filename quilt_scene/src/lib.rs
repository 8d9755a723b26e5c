// Copyright 2025 the Quilt Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Quilt Scene: a tile-cached 2D scene with hit-testing and incremental invalidation.
//!
//! A [`Scene`] holds shapes in scan (paint) order. The world is cut into square tiles, and
//! each shape remembers which tiles its bounds touch. Rendering goes through a [`TileCache`]
//! that composites in levels:
//!
//! - a per-block temporary buffer, drawn only on the tiles it is needed for,
//! - a per-block tile buffer for each visible tile,
//! - a tile block that stacks every block of one tile,
//! - a viewport buffer that places every visible tile,
//! - the full scene, ready to blit onto the render target.
//!
//! Editing a shape drops exactly the cached buffers of the tiles it left and entered, so the
//! next render redraws only those tiles. Everything lives in one [`quilt_lru::LruCache`], so
//! memory stays bounded no matter how far the camera wanders.
//!
//! Hit-testing and range selection go through a [`quilt_index::TickGrid`] built from the
//! shapes on visible tiles. The topmost (last drawn) shape wins.
//!
//! ## API overview
//!
//! - [`Scene`]: shapes, camera, cache, selection and pointer handling.
//! - [`ShapeDesc`]: what to add; [`Shape`]: what was added.
//! - [`ShapeId`]: a shape's position in scan order.
//! - [`Viewport`] and [`VisibleTiles`]: the camera and the tiles it sees.
//! - [`Damage`] and [`Change`]: what a mutation invalidated.
//! - [`Surface`]: the drawing seam. [`Raster`] is a software implementation.
//! - [`SceneConfig`] and [`TileCacheConfig`]: tile size, block sizes, cache capacity, colors.
//!
//! ## Example
//!
//! ```
//! use kurbo::{Point, Size, Vec2};
//! use quilt_scene::{Color, Raster, Scene, SceneConfig, ShapeDesc, Surface};
//!
//! let mut scene: Scene<Raster> = Scene::new(SceneConfig::default()).unwrap();
//! scene.resize(Size::new(320.0, 240.0)).unwrap();
//! let ids = scene
//!     .extend([
//!         ShapeDesc::rect(20.0, 20.0, 100.0, 60.0).with_color(Color::RED),
//!         ShapeDesc::circle(Point::new(90.0, 60.0), 30.0).with_color(Color::BLUE),
//!     ])
//!     .unwrap();
//!
//! let mut target = Raster::create(320, 240);
//! scene.render_scene(&mut target).unwrap();
//! assert_eq!(target.pixel(30, 30), Some(Color::RED));
//!
//! // The circle was added last, so it is on top.
//! assert_eq!(scene.hit_test(Point::new(90.0, 60.0)), Some(ids[1]));
//!
//! // Moving a shape only drops the cached tiles it touched.
//! let damage = scene.move_shape(ids[0], Vec2::new(5.0, 0.0)).unwrap();
//! assert!(!damage.is_empty());
//! ```

mod camera;
mod color;
mod config;
mod damage;
mod error;
mod interaction;
mod scene;
mod shape;
mod surface;
mod tile_cache;

pub use camera::{Viewport, VisibleTile, VisibleTiles};
pub use color::Color;
pub use config::{
    DEFAULT_CAPACITY, DEFAULT_L1_BLOCK, DEFAULT_L2_BLOCK, SceneConfig, TileCacheConfig,
};
pub use damage::{Change, Damage};
pub use error::{ConfigError, SceneError, ShapeError};
pub use interaction::{ToolMode, WHEEL_STEP};
pub use scene::Scene;
pub use shape::{OUTLINE_WIDTH, Shape, ShapeDesc, ShapeId, ShapeKind};
pub use surface::{Raster, Surface};
pub use tile_cache::{CacheKey, CacheValue, RenderContext, TileCache};

pub use quilt_lru::CacheStats;
pub use quilt_tiling::{DEFAULT_TILE_SIZE, RegionMask, TileGrid, TileId};
