// Copyright 2025 the Quilt Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The editable scene: shapes, camera, tile cache and spatial index in one owner.

use std::collections::BTreeSet;

use kurbo::{Affine, Point, Rect, Size, Vec2};
use log::debug;
use quilt_index::{Aabb2D, TickGrid};
use quilt_lru::CacheStats;
use quilt_tiling::TileGrid;

use crate::camera::{Viewport, VisibleTiles};
use crate::color::Color;
use crate::config::SceneConfig;
use crate::damage::{Change, Damage};
use crate::error::SceneError;
use crate::interaction::{Drag, ToolMode};
use crate::shape::{OUTLINE_WIDTH, Shape, ShapeDesc, ShapeId};
use crate::surface::Surface;
use crate::tile_cache::{CacheKey, RenderContext, TileCache};

/// An editable collection of shapes rendered through a [`TileCache`].
///
/// Shapes are appended in paint order and addressed by [`ShapeId`]. Every mutation
/// recomputes the shape's tile mask and drops exactly the cached buffers it affects; camera
/// moves that change the set of visible tiles recompose the viewport level and rebuild the
/// spatial index used for hit testing.
pub struct Scene<S: Surface> {
    config: SceneConfig,
    grid: TileGrid,
    shapes: Vec<Shape>,
    viewport: Viewport,
    visible: VisibleTiles,
    cache: TileCache<S>,
    index: TickGrid<f64, ShapeId>,
    index_stale: bool,
    selection: BTreeSet<ShapeId>,
    pub(crate) hover: Option<ShapeId>,
    pub(crate) drag: Option<Drag>,
    pub(crate) mode: ToolMode,
}

impl<S: Surface> core::fmt::Debug for Scene<S> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Scene")
            .field("shapes", &self.shapes.len())
            .field("viewport", &self.viewport)
            .field("visible_tiles", &self.visible.len())
            .field("cache", &self.cache)
            .field("index", &self.index)
            .field("selection", &self.selection)
            .field("hover", &self.hover)
            .field("mode", &self.mode)
            .finish_non_exhaustive()
    }
}

impl<S: Surface> Scene<S> {
    /// An empty scene with a zero-sized viewport at the world origin.
    pub fn new(config: SceneConfig) -> Result<Self, SceneError> {
        config.validate()?;
        let grid = TileGrid::new(config.tile_size);
        let viewport = Viewport::default();
        let visible = VisibleTiles::compute(&grid, &viewport);
        Ok(Self {
            cache: TileCache::new(config.tile_cache)?,
            config,
            grid,
            shapes: Vec::new(),
            viewport,
            visible,
            index: TickGrid::new(),
            index_stale: false,
            selection: BTreeSet::new(),
            hover: None,
            drag: None,
            mode: ToolMode::View,
        })
    }

    /// Settings the scene was built with.
    pub fn config(&self) -> &SceneConfig {
        &self.config
    }

    /// World tiling.
    pub fn grid(&self) -> &TileGrid {
        &self.grid
    }

    /// All shapes in paint order.
    pub fn shapes(&self) -> &[Shape] {
        &self.shapes
    }

    /// Look up a shape.
    pub fn shape(&self, id: ShapeId) -> Option<&Shape> {
        self.shapes.get(id.index())
    }

    /// Number of shapes.
    pub fn len(&self) -> usize {
        self.shapes.len()
    }

    /// True if the scene has no shapes.
    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }

    /// Current camera.
    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    /// Tiles under the camera.
    pub fn visible_tiles(&self) -> &VisibleTiles {
        &self.visible
    }

    /// The composition cache.
    pub fn tile_cache(&self) -> &TileCache<S> {
        &self.cache
    }

    /// Counters of the composition cache.
    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    /// Selected shapes.
    pub fn selection(&self) -> &BTreeSet<ShapeId> {
        &self.selection
    }

    /// Shape under the pointer, as of the last pointer move.
    pub fn hover(&self) -> Option<ShapeId> {
        self.hover
    }

    /// Whether shapes moved since the spatial index was last built.
    pub fn index_is_stale(&self) -> bool {
        self.index_stale
    }

    /// Append a shape on top of the others.
    ///
    /// Links may only name shapes that already exist (or the new shape itself); use
    /// [`Scene::extend`] for forward references.
    pub fn add_shape(&mut self, desc: ShapeDesc) -> Result<ShapeId, SceneError> {
        let id = ShapeId::from_index(self.shapes.len()).ok_or(SceneError::TooManyShapes)?;
        if let Some(&bad) = desc.links.iter().find(|to| to.index() > id.index()) {
            return Err(SceneError::UnknownShape(bad));
        }
        let links = desc.links.clone();
        let visible = self.push_shape(id, desc)?;
        for to in links {
            self.link(id, to)?;
        }
        if visible {
            self.rebuild_index();
        }
        Ok(id)
    }

    /// Append many shapes, then resolve their links.
    ///
    /// Nothing is added if any shape is invalid or any link points past the end.
    pub fn extend<I>(&mut self, descs: I) -> Result<Vec<ShapeId>, SceneError>
    where
        I: IntoIterator<Item = ShapeDesc>,
    {
        let descs: Vec<ShapeDesc> = descs.into_iter().collect();
        let total = self.shapes.len() + descs.len();
        let start = self.shapes.len();
        let mut ids = Vec::with_capacity(descs.len());
        let mut links = Vec::new();
        let mut visible = false;
        for desc in descs {
            let Some(id) = ShapeId::from_index(start + ids.len()) else {
                self.truncate(start);
                return Err(SceneError::TooManyShapes);
            };
            if let Some(&bad) = desc.links.iter().find(|to| to.index() >= total) {
                self.truncate(start);
                return Err(SceneError::UnknownShape(bad));
            }
            links.extend(desc.links.iter().map(|&to| (id, to)));
            match self.push_shape(id, desc) {
                Ok(on_screen) => visible |= on_screen,
                Err(err) => {
                    self.truncate(start);
                    return Err(err);
                }
            }
            ids.push(id);
        }
        for (from, to) in links {
            self.link(from, to)?;
        }
        debug!("added {} shapes ({} total)", ids.len(), self.shapes.len());
        if visible {
            self.rebuild_index();
        }
        Ok(ids)
    }

    /// Add a directed link. Links are not drawn.
    pub fn link(&mut self, from: ShapeId, to: ShapeId) -> Result<Damage, SceneError> {
        self.check(to)?;
        self.shape_mut(from)?.outgoing.insert(to);
        self.shape_mut(to)?.incoming.insert(from);
        Ok(Damage::new(Change::LINKS))
    }

    /// Translate a shape by a world-space delta.
    ///
    /// The spatial index is not rebuilt; call [`Scene::rebuild_index`] (or release the
    /// pointer) when the edit is done.
    pub fn move_shape(&mut self, id: ShapeId, delta: Vec2) -> Result<Damage, SceneError> {
        self.shape_mut(id)?.translate(delta)?;
        self.invalidate(id, Change::GEOMETRY)
    }

    /// Change a shape's fill.
    pub fn set_color(&mut self, id: ShapeId, color: Color) -> Result<Damage, SceneError> {
        self.shape_mut(id)?.set_color(color);
        self.invalidate(id, Change::STYLE)
    }

    /// Change a shape's label. Labels are not drawn, so no buffers are dropped.
    pub fn set_label(
        &mut self,
        id: ShapeId,
        label: impl Into<String>,
    ) -> Result<Damage, SceneError> {
        self.shape_mut(id)?.set_label(label.into());
        self.invalidate(id, Change::LABEL)
    }

    /// Drop the cached buffers affected by a change to shape `id`.
    ///
    /// For [`Change::GEOMETRY`] the tile mask is recomputed and both the old and the new
    /// tiles are invalidated. Changes outside [`Change::VISUAL`] drop nothing.
    pub fn invalidate(&mut self, id: ShapeId, change: Change) -> Result<Damage, SceneError> {
        if !change.intersects(Change::VISUAL) {
            self.check(id)?;
            return Ok(Damage::new(change));
        }
        let grid = self.grid;
        let shape = self.shape_mut(id)?;
        let mut tiles = shape.mask().clone();
        if change.contains(Change::GEOMETRY) {
            shape.refresh_mask(&grid)?;
            tiles.union_with(shape.mask());
        }
        let mut damage = self.cache.invalidate_shape(id, &tiles);
        damage.change = change;
        if change.intersects(Change::SPATIAL) {
            self.index_stale = true;
            let dropped = tiles.intersects(self.visible.mask())
                && self.cache.invalidate(&CacheKey::VisibleShapes);
            if dropped {
                damage.evicted.push(CacheKey::VisibleShapes);
            }
        }
        Ok(damage)
    }

    /// Remove every shape and cached buffer. The camera is kept.
    pub fn reset(&mut self) {
        debug!("resetting scene with {} shapes", self.shapes.len());
        self.shapes.clear();
        self.cache.clear();
        self.index.clear();
        self.index_stale = false;
        self.selection.clear();
        self.hover = None;
        self.drag = None;
        self.mode = ToolMode::View;
    }

    /// Replace the camera. Returns whether the visible tile set changed.
    pub fn set_viewport(&mut self, viewport: Viewport) -> Result<bool, SceneError> {
        self.viewport = viewport;
        self.refresh_visible()
    }

    /// Resize the screen area. Returns whether the visible tile set changed.
    pub fn resize(&mut self, size: Size) -> Result<bool, SceneError> {
        self.viewport.set_size(size);
        self.refresh_visible()
    }

    /// Move the camera by a world-space delta. Returns whether the visible tile set changed.
    pub fn pan(&mut self, delta: Vec2) -> Result<bool, SceneError> {
        self.viewport.pan(delta);
        self.refresh_visible()
    }

    /// Zoom by `delta` around a screen point, bounded below by the configured minimum scale.
    ///
    /// Returns whether the visible tile set changed.
    pub fn zoom_at(&mut self, screen: Point, delta: f64) -> Result<bool, SceneError> {
        if !self.viewport.zoom_at(screen, delta, self.config.min_scale) {
            return Ok(false);
        }
        self.refresh_visible()
    }

    /// Recompose the viewport level and rebuild the spatial index.
    pub fn redraw_viewport_level(&mut self) -> Result<(), SceneError> {
        let (cache, ctx) = self.cache_and_context();
        cache.redraw_viewport_level(&ctx)?;
        self.rebuild_index();
        Ok(())
    }

    /// Draw the camera's view into `target`, then outline the hovered and selected shapes.
    pub fn render_scene(&mut self, target: &mut S) -> Result<(), SceneError> {
        target.clear(self.config.clear_color);
        let (cache, ctx) = self.cache_and_context();
        let full = cache.full_scene(&ctx)?;
        let scale = self.viewport.scale();
        let offset = (self.visible.buffer_origin() - self.viewport.origin()) * scale;
        target.blit_scaled(&full, offset, scale);

        let to_screen = Affine::scale(scale) * Affine::translate(-self.viewport.origin().to_vec2());
        let outlines = self
            .selection
            .iter()
            .map(|&id| (id, self.config.selection_color))
            .chain(self.hover.map(|id| (id, self.config.hover_color)));
        for (id, color) in outlines {
            if let Some(shape) = self.shapes.get(id.index()) {
                let path = to_screen * shape.path()?;
                target.stroke_path(&path, OUTLINE_WIDTH, color);
            }
        }
        Ok(())
    }

    /// Rebuild the spatial index from the shapes touching visible tiles.
    pub fn rebuild_index(&mut self) {
        let (cache, ctx) = self.cache_and_context();
        let ids = cache.visible_shapes(&ctx);
        let shapes = &self.shapes;
        self.index = TickGrid::build(ids.iter().filter_map(|&id| {
            let b = shapes.get(id.index())?.bounds().ok()?;
            Some((Aabb2D::new(b.x0, b.y0, b.x1, b.y1), id))
        }));
        self.index_stale = false;
        debug!("rebuilt spatial index over {} shapes", ids.len());
    }

    /// Topmost indexed shape at a world point.
    pub fn hit_test(&self, world: Point) -> Option<ShapeId> {
        self.index.query_point(world.x, world.y)
    }

    /// Indexed shapes visible anywhere inside a world rectangle.
    pub fn range_select(&self, rect: Rect) -> BTreeSet<ShapeId> {
        let r = rect.abs();
        self.index.query_rect(Aabb2D::new(r.x0, r.y0, r.x1, r.y1))
    }

    /// Replace the selection with [`Scene::range_select`].
    pub fn select_range(&mut self, rect: Rect) -> &BTreeSet<ShapeId> {
        self.selection = self.range_select(rect);
        &self.selection
    }

    /// Replace the selection.
    pub fn set_selection(&mut self, ids: impl IntoIterator<Item = ShapeId>) {
        self.selection = ids.into_iter().collect();
    }

    fn refresh_visible(&mut self) -> Result<bool, SceneError> {
        let visible = VisibleTiles::compute(&self.grid, &self.viewport);
        if visible.same_set(&self.visible) {
            self.visible = visible;
            return Ok(false);
        }
        debug!(
            "visible tiles changed: {} -> {}",
            self.visible.len(),
            visible.len()
        );
        self.visible = visible;
        self.redraw_viewport_level()?;
        Ok(true)
    }

    /// Push a validated shape and drop the buffers of its tiles. Returns whether it is on
    /// screen.
    fn push_shape(&mut self, id: ShapeId, mut desc: ShapeDesc) -> Result<bool, SceneError> {
        desc.links.clear();
        let shape = Shape::from_desc(id, desc, &self.grid)?;
        let tiles = shape.mask().clone();
        self.shapes.push(shape);
        self.cache.invalidate_shape(id, &tiles);
        let visible = tiles.intersects(self.visible.mask());
        if visible {
            self.cache.invalidate(&CacheKey::VisibleShapes);
        }
        Ok(visible)
    }

    /// Drop shapes from `len` on, undoing a partial bulk insert.
    fn truncate(&mut self, len: usize) {
        if self.shapes.len() <= len {
            return;
        }
        for shape in self.shapes.drain(len..) {
            let tiles = shape.mask().clone();
            self.cache.invalidate_shape(shape.id(), &tiles);
        }
        self.cache.invalidate(&CacheKey::VisibleShapes);
    }

    fn check(&self, id: ShapeId) -> Result<(), SceneError> {
        if id.index() < self.shapes.len() {
            Ok(())
        } else {
            Err(SceneError::UnknownShape(id))
        }
    }

    fn shape_mut(&mut self, id: ShapeId) -> Result<&mut Shape, SceneError> {
        self.shapes
            .get_mut(id.index())
            .ok_or(SceneError::UnknownShape(id))
    }

    fn cache_and_context(&mut self) -> (&mut TileCache<S>, RenderContext<'_>) {
        (
            &mut self.cache,
            RenderContext {
                shapes: &self.shapes,
                visible: &self.visible,
                grid: &self.grid,
                background: self.config.background,
            },
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TileCacheConfig;
    use crate::error::{ConfigError, ShapeError};
    use crate::shape::ShapeKind;
    use crate::surface::Raster;
    use crate::surface::recorder::Recorder;
    use quilt_tiling::TileId;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn recording_scene(size: Size) -> Scene<Recorder> {
        let mut scene = Scene::new(SceneConfig::default()).unwrap();
        scene.resize(size).unwrap();
        scene
    }

    #[test]
    fn invalid_config_is_rejected() {
        let config = SceneConfig::default()
            .with_tile_cache(TileCacheConfig::default().with_blocks(30_001, 30_000));
        let err = Scene::<Recorder>::new(config).err();
        assert_eq!(
            err,
            Some(SceneError::Config(ConfigError::BlockSizeMismatch {
                l1_block: 30_000,
                l2_block: 30_001
            }))
        );
    }

    #[test]
    fn base_shapes_are_rejected() {
        let mut scene = recording_scene(Size::new(100.0, 100.0));
        let err = scene.add_shape(ShapeDesc::new(ShapeKind::Base, [0.0, 0.0, 1.0, 1.0]));
        assert_eq!(
            err,
            Err(SceneError::Shape(ShapeError::InvalidShape {
                kind: ShapeKind::Base
            }))
        );
        assert!(scene.is_empty());
    }

    #[test]
    fn three_rectangles_land_in_three_tiles() {
        let mut scene = recording_scene(Size::new(2000.0, 700.0));
        let ids = scene
            .extend([0.0, 700.0, 1400.0].map(|x| ShapeDesc::rect(x, 10.0, 50.0, 50.0)))
            .unwrap();
        let tiles: Vec<_> = ids
            .iter()
            .map(|&id| scene.shape(id).unwrap().mask().tile_ids().collect::<Vec<_>>())
            .collect();
        assert_eq!(tiles, vec![vec![TileId(0)], vec![TileId(1)], vec![TileId(4)]]);

        let mut target = Recorder::create(2000, 700);
        scene.render_scene(&mut target).unwrap();
        assert_eq!(target.fills.len(), 3);

        let damage = scene.move_shape(ids[1], Vec2::new(1.0, 0.0)).unwrap();
        assert_eq!(damage.change, Change::GEOMETRY);
        assert_eq!(damage.tiles.tile_ids().collect::<Vec<_>>(), vec![TileId(1)]);
        let cache = scene.tile_cache();
        assert!(!cache.contains(&CacheKey::TileBuffer(0, TileId(1))));
        assert!(!cache.contains(&CacheKey::TileBlock(0, TileId(1))));
        assert!(!cache.contains(&CacheKey::FullScene));
        for tile in [TileId(0), TileId(4)] {
            assert!(cache.contains(&CacheKey::TileBuffer(0, tile)));
            assert!(cache.contains(&CacheKey::TileBlock(0, tile)));
        }
    }

    #[test]
    fn crossing_a_tile_edge_damages_both_tiles() {
        let mut scene = recording_scene(Size::new(1400.0, 700.0));
        let id = scene.add_shape(ShapeDesc::rect(600.0, 10.0, 20.0, 20.0)).unwrap();
        scene.render_scene(&mut Recorder::create(1400, 700)).unwrap();

        let damage = scene.move_shape(id, Vec2::new(100.0, 0.0)).unwrap();
        assert_eq!(
            damage.tiles.tile_ids().collect::<Vec<_>>(),
            vec![TileId(0), TileId(1)]
        );
        for tile in [TileId(0), TileId(1)] {
            assert!(damage.evicted.contains(&CacheKey::TileBuffer(0, tile)));
        }
        assert_eq!(
            scene.shape(id).unwrap().mask().tile_ids().collect::<Vec<_>>(),
            vec![TileId(1)]
        );
    }

    #[test]
    fn rendering_twice_is_idempotent() {
        let config = SceneConfig::default()
            .with_tile_size(32)
            .with_tile_cache(TileCacheConfig::default().with_blocks(2, 4));
        let mut scene = Scene::<Raster>::new(config).unwrap();
        scene.resize(Size::new(90.0, 70.0)).unwrap();
        scene
            .extend([
                ShapeDesc::rect(4.0, 4.0, 30.0, 20.0).with_color(Color::RED),
                ShapeDesc::circle(Point::new(50.0, 40.0), 12.0).with_color(Color::BLUE),
                ShapeDesc::triangle(
                    Point::new(10.0, 60.0),
                    Point::new(40.0, 30.0),
                    Point::new(70.0, 65.0),
                ),
                ShapeDesc::rect(60.0, 5.0, 20.0, 20.0).with_color(Color::rgb(20, 160, 60)),
                ShapeDesc::rect(20.0, 20.0, 50.0, 8.0).with_color(Color::rgba(0, 0, 0, 128)),
            ])
            .unwrap();

        let mut first = Raster::new(90, 70);
        scene.render_scene(&mut first).unwrap();
        let hits = scene.cache_stats().hits;
        let mut second = Raster::new(90, 70);
        scene.render_scene(&mut second).unwrap();
        assert_eq!(first.pixels(), second.pixels());
        assert!(scene.cache_stats().hits > hits);

        // Cached composition matches a cold render of the same scene.
        let mut cold = Scene::<Raster>::new(config).unwrap();
        cold.resize(Size::new(90.0, 70.0)).unwrap();
        cold.extend(scene.shapes().iter().map(|s| {
            ShapeDesc::new(s.kind(), s.params().to_vec()).with_color(s.color())
        }))
        .unwrap();
        let mut fresh = Raster::new(90, 70);
        cold.render_scene(&mut fresh).unwrap();
        assert_eq!(first.pixels(), fresh.pixels());
    }

    fn cold_render(config: SceneConfig, (width, height): (u32, u32), shapes: &[Shape]) -> Raster {
        let mut cold = Scene::<Raster>::new(config).unwrap();
        cold.resize(Size::new(f64::from(width), f64::from(height))).unwrap();
        cold.extend(
            shapes
                .iter()
                .map(|s| ShapeDesc::new(s.kind(), s.params().to_vec()).with_color(s.color())),
        )
        .unwrap();
        let mut fresh = Raster::new(width, height);
        cold.render_scene(&mut fresh).unwrap();
        fresh
    }

    /// A coordinate within one pixel of a tile edge, on either side.
    fn near_edge(rng: &mut StdRng, tile: f64, tiles: u32) -> f64 {
        f64::from(rng.gen_range(1..=tiles)) * tile + rng.gen_range(-1.0..1.0)
    }

    #[test]
    fn edits_match_a_cold_render() {
        let config = SceneConfig::default()
            .with_tile_size(32)
            .with_tile_cache(TileCacheConfig::default().with_blocks(2, 4));
        let size = Size::new(100.0, 80.0);
        let mut rng = StdRng::seed_from_u64(11);
        let mut descs = Vec::new();
        for i in 0..18_u8 {
            let color = Color::rgba(i * 13, 255 - i * 13, 90, if i % 4 == 0 { 160 } else { 255 });
            let w = rng.gen_range(1.0..30.0);
            let h = rng.gen_range(1.0..30.0);
            // Every third shape ends within a pixel of a tile edge.
            let (x, y) = if i % 3 == 0 {
                (near_edge(&mut rng, 32.0, 3) - w, near_edge(&mut rng, 32.0, 2) - h)
            } else {
                (rng.gen_range(-5.0..100.0), rng.gen_range(-5.0..80.0))
            };
            let desc = match i % 3 {
                0 | 1 => ShapeDesc::rect(x, y, w, h),
                _ if i % 2 == 0 => ShapeDesc::circle(Point::new(x, y), w / 2.0),
                _ => ShapeDesc::triangle(
                    Point::new(x, y),
                    Point::new(x + w, y + h / 3.0),
                    Point::new(x + w / 2.0, y + h),
                ),
            };
            descs.push(desc.with_color(color));
        }
        let mut scene = Scene::<Raster>::new(config).unwrap();
        scene.resize(size).unwrap();
        let ids = scene.extend(descs).unwrap();
        let mut target = Raster::new(100, 80);
        scene.render_scene(&mut target).unwrap();
        assert_eq!(target.pixels(), cold_render(config, (100, 80), scene.shapes()).pixels());

        for step in 0..24 {
            let id = ids[rng.gen_range(0..ids.len())];
            if step % 3 == 2 {
                scene.set_color(id, Color::rgb(rng.r#gen(), 0, 0)).unwrap();
            } else {
                let delta = Vec2::new(rng.gen_range(-20.0..20.0), rng.gen_range(-20.0..20.0));
                scene.move_shape(id, delta).unwrap();
            }
            scene.render_scene(&mut target).unwrap();
            let fresh = cold_render(config, (100, 80), scene.shapes());
            assert_eq!(target.pixels(), fresh.pixels(), "diverged after step {step}");
        }
    }

    #[test]
    fn outline_ink_stays_in_the_shape_tiles() {
        let config = SceneConfig::default().with_tile_size(32);
        let size = Size::new(96.0, 32.0);
        // Right edge at 31.8: every corner, and so the mask, is in tile 0.
        let desc = ShapeDesc::rect(20.0, 4.0, 11.8, 10.0).with_color(Color::RED);
        let background = Some(config.background);

        let mut resized_first = Scene::<Raster>::new(config).unwrap();
        resized_first.resize(size).unwrap();
        resized_first.add_shape(desc.clone()).unwrap();
        let mut added_first = Scene::<Raster>::new(config).unwrap();
        added_first.add_shape(desc).unwrap();
        added_first.resize(size).unwrap();

        let mut a = Raster::new(96, 32);
        let mut b = Raster::new(96, 32);
        resized_first.render_scene(&mut a).unwrap();
        added_first.render_scene(&mut b).unwrap();
        assert_eq!(a.pixel(31, 10), Some(Color::BLACK));
        assert_eq!(a.pixel(32, 10), background);
        assert_eq!(a.pixels(), b.pixels());

        for scene in [&mut resized_first, &mut added_first] {
            scene.move_shape(ShapeId(0), Vec2::new(-10.0, 0.0)).unwrap();
        }
        resized_first.render_scene(&mut a).unwrap();
        added_first.render_scene(&mut b).unwrap();
        assert_eq!(b.pixel(32, 10), background);
        assert_eq!(b.pixel(31, 10), background);
        assert_eq!(a.pixels(), b.pixels());
        let fresh = cold_render(config, (96, 32), added_first.shapes());
        assert_eq!(b.pixels(), fresh.pixels());
    }

    #[test]
    fn labels_and_links_do_not_touch_the_cache() {
        let mut scene = recording_scene(Size::new(100.0, 100.0));
        let ids = scene
            .extend([
                ShapeDesc::rect(0.0, 0.0, 10.0, 10.0).with_link(ShapeId(1)),
                ShapeDesc::rect(20.0, 0.0, 10.0, 10.0),
            ])
            .unwrap();
        assert_eq!(scene.shape(ids[0]).unwrap().outgoing().len(), 1);
        assert!(scene.shape(ids[1]).unwrap().incoming().contains(&ids[0]));

        scene.render_scene(&mut Recorder::create(100, 100)).unwrap();
        let before = scene.tile_cache().len();
        let damage = scene.set_label(ids[1], "b").unwrap();
        assert!(damage.is_empty());
        assert_eq!(damage.change, Change::LABEL);
        assert_eq!(scene.shape(ids[1]).unwrap().label(), "b");
        assert_eq!(scene.tile_cache().len(), before);

        assert_eq!(
            scene.link(ids[0], ShapeId(9)).err(),
            Some(SceneError::UnknownShape(ShapeId(9)))
        );
    }

    #[test]
    fn bad_links_roll_back_bulk_inserts() {
        let mut scene = recording_scene(Size::new(100.0, 100.0));
        let err = scene.extend([
            ShapeDesc::rect(0.0, 0.0, 10.0, 10.0),
            ShapeDesc::rect(0.0, 0.0, 10.0, 10.0).with_link(ShapeId(5)),
        ]);
        assert_eq!(err, Err(SceneError::UnknownShape(ShapeId(5))));
        assert!(scene.is_empty());
        assert_eq!(
            scene.add_shape(ShapeDesc::rect(0.0, 0.0, 1.0, 1.0).with_link(ShapeId(3))),
            Err(SceneError::UnknownShape(ShapeId(3)))
        );
    }

    #[test]
    fn hit_test_prefers_the_topmost_shape() {
        let mut scene = recording_scene(Size::new(400.0, 400.0));
        let ids = scene
            .extend([
                ShapeDesc::rect(10.0, 10.0, 100.0, 100.0),
                ShapeDesc::rect(50.0, 50.0, 100.0, 100.0),
            ])
            .unwrap();
        assert_eq!(scene.hit_test(Point::new(20.0, 20.0)), Some(ids[0]));
        assert_eq!(scene.hit_test(Point::new(60.0, 60.0)), Some(ids[1]));
        assert_eq!(scene.hit_test(Point::new(300.0, 300.0)), None);

        let picked = scene.select_range(Rect::new(0.0, 0.0, 30.0, 30.0)).clone();
        assert_eq!(picked.into_iter().collect::<Vec<_>>(), vec![ids[0]]);
    }

    #[test]
    fn moves_leave_the_index_stale_until_rebuilt() {
        let mut scene = recording_scene(Size::new(400.0, 400.0));
        let id = scene.add_shape(ShapeDesc::rect(10.0, 10.0, 20.0, 20.0)).unwrap();
        scene.move_shape(id, Vec2::new(100.0, 0.0)).unwrap();
        assert!(scene.index_is_stale());
        assert_eq!(scene.hit_test(Point::new(15.0, 15.0)), Some(id));
        scene.rebuild_index();
        assert_eq!(scene.hit_test(Point::new(15.0, 15.0)), None);
        assert_eq!(scene.hit_test(Point::new(115.0, 15.0)), Some(id));
    }

    #[test]
    fn range_select_matches_a_linear_scan() {
        let mut rng = StdRng::seed_from_u64(5);
        let mut scene = recording_scene(Size::new(1280.0, 1280.0));
        let mut descs = Vec::new();
        // One shape per 80×80 slot, so no shape covers another.
        for slot in 0..256_u32 {
            if rng.gen_bool(0.4) {
                continue;
            }
            let x = f64::from(slot % 16) * 80.0 + f64::from(rng.gen_range(0..10_u32));
            let y = f64::from(slot / 16) * 80.0 + f64::from(rng.gen_range(0..10_u32));
            let w = f64::from(rng.gen_range(5..60_u32));
            let h = f64::from(rng.gen_range(5..60_u32));
            descs.push(ShapeDesc::rect(x, y, w, h));
        }
        let ids = scene.extend(descs).unwrap();
        let domain = Rect::new(0.0, 0.0, 1280.0, 1280.0);
        let expected: BTreeSet<ShapeId> = ids
            .iter()
            .copied()
            .filter(|&id| domain.contains_rect(scene.shape(id).unwrap().bounds().unwrap()))
            .collect();
        assert_eq!(scene.range_select(domain), expected);
        assert_eq!(expected.len(), ids.len());
    }

    #[test]
    fn panning_to_new_tiles_redraws_and_reindexes() {
        let mut scene = recording_scene(Size::new(600.0, 600.0));
        let ids = scene
            .extend([
                ShapeDesc::rect(10.0, 10.0, 20.0, 20.0),
                ShapeDesc::rect(1300.0, 10.0, 20.0, 20.0),
            ])
            .unwrap();
        assert_eq!(scene.hit_test(Point::new(1305.0, 15.0)), None);

        // Still inside tile 0.
        assert!(!scene.pan(Vec2::new(5.0, 0.0)).unwrap());
        assert!(scene.pan(Vec2::new(1000.0, 0.0)).unwrap());
        assert_eq!(scene.hit_test(Point::new(1305.0, 15.0)), Some(ids[1]));
        assert!(scene.tile_cache().contains(&CacheKey::FullScene));

        // Panning left clamps at the world origin.
        scene.pan(Vec2::new(-5000.0, 0.0)).unwrap();
        assert_eq!(scene.viewport().origin(), Point::ZERO);
    }

    #[test]
    fn reset_clears_everything() {
        let mut scene = recording_scene(Size::new(100.0, 100.0));
        scene.add_shape(ShapeDesc::rect(0.0, 0.0, 10.0, 10.0)).unwrap();
        scene.set_selection([ShapeId(0)]);
        scene.render_scene(&mut Recorder::create(100, 100)).unwrap();
        scene.reset();
        assert!(scene.is_empty());
        assert!(scene.tile_cache().is_empty());
        assert!(scene.selection().is_empty());
        assert_eq!(scene.hit_test(Point::new(5.0, 5.0)), None);
        assert_eq!(
            scene.move_shape(ShapeId(0), Vec2::ZERO).err(),
            Some(SceneError::UnknownShape(ShapeId(0)))
        );
    }
}
