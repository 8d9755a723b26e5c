// Copyright 2025 the Quilt Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Five-level composited tile cache.
//!
//! Shapes are grouped by scan position: an L2 block holds `l2_block` consecutive shapes and
//! an L1 block holds `l1_block`. Buffers are composed bottom-up:
//!
//! | Key | Size | Content |
//! | --- | --- | --- |
//! | [`CacheKey::TempBuffer`] | buffer | shapes of one L2 block touching uncached visible tiles |
//! | [`CacheKey::TileBuffer`] | tile | one L2 block cropped to one tile (background under block 0) |
//! | [`CacheKey::TileBlock`] | tile | every L2 block of one L1 block, for one tile |
//! | [`CacheKey::ViewportBuffer`] | buffer | one L1 block across every visible tile |
//! | [`CacheKey::FullScene`] | buffer | every L1 block |
//!
//! Each level returns its cached buffer if present and otherwise builds, stores and returns
//! it. Editing shape `i` only drops the keys of `i`'s blocks on `i`'s tiles, so the next frame
//! recomposes a handful of buffers instead of redrawing the scene.

use std::fmt;
use std::iter::StepBy;
use std::ops::Range;
use std::rc::Rc;

use kurbo::{Rect, Vec2};
use log::{debug, trace};
use quilt_lru::{CacheStats, LruCache};
use quilt_tiling::{RegionMask, TileGrid, TileId};

use crate::camera::{VisibleTile, VisibleTiles};
use crate::color::Color;
use crate::config::TileCacheConfig;
use crate::damage::{Change, Damage};
use crate::error::{ConfigError, ShapeError};
use crate::shape::{Shape, ShapeId};
use crate::surface::Surface;

/// Identity of a cached entry. Never a shape identity: positions are scan-order block starts.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum CacheKey {
    /// Everything, composed over all L1 blocks.
    FullScene,
    /// One L1 block across all visible tiles.
    ViewportBuffer(usize),
    /// One L1 block on one tile.
    TileBlock(usize, TileId),
    /// One L2 block on one tile.
    TileBuffer(usize, TileId),
    /// One L2 block across the composition buffer; lives for a single composition pass.
    TempBuffer(usize),
    /// Ids of shapes touching visible tiles.
    VisibleShapes,
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FullScene => f.write_str("full"),
            Self::ViewportBuffer(pos) => write!(f, "viewport:{pos}"),
            Self::TileBlock(pos, tile) => write!(f, "block:{pos}:{tile}"),
            Self::TileBuffer(pos, tile) => write!(f, "tile:{pos}:{tile}"),
            Self::TempBuffer(pos) => write!(f, "temp:{pos}"),
            Self::VisibleShapes => f.write_str("visible"),
        }
    }
}

/// A cached entry.
#[derive(Debug)]
pub enum CacheValue<S> {
    /// A composed buffer.
    Surface(Rc<S>),
    /// A temp buffer and the tiles it was drawn for.
    Partial(Rc<S>, RegionMask),
    /// Visible shape ids in scan order.
    Shapes(Rc<[ShapeId]>),
}

/// Read-only scene state a composition pass draws from.
#[derive(Copy, Clone, Debug)]
pub struct RenderContext<'a> {
    /// All shapes in scan order.
    pub shapes: &'a [Shape],
    /// Tiles on screen.
    pub visible: &'a VisibleTiles,
    /// Tiling of the world.
    pub grid: &'a TileGrid,
    /// Fill under the first block.
    pub background: Color,
}

/// Multi-level buffer cache over an [`LruCache`].
pub struct TileCache<S> {
    cache: LruCache<CacheKey, CacheValue<S>>,
    config: TileCacheConfig,
}

impl<S> fmt::Debug for TileCache<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TileCache")
            .field("config", &self.config)
            .field("len", &self.cache.len())
            .field("stats", &self.cache.stats())
            .finish_non_exhaustive()
    }
}

impl<S: Surface> TileCache<S> {
    /// An empty cache. Fails if the block sizes do not nest or the capacity is zero.
    pub fn new(config: TileCacheConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            cache: LruCache::new(config.capacity),
            config,
        })
    }

    /// Block sizes and capacity.
    pub fn config(&self) -> &TileCacheConfig {
        &self.config
    }

    /// Number of cached entries.
    pub fn len(&self) -> usize {
        self.cache.len()
    }

    /// True if nothing is cached.
    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }

    /// Whether `key` is cached. Does not touch recency or counters.
    pub fn contains(&self, key: &CacheKey) -> bool {
        self.cache.has(key)
    }

    /// Cached keys, most recently used first.
    pub fn keys(&self) -> impl Iterator<Item = &CacheKey> + '_ {
        self.cache.keys()
    }

    /// Hit, miss and eviction counters of the underlying LRU.
    pub fn stats(&self) -> CacheStats {
        self.cache.stats()
    }

    /// Drop every entry.
    pub fn clear(&mut self) {
        self.cache.clear();
    }

    /// Drop one entry. Returns whether it was present.
    pub fn invalidate(&mut self, key: &CacheKey) -> bool {
        self.cache.invalidate(key).is_some()
    }

    /// The whole scene over the composition buffer.
    pub fn full_scene(&mut self, ctx: &RenderContext<'_>) -> Result<Rc<S>, ShapeError> {
        let key = CacheKey::FullScene;
        if let Some(surface) = self.surface(&key) {
            return Ok(surface);
        }
        trace!("tile cache miss: {key}");
        let mut surface = buffer_surface::<S>(ctx.visible);
        let end = ctx.shapes.len().max(1);
        for pos in (0..end).step_by(self.config.l1_block) {
            let viewport = self.viewport_buffer(pos, ctx)?;
            surface.blit(&viewport, Vec2::ZERO);
        }
        Ok(self.store_surface(key, surface))
    }

    /// One L1 block over the composition buffer.
    ///
    /// Temp buffers consumed while composing are dropped afterwards.
    pub fn viewport_buffer(
        &mut self,
        pos: usize,
        ctx: &RenderContext<'_>,
    ) -> Result<Rc<S>, ShapeError> {
        let key = CacheKey::ViewportBuffer(pos);
        if let Some(surface) = self.surface(&key) {
            return Ok(surface);
        }
        trace!("tile cache miss: {key}");
        let mut surface = buffer_surface::<S>(ctx.visible);
        let buffer_origin = ctx.visible.buffer_origin();
        for tile in ctx.visible.tiles() {
            let block = self.tile_block(pos, tile, ctx)?;
            surface.blit(&block, tile.origin - buffer_origin);
        }
        for sub in self.sub_blocks(pos, ctx) {
            self.cache.invalidate(&CacheKey::TempBuffer(sub));
        }
        Ok(self.store_surface(key, surface))
    }

    /// One L1 block on one tile.
    pub fn tile_block(
        &mut self,
        pos: usize,
        tile: &VisibleTile,
        ctx: &RenderContext<'_>,
    ) -> Result<Rc<S>, ShapeError> {
        let key = CacheKey::TileBlock(pos, tile.id);
        if let Some(surface) = self.surface(&key) {
            return Ok(surface);
        }
        trace!("tile cache miss: {key}");
        let size = ctx.visible.tile_size();
        let mut surface = S::create(size, size);
        for sub in self.sub_blocks(pos, ctx) {
            let buffer = self.tile_buffer(sub, tile, ctx)?;
            surface.blit(&buffer, Vec2::ZERO);
        }
        Ok(self.store_surface(key, surface))
    }

    /// One L2 block on one tile. Block 0 is painted over the background.
    pub fn tile_buffer(
        &mut self,
        pos: usize,
        tile: &VisibleTile,
        ctx: &RenderContext<'_>,
    ) -> Result<Rc<S>, ShapeError> {
        let key = CacheKey::TileBuffer(pos, tile.id);
        if let Some(surface) = self.surface(&key) {
            return Ok(surface);
        }
        trace!("tile cache miss: {key}");
        let temp = self.temp_buffer(pos, tile.id, ctx)?;
        let size = ctx.visible.tile_size();
        let edge = f64::from(size);
        let mut surface = S::create(size, size);
        if pos == 0 {
            surface.fill_rect(Rect::new(0.0, 0.0, edge, edge), ctx.background);
        }
        surface.blit(&temp, ctx.visible.buffer_origin() - tile.origin);
        Ok(self.store_surface(key, surface))
    }

    /// Shapes of one L2 block drawn over the composition buffer.
    ///
    /// Only shapes touching visible tiles that are not yet cached at the L2 level are drawn.
    /// A cached temp buffer that was drawn without `tile` is rebuilt.
    pub fn temp_buffer(
        &mut self,
        pos: usize,
        tile: TileId,
        ctx: &RenderContext<'_>,
    ) -> Result<Rc<S>, ShapeError> {
        let key = CacheKey::TempBuffer(pos);
        if let Some(CacheValue::Partial(surface, tiles)) = self.cache.get(&key)
            && tiles.contains(tile)
        {
            return Ok(Rc::clone(surface));
        }
        trace!("tile cache miss: {key}");
        let pending = RegionMask::from_tiles(
            ctx.visible
                .tiles()
                .iter()
                .map(|t| t.id)
                .filter(|&id| id == tile || !self.cache.has(&CacheKey::TileBuffer(pos, id))),
        );
        let mut surface = buffer_surface::<S>(ctx.visible);
        let offset = -ctx.visible.buffer_origin().to_vec2();
        let start = pos.min(ctx.shapes.len());
        let end = pos.saturating_add(self.config.l2_block).min(ctx.shapes.len());
        for shape in &ctx.shapes[start..end] {
            if shape.mask().intersects(&pending) {
                shape.draw(&mut surface, offset)?;
            }
        }
        let surface = Rc::new(surface);
        self.cache
            .set(key, CacheValue::Partial(Rc::clone(&surface), pending));
        Ok(surface)
    }

    /// Ids of shapes whose masks touch a visible tile, in scan order.
    pub fn visible_shapes(&mut self, ctx: &RenderContext<'_>) -> Rc<[ShapeId]> {
        let key = CacheKey::VisibleShapes;
        if let Some(CacheValue::Shapes(ids)) = self.cache.get(&key) {
            return Rc::clone(ids);
        }
        trace!("tile cache miss: {key}");
        let ids: Rc<[ShapeId]> = ctx
            .shapes
            .iter()
            .filter(|shape| shape.mask().intersects(ctx.visible.mask()))
            .map(Shape::id)
            .collect();
        self.cache.set(key, CacheValue::Shapes(Rc::clone(&ids)));
        ids
    }

    /// Drop every buffer that draws shape `id` on any of `tiles`.
    ///
    /// Pass the union of the shape's tiles before and after the edit. [`CacheKey::VisibleShapes`]
    /// is left alone; the caller decides whether membership changed.
    pub fn invalidate_shape(&mut self, id: ShapeId, tiles: &RegionMask) -> Damage {
        let i = id.index();
        let l1 = i - i % self.config.l1_block;
        let l2 = i - i % self.config.l2_block;
        let mut damage = Damage::new(Change::empty());
        damage.tiles = tiles.clone();
        let per_tile = tiles
            .tile_ids()
            .flat_map(|tile| [CacheKey::TileBuffer(l2, tile), CacheKey::TileBlock(l1, tile)]);
        let shared = [CacheKey::ViewportBuffer(l1), CacheKey::FullScene]
            .into_iter()
            .filter(|_| !tiles.is_empty());
        for key in per_tile.chain(shared) {
            if self.cache.invalidate(&key).is_some() {
                trace!("invalidated {key} for shape {id}");
                damage.evicted.push(key);
            }
        }
        damage
    }

    /// Recompose after the visible tile set changed.
    ///
    /// Viewport buffers, the full scene and the visible shape list are keyed by scan position
    /// only but depend on which tiles are visible, so they are all dropped before the full
    /// scene is rebuilt.
    pub fn redraw_viewport_level(
        &mut self,
        ctx: &RenderContext<'_>,
    ) -> Result<Rc<S>, ShapeError> {
        let stale: Vec<CacheKey> = self
            .cache
            .keys()
            .filter(|key| {
                matches!(
                    key,
                    CacheKey::ViewportBuffer(_)
                        | CacheKey::FullScene
                        | CacheKey::VisibleShapes
                        | CacheKey::TempBuffer(_)
                )
            })
            .copied()
            .collect();
        debug!(
            "redrawing viewport level: {} stale entries, {} visible tiles",
            stale.len(),
            ctx.visible.len()
        );
        for key in &stale {
            self.cache.invalidate(key);
        }
        self.full_scene(ctx)
    }

    /// Starts of the L2 blocks inside the L1 block at `pos`. Block 0 always has at least one.
    fn sub_blocks(&self, pos: usize, ctx: &RenderContext<'_>) -> StepBy<Range<usize>> {
        let end = pos
            .saturating_add(self.config.l1_block)
            .min(ctx.shapes.len().max(1));
        (pos..end).step_by(self.config.l2_block)
    }

    fn surface(&mut self, key: &CacheKey) -> Option<Rc<S>> {
        match self.cache.get(key)? {
            CacheValue::Surface(surface) => Some(Rc::clone(surface)),
            _ => None,
        }
    }

    fn store_surface(&mut self, key: CacheKey, surface: S) -> Rc<S> {
        let surface = Rc::new(surface);
        self.cache.set(key, CacheValue::Surface(Rc::clone(&surface)));
        surface
    }
}

fn buffer_surface<S: Surface>(visible: &VisibleTiles) -> S {
    let (width, height) = visible.buffer_size();
    S::create(width, height)
}
