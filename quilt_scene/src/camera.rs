// Copyright 2025 the Quilt Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Camera and the set of tiles it sees.

use kurbo::{Point, Rect, Size, Vec2};
use quilt_tiling::{RegionMask, TileCoord, TileGrid, TileId, tile_id};

/// A window onto the non-negative world plane.
///
/// `origin` is the world point at the top-left pixel, `size` is in screen pixels, and
/// `scale` is screen pixels per world unit.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Viewport {
    origin: Point,
    size: Size,
    scale: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(Size::ZERO)
    }
}

impl Viewport {
    /// A viewport at the world origin with unit scale.
    pub fn new(size: Size) -> Self {
        Self {
            origin: Point::ZERO,
            size,
            scale: 1.0,
        }
    }

    /// Move the top-left corner. Negative coordinates clamp to zero.
    #[must_use]
    pub fn with_origin(mut self, origin: Point) -> Self {
        self.origin = clamp_origin(origin);
        self
    }

    /// Set the zoom factor. Non-positive scales are ignored.
    #[must_use]
    pub fn with_scale(mut self, scale: f64) -> Self {
        if scale > 0.0 {
            self.scale = scale;
        }
        self
    }

    /// World point at the top-left pixel.
    pub fn origin(&self) -> Point {
        self.origin
    }

    /// Size in screen pixels.
    pub fn size(&self) -> Size {
        self.size
    }

    /// Screen pixels per world unit.
    pub fn scale(&self) -> f64 {
        self.scale
    }

    /// Resize the screen area.
    pub fn set_size(&mut self, size: Size) {
        self.size = size;
    }

    /// World area on screen.
    pub fn world_rect(&self) -> Rect {
        Rect::from_origin_size(self.origin, self.size / self.scale)
    }

    /// World point under a screen point.
    pub fn screen_to_world(&self, screen: Point) -> Point {
        self.origin + screen.to_vec2() / self.scale
    }

    /// Screen point of a world point.
    pub fn world_to_screen(&self, world: Point) -> Point {
        ((world - self.origin) * self.scale).to_point()
    }

    /// Move by a world-space delta, clamping each axis at zero.
    pub fn pan(&mut self, delta: Vec2) {
        self.origin = clamp_origin(self.origin + delta);
    }

    /// Change the scale by `delta`, keeping the world point under `screen` fixed.
    ///
    /// Returns `false` and leaves the viewport alone if the new scale would drop below
    /// `min_scale`.
    pub fn zoom_at(&mut self, screen: Point, delta: f64, min_scale: f64) -> bool {
        let scale = self.scale + delta;
        if scale.is_nan() || scale < min_scale || scale <= 0.0 {
            return false;
        }
        let anchor = self.screen_to_world(screen);
        self.scale = scale;
        self.origin = clamp_origin(anchor - screen.to_vec2() / scale);
        true
    }
}

fn clamp_origin(p: Point) -> Point {
    Point::new(p.x.max(0.0), p.y.max(0.0))
}

/// One tile on screen.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct VisibleTile {
    /// Quadtree id.
    pub id: TileId,
    /// Column and row.
    pub coord: TileCoord,
    /// World-space top-left corner.
    pub origin: Point,
}

/// The tiles covering a viewport, and the composition buffer that spans them.
#[derive(Clone, Debug, PartialEq)]
pub struct VisibleTiles {
    tiles: Vec<VisibleTile>,
    mask: RegionMask,
    buffer: Rect,
    tile_size: u32,
}

impl VisibleTiles {
    /// Tiles touched by the viewport's world rectangle, snapped outward to tile edges.
    ///
    /// Tiles are listed row by row. The buffer runs from the first tile's origin to the far
    /// edge of the last tile.
    pub fn compute(grid: &TileGrid, viewport: &Viewport) -> Self {
        let world = viewport.world_rect();
        let first = grid.coord_at(world.x0, world.y0);
        let last = grid.coord_at(world.x1, world.y1);
        let mut tiles = Vec::new();
        for y in first.y..=last.y {
            for x in first.x..=last.x {
                let coord = TileCoord::new(x, y);
                let (ox, oy) = grid.origin_of(coord);
                tiles.push(VisibleTile {
                    id: tile_id(coord),
                    coord,
                    origin: Point::new(ox, oy),
                });
            }
        }
        let mask = RegionMask::from_tiles(tiles.iter().map(|t| t.id));
        let (x0, y0) = grid.origin_of(first);
        let (x1, y1) = grid.origin_of(last);
        let edge = grid.edge();
        Self {
            tiles,
            mask,
            buffer: Rect::new(x0, y0, x1 + edge, y1 + edge),
            tile_size: grid.tile_size(),
        }
    }

    /// Tiles in row-major order.
    pub fn tiles(&self) -> &[VisibleTile] {
        &self.tiles
    }

    /// Mask with a bit set for every visible tile.
    pub fn mask(&self) -> &RegionMask {
        &self.mask
    }

    /// Number of visible tiles.
    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    /// True when no tile is visible.
    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    /// Whether a tile is on screen.
    pub fn contains(&self, tile: TileId) -> bool {
        self.mask.contains(tile)
    }

    /// World area of the composition buffer.
    pub fn buffer_rect(&self) -> Rect {
        self.buffer
    }

    /// World-space top-left corner of the composition buffer.
    pub fn buffer_origin(&self) -> Point {
        self.buffer.origin()
    }

    /// Composition buffer size in pixels (one pixel per world unit).
    pub fn buffer_size(&self) -> (u32, u32) {
        let (cols, rows) = match (self.tiles.first(), self.tiles.last()) {
            (Some(first), Some(last)) => (
                last.coord.x - first.coord.x + 1,
                last.coord.y - first.coord.y + 1,
            ),
            _ => (0, 0),
        };
        (
            cols.saturating_mul(self.tile_size),
            rows.saturating_mul(self.tile_size),
        )
    }

    /// Tile edge in pixels.
    pub fn tile_size(&self) -> u32 {
        self.tile_size
    }

    /// True when both sets name the same tiles, regardless of order or buffer size.
    pub fn same_set(&self, other: &Self) -> bool {
        self.mask.tile_ids().eq(other.mask.tile_ids())
    }
}
