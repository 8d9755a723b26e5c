// Copyright 2025 the Quilt Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tile grid: world coordinates to quadtree tile ids and back.

use core::fmt;

/// Edge length used by [`TileGrid::default`].
pub const DEFAULT_TILE_SIZE: u32 = 640;

/// Number of tiles sharing one region word.
pub const TILES_PER_REGION: u64 = 16;

/// Dense identifier of a tile, ordered by quadtree traversal.
///
/// Tile `(0, 0)` is always id `0`. Ids are assigned by peeling the largest power-of-two
/// quadrant that contains the tile, so the four tiles of any aligned 2×2 block get four
/// consecutive ids, and so on up the tree.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TileId(pub u64);

impl fmt::Display for TileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Integer tile coordinates (column, row) on the non-negative world grid.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TileCoord {
    /// Column.
    pub x: u32,
    /// Row.
    pub y: u32,
}

impl TileCoord {
    /// Create a tile coordinate.
    pub const fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }
}

/// Map integer tile coordinates to their quadtree id.
///
/// Works one quadrant level per iteration: with `s` the largest power of two not above
/// `max(x, y)`, the quadrant signature `(y >= s) << 1 | (x >= s)` contributes `s * s * sig`
/// and the loop continues with both coordinates reduced modulo `s`.
pub fn tile_id(coord: TileCoord) -> TileId {
    let mut xi = u64::from(coord.x);
    let mut yi = u64::from(coord.y);
    let mut id = 0_u64;
    while (xi | yi) != 0 {
        let s = 1_u64 << (63 - xi.max(yi).leading_zeros());
        let sig = (u64::from(yi >= s) << 1) | u64::from(xi >= s);
        id += s * s * sig;
        xi &= s - 1;
        yi &= s - 1;
    }
    TileId(id)
}

/// Inverse of [`tile_id`].
///
/// Every base-4 digit of the id is the quadrant signature of one level, lowest level first.
pub fn tile_coord(id: TileId) -> TileCoord {
    let mut rest = id.0;
    let mut x = 0_u64;
    let mut y = 0_u64;
    let mut level = 0_u32;
    while rest != 0 {
        x |= (rest & 1) << level;
        y |= ((rest >> 1) & 1) << level;
        rest >>= 2;
        level += 1;
    }
    #[allow(
        clippy::cast_possible_truncation,
        reason = "A u64 id holds at most 32 levels, so each axis fits in 32 bits."
    )]
    TileCoord::new(x as u32, y as u32)
}

/// Region (mask word) index of a tile.
#[inline]
pub const fn region_id(tile: TileId) -> usize {
    #[allow(
        clippy::cast_possible_truncation,
        reason = "Region ids index in-memory mask words."
    )]
    let region = (tile.0 / TILES_PER_REGION) as usize;
    region
}

/// Fixed-size square tiling of the non-negative world plane.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct TileGrid {
    tile_size: u32,
}

impl Default for TileGrid {
    fn default() -> Self {
        Self::new(DEFAULT_TILE_SIZE)
    }
}

impl TileGrid {
    /// Create a tiling with the given tile edge length in world units.
    pub fn new(tile_size: u32) -> Self {
        assert!(tile_size > 0, "tile size must be positive");
        Self { tile_size }
    }

    /// Tile edge length.
    pub const fn tile_size(&self) -> u32 {
        self.tile_size
    }

    /// Tile edge length as a float, for world-space arithmetic.
    pub fn edge(&self) -> f64 {
        f64::from(self.tile_size)
    }

    /// Tile coordinates of the tile containing `(x, y)`.
    ///
    /// Negative (and NaN) coordinates clamp to the first row or column.
    pub fn coord_at(&self, x: f64, y: f64) -> TileCoord {
        TileCoord::new(self.axis_index(x), self.axis_index(y))
    }

    /// Id of the tile containing `(x, y)`.
    pub fn tile_id(&self, x: f64, y: f64) -> TileId {
        tile_id(self.coord_at(x, y))
    }

    /// World-space top-left corner of a tile.
    pub fn origin_of(&self, coord: TileCoord) -> (f64, f64) {
        let edge = self.edge();
        (f64::from(coord.x) * edge, f64::from(coord.y) * edge)
    }

    /// World-space top-left corner of a tile id.
    pub fn origin_of_id(&self, id: TileId) -> (f64, f64) {
        self.origin_of(tile_coord(id))
    }

    /// Snap a world coordinate down to the start of its tile.
    pub fn snap(&self, v: f64) -> f64 {
        f64::from(self.axis_index(v)) * self.edge()
    }

    fn axis_index(&self, v: f64) -> u32 {
        let scaled = v / self.edge();
        if scaled.is_nan() || scaled <= 0.0 {
            return 0;
        }
        #[allow(
            clippy::cast_possible_truncation,
            reason = "Float to int casts saturate; truncation of a positive value is floor."
        )]
        let index = scaled as u32;
        index
    }
}
