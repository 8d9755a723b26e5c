// Copyright 2025 the Quilt Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Quilt Tiling: world-to-tile partitioning and tile membership masks.
//!
//! The world is split into square tiles of a fixed edge length. Each tile gets a dense
//! integer id by walking the quadtree from the largest power-of-two quadrant down, so
//! neighbouring tiles get small, nearby ids. Sixteen consecutive ids form a *region*,
//! which maps to one `u16` word of a [`RegionMask`].
//!
//! - [`TileGrid`] maps world coordinates to [`TileCoord`]s and [`TileId`]s.
//! - [`tile_id`] / [`tile_coord`] convert between integer tile coordinates and ids.
//! - [`RegionMask`] records which tiles a shape touches and answers
//!   "does this shape touch any of these tiles" in O(words).
//!
//! # Example
//!
//! ```rust
//! use quilt_tiling::{RegionMask, TileGrid, TileId};
//!
//! let grid = TileGrid::new(640);
//! assert_eq!(grid.tile_id(0.0, 0.0), TileId(0));
//! assert_eq!(grid.tile_id(700.0, 0.0), TileId(1));
//! assert_eq!(grid.tile_id(1400.0, 0.0), TileId(4));
//!
//! let mut shape = RegionMask::new();
//! shape.set(grid.tile_id(700.0, 10.0));
//!
//! let visible = RegionMask::from_tiles([TileId(0), TileId(1)]);
//! assert!(shape.intersects(&visible));
//! assert_eq!(shape.tile_ids().collect::<Vec<_>>(), vec![TileId(1)]);
//! ```

#![no_std]

extern crate alloc;

pub mod grid;
pub mod mask;

pub use grid::{DEFAULT_TILE_SIZE, TileCoord, TileGrid, TileId, region_id, tile_coord, tile_id};
pub use mask::{RegionMask, TileIds};
