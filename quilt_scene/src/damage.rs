// Copyright 2025 the Quilt Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Damage reports returned by scene mutations.

use kurbo::Rect;
use quilt_tiling::{RegionMask, TileGrid};

use crate::tile_cache::CacheKey;

bitflags::bitflags! {
    /// What a mutation touched.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct Change: u8 {
        /// Position or size; tile masks are recomputed.
        const GEOMETRY  = 0b0000_0001;
        /// Fill color.
        const STYLE     = 0b0000_0010;
        /// Label text; not drawn.
        const LABEL     = 0b0000_0100;
        /// Link graph; not drawn.
        const LINKS     = 0b0000_1000;
        /// Shapes added or removed.
        const STRUCTURE = 0b0001_0000;
    }
}

impl Change {
    /// Changes that alter pixels.
    pub const VISUAL: Self = Self::GEOMETRY.union(Self::STYLE).union(Self::STRUCTURE);
    /// Changes that can move shapes in or out of the spatial index.
    pub const SPATIAL: Self = Self::GEOMETRY.union(Self::STRUCTURE);
}

/// Summary of what a mutation invalidated.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Damage {
    /// Kind of mutation.
    pub change: Change,
    /// Tiles whose cached buffers were dropped (old ∪ new tiles of the shape).
    pub tiles: RegionMask,
    /// Cache keys that were present and are now gone.
    pub evicted: Vec<CacheKey>,
}

impl Damage {
    /// A report with no tiles.
    pub fn new(change: Change) -> Self {
        Self {
            change,
            ..Self::default()
        }
    }

    /// True if nothing needs repainting.
    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    /// Fold another report into this one.
    pub fn merge(&mut self, other: Self) {
        self.change |= other.change;
        self.tiles.union_with(&other.tiles);
        self.evicted.extend(other.evicted);
    }

    /// World-space union of the damaged tiles. Returns `None` if empty.
    pub fn union_rect(&self, grid: &TileGrid) -> Option<Rect> {
        let edge = grid.edge();
        let mut it = self.tiles.tile_ids().map(|tile| {
            let (x, y) = grid.origin_of_id(tile);
            Rect::new(x, y, x + edge, y + edge)
        });
        let first = it.next()?;
        Some(it.fold(first, |acc, r| acc.union(r)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quilt_tiling::TileId;

    #[test]
    fn union_rect_spans_damaged_tiles() {
        let grid = TileGrid::new(10);
        let mut damage = Damage::new(Change::GEOMETRY);
        assert!(damage.is_empty());
        assert_eq!(damage.union_rect(&grid), None);

        damage.merge(Damage {
            change: Change::STYLE,
            tiles: RegionMask::from_tiles([TileId(1), TileId(2)]),
            evicted: vec![CacheKey::FullScene],
        });
        assert_eq!(damage.change, Change::GEOMETRY | Change::STYLE);
        assert_eq!(damage.union_rect(&grid), Some(Rect::new(0.0, 0.0, 20.0, 20.0)));
        assert_eq!(damage.evicted, vec![CacheKey::FullScene]);
    }

    #[test]
    fn visual_flags() {
        assert!(Change::VISUAL.contains(Change::STYLE));
        assert!(!Change::VISUAL.intersects(Change::LABEL | Change::LINKS));
        assert!(Change::SPATIAL.contains(Change::STRUCTURE));
    }
}
