// Copyright 2025 the Quilt Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Growable tile membership bitset, one `u16` word per region.

use alloc::vec;
use alloc::vec::Vec;
use core::fmt::Debug;

use crate::grid::{TILES_PER_REGION, TileId, region_id};

const INITIAL_REGIONS: usize = 4;

/// Set of tile ids, stored as one 16-bit word per region.
///
/// Words are allocated on demand (exact fit to the highest region touched), so a mask
/// only costs as much memory as the farthest tile it names.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct RegionMask {
    words: Vec<u16>,
}

impl Default for RegionMask {
    fn default() -> Self {
        Self::new()
    }
}

impl Debug for RegionMask {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_set().entries(self.tile_ids()).finish()
    }
}

impl RegionMask {
    /// Create an empty mask with a few preallocated regions.
    pub fn new() -> Self {
        Self {
            words: vec![0; INITIAL_REGIONS],
        }
    }

    /// Build a mask from a set of tiles.
    pub fn from_tiles<I: IntoIterator<Item = TileId>>(tiles: I) -> Self {
        let mut mask = Self::new();
        for tile in tiles {
            mask.set(tile);
        }
        mask
    }

    /// Number of region words currently allocated.
    pub fn regions(&self) -> usize {
        self.words.len()
    }

    /// Mark a tile as touched, growing the word array if needed.
    pub fn set(&mut self, tile: TileId) {
        let region = region_id(tile);
        if region >= self.words.len() {
            self.words.resize(region + 1, 0);
        }
        self.words[region] |= bit(tile);
    }

    /// Unmark a tile. Never grows the mask.
    pub fn clear(&mut self, tile: TileId) {
        if let Some(word) = self.words.get_mut(region_id(tile)) {
            *word &= !bit(tile);
        }
    }

    /// Unmark every tile, keeping the allocation.
    pub fn clear_all(&mut self) {
        self.words.fill(0);
    }

    /// Whether the tile is marked.
    pub fn contains(&self, tile: TileId) -> bool {
        self.words
            .get(region_id(tile))
            .is_some_and(|word| word & bit(tile) != 0)
    }

    /// True if no tile is marked.
    pub fn is_empty(&self) -> bool {
        self.words.iter().all(|&word| word == 0)
    }

    /// Whether any tile is marked in both masks. Compares the shorter word range only.
    pub fn intersects(&self, other: &Self) -> bool {
        self.words
            .iter()
            .zip(&other.words)
            .any(|(a, b)| a & b != 0)
    }

    /// Add every tile of `other` to this mask.
    pub fn union_with(&mut self, other: &Self) {
        if other.words.len() > self.words.len() {
            self.words.resize(other.words.len(), 0);
        }
        for (word, extra) in self.words.iter_mut().zip(&other.words) {
            *word |= extra;
        }
    }

    /// Iterate marked tiles in ascending id order.
    ///
    /// The iterator borrows the mask and is `Clone`, so it can be restarted cheaply.
    pub fn tile_ids(&self) -> TileIds<'_> {
        TileIds {
            words: &self.words,
            region: 0,
            pending: self.words.first().copied().unwrap_or(0),
        }
    }
}

#[inline]
fn bit(tile: TileId) -> u16 {
    1 << (tile.0 % TILES_PER_REGION)
}

/// Iterator over the tiles of a [`RegionMask`].
#[derive(Clone, Debug)]
pub struct TileIds<'a> {
    words: &'a [u16],
    region: usize,
    pending: u16,
}

impl Iterator for TileIds<'_> {
    type Item = TileId;

    fn next(&mut self) -> Option<TileId> {
        while self.pending == 0 {
            self.region += 1;
            self.pending = *self.words.get(self.region)?;
        }
        let offset = u64::from(self.pending.trailing_zeros());
        self.pending &= self.pending - 1;
        Some(TileId(self.region as u64 * TILES_PER_REGION + offset))
    }
}
