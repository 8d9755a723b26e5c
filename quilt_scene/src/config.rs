// Copyright 2025 the Quilt Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tile cache and scene configuration.

use quilt_tiling::DEFAULT_TILE_SIZE;

use crate::color::Color;
use crate::error::ConfigError;

/// Shapes per innermost composition block.
pub const DEFAULT_L2_BLOCK: usize = 30_001;
/// Shapes per outer composition block.
pub const DEFAULT_L1_BLOCK: usize = 7 * DEFAULT_L2_BLOCK;
/// Entries kept by the tile cache before evicting.
pub const DEFAULT_CAPACITY: usize = 2048;

/// Block sizes and capacity for a [`TileCache`](crate::TileCache).
///
/// Shapes are grouped by scan position into L2 blocks of `l2_block` shapes, and L2 blocks
/// into L1 blocks of `l1_block` shapes. Editing one shape only discards the buffers of the
/// blocks that contain it.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct TileCacheConfig {
    /// Shapes per L2 block.
    pub l2_block: usize,
    /// Shapes per L1 block; a multiple of `l2_block`.
    pub l1_block: usize,
    /// Maximum number of cached entries across all levels.
    pub capacity: usize,
}

impl Default for TileCacheConfig {
    fn default() -> Self {
        Self {
            l2_block: DEFAULT_L2_BLOCK,
            l1_block: DEFAULT_L1_BLOCK,
            capacity: DEFAULT_CAPACITY,
        }
    }
}

impl TileCacheConfig {
    /// Set both block sizes.
    #[must_use]
    pub fn with_blocks(mut self, l2_block: usize, l1_block: usize) -> Self {
        self.l2_block = l2_block;
        self.l1_block = l1_block;
        self
    }

    /// Set the entry capacity.
    #[must_use]
    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    /// Check the block sizes nest and the capacity is usable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.l1_block == 0 || self.l2_block == 0 {
            return Err(ConfigError::ZeroBlockSize);
        }
        if self.l1_block % self.l2_block != 0 {
            return Err(ConfigError::BlockSizeMismatch {
                l1_block: self.l1_block,
                l2_block: self.l2_block,
            });
        }
        if self.capacity == 0 {
            return Err(ConfigError::ZeroCapacity);
        }
        Ok(())
    }
}

/// Settings for a [`Scene`](crate::Scene).
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct SceneConfig {
    /// Tile edge in world units.
    pub tile_size: u32,
    /// Composition cache settings.
    pub tile_cache: TileCacheConfig,
    /// Fill painted under the shapes of every tile.
    pub background: Color,
    /// Fill of the render target before the scene is blitted.
    pub clear_color: Color,
    /// Outline of the shape under the pointer.
    pub hover_color: Color,
    /// Outline of selected shapes.
    pub selection_color: Color,
    /// Smallest zoom factor the wheel may reach.
    pub min_scale: f64,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            tile_size: DEFAULT_TILE_SIZE,
            tile_cache: TileCacheConfig::default(),
            background: Color::rgb(236, 240, 246),
            clear_color: Color::WHITE,
            hover_color: Color::RED,
            selection_color: Color::BLUE,
            min_scale: 0.5,
        }
    }
}

impl SceneConfig {
    /// Set the tile edge.
    #[must_use]
    pub fn with_tile_size(mut self, tile_size: u32) -> Self {
        self.tile_size = tile_size;
        self
    }

    /// Replace the cache settings.
    #[must_use]
    pub fn with_tile_cache(mut self, tile_cache: TileCacheConfig) -> Self {
        self.tile_cache = tile_cache;
        self
    }

    /// Set the tile background.
    #[must_use]
    pub fn with_background(mut self, background: Color) -> Self {
        self.background = background;
        self
    }

    /// Set the target clear color.
    #[must_use]
    pub fn with_clear_color(mut self, clear_color: Color) -> Self {
        self.clear_color = clear_color;
        self
    }

    /// Set the hover and selection outline colors.
    #[must_use]
    pub fn with_highlight(mut self, hover: Color, selection: Color) -> Self {
        self.hover_color = hover;
        self.selection_color = selection;
        self
    }

    /// Set the zoom floor.
    #[must_use]
    pub fn with_min_scale(mut self, min_scale: f64) -> Self {
        self.min_scale = min_scale;
        self
    }

    /// Validate the tile size and the cache settings.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tile_size == 0 {
            return Err(ConfigError::ZeroTileSize);
        }
        self.tile_cache.validate()
    }
}
