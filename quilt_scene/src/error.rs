// Copyright 2025 the Quilt Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Error types.

use core::fmt;

use crate::shape::{ShapeId, ShapeKind};

/// A geometric operation was asked of a shape that cannot answer it.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ShapeError {
    /// The shape kind has no geometry (the abstract [`ShapeKind::Base`]).
    InvalidShape {
        /// Kind of the offending shape.
        kind: ShapeKind,
    },
    /// The parameter list is shorter than the kind requires.
    MissingParams {
        /// Kind of the offending shape.
        kind: ShapeKind,
        /// Parameters the kind reads.
        expected: usize,
        /// Parameters supplied.
        found: usize,
    },
}

impl fmt::Display for ShapeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidShape { kind } => write!(f, "{kind} shapes have no geometry"),
            Self::MissingParams {
                kind,
                expected,
                found,
            } => write!(f, "{kind} needs {expected} params, got {found}"),
        }
    }
}

impl std::error::Error for ShapeError {}

/// Rejected cache or scene configuration.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ConfigError {
    /// The outer block size is not a multiple of the inner one.
    BlockSizeMismatch {
        /// Shapes per L1 block.
        l1_block: usize,
        /// Shapes per L2 block.
        l2_block: usize,
    },
    /// A block size of zero.
    ZeroBlockSize,
    /// A tile edge of zero.
    ZeroTileSize,
    /// A cache capacity of zero.
    ZeroCapacity,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BlockSizeMismatch { l1_block, l2_block } => write!(
                f,
                "l1 block size {l1_block} is not a multiple of l2 block size {l2_block}"
            ),
            Self::ZeroBlockSize => f.write_str("block sizes must be positive"),
            Self::ZeroTileSize => f.write_str("tile size must be positive"),
            Self::ZeroCapacity => f.write_str("cache capacity must be positive"),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Errors surfaced by [`Scene`](crate::Scene) operations.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SceneError {
    /// A shape could not be measured or drawn.
    Shape(ShapeError),
    /// The scene configuration is invalid.
    Config(ConfigError),
    /// No shape has this id.
    UnknownShape(ShapeId),
    /// Adding the shapes would push a scan position past `u32::MAX`.
    TooManyShapes,
}

impl fmt::Display for SceneError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Shape(_) => f.write_str("invalid shape"),
            Self::Config(_) => f.write_str("invalid scene configuration"),
            Self::UnknownShape(id) => write!(f, "no shape with id {id}"),
            Self::TooManyShapes => f.write_str("shape ids are exhausted"),
        }
    }
}

impl std::error::Error for SceneError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Shape(err) => Some(err),
            Self::Config(err) => Some(err),
            Self::UnknownShape(_) | Self::TooManyShapes => None,
        }
    }
}

impl From<ShapeError> for SceneError {
    fn from(err: ShapeError) -> Self {
        Self::Shape(err)
    }
}

impl From<ConfigError> for SceneError {
    fn from(err: ConfigError) -> Self {
        Self::Config(err)
    }
}
