// Copyright 2025 the Quilt Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Quilt Index: a coordinate-compressed 2D grid for topmost-wins lookups.
//!
//! [`TickGrid`] is built once from a list of axis-aligned boxes in paint order. The distinct
//! box edges on each axis cut the plane into cells, and each cell remembers the last box that
//! covered it. That answers two questions quickly:
//!
//! - [`TickGrid::query_point`]: which box is on top at this point?
//! - [`TickGrid::query_rect`]: which boxes show through anywhere in this rectangle?
//!
//! The grid is immutable. When boxes move, rebuild it.
//!
//! It is generic over the scalar type `T` and does not depend on any geometry crate.
//!
//! # Example
//!
//! ```rust
//! use quilt_index::{Aabb2D, TickGrid};
//!
//! let grid = TickGrid::build([
//!     (Aabb2D::new(0.0, 0.0, 10.0, 10.0), 1_u32),
//!     (Aabb2D::new(5.0, 5.0, 15.0, 15.0), 2),
//! ]);
//!
//! // The second box was painted last, so it wins the overlap.
//! assert_eq!(grid.query_point(6.0, 6.0), Some(2));
//! assert_eq!(grid.query_point(1.0, 1.0), Some(1));
//! assert_eq!(grid.query_point(20.0, 20.0), None);
//!
//! let hits: Vec<_> = grid.query_rect(Aabb2D::new(0.0, 0.0, 4.0, 4.0)).into_iter().collect();
//! assert_eq!(hits, vec![1]);
//! ```
//!
//! ### Float semantics
//!
//! This crate assumes no NaNs for floating-point coordinates.

#![no_std]

extern crate alloc;

pub mod grid;
pub mod types;

pub use grid::TickGrid;
pub use types::Aabb2D;
