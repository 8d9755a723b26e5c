// Copyright 2025 the Quilt Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Coordinate-compressed grid: one cell per pair of adjacent ticks on each axis.

use alloc::collections::BTreeSet;
use alloc::vec;
use alloc::vec::Vec;
use core::fmt::Debug;

use crate::types::{Aabb2D, cmp_t, le, lt};

/// Topmost-wins spatial lookup over a fixed set of boxes.
///
/// The distinct box edges on each axis (the *ticks*) cut the plane into a grid of cells.
/// Cell `(i, j)` spans `[x_ticks[i], x_ticks[i + 1]) × [y_ticks[j], y_ticks[j + 1])` and stores
/// the payload of the last box in build order that covers it. The grid is immutable; when the
/// set of boxes changes, build a new one.
///
/// Memory is `|x_ticks| × |y_ticks|` cells, so this suits the few thousand boxes visible on
/// screen, not a whole world.
pub struct TickGrid<T: Copy + PartialOrd + Debug, P: Copy + Ord + Debug> {
    xs: Vec<T>,
    ys: Vec<T>,
    cells: Vec<Option<P>>,
    items: usize,
}

impl<T: Copy + PartialOrd + Debug, P: Copy + Ord + Debug> Default for TickGrid<T, P> {
    fn default() -> Self {
        Self {
            xs: Vec::new(),
            ys: Vec::new(),
            cells: Vec::new(),
            items: 0,
        }
    }
}

impl<T: Copy + PartialOrd + Debug, P: Copy + Ord + Debug> Debug for TickGrid<T, P> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let filled = self.cells.iter().filter(|c| c.is_some()).count();
        f.debug_struct("TickGrid")
            .field("items", &self.items)
            .field("x_ticks", &self.xs.len())
            .field("y_ticks", &self.ys.len())
            .field("filled_cells", &filled)
            .finish_non_exhaustive()
    }
}

impl<T: Copy + PartialOrd + Debug, P: Copy + Ord + Debug> TickGrid<T, P> {
    /// Create an empty grid; every query misses.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the grid from boxes in paint order. Later boxes win shared cells.
    ///
    /// Boxes without area still contribute ticks but own no cells.
    pub fn build<I>(items: I) -> Self
    where
        I: IntoIterator<Item = (Aabb2D<T>, P)>,
    {
        let items: Vec<(Aabb2D<T>, P)> = items.into_iter().collect();
        let mut xs = Vec::with_capacity(items.len() * 2);
        let mut ys = Vec::with_capacity(items.len() * 2);
        for (aabb, _) in &items {
            xs.extend([aabb.min_x, aabb.max_x]);
            ys.extend([aabb.min_y, aabb.max_y]);
        }
        sort_dedup(&mut xs);
        sort_dedup(&mut ys);

        let ny = ys.len();
        let mut cells = vec![None; xs.len() * ny];
        for (aabb, payload) in &items {
            let (Some(x0), Some(x1), Some(y0), Some(y1)) = (
                exact(&xs, aabb.min_x),
                exact(&xs, aabb.max_x),
                exact(&ys, aabb.min_y),
                exact(&ys, aabb.max_y),
            ) else {
                continue;
            };
            for xi in x0..x1 {
                cells[xi * ny + y0..xi * ny + y1.max(y0)].fill(Some(*payload));
            }
        }

        Self {
            xs,
            ys,
            cells,
            items: items.len(),
        }
    }

    /// Number of boxes the grid was built from.
    pub fn len(&self) -> usize {
        self.items
    }

    /// True if the grid was built from no boxes.
    pub fn is_empty(&self) -> bool {
        self.items == 0
    }

    /// Sorted distinct x edges.
    pub fn x_ticks(&self) -> &[T] {
        &self.xs
    }

    /// Sorted distinct y edges.
    pub fn y_ticks(&self) -> &[T] {
        &self.ys
    }

    /// Drop all ticks and cells.
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Payload of the topmost box covering the point, if any.
    ///
    /// Cells are half-open, so a point on a box's right or bottom edge misses that box.
    pub fn query_point(&self, x: T, y: T) -> Option<P> {
        let xi = last_le(&self.xs, x)?;
        let yi = last_le(&self.ys, y)?;
        self.cells[xi * self.ys.len() + yi]
    }

    /// Distinct payloads owning at least one cell that intersects `rect`.
    pub fn query_rect(&self, rect: Aabb2D<T>) -> BTreeSet<P> {
        let mut out = BTreeSet::new();
        if rect.is_empty() {
            return out;
        }
        let (Some((x0, x1)), Some((y0, y1))) = (
            cell_span(&self.xs, rect.min_x, rect.max_x),
            cell_span(&self.ys, rect.min_y, rect.max_y),
        ) else {
            return out;
        };
        let ny = self.ys.len();
        for xi in x0..x1 {
            out.extend(self.cells[xi * ny + y0..xi * ny + y1].iter().flatten().copied());
        }
        out
    }
}

fn sort_dedup<T: Copy + PartialOrd>(ticks: &mut Vec<T>) {
    ticks.sort_by(cmp_t);
    ticks.dedup_by(|a, b| cmp_t(a, b).is_eq());
}

fn exact<T: Copy + PartialOrd>(ticks: &[T], v: T) -> Option<usize> {
    ticks.binary_search_by(|t| cmp_t(t, &v)).ok()
}

fn last_le<T: Copy + PartialOrd>(ticks: &[T], v: T) -> Option<usize> {
    ticks.partition_point(|t| le(*t, v)).checked_sub(1)
}

/// Half-open range of cells on one axis whose span meets `[lo, hi]`.
fn cell_span<T: Copy + PartialOrd>(ticks: &[T], lo: T, hi: T) -> Option<(usize, usize)> {
    let (first, last) = (*ticks.first()?, *ticks.last()?);
    if lt(hi, first) || lt(last, lo) {
        return None;
    }
    let start = last_le(ticks, lo).unwrap_or(0);
    let end = ticks
        .partition_point(|t| lt(*t, hi))
        .max(start + 1)
        .min(ticks.len());
    Some((start, end))
}
