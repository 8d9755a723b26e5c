// Copyright 2025 the Quilt Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Shapes: closed variants over a flat parameter list, dispatched through one table.

use std::collections::BTreeSet;
use std::fmt;

use kurbo::{Affine, BezPath, Circle, Point, Rect, Shape as _, Vec2};
use quilt_tiling::{RegionMask, TileGrid};

use crate::color::Color;
use crate::error::ShapeError;
use crate::surface::Surface;

/// Width of the outline drawn around every shape.
pub const OUTLINE_WIDTH: f64 = 2.0;

/// Flattening tolerance for curved outlines.
const TOLERANCE: f64 = 0.1;

/// Stable id of a shape: its position in scan (paint) order.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ShapeId(pub u32);

impl ShapeId {
    /// Id of the shape at scan position `index`, or `None` past `u32::MAX`.
    pub fn from_index(index: usize) -> Option<Self> {
        u32::try_from(index).ok().map(Self)
    }

    /// Scan position.
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for ShapeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Shape variants.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ShapeKind {
    /// `[x, y, w, h]`.
    Rectangle = 0,
    /// `[x0, y0, x1, y1, x2, y2]`.
    Triangle = 1,
    /// `[cx, cy, r]`.
    Circle = 2,
    /// The abstract variant; has no geometry.
    Base = 3,
}

impl ShapeKind {
    /// Number of parameters the kind reads, or `None` for [`ShapeKind::Base`].
    pub fn param_count(self) -> Option<usize> {
        self.ops().map(|ops| ops.params)
    }

    fn ops(self) -> Option<&'static ShapeOps> {
        SHAPE_OPS.get(self as usize)
    }

    const fn name(self) -> &'static str {
        match self {
            Self::Rectangle => "rectangle",
            Self::Triangle => "triangle",
            Self::Circle => "circle",
            Self::Base => "base",
        }
    }
}

impl fmt::Display for ShapeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Geometry callbacks for one kind. Parameter slices are at least `params` long.
struct ShapeOps {
    params: usize,
    bounds: fn(&[f64]) -> Rect,
    center: fn(&[f64]) -> Point,
    translate: fn(&mut [f64], Vec2),
    path: fn(&[f64]) -> BezPath,
}

/// Indexed by `ShapeKind as usize`; `Base` falls off the end.
static SHAPE_OPS: [ShapeOps; 3] = [
    ShapeOps {
        params: 4,
        bounds: |p| Rect::new(p[0], p[1], p[0] + p[2], p[1] + p[3]),
        center: |p| Point::new(p[0] + p[2] / 2.0, p[1] + p[3] / 2.0),
        translate: translate_points::<1>,
        path: |p| Rect::new(p[0], p[1], p[0] + p[2], p[1] + p[3]).to_path(TOLERANCE),
    },
    ShapeOps {
        params: 6,
        bounds: |p| {
            let [a, b, c] = triangle(p);
            Rect::from_points(a, b).union_pt(c)
        },
        center: |p| {
            let [a, b, c] = triangle(p);
            Point::new((a.x + b.x + c.x) / 3.0, (a.y + b.y + c.y) / 3.0)
        },
        translate: translate_points::<3>,
        path: |p| {
            let [a, b, c] = triangle(p);
            let mut path = BezPath::new();
            path.move_to(a);
            path.line_to(b);
            path.line_to(c);
            path.close_path();
            path
        },
    },
    ShapeOps {
        params: 3,
        bounds: |p| Circle::new((p[0], p[1]), p[2]).bounding_box(),
        center: |p| Point::new(p[0], p[1]),
        translate: translate_points::<1>,
        path: |p| Circle::new((p[0], p[1]), p[2]).to_path(TOLERANCE),
    },
];

fn triangle(p: &[f64]) -> [Point; 3] {
    [
        Point::new(p[0], p[1]),
        Point::new(p[2], p[3]),
        Point::new(p[4], p[5]),
    ]
}

/// Shift the first `N` `(x, y)` pairs.
fn translate_points<const N: usize>(p: &mut [f64], delta: Vec2) {
    for pair in p.chunks_exact_mut(2).take(N) {
        pair[0] += delta.x;
        pair[1] += delta.y;
    }
}

/// Everything needed to add a shape to a scene.
#[derive(Clone, Debug, PartialEq)]
pub struct ShapeDesc {
    /// Variant.
    pub kind: ShapeKind,
    /// Geometry parameters, read according to `kind`.
    pub params: Vec<f64>,
    /// Fill color.
    pub color: Color,
    /// Free-form label.
    pub label: String,
    /// Outgoing links to other shapes.
    pub links: Vec<ShapeId>,
}

impl ShapeDesc {
    /// A shape of any kind with a black fill.
    pub fn new(kind: ShapeKind, params: impl Into<Vec<f64>>) -> Self {
        Self {
            kind,
            params: params.into(),
            color: Color::BLACK,
            label: String::new(),
            links: Vec::new(),
        }
    }

    /// An axis-aligned rectangle.
    pub fn rect(x: f64, y: f64, w: f64, h: f64) -> Self {
        Self::new(ShapeKind::Rectangle, [x, y, w, h])
    }

    /// A triangle through three vertices.
    pub fn triangle(a: Point, b: Point, c: Point) -> Self {
        Self::new(ShapeKind::Triangle, [a.x, a.y, b.x, b.y, c.x, c.y])
    }

    /// A circle.
    pub fn circle(center: Point, radius: f64) -> Self {
        Self::new(ShapeKind::Circle, [center.x, center.y, radius])
    }

    /// Set the fill color.
    #[must_use]
    pub fn with_color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }

    /// Set the label.
    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    /// Add an outgoing link.
    #[must_use]
    pub fn with_link(mut self, to: ShapeId) -> Self {
        self.links.push(to);
        self
    }
}

/// A shape in a scene.
#[derive(Clone, Debug, PartialEq)]
pub struct Shape {
    id: ShapeId,
    kind: ShapeKind,
    color: Color,
    label: String,
    params: Vec<f64>,
    mask: RegionMask,
    pub(crate) incoming: BTreeSet<ShapeId>,
    pub(crate) outgoing: BTreeSet<ShapeId>,
}

impl Shape {
    /// A detached shape with an empty tile mask. Geometry is checked lazily.
    pub fn new(id: ShapeId, kind: ShapeKind, params: Vec<f64>, color: Color) -> Self {
        Self {
            id,
            kind,
            color,
            label: String::new(),
            params,
            mask: RegionMask::new(),
            incoming: BTreeSet::new(),
            outgoing: BTreeSet::new(),
        }
    }

    /// Build from a description and compute the tile mask. Links are not resolved here.
    pub(crate) fn from_desc(
        id: ShapeId,
        desc: ShapeDesc,
        grid: &TileGrid,
    ) -> Result<Self, ShapeError> {
        let mut shape = Self::new(id, desc.kind, desc.params, desc.color);
        shape.label = desc.label;
        shape.mask = shape.compute_mask(grid)?;
        Ok(shape)
    }

    /// Scan-order id.
    pub fn id(&self) -> ShapeId {
        self.id
    }

    /// Variant.
    pub fn kind(&self) -> ShapeKind {
        self.kind
    }

    /// Fill color.
    pub fn color(&self) -> Color {
        self.color
    }

    /// Label.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Raw geometry parameters.
    pub fn params(&self) -> &[f64] {
        &self.params
    }

    /// Tiles touched by the corners of the bounding box, as of the last geometry change.
    pub fn mask(&self) -> &RegionMask {
        &self.mask
    }

    /// Shapes linking to this one.
    pub fn incoming(&self) -> &BTreeSet<ShapeId> {
        &self.incoming
    }

    /// Shapes this one links to.
    pub fn outgoing(&self) -> &BTreeSet<ShapeId> {
        &self.outgoing
    }

    fn ops(&self) -> Result<&'static ShapeOps, ShapeError> {
        let ops = self
            .kind
            .ops()
            .ok_or(ShapeError::InvalidShape { kind: self.kind })?;
        if self.params.len() < ops.params {
            return Err(ShapeError::MissingParams {
                kind: self.kind,
                expected: ops.params,
                found: self.params.len(),
            });
        }
        Ok(ops)
    }

    /// World-space bounding box.
    pub fn bounds(&self) -> Result<Rect, ShapeError> {
        Ok((self.ops()?.bounds)(&self.params))
    }

    /// World-space centre.
    pub fn center(&self) -> Result<Point, ShapeError> {
        Ok((self.ops()?.center)(&self.params))
    }

    /// Outline in world space.
    pub fn path(&self) -> Result<BezPath, ShapeError> {
        Ok((self.ops()?.path)(&self.params))
    }

    /// Fill, then outline in black, with world coordinates shifted by `offset`.
    ///
    /// Ink never leaves [`Shape::bounds`], so only the tiles named by the mask are touched.
    /// The outline is the inner half of an [`OUTLINE_WIDTH`] stroke.
    pub fn draw<S: Surface>(&self, surface: &mut S, offset: Vec2) -> Result<(), ShapeError> {
        let clip = self.bounds()? + offset;
        let path = Affine::translate(offset) * self.path()?;
        surface.fill_path_clipped(&path, self.color, clip);
        surface.stroke_path_clipped(&path, OUTLINE_WIDTH, Color::BLACK, clip);
        Ok(())
    }

    /// Tiles of the four bounding-box corners. Negative coordinates clamp to zero.
    pub fn compute_mask(&self, grid: &TileGrid) -> Result<RegionMask, ShapeError> {
        let b = self.bounds()?;
        Ok(RegionMask::from_tiles(
            [(b.x0, b.y0), (b.x1, b.y0), (b.x0, b.y1), (b.x1, b.y1)]
                .map(|(x, y)| grid.tile_id(x, y)),
        ))
    }

    /// Shift the geometry. The mask is left for the caller to refresh.
    pub(crate) fn translate(&mut self, delta: Vec2) -> Result<(), ShapeError> {
        let ops = self.ops()?;
        (ops.translate)(&mut self.params, delta);
        Ok(())
    }

    /// Recompute the mask, returning the previous one.
    pub(crate) fn refresh_mask(&mut self, grid: &TileGrid) -> Result<RegionMask, ShapeError> {
        let mask = self.compute_mask(grid)?;
        Ok(core::mem::replace(&mut self.mask, mask))
    }

    pub(crate) fn set_color(&mut self, color: Color) {
        self.color = color;
    }

    pub(crate) fn set_label(&mut self, label: String) {
        self.label = label;
    }
}
