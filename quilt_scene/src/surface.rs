// Copyright 2025 the Quilt Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Drawing surfaces.
//!
//! The tile cache only needs to create surfaces, draw shapes onto them, and composite them
//! onto each other. [`Surface`] is that seam; [`Raster`] is a small software implementation
//! used by tests and demos.

use core::fmt;
use core::ops::Range;

use kurbo::{BezPath, ParamCurveNearest, PathSeg, Point, Rect, Shape as _, Vec2};

use crate::color::Color;

/// Something shapes can be drawn on and buffers can be composited onto.
///
/// Coordinates are pixels with the origin at the top-left corner. Drawing outside the
/// surface is clipped.
pub trait Surface: Sized {
    /// A transparent surface of the given size.
    fn create(width: u32, height: u32) -> Self;
    /// Width in pixels.
    fn width(&self) -> u32;
    /// Height in pixels.
    fn height(&self) -> u32;
    /// Overwrite every pixel.
    fn clear(&mut self, color: Color);
    /// Composite a solid rectangle.
    fn fill_rect(&mut self, rect: Rect, color: Color);
    /// Composite the interior of a path (nonzero winding).
    fn fill_path(&mut self, path: &BezPath, color: Color) {
        self.fill_path_clipped(path, color, path.bounding_box());
    }
    /// Composite an outline of the given width centred on a path.
    fn stroke_path(&mut self, path: &BezPath, width: f64, color: Color) {
        let half = (width / 2.0).max(0.0);
        let reach = path.bounding_box().inflate(half, half);
        self.stroke_path_clipped(path, width, color, reach);
    }
    /// Like [`Surface::fill_path`], touching only pixels whose centres lie inside `clip`.
    fn fill_path_clipped(&mut self, path: &BezPath, color: Color, clip: Rect);
    /// Like [`Surface::stroke_path`], touching only pixels whose centres lie inside `clip`.
    fn stroke_path_clipped(&mut self, path: &BezPath, width: f64, color: Color, clip: Rect);
    /// Composite `src` with its top-left corner at `offset`.
    fn blit(&mut self, src: &Self, offset: Vec2);
    /// Composite `src` scaled by `scale` with its top-left corner at `offset`.
    fn blit_scaled(&mut self, src: &Self, offset: Vec2, scale: f64);
}

/// Software RGBA surface.
///
/// Pixels are packed [`Color`]s. A pixel is covered when its centre is inside the shape;
/// there is no anti-aliasing. Scaled blits sample the nearest source pixel.
#[derive(Clone, PartialEq, Eq)]
pub struct Raster {
    width: u32,
    height: u32,
    pixels: Vec<u32>,
}

impl fmt::Debug for Raster {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Raster")
            .field("width", &self.width)
            .field("height", &self.height)
            .finish_non_exhaustive()
    }
}

impl Raster {
    /// A transparent raster.
    pub fn new(width: u32, height: u32) -> Self {
        Self::filled(width, height, Color::TRANSPARENT)
    }

    /// A raster with every pixel set to `color`.
    pub fn filled(width: u32, height: u32, color: Color) -> Self {
        Self {
            width,
            height,
            pixels: vec![color.to_u32(); width as usize * height as usize],
        }
    }

    /// Color at `(x, y)`, or `None` outside the raster.
    pub fn pixel(&self, x: u32, y: u32) -> Option<Color> {
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(Color::from_u32(self.pixels[self.index(x, y)]))
    }

    /// Packed pixels in row-major order.
    pub fn pixels(&self) -> &[u32] {
        &self.pixels
    }

    fn index(&self, x: u32, y: u32) -> usize {
        y as usize * self.width as usize + x as usize
    }

    fn blend(&mut self, x: u32, y: u32, color: Color) {
        let i = self.index(x, y);
        self.pixels[i] = color.over(Color::from_u32(self.pixels[i])).to_u32();
    }

    fn blend_where(&mut self, bounds: Rect, color: Color, covered: impl Fn(Point) -> bool) {
        let xs = span(bounds.x0, bounds.x1, self.width);
        for y in span(bounds.y0, bounds.y1, self.height) {
            for x in xs.clone() {
                if covered(center(x, y)) {
                    self.blend(x, y, color);
                }
            }
        }
    }
}

impl Surface for Raster {
    fn create(width: u32, height: u32) -> Self {
        Self::new(width, height)
    }

    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn clear(&mut self, color: Color) {
        self.pixels.fill(color.to_u32());
    }

    fn fill_rect(&mut self, rect: Rect, color: Color) {
        self.blend_where(rect.abs(), color, |_| true);
    }

    fn fill_path_clipped(&mut self, path: &BezPath, color: Color, clip: Rect) {
        let bounds = path.bounding_box().intersect(clip.abs());
        self.blend_where(bounds, color, |p| path.winding(p) != 0);
    }

    fn stroke_path_clipped(&mut self, path: &BezPath, width: f64, color: Color, clip: Rect) {
        let half = width / 2.0;
        if half.is_nan() || half <= 0.0 {
            return;
        }
        let segments: Vec<PathSeg> = path.segments().collect();
        let bounds = path.bounding_box().inflate(half, half).intersect(clip.abs());
        self.blend_where(bounds, color, |p| {
            segments
                .iter()
                .any(|seg| seg.nearest(p, 1e-3).distance_sq <= half * half)
        });
    }

    fn blit(&mut self, src: &Self, offset: Vec2) {
        let (ox, oy) = (round_px(offset.x), round_px(offset.y));
        for sy in 0..src.height {
            let Ok(dy) = u32::try_from(oy + i64::from(sy)) else {
                continue;
            };
            if dy >= self.height {
                break;
            }
            for sx in 0..src.width {
                let Ok(dx) = u32::try_from(ox + i64::from(sx)) else {
                    continue;
                };
                if dx >= self.width {
                    break;
                }
                let color = Color::from_u32(src.pixels[src.index(sx, sy)]);
                self.blend(dx, dy, color);
            }
        }
    }

    fn blit_scaled(&mut self, src: &Self, offset: Vec2, scale: f64) {
        if scale.is_nan() || scale <= 0.0 {
            return;
        }
        let target = Rect::new(
            offset.x,
            offset.y,
            offset.x + f64::from(src.width) * scale,
            offset.y + f64::from(src.height) * scale,
        );
        let xs = span(target.x0, target.x1, self.width);
        for y in span(target.y0, target.y1, self.height) {
            let sy = clamp_px(((f64::from(y) + 0.5 - offset.y) / scale).floor(), src.height);
            if sy >= src.height {
                continue;
            }
            for x in xs.clone() {
                let sx = clamp_px(((f64::from(x) + 0.5 - offset.x) / scale).floor(), src.width);
                if sx >= src.width {
                    continue;
                }
                let color = Color::from_u32(src.pixels[src.index(sx, sy)]);
                self.blend(x, y, color);
            }
        }
    }
}

fn center(x: u32, y: u32) -> Point {
    Point::new(f64::from(x) + 0.5, f64::from(y) + 0.5)
}

/// Pixels whose centres fall in `[lo, hi)`, clipped to `0..len`.
fn span(lo: f64, hi: f64, len: u32) -> Range<u32> {
    let start = clamp_px((lo - 0.5).ceil(), len);
    let end = clamp_px((hi - 0.5).ceil(), len);
    start..end.max(start)
}

#[allow(
    clippy::cast_possible_truncation,
    reason = "The value is clamped to 0..=len before the cast."
)]
fn clamp_px(v: f64, len: u32) -> u32 {
    if v.is_nan() {
        return 0;
    }
    v.clamp(0.0, f64::from(len)) as u32
}

#[allow(
    clippy::cast_possible_truncation,
    reason = "Float to int casts saturate; offsets beyond i64 are off-surface anyway."
)]
fn round_px(v: f64) -> i64 {
    v.round() as i64
}


#[cfg(test)]
mod tests {
    use super::*;
    use kurbo::{Circle, Shape};

    #[test]
    fn fill_rect_covers_pixel_centres() {
        let mut r = Raster::new(8, 8);
        r.fill_rect(Rect::new(1.0, 1.0, 3.0, 2.6), Color::BLACK);
        assert_eq!(r.pixel(1, 1), Some(Color::BLACK));
        assert_eq!(r.pixel(2, 2), Some(Color::BLACK));
        assert_eq!(r.pixel(3, 1), Some(Color::TRANSPARENT));
        assert_eq!(r.pixel(1, 3), Some(Color::TRANSPARENT));
        assert_eq!(r.pixel(8, 0), None);
    }

    #[test]
    fn fill_path_uses_winding() {
        let mut r = Raster::new(20, 20);
        let path = Circle::new((10.0, 10.0), 5.0).to_path(0.1);
        r.fill_path(&path, Color::RED);
        assert_eq!(r.pixel(10, 10), Some(Color::RED));
        assert_eq!(r.pixel(1, 1), Some(Color::TRANSPARENT));
    }

    #[test]
    fn stroke_hugs_the_outline() {
        let mut r = Raster::new(20, 20);
        let path = Rect::new(4.0, 4.0, 16.0, 16.0).to_path(0.1);
        r.stroke_path(&path, 2.0, Color::BLACK);
        assert_eq!(r.pixel(4, 10), Some(Color::BLACK));
        assert_eq!(r.pixel(10, 15), Some(Color::BLACK));
        assert_eq!(r.pixel(10, 10), Some(Color::TRANSPARENT));
    }

    #[test]
    fn clipped_stroke_stays_inside_the_clip() {
        let mut r = Raster::new(20, 20);
        let rect = Rect::new(4.0, 4.0, 16.0, 16.0);
        r.stroke_path_clipped(&rect.to_path(0.1), 2.0, Color::BLACK, rect);
        // The inner half of the outline is drawn.
        assert_eq!(r.pixel(4, 10), Some(Color::BLACK));
        assert_eq!(r.pixel(15, 10), Some(Color::BLACK));
        // The outer half would land on pixels 3 and 16.
        assert_eq!(r.pixel(3, 10), Some(Color::TRANSPARENT));
        assert_eq!(r.pixel(16, 10), Some(Color::TRANSPARENT));
        assert_eq!(r.pixel(10, 3), Some(Color::TRANSPARENT));
    }

    #[test]
    fn blit_clips_and_offsets() {
        let src = Raster::filled(4, 4, Color::WHITE);
        let mut dst = Raster::new(6, 6);
        dst.blit(&src, Vec2::new(-2.0, 4.0));
        assert_eq!(dst.pixel(0, 4), Some(Color::WHITE));
        assert_eq!(dst.pixel(1, 5), Some(Color::WHITE));
        assert_eq!(dst.pixel(2, 4), Some(Color::TRANSPARENT));
        assert_eq!(dst.pixel(0, 3), Some(Color::TRANSPARENT));
    }

    #[test]
    fn blit_scaled_samples_nearest() {
        let mut src = Raster::new(2, 1);
        src.fill_rect(Rect::new(1.0, 0.0, 2.0, 1.0), Color::BLUE);
        let mut dst = Raster::new(8, 4);
        dst.blit_scaled(&src, Vec2::ZERO, 2.0);
        assert_eq!(dst.pixel(1, 1), Some(Color::TRANSPARENT));
        assert_eq!(dst.pixel(2, 0), Some(Color::BLUE));
        assert_eq!(dst.pixel(3, 1), Some(Color::BLUE));
        assert_eq!(dst.pixel(4, 0), Some(Color::TRANSPARENT));
        assert_eq!(dst.pixel(0, 2), Some(Color::TRANSPARENT));
    }

    #[test]
    fn transparent_pixels_do_not_overwrite() {
        let mut dst = Raster::filled(2, 2, Color::RED);
        dst.blit(&Raster::new(2, 2), Vec2::ZERO);
        assert_eq!(dst.pixel(1, 1), Some(Color::RED));
        dst.clear(Color::WHITE);
        assert_eq!(dst.pixel(0, 0), Some(Color::WHITE));
    }
}
