// Copyright 2025 the Quilt Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! 8-bit RGBA colors.

/// A straight-alpha RGBA color.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Color {
    /// Red.
    pub r: u8,
    /// Green.
    pub g: u8,
    /// Blue.
    pub b: u8,
    /// Alpha; 255 is opaque.
    pub a: u8,
}

impl Color {
    /// Fully transparent black.
    pub const TRANSPARENT: Self = Self::rgba(0, 0, 0, 0);
    /// Opaque black.
    pub const BLACK: Self = Self::rgb(0, 0, 0);
    /// Opaque white.
    pub const WHITE: Self = Self::rgb(255, 255, 255);
    /// Opaque red.
    pub const RED: Self = Self::rgb(220, 38, 38);
    /// Opaque blue.
    pub const BLUE: Self = Self::rgb(37, 99, 235);

    /// An opaque color.
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::rgba(r, g, b, 255)
    }

    /// A color with explicit alpha.
    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Pack as `0xRRGGBBAA`.
    pub const fn to_u32(self) -> u32 {
        u32::from_be_bytes([self.r, self.g, self.b, self.a])
    }

    /// Unpack from `0xRRGGBBAA`.
    pub const fn from_u32(packed: u32) -> Self {
        let [r, g, b, a] = packed.to_be_bytes();
        Self { r, g, b, a }
    }

    /// Composite `self` over `dst` (Porter-Duff source-over).
    pub fn over(self, dst: Self) -> Self {
        match self.a {
            255 => return self,
            0 => return dst,
            _ => {}
        }
        let sa = u32::from(self.a);
        let da = u32::from(dst.a) * (255 - sa);
        // Output alpha scaled by 255.
        let alpha = sa * 255 + da;
        let mix = |s: u8, d: u8| -> u8 {
            let v = (u32::from(s) * sa * 255 + u32::from(d) * da + alpha / 2) / alpha;
            u8::try_from(v).unwrap_or(u8::MAX)
        };
        let a = u8::try_from((alpha + 127) / 255).unwrap_or(u8::MAX);
        Self {
            r: mix(self.r, dst.r),
            g: mix(self.g, dst.g),
            b: mix(self.b, dst.b),
            a,
        }
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::TRANSPARENT
    }
}
