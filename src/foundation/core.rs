use crate::foundation::error::{CheckForgeError, CheckForgeResult};
use crate::foundation::math::mul_div255_u8;

pub use kurbo::{Affine, Point, Rect, Vec2};

/// Points per inch. Layout coordinates are expressed in points.
pub const POINTS_PER_INCH: f64 = 72.0;

/// Device pixels per inch at `scale == 1`.
pub const PX_PER_INCH: f64 = 96.0;

/// Largest pixel edge a surface may have (`vello_cpu` addresses pixmaps with `u16`).
pub const MAX_SURFACE_DIM: u32 = u16::MAX as u32;

/// Physical size of a document in points, independent of the output scale.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct LogicalSize {
    pub width_pt: f64,
    pub height_pt: f64,
}

impl LogicalSize {
    /// Standard personal check: 6 x 2.75 inches.
    pub const PERSONAL_CHECK: Self = Self::from_inches(6.0, 2.75);

    pub const fn from_inches(width_in: f64, height_in: f64) -> Self {
        Self {
            width_pt: width_in * POINTS_PER_INCH,
            height_pt: height_in * POINTS_PER_INCH,
        }
    }

    pub fn width_in(self) -> f64 {
        self.width_pt / POINTS_PER_INCH
    }

    pub fn height_in(self) -> f64 {
        self.height_pt / POINTS_PER_INCH
    }

    pub fn rect(self) -> Rect {
        Rect::new(0.0, 0.0, self.width_pt, self.height_pt)
    }

    /// Pixel dimensions for this logical size at `scale`.
    ///
    /// Pure function of `(self, scale)`; the result never feeds back into the document.
    pub fn pixel_size(self, scale: f64) -> CheckForgeResult<Canvas> {
        if !scale.is_finite() || scale <= 0.0 {
            return Err(CheckForgeError::validation(
                "scale",
                "must be finite and > 0",
            ));
        }
        fn edge(inches: f64, scale: f64) -> CheckForgeResult<u32> {
            let px = (inches * PX_PER_INCH * scale).round();
            if px < 1.0 || px > f64::from(MAX_SURFACE_DIM) {
                return Err(CheckForgeError::validation(
                    "scale",
                    format!("surface edge of {px} px is out of range (1..={MAX_SURFACE_DIM})"),
                ));
            }
            Ok(px as u32)
        }
        Ok(Canvas {
            width: edge(self.width_in(), scale)?,
            height: edge(self.height_in(), scale)?,
        })
    }

    /// Transform mapping points to device pixels at `scale`.
    pub fn points_to_pixels(scale: f64) -> Affine {
        Affine::scale(scale * PX_PER_INCH / POINTS_PER_INCH)
    }
}

/// Pixel dimensions of a raster target.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Canvas {
    pub width: u32,
    pub height: u32,
}

impl Canvas {
    pub fn byte_len(self) -> usize {
        (self.width as usize)
            .saturating_mul(self.height as usize)
            .saturating_mul(4)
    }
}

/// Premultiplied RGBA8 (r,g,b already multiplied by a).
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Rgba8Premul {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba8Premul {
    pub const BLACK: Self = Self::opaque(0, 0, 0);
    pub const WHITE: Self = Self::opaque(255, 255, 255);

    pub const fn opaque(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub fn transparent() -> Self {
        Self {
            r: 0,
            g: 0,
            b: 0,
            a: 0,
        }
    }

    pub fn from_straight_rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        let a16 = u16::from(a);
        Self {
            r: mul_div255_u8(u16::from(r), a16),
            g: mul_div255_u8(u16::from(g), a16),
            b: mul_div255_u8(u16::from(b), a16),
            a,
        }
    }

    pub fn to_array(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
