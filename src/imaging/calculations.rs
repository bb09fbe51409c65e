//! Pure calculation functions for image geometry and encoding.
//!
//! All functions here are pure and testable without any I/O or images.

use super::params::{CropBox, TargetFormat};
use image::ColorType;

/// Tolerance used when comparing angles against exact quarter turns.
const ANGLE_EPSILON: f64 = 1e-9;

/// Decimal places kept in the rotation matrix.
const TRIG_DIGITS: i32 = 15;

/// Round to [`TRIG_DIGITS`] places so quarter turns get exact 0 and ±1
/// instead of residue like `cos(90°) = 6.1e-17`.
fn snap_trig(value: f64) -> f64 {
    let scale = 10f64.powi(TRIG_DIGITS);
    (value * scale).round() / scale
}

/// Reduce an angle to `[0, 360)`.
///
/// # Examples
/// ```
/// # use imgconv::imaging::normalize_degrees;
/// assert_eq!(normalize_degrees(360.0), 0.0);
/// assert_eq!(normalize_degrees(450.0), 90.0);
/// ```
pub fn normalize_degrees(degrees: f64) -> f64 {
    let normalized = degrees.rem_euclid(360.0);
    if (360.0 - normalized).abs() < ANGLE_EPSILON {
        0.0
    } else {
        normalized
    }
}

/// Classification of a rotation for picking a fast path.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RotationKind {
    /// 0 or 360 degrees: pixels unchanged.
    Identity,
    /// 180 degrees: exact pixel flip, no resampling.
    HalfTurn,
    /// Anything else: inverse-mapped resampling.
    Arbitrary(f64),
}

pub fn classify_rotation(degrees: f64) -> RotationKind {
    let normalized = normalize_degrees(degrees);
    if normalized.abs() < ANGLE_EPSILON {
        RotationKind::Identity
    } else if (normalized - 180.0).abs() < ANGLE_EPSILON {
        RotationKind::HalfTurn
    } else {
        RotationKind::Arbitrary(normalized)
    }
}

/// Inverse mapping for a counter-clockwise rotation about the image center
/// that keeps the canvas size.
///
/// For each destination pixel center `(x + 0.5, y + 0.5)`, relative to the
/// canvas center `(cx, cy)`:
///
/// ```text
/// src_x =  dx * cos(θ) - dy * sin(θ) + cx
/// src_y =  dx * sin(θ) + dy * cos(θ) + cy
/// ```
///
/// Image rows grow downwards, so these formulas turn content counter-clockwise
/// on screen for positive θ.
#[derive(Debug, Clone, Copy)]
pub struct RotationMap {
    cos: f64,
    sin: f64,
    cx: f64,
    cy: f64,
    width: u32,
    height: u32,
}

impl RotationMap {
    pub fn new(width: u32, height: u32, degrees: f64) -> Self {
        let rad = degrees.to_radians();
        Self {
            cos: snap_trig(rad.cos()),
            sin: snap_trig(rad.sin()),
            cx: width as f64 / 2.0,
            cy: height as f64 / 2.0,
            width,
            height,
        }
    }

    /// Source pixel sampled (nearest neighbour) for a destination pixel, or
    /// `None` when it falls outside the source.
    pub fn source_of(&self, dst_x: u32, dst_y: u32) -> Option<(u32, u32)> {
        let dx = dst_x as f64 + 0.5 - self.cx;
        let dy = dst_y as f64 + 0.5 - self.cy;

        let src_x = (dx * self.cos - dy * self.sin + self.cx).floor();
        let src_y = (dx * self.sin + dy * self.cos + self.cy).floor();

        if src_x < 0.0 || src_y < 0.0 || src_x >= self.width as f64 || src_y >= self.height as f64
        {
            return None;
        }
        Some((src_x as u32, src_y as u32))
    }
}

/// Size of the image produced by a crop. Assumes the box was validated.
pub fn crop_extent(crop: &CropBox) -> (u32, u32) {
    (
        crop.right.saturating_sub(crop.left),
        crop.bottom.saturating_sub(crop.top),
    )
}

/// Color type handed to the encoder for `format`, given the image's own.
///
/// Each encoder accepts a limited set of layouts; anything else is narrowed
/// to the closest 8-bit layout it does accept.
///
/// | Format | Accepts |
/// |---|---|
/// | JPEG | `L8`, `Rgb8` (alpha is dropped) |
/// | GIF | `Rgba8` |
/// | BMP | `L8`, `La8`, `Rgb8`, `Rgba8` |
/// | PNG | 8- and 16-bit integer layouts |
pub fn storable_color(format: TargetFormat, color: ColorType) -> ColorType {
    match format {
        TargetFormat::Jpeg => match color {
            ColorType::L8 | ColorType::L16 => ColorType::L8,
            _ => ColorType::Rgb8,
        },
        TargetFormat::Gif => ColorType::Rgba8,
        TargetFormat::Bmp => match color {
            ColorType::L8 | ColorType::L16 => ColorType::L8,
            ColorType::La8 | ColorType::La16 => ColorType::La8,
            ColorType::Rgb8 | ColorType::Rgb16 | ColorType::Rgb32F => ColorType::Rgb8,
            _ => ColorType::Rgba8,
        },
        TargetFormat::Png => match color {
            ColorType::L8
            | ColorType::La8
            | ColorType::Rgb8
            | ColorType::Rgba8
            | ColorType::L16
            | ColorType::La16
            | ColorType::Rgb16
            | ColorType::Rgba16 => color,
            ColorType::Rgb32F => ColorType::Rgb8,
            _ => ColorType::Rgba8,
        },
    }
}
