//! Parameter types for image operations.
//!
//! These types describe *what* to do, not *how* to do it. They are the
//! interface between the [`session`](crate::session) controller (which decides
//! which image a transform applies to and where the result goes) and the
//! [`backend`](super::backend) (which does the actual pixel work).
//!
//! ## Types
//!
//! - [`Transform`] — One user request: compress, rotate, resize, crop, grayscale or convert.
//! - [`Quality`] — Lossy encoding quality (1–100, default 90). Clamped on construction.
//! - [`CropBox`] — Pixel box as `left, top, right, bottom` (right/bottom exclusive).
//! - [`TargetFormat`] — The four formats a conversion can produce.
//! - [`ResizeFilter`] — Resampling filter used by resize.
//! - [`ResizeParams`] — Target dimensions plus filter, as handed to the backend.
//! - [`Source`] — Which image a transform starts from: the current one or the original upload.
//!
//! Range limits mirror the controls of the interactive tool: quality 10–100,
//! rotation 0–360 degrees, resize 50–2000 pixels per side.

use image::ImageFormat;
use image::imageops::FilterType;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::RangeInclusive;
use std::str::FromStr;
use thiserror::Error;

/// Accepted compression quality.
pub const QUALITY_RANGE: RangeInclusive<u32> = 10..=100;
/// Accepted rotation angle in degrees.
pub const ANGLE_RANGE: RangeInclusive<f64> = 0.0..=360.0;
/// Accepted resize target per side, in pixels.
pub const SIZE_RANGE: RangeInclusive<u32> = 50..=2000;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParamError {
    #[error("compression quality {0} is outside {min}-{max}", min = QUALITY_RANGE.start(), max = QUALITY_RANGE.end())]
    QualityOutOfRange(u32),
    #[error("rotation angle {0} is outside 0-360 degrees")]
    AngleOutOfRange(f64),
    #[error("resize target {width}x{height} is outside {min}-{max} pixels per side", min = SIZE_RANGE.start(), max = SIZE_RANGE.end())]
    SizeOutOfRange { width: u32, height: u32 },
    #[error("crop box {0} is empty or inverted (need left < right and top < bottom)")]
    InvertedCropBox(CropBox),
    #[error("crop box {crop} extends past the {width}x{height} image")]
    CropOutOfBounds {
        crop: CropBox,
        width: u32,
        height: u32,
    },
    #[error("unknown format '{0}' (expected jpeg, png, bmp or gif)")]
    UnknownFormat(String),
    #[error("unknown image selector '{0}' (expected original or modified)")]
    UnknownSource(String),
}

/// Quality setting for lossy image encoding (1-100).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quality(pub u32);

impl Quality {
    pub fn new(value: u32) -> Self {
        Self(value.clamp(1, 100))
    }

    pub fn value(self) -> u32 {
        self.0
    }

    /// Quality as the `u8` the JPEG encoder expects.
    pub fn as_u8(self) -> u8 {
        self.0.clamp(1, 100) as u8
    }
}

impl Default for Quality {
    fn default() -> Self {
        Self(90)
    }
}

/// Crop rectangle in pixel coordinates of the image being cropped.
///
/// `right` and `bottom` are exclusive, so the cropped size is
/// `(right - left, bottom - top)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CropBox {
    pub left: u32,
    pub top: u32,
    pub right: u32,
    pub bottom: u32,
}

impl CropBox {
    pub fn new(left: u32, top: u32, right: u32, bottom: u32) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    /// The whole image.
    pub fn full(width: u32, height: u32) -> Self {
        Self::new(0, 0, width, height)
    }

    pub fn is_inverted(&self) -> bool {
        self.left >= self.right || self.top >= self.bottom
    }

    pub fn fits_within(&self, width: u32, height: u32) -> bool {
        self.right <= width && self.bottom <= height
    }
}

impl fmt::Display for CropBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "({}, {}, {}, {})",
            self.left, self.top, self.right, self.bottom
        )
    }
}

/// Output formats a conversion can target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetFormat {
    Jpeg,
    Png,
    Bmp,
    Gif,
}

impl TargetFormat {
    pub const ALL: [TargetFormat; 4] = [
        TargetFormat::Jpeg,
        TargetFormat::Png,
        TargetFormat::Bmp,
        TargetFormat::Gif,
    ];

    /// Upper-case display name, as shown in captions ("JPEG", "PNG", ...).
    pub fn name(self) -> &'static str {
        match self {
            TargetFormat::Jpeg => "JPEG",
            TargetFormat::Png => "PNG",
            TargetFormat::Bmp => "BMP",
            TargetFormat::Gif => "GIF",
        }
    }

    /// Extension used for converted artifacts: the lower-cased format name.
    pub fn extension(self) -> &'static str {
        match self {
            TargetFormat::Jpeg => "jpeg",
            TargetFormat::Png => "png",
            TargetFormat::Bmp => "bmp",
            TargetFormat::Gif => "gif",
        }
    }

    pub fn mime_type(self) -> &'static str {
        match self {
            TargetFormat::Jpeg => "image/jpeg",
            TargetFormat::Png => "image/png",
            TargetFormat::Bmp => "image/bmp",
            TargetFormat::Gif => "image/gif",
        }
    }

    pub fn image_format(self) -> ImageFormat {
        match self {
            TargetFormat::Jpeg => ImageFormat::Jpeg,
            TargetFormat::Png => ImageFormat::Png,
            TargetFormat::Bmp => ImageFormat::Bmp,
            TargetFormat::Gif => ImageFormat::Gif,
        }
    }

    pub fn from_image_format(format: ImageFormat) -> Option<Self> {
        match format {
            ImageFormat::Jpeg => Some(TargetFormat::Jpeg),
            ImageFormat::Png => Some(TargetFormat::Png),
            ImageFormat::Bmp => Some(TargetFormat::Bmp),
            ImageFormat::Gif => Some(TargetFormat::Gif),
            _ => None,
        }
    }

    /// Map a file extension (`jpg`, `JPEG`, `png`, ...) to a format.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "jpg" | "jpeg" => Some(TargetFormat::Jpeg),
            "png" => Some(TargetFormat::Png),
            "bmp" => Some(TargetFormat::Bmp),
            "gif" => Some(TargetFormat::Gif),
            _ => None,
        }
    }
}

impl fmt::Display for TargetFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for TargetFormat {
    type Err = ParamError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_extension(s.trim()).ok_or_else(|| ParamError::UnknownFormat(s.to_string()))
    }
}

/// Resampling filter for resize.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ResizeFilter {
    Nearest,
    Triangle,
    /// Bicubic; the default.
    #[default]
    CatmullRom,
    Gaussian,
    Lanczos3,
}

impl ResizeFilter {
    pub fn filter_type(self) -> FilterType {
        match self {
            ResizeFilter::Nearest => FilterType::Nearest,
            ResizeFilter::Triangle => FilterType::Triangle,
            ResizeFilter::CatmullRom => FilterType::CatmullRom,
            ResizeFilter::Gaussian => FilterType::Gaussian,
            ResizeFilter::Lanczos3 => FilterType::Lanczos3,
        }
    }
}

/// Parameters for an exact resize.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResizeParams {
    pub width: u32,
    pub height: u32,
    pub filter: ResizeFilter,
}

/// Which image a transform starts from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    /// The result of the latest transform (the upload itself before any).
    #[default]
    Current,
    /// The image as uploaded.
    Original,
}

impl Source {
    pub fn label(self) -> &'static str {
        match self {
            Source::Current => "Modified Image",
            Source::Original => "Original Image",
        }
    }
}

impl FromStr for Source {
    type Err = ParamError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "original" => Ok(Source::Original),
            "modified" | "current" => Ok(Source::Current),
            _ => Err(ParamError::UnknownSource(s.to_string())),
        }
    }
}

/// A single user-triggered transform request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "kebab-case")]
pub enum Transform {
    /// Re-encode as RGB JPEG at the given quality.
    Compress { quality: u32 },
    /// Rotate counter-clockwise, keeping the canvas size.
    Rotate { degrees: f64 },
    /// Scale to exactly `width` x `height`.
    Resize { width: u32, height: u32 },
    Crop(CropBox),
    Grayscale,
    ConvertFormat { format: TargetFormat },
}

/// Discriminant of [`Transform`], used for naming and display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TransformKind {
    Compress,
    Rotate,
    Resize,
    Crop,
    Grayscale,
    ConvertFormat,
}

impl Transform {
    pub fn kind(&self) -> TransformKind {
        match self {
            Transform::Compress { .. } => TransformKind::Compress,
            Transform::Rotate { .. } => TransformKind::Rotate,
            Transform::Resize { .. } => TransformKind::Resize,
            Transform::Crop(_) => TransformKind::Crop,
            Transform::Grayscale => TransformKind::Grayscale,
            Transform::ConvertFormat { .. } => TransformKind::ConvertFormat,
        }
    }

    /// Check the request against its limits and against the dimensions of
    /// the image it will be applied to.
    pub fn validate(&self, (width, height): (u32, u32)) -> Result<(), ParamError> {
        match *self {
            Transform::Compress { quality } => {
                if !QUALITY_RANGE.contains(&quality) {
                    return Err(ParamError::QualityOutOfRange(quality));
                }
            }
            Transform::Rotate { degrees } => {
                if !degrees.is_finite() || !ANGLE_RANGE.contains(&degrees) {
                    return Err(ParamError::AngleOutOfRange(degrees));
                }
            }
            Transform::Resize {
                width: w,
                height: h,
            } => {
                if !SIZE_RANGE.contains(&w) || !SIZE_RANGE.contains(&h) {
                    return Err(ParamError::SizeOutOfRange {
                        width: w,
                        height: h,
                    });
                }
            }
            Transform::Crop(crop) => {
                if crop.is_inverted() {
                    return Err(ParamError::InvertedCropBox(crop));
                }
                if !crop.fits_within(width, height) {
                    return Err(ParamError::CropOutOfBounds {
                        crop,
                        width,
                        height,
                    });
                }
            }
            Transform::Grayscale | Transform::ConvertFormat { .. } => {}
        }
        Ok(())
    }
}

impl TransformKind {
    /// Caption shown next to the preview of a result.
    pub fn caption(self) -> &'static str {
        match self {
            TransformKind::Compress => "Compressed Image",
            TransformKind::Rotate => "Rotated Image",
            TransformKind::Resize => "Resized Image",
            TransformKind::Crop => "Cropped Image",
            TransformKind::Grayscale => "Grayscale Image",
            TransformKind::ConvertFormat => "Converted Image",
        }
    }
}
