//! Pure Rust image processing backend built on the `image` crate.
//!
//! Everything is statically linked into the binary.
//!
//! ## Crate mapping
//!
//! | Operation | Crate / function |
//! |---|---|
//! | Identify | `image::guess_format` (magic bytes) |
//! | Decode (JPEG, PNG, BMP, GIF) | `image::load_from_memory` |
//! | Encode → JPEG | `image::codecs::jpeg::JpegEncoder` with explicit quality |
//! | Encode → PNG, BMP, GIF | `DynamicImage::write_to` |
//! | Rotate | [`rotate_keep_canvas`](super::rotation::rotate_keep_canvas) (fixed canvas, nearest neighbour) |
//! | Resize | `DynamicImage::resize_exact` with the configured filter |
//! | Crop | `DynamicImage::crop_imm` |
//! | Grayscale | `DynamicImage::to_luma8` |

use super::backend::{BackendError, ImageBackend};
use super::calculations::{crop_extent, storable_color};
use super::params::{CropBox, Quality, ResizeParams, TargetFormat};
use super::rotation::rotate_keep_canvas;
use image::codecs::jpeg::JpegEncoder;
use image::{ColorType, DynamicImage, ImageFormat};
use std::borrow::Cow;
use std::io::Cursor;

/// Pure Rust backend using the `image` crate ecosystem.
///
/// See the [module docs](self) for the crate-to-operation mapping.
pub struct RustBackend;

impl RustBackend {
    pub fn new() -> Self {
        Self
    }
}

impl Default for RustBackend {
    fn default() -> Self {
        Self::new()
    }
}

/// Convert `image` to a layout the encoder for `format` accepts.
fn prepare_for(format: TargetFormat, image: &DynamicImage) -> Cow<'_, DynamicImage> {
    let target = storable_color(format, image.color());
    if target == image.color() {
        return Cow::Borrowed(image);
    }
    let converted = match target {
        ColorType::L8 => DynamicImage::ImageLuma8(image.to_luma8()),
        ColorType::La8 => DynamicImage::ImageLumaA8(image.to_luma_alpha8()),
        ColorType::Rgb8 => DynamicImage::ImageRgb8(image.to_rgb8()),
        _ => DynamicImage::ImageRgba8(image.to_rgba8()),
    };
    Cow::Owned(converted)
}

impl ImageBackend for RustBackend {
    fn identify(&self, bytes: &[u8]) -> Option<ImageFormat> {
        image::guess_format(bytes).ok()
    }

    fn decode(&self, bytes: &[u8]) -> Result<DynamicImage, BackendError> {
        image::load_from_memory(bytes).map_err(|e| BackendError::Decode(e.to_string()))
    }

    fn encode(
        &self,
        image: &DynamicImage,
        format: TargetFormat,
        quality: Quality,
    ) -> Result<Vec<u8>, BackendError> {
        let prepared = prepare_for(format, image);
        let mut buf = Cursor::new(Vec::new());

        let written = match format {
            TargetFormat::Jpeg => {
                let encoder = JpegEncoder::new_with_quality(&mut buf, quality.as_u8());
                prepared.write_with_encoder(encoder)
            }
            other => prepared.write_to(&mut buf, other.image_format()),
        };
        written.map_err(|e| BackendError::Encode {
            format,
            reason: e.to_string(),
        })?;

        Ok(buf.into_inner())
    }

    fn rotate(&self, image: &DynamicImage, degrees: f64) -> Result<DynamicImage, BackendError> {
        Ok(rotate_keep_canvas(image, degrees))
    }

    fn resize(
        &self,
        image: &DynamicImage,
        params: &ResizeParams,
    ) -> Result<DynamicImage, BackendError> {
        Ok(image.resize_exact(params.width, params.height, params.filter.filter_type()))
    }

    fn crop(&self, image: &DynamicImage, crop: CropBox) -> Result<DynamicImage, BackendError> {
        // crop_imm silently clamps, so an unchecked box would yield a smaller image
        if crop.is_inverted() || !crop.fits_within(image.width(), image.height()) {
            return Err(BackendError::ProcessingFailed(format!(
                "crop box {crop} does not fit a {}x{} image",
                image.width(),
                image.height()
            )));
        }
        let (width, height) = crop_extent(&crop);
        Ok(image.crop_imm(crop.left, crop.top, width, height))
    }

    fn grayscale(&self, image: &DynamicImage) -> Result<DynamicImage, BackendError> {
        Ok(DynamicImage::ImageLuma8(image.to_luma8()))
    }
}
