//! Image processing backend trait and shared types.
//!
//! The [`ImageBackend`] trait defines the operations every backend must
//! support: identify, decode, encode, rotate, resize, crop and grayscale.
//! All of them work on in-memory images; writing artifacts to disk is the
//! [`session`](crate::session)'s job.
//!
//! The production implementation is
//! [`RustBackend`](super::rust_backend::RustBackend), built on the `image`
//! crate. Tests swap in a recording mock.

use super::params::{CropBox, Quality, ResizeParams, TargetFormat};
use image::{DynamicImage, ImageFormat};
use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("Failed to decode image: {0}")]
    Decode(String),
    #[error("Failed to encode {format}: {reason}")]
    Encode {
        format: TargetFormat,
        reason: String,
    },
    #[error("Processing failed: {0}")]
    ProcessingFailed(String),
}

/// Pixel dimensions of an image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

impl Dimensions {
    pub fn of(image: &DynamicImage) -> Self {
        Self {
            width: image.width(),
            height: image.height(),
        }
    }
}

/// Trait for image processing backends.
///
/// Every backend must implement all operations so the session controller is
/// backend-agnostic.
pub trait ImageBackend {
    /// Sniff the container format of encoded bytes without decoding pixels.
    fn identify(&self, bytes: &[u8]) -> Option<ImageFormat>;

    /// Decode encoded bytes into an image.
    fn decode(&self, bytes: &[u8]) -> Result<DynamicImage, BackendError>;

    /// Encode an image. `quality` only affects lossy formats (JPEG).
    fn encode(
        &self,
        image: &DynamicImage,
        format: TargetFormat,
        quality: Quality,
    ) -> Result<Vec<u8>, BackendError>;

    /// Rotate counter-clockwise about the center, keeping the canvas size.
    fn rotate(&self, image: &DynamicImage, degrees: f64) -> Result<DynamicImage, BackendError>;

    /// Scale to exactly the requested dimensions.
    fn resize(
        &self,
        image: &DynamicImage,
        params: &ResizeParams,
    ) -> Result<DynamicImage, BackendError>;

    /// Cut out a validated box.
    fn crop(&self, image: &DynamicImage, crop: CropBox) -> Result<DynamicImage, BackendError>;

    /// Convert to single-channel 8-bit luminance.
    fn grayscale(&self, image: &DynamicImage) -> Result<DynamicImage, BackendError>;
}
