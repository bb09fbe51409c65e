//! Shared test utilities for the imgconv test suite.
//!
//! Provides synthetic images and their encoded bytes so tests never depend
//! on fixture files.
//!
//! # Usage
//!
//! ```rust,ignore
//! use crate::test_helpers::*;
//!
//! let bytes = jpeg_bytes(640, 360);
//! let mut session = Session::new(options);
//! session.upload("photo.jpg", &bytes).unwrap();
//! ```

use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, ImageEncoder, ImageFormat, Rgb, RgbImage};
use std::io::Cursor;

/// RGB image with a horizontal red ramp, a vertical green ramp and
/// constant blue.
pub fn gradient_image(width: u32, height: u32) -> RgbImage {
    RgbImage::from_fn(width, height, |x, y| {
        Rgb([(x % 256) as u8, (y % 256) as u8, 128])
    })
}

/// A valid JPEG of the given size.
pub fn jpeg_bytes(width: u32, height: u32) -> Vec<u8> {
    let img = gradient_image(width, height);
    let mut buf = Vec::new();
    JpegEncoder::new(&mut buf)
        .write_image(img.as_raw(), width, height, image::ExtendedColorType::Rgb8)
        .unwrap();
    buf
}

/// A valid PNG of the given size.
pub fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let mut buf = Cursor::new(Vec::new());
    DynamicImage::ImageRgb8(gradient_image(width, height))
        .write_to(&mut buf, ImageFormat::Png)
        .unwrap();
    buf.into_inner()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixtures_are_recognised() {
        assert_eq!(
            image::guess_format(&jpeg_bytes(8, 8)).unwrap(),
            ImageFormat::Jpeg
        );
        assert_eq!(
            image::guess_format(&png_bytes(8, 8)).unwrap(),
            ImageFormat::Png
        );
    }
}
