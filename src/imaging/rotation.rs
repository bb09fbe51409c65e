//! Fixed-canvas rotation.
//!
//! The image turns counter-clockwise about its center and the output keeps
//! the source dimensions: corners that rotate out of the frame are clipped
//! and uncovered areas are zero (black, or transparent for layouts with
//! alpha). Sampling is nearest-neighbour through an inverse mapping (see
//! [`RotationMap`]), so every output pixel is an exact copy of a source pixel
//! and the color type never changes.
//!
//! 0/360 degrees return a copy and 180 degrees uses an exact flip.

use super::calculations::{RotationKind, RotationMap, classify_rotation};
use image::{DynamicImage, ImageBuffer, Pixel};

/// Rotate `image` by `degrees` counter-clockwise, keeping its canvas size.
pub fn rotate_keep_canvas(image: &DynamicImage, degrees: f64) -> DynamicImage {
    let angle = match classify_rotation(degrees) {
        RotationKind::Identity => return image.clone(),
        RotationKind::HalfTurn => return image.rotate180(),
        RotationKind::Arbitrary(angle) => angle,
    };

    match image {
        DynamicImage::ImageLuma8(buf) => DynamicImage::ImageLuma8(rotate_buffer(buf, angle)),
        DynamicImage::ImageLumaA8(buf) => DynamicImage::ImageLumaA8(rotate_buffer(buf, angle)),
        DynamicImage::ImageRgb8(buf) => DynamicImage::ImageRgb8(rotate_buffer(buf, angle)),
        DynamicImage::ImageRgba8(buf) => DynamicImage::ImageRgba8(rotate_buffer(buf, angle)),
        DynamicImage::ImageLuma16(buf) => DynamicImage::ImageLuma16(rotate_buffer(buf, angle)),
        DynamicImage::ImageLumaA16(buf) => DynamicImage::ImageLumaA16(rotate_buffer(buf, angle)),
        DynamicImage::ImageRgb16(buf) => DynamicImage::ImageRgb16(rotate_buffer(buf, angle)),
        DynamicImage::ImageRgba16(buf) => DynamicImage::ImageRgba16(rotate_buffer(buf, angle)),
        DynamicImage::ImageRgb32F(buf) => DynamicImage::ImageRgb32F(rotate_buffer(buf, angle)),
        DynamicImage::ImageRgba32F(buf) => DynamicImage::ImageRgba32F(rotate_buffer(buf, angle)),
        other => DynamicImage::ImageRgba8(rotate_buffer(&other.to_rgba8(), angle)),
    }
}

fn rotate_buffer<P: Pixel>(
    src: &ImageBuffer<P, Vec<P::Subpixel>>,
    degrees: f64,
) -> ImageBuffer<P, Vec<P::Subpixel>> {
    let (width, height) = src.dimensions();
    let map = RotationMap::new(width, height, degrees);
    let mut out = ImageBuffer::new(width, height);

    for (x, y, pixel) in out.enumerate_pixels_mut() {
        if let Some((sx, sy)) = map.source_of(x, y) {
            *pixel = *src.get_pixel(sx, sy);
        }
    }

    out
}
