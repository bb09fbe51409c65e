//! High-level image operations.
//!
//! These functions combine parameters with backend execution. Given a
//! validated [`Transform`] and the image it applies to, [`render`] produces
//! the new working image together with the encoded bytes that should be
//! persisted for it. Writing the bytes is the caller's job.
//!
//! Two kinds of transform exist:
//!
//! - **Re-encoding** (compress, convert): the image is encoded in the target
//!   format and the encoded bytes are decoded again, so the working image is
//!   exactly what the artifact holds (JPEG artifacts, GIF palette included).
//! - **Pixel** (rotate, resize, crop, grayscale): the backend produces a new
//!   image, which is then encoded in the upload's format for storage.

use super::backend::{BackendError, ImageBackend};
use super::params::{Quality, ResizeFilter, ResizeParams, TargetFormat, Transform};
use image::DynamicImage;

/// Result type for image operations.
pub type Result<T> = std::result::Result<T, BackendError>;

/// How pixel-transform results are stored.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EncodeSettings {
    /// Format of the uploaded image; pixel transforms are saved in it.
    pub save_format: TargetFormat,
    /// JPEG quality for everything except compress.
    pub save_quality: Quality,
    pub resize_filter: ResizeFilter,
}

/// Output of one transform: the new working image and its encoded form.
#[derive(Debug, Clone)]
pub struct Rendered {
    pub image: DynamicImage,
    pub format: TargetFormat,
    pub bytes: Vec<u8>,
}

/// Plan a resize without executing it.
pub fn plan_resize(width: u32, height: u32, settings: &EncodeSettings) -> ResizeParams {
    ResizeParams {
        width,
        height,
        filter: settings.resize_filter,
    }
}

/// Apply `transform` to `image`. The transform must already be validated
/// against the image's dimensions.
pub fn render(
    backend: &impl ImageBackend,
    image: &DynamicImage,
    transform: &Transform,
    settings: &EncodeSettings,
) -> Result<Rendered> {
    let transformed = match *transform {
        Transform::Compress { quality } => {
            let rgb = DynamicImage::ImageRgb8(image.to_rgb8());
            return reencode(backend, &rgb, TargetFormat::Jpeg, Quality::new(quality));
        }
        Transform::ConvertFormat { format } => {
            return reencode(backend, image, format, settings.save_quality);
        }
        Transform::Rotate { degrees } => backend.rotate(image, degrees)?,
        Transform::Resize { width, height } => {
            backend.resize(image, &plan_resize(width, height, settings))?
        }
        Transform::Crop(crop) => backend.crop(image, crop)?,
        Transform::Grayscale => backend.grayscale(image)?,
    };

    let bytes = backend.encode(&transformed, settings.save_format, settings.save_quality)?;
    Ok(Rendered {
        image: transformed,
        format: settings.save_format,
        bytes,
    })
}

/// Encode in `format`, then decode the bytes back as the working image.
fn reencode(
    backend: &impl ImageBackend,
    image: &DynamicImage,
    format: TargetFormat,
    quality: Quality,
) -> Result<Rendered> {
    let bytes = backend.encode(image, format, quality)?;
    let image = backend.decode(&bytes)?;
    Ok(Rendered {
        image,
        format,
        bytes,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imaging::CropBox;
    use crate::imaging::backend::tests::{MockBackend, RecordedOp};
    use image::ColorType;

    fn settings() -> EncodeSettings {
        EncodeSettings {
            save_format: TargetFormat::Png,
            save_quality: Quality::new(75),
            resize_filter: ResizeFilter::CatmullRom,
        }
    }

    #[test]
    fn plan_resize_uses_configured_filter() {
        let settings = EncodeSettings {
            resize_filter: ResizeFilter::Lanczos3,
            ..settings()
        };
        let params = plan_resize(100, 50, &settings);
        assert_eq!(params.width, 100);
        assert_eq!(params.height, 50);
        assert_eq!(params.filter, ResizeFilter::Lanczos3);
    }

    #[test]
    fn compress_encodes_rgb_jpeg_then_decodes() {
        let backend = MockBackend::with_images(vec![DynamicImage::new_rgb8(64, 48)]);
        let gray = DynamicImage::new_luma8(64, 48);

        let rendered = render(
            &backend,
            &gray,
            &Transform::Compress { quality: 40 },
            &settings(),
        )
        .unwrap();

        assert_eq!(rendered.format, TargetFormat::Jpeg);
        assert_eq!(rendered.bytes, b"mock-encoded");
        let ops = backend.get_operations();
        assert_eq!(
            ops,
            vec![
                RecordedOp::Encode {
                    format: TargetFormat::Jpeg,
                    quality: 40,
                    color: ColorType::Rgb8,
                    width: 64,
                    height: 48,
                },
                RecordedOp::Decode { len: 12 },
            ]
        );
    }

    #[test]
    fn convert_uses_target_format_and_save_quality() {
        let backend = MockBackend::with_images(vec![DynamicImage::new_rgba8(10, 10)]);
        let rendered = render(
            &backend,
            &DynamicImage::new_rgb8(10, 10),
            &Transform::ConvertFormat {
                format: TargetFormat::Gif,
            },
            &settings(),
        )
        .unwrap();

        assert_eq!(rendered.format, TargetFormat::Gif);
        assert!(matches!(
            &backend.get_operations()[0],
            RecordedOp::Encode {
                format: TargetFormat::Gif,
                quality: 75,
                ..
            }
        ));
    }

    #[test]
    fn resize_saves_in_upload_format() {
        let backend = MockBackend::new();
        let rendered = render(
            &backend,
            &DynamicImage::new_rgb8(640, 360),
            &Transform::Resize {
                width: 100,
                height: 100,
            },
            &settings(),
        )
        .unwrap();

        assert_eq!((rendered.image.width(), rendered.image.height()), (100, 100));
        assert_eq!(rendered.format, TargetFormat::Png);

        let ops = backend.get_operations();
        assert_eq!(ops.len(), 2);
        assert!(matches!(
            &ops[0],
            RecordedOp::Resize {
                width: 100,
                height: 100,
                filter: ResizeFilter::CatmullRom,
            }
        ));
        assert!(matches!(
            &ops[1],
            RecordedOp::Encode {
                format: TargetFormat::Png,
                width: 100,
                height: 100,
                ..
            }
        ));
    }

    #[test]
    fn pixel_transforms_do_not_decode() {
        let backend = MockBackend::new();
        let image = DynamicImage::new_rgb8(20, 20);

        for transform in [
            Transform::Rotate { degrees: 90.0 },
            Transform::Crop(CropBox::new(0, 0, 10, 10)),
            Transform::Grayscale,
        ] {
            render(&backend, &image, &transform, &settings()).unwrap();
        }

        let decodes = backend
            .get_operations()
            .into_iter()
            .filter(|op| matches!(op, RecordedOp::Decode { .. }))
            .count();
        assert_eq!(decodes, 0);
    }

    #[test]
    fn decode_failure_propagates() {
        // No queued image: the mock decode fails after encoding
        let backend = MockBackend::new();
        let result = render(
            &backend,
            &DynamicImage::new_rgb8(10, 10),
            &Transform::Compress { quality: 85 },
            &settings(),
        );
        assert!(matches!(result, Err(BackendError::Decode(_))));
    }
}
