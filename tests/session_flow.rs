//! End-to-end session tests on the real `image` backend.
//!
//! Every test uploads synthetic bytes, so no fixture files are needed.

use image::{ColorType, DynamicImage, ImageFormat, Rgb, RgbImage};
use imgconv::config::DefaultsConfig;
use imgconv::imaging::{CropBox, ParamError, Source, TargetFormat, Transform};
use imgconv::session::{Session, SessionError, SessionOptions};
use imgconv::shell::Shell;
use proptest::prelude::*;
use std::io::Cursor;
use tempfile::TempDir;

fn gradient(width: u32, height: u32) -> DynamicImage {
    DynamicImage::ImageRgb8(RgbImage::from_fn(width, height, |x, y| {
        Rgb([(x % 256) as u8, (y % 256) as u8, 128])
    }))
}

fn encoded(width: u32, height: u32, format: ImageFormat) -> Vec<u8> {
    let mut buf = Cursor::new(Vec::new());
    gradient(width, height).write_to(&mut buf, format).unwrap();
    buf.into_inner()
}

fn session_in(tmp: &TempDir) -> Session {
    Session::new(SessionOptions {
        output_dir: tmp.path().join("processed_images"),
        ..SessionOptions::default()
    })
}

fn loaded_jpeg(tmp: &TempDir, width: u32, height: u32) -> Session {
    let mut session = session_in(tmp);
    session
        .upload("photo.jpg", &encoded(width, height, ImageFormat::Jpeg))
        .unwrap();
    session
}

#[test]
fn resize_then_grayscale_scenario() {
    let tmp = TempDir::new().unwrap();
    let mut session = loaded_jpeg(&tmp, 640, 360);

    let resized = session
        .apply(&Transform::Resize {
            width: 100,
            height: 100,
        })
        .unwrap();
    assert_eq!(
        (resized.dimensions.width, resized.dimensions.height),
        (100, 100)
    );

    let gray = session.apply(&Transform::Grayscale).unwrap();
    assert_eq!((gray.dimensions.width, gray.dimensions.height), (100, 100));
    assert_eq!(session.current().unwrap().color(), ColorType::L8);

    // Artifacts on disk decode to what the session reports
    let on_disk = image::open(&gray.path).unwrap();
    assert_eq!((on_disk.width(), on_disk.height()), (100, 100));
    assert_eq!(on_disk.color().channel_count(), 1);
    assert_eq!(gray.file_name, "grayscale_photo.jpg");
    assert_eq!(gray.mime, "image/jpeg");
}

#[test]
fn png_upload_keeps_png_artifacts() {
    let tmp = TempDir::new().unwrap();
    let mut session = session_in(&tmp);
    session
        .upload("diagram.png", &encoded(120, 80, ImageFormat::Png))
        .unwrap();

    let rotated = session.apply(&Transform::Rotate { degrees: 90.0 }).unwrap();
    assert_eq!(rotated.file_name, "rotated_diagram.png");
    let bytes = std::fs::read(&rotated.path).unwrap();
    assert_eq!(image::guess_format(&bytes).unwrap(), ImageFormat::Png);
    // Canvas unchanged by rotation
    assert_eq!(
        (rotated.dimensions.width, rotated.dimensions.height),
        (120, 80)
    );
}

#[test]
fn compress_writes_rgb_jpeg() {
    let tmp = TempDir::new().unwrap();
    let mut session = session_in(&tmp);
    session
        .upload("diagram.png", &encoded(64, 64, ImageFormat::Png))
        .unwrap();
    session.apply(&Transform::Grayscale).unwrap();

    let compressed = session.apply(&Transform::Compress { quality: 50 }).unwrap();
    assert_eq!(compressed.file_name, "compressed_diagram.jpg");
    let on_disk = image::open(&compressed.path).unwrap();
    assert_eq!(on_disk.color(), ColorType::Rgb8);
    assert_eq!(session.current().unwrap().color(), ColorType::Rgb8);
}

#[test]
fn convert_to_every_format() {
    let tmp = TempDir::new().unwrap();
    let mut session = loaded_jpeg(&tmp, 96, 64);

    for format in TargetFormat::ALL {
        let artifact = session
            .apply(&Transform::ConvertFormat { format })
            .unwrap();
        assert_eq!(artifact.file_name, format!("photo.{}", format.extension()));
        assert_eq!(artifact.mime, format.mime_type());
        let bytes = std::fs::read(&artifact.path).unwrap();
        assert_eq!(image::guess_format(&bytes).unwrap(), format.image_format());
    }
}

#[test]
fn repeated_resize_overwrites_artifact() {
    let tmp = TempDir::new().unwrap();
    let mut session = loaded_jpeg(&tmp, 640, 360);

    let first = session
        .apply(&Transform::Resize {
            width: 300,
            height: 200,
        })
        .unwrap();
    let second = session
        .apply(&Transform::Resize {
            width: 100,
            height: 50,
        })
        .unwrap();

    assert_eq!(first.path, second.path);
    let on_disk = image::open(&second.path).unwrap();
    assert_eq!((on_disk.width(), on_disk.height()), (100, 50));
}

#[test]
fn original_selector_ignores_previous_results() {
    let tmp = TempDir::new().unwrap();
    let mut session = loaded_jpeg(&tmp, 640, 360);

    session
        .apply(&Transform::Resize {
            width: 100,
            height: 100,
        })
        .unwrap();
    session.select(Source::Original);

    let cropped = session
        .apply(&Transform::Crop(CropBox::new(0, 0, 400, 300)))
        .unwrap();
    assert_eq!(
        (cropped.dimensions.width, cropped.dimensions.height),
        (400, 300)
    );
    assert_eq!(session.original().unwrap().width(), 640);
}

#[test]
fn invalid_crop_leaves_session_unchanged() {
    let tmp = TempDir::new().unwrap();
    let mut session = loaded_jpeg(&tmp, 640, 360);
    let before = session.current().unwrap().clone();

    let result = session.apply(&Transform::Crop(CropBox::new(100, 100, 50, 50)));
    assert!(matches!(
        result,
        Err(SessionError::Invalid(ParamError::InvertedCropBox(_)))
    ));
    assert_eq!(session.current().unwrap(), &before);
    assert!(session.artifacts().is_empty());
}

#[test]
fn transform_without_upload_fails() {
    let tmp = TempDir::new().unwrap();
    let mut session = session_in(&tmp);
    assert!(matches!(
        session.apply(&Transform::Rotate { degrees: 10.0 }),
        Err(SessionError::NoImage)
    ));
}

#[test]
fn bmp_upload_is_rejected() {
    let tmp = TempDir::new().unwrap();
    let mut session = session_in(&tmp);
    let result = session.upload("scan.bmp", &encoded(10, 10, ImageFormat::Bmp));
    assert!(matches!(result, Err(SessionError::UnsupportedUpload(_))));
}

#[test]
fn download_returns_bytes_and_mime() {
    let tmp = TempDir::new().unwrap();
    let mut session = loaded_jpeg(&tmp, 64, 64);
    session
        .apply(&Transform::ConvertFormat {
            format: TargetFormat::Gif,
        })
        .unwrap();

    let download = session.download_latest().unwrap();
    assert_eq!(download.file_name, "photo.gif");
    assert_eq!(download.mime, "image/gif");
    assert_eq!(
        image::guess_format(&download.bytes).unwrap(),
        ImageFormat::Gif
    );
}

#[test]
fn script_through_shell() {
    let tmp = TempDir::new().unwrap();
    let input = tmp.path().join("photo.jpg");
    std::fs::write(&input, encoded(640, 360, ImageFormat::Jpeg)).unwrap();

    let mut shell = Shell::new(session_in(&tmp), DefaultsConfig::default());
    let mut out = Vec::new();
    let steps = [
        format!("load '{}'", input.display()),
        "resize".to_string(),
        "crop 0 0 320 180".to_string(),
        "convert png".to_string(),
        "history".to_string(),
    ];
    shell.run_script(&steps, &mut out).unwrap();

    let printed = String::from_utf8(out).unwrap();
    assert!(printed.contains("Loaded photo.jpg (JPEG)"));
    assert!(printed.contains("Cropped Image: 320x180"));
    assert!(printed.contains("003 Converted Image → photo.png (320x180, image/png)"));
    assert!(tmp.path().join("processed_images/photo.png").exists());
}

// =========================================================================
// Properties
// =========================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    #[test]
    fn compress_keeps_dimensions(quality in 10u32..=100) {
        let tmp = TempDir::new().unwrap();
        let mut session = loaded_jpeg(&tmp, 48, 32);

        let artifact = session.apply(&Transform::Compress { quality }).unwrap();
        let on_disk = image::open(&artifact.path).unwrap();
        prop_assert_eq!((on_disk.width(), on_disk.height()), (48, 32));
    }

    #[test]
    fn converted_bytes_match_format(index in 0usize..4, width in 1u32..64, height in 1u32..64) {
        let tmp = TempDir::new().unwrap();
        let mut session = session_in(&tmp);
        session.upload("p.png", &encoded(width, height, ImageFormat::Png)).unwrap();

        let format = TargetFormat::ALL[index];
        let artifact = session.apply(&Transform::ConvertFormat { format }).unwrap();
        let bytes = std::fs::read(&artifact.path).unwrap();
        prop_assert_eq!(image::guess_format(&bytes).unwrap(), format.image_format());
        prop_assert_eq!(
            (artifact.dimensions.width, artifact.dimensions.height),
            (width, height)
        );
    }

    #[test]
    fn out_of_range_quality_is_rejected(quality in prop_oneof![0u32..10, 101u32..1000]) {
        let tmp = TempDir::new().unwrap();
        let mut session = loaded_jpeg(&tmp, 16, 16);
        let result = session.apply(&Transform::Compress { quality });
        prop_assert!(
            matches!(result, Err(SessionError::Invalid(ParamError::QualityOutOfRange(q))) if q == quality),
            "unexpected result for quality {}", quality
        );
    }
}
