//! Centralized file naming for uploads and artifacts.
//!
//! Every artifact name derives from the upload's file name, so repeating a
//! transform overwrites the previous artifact of the same kind:
//!
//! | Transform | Artifact |
//! |---|---|
//! | compress | `compressed_<stem>.jpg` |
//! | rotate | `rotated_<name>` |
//! | resize | `resized_<name>` |
//! | crop | `cropped_<name>` |
//! | grayscale | `grayscale_<name>` |
//! | convert | `<stem>.<format>` (`jpeg`, `png`, `bmp`, `gif`) |
//!
//! `<name>` is the upload's file name when its extension matches the format
//! the artifact is saved in; otherwise the stem gets that format's extension
//! (`photo` uploaded from sniffed JPEG bytes becomes `resized_photo.jpeg`).

use crate::imaging::{TargetFormat, TransformKind};
use std::path::Path;

/// Stem used when an upload has no usable file name.
const FALLBACK_STEM: &str = "image";

/// Result of parsing an upload file name like `holiday.photo.JPG`.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedName {
    /// Final path component, as given.
    pub file_name: String,
    /// Everything before the last dot (`holiday.photo`).
    pub stem: String,
    /// Text after the last dot, case preserved (`JPG`). `None` for
    /// `README` or dot-files like `.hidden`.
    pub extension: Option<String>,
}

impl ParsedName {
    /// Format implied by the extension, if it names one of ours.
    pub fn format(&self) -> Option<TargetFormat> {
        self.extension.as_deref().and_then(TargetFormat::from_extension)
    }
}

/// Parse an upload name. Directory components are dropped.
pub fn parse_upload_name(name: &str) -> ParsedName {
    let file_name = Path::new(name)
        .file_name()
        .and_then(|n| n.to_str())
        .filter(|n| !n.is_empty())
        .unwrap_or(FALLBACK_STEM)
        .to_string();

    match file_name.rfind('.') {
        Some(dot) if dot > 0 && dot + 1 < file_name.len() => ParsedName {
            stem: file_name[..dot].to_string(),
            extension: Some(file_name[dot + 1..].to_string()),
            file_name,
        },
        _ => ParsedName {
            stem: file_name.clone(),
            extension: None,
            file_name,
        },
    }
}

/// Format pixel-transform artifacts are saved in: the extension's format,
/// else the sniffed one.
pub fn save_format_for(upload: &ParsedName, sniffed: Option<TargetFormat>) -> Option<TargetFormat> {
    upload.format().or(sniffed)
}

/// Prefix for pixel transforms; `None` for compress and convert, which
/// name artifacts by stem.
fn prefix(kind: TransformKind) -> Option<&'static str> {
    match kind {
        TransformKind::Rotate => Some("rotated_"),
        TransformKind::Resize => Some("resized_"),
        TransformKind::Crop => Some("cropped_"),
        TransformKind::Grayscale => Some("grayscale_"),
        TransformKind::Compress | TransformKind::ConvertFormat => None,
    }
}

/// File name of the artifact a transform writes.
///
/// `format` is the format the artifact's bytes are encoded in: JPEG for
/// compress, the target for convert, the upload's format otherwise.
pub fn artifact_file_name(kind: TransformKind, upload: &ParsedName, format: TargetFormat) -> String {
    match kind {
        TransformKind::Compress => format!("compressed_{}.jpg", upload.stem),
        TransformKind::ConvertFormat => format!("{}.{}", upload.stem, format.extension()),
        pixel => {
            let prefix = prefix(pixel).unwrap_or_default();
            if upload.format() == Some(format) {
                format!("{prefix}{}", upload.file_name)
            } else {
                format!("{prefix}{}.{}", upload.stem, format.extension())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn simple_name() {
        let p = parse_upload_name("photo.jpg");
        assert_eq!(p.file_name, "photo.jpg");
        assert_eq!(p.stem, "photo");
        assert_eq!(p.extension.as_deref(), Some("jpg"));
        assert_eq!(p.format(), Some(TargetFormat::Jpeg));
    }

    #[test]
    fn multiple_dots_split_on_last() {
        let p = parse_upload_name("holiday.photo.JPG");
        assert_eq!(p.stem, "holiday.photo");
        assert_eq!(p.extension.as_deref(), Some("JPG"));
        assert_eq!(p.format(), Some(TargetFormat::Jpeg));
    }

    #[test]
    fn directories_are_dropped() {
        let p = parse_upload_name("/tmp/uploads/cat.png");
        assert_eq!(p.file_name, "cat.png");
        assert_eq!(p.stem, "cat");
    }

    #[test]
    fn no_extension() {
        let p = parse_upload_name("README");
        assert_eq!(p.stem, "README");
        assert_eq!(p.extension, None);
        assert_eq!(p.format(), None);
    }

    #[test]
    fn dot_file_has_no_extension() {
        let p = parse_upload_name(".hidden");
        assert_eq!(p.stem, ".hidden");
        assert_eq!(p.extension, None);
    }

    #[test]
    fn trailing_dot_has_no_extension() {
        let p = parse_upload_name("odd.");
        assert_eq!(p.stem, "odd.");
        assert_eq!(p.extension, None);
    }

    #[test]
    fn empty_name_falls_back() {
        let p = parse_upload_name("");
        assert_eq!(p.stem, "image");
        assert_eq!(p.file_name, "image");
    }

    #[test]
    fn save_format_prefers_extension() {
        let png = parse_upload_name("a.png");
        assert_eq!(
            save_format_for(&png, Some(TargetFormat::Jpeg)),
            Some(TargetFormat::Png)
        );
        let bare = parse_upload_name("a");
        assert_eq!(
            save_format_for(&bare, Some(TargetFormat::Jpeg)),
            Some(TargetFormat::Jpeg)
        );
        assert_eq!(save_format_for(&bare, None), None);
    }

    // =========================================================================
    // Artifact names
    // =========================================================================

    #[test]
    fn pixel_transforms_prefix_upload_name() {
        let up = parse_upload_name("photo.jpg");
        let fmt = TargetFormat::Jpeg;
        assert_eq!(artifact_file_name(TransformKind::Rotate, &up, fmt), "rotated_photo.jpg");
        assert_eq!(artifact_file_name(TransformKind::Resize, &up, fmt), "resized_photo.jpg");
        assert_eq!(artifact_file_name(TransformKind::Crop, &up, fmt), "cropped_photo.jpg");
        assert_eq!(
            artifact_file_name(TransformKind::Grayscale, &up, fmt),
            "grayscale_photo.jpg"
        );
    }

    #[test]
    fn pixel_transform_keeps_uppercase_extension() {
        let up = parse_upload_name("SCAN.PNG");
        assert_eq!(
            artifact_file_name(TransformKind::Resize, &up, TargetFormat::Png),
            "resized_SCAN.PNG"
        );
    }

    #[test]
    fn pixel_transform_without_extension_gets_format_extension() {
        let up = parse_upload_name("photo");
        assert_eq!(
            artifact_file_name(TransformKind::Crop, &up, TargetFormat::Jpeg),
            "cropped_photo.jpeg"
        );
    }

    #[test]
    fn compress_always_jpg() {
        let up = parse_upload_name("diagram.png");
        assert_eq!(
            artifact_file_name(TransformKind::Compress, &up, TargetFormat::Jpeg),
            "compressed_diagram.jpg"
        );
    }

    #[test]
    fn convert_uses_lowercase_format_name() {
        let up = parse_upload_name("photo.jpg");
        let names: Vec<String> = TargetFormat::ALL
            .iter()
            .map(|f| artifact_file_name(TransformKind::ConvertFormat, &up, *f))
            .collect();
        assert_eq!(names, ["photo.jpeg", "photo.png", "photo.bmp", "photo.gif"]);
    }
}
