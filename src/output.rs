//! CLI output formatting for session events.
//!
//! # Information-First Display
//!
//! Every result leads with what the image *is* (caption, dimensions, color
//! layout), with the file it was written to shown as secondary context on
//! an indented line.
//!
//! # Output Format
//!
//! ## Load
//!
//! ```text
//! Loaded photo.jpg (JPEG)
//!     640x360 Rgb8
//! ```
//!
//! ## Transform
//!
//! ```text
//! Resized Image: 100x100 Rgb8
//!     Saved: processed_images/resized_photo.jpg (image/jpeg, 2.1 KB)
//! ```
//!
//! ## Status
//!
//! ```text
//! photo.jpg
//!     Original Image: 640x360
//!     Modified Image: 100x100 L8
//!     Transforms start from: Modified Image
//! ```
//!
//! ## History
//!
//! ```text
//! 001 Resized Image → resized_photo.jpg (100x100, image/jpeg)
//! 002 Grayscale Image → grayscale_photo.jpg (100x100, image/jpeg)
//! ```
//!
//! # Architecture
//!
//! Each event has a `format_*` function (returns `Vec<String>`) for
//! testability. The shell writes those lines to its output stream with
//! [`write_lines`]; `print_*` wrappers write to stdout. Format functions are
//! pure — no I/O, no side effects.

use crate::session::{Artifact, Download, Summary};
use std::io::{self, Write};
use std::path::Path;

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Human-readable byte count.
fn format_size(bytes: usize) -> String {
    const KB: f64 = 1024.0;
    const MB: f64 = KB * 1024.0;
    let b = bytes as f64;
    if b >= MB {
        format!("{:.1} MB", b / MB)
    } else if b >= KB {
        format!("{:.1} KB", b / KB)
    } else {
        format!("{} B", bytes)
    }
}

/// ```text
/// Loaded photo.jpg (JPEG)
///     640x360 Rgb8
/// ```
pub fn format_upload(summary: &Summary) -> Vec<String> {
    vec![
        format!("Loaded {} ({})", summary.upload_name, summary.save_format),
        format!(
            "    {}x{} {}",
            summary.original.width, summary.original.height, summary.color
        ),
    ]
}

/// Preview of a transform result plus where it was written.
pub fn format_artifact(artifact: &Artifact) -> Vec<String> {
    vec![
        format!(
            "{}: {}x{} {}",
            artifact.kind.caption(),
            artifact.dimensions.width,
            artifact.dimensions.height,
            artifact.color
        ),
        format!(
            "    Saved: {} ({}, {})",
            artifact.path.display(),
            artifact.mime,
            format_size(artifact.bytes)
        ),
    ]
}

pub fn format_status(summary: &Summary) -> Vec<String> {
    use crate::imaging::Source;
    vec![
        summary.upload_name.clone(),
        format!(
            "    {}: {}x{}",
            Source::Original.label(),
            summary.original.width,
            summary.original.height
        ),
        format!(
            "    {}: {}x{} {}",
            Source::Current.label(),
            summary.current.width,
            summary.current.height,
            summary.color
        ),
        format!("    Transforms start from: {}", summary.selector.label()),
    ]
}

/// One line per artifact, numbered in application order.
pub fn format_history(artifacts: &[Artifact]) -> Vec<String> {
    if artifacts.is_empty() {
        return vec!["No artifacts yet".to_string()];
    }
    artifacts
        .iter()
        .enumerate()
        .map(|(i, a)| {
            format!(
                "{} {} → {} ({}x{}, {})",
                format_index(i + 1),
                a.kind.caption(),
                a.file_name,
                a.dimensions.width,
                a.dimensions.height,
                a.mime
            )
        })
        .collect()
}

pub fn format_download(download: &Download, dest: &Path) -> Vec<String> {
    vec![format!(
        "Downloaded {} ({}, {}) → {}",
        download.file_name,
        download.mime,
        format_size(download.bytes.len()),
        dest.display()
    )]
}

/// Write formatted lines to any output stream.
pub fn write_lines(out: &mut impl Write, lines: &[String]) -> io::Result<()> {
    for line in lines {
        writeln!(out, "{}", line)?;
    }
    Ok(())
}

/// Print the artifact history to stdout.
pub fn print_history(artifacts: &[Artifact]) {
    for line in format_history(artifacts) {
        println!("{}", line);
    }
}
