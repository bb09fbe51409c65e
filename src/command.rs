//! Parsing of session commands.
//!
//! Each script step or shell line is one command, parsed with clap so the
//! grammar, error messages and help text all come from the same definitions:
//!
//! ```text
//! compress [QUALITY]            resize [WIDTH] [HEIGHT]
//! rotate [DEGREES]              crop LEFT TOP RIGHT BOTTOM
//! grayscale                     convert [FORMAT]
//! use original|modified         load PATH
//! status                        history
//! download DEST [--index N]     help
//! quit | exit
//! ```
//!
//! Omitted arguments take the configured [`DefaultsConfig`] values. Blank
//! lines and `#` comments parse to `None`.

use crate::config::DefaultsConfig;
use crate::imaging::{CropBox, Source, TargetFormat, Transform};
use clap::error::ErrorKind;
use clap::{CommandFactory, Parser, Subcommand};
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum CommandError {
    #[error("{0}")]
    Syntax(String),
    #[error("Unterminated quote in: {0}")]
    UnterminatedQuote(String),
}

/// A parsed command, ready for the shell to execute.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Apply(Transform),
    Select(Source),
    Load(PathBuf),
    Status,
    History,
    /// Copy an artifact to `dest`. `index` is 1-based; `None` means latest.
    Download {
        dest: PathBuf,
        index: Option<usize>,
    },
    Help,
    Quit,
}

#[derive(Parser, Debug)]
#[command(
    name = "imgconv",
    no_binary_name = true,
    disable_help_subcommand = true,
    help_template = "Commands:\n{subcommands}"
)]
struct Line {
    #[command(subcommand)]
    command: LineCommand,
}

#[derive(Subcommand, Debug)]
enum LineCommand {
    /// Re-encode as JPEG (quality 10-100)
    Compress { quality: Option<u32> },
    /// Rotate counter-clockwise, keeping the canvas (0-360 degrees)
    Rotate {
        #[arg(allow_negative_numbers = true)]
        degrees: Option<f64>,
    },
    /// Scale to exactly WIDTH x HEIGHT (50-2000 each)
    Resize {
        width: Option<u32>,
        height: Option<u32>,
    },
    /// Cut out the box LEFT TOP RIGHT BOTTOM
    Crop {
        left: u32,
        top: u32,
        right: u32,
        bottom: u32,
    },
    /// Convert to single-channel grayscale
    Grayscale,
    /// Convert to jpeg, png, bmp or gif
    Convert { format: Option<TargetFormat> },
    /// Choose the image transforms start from: original or modified
    Use { source: Source },
    /// Load a new JPEG or PNG image
    Load { path: PathBuf },
    /// Describe the loaded image
    Status,
    /// List the artifacts written so far
    History,
    /// Copy an artifact (latest by default) to DEST
    Download {
        dest: PathBuf,
        /// Artifact number as shown by `history`
        #[arg(long)]
        index: Option<usize>,
    },
    /// Show this help
    Help,
    /// Leave the shell
    #[command(alias = "exit")]
    Quit,
}

impl LineCommand {
    fn resolve(self, defaults: &DefaultsConfig) -> Command {
        match self {
            LineCommand::Compress { quality } => Command::Apply(Transform::Compress {
                quality: quality.unwrap_or(defaults.quality),
            }),
            LineCommand::Rotate { degrees } => Command::Apply(Transform::Rotate {
                degrees: degrees.unwrap_or(defaults.degrees),
            }),
            LineCommand::Resize { width, height } => Command::Apply(Transform::Resize {
                width: width.unwrap_or(defaults.width),
                height: height.unwrap_or(defaults.height),
            }),
            LineCommand::Crop {
                left,
                top,
                right,
                bottom,
            } => Command::Apply(Transform::Crop(CropBox::new(left, top, right, bottom))),
            LineCommand::Grayscale => Command::Apply(Transform::Grayscale),
            LineCommand::Convert { format } => Command::Apply(Transform::ConvertFormat {
                format: format.unwrap_or(defaults.format),
            }),
            LineCommand::Use { source } => Command::Select(source),
            LineCommand::Load { path } => Command::Load(path),
            LineCommand::Status => Command::Status,
            LineCommand::History => Command::History,
            LineCommand::Download { dest, index } => Command::Download { dest, index },
            LineCommand::Help => Command::Help,
            LineCommand::Quit => Command::Quit,
        }
    }
}

/// Parse one line. Returns `Ok(None)` for blank lines and comments.
pub fn parse_line(line: &str, defaults: &DefaultsConfig) -> Result<Option<Command>, CommandError> {
    let trimmed = line.trim();
    if trimmed.is_empty() || trimmed.starts_with('#') {
        return Ok(None);
    }

    let words = split_words(trimmed)?;
    match Line::try_parse_from(words) {
        Ok(parsed) => Ok(Some(parsed.command.resolve(defaults))),
        Err(e) if e.kind() == ErrorKind::DisplayHelp => Ok(Some(Command::Help)),
        Err(e) => Err(CommandError::Syntax(e.to_string().trim_end().to_string())),
    }
}

/// Help listing every command.
pub fn help_text() -> String {
    Line::command().render_help().to_string()
}

/// Split on whitespace, keeping single- or double-quoted runs together.
fn split_words(line: &str) -> Result<Vec<String>, CommandError> {
    let mut words = Vec::new();
    let mut current = String::new();
    let mut in_word = false;
    let mut quote: Option<char> = None;

    for c in line.chars() {
        match quote {
            Some(q) if c == q => quote = None,
            Some(_) => current.push(c),
            None if c == '"' || c == '\'' => {
                quote = Some(c);
                in_word = true;
            }
            None if c.is_whitespace() => {
                if in_word {
                    words.push(std::mem::take(&mut current));
                    in_word = false;
                }
            }
            None => {
                current.push(c);
                in_word = true;
            }
        }
    }

    if quote.is_some() {
        return Err(CommandError::UnterminatedQuote(line.to_string()));
    }
    if in_word {
        words.push(current);
    }
    Ok(words)
}
