//! Tool configuration module.
//!
//! Handles loading, validating, and merging `imgconv.toml`. Configuration is
//! layered: stock defaults are overridden by the user's file, found in the
//! working directory or passed with `--config`.
//!
//! ## Keys
//!
//! ```toml
//! # Every key may be omitted; these are the stock values
//!
//! [output]
//! dir = "processed_images"      # Where artifacts are written
//!
//! [defaults]
//! quality = 85                  # compress, 10-100
//! degrees = 0.0                 # rotate, 0-360
//! width = 640                   # resize, 50-2000
//! height = 360                  # resize, 50-2000
//! format = "jpeg"               # convert: jpeg | png | bmp | gif
//!
//! [encoding]
//! save_quality = 75             # JPEG quality for non-compress writes, 1-100
//! resize_filter = "catmull-rom" # nearest | triangle | catmull-rom | gaussian | lanczos3
//! ```
//!
//! ## Sparse Files
//!
//! A file only names what it changes, for example a larger resize default:
//!
//! ```toml
//! [defaults]
//! width = 1280
//! height = 720
//! ```
//!
//! A misspelled key is an error, not a silent no-op.

use crate::imaging::{ANGLE_RANGE, QUALITY_RANGE, ResizeFilter, SIZE_RANGE, TargetFormat};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// File name looked up in the working directory.
pub const CONFIG_FILENAME: &str = "imgconv.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("TOML serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Tool configuration loaded from `imgconv.toml`.
///
/// Every section defaults independently, so a file may set one key and
/// nothing else.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ToolConfig {
    /// Artifact location.
    pub output: OutputConfig,
    /// Values used when a command omits its arguments.
    pub defaults: DefaultsConfig,
    /// How artifacts are encoded.
    pub encoding: EncodingConfig,
}

impl ToolConfig {
    /// Reject values the transforms themselves would reject.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.output.dir.as_os_str().is_empty() {
            return Err(ConfigError::Validation("output.dir must not be empty".into()));
        }
        let d = &self.defaults;
        if !QUALITY_RANGE.contains(&d.quality) {
            return Err(ConfigError::Validation(format!(
                "defaults.quality must be {}-{}",
                QUALITY_RANGE.start(),
                QUALITY_RANGE.end()
            )));
        }
        if !d.degrees.is_finite() || !ANGLE_RANGE.contains(&d.degrees) {
            return Err(ConfigError::Validation(
                "defaults.degrees must be 0-360".into(),
            ));
        }
        if !SIZE_RANGE.contains(&d.width) || !SIZE_RANGE.contains(&d.height) {
            return Err(ConfigError::Validation(format!(
                "defaults.width and defaults.height must be {}-{}",
                SIZE_RANGE.start(),
                SIZE_RANGE.end()
            )));
        }
        if !(1..=100).contains(&self.encoding.save_quality) {
            return Err(ConfigError::Validation(
                "encoding.save_quality must be 1-100".into(),
            ));
        }
        Ok(())
    }
}

/// Artifact location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OutputConfig {
    /// Directory artifacts are written to; created on first write.
    pub dir: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("processed_images"),
        }
    }
}

/// Command argument defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DefaultsConfig {
    pub quality: u32,
    pub degrees: f64,
    pub width: u32,
    pub height: u32,
    pub format: TargetFormat,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            quality: 85,
            degrees: 0.0,
            width: 640,
            height: 360,
            format: TargetFormat::Jpeg,
        }
    }
}

/// Encoding settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EncodingConfig {
    /// JPEG quality for artifacts other than compress (1-100).
    pub save_quality: u32,
    /// Resampling filter for resize.
    pub resize_filter: ResizeFilter,
}

impl Default for EncodingConfig {
    fn default() -> Self {
        Self {
            save_quality: 75,
            resize_filter: ResizeFilter::default(),
        }
    }
}

// =============================================================================
// Loading
// =============================================================================

/// [`ToolConfig::default`] as a TOML table, the layer every user file is
/// merged onto.
pub fn stock_defaults_value() -> Result<toml::Value, ConfigError> {
    Ok(toml::Value::try_from(ToolConfig::default())?)
}

/// Lay `overlay` over `base`. Tables merge per key, recursively; any other
/// overlay value replaces the base value outright. Base keys missing from
/// the overlay survive.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Load `imgconv.toml` from a directory as a raw TOML value.
///
/// `Ok(None)` when the directory has no config file; a file that is not
/// valid TOML is an error.
pub fn load_raw_config(dir: &Path) -> Result<Option<toml::Value>, ConfigError> {
    let config_path = dir.join(CONFIG_FILENAME);
    if !config_path.exists() {
        tracing::debug!(path = %config_path.display(), "no config file, using defaults");
        return Ok(None);
    }
    read_raw(&config_path).map(Some)
}

fn read_raw(path: &Path) -> Result<toml::Value, ConfigError> {
    let content = fs::read_to_string(path)?;
    let value: toml::Value = toml::from_str(&content)?;
    tracing::debug!(path = %path.display(), "loaded config file");
    Ok(value)
}

/// Apply `overlay` (if any) to `base` and turn the result into a checked
/// [`ToolConfig`].
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<ToolConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: ToolConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load config from `imgconv.toml` in the given directory.
///
/// Falls back to the stock values when the file is absent.
pub fn load_config(dir: &Path) -> Result<ToolConfig, ConfigError> {
    let base = stock_defaults_value()?;
    let overlay = load_raw_config(dir)?;
    resolve_config(base, overlay)
}

/// Load config from an explicit file. Unlike [`load_config`], a missing
/// file is an error.
pub fn load_config_file(path: &Path) -> Result<ToolConfig, ConfigError> {
    let base = stock_defaults_value()?;
    let overlay = read_raw(path)?;
    resolve_config(base, Some(overlay))
}

/// Commented stock `imgconv.toml`, printed by `imgconv gen-config`.
pub fn stock_config_toml() -> &'static str {
    r##"# imgconv Configuration
# =====================
# Every key is optional; delete what you don't change.
# The values below are the built-in defaults.
#
# The file is read from ./imgconv.toml, or from the path given with --config.
# Misspelled or unknown keys are rejected.

# ---------------------------------------------------------------------------
# Output
# ---------------------------------------------------------------------------
[output]
# Directory artifacts are written to. Created on first write.
# Artifacts with the same name are overwritten.
dir = "processed_images"

# ---------------------------------------------------------------------------
# Command defaults (used when a command omits its arguments)
# ---------------------------------------------------------------------------
[defaults]
# compress: JPEG quality, 10-100.
quality = 85

# rotate: counter-clockwise angle in degrees, 0-360.
degrees = 0.0

# resize: target size in pixels, 50-2000 per side.
width = 640
height = 360

# convert: one of jpeg, png, bmp, gif.
format = "jpeg"

# ---------------------------------------------------------------------------
# Encoding
# ---------------------------------------------------------------------------
[encoding]
# JPEG quality for artifacts written by rotate, resize, crop, grayscale
# and convert (compress uses its own quality). 1-100.
save_quality = 75

# Resampling filter for resize:
# nearest, triangle, catmull-rom (bicubic), gaussian, lanczos3.
resize_filter = "catmull-rom"
"##
}
