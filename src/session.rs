//! The transform pipeline controller.
//!
//! A [`Session`] owns the uploaded image and the *current* image, the result
//! of the latest transform. Every transform reads the image chosen by the
//! selector ([`Source`]), writes an artifact to the output directory and then
//! becomes the new current image, so transforms chain:
//!
//! ```text
//! upload ──► current ──resize──► current ──grayscale──► current ...
//!   │                                          ▲
//!   └──────────── selector = original ─────────┘
//! ```
//!
//! State only changes once a transform has fully succeeded. A rejected
//! parameter, a backend failure or a failed write leaves the current image
//! and the artifact ledger exactly as they were.
//!
//! Artifact file names come from [`naming`](crate::naming) and are fixed per
//! transform kind, so repeating a transform overwrites its earlier file.

use crate::config::ToolConfig;
use crate::imaging::{
    BackendError, Dimensions, EncodeSettings, ImageBackend, ParamError, Quality, ResizeFilter,
    RustBackend, Source, TargetFormat, Transform, TransformKind, render,
};
use crate::naming::{ParsedName, artifact_file_name, parse_upload_name, save_format_for};
use image::DynamicImage;
use serde::Serialize;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("No image loaded; load a JPEG or PNG image first")]
    NoImage,
    #[error("Unsupported upload '{0}': only JPEG and PNG images are accepted")]
    UnsupportedUpload(String),
    #[error("Invalid parameters: {0}")]
    Invalid(#[from] ParamError),
    #[error(transparent)]
    Backend(#[from] BackendError),
    #[error("Failed to write {}: {source}", path.display())]
    Write { path: PathBuf, source: io::Error },
    #[error("Failed to read {}: {source}", path.display())]
    Read { path: PathBuf, source: io::Error },
    #[error("No artifact #{index} (history has {count})")]
    NoSuchArtifact { index: usize, count: usize },
}

pub type Result<T> = std::result::Result<T, SessionError>;

/// Where and how a session stores artifacts.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionOptions {
    pub output_dir: PathBuf,
    /// JPEG quality for every write except compress.
    pub save_quality: Quality,
    pub resize_filter: ResizeFilter,
}

impl SessionOptions {
    pub fn from_config(config: &ToolConfig) -> Self {
        Self {
            output_dir: config.output.dir.clone(),
            save_quality: Quality::new(config.encoding.save_quality),
            resize_filter: config.encoding.resize_filter,
        }
    }
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self::from_config(&ToolConfig::default())
    }
}

/// One file written by a transform.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Artifact {
    pub kind: TransformKind,
    /// Which image the transform started from.
    pub source: Source,
    pub file_name: String,
    pub path: PathBuf,
    pub format: TargetFormat,
    pub mime: &'static str,
    pub dimensions: Dimensions,
    /// Color layout of the resulting image (`Rgb8`, `L8`, ...).
    pub color: String,
    /// Size of the written file.
    pub bytes: usize,
}

/// Snapshot of the loaded images.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    pub upload_name: String,
    /// Format pixel transforms are saved in.
    pub save_format: TargetFormat,
    pub original: Dimensions,
    pub current: Dimensions,
    pub color: String,
    pub channels: u8,
    pub selector: Source,
}

/// An artifact ready to hand to the user.
#[derive(Debug, Clone, PartialEq)]
pub struct Download {
    pub file_name: String,
    pub mime: &'static str,
    pub bytes: Vec<u8>,
}

struct Loaded {
    name: ParsedName,
    save_format: TargetFormat,
    original: DynamicImage,
    current: DynamicImage,
}

/// The pipeline controller. See the [module docs](self).
pub struct Session<B: ImageBackend = RustBackend> {
    backend: B,
    options: SessionOptions,
    loaded: Option<Loaded>,
    selector: Source,
    artifacts: Vec<Artifact>,
}

impl Session<RustBackend> {
    pub fn new(options: SessionOptions) -> Self {
        Self::with_backend(RustBackend::new(), options)
    }
}

fn color_name(image: &DynamicImage) -> String {
    format!("{:?}", image.color())
}

impl<B: ImageBackend> Session<B> {
    pub fn with_backend(backend: B, options: SessionOptions) -> Self {
        Self {
            backend,
            options,
            loaded: None,
            selector: Source::default(),
            artifacts: Vec::new(),
        }
    }

    pub fn options(&self) -> &SessionOptions {
        &self.options
    }

    /// Load an image from encoded bytes. `name` is the upload's file name
    /// and drives artifact naming.
    ///
    /// Replaces both the original and the current image. The artifact
    /// ledger and the selector are kept.
    pub fn upload(&mut self, name: &str, bytes: &[u8]) -> Result<Summary> {
        let parsed = parse_upload_name(name);
        let sniffed = self
            .backend
            .identify(bytes)
            .and_then(TargetFormat::from_image_format);
        let sniffed = match sniffed {
            Some(format @ (TargetFormat::Jpeg | TargetFormat::Png)) => format,
            _ => return Err(SessionError::UnsupportedUpload(parsed.file_name)),
        };

        let image = self.backend.decode(bytes)?;
        let save_format = save_format_for(&parsed, Some(sniffed)).unwrap_or(sniffed);
        if parsed.format().is_none() {
            warn!(
                name = %parsed.file_name,
                format = %save_format,
                "upload name has no image extension, artifacts use the detected format"
            );
        }

        info!(
            name = %parsed.file_name,
            width = image.width(),
            height = image.height(),
            color = %color_name(&image),
            "image loaded"
        );
        self.loaded = Some(Loaded {
            name: parsed,
            save_format,
            current: image.clone(),
            original: image,
        });
        self.summary()
    }

    /// Read `path` and [`upload`](Self::upload) its contents.
    pub fn upload_file(&mut self, path: &Path) -> Result<Summary> {
        let bytes = fs::read(path).map_err(|source| SessionError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default();
        self.upload(name, &bytes)
    }

    /// Choose which image later transforms start from. Sticky.
    pub fn select(&mut self, source: Source) {
        debug!(selector = source.label(), "selector changed");
        self.selector = source;
    }

    pub fn selected(&self) -> Source {
        self.selector
    }

    /// Apply `transform` to the selected image.
    pub fn apply(&mut self, transform: &Transform) -> Result<Artifact> {
        self.apply_to(transform, self.selector)
    }

    /// Apply `transform` to an explicitly chosen image. The result becomes
    /// the current image either way.
    pub fn apply_to(&mut self, transform: &Transform, source: Source) -> Result<Artifact> {
        let loaded = self.loaded.as_ref().ok_or(SessionError::NoImage)?;
        let input = match source {
            Source::Current => &loaded.current,
            Source::Original => &loaded.original,
        };
        transform.validate((input.width(), input.height()))?;

        debug!(
            op = ?transform.kind(),
            source = source.label(),
            width = input.width(),
            height = input.height(),
            "applying transform"
        );
        let settings = EncodeSettings {
            save_format: loaded.save_format,
            save_quality: self.options.save_quality,
            resize_filter: self.options.resize_filter,
        };
        let rendered = render(&self.backend, input, transform, &settings)?;

        let file_name = artifact_file_name(transform.kind(), &loaded.name, rendered.format);
        let path = self.write_artifact(&file_name, &rendered.bytes)?;
        let artifact = Artifact {
            kind: transform.kind(),
            source,
            file_name,
            path,
            format: rendered.format,
            mime: rendered.format.mime_type(),
            dimensions: Dimensions::of(&rendered.image),
            color: color_name(&rendered.image),
            bytes: rendered.bytes.len(),
        };
        info!(
            path = %artifact.path.display(),
            width = artifact.dimensions.width,
            height = artifact.dimensions.height,
            bytes = artifact.bytes,
            "artifact written"
        );

        if let Some(loaded) = self.loaded.as_mut() {
            loaded.current = rendered.image;
        }
        self.artifacts.push(artifact.clone());
        Ok(artifact)
    }

    fn write_artifact(&self, file_name: &str, bytes: &[u8]) -> Result<PathBuf> {
        let dir = &self.options.output_dir;
        fs::create_dir_all(dir).map_err(|source| SessionError::Write {
            path: dir.clone(),
            source,
        })?;
        let path = dir.join(file_name);
        fs::write(&path, bytes).map_err(|source| SessionError::Write {
            path: path.clone(),
            source,
        })?;
        Ok(path)
    }

    pub fn current(&self) -> Option<&DynamicImage> {
        self.loaded.as_ref().map(|l| &l.current)
    }

    pub fn original(&self) -> Option<&DynamicImage> {
        self.loaded.as_ref().map(|l| &l.original)
    }

    pub fn upload_name(&self) -> Option<&str> {
        self.loaded.as_ref().map(|l| l.name.file_name.as_str())
    }

    /// Every artifact written so far, in application order.
    pub fn artifacts(&self) -> &[Artifact] {
        &self.artifacts
    }

    pub fn last_artifact(&self) -> Option<&Artifact> {
        self.artifacts.last()
    }

    pub fn summary(&self) -> Result<Summary> {
        let loaded = self.loaded.as_ref().ok_or(SessionError::NoImage)?;
        Ok(Summary {
            upload_name: loaded.name.file_name.clone(),
            save_format: loaded.save_format,
            original: Dimensions::of(&loaded.original),
            current: Dimensions::of(&loaded.current),
            color: color_name(&loaded.current),
            channels: loaded.current.color().channel_count(),
            selector: self.selector,
        })
    }

    /// Read artifact `index` (0-based, application order) back from disk.
    ///
    /// Artifacts sharing a file name share the file, so an earlier entry
    /// returns whatever was written last.
    pub fn download(&self, index: usize) -> Result<Download> {
        let artifact = self
            .artifacts
            .get(index)
            .ok_or(SessionError::NoSuchArtifact {
                index: index.saturating_add(1),
                count: self.artifacts.len(),
            })?;
        let bytes = fs::read(&artifact.path).map_err(|source| SessionError::Read {
            path: artifact.path.clone(),
            source,
        })?;
        Ok(Download {
            file_name: artifact.file_name.clone(),
            mime: artifact.mime,
            bytes,
        })
    }

    /// [`download`](Self::download) the most recent artifact.
    pub fn download_latest(&self) -> Result<Download> {
        match self.artifacts.len() {
            0 => Err(SessionError::NoSuchArtifact { index: 1, count: 0 }),
            n => self.download(n - 1),
        }
    }
}
