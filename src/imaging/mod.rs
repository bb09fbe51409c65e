//! Image processing — pure Rust on the `image` crate.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | **Identify** | `image::guess_format` |
//! | **Decode** | `image::load_from_memory` |
//! | **Compress** | RGB8 → `JpegEncoder` at the requested quality |
//! | **Rotate** | fixed-canvas inverse mapping, nearest neighbour |
//! | **Resize** | `resize_exact` (Catmull-Rom by default) |
//! | **Crop** | `crop_imm` after bounds checks |
//! | **Grayscale** | `to_luma8` |
//! | **Convert** | `write_to` / `JpegEncoder`, after color narrowing |
//!
//! The module is split into:
//! - **Calculations**: Pure functions for rotation geometry and encoder color types (unit testable)
//! - **Parameters**: Data structures describing image operations, with validation
//! - **Backend**: [`ImageBackend`] trait + [`RustBackend`]
//! - **Rotation**: Fixed-canvas rotation on pixel buffers
//! - **Operations**: High-level functions combining parameters + backend

pub mod backend;
mod calculations;
pub mod operations;
mod params;
pub mod rotation;
pub mod rust_backend;

pub use backend::{BackendError, Dimensions, ImageBackend};
pub use calculations::{crop_extent, normalize_degrees, storable_color};
pub use operations::{EncodeSettings, Rendered, render};
pub use params::{
    ANGLE_RANGE, CropBox, ParamError, QUALITY_RANGE, Quality, ResizeFilter, ResizeParams,
    SIZE_RANGE, Source, TargetFormat, Transform, TransformKind,
};
pub use rust_backend::RustBackend;
