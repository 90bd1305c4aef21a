//! Image processing: pure Rust, no system libraries.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | **Identify** | `ImageReader::into_dimensions` |
//! | **EXIF orientation** | `ImageDecoder::orientation` |
//! | **Rotate / flip** | `DynamicImage::apply_orientation` |
//! | **Scale** | `resize_exact` with Lanczos3 |
//! | **Layer → PNG** | `imageops::overlay` + PNG encoder |
//!
//! The module is split into:
//! - **Calculations**: Pure functions for orientation and placement math (unit testable)
//! - **Parameters**: Data structures describing a composite
//! - **Backend**: [`ImageBackend`] trait + [`RustBackend`]
//! - **Operations**: High-level functions combining calculations + backend

pub mod backend;
pub mod calculations;
pub mod operations;
pub mod params;
pub mod rust_backend;

pub use backend::{BackendError, Dimensions, ImageBackend};
pub use calculations::{
    EffectiveDimensions, GeometryError, Orientation, Placement, SourceMetadata, classify, place,
};
pub use operations::{
    ComposedImage, CompositePlan, ImageError, OverlayResolver, compose, plan_composite,
    resolve_overlay,
};
pub use params::{CompositeParams, OverlayAsset};
pub use rust_backend::{RustBackend, SUPPORTED_EXTENSIONS};
