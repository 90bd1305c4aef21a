//! Image processing backend trait and shared types.
//!
//! The [`ImageBackend`] trait defines the three operations every backend must
//! support: read a photo's metadata, identify an overlay's size, and produce
//! a composite.
//!
//! The production implementation is
//! [`RustBackend`](super::rust_backend::RustBackend), built on the `image`
//! crate. Tests use a recording mock so pipeline logic can be exercised
//! without decoding anything.

use super::calculations::SourceMetadata;
use super::params::CompositeParams;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Processing failed: {0}")]
    ProcessingFailed(String),
}

/// Result of an identify operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

/// Trait for image processing backends.
///
/// `Sync` so a single backend can be shared by every rayon worker.
pub trait ImageBackend: Sync {
    /// Read raw (stored) dimensions and the EXIF orientation tag of a photo.
    fn read_metadata(&self, path: &Path) -> Result<SourceMetadata, BackendError>;

    /// Get the pixel size of an image without decoding it.
    fn identify(&self, path: &Path) -> Result<Dimensions, BackendError>;

    /// Rotate, scale, and layer a photo under its overlay; returns PNG bytes.
    fn composite(&self, params: &CompositeParams) -> Result<Vec<u8>, BackendError>;
}
