//! Parameter types for image operations.
//!
//! These structs describe *what* to do, not *how* to do it. They are the
//! interface between the high-level [`operations`](super::operations) module
//! (which decides where each photo lands on which overlay) and the
//! [`backend`](super::backend) (which does the actual pixel work). This
//! separation allows swapping backends (e.g. for testing with a mock) without
//! changing the pipeline.
//!
//! ## Types
//!
//! - [`OverlayAsset`]: a resolved overlay file with its path, its own pixel size
//!   (the output canvas size), and the configured width percentage.
//! - [`CompositeParams`]: everything one composite needs (source file,
//!   expected post-rotation size, placement, overlay).

use super::calculations::{EffectiveDimensions, Placement};
use std::path::PathBuf;

/// An overlay file resolved for one orientation.
///
/// `width` and `height` are read from the file itself and become the canvas
/// size of every output composited with it.
#[derive(Debug, Clone, PartialEq)]
pub struct OverlayAsset {
    pub path: PathBuf,
    pub width: u32,
    pub height: u32,
    /// Share of the canvas width the scaled photo occupies (82.0 = 82%).
    pub width_percent: f64,
}

/// Parameters for a single two-layer composite.
#[derive(Debug, Clone, PartialEq)]
pub struct CompositeParams {
    pub source: PathBuf,
    /// EXIF value used to auto-rotate the decoded source, if any.
    pub exif_orientation: Option<u16>,
    /// Size the source must have once rotated, before scaling.
    pub effective: EffectiveDimensions,
    pub placement: Placement,
    pub overlay: OverlayAsset,
}

