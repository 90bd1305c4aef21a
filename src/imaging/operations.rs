//! High-level image operations.
//!
//! These functions combine calculations with backend execution: classify a
//! photo, pick its overlay, place it, and hand the result to the backend.
//! Nothing here touches the output directory; [`compose`] returns PNG bytes
//! and the batch driver decides where they go.

use super::backend::{BackendError, ImageBackend};
use super::calculations::{
    EffectiveDimensions, GeometryError, Orientation, Placement, SourceMetadata, classify, place,
};
use super::params::{CompositeParams, OverlayAsset};
use crate::config::ProcessingConfig;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use thiserror::Error;

/// Why a single photo could not be composited.
///
/// None of these stop a batch; the driver reports them and moves on.
#[derive(Error, Debug)]
pub enum ImageError {
    #[error("cannot read image metadata: {0}")]
    Metadata(#[source] BackendError),
    #[error("unusable geometry: {0}")]
    Geometry(#[from] GeometryError),
    #[error("cannot read {orientation} overlay {}: {source}", path.display())]
    OverlayRead {
        orientation: Orientation,
        path: PathBuf,
        #[source]
        source: BackendError,
    },
    #[error("compositing failed: {0}")]
    Compositing(#[source] BackendError),
    #[error("cannot write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Read an overlay's size and pair it with the configured percentage.
///
/// An overlay that decodes to a zero-sized image is treated as unreadable.
pub fn resolve_overlay(
    backend: &impl ImageBackend,
    orientation: Orientation,
    config: &ProcessingConfig,
) -> Result<OverlayAsset, ImageError> {
    let overlay_config = config.overlay(orientation);
    let read_error = |source| ImageError::OverlayRead {
        orientation,
        path: overlay_config.path.clone(),
        source,
    };

    let dims = backend.identify(&overlay_config.path).map_err(read_error)?;
    if dims.width == 0 || dims.height == 0 {
        return Err(read_error(BackendError::ProcessingFailed(format!(
            "overlay reports {}x{}",
            dims.width, dims.height
        ))));
    }

    Ok(OverlayAsset {
        path: overlay_config.path.clone(),
        width: dims.width,
        height: dims.height,
        width_percent: overlay_config.width_percent,
    })
}

/// Per-orientation overlay lookup, memoized for the lifetime of a run.
///
/// Only successful resolutions are cached, so a failing overlay is retried
/// (and reported) for every photo that needs it.
pub struct OverlayResolver<'a> {
    config: &'a ProcessingConfig,
    horizontal: OnceLock<OverlayAsset>,
    vertical: OnceLock<OverlayAsset>,
}

impl<'a> OverlayResolver<'a> {
    pub fn new(config: &'a ProcessingConfig) -> Self {
        Self {
            config,
            horizontal: OnceLock::new(),
            vertical: OnceLock::new(),
        }
    }

    pub fn resolve(
        &self,
        backend: &impl ImageBackend,
        orientation: Orientation,
    ) -> Result<OverlayAsset, ImageError> {
        let slot = match orientation {
            Orientation::Horizontal => &self.horizontal,
            Orientation::Vertical => &self.vertical,
        };
        if let Some(asset) = slot.get() {
            return Ok(asset.clone());
        }
        let asset = resolve_overlay(backend, orientation, self.config)?;
        Ok(slot.get_or_init(|| asset).clone())
    }
}

/// Everything decided about one photo before any pixels are touched.
#[derive(Debug, Clone, PartialEq)]
pub struct CompositePlan {
    pub metadata: SourceMetadata,
    pub effective: EffectiveDimensions,
    pub orientation: Orientation,
    pub placement: Placement,
    pub params: CompositeParams,
}

/// A finished composite: the plan that produced it and the PNG bytes.
#[derive(Debug, Clone)]
pub struct ComposedImage {
    pub plan: CompositePlan,
    pub png: Vec<u8>,
}

/// Classify a photo, resolve its overlay, and compute its placement.
pub fn plan_composite(
    backend: &impl ImageBackend,
    resolver: &OverlayResolver<'_>,
    source: &Path,
) -> Result<CompositePlan, ImageError> {
    let metadata = backend.read_metadata(source).map_err(ImageError::Metadata)?;
    let (effective, orientation) = classify(&metadata)?;

    tracing::debug!(
        source = %source.display(),
        width = metadata.width,
        height = metadata.height,
        exif = ?metadata.exif_orientation,
        effective_width = effective.width,
        effective_height = effective.height,
        %orientation,
        "Classified source"
    );

    let overlay = resolver.resolve(backend, orientation)?;
    let placement = place(effective, &overlay)?;

    tracing::debug!(
        source = %source.display(),
        target_width = placement.target_width,
        target_height = placement.target_height,
        offset_x = placement.offset_x,
        offset_y = placement.offset_y,
        canvas_width = overlay.width,
        canvas_height = overlay.height,
        "Placed source on overlay"
    );

    Ok(CompositePlan {
        metadata,
        effective,
        orientation,
        placement,
        params: CompositeParams {
            source: source.to_path_buf(),
            exif_orientation: metadata.exif_orientation,
            effective,
            placement,
            overlay,
        },
    })
}

/// Run the full per-photo pipeline and return the encoded PNG.
pub fn compose(
    backend: &impl ImageBackend,
    resolver: &OverlayResolver<'_>,
    source: &Path,
) -> Result<ComposedImage, ImageError> {
    let plan = plan_composite(backend, resolver, source)?;
    let png = backend
        .composite(&plan.params)
        .map_err(ImageError::Compositing)?;
    Ok(ComposedImage { plan, png })
}
