//! Pure Rust image processing backend.
//!
//! Everything is statically linked into the binary.
//!
//! ## Crate mapping
//!
//! | Operation | Crate / function |
//! |---|---|
//! | Decode (JPEG, PNG, BMP, TIFF, WebP) | `image` crate, format sniffed from content |
//! | EXIF orientation | `ImageDecoder::orientation` |
//! | Auto-rotate | `DynamicImage::apply_orientation` |
//! | Resize | `DynamicImage::resize_exact` with `Lanczos3` (fill, no crop) |
//! | Canvas + layering | `RgbaImage` + `image::imageops::overlay` (source-over, clipped) |
//! | Encode → PNG | `DynamicImage::write_to` with `ImageFormat::Png` |

use super::backend::{BackendError, Dimensions, ImageBackend};
use super::calculations::SourceMetadata;
use super::params::CompositeParams;
use image::imageops::{self, FilterType};
use image::metadata::Orientation;
use image::{DynamicImage, ImageDecoder, ImageFormat, ImageReader, Rgba, RgbaImage};
use std::io::Cursor;
use std::path::Path;

/// Extensions accepted as input photos (compared case-insensitively).
pub const SUPPORTED_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "bmp", "tiff", "webp"];

/// Canvas fill: white, fully transparent.
const CANVAS_BACKGROUND: Rgba<u8> = Rgba([255, 255, 255, 0]);

/// Pure Rust backend using the `image` crate ecosystem.
///
/// See the [module docs](self) for the crate-to-operation mapping.
pub struct RustBackend;

impl RustBackend {
    pub fn new() -> Self {
        Self
    }
}

impl Default for RustBackend {
    fn default() -> Self {
        Self::new()
    }
}

/// Load and decode an image from disk, trusting content over extension.
fn load_image(path: &Path) -> Result<DynamicImage, BackendError> {
    ImageReader::open(path)
        .map_err(BackendError::Io)?
        .with_guessed_format()
        .map_err(BackendError::Io)?
        .decode()
        .map_err(|e| {
            BackendError::ProcessingFailed(format!("Failed to decode {}: {}", path.display(), e))
        })
}

/// EXIF tag value of a decoder-reported orientation; `None` when no transform
/// is needed.
fn exif_value(orientation: Orientation) -> Option<u16> {
    match orientation {
        Orientation::NoTransforms => None,
        other => Some(u16::from(other.to_exif())),
    }
}

/// Decoder orientation for an EXIF tag value. Unknown values mean no transform.
fn orientation_from_exif(exif_orientation: Option<u16>) -> Orientation {
    exif_orientation
        .and_then(|v| u8::try_from(v).ok())
        .and_then(Orientation::from_exif)
        .unwrap_or(Orientation::NoTransforms)
}

/// Layer the scaled photo and the overlay onto a transparent canvas.
///
/// The canvas always has the overlay's configured size. The photo goes down
/// first at its (possibly negative) offset and is clipped to the canvas; the
/// overlay goes on top at the origin.
fn layer(photo: &RgbaImage, overlay: &RgbaImage, params: &CompositeParams) -> RgbaImage {
    let mut canvas = RgbaImage::from_pixel(
        params.overlay.width,
        params.overlay.height,
        CANVAS_BACKGROUND,
    );
    imageops::overlay(
        &mut canvas,
        photo,
        params.placement.offset_x,
        params.placement.offset_y,
    );
    imageops::overlay(&mut canvas, overlay, 0, 0);
    canvas
}

fn encode_png(img: RgbaImage) -> Result<Vec<u8>, BackendError> {
    let mut bytes = Vec::new();
    DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
        .map_err(|e| BackendError::ProcessingFailed(format!("PNG encode failed: {}", e)))?;
    Ok(bytes)
}

impl ImageBackend for RustBackend {
    fn read_metadata(&self, path: &Path) -> Result<SourceMetadata, BackendError> {
        let mut decoder = ImageReader::open(path)
            .map_err(BackendError::Io)?
            .with_guessed_format()
            .map_err(BackendError::Io)?
            .into_decoder()
            .map_err(|e| {
                BackendError::ProcessingFailed(format!("Failed to read {}: {}", path.display(), e))
            })?;
        let (width, height) = decoder.dimensions();
        // Unreadable EXIF is treated as absent, as decoders do for display
        let orientation = decoder
            .orientation()
            .unwrap_or(Orientation::NoTransforms);
        Ok(SourceMetadata {
            width,
            height,
            exif_orientation: exif_value(orientation),
        })
    }

    fn identify(&self, path: &Path) -> Result<Dimensions, BackendError> {
        let (width, height) = ImageReader::open(path)
            .map_err(BackendError::Io)?
            .with_guessed_format()
            .map_err(BackendError::Io)?
            .into_dimensions()
            .map_err(|e| {
                BackendError::ProcessingFailed(format!("Failed to read dimensions: {}", e))
            })?;
        Ok(Dimensions { width, height })
    }

    fn composite(&self, params: &CompositeParams) -> Result<Vec<u8>, BackendError> {
        let mut source = load_image(&params.source)?;
        source.apply_orientation(orientation_from_exif(params.exif_orientation));

        let (width, height) = (source.width(), source.height());
        if (width, height) != (params.effective.width, params.effective.height) {
            return Err(BackendError::ProcessingFailed(format!(
                "Rotated source is {}x{}, expected {}x{}",
                width, height, params.effective.width, params.effective.height
            )));
        }

        let photo = source
            .resize_exact(
                params.placement.target_width,
                params.placement.target_height,
                FilterType::Lanczos3,
            )
            .to_rgba8();
        let overlay = load_image(&params.overlay.path)?.to_rgba8();

        encode_png(layer(&photo, &overlay, params))
    }
}
