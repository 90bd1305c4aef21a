//! Pure calculation functions for orientation and placement.
//!
//! All functions here are pure and testable without any I/O or images.
//!
//! Every rounding step uses [`f64::round`] (half away from zero). Offsets may
//! come out negative when the scaled photo is larger than the canvas on that
//! axis; they are passed through unchanged and clipped at composite time.

use super::params::OverlayAsset;
use serde::Serialize;
use std::fmt;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum GeometryError {
    #[error("invalid source dimensions {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },
    #[error("scaled size {width}x{height} is empty")]
    EmptyTarget { width: i64, height: i64 },
    #[error("scaled size {width}x{height} exceeds the 512 MiB pixel buffer limit")]
    TooLarge { width: i64, height: i64 },
}

/// Largest RGBA buffer a scaled photo may occupy. Matches the default
/// `max_alloc` of [`image::Limits`].
pub const MAX_TARGET_BYTES: u64 = 512 * 1024 * 1024;

/// Raw decoded size plus the EXIF orientation tag, as read from the file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceMetadata {
    pub width: u32,
    pub height: u32,
    pub exif_orientation: Option<u16>,
}

/// Size of an image after EXIF auto-rotation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct EffectiveDimensions {
    pub width: u32,
    pub height: u32,
}

/// Which overlay a photo gets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    Horizontal,
    Vertical,
}

impl Orientation {
    pub fn as_str(self) -> &'static str {
        match self {
            Orientation::Horizontal => "horizontal",
            Orientation::Vertical => "vertical",
        }
    }
}

impl fmt::Display for Orientation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Scaled size of the photo and its top-left corner on the canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Placement {
    pub target_width: u32,
    pub target_height: u32,
    pub offset_x: i64,
    pub offset_y: i64,
}

/// Whether an EXIF orientation value is one of the 90°/270° variants.
///
/// Values 5–8 (transpose, rotate 90, transverse, rotate 270) swap the stored
/// width and height when the decoder auto-rotates.
pub fn swaps_dimensions(exif_orientation: Option<u16>) -> bool {
    matches!(exif_orientation, Some(5..=8))
}

/// Orientation of an already-rotated image. Squares are vertical.
pub fn orientation_of(dims: EffectiveDimensions) -> Orientation {
    if dims.width > dims.height {
        Orientation::Horizontal
    } else {
        Orientation::Vertical
    }
}

/// Derive the post-rotation size of a source and classify it.
///
/// # Examples
/// ```
/// # use overlay_frame::imaging::{classify, Orientation, SourceMetadata};
/// // 4000x3000 stored sideways (EXIF 6) displays as 3000x4000 portrait
/// let meta = SourceMetadata { width: 4000, height: 3000, exif_orientation: Some(6) };
/// let (dims, orientation) = classify(&meta).unwrap();
/// assert_eq!((dims.width, dims.height), (3000, 4000));
/// assert_eq!(orientation, Orientation::Vertical);
/// ```
pub fn classify(
    meta: &SourceMetadata,
) -> Result<(EffectiveDimensions, Orientation), GeometryError> {
    if meta.width == 0 || meta.height == 0 {
        return Err(GeometryError::InvalidDimensions {
            width: meta.width,
            height: meta.height,
        });
    }

    let effective = if swaps_dimensions(meta.exif_orientation) {
        EffectiveDimensions {
            width: meta.height,
            height: meta.width,
        }
    } else {
        EffectiveDimensions {
            width: meta.width,
            height: meta.height,
        }
    };

    Ok((effective, orientation_of(effective)))
}

/// Width of the scaled photo for a canvas width and percentage.
///
/// Kept separate from [`place`] because it only depends on configuration and
/// the overlay, so it can be checked once before any photo is touched.
pub fn target_width(canvas_width: u32, width_percent: f64) -> i64 {
    (canvas_width as f64 * (width_percent / 100.0)).round() as i64
}

/// Compute the scaled size and centered offset of a photo on an overlay canvas.
///
/// ```text
/// target_width  = round(canvas_width * percent / 100)
/// target_height = round(target_width * height / width)
/// offset_x      = round((canvas_width  - target_width)  / 2)
/// offset_y      = round((canvas_height - target_height) / 2)
/// ```
///
/// A scaled size that does not fit in `u32` or whose RGBA buffer would exceed
/// [`MAX_TARGET_BYTES`] is rejected, so one extreme photo cannot exhaust memory.
pub fn place(
    effective: EffectiveDimensions,
    overlay: &OverlayAsset,
) -> Result<Placement, GeometryError> {
    let width = target_width(overlay.width, overlay.width_percent);
    let aspect_ratio = effective.height as f64 / effective.width as f64;
    let height = (width as f64 * aspect_ratio).round() as i64;

    if width < 1 || height < 1 {
        return Err(GeometryError::EmptyTarget { width, height });
    }
    let too_large = || GeometryError::TooLarge { width, height };
    let target_width = u32::try_from(width).map_err(|_| too_large())?;
    let target_height = u32::try_from(height).map_err(|_| too_large())?;
    if u64::from(target_width) * u64::from(target_height) * 4 > MAX_TARGET_BYTES {
        return Err(too_large());
    }

    let offset_x = ((overlay.width as i64 - width) as f64 / 2.0).round() as i64;
    let offset_y = ((overlay.height as i64 - height) as f64 / 2.0).round() as i64;

    Ok(Placement {
        target_width,
        target_height,
        offset_x,
        offset_y,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn meta(width: u32, height: u32, exif: Option<u16>) -> SourceMetadata {
        SourceMetadata {
            width,
            height,
            exif_orientation: exif,
        }
    }

    fn overlay(width: u32, height: u32, percent: f64) -> OverlayAsset {
        OverlayAsset {
            path: "/frames/overlay.png".into(),
            width,
            height,
            width_percent: percent,
        }
    }

    fn dims(width: u32, height: u32) -> EffectiveDimensions {
        EffectiveDimensions { width, height }
    }

    // =========================================================================
    // classify tests
    // =========================================================================

    #[test]
    fn rotating_exif_values_swap_dimensions() {
        for exif in 5..=8 {
            let (effective, _) = classify(&meta(4000, 3000, Some(exif))).unwrap();
            assert_eq!(effective, dims(3000, 4000), "EXIF {exif}");
        }
    }

    #[test]
    fn non_rotating_exif_values_keep_dimensions() {
        for exif in [None, Some(0), Some(1), Some(2), Some(3), Some(4), Some(9)] {
            let (effective, _) = classify(&meta(4000, 3000, exif)).unwrap();
            assert_eq!(effective, dims(4000, 3000), "EXIF {exif:?}");
        }
    }

    #[test]
    fn landscape_is_horizontal() {
        let (_, orientation) = classify(&meta(1200, 800, None)).unwrap();
        assert_eq!(orientation, Orientation::Horizontal);
    }

    #[test]
    fn portrait_is_vertical() {
        let (_, orientation) = classify(&meta(800, 1200, None)).unwrap();
        assert_eq!(orientation, Orientation::Vertical);
    }

    #[test]
    fn square_is_vertical() {
        let (_, orientation) = classify(&meta(1000, 1000, None)).unwrap();
        assert_eq!(orientation, Orientation::Vertical);
        // Rotation of a square changes nothing
        let (_, orientation) = classify(&meta(1000, 1000, Some(6))).unwrap();
        assert_eq!(orientation, Orientation::Vertical);
    }

    #[test]
    fn sideways_landscape_classifies_as_vertical() {
        // Stored 4000x3000, displayed 3000x4000
        let (_, orientation) = classify(&meta(4000, 3000, Some(8))).unwrap();
        assert_eq!(orientation, Orientation::Vertical);
    }

    #[test]
    fn zero_dimension_is_error() {
        assert_eq!(
            classify(&meta(0, 100, None)),
            Err(GeometryError::InvalidDimensions {
                width: 0,
                height: 100
            })
        );
        assert!(classify(&meta(100, 0, Some(6))).is_err());
    }

    // =========================================================================
    // place tests
    // =========================================================================

    #[test]
    fn place_reference_landscape() {
        // 2000 * 0.82 = 1640; 1640 * 0.75 = 1230; (2000-1640)/2 = 180; (1500-1230)/2 = 135
        let placement = place(dims(4000, 3000), &overlay(2000, 1500, 82.0)).unwrap();
        assert_eq!(
            placement,
            Placement {
                target_width: 1640,
                target_height: 1230,
                offset_x: 180,
                offset_y: 135,
            }
        );
    }

    #[test]
    fn place_portrait_on_vertical_overlay() {
        // 1500 * 0.79 = 1185; 1185 * 4/3 = 1580; (1500-1185)/2 = 157.5 → 158; (2000-1580)/2 = 210
        let placement = place(dims(3000, 4000), &overlay(1500, 2000, 79.0)).unwrap();
        assert_eq!(placement.target_width, 1185);
        assert_eq!(placement.target_height, 1580);
        assert_eq!(placement.offset_x, 158);
        assert_eq!(placement.offset_y, 210);
    }

    #[test]
    fn place_rounds_half_away_from_zero() {
        // 101 * 0.5 = 50.5 → 51
        let placement = place(dims(100, 100), &overlay(101, 101, 50.0)).unwrap();
        assert_eq!(placement.target_width, 51);
        assert_eq!(placement.target_height, 51);
        // (101 - 51) / 2 = 25
        assert_eq!(placement.offset_x, 25);
    }

    #[test]
    fn place_preserves_aspect_ratio() {
        let placement = place(dims(1600, 900), &overlay(1000, 1000, 80.0)).unwrap();
        assert_eq!(placement.target_width, 800);
        assert_eq!(placement.target_height, 450);
    }

    #[test]
    fn place_oversized_photo_has_negative_offsets() {
        // 120% of 1000 = 1200 wide; tall photo overflows both axes
        let placement = place(dims(1000, 2000), &overlay(1000, 1000, 120.0)).unwrap();
        assert_eq!(placement.target_width, 1200);
        assert_eq!(placement.target_height, 2400);
        assert_eq!(placement.offset_x, -100);
        assert_eq!(placement.offset_y, -700);
    }

    #[test]
    fn place_negative_half_offset_rounds_away_from_zero() {
        // 101 * 2.0 = 202 wide; (101 - 202) / 2 = -50.5 → -51
        let placement = place(dims(100, 100), &overlay(101, 101, 200.0)).unwrap();
        assert_eq!(placement.offset_x, -51);
    }

    #[test]
    fn place_zero_width_is_error() {
        let result = place(dims(4000, 3000), &overlay(100, 100, 0.1));
        assert!(matches!(
            result,
            Err(GeometryError::EmptyTarget { width: 0, .. })
        ));
    }

    #[test]
    fn place_width_beyond_u32_is_too_large() {
        // 2000 * 3e8% = 6e9, which does not fit in u32
        let result = place(dims(100, 100), &overlay(2000, 2000, 3e8));
        assert_eq!(
            result,
            Err(GeometryError::TooLarge {
                width: 6_000_000_000,
                height: 6_000_000_000
            })
        );
    }

    #[test]
    fn place_extreme_aspect_over_buffer_limit_is_too_large() {
        // 1x20000 strip at 2000 wide is 2000x40_000_000, far past 512 MiB
        let result = place(dims(1, 20000), &overlay(2000, 2000, 100.0));
        assert!(matches!(
            result,
            Err(GeometryError::TooLarge {
                width: 2000,
                height: 40_000_000
            })
        ));
    }

    #[test]
    fn place_at_buffer_limit_is_allowed() {
        // 8192 * 16384 * 4 bytes is exactly 512 MiB
        let placement = place(dims(1, 2), &overlay(8192, 100, 100.0)).unwrap();
        assert_eq!(placement.target_width, 8192);
        assert_eq!(placement.target_height, 16384);
    }

    #[test]
    fn place_extreme_panorama_empty_height_is_error() {
        // 10 wide on the canvas, 1:100 height ratio rounds to 0
        let result = place(dims(10000, 100), &overlay(100, 100, 10.0));
        assert!(matches!(
            result,
            Err(GeometryError::EmptyTarget {
                width: 10,
                height: 0
            })
        ));
    }

    #[test]
    fn place_is_deterministic() {
        let a = place(dims(3264, 2448), &overlay(2000, 1500, 82.0)).unwrap();
        let b = place(dims(3264, 2448), &overlay(2000, 1500, 82.0)).unwrap();
        assert_eq!(a, b);
    }

    // =========================================================================
    // target_width tests
    // =========================================================================

    #[test]
    fn target_width_percentages() {
        assert_eq!(target_width(2000, 82.0), 1640);
        assert_eq!(target_width(2000, 100.0), 2000);
        assert_eq!(target_width(2000, 150.0), 3000);
        assert_eq!(target_width(3, 10.0), 0);
    }

    #[test]
    fn orientation_display() {
        assert_eq!(Orientation::Horizontal.to_string(), "horizontal");
        assert_eq!(Orientation::Vertical.to_string(), "vertical");
    }
}
