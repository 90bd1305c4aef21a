//! Shared test utilities for the overlay-frame test suite.
//!
//! Provides synthetic image generators (JPEG, PNG, overlay frames), EXIF
//! splicing for orientation tests, and a ready-to-run batch fixture.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let fixture = BatchFixture::new();
//! write_jpeg(&fixture.input_dir().join("a.jpg"), 400, 300);
//! let report = process::process(&fixture.config, None).unwrap();
//! ```

use image::{ImageEncoder, Rgb, RgbImage, Rgba, RgbaImage};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

use crate::config::{OverlayConfig, ProcessingConfig, WorkersConfig};

// =========================================================================
// Synthetic images
// =========================================================================

/// Encode a gradient JPEG of the given size into memory.
pub fn jpeg_bytes(width: u32, height: u32) -> Vec<u8> {
    let img = RgbImage::from_fn(width, height, |x, y| {
        Rgb([(x % 256) as u8, (y % 256) as u8, 128])
    });
    let mut bytes = Vec::new();
    image::codecs::jpeg::JpegEncoder::new(&mut bytes)
        .write_image(img.as_raw(), width, height, image::ExtendedColorType::Rgb8)
        .unwrap();
    bytes
}

/// Write a gradient JPEG to disk.
pub fn write_jpeg(path: &Path, width: u32, height: u32) {
    std::fs::write(path, jpeg_bytes(width, height)).unwrap();
}

/// Write a JPEG carrying an EXIF orientation tag.
pub fn write_jpeg_with_orientation(path: &Path, width: u32, height: u32, orientation: u16) {
    let bytes = with_exif_orientation(&jpeg_bytes(width, height), orientation);
    std::fs::write(path, bytes).unwrap();
}

/// Write a solid-color opaque PNG.
pub fn write_png(path: &Path, width: u32, height: u32, color: [u8; 3]) {
    let img = RgbaImage::from_pixel(width, height, Rgba([color[0], color[1], color[2], 255]));
    img.save_with_format(path, image::ImageFormat::Png).unwrap();
}

/// Write an overlay PNG: an opaque frame `border` pixels wide around a fully
/// transparent window.
pub fn write_overlay(path: &Path, width: u32, height: u32, border: u32) {
    let img = RgbaImage::from_fn(width, height, |x, y| {
        let inside = x >= border
            && y >= border
            && x < width.saturating_sub(border)
            && y < height.saturating_sub(border);
        if inside {
            Rgba([0, 0, 0, 0])
        } else {
            Rgba([0, 0, 255, 255])
        }
    });
    img.save_with_format(path, image::ImageFormat::Png).unwrap();
}

// =========================================================================
// EXIF
// =========================================================================

/// Build a TIFF-structured EXIF block with a single Orientation entry in IFD0.
pub fn exif_tiff_block(orientation: u16, big_endian: bool) -> Vec<u8> {
    let u16b = |v: u16| {
        if big_endian {
            v.to_be_bytes()
        } else {
            v.to_le_bytes()
        }
    };
    let u32b = |v: u32| {
        if big_endian {
            v.to_be_bytes()
        } else {
            v.to_le_bytes()
        }
    };

    let mut block = Vec::new();
    block.extend_from_slice(if big_endian { b"MM" } else { b"II" });
    block.extend_from_slice(&u16b(42));
    block.extend_from_slice(&u32b(8)); // IFD0 offset
    block.extend_from_slice(&u16b(1)); // entry count
    block.extend_from_slice(&u16b(0x0112)); // Orientation
    block.extend_from_slice(&u16b(3)); // SHORT
    block.extend_from_slice(&u32b(1)); // count
    block.extend_from_slice(&u16b(orientation));
    block.extend_from_slice(&[0, 0]); // value padding
    block.extend_from_slice(&u32b(0)); // no next IFD
    block
}

/// Insert an APP1 EXIF segment carrying `tiff_block` right after the SOI
/// marker of a JPEG.
pub fn with_exif(jpeg: &[u8], tiff_block: &[u8]) -> Vec<u8> {
    let mut payload = b"Exif\0\0".to_vec();
    payload.extend_from_slice(tiff_block);

    let mut out = Vec::with_capacity(jpeg.len() + payload.len() + 4);
    out.extend_from_slice(&jpeg[..2]);
    out.extend_from_slice(&[0xFF, 0xE1]);
    out.extend_from_slice(&((payload.len() + 2) as u16).to_be_bytes());
    out.extend_from_slice(&payload);
    out.extend_from_slice(&jpeg[2..]);
    out
}

/// Insert a little-endian EXIF block with the given orientation into a JPEG.
pub fn with_exif_orientation(jpeg: &[u8], orientation: u16) -> Vec<u8> {
    with_exif(jpeg, &exif_tiff_block(orientation, false))
}

// =========================================================================
// Batch fixture
// =========================================================================

/// A temp directory with `input/`, two overlays, and a config pointing at them.
///
/// Horizontal overlay is 200x150 at 82%, vertical is 150x200 at 79%; both
/// have a 10px opaque border. The output directory is not created.
pub struct BatchFixture {
    pub tmp: TempDir,
    pub config: ProcessingConfig,
}

impl BatchFixture {
    pub fn new() -> Self {
        let tmp = TempDir::new().unwrap();
        let input = tmp.path().join("input");
        std::fs::create_dir_all(&input).unwrap();

        let horizontal = tmp.path().join("overlay-horizontal.png");
        let vertical = tmp.path().join("overlay-vertical.png");
        write_overlay(&horizontal, 200, 150, 10);
        write_overlay(&vertical, 150, 200, 10);

        let config = ProcessingConfig {
            input_dir: input,
            output_dir: tmp.path().join("output"),
            horizontal: OverlayConfig {
                path: horizontal,
                width_percent: 82.0,
            },
            vertical: OverlayConfig {
                path: vertical,
                width_percent: 79.0,
            },
            workers: WorkersConfig {
                max_processes: Some(1),
            },
        };

        Self { tmp, config }
    }

    pub fn input_dir(&self) -> PathBuf {
        self.config.input_dir.clone()
    }

    pub fn output_path(&self, name: &str) -> PathBuf {
        self.config.output_dir.join(name)
    }
}
