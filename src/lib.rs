//! # Overlay Frame
//!
//! Batch-composites photographs onto a decorative frame. Every photo in an
//! input directory is scaled, centered under a transparent-windowed overlay
//! PNG, and written to an output directory as a PNG of exactly the overlay's
//! size.
//!
//! # Per-Image Pipeline
//!
//! Each photo goes through four steps, each depending only on the one before:
//!
//! ```text
//! 1. Classify   metadata  →  effective size + orientation   (EXIF 5–8 swap w/h)
//! 2. Resolve    orientation  →  overlay asset               (memoized per run)
//! 3. Place      effective size + overlay  →  placement      (scale + center)
//! 4. Composite  photo + placement + overlay  →  PNG bytes   (photo under overlay)
//! ```
//!
//! Steps 1 and 3 are pure functions in [`imaging::calculations`], tested
//! without touching a file. Steps 2 and 4 go through the
//! [`imaging::ImageBackend`] trait so the batch driver can be exercised with a
//! recording mock.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`imaging`] | Classification, placement math, and the `image`-crate backend (decode, EXIF auto-rotate, composite) |
//! | [`scan`] | Lists supported photos in the input directory |
//! | [`process`] | Batch driver: setup validation, parallel processing, per-image error isolation, report |
//! | [`config`] | `overlay-frame.toml` loading, CLI overrides, validation |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## Squares Are Vertical
//!
//! A photo is horizontal only when it is strictly wider than tall. Square
//! photos get the vertical overlay.
//!
//! ## Round Half Away From Zero
//!
//! Scaled sizes and offsets are rounded with [`f64::round`]. An offset can
//! come out negative when the photo is scaled past the canvas; the overflow
//! is clipped when layering, never corrected in the math.
//!
//! ## One Bad Photo Never Stops a Batch
//!
//! Setup problems (missing input directory, missing overlay file, unwritable
//! output directory, a width percentage that scales photos to nothing) abort
//! before anything is written. After that, each photo succeeds or fails on
//! its own and failures are reported alongside the successes.

pub mod config;
pub mod imaging;
pub mod output;
pub mod process;
pub mod scan;

#[cfg(test)]
pub(crate) mod test_helpers;
