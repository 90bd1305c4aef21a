//! Batch driver.
//!
//! Runs every photo in the input directory through the imaging pipeline and
//! writes one composite per photo to the output directory.
//!
//! ## Run Phases
//!
//! ```text
//! 1. Setup     validate config, input dir, overlay files,  (fatal on failure)
//!              output dir distinct from input
//! 2. Overlays  resolve both overlays once, check the scaled width is non-empty
//! 3. Output    create the output directory if it is missing
//! 4. Scan      list supported files, sorted by name
//! 5. Images    compose + write each photo in parallel       (per-image failures)
//! ```
//!
//! Anything that goes wrong in phases 1–4 is a [`SetupError`] and nothing is
//! written. In phase 5 each photo succeeds or fails on its own: failures are
//! logged, reported, and the batch carries on.
//!
//! ## Output Naming
//!
//! ```text
//! input/IMG_0042.JPG   →  output/IMG_0042.JPG    (PNG bytes, name unchanged)
//! input/scan.tiff      →  output/scan.tiff
//! ```
//!
//! ## Parallel Processing
//!
//! Photos are processed on the global [rayon](https://docs.rs/rayon) pool.
//! Results are collected in input order, so the [`BatchReport`] is
//! deterministic even though progress events arrive as photos finish.

use crate::config::{ConfigError, ProcessingConfig};
use crate::imaging::calculations::target_width;
use crate::imaging::{
    CompositePlan, EffectiveDimensions, ImageBackend, ImageError, Orientation, OverlayResolver,
    Placement, RustBackend, compose, plan_composite,
};
use crate::scan::{self, ScanError};
use rayon::prelude::*;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::mpsc::Sender;
use thiserror::Error;

const ORIENTATIONS: [Orientation; 2] = [Orientation::Horizontal, Orientation::Vertical];

/// Problems that stop a run before any photo is touched.
#[derive(Error, Debug)]
pub enum SetupError {
    #[error("Input directory not found: {}", .0.display())]
    InputDirMissing(PathBuf),
    #[error("{orientation} overlay not found: {}", path.display())]
    OverlayMissing {
        orientation: Orientation,
        path: PathBuf,
    },
    #[error("Output directory {} is the input directory; composites would overwrite the photos", .0.display())]
    OutputIsInput(PathBuf),
    #[error("Cannot create output directory {}: {source}", path.display())]
    OutputDir {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error(transparent)]
    Scan(#[from] ScanError),
    #[error(
        "{orientation} overlay is {canvas_width}px wide; {width_percent}% of that rounds to an empty photo"
    )]
    EmptyTarget {
        orientation: Orientation,
        canvas_width: u32,
        width_percent: f64,
    },
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
}

/// Progress notifications sent while a batch runs.
#[derive(Debug, Clone)]
pub enum ProcessEvent {
    /// The input has been scanned; `total` photos will be processed.
    Started { total: usize },
    /// A photo was composited and written. `index` is its 1-based position in
    /// the sorted input.
    ImageProcessed {
        index: usize,
        total: usize,
        name: String,
        orientation: Orientation,
    },
    /// A photo was skipped.
    ImageFailed {
        index: usize,
        total: usize,
        name: String,
        error: String,
    },
}

/// A successfully composited photo.
#[derive(Debug, Clone, Serialize)]
pub struct ProcessedImage {
    pub source: PathBuf,
    pub output: PathBuf,
    pub orientation: Orientation,
    pub effective: EffectiveDimensions,
    pub placement: Placement,
    pub canvas_width: u32,
    pub canvas_height: u32,
}

/// A photo that could not be composited, with the reason.
#[derive(Debug, Clone, Serialize)]
pub struct FailedImage {
    pub source: PathBuf,
    pub error: String,
}

/// Outcome of a batch run, in input order.
#[derive(Debug, Clone, Serialize)]
pub struct BatchReport {
    pub input_dir: PathBuf,
    pub output_dir: PathBuf,
    pub total: usize,
    pub processed: Vec<ProcessedImage>,
    pub failed: Vec<FailedImage>,
}

/// A photo's plan as computed by a dry run.
#[derive(Debug)]
pub struct PlannedImage {
    pub source: PathBuf,
    pub plan: Result<CompositePlan, ImageError>,
}

/// Process the configured batch with the production backend.
pub fn process(
    config: &ProcessingConfig,
    events: Option<Sender<ProcessEvent>>,
) -> Result<BatchReport, SetupError> {
    process_with_backend(&RustBackend::new(), config, events)
}

/// Process the configured batch using a specific backend (allows testing with mock).
pub fn process_with_backend(
    backend: &impl ImageBackend,
    config: &ProcessingConfig,
    events: Option<Sender<ProcessEvent>>,
) -> Result<BatchReport, SetupError> {
    validate_setup(config)?;
    let resolver = OverlayResolver::new(config);
    preload_overlays(backend, &resolver)?;
    ensure_output_dir(&config.output_dir)?;

    let files = scan::scan_input(&config.input_dir)?;
    let total = files.len();
    send(&events, ProcessEvent::Started { total });

    let results: Vec<(PathBuf, Result<ProcessedImage, ImageError>)> = files
        .par_iter()
        .enumerate()
        .map(|(i, source)| {
            let result = process_image(backend, &resolver, &config.output_dir, source);
            let name = display_name(source);
            let event = match &result {
                Ok(image) => ProcessEvent::ImageProcessed {
                    index: i + 1,
                    total,
                    name,
                    orientation: image.orientation,
                },
                Err(e) => {
                    tracing::warn!(source = %source.display(), error = %e, "Skipping image");
                    ProcessEvent::ImageFailed {
                        index: i + 1,
                        total,
                        name,
                        error: e.to_string(),
                    }
                }
            };
            send(&events, event);
            (source.clone(), result)
        })
        .collect();

    let mut report = BatchReport {
        input_dir: config.input_dir.clone(),
        output_dir: config.output_dir.clone(),
        total,
        processed: Vec::new(),
        failed: Vec::new(),
    };
    for (source, result) in results {
        match result {
            Ok(image) => report.processed.push(image),
            Err(e) => report.failed.push(FailedImage {
                source,
                error: e.to_string(),
            }),
        }
    }
    Ok(report)
}

/// Dry run with the production backend: validate setup and plan every photo.
pub fn check(config: &ProcessingConfig) -> Result<Vec<PlannedImage>, SetupError> {
    check_with_backend(&RustBackend::new(), config)
}

/// Dry run: everything [`process_with_backend`] decides, nothing it writes.
///
/// The output directory is neither created nor required to exist.
pub fn check_with_backend(
    backend: &impl ImageBackend,
    config: &ProcessingConfig,
) -> Result<Vec<PlannedImage>, SetupError> {
    validate_setup(config)?;
    let resolver = OverlayResolver::new(config);
    preload_overlays(backend, &resolver)?;

    let files = scan::scan_input(&config.input_dir)?;
    Ok(files
        .into_iter()
        .map(|source| {
            let plan = plan_composite(backend, &resolver, &source);
            PlannedImage { source, plan }
        })
        .collect())
}

/// Check the config, that the input directory and both overlay files exist,
/// and that outputs will not land on top of their sources.
pub fn validate_setup(config: &ProcessingConfig) -> Result<(), SetupError> {
    config.validate()?;
    if !config.input_dir.is_dir() {
        return Err(SetupError::InputDirMissing(config.input_dir.clone()));
    }
    if same_directory(&config.input_dir, &config.output_dir) {
        return Err(SetupError::OutputIsInput(config.output_dir.clone()));
    }
    for orientation in ORIENTATIONS {
        let path = &config.overlay(orientation).path;
        if !path.is_file() {
            return Err(SetupError::OverlayMissing {
                orientation,
                path: path.clone(),
            });
        }
    }
    Ok(())
}

/// Resolve both overlays up front.
///
/// A width percentage that scales the photo to nothing is a configuration
/// mistake and aborts the run. An overlay that exists but cannot be decoded
/// only fails the photos that need it.
fn preload_overlays(
    backend: &impl ImageBackend,
    resolver: &OverlayResolver<'_>,
) -> Result<(), SetupError> {
    for orientation in ORIENTATIONS {
        match resolver.resolve(backend, orientation) {
            Ok(asset) => {
                if target_width(asset.width, asset.width_percent) < 1 {
                    return Err(SetupError::EmptyTarget {
                        orientation,
                        canvas_width: asset.width,
                        width_percent: asset.width_percent,
                    });
                }
            }
            Err(e) => {
                tracing::warn!(%orientation, error = %e, "Overlay unreadable; matching images will fail");
            }
        }
    }
    Ok(())
}

/// Whether two paths name the same existing directory. A missing output
/// directory cannot be the input.
fn same_directory(a: &Path, b: &Path) -> bool {
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

fn ensure_output_dir(output_dir: &Path) -> Result<(), SetupError> {
    if output_dir.is_dir() {
        return Ok(());
    }
    fs::create_dir_all(output_dir).map_err(|source| SetupError::OutputDir {
        path: output_dir.to_path_buf(),
        source,
    })?;
    tracing::info!(path = %output_dir.display(), "Created output directory");
    Ok(())
}

fn process_image(
    backend: &impl ImageBackend,
    resolver: &OverlayResolver<'_>,
    output_dir: &Path,
    source: &Path,
) -> Result<ProcessedImage, ImageError> {
    let composed = compose(backend, resolver, source)?;
    let output = output_dir.join(source.file_name().unwrap_or_default());
    fs::write(&output, &composed.png).map_err(|e| ImageError::Write {
        path: output.clone(),
        source: e,
    })?;

    let plan = composed.plan;
    Ok(ProcessedImage {
        source: source.to_path_buf(),
        output,
        orientation: plan.orientation,
        effective: plan.effective,
        placement: plan.placement,
        canvas_width: plan.params.overlay.width,
        canvas_height: plan.params.overlay.height,
    })
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn send(events: &Option<Sender<ProcessEvent>>, event: ProcessEvent) {
    if let Some(tx) = events {
        // Receiver gone means nobody is listening; the batch continues regardless.
        let _ = tx.send(event);
    }
}
