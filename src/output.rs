//! CLI output formatting.
//!
//! # Output Format
//!
//! ## Process
//!
//! ```text
//! Configuration:
//! - Input directory: ./input
//! - Horizontal overlay: ./overlay-horizontal.png
//! - Vertical overlay: ./overlay-vertical.png
//! - Output directory: ./output
//! - Horizontal image width: 82% of canvas
//! - Vertical image width: 79% of canvas
//!
//! Starting to process 3 image files...
//! [1/3] Processed: beach.jpg
//! [2/3] Processed: dunes.png
//! Error processing notes.jpg: cannot read image metadata: ...
//!
//! Processed 2 of 3 images into ./output (1 failed)
//! ```
//!
//! ## Check
//!
//! ```text
//! 001 beach.jpg
//!     horizontal 4000x3000 → 1640x1230 at (180, 135) on 2000x1500
//! 002 notes.jpg
//!     error: cannot read image metadata: ...
//!
//! 1 image ready, 1 with problems
//! ```
//!
//! # Architecture
//!
//! Each output has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format
//! functions are pure: no I/O, no side effects.

use crate::config::ProcessingConfig;
use crate::process::{BatchReport, PlannedImage, ProcessEvent};

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

fn plural(n: usize, word: &str) -> String {
    if n == 1 {
        format!("{n} {word}")
    } else {
        format!("{n} {word}s")
    }
}

fn file_name(path: &std::path::Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

// ============================================================================
// Banner and configuration
// ============================================================================

pub fn format_banner() -> Vec<String> {
    let title = "Overlay Frame";
    vec![title.to_string(), "=".repeat(41)]
}

/// Format the effective configuration block shown before a run.
pub fn format_config(config: &ProcessingConfig) -> Vec<String> {
    vec![
        "Configuration:".to_string(),
        format!("- Input directory: {}", config.input_dir.display()),
        format!("- Horizontal overlay: {}", config.horizontal.path.display()),
        format!("- Vertical overlay: {}", config.vertical.path.display()),
        format!("- Output directory: {}", config.output_dir.display()),
        format!(
            "- Horizontal image width: {}% of canvas",
            config.horizontal.width_percent
        ),
        format!(
            "- Vertical image width: {}% of canvas",
            config.vertical.width_percent
        ),
        String::new(),
    ]
}

pub fn print_config(config: &ProcessingConfig) {
    for line in format_banner().into_iter().chain(format_config(config)) {
        println!("{}", line);
    }
}

// ============================================================================
// Process output
// ============================================================================

/// Format a single process progress event as display lines.
pub fn format_process_event(event: &ProcessEvent) -> Vec<String> {
    match event {
        ProcessEvent::Started { total: 0 } => {
            vec!["No image files found in input directory.".to_string()]
        }
        ProcessEvent::Started { total } => {
            vec![format!("Starting to process {} image files...", total)]
        }
        ProcessEvent::ImageProcessed {
            index, total, name, ..
        } => vec![format!("[{}/{}] Processed: {}", index, total, name)],
        ProcessEvent::ImageFailed { name, error, .. } => {
            vec![format!("Error processing {}: {}", name, error)]
        }
    }
}

/// Format the end-of-run summary.
///
/// Empty batches produce nothing here; the `Started` event already said so.
pub fn format_summary(report: &BatchReport) -> Vec<String> {
    if report.total == 0 {
        return Vec::new();
    }
    let mut lines = vec![String::new()];
    if report.failed.is_empty() {
        lines.push(format!(
            "Processed {} into {}",
            plural(report.processed.len(), "image"),
            report.output_dir.display()
        ));
        lines.push("Image processing completed successfully!".to_string());
    } else {
        lines.push(format!(
            "Processed {} of {} images into {} ({} failed)",
            report.processed.len(),
            report.total,
            report.output_dir.display(),
            report.failed.len()
        ));
        for failure in &report.failed {
            lines.push(format!("    {}: {}", file_name(&failure.source), failure.error));
        }
    }
    lines
}

pub fn print_summary(report: &BatchReport) {
    for line in format_summary(report) {
        println!("{}", line);
    }
}

// ============================================================================
// Check output
// ============================================================================

/// Format a dry-run plan: one entry per photo with its geometry or error.
pub fn format_check_output(planned: &[PlannedImage]) -> Vec<String> {
    if planned.is_empty() {
        return vec!["No image files found in input directory.".to_string()];
    }

    let mut lines = Vec::new();
    let mut problems = 0;
    for (i, image) in planned.iter().enumerate() {
        lines.push(format!("{} {}", format_index(i + 1), file_name(&image.source)));
        match &image.plan {
            Ok(plan) => {
                let p = &plan.placement;
                lines.push(format!(
                    "    {} {}x{} → {}x{} at ({}, {}) on {}x{}",
                    plan.orientation,
                    plan.effective.width,
                    plan.effective.height,
                    p.target_width,
                    p.target_height,
                    p.offset_x,
                    p.offset_y,
                    plan.params.overlay.width,
                    plan.params.overlay.height
                ));
            }
            Err(e) => {
                problems += 1;
                lines.push(format!("    error: {}", e));
            }
        }
    }

    lines.push(String::new());
    lines.push(format!(
        "{} ready, {} with problems",
        plural(planned.len() - problems, "image"),
        problems
    ));
    lines
}

pub fn print_check_output(planned: &[PlannedImage]) {
    for line in format_check_output(planned) {
        println!("{}", line);
    }
}
