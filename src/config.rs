//! Run configuration module.
//!
//! Handles loading, validating, and layering the batch configuration. Values
//! come from three layers, each overriding the one before:
//!
//! ```text
//! stock defaults  →  overlay-frame.toml  →  command-line flags
//! ```
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! input_dir = "./input"      # Photos to frame (not recursive)
//! output_dir = "./output"    # Created if missing
//!
//! [horizontal]
//! path = "./overlay-horizontal.png"
//! width_percent = 82.0       # Share of the canvas width the photo occupies
//!
//! [vertical]
//! path = "./overlay-vertical.png"
//! width_percent = 79.0
//!
//! [workers]
//! max_processes = 4          # Max parallel workers (omit for auto = CPU cores)
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use crate::imaging::Orientation;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("TOML serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Everything a batch run needs, passed explicitly into the pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProcessingConfig {
    /// Directory scanned for photos.
    pub input_dir: PathBuf,
    /// Directory composites are written to, under the input file name.
    pub output_dir: PathBuf,
    /// Overlay used for landscape photos.
    pub horizontal: OverlayConfig,
    /// Overlay used for portrait and square photos.
    pub vertical: OverlayConfig,
    /// Parallel processing settings.
    pub workers: WorkersConfig,
}

impl Default for ProcessingConfig {
    fn default() -> Self {
        Self {
            input_dir: PathBuf::from("./input"),
            output_dir: PathBuf::from("./output"),
            horizontal: OverlayConfig {
                path: PathBuf::from("./overlay-horizontal.png"),
                width_percent: 82.0,
            },
            vertical: OverlayConfig {
                path: PathBuf::from("./overlay-vertical.png"),
                width_percent: 79.0,
            },
            workers: WorkersConfig::default(),
        }
    }
}

impl ProcessingConfig {
    /// Overlay settings for an orientation.
    pub fn overlay(&self, orientation: Orientation) -> &OverlayConfig {
        match orientation {
            Orientation::Horizontal => &self.horizontal,
            Orientation::Vertical => &self.vertical,
        }
    }

    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.input_dir.as_os_str().is_empty() {
            return Err(ConfigError::Validation("input_dir must not be empty".into()));
        }
        if self.output_dir.as_os_str().is_empty() {
            return Err(ConfigError::Validation(
                "output_dir must not be empty".into(),
            ));
        }
        for (name, overlay) in [("horizontal", &self.horizontal), ("vertical", &self.vertical)] {
            if overlay.path.as_os_str().is_empty() {
                return Err(ConfigError::Validation(format!(
                    "{name}.path must not be empty"
                )));
            }
            if !overlay.width_percent.is_finite() || overlay.width_percent <= 0.0 {
                return Err(ConfigError::Validation(format!(
                    "{name}.width_percent must be a positive number, got {}",
                    overlay.width_percent
                )));
            }
        }
        if self.workers.max_processes == Some(0) {
            return Err(ConfigError::Validation(
                "workers.max_processes must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

/// One overlay asset and how wide the photo beneath it should be.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OverlayConfig {
    pub path: PathBuf,
    /// Percentage of the overlay width; values above 100 are allowed.
    pub width_percent: f64,
}

/// Parallel processing settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WorkersConfig {
    /// Maximum number of parallel image processing workers.
    /// When absent, defaults to the number of CPU cores.
    /// Values larger than the core count are clamped down.
    pub max_processes: Option<usize>,
}

/// Resolve the effective thread count from config.
///
/// - `None` → use all available cores
/// - `Some(n)` → use `min(n, cores)` (user can constrain down, not up)
pub fn effective_threads(config: &WorkersConfig) -> usize {
    let cores = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    config.max_processes.map(|n| n.min(cores)).unwrap_or(cores)
}

/// Values supplied on the command line; `None` leaves the lower layer alone.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub input_dir: Option<PathBuf>,
    pub output_dir: Option<PathBuf>,
    pub horizontal_overlay: Option<PathBuf>,
    pub vertical_overlay: Option<PathBuf>,
    pub horizontal_width_percent: Option<f64>,
    pub vertical_width_percent: Option<f64>,
    pub max_processes: Option<usize>,
}

impl ConfigOverrides {
    /// Render the overrides as a sparse TOML table for [`merge_toml`].
    pub fn to_toml(&self) -> toml::Value {
        let path = |p: &Path| toml::Value::String(p.to_string_lossy().into_owned());

        let mut root = toml::Table::new();
        if let Some(dir) = &self.input_dir {
            root.insert("input_dir".into(), path(dir.as_path()));
        }
        if let Some(dir) = &self.output_dir {
            root.insert("output_dir".into(), path(dir.as_path()));
        }

        for (key, overlay, percent) in [
            (
                "horizontal",
                &self.horizontal_overlay,
                self.horizontal_width_percent,
            ),
            ("vertical", &self.vertical_overlay, self.vertical_width_percent),
        ] {
            let mut table = toml::Table::new();
            if let Some(p) = overlay {
                table.insert("path".into(), path(p.as_path()));
            }
            if let Some(pct) = percent {
                table.insert("width_percent".into(), toml::Value::Float(pct));
            }
            if !table.is_empty() {
                root.insert(key.into(), toml::Value::Table(table));
            }
        }

        if let Some(n) = self.max_processes {
            let mut workers = toml::Table::new();
            workers.insert("max_processes".into(), toml::Value::Integer(n as i64));
            root.insert("workers".into(), toml::Value::Table(workers));
        }

        toml::Value::Table(root)
    }
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
///
/// This is the base layer every other layer is merged onto.
pub fn stock_defaults_value() -> Result<toml::Value, ConfigError> {
    Ok(toml::Value::try_from(ProcessingConfig::default())?)
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Load a config file as a raw TOML value.
///
/// Returns `Ok(None)` if the file does not exist.
/// Returns `Err` if the file exists but contains invalid TOML.
pub fn load_raw_config(path: &Path) -> Result<Option<toml::Value>, ConfigError> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge optional layers onto a base value, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    layers: impl IntoIterator<Item = Option<toml::Value>>,
) -> Result<ProcessingConfig, ConfigError> {
    let merged = layers.into_iter().flatten().fold(base, merge_toml);
    let config: ProcessingConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load the run configuration: stock defaults, then `config_file` (if it
/// exists), then command-line overrides.
pub fn load_config(
    config_file: &Path,
    overrides: &ConfigOverrides,
) -> Result<ProcessingConfig, ConfigError> {
    let file_layer = load_raw_config(config_file)?;
    if file_layer.is_none() {
        tracing::debug!(path = %config_file.display(), "No config file, using defaults");
    }
    resolve_config(
        stock_defaults_value()?,
        [file_layer, Some(overrides.to_toml())],
    )
}

/// Returns a fully-commented stock config file with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# overlay-frame configuration
# ===========================
# All options are optional. Values shown are the stock defaults.
# Command-line flags override anything set here.

# Directory scanned for photos. Only .jpg, .jpeg, .png, .bmp, .tiff and
# .webp files (any letter case) are processed; everything else is ignored.
input_dir = "./input"

# Where composites are written, one per photo, under the same file name.
# Output is always PNG-encoded regardless of the name's extension.
# Created if it does not exist.
output_dir = "./output"

# ---------------------------------------------------------------------------
# Overlays
# ---------------------------------------------------------------------------
# Each overlay is a PNG with transparency. Its pixel size becomes the size of
# every output composited with it. The photo is scaled so its width is
# width_percent of the overlay width, keeps its aspect ratio, and is centered.
# Values above 100 are allowed; whatever spills past the canvas is clipped.

# Landscape photos (wider than tall, after EXIF rotation).
[horizontal]
path = "./overlay-horizontal.png"
width_percent = 82.0

# Portrait and square photos.
[vertical]
path = "./overlay-vertical.png"
width_percent = 79.0

# ---------------------------------------------------------------------------
# Workers
# ---------------------------------------------------------------------------
[workers]
# Maximum parallel workers. Omit to use every CPU core; larger values are
# clamped to the core count.
# max_processes = 4
"##
}
