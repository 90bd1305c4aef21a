//! Input directory scanning.
//!
//! Lists the photos a batch run will process. Only the top level of the input
//! directory is read; subdirectories are not descended into.
//!
//! ## Selection Rules
//!
//! - Regular files only (directories and other entries are skipped)
//! - Extension must be one of [`SUPPORTED_EXTENSIONS`], compared case-insensitively
//! - Everything else (`notes.txt`, `.DS_Store`, extensionless files) is ignored
//!
//! Results are sorted by file name so runs are reproducible regardless of the
//! order the filesystem returns entries in.

use crate::imaging::SUPPORTED_EXTENSIONS;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("Cannot read input directory {path}: {source}")]
    ReadDir {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Whether a path carries one of the supported image extensions.
pub fn has_supported_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| {
            let lower = e.to_ascii_lowercase();
            SUPPORTED_EXTENSIONS.contains(&lower.as_str())
        })
        .unwrap_or(false)
}

/// Collect the processable photos in `input_dir`, sorted by file name.
pub fn scan_input(input_dir: &Path) -> Result<Vec<PathBuf>, ScanError> {
    let read_dir_error = |source| ScanError::ReadDir {
        path: input_dir.to_path_buf(),
        source,
    };

    let mut files = Vec::new();
    for entry in fs::read_dir(input_dir).map_err(read_dir_error)? {
        let path = entry.map_err(read_dir_error)?.path();
        if path.is_file() && has_supported_extension(&path) {
            files.push(path);
        }
    }
    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(files)
}
