use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, trace};

use crate::fs::FileSystem;

#[derive(Error, Debug)]
pub enum ScannerError {
    #[error("Path does not exist: {0}")]
    PathNotFound(PathBuf),

    #[error("Path is not a directory: {0}")]
    NotADirectory(PathBuf),

    #[error("Permission denied: {0}")]
    PermissionDenied(PathBuf),

    #[error("Failed to read directory: {0}")]
    IoError(#[from] std::io::Error),
}

/// List the regular files of `target`, sorted by name.
///
/// Only the directory itself is read; subdirectories are never entered.
pub fn scan_directory(fs: &dyn FileSystem, target: &Path) -> Result<Vec<String>, ScannerError> {
    debug!(path = ?target, "Scanning directory");

    if !fs.exists(target) {
        return Err(ScannerError::PathNotFound(target.to_path_buf()));
    }

    if !fs.is_dir(target) {
        return Err(ScannerError::NotADirectory(target.to_path_buf()));
    }

    let names = fs.list_files(target).map_err(|e| {
        if e.kind() == std::io::ErrorKind::PermissionDenied {
            ScannerError::PermissionDenied(target.to_path_buf())
        } else {
            ScannerError::IoError(e)
        }
    })?;

    let mut files: Vec<String> = names
        .into_iter()
        .filter(|name| {
            if name.starts_with('.') {
                trace!(name = %name, "Skipping hidden file");
                return false;
            }
            true
        })
        .collect();

    files.sort();

    debug!(count = files.len(), "Scan complete");

    Ok(files)
}
