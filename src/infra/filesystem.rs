//! Filesystem operations
//!
//! Directory handling for the source root and the staging area.

use std::path::{Path, PathBuf};

use crate::error::FilesystemError;

/// Create a directory and all parent directories
pub fn create_dir_all(path: &Path) -> Result<(), FilesystemError> {
    std::fs::create_dir_all(path).map_err(|e| FilesystemError::CreateDir {
        path: path.to_path_buf(),
        error: e.to_string(),
    })
}

/// Create the staging directory if needed and return its canonical path
pub fn ensure_stage_dir(path: &Path) -> Result<PathBuf, FilesystemError> {
    if !path.is_dir() {
        tracing::info!("Creating staging directory {}", path.display());
        create_dir_all(path)?;
    }
    canonicalize(path)
}

/// Canonical absolute form of an existing path
pub fn canonicalize(path: &Path) -> Result<PathBuf, FilesystemError> {
    path.canonicalize()
        .map_err(|e| FilesystemError::Canonicalize {
            path: path.to_path_buf(),
            error: e.to_string(),
        })
}

/// Resolve `path` against `base` when it is relative
pub fn absolute(path: &Path, base: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}
