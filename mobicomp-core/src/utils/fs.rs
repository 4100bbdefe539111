//! Filesystem helpers that report failures as [`CoreError::Filesystem`].

use crate::error::CoreError;
use std::fs;
use std::path::Path;

/// Ensures that a directory exists at `path`, creating it and any missing
/// parents. Fails if `path` exists and is not a directory.
pub fn ensure_directory_exists(path: &Path) -> Result<(), CoreError> {
    if path.exists() {
        if !path.is_dir() {
            Err(CoreError::Filesystem {
                message: "Path exists but is not a directory".to_string(),
                path: path.to_path_buf(),
                source: std::io::Error::new(
                    std::io::ErrorKind::AlreadyExists,
                    "Path exists but is not a directory",
                ),
            })
        } else {
            Ok(())
        }
    } else {
        fs::create_dir_all(path).map_err(|e| CoreError::Filesystem {
            message: "Failed to create directory".to_string(),
            path: path.to_path_buf(),
            source: e,
        })
    }
}

/// Reads a whole file into a string.
pub fn read_file_to_string(path: &Path) -> Result<String, CoreError> {
    fs::read_to_string(path).map_err(|e| CoreError::Filesystem {
        message: "Failed to read file".to_string(),
        path: path.to_path_buf(),
        source: e,
    })
}
