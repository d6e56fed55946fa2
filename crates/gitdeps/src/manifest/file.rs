//! Whole-file access to a manifest, for viewing and hand editing

use std::path::{Path, PathBuf};

use serde_json::Value;
use thiserror::Error;
use tracing::{debug, info, instrument};

use super::{DEPENDENCIES_KEY, ManifestReadError, ManifestScanner};
use crate::fs::{FileSystem, FileSystemError};

#[derive(Error, Debug, Clone)]
pub enum ManifestWriteError {
    #[error("Edited manifest is not valid JSON: {0}")]
    InvalidJson(String),

    #[error("Edited manifest is not a JSON object")]
    NotAnObject,

    #[error("Edited manifest has no \"dependencies\" object")]
    NoDependencies,

    #[error("File system error writing manifest `{}`: {source}", path.display())]
    FileSystem {
        path: PathBuf,
        #[source]
        source: FileSystemError,
    },
}

/// A manifest file read and replaced as raw text
#[derive(Debug, Clone)]
pub struct ManifestFile<F> {
    fs: F,
    path: PathBuf,
}

impl<F: FileSystem> ManifestFile<F> {
    pub fn new(fs: F, path: impl Into<PathBuf>) -> Self {
        Self {
            fs,
            path: path.into(),
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    #[must_use]
    pub fn exists(&self) -> bool {
        self.fs.path_exists(&self.path)
    }

    /// Current contents, unmodified
    ///
    /// # Errors
    ///
    /// Returns [`ManifestReadError::FileSystem`] if the file cannot be read.
    pub fn read(&self) -> Result<String, ManifestReadError> {
        self.fs
            .read_file(&self.path)
            .map_err(|source| ManifestReadError::FileSystem {
                path: self.path.clone(),
                source,
            })
    }

    /// Check `text` and write it over the manifest. Returns the number of git
    /// packages in the new text.
    ///
    /// # Errors
    ///
    /// Returns [`ManifestWriteError`] if `text` is rejected by
    /// [`check_manifest`], in which case the file is not touched, or if the
    /// write fails.
    #[instrument(skip_all, fields(path = %self.path.display()))]
    pub fn replace(&self, text: &str) -> Result<usize, ManifestWriteError> {
        let git_packages = check_manifest(text)?;

        self.fs
            .write_file(&self.path, text.as_bytes())
            .map_err(|source| ManifestWriteError::FileSystem {
                path: self.path.clone(),
                source,
            })?;

        info!(git_packages, bytes = text.len(), "manifest replaced");
        Ok(git_packages)
    }
}

/// Accept `text` only if it is a JSON object with a `"dependencies"` object.
/// Returns the number of git packages it declares.
///
/// # Errors
///
/// Returns the first [`ManifestWriteError`] that applies.
pub fn check_manifest(text: &str) -> Result<usize, ManifestWriteError> {
    let document: Value =
        serde_json::from_str(text).map_err(|e| ManifestWriteError::InvalidJson(e.to_string()))?;

    let root = document.as_object().ok_or(ManifestWriteError::NotAnObject)?;
    if !root.get(DEPENDENCIES_KEY).is_some_and(Value::is_object) {
        return Err(ManifestWriteError::NoDependencies);
    }

    let git_packages = ManifestScanner::scan_or_empty(text).count();
    debug!(git_packages, "manifest text accepted");
    Ok(git_packages)
}
