//! Package store port and error types
//!
//! The `PackageStore` trait abstracts where the declarative package list
//! lives. The reconciler and the CLI only ever see this port; the YAML file
//! adapter lives in [`super::store`].

use std::{path::PathBuf, sync::Arc};

use thiserror::Error;

use crate::fs::FileSystemError;

use super::PackageConfig;

/// Port for loading and saving the package store (Hexagonal Architecture)
///
/// `load` returns the whole [`PackageConfig`]; `save` overwrites it. A store
/// that has never been saved loads as [`PackageConfig::default`].
#[cfg_attr(any(test, feature = "with_mocks"), mockall::automock)]
pub trait PackageStore: Send + Sync {
    /// Load the full package configuration
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the backing file exists but cannot be read or
    /// parsed.
    fn load(&self) -> Result<PackageConfig, StoreError>;

    /// Persist the full package configuration, replacing what was stored
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if serialization or the write fails.
    fn save(&self, config: &PackageConfig) -> Result<(), StoreError>;
}

/// Errors that can occur while loading or saving the package store
#[derive(Error, Debug, Clone)]
pub enum StoreError {
    /// Reading or writing the store file failed
    #[error("File system error accessing package store `{}`: {source}", path.display())]
    FileSystem {
        path: PathBuf,
        #[source]
        source: FileSystemError,
    },

    /// The store file is not valid YAML or has the wrong shape
    #[error("YAML error in package store `{}`: {source}", path.display())]
    Yaml {
        path: PathBuf,
        #[source]
        source: Arc<serde_yaml::Error>,
    },

    /// Raised by non-file stores (and test doubles)
    #[error("Package store unavailable: {0}")]
    Unavailable(String),
}
