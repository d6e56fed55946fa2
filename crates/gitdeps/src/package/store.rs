//! YAML file adapter for [`PackageStore`]

use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use tracing::{debug, instrument};

use crate::fs::FileSystem;

use super::{
    PackageConfig,
    port::{PackageStore, StoreError},
};

/// Default store file name, inside the gitdeps config directory
pub const STORE_FILE_NAME: &str = "packages.yaml";

/// Keeps the [`PackageConfig`] in a single YAML file
#[derive(Debug)]
pub struct YamlPackageStore<F: FileSystem> {
    fs: F,
    path: PathBuf,
}

impl<F: FileSystem> YamlPackageStore<F> {
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

    fn fs_error(&self, source: crate::fs::FileSystemError) -> StoreError {
        StoreError::FileSystem {
            path: self.path.clone(),
            source,
        }
    }
}

impl<F: FileSystem> PackageStore for YamlPackageStore<F> {
    #[instrument(skip(self), fields(path = %self.path.display()))]
    fn load(&self) -> Result<PackageConfig, StoreError> {
        if !self.fs.path_exists(&self.path) {
            debug!("package store does not exist yet, starting empty");
            return Ok(PackageConfig::default());
        }

        let content = self
            .fs
            .read_file(&self.path)
            .map_err(|e| self.fs_error(e))?;

        if content.trim().is_empty() {
            return Ok(PackageConfig::default());
        }

        let config: PackageConfig =
            serde_yaml::from_str(&content).map_err(|e| StoreError::Yaml {
                path: self.path.clone(),
                source: Arc::new(e),
            })?;

        debug!(packages = config.packages().len(), "loaded package store");
        Ok(config)
    }

    #[instrument(skip(self, config), fields(path = %self.path.display()))]
    fn save(&self, config: &PackageConfig) -> Result<(), StoreError> {
        let yaml = serde_yaml::to_string(config).map_err(|e| StoreError::Yaml {
            path: self.path.clone(),
            source: Arc::new(e),
        })?;

        self.fs
            .write_file(&self.path, yaml.as_bytes())
            .map_err(|e| self.fs_error(e))?;

        debug!(packages = config.packages().len(), "saved package store");
        Ok(())
    }
}
