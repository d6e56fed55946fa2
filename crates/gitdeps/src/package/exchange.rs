//! Export and import of package configuration files
//!
//! An export file is a pretty-printed JSON [`ExportDocument`]. Importing one
//! merges its categories and packages into a [`PackageConfig`]; packages whose
//! identifier is already stored go through a [`ConflictResolver`].

use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use chrono::Local;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::fs::{FileSystem, FileSystemError};

use super::{PackageConfig, PackageDescriptor};

pub const EXPORT_VERSION: &str = "1.0";

/// `exportDate` is local time, e.g. `2025-03-14 09:26:53`
pub const EXPORT_DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// On-disk shape of an export file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportDocument {
    #[serde(default)]
    pub packages: Vec<PackageDescriptor>,

    #[serde(default)]
    pub categories: Vec<String>,

    #[serde(default)]
    pub export_date: String,

    #[serde(default)]
    pub export_version: String,
}

#[derive(Error, Debug, Clone)]
pub enum ExchangeError {
    #[error("None of the selected packages are in the store")]
    NothingSelected,

    #[error("Export file `{}` contains no packages", _0.display())]
    NoPackages(PathBuf),

    #[error("File system error accessing `{}`: {source}", path.display())]
    FileSystem {
        path: PathBuf,
        #[source]
        source: FileSystemError,
    },

    #[error("Invalid export file `{}`: {source}", path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: Arc<serde_json::Error>,
    },
}

/// What to do with an imported package whose identifier already exists
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConflictResolution {
    Update,
    Skip,
}

/// Port asked once per conflicting identifier during an import
#[cfg_attr(any(test, feature = "with_mocks"), mockall::automock)]
pub trait ConflictResolver {
    fn resolve(
        &self,
        existing: &PackageDescriptor,
        incoming: &PackageDescriptor,
    ) -> ConflictResolution;
}

/// A fixed answer, for `--on-conflict update|skip`
impl ConflictResolver for ConflictResolution {
    fn resolve(&self, _: &PackageDescriptor, _: &PackageDescriptor) -> ConflictResolution {
        *self
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportSummary {
    pub imported: usize,
    pub updated: usize,
    pub skipped: usize,
}

fn export_timestamp() -> String {
    Local::now().format(EXPORT_DATE_FORMAT).to_string()
}

impl ExportDocument {
    /// Build a document from the packages named in `selected`, or from every
    /// package when `selected` is empty. Unknown identifiers are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`ExchangeError::NothingSelected`] if no package remains.
    pub fn from_config(config: &PackageConfig, selected: &[String]) -> Result<Self, ExchangeError> {
        let packages: Vec<PackageDescriptor> = if selected.is_empty() {
            config.packages().to_vec()
        } else {
            for identifier in selected.iter().filter(|id| !config.contains(id)) {
                warn!(%identifier, "not exporting unknown package");
            }
            config
                .packages()
                .iter()
                .filter(|p| selected.contains(&p.identifier))
                .cloned()
                .collect()
        };

        if packages.is_empty() {
            return Err(ExchangeError::NothingSelected);
        }

        Ok(Self {
            packages,
            categories: config.categories().iter().map(ToString::to_string).collect(),
            export_date: export_timestamp(),
            export_version: EXPORT_VERSION.to_string(),
        })
    }

    /// # Errors
    ///
    /// Returns [`ExchangeError`] if serialization or the write fails.
    pub fn write<F: FileSystem>(&self, fs: &F, path: &Path) -> Result<(), ExchangeError> {
        let json = serde_json::to_string_pretty(self).map_err(|e| ExchangeError::Json {
            path: path.to_path_buf(),
            source: Arc::new(e),
        })?;

        fs.write_file(path, json.as_bytes())
            .map_err(|source| ExchangeError::FileSystem {
                path: path.to_path_buf(),
                source,
            })?;

        info!(
            path = %path.display(),
            packages = self.packages.len(),
            "exported package configuration"
        );
        Ok(())
    }

    /// Read an export file.
    ///
    /// # Errors
    ///
    /// Returns [`ExchangeError::NoPackages`] for a file without packages, and
    /// [`ExchangeError`] IO/JSON variants when it cannot be read.
    pub fn read<F: FileSystem>(fs: &F, path: &Path) -> Result<Self, ExchangeError> {
        let content = fs
            .read_file(path)
            .map_err(|source| ExchangeError::FileSystem {
                path: path.to_path_buf(),
                source,
            })?;

        let document: Self = serde_json::from_str(&content).map_err(|e| ExchangeError::Json {
            path: path.to_path_buf(),
            source: Arc::new(e),
        })?;

        if document.packages.is_empty() {
            return Err(ExchangeError::NoPackages(path.to_path_buf()));
        }

        debug!(
            packages = document.packages.len(),
            version = %document.export_version,
            "read export file"
        );
        Ok(document)
    }

    /// Merge this document into `config`.
    ///
    /// Categories are appended when missing. New identifiers are added; for
    /// existing ones `resolver` decides between replacing and skipping.
    /// Packages missing an identifier or URL are skipped.
    pub fn merge_into(
        self,
        config: &mut PackageConfig,
        resolver: &dyn ConflictResolver,
    ) -> ImportSummary {
        config.categories.merge(&self.categories);

        let mut summary = ImportSummary::default();
        for incoming in self.packages {
            let identifier = incoming.identifier.clone();

            let replace = match config.get(&identifier) {
                Some(existing) => match resolver.resolve(existing, &incoming) {
                    ConflictResolution::Update => true,
                    ConflictResolution::Skip => {
                        debug!(%identifier, "skipping existing package");
                        summary.skipped += 1;
                        continue;
                    }
                },
                None => false,
            };

            match config.upsert_package(incoming) {
                Ok(_) if replace => summary.updated += 1,
                Ok(_) => summary.imported += 1,
                Err(error) => {
                    warn!(%identifier, %error, "skipping invalid imported package");
                    summary.skipped += 1;
                }
            }
        }

        info!(
            imported = summary.imported,
            updated = summary.updated,
            skipped = summary.skipped,
            "merged imported packages"
        );
        summary
    }
}
