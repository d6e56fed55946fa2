//! Packages that live in a folder on disk

use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use serde::Deserialize;
use thiserror::Error;

use crate::fs::{FileSystem, FileSystemError};

use super::{FALLBACK_CATEGORY, PackageDescriptor};
use crate::specifier::DEFAULT_REVISION;

pub const PACKAGE_MANIFEST: &str = "package.json";

#[derive(Error, Debug, Clone)]
pub enum LocalPackageError {
    #[error("No {PACKAGE_MANIFEST} found in `{}`", _0.display())]
    ManifestNotFound(PathBuf),

    #[error("File system error reading `{}`: {source}", path.display())]
    FileSystem {
        path: PathBuf,
        #[source]
        source: FileSystemError,
    },

    #[error("Invalid {PACKAGE_MANIFEST} in `{}`: {source}", path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: Arc<serde_json::Error>,
    },

    #[error("{PACKAGE_MANIFEST} in `{}` has no `name`", _0.display())]
    MissingName(PathBuf),
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LocalManifest {
    #[serde(default)]
    name: String,
    display_name: Option<String>,
    #[serde(default)]
    version: String,
    #[serde(default)]
    description: String,
}

/// The `file:` URL a backend is given for a package folder
#[must_use]
pub fn local_url(dir: &Path) -> String {
    format!("file:{}", dir.to_string_lossy().replace('\\', "/"))
}

/// Read `<dir>/package.json` and describe the folder as a package.
///
/// The display name falls back to the package name. The descriptor is not
/// installed and sits in the fallback category.
///
/// # Errors
///
/// Returns [`LocalPackageError`] if the manifest is missing, unreadable, not
/// JSON, or has no `name`.
pub fn read_local_package<F: FileSystem>(
    fs: &F,
    dir: &Path,
) -> Result<PackageDescriptor, LocalPackageError> {
    let manifest_path = dir.join(PACKAGE_MANIFEST);
    if !fs.path_exists(&manifest_path) {
        return Err(LocalPackageError::ManifestNotFound(dir.to_path_buf()));
    }

    let content = fs
        .read_file(&manifest_path)
        .map_err(|source| LocalPackageError::FileSystem {
            path: manifest_path.clone(),
            source,
        })?;

    let manifest: LocalManifest =
        serde_json::from_str(&content).map_err(|e| LocalPackageError::Json {
            path: manifest_path,
            source: Arc::new(e),
        })?;

    if manifest.name.trim().is_empty() {
        return Err(LocalPackageError::MissingName(dir.to_path_buf()));
    }

    tracing::debug!(name = %manifest.name, dir = %dir.display(), "read local package");

    Ok(PackageDescriptor {
        display_name: manifest
            .display_name
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| manifest.name.clone()),
        identifier: manifest.name,
        description: manifest.description,
        repository_url: local_url(dir),
        subdirectory_path: String::new(),
        revision: DEFAULT_REVISION.to_string(),
        installed: false,
        version: manifest.version,
        category: FALLBACK_CATEGORY.to_string(),
    })
}
