//! Backend that installs packages by editing a JSON manifest
//!
//! The manifest is the same `{"dependencies": {...}}` document the scanner
//! reads. Each operation runs on the blocking pool of the given tokio runtime;
//! edits are serialized so concurrent add and remove calls cannot lose each
//! other's writes.

use std::{
    collections::BTreeSet,
    path::{Path, PathBuf},
    sync::{Arc, Mutex, PoisonError},
};

use serde_json::{Map, Value};
use thiserror::Error;
use tokio::runtime::Handle;
use tracing::{debug, info, warn};

use super::{AddRequest, Completer, OperationHandle, PackageBackend};
use crate::{
    fs::{FileSystem, FileSystemError},
    specifier::Specifier,
};

const DEPENDENCIES_KEY: &str = "dependencies";

#[derive(Error, Debug)]
enum ManifestEditError {
    #[error("cannot access manifest `{}`: {source}", path.display())]
    FileSystem {
        path: PathBuf,
        source: FileSystemError,
    },

    #[error("manifest `{}` is not valid JSON: {source}", path.display())]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("manifest `{}` has no \"dependencies\" object", path.display())]
    NoDependencies { path: PathBuf },

    #[error("package `{0}` is not installed")]
    NotInstalled(String),
}

/// A [`PackageBackend`] over a manifest file
#[derive(Debug, Clone)]
pub struct ManifestBackend<F> {
    fs: F,
    path: PathBuf,
    runtime: Handle,
    lock: Arc<Mutex<()>>,
}

impl<F> ManifestBackend<F>
where
    F: FileSystem + Clone + 'static,
{
    pub fn new(fs: F, path: impl Into<PathBuf>, runtime: Handle) -> Self {
        Self {
            fs,
            path: path.into(),
            runtime,
            lock: Arc::new(Mutex::new(())),
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Run `work` on the blocking pool, holding the edit lock
    fn spawn<T, W>(&self, work: W) -> OperationHandle<T>
    where
        T: Send + 'static,
        W: FnOnce(&F, &Path) -> Result<T, ManifestEditError> + Send + 'static,
    {
        let (completer, handle): (Completer<T>, _) = OperationHandle::channel();
        let fs = self.fs.clone();
        let path = self.path.clone();
        let lock = Arc::clone(&self.lock);

        self.runtime.spawn_blocking(move || {
            let _guard = lock.lock().unwrap_or_else(PoisonError::into_inner);
            match work(&fs, &path) {
                Ok(value) => completer.succeed(value),
                Err(e) => {
                    warn!(error = %e, "manifest operation failed");
                    completer.fail(e.to_string());
                }
            }
        });

        handle
    }
}

impl<F> PackageBackend for ManifestBackend<F>
where
    F: FileSystem + Clone + 'static,
{
    fn add(&self, request: &AddRequest) -> OperationHandle<String> {
        let identifier = request.identifier.clone();
        let entry = manifest_entry(request);
        debug!(%identifier, %entry, "adding manifest dependency");

        self.spawn(move |fs, path| {
            let mut document = read_document(fs, path, true)?;
            dependencies_mut(&mut document, path)?
                .insert(identifier.clone(), Value::String(entry));
            write_document(fs, path, &document)?;

            info!(%identifier, "added manifest dependency");
            Ok(identifier)
        })
    }

    fn remove(&self, identifier: &str) -> OperationHandle<()> {
        let identifier = identifier.to_string();
        debug!(%identifier, "removing manifest dependency");

        self.spawn(move |fs, path| {
            let mut document = read_document(fs, path, false)?;
            dependencies_mut(&mut document, path)?
                .shift_remove(&identifier)
                .ok_or_else(|| ManifestEditError::NotInstalled(identifier.clone()))?;
            write_document(fs, path, &document)?;

            info!(%identifier, "removed manifest dependency");
            Ok(())
        })
    }

    fn list(&self) -> OperationHandle<BTreeSet<String>> {
        self.spawn(|fs, path| {
            let mut document = read_document(fs, path, false)?;
            let installed: BTreeSet<String> =
                dependencies_mut(&mut document, path)?.keys().cloned().collect();

            debug!(count = installed.len(), "listed manifest dependencies");
            Ok(installed)
        })
    }
}

/// The value written for a package: the full specifier with its revision,
/// or the bare URL for local packages.
fn manifest_entry(request: &AddRequest) -> String {
    if request.specifier.starts_with("file:") {
        return request.specifier.clone();
    }

    let mut specifier = Specifier::decode(&request.specifier);
    if !request.revision.is_empty() {
        specifier.revision.clone_from(&request.revision);
    }
    specifier.with_revision()
}

/// Read and parse the manifest. A missing file is an empty manifest when
/// `create` is set.
fn read_document<F: FileSystem>(
    fs: &F,
    path: &Path,
    create: bool,
) -> Result<Value, ManifestEditError> {
    if create && !fs.path_exists(path) {
        return Ok(serde_json::json!({ DEPENDENCIES_KEY: {} }));
    }

    let text = fs
        .read_file(path)
        .map_err(|source| ManifestEditError::FileSystem {
            path: path.to_path_buf(),
            source,
        })?;

    serde_json::from_str(&text).map_err(|source| ManifestEditError::Json {
        path: path.to_path_buf(),
        source,
    })
}

fn dependencies_mut<'a>(
    document: &'a mut Value,
    path: &Path,
) -> Result<&'a mut Map<String, Value>, ManifestEditError> {
    let no_dependencies = || ManifestEditError::NoDependencies {
        path: path.to_path_buf(),
    };

    document
        .as_object_mut()
        .ok_or_else(no_dependencies)?
        .entry(DEPENDENCIES_KEY)
        .or_insert_with(|| Value::Object(Map::new()))
        .as_object_mut()
        .ok_or_else(no_dependencies)
}

fn write_document<F: FileSystem>(
    fs: &F,
    path: &Path,
    document: &Value,
) -> Result<(), ManifestEditError> {
    let mut text = serde_json::to_string_pretty(document).map_err(|source| {
        ManifestEditError::Json {
            path: path.to_path_buf(),
            source,
        }
    })?;
    text.push('\n');

    fs.write_file(path, text.as_bytes())
        .map_err(|source| ManifestEditError::FileSystem {
            path: path.to_path_buf(),
            source,
        })
}
