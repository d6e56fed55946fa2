//! Package-installation backend port
//!
//! A backend installs, removes and lists packages on the reconciler's
//! behalf. Every call returns at once with an [`OperationHandle`]; the work
//! finishes later and the reconciler polls the handle on its next tick.

pub mod handle;
pub mod manifest;

use std::collections::BTreeSet;

pub use self::{
    handle::{CompletionStatus, Completer, OperationHandle, OperationId, OperationKind},
    manifest::ManifestBackend,
};
use crate::package::PackageDescriptor;

/// What the backend needs to install one package
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddRequest {
    pub identifier: String,

    /// `<url>[?path=<subdirectory>]`, see [`crate::specifier::encode`]
    pub specifier: String,

    pub revision: String,
}

impl AddRequest {
    #[must_use]
    pub fn from_descriptor(descriptor: &PackageDescriptor) -> Self {
        Self {
            identifier: descriptor.identifier.clone(),
            specifier: descriptor.specifier(),
            revision: descriptor.revision.clone(),
        }
    }
}

/// Port for the external installation backend (Hexagonal Architecture)
#[cfg_attr(any(test, feature = "with_mocks"), mockall::automock)]
pub trait PackageBackend: Send + Sync {
    /// Start installing a package. Succeeds with the installed identifier.
    fn add(&self, request: &AddRequest) -> OperationHandle<String>;

    /// Start removing an installed package.
    fn remove(&self, identifier: &str) -> OperationHandle<()>;

    /// Start listing every installed identifier.
    fn list(&self) -> OperationHandle<BTreeSet<String>>;
}
