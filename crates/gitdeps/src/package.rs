//! Package descriptors and the declarative store they live in
//!
//! [`PackageConfig`] is the in-memory form of what a
//! [`PackageStore`](port::PackageStore) persists: the list of
//! [`PackageDescriptor`]s plus the [`CategorySet`] used to group them.

pub mod builder;
pub mod categories;
pub mod exchange;
pub mod local;
pub mod port;
pub mod store;
pub mod validate;

#[cfg(test)]
mod tests;

use std::collections::{BTreeSet, HashMap};

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use self::{
    builder::PackageDescriptorBuilder,
    categories::{ALL_CATEGORY, CategoryError, CategorySet, FALLBACK_CATEGORY},
};
use crate::specifier::{self, DEFAULT_REVISION};

fn default_revision() -> String {
    DEFAULT_REVISION.to_string()
}

/// One dependency package known to the store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageDescriptor {
    /// Unique within a store, e.g. `com.owner.tool`
    pub identifier: String,

    #[serde(default)]
    pub display_name: String,

    #[serde(default)]
    pub description: String,

    pub repository_url: String,

    /// Empty when the package sits at the repository root
    #[serde(default)]
    pub subdirectory_path: String,

    #[serde(default = "default_revision")]
    pub revision: String,

    /// Cached backend state; only trustworthy after a list refresh
    #[serde(default)]
    pub installed: bool,

    #[serde(default)]
    pub version: String,

    #[serde(default)]
    pub category: String,
}

impl PackageDescriptor {
    /// The specifier handed to the backend when installing this package
    #[must_use]
    pub fn specifier(&self) -> String {
        specifier::encode(self)
    }

    /// Whether this package points at a folder on disk rather than a repository
    #[must_use]
    pub fn is_local(&self) -> bool {
        self.repository_url.starts_with("file:")
    }

    /// Display name, falling back to the identifier
    #[must_use]
    pub fn label(&self) -> &str {
        if self.display_name.is_empty() {
            &self.identifier
        } else {
            &self.display_name
        }
    }

    /// Case-insensitive match against identifier, display name and description
    #[must_use]
    pub fn matches_search(&self, text: &str) -> bool {
        if text.is_empty() {
            return true;
        }

        let needle = text.to_lowercase();
        [&self.identifier, &self.display_name, &self.description]
            .iter()
            .any(|field| field.to_lowercase().contains(&needle))
    }
}

/// Errors from mutating a [`PackageConfig`]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PackageConfigError {
    #[error("A package with identifier `{0}` already exists")]
    DuplicateIdentifier(String),

    #[error("Package `{0}` not found")]
    PackageNotFound(String),

    #[error("Package `{identifier}` is missing required field `{field}`")]
    MissingField {
        identifier: String,
        field: &'static str,
    },

    #[error(transparent)]
    Category(#[from] CategoryError),
}

/// Packages and categories, as owned by the store
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageConfig {
    #[serde(default)]
    pub(crate) packages: Vec<PackageDescriptor>,

    #[serde(default)]
    pub(crate) categories: CategorySet,
}

impl PackageConfig {
    #[must_use]
    pub fn new(packages: Vec<PackageDescriptor>, categories: CategorySet) -> Self {
        Self {
            packages,
            categories,
        }
    }

    #[must_use]
    pub fn packages(&self) -> &[PackageDescriptor] {
        &self.packages
    }

    #[must_use]
    pub fn categories(&self) -> &CategorySet {
        &self.categories
    }

    #[must_use]
    pub fn get(&self, identifier: &str) -> Option<&PackageDescriptor> {
        self.packages.iter().find(|p| p.identifier == identifier)
    }

    #[must_use]
    pub fn contains(&self, identifier: &str) -> bool {
        self.get(identifier).is_some()
    }

    /// Register a new package.
    ///
    /// # Errors
    ///
    /// - [`PackageConfigError::MissingField`] if the identifier or repository
    ///   URL is empty
    /// - [`PackageConfigError::DuplicateIdentifier`] if the identifier is taken
    pub fn add_package(&mut self, descriptor: PackageDescriptor) -> Result<(), PackageConfigError> {
        let descriptor = self.admit(descriptor)?;

        if self.contains(&descriptor.identifier) {
            return Err(PackageConfigError::DuplicateIdentifier(
                descriptor.identifier,
            ));
        }

        self.packages.push(descriptor);
        Ok(())
    }

    /// Replace the package with the same identifier, or append it.
    ///
    /// Returns `true` if an existing package was replaced.
    ///
    /// # Errors
    ///
    /// Returns [`PackageConfigError::MissingField`] if the identifier or
    /// repository URL is empty.
    pub fn upsert_package(
        &mut self,
        descriptor: PackageDescriptor,
    ) -> Result<bool, PackageConfigError> {
        let descriptor = self.admit(descriptor)?;

        match self
            .packages
            .iter_mut()
            .find(|p| p.identifier == descriptor.identifier)
        {
            Some(existing) => {
                *existing = descriptor;
                Ok(true)
            }
            None => {
                self.packages.push(descriptor);
                Ok(false)
            }
        }
    }

    /// Edit a stored package in place.
    ///
    /// The identifier cannot be changed through this method; if `edit` changes
    /// it, the change is reverted.
    ///
    /// # Errors
    ///
    /// Returns [`PackageConfigError::PackageNotFound`] if no package has the
    /// identifier, or [`PackageConfigError::MissingField`] if the edit cleared
    /// the repository URL (in which case nothing is changed).
    pub fn update_package<F>(&mut self, identifier: &str, edit: F) -> Result<(), PackageConfigError>
    where
        F: FnOnce(&mut PackageDescriptor),
    {
        let index = self
            .packages
            .iter()
            .position(|p| p.identifier == identifier)
            .ok_or_else(|| PackageConfigError::PackageNotFound(identifier.to_string()))?;

        let mut edited = self.packages[index].clone();
        edit(&mut edited);
        edited.identifier = identifier.to_string();

        self.packages[index] = self.admit(edited)?;
        Ok(())
    }

    /// Drop a package from the store. This does not uninstall it.
    ///
    /// # Errors
    ///
    /// Returns [`PackageConfigError::PackageNotFound`] if no package has the
    /// identifier.
    pub fn remove_package(
        &mut self,
        identifier: &str,
    ) -> Result<PackageDescriptor, PackageConfigError> {
        let index = self
            .packages
            .iter()
            .position(|p| p.identifier == identifier)
            .ok_or_else(|| PackageConfigError::PackageNotFound(identifier.to_string()))?;

        Ok(self.packages.remove(index))
    }

    /// Set the cached `installed` flag. Returns `false` if the package is not
    /// in the store.
    pub fn set_installed(&mut self, identifier: &str, installed: bool) -> bool {
        match self.packages.iter_mut().find(|p| p.identifier == identifier) {
            Some(package) => {
                package.installed = installed;
                true
            }
            None => false,
        }
    }

    /// Make every `installed` flag agree with the backend's installed set.
    pub fn reconcile_installed(&mut self, installed: &BTreeSet<String>) {
        for package in &mut self.packages {
            package.installed = installed.contains(&package.identifier);
        }
    }

    /// # Errors
    ///
    /// See [`CategorySet::add`].
    pub fn add_category(&mut self, name: &str) -> Result<(), PackageConfigError> {
        Ok(self.categories.add(name)?)
    }

    /// Delete a category and move its packages to the fallback category.
    ///
    /// Returns the number of packages that were moved.
    ///
    /// # Errors
    ///
    /// See [`CategorySet::delete`].
    pub fn delete_category(&mut self, name: &str) -> Result<usize, PackageConfigError> {
        self.categories.delete(name)?;

        let mut moved = 0;
        for package in self.packages.iter_mut().filter(|p| p.category == name) {
            package.category = FALLBACK_CATEGORY.to_string();
            moved += 1;
        }

        Ok(moved)
    }

    /// Packages in `category` (or any, for [`ALL_CATEGORY`]) matching `search`
    #[must_use]
    pub fn filter(&self, category: &str, search: &str) -> Vec<&PackageDescriptor> {
        self.packages
            .iter()
            .filter(|p| category == ALL_CATEGORY || p.category == category)
            .filter(|p| p.matches_search(search))
            .collect()
    }

    /// Merge packages detected in a manifest.
    ///
    /// Within the batch the last occurrence of an identifier wins. Identifiers
    /// the store already knows are left alone. Returns the identifiers that
    /// were added.
    pub fn merge_detected<I>(&mut self, detected: I) -> Vec<String>
    where
        I: IntoIterator<Item = PackageDescriptor>,
    {
        let mut batch: Vec<PackageDescriptor> = Vec::new();
        let mut positions: HashMap<String, usize> = HashMap::new();

        for descriptor in detected {
            match positions.get(&descriptor.identifier) {
                Some(&index) => batch[index] = descriptor,
                None => {
                    positions.insert(descriptor.identifier.clone(), batch.len());
                    batch.push(descriptor);
                }
            }
        }

        let mut added = Vec::new();
        for descriptor in batch {
            if self.contains(&descriptor.identifier) {
                tracing::debug!(
                    identifier = %descriptor.identifier,
                    "skipping detected package already in store"
                );
                continue;
            }

            let identifier = descriptor.identifier.clone();
            match self.add_package(descriptor) {
                Ok(()) => added.push(identifier),
                Err(error) => tracing::warn!(%identifier, %error, "skipping detected package"),
            }
        }

        added
    }

    /// Check required fields and normalize the category.
    fn admit(
        &self,
        mut descriptor: PackageDescriptor,
    ) -> Result<PackageDescriptor, PackageConfigError> {
        if descriptor.identifier.trim().is_empty() {
            return Err(PackageConfigError::MissingField {
                identifier: descriptor.identifier,
                field: "identifier",
            });
        }

        if descriptor.repository_url.trim().is_empty() {
            return Err(PackageConfigError::MissingField {
                identifier: descriptor.identifier,
                field: "repository_url",
            });
        }

        if descriptor.revision.is_empty() {
            descriptor.revision = default_revision();
        }

        if descriptor.category.is_empty()
            || descriptor.category == ALL_CATEGORY
            || !self.categories.contains(&descriptor.category)
        {
            descriptor.category = FALLBACK_CATEGORY.to_string();
        }

        Ok(descriptor)
    }
}
