use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Sentinel category meaning "no filter"
pub const ALL_CATEGORY: &str = "All";

/// Where packages go when their category is deleted
pub const FALLBACK_CATEGORY: &str = "Other";

const DEFAULT_CATEGORIES: [&str; 6] = [ALL_CATEGORY, "Tools", "UI", "VFX", "Utilities", "Other"];

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CategoryError {
    #[error("Category name cannot be empty")]
    EmptyName,

    #[error("Category `{0}` already exists")]
    AlreadyExists(String),

    #[error("Category `{0}` cannot be deleted")]
    Protected(String),

    #[error("Category `{0}` not found")]
    NotFound(String),
}

/// Ordered category names
///
/// Always starts with [`ALL_CATEGORY`] and always contains
/// [`FALLBACK_CATEGORY`]; neither can be deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub struct CategorySet(Vec<String>);

impl Default for CategorySet {
    fn default() -> Self {
        Self(DEFAULT_CATEGORIES.iter().map(ToString::to_string).collect())
    }
}

impl From<Vec<String>> for CategorySet {
    fn from(names: Vec<String>) -> Self {
        let mut set = Self(vec![ALL_CATEGORY.to_string()]);
        set.merge(names);

        if !set.contains(FALLBACK_CATEGORY) {
            set.0.push(FALLBACK_CATEGORY.to_string());
        }

        set
    }
}

impl From<CategorySet> for Vec<String> {
    fn from(set: CategorySet) -> Self {
        set.0
    }
}

impl CategorySet {
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.0.iter().any(|c| c == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn is_protected(name: &str) -> bool {
        name == ALL_CATEGORY || name == FALLBACK_CATEGORY
    }

    /// # Errors
    ///
    /// [`CategoryError::EmptyName`] for a blank name and
    /// [`CategoryError::AlreadyExists`] for a duplicate.
    pub fn add(&mut self, name: &str) -> Result<(), CategoryError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(CategoryError::EmptyName);
        }
        if self.contains(name) {
            return Err(CategoryError::AlreadyExists(name.to_string()));
        }

        self.0.push(name.to_string());
        Ok(())
    }

    /// Remove a category from the set. Packages are not touched here; see
    /// [`PackageConfig::delete_category`](super::PackageConfig::delete_category).
    ///
    /// # Errors
    ///
    /// [`CategoryError::Protected`] for [`ALL_CATEGORY`] and
    /// [`FALLBACK_CATEGORY`], [`CategoryError::NotFound`] for unknown names.
    pub fn delete(&mut self, name: &str) -> Result<(), CategoryError> {
        if Self::is_protected(name) {
            return Err(CategoryError::Protected(name.to_string()));
        }

        let index = self
            .0
            .iter()
            .position(|c| c == name)
            .ok_or_else(|| CategoryError::NotFound(name.to_string()))?;

        self.0.remove(index);
        Ok(())
    }

    /// Append every name not yet present, keeping order. Blank names are
    /// ignored.
    pub fn merge<I, S>(&mut self, names: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for name in names {
            let name = name.as_ref().trim();
            if !name.is_empty() && !self.contains(name) {
                self.0.push(name.to_string());
            }
        }
    }
}
