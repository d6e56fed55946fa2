use crate::specifier::DEFAULT_REVISION;

use super::{FALLBACK_CATEGORY, PackageDescriptor};

/// Builder for [`PackageDescriptor`], mostly for tests and the CLI
#[derive(Debug, Clone)]
pub struct PackageDescriptorBuilder {
    identifier: String,
    display_name: String,
    description: String,
    repository_url: String,
    subdirectory_path: String,
    revision: String,
    installed: bool,
    version: String,
    category: String,
}

impl Default for PackageDescriptorBuilder {
    fn default() -> Self {
        Self {
            identifier: String::new(),
            display_name: String::new(),
            description: String::new(),
            repository_url: String::new(),
            subdirectory_path: String::new(),
            revision: DEFAULT_REVISION.to_string(),
            installed: false,
            version: String::new(),
            category: FALLBACK_CATEGORY.to_string(),
        }
    }
}

impl PackageDescriptorBuilder {
    #[must_use]
    pub fn identifier(mut self, identifier: &str) -> Self {
        self.identifier = identifier.to_string();
        self
    }

    #[must_use]
    pub fn display_name(mut self, display_name: &str) -> Self {
        self.display_name = display_name.to_string();
        self
    }

    #[must_use]
    pub fn description(mut self, description: &str) -> Self {
        self.description = description.to_string();
        self
    }

    #[must_use]
    pub fn repository_url(mut self, repository_url: &str) -> Self {
        self.repository_url = repository_url.to_string();
        self
    }

    #[must_use]
    pub fn subdirectory_path(mut self, subdirectory_path: &str) -> Self {
        self.subdirectory_path = subdirectory_path.to_string();
        self
    }

    #[must_use]
    pub fn revision(mut self, revision: &str) -> Self {
        self.revision = revision.to_string();
        self
    }

    #[must_use]
    pub fn installed(mut self, installed: bool) -> Self {
        self.installed = installed;
        self
    }

    #[must_use]
    pub fn version(mut self, version: &str) -> Self {
        self.version = version.to_string();
        self
    }

    #[must_use]
    pub fn category(mut self, category: &str) -> Self {
        self.category = category.to_string();
        self
    }

    #[must_use]
    pub fn build(self) -> PackageDescriptor {
        PackageDescriptor {
            identifier: self.identifier,
            display_name: self.display_name,
            description: self.description,
            repository_url: self.repository_url,
            subdirectory_path: self.subdirectory_path,
            revision: self.revision,
            installed: self.installed,
            version: self.version,
            category: self.category,
        }
    }
}
