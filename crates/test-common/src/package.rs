//! Package descriptor helpers for tests to eliminate repetitive builder usage.

use crate::constants::TEST_REVISION;
use gitdeps::package::{PackageDescriptor, PackageDescriptorBuilder};

/// Creates a descriptor for `https://github.com/acme/<last segment>.git`.
/// This is the most basic descriptor used in many tests.
#[must_use]
pub fn git_package(identifier: &str) -> PackageDescriptor {
    let repo = identifier.rsplit('.').next().unwrap_or(identifier);
    PackageDescriptorBuilder::default()
        .identifier(identifier)
        .display_name(repo)
        .repository_url(&format!("https://github.com/acme/{repo}.git"))
        .revision(TEST_REVISION)
        .build()
}

/// Creates a descriptor that lives below `subdirectory` of its repository.
#[must_use]
pub fn subdirectory_package(identifier: &str, subdirectory: &str) -> PackageDescriptor {
    PackageDescriptor {
        subdirectory_path: subdirectory.to_string(),
        ..git_package(identifier)
    }
}

/// Creates a descriptor assigned to `category`.
#[must_use]
pub fn package_in_category(identifier: &str, category: &str) -> PackageDescriptor {
    PackageDescriptor {
        category: category.to_string(),
        ..git_package(identifier)
    }
}
