//! Common test utilities shared across all gitdeps crates.
//!
//! This crate provides standardized test helpers to eliminate code duplication
//! while maintaining test clarity and ergonomics.

pub mod backend;
pub mod config;
pub mod constants;
pub mod fixtures;
pub mod package;
pub mod store;

// Re-export the most commonly used items for convenience
pub use backend::ScriptedBackend;
pub use config::{test_config, test_config_verbose, test_config_with_dir};
pub use constants::*;
pub use fixtures::{
    create_config_file, create_export_file, create_local_package_dir, create_manifest_file,
    sample_manifest,
};
pub use package::{git_package, package_in_category, subdirectory_package};
pub use store::MemoryStore;

// Re-export commonly used external dependencies for convenience
pub use gitdeps::{
    config::AppConfigBuilder,
    package::{PackageConfig, PackageDescriptor, PackageDescriptorBuilder},
};
pub use tempfile::TempDir;
