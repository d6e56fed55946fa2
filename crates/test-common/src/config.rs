//! `AppConfig` test helpers to eliminate duplication across CLI command tests.

use crate::constants::{TEST_MANIFEST_PATH, TEST_STORE_PATH};
use gitdeps::config::{AppConfig, AppConfigBuilder};
use std::path::Path;

/// Creates a standard test configuration with colors disabled.
/// This is the most commonly used config in CLI command tests.
#[must_use]
pub fn test_config() -> AppConfig {
    AppConfigBuilder::default()
        .store_path(TEST_STORE_PATH)
        .manifest_path(TEST_MANIFEST_PATH)
        .use_colors(false)
        .build()
}

/// Creates a verbose test configuration.
/// Used for testing verbose output modes.
#[must_use]
pub fn test_config_verbose() -> AppConfig {
    AppConfigBuilder::default()
        .store_path(TEST_STORE_PATH)
        .manifest_path(TEST_MANIFEST_PATH)
        .use_colors(false)
        .verbose(true)
        .build()
}

/// Creates a test configuration rooted in `dir`.
///
/// The store is `dir/packages.yaml` and the manifest is
/// `dir/Packages/manifest.json`. The tick interval is short so reconciler
/// loops finish quickly.
pub fn test_config_with_dir<P: AsRef<Path>>(dir: P) -> AppConfig {
    let dir = dir.as_ref();
    AppConfigBuilder::default()
        .store_path(dir.join("packages.yaml"))
        .manifest_path(dir.join("Packages").join("manifest.json"))
        .use_colors(false)
        .tick_interval_ms(5)
        .operation_timeout(10)
        .build()
}
