pub mod loader;
pub mod validate;

use std::{
    path::{Path, PathBuf},
    time::Duration,
};

use serde::Deserialize;

use crate::package::store::STORE_FILE_NAME;

const VERBOSE_DEFAULT: bool = false;
const USE_COLORS_DEFAULT: bool = true;
const TICK_INTERVAL_MS_DEFAULT: u64 = 100;
const OPERATION_TIMEOUT_DEFAULT: u64 = 120;
const MANIFEST_PATH_DEFAULT: &str = "Packages/manifest.json";

/// Comprehensive application configuration that combines file config and CLI args
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AppConfig {
    /// Package store file. Empty means `packages.yaml` in the config directory.
    #[serde(default)]
    pub(crate) store_path: PathBuf,

    /// Manifest edited by the manifest backend
    #[serde(default = "default_manifest_path")]
    pub(crate) manifest_path: PathBuf,

    // UI settings
    #[serde(default)]
    pub(crate) verbose: bool,

    #[serde(default = "default_use_colors")]
    pub(crate) use_colors: bool,

    // Reconciler settings
    #[serde(default = "default_tick_interval_ms")]
    pub(crate) tick_interval_ms: u64,

    /// Seconds to wait for backend operations before giving up
    #[serde(default = "default_operation_timeout")]
    pub(crate) operation_timeout: u64,
}

fn default_manifest_path() -> PathBuf {
    PathBuf::from(MANIFEST_PATH_DEFAULT)
}
fn default_use_colors() -> bool {
    USE_COLORS_DEFAULT
}
fn default_tick_interval_ms() -> u64 {
    TICK_INTERVAL_MS_DEFAULT
}
fn default_operation_timeout() -> u64 {
    OPERATION_TIMEOUT_DEFAULT
}

impl AppConfig {
    /// Defaults for a setup without a config file, storing packages in
    /// `config_dir`
    #[must_use]
    pub fn with_config_dir(config_dir: &Path) -> Self {
        AppConfigBuilder::default()
            .store_path(config_dir.join(STORE_FILE_NAME))
            .build()
    }

    #[must_use]
    pub fn store_path(&self) -> &Path {
        &self.store_path
    }

    #[must_use]
    pub fn manifest_path(&self) -> &Path {
        &self.manifest_path
    }

    #[must_use]
    pub fn verbose(&self) -> bool {
        self.verbose
    }

    #[must_use]
    pub fn use_colors(&self) -> bool {
        self.use_colors
    }

    /// Never zero
    #[must_use]
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms.max(1))
    }

    #[must_use]
    pub fn operation_timeout(&self) -> Duration {
        Duration::from_secs(self.operation_timeout)
    }

    pub fn store_path_mut(&mut self) -> &mut PathBuf {
        &mut self.store_path
    }

    pub fn manifest_path_mut(&mut self) -> &mut PathBuf {
        &mut self.manifest_path
    }

    pub fn verbose_mut(&mut self) -> &mut bool {
        &mut self.verbose
    }

    pub fn use_colors_mut(&mut self) -> &mut bool {
        &mut self.use_colors
    }
}

/// Builder pattern for `AppConfig` testing
///
#[derive(Default, Debug)]
pub struct AppConfigBuilder {
    store_path: PathBuf,
    manifest_path: Option<PathBuf>,
    verbose: Option<bool>,
    use_colors: Option<bool>,
    tick_interval_ms: Option<u64>,
    operation_timeout: Option<u64>,
}

impl AppConfigBuilder {
    #[must_use]
    pub fn store_path(mut self, store_path: impl Into<PathBuf>) -> Self {
        self.store_path = store_path.into();
        self
    }

    #[must_use]
    pub fn manifest_path(mut self, manifest_path: impl Into<PathBuf>) -> Self {
        self.manifest_path = Some(manifest_path.into());
        self
    }

    #[must_use]
    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = Some(verbose);
        self
    }

    #[must_use]
    pub fn use_colors(mut self, use_colors: bool) -> Self {
        self.use_colors = Some(use_colors);
        self
    }

    #[must_use]
    pub fn tick_interval_ms(mut self, millis: u64) -> Self {
        self.tick_interval_ms = Some(millis);
        self
    }

    #[must_use]
    pub fn operation_timeout(mut self, seconds: u64) -> Self {
        self.operation_timeout = Some(seconds);
        self
    }

    #[must_use]
    pub fn build(self) -> AppConfig {
        AppConfig {
            store_path: self.store_path,
            manifest_path: self.manifest_path.unwrap_or_else(default_manifest_path),
            verbose: self.verbose.unwrap_or(VERBOSE_DEFAULT),
            use_colors: self.use_colors.unwrap_or(USE_COLORS_DEFAULT),
            tick_interval_ms: self.tick_interval_ms.unwrap_or(TICK_INTERVAL_MS_DEFAULT),
            operation_timeout: self.operation_timeout.unwrap_or(OPERATION_TIMEOUT_DEFAULT),
        }
    }
}
