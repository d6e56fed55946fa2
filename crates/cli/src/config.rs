use gitdeps::{
    config::{
        AppConfig,
        loader::{ApplyToConfg, ConfigLoadError, ConfigLoader, YamlLoader},
    },
    fs::FileSystem,
};
use tracing::debug;

use crate::cli::ClapCli;

impl ApplyToConfg for ClapCli {
    fn apply_to_config(&self, mut config: AppConfig) -> AppConfig {
        if let Some(path) = self.store_path.as_ref() {
            *config.store_path_mut() = path.clone();
        }

        if let Some(path) = self.manifest_path.as_ref() {
            *config.manifest_path_mut() = path.clone();
        }

        // Apply UI settings
        *config.verbose_mut() = config.verbose() || self.verbose;
        *config.use_colors_mut() = config.use_colors() && !self.no_color;

        config
    }
}

/// Load `config.yaml`, or fall back to defaults rooted in the config
/// directory when there is none.
pub(crate) fn load_config<F: FileSystem>(fs: &F) -> Result<AppConfig, ConfigLoadError> {
    match YamlLoader::new(fs).load_config() {
        Err(ConfigLoadError::NotFound { searched }) => {
            debug!(searched = %searched.display(), "no config file, using defaults");
            let dir = fs.expand_path(&searched)?;
            Ok(AppConfig::with_config_dir(&dir))
        }
        other => other,
    }
}
