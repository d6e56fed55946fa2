use std::path::PathBuf;

use config::FileFormat;

use crate::{config::AppConfig, fs::FileSystem, package::store::STORE_FILE_NAME};

use super::{ConfigLoadError, ConfigLoader};

/// Loads `config.yaml` (or `config.yml`) from the gitdeps config directory
pub struct YamlLoader<'a, F: FileSystem> {
    fs: &'a F,
}

impl<'a, F: FileSystem> YamlLoader<'a, F> {
    pub fn new(fs: &'a F) -> Self {
        Self { fs }
    }
}

impl<F: FileSystem> ConfigLoader for YamlLoader<'_, F> {
    fn load_config(&self) -> Result<AppConfig, ConfigLoadError> {
        let config_paths = match self.find_config_file_paths() {
            Ok(paths) => paths,
            Err(searched) => {
                return Err(ConfigLoadError::NotFound { searched });
            }
        };

        if config_paths.len() > 1 {
            return Err(ConfigLoadError::MultipleFound(
                config_paths
                    .into_iter()
                    .map(|p| p.display().to_string())
                    .collect::<Vec<_>>(),
            ));
        }

        let Some(config_path) = config_paths.first() else {
            return Err(ConfigLoadError::NotFound {
                searched: self.fs.config_dir()?,
            });
        };

        let file_contents = self.fs.read_file(config_path)?;

        let config = config::Config::builder()
            .add_source(config::File::from_str(&file_contents, FileFormat::Yaml))
            .build()?;

        let mut app_config: AppConfig = config.try_deserialize()?;

        if app_config.store_path.as_os_str().is_empty() {
            app_config.store_path = self.fs.config_dir()?.join(STORE_FILE_NAME);
        }

        // `~` expansion for both paths
        app_config.store_path = self.fs.expand_path(&app_config.store_path)?;
        app_config.manifest_path = self.fs.expand_path(&app_config.manifest_path)?;

        tracing::debug!(path = %config_path.display(), "loaded configuration");
        Ok(app_config)
    }

    fn find_config_file_paths(&self) -> Result<Vec<PathBuf>, PathBuf> {
        let mut paths = Vec::new();

        let config_dir = self
            .fs
            .config_dir()
            .map_err(|_| PathBuf::from("~/.config/gitdeps"))?;

        let config_yaml = config_dir.join("config.yaml");
        let config_yml = config_dir.join("config.yml");

        if self.fs.path_exists(&config_yaml) {
            paths.push(config_yaml);
        }
        if self.fs.path_exists(&config_yml) {
            paths.push(config_yml);
        }

        if paths.is_empty() {
            return Err(config_dir);
        }

        Ok(paths)
    }
}
