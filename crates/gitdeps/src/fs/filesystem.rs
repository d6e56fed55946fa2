//! File system abstraction layer
//!
//! This module provides a trait-based abstraction for file system operations
//! to enable testing and different implementations. The package store, the
//! manifest backend and the configuration loader all reach the disk through
//! this port.

use std::{
    io,
    path::{Path, PathBuf},
    sync::Arc,
};

use thiserror::Error;

/// Port for file system operations (Hexagonal Architecture)
///
/// All file system interactions in the gitdeps library go through this
/// abstraction so that stores, scanners and backends can be exercised against
/// a mock in tests.
#[cfg_attr(any(test, feature = "with_mocks"), mockall::automock)]
pub trait FileSystem: Send + Sync {
    /// Read a file and return its contents as a string
    ///
    /// # Errors
    ///
    /// Returns [`FileSystemError`] if:
    /// - The file does not exist
    /// - Permission is denied to read the file
    /// - The file content is not valid UTF-8
    fn read_file(&self, path: &Path) -> Result<String, FileSystemError>;

    /// Write data to a file
    ///
    /// Creates the file if it doesn't exist or overwrites it if it does.
    /// Missing parent directories are created.
    ///
    /// # Errors
    ///
    /// Returns [`FileSystemError`] if the parent directory cannot be created or
    /// the write itself fails.
    fn write_file(&self, path: &Path, data: &[u8]) -> Result<(), FileSystemError>;

    /// Check if a path exists
    fn path_exists(&self, path: &Path) -> bool;

    /// Expand a leading `~` to the user's home directory
    ///
    /// The path does not need to exist.
    ///
    /// # Errors
    ///
    /// Returns [`FileSystemError::HomeDirNotFound`] if the home directory
    /// cannot be determined.
    fn expand_path(&self, path: &Path) -> Result<PathBuf, FileSystemError>;

    /// Get the user's configuration directory for gitdeps
    ///
    /// # Errors
    ///
    /// Returns [`FileSystemError`] if the user's home directory cannot be
    /// determined.
    fn config_dir(&self) -> Result<PathBuf, FileSystemError>;
}

/// Errors that can occur during file system operations
#[derive(Error, Debug, Clone)]
pub enum FileSystemError {
    /// General IO error occurred during file system operation
    #[error("IO error: {0}")]
    IoError(Arc<io::Error>),

    /// Home directory could not be determined (needed for path expansion)
    #[error("Home directory not found")]
    HomeDirNotFound,
}

impl From<io::Error> for FileSystemError {
    fn from(error: io::Error) -> Self {
        Self::IoError(Arc::new(error))
    }
}

#[cfg(test)]
impl MockFileSystem {
    /// Set up a mock for reading a file with specific content
    pub(crate) fn mock_read_file<P, S>(&mut self, path: P, content: S)
    where
        PathBuf: From<P>,
        S: ToString,
    {
        let path_buf = PathBuf::from(path);
        let content_string = content.to_string();
        self.expect_read_file()
            .with(mockall::predicate::eq(path_buf))
            .returning(move |_| Ok(content_string.clone()));
    }

    /// Set up a mock for a file that cannot be read
    pub(crate) fn mock_read_file_not_found<P>(&mut self, path: P)
    where
        PathBuf: From<P>,
    {
        self.expect_read_file()
            .with(mockall::predicate::eq(PathBuf::from(path)))
            .returning(|_| {
                Err(FileSystemError::from(io::Error::new(
                    io::ErrorKind::NotFound,
                    "file not found",
                )))
            });
    }

    /// Set up a mock for path existence checking
    pub(crate) fn mock_path_exists<P>(&mut self, path: P, exists: bool)
    where
        PathBuf: From<P>,
    {
        self.expect_path_exists()
            .with(mockall::predicate::eq(PathBuf::from(path)))
            .returning(move |_| exists);
    }

    /// Set up a mock for getting the configuration directory
    pub(crate) fn mock_config_dir_ok<P>(&mut self, path: P)
    where
        PathBuf: From<P>,
    {
        let p = PathBuf::from(path);
        self.expect_config_dir().return_once(|| Ok(p));
    }

    /// Set up a complete mock configuration file scenario
    ///
    /// The config dir resolves to `config_dir`, `config.yaml` exists there with
    /// `config_yaml` as content, and `config.yml` does not.
    pub(crate) fn mock_config_file(&mut self, config_dir: &Path, config_yaml: &str) {
        let config_dir_owned = PathBuf::from(config_dir);
        let config_path = config_dir.join("config.yaml");

        self.expect_config_dir()
            .return_once(|| Ok(config_dir_owned));
        self.mock_path_exists(&config_path, true);
        self.mock_read_file(&config_path, config_yaml);

        self.mock_path_exists(&config_dir.join("config.yml"), false);
    }

    /// Set up a mock for writing a file that always succeeds
    pub(crate) fn mock_write_file<P>(&mut self, path: P)
    where
        PathBuf: From<P>,
    {
        let path_buf = PathBuf::from(path);
        self.expect_write_file()
            .with(
                mockall::predicate::eq(path_buf),
                mockall::predicate::always(),
            )
            .returning(|_, _| Ok(()));
    }

    /// Set up a mock for path expansion that returns the input unchanged
    pub(crate) fn mock_expand_path_identity(&mut self) {
        self.expect_expand_path()
            .returning(|path| Ok(path.to_path_buf()));
    }
}
