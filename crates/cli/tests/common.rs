#![allow(dead_code)]

use std::{fs, path::PathBuf};

use assert_cmd::Command;
use tempfile::TempDir;
use test_common::{CONFIG_DIR_ENV, create_config_file, create_manifest_file, sample_manifest};

// Helper to create a temporary config environment with store and manifest in it
#[must_use]
pub fn setup_test_env() -> TempDir {
    let temp_dir = tempfile::tempdir().unwrap();
    let _ = create_config_file(&temp_dir);
    temp_dir
}

// Same as `setup_test_env`, plus the sample manifest
#[must_use]
pub fn setup_test_env_with_manifest() -> TempDir {
    let temp_dir = setup_test_env();
    let _ = create_manifest_file(&temp_dir, sample_manifest());
    temp_dir
}

#[must_use]
pub fn store_path(temp_dir: &TempDir) -> PathBuf {
    temp_dir.path().join("packages.yaml")
}

#[must_use]
pub fn manifest_path(temp_dir: &TempDir) -> PathBuf {
    temp_dir.path().join("Packages").join("manifest.json")
}

#[must_use]
pub fn read_store(temp_dir: &TempDir) -> String {
    fs::read_to_string(store_path(temp_dir)).unwrap_or_default()
}

// Helper function to get a command instance with the config directory pointing at `temp_dir`
#[must_use]
pub fn get_command_with_test_config(temp_dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("gitdeps").unwrap();
    cmd.env(CONFIG_DIR_ENV, temp_dir.path());
    cmd.env_remove("RUST_LOG");
    cmd
}

// Helper function to get a command instance
#[must_use]
pub fn get_command() -> Command {
    Command::cargo_bin("gitdeps").unwrap()
}
