//! On-disk fixture helpers for integration tests.

use std::{fs, path::PathBuf};

use tempfile::TempDir;

/// A manifest with two git dependencies, one registry dependency and a
/// nested object that must not be mistaken for the dependency block.
#[must_use]
pub fn sample_manifest() -> &'static str {
    r#"{
  "scopedRegistries": [
    { "name": "acme", "scopes": ["com.acme"] }
  ],
  "dependencies": {
    "com.acme.tools": "https://github.com/acme/tools.git#v1.2.0",
    "com.vendor.render": "https://github.com/vendor/render.git?path=/Packages/core#main",
    "com.unity.textmeshpro": "3.0.6"
  },
  "testables": ["com.acme.tools"]
}
"#
}

/// Writes `content` as the manifest at `dir/Packages/manifest.json`.
///
/// # Example
/// ```rust
/// let temp_dir = TempDir::new().unwrap();
/// let manifest = create_manifest_file(&temp_dir, sample_manifest());
/// ```
#[must_use]
pub fn create_manifest_file(dir: &TempDir, content: &str) -> PathBuf {
    let packages_dir = dir.path().join("Packages");
    fs::create_dir_all(&packages_dir).unwrap();
    let path = packages_dir.join("manifest.json");
    fs::write(&path, content).unwrap();
    path
}

/// Writes a `config.yaml` into `dir` that points the store and the manifest
/// into the same directory.
#[must_use]
pub fn create_config_file(dir: &TempDir) -> PathBuf {
    let root = dir.path().display();
    let content = format!(
        r#"store_path: "{root}/packages.yaml"
manifest_path: "{root}/Packages/manifest.json"
use_colors: false
tick_interval_ms: 5
operation_timeout: 10
"#
    );

    let path = dir.path().join("config.yaml");
    fs::write(&path, content).unwrap();
    path
}

/// Writes an export file with the given package identifiers.
#[must_use]
pub fn create_export_file(dir: &TempDir, name: &str, identifiers: &[&str]) -> PathBuf {
    let packages: Vec<_> = identifiers
        .iter()
        .map(|id| {
            let repo = id.rsplit('.').next().unwrap_or(id);
            serde_json::json!({
                "identifier": id,
                "display_name": repo,
                "repository_url": format!("https://github.com/acme/{repo}.git"),
                "revision": "main",
                "category": "Imported",
            })
        })
        .collect();

    let document = serde_json::json!({
        "packages": packages,
        "categories": ["All", "Imported", "Other"],
        "exportDate": "1700000000Z",
        "exportVersion": "1.0",
    });

    let path = dir.path().join(name);
    fs::write(&path, serde_json::to_string_pretty(&document).unwrap()).unwrap();
    path
}

/// Creates a local package folder holding a `package.json`.
#[must_use]
pub fn create_local_package_dir(dir: &TempDir, name: &str, display_name: &str) -> PathBuf {
    let package_dir = dir.path().join(name);
    fs::create_dir_all(&package_dir).unwrap();
    let manifest = serde_json::json!({
        "name": name,
        "displayName": display_name,
        "version": "0.3.1",
        "description": "A package on disk",
    });
    fs::write(
        package_dir.join("package.json"),
        serde_json::to_string_pretty(&manifest).unwrap(),
    )
    .unwrap();
    package_dir
}
