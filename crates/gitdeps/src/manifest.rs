//! Structural scanner for the `"dependencies"` block of a manifest
//!
//! The scanner does not parse the whole document. It finds the
//! `"dependencies"` key with a bracket-depth walk that understands string
//! literals and escapes, then reads the block's top-level `"key": "value"`
//! pairs. Only values that look like git or http specifiers become
//! [`PackageDescriptor`]s.
//!
//! [`ManifestFile`] reads and replaces the whole file for hand editing.

mod file;

pub use file::{ManifestFile, ManifestWriteError, check_manifest};

use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, error};

use crate::{
    fs::{FileSystem, FileSystemError},
    package::{FALLBACK_CATEGORY, PackageDescriptor},
    specifier::{Specifier, is_git_specifier},
};

const DEPENDENCIES_KEY: &str = "dependencies";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ManifestParseError {
    #[error("No \"dependencies\" key found in manifest")]
    MissingDependencies,

    #[error("\"dependencies\" at byte {offset} is not followed by an object")]
    MissingBlock { offset: usize },

    #[error("Unbalanced brackets in \"dependencies\" block starting at byte {offset}")]
    Unbalanced { offset: usize },
}

#[derive(Error, Debug, Clone)]
pub enum ManifestReadError {
    #[error("File system error reading manifest `{}`: {source}", path.display())]
    FileSystem {
        path: PathBuf,
        #[source]
        source: FileSystemError,
    },

    #[error("Could not parse manifest `{}`: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: ManifestParseError,
    },
}

/// Entry point for scanning manifest text
#[derive(Debug, Clone, Copy, Default)]
pub struct ManifestScanner;

impl ManifestScanner {
    /// Locate the dependency block and return a lazy iterator over the git
    /// packages in it, in source order. Duplicate keys are all yielded.
    ///
    /// # Errors
    ///
    /// Returns [`ManifestParseError`] if the key is missing, its value is not
    /// an object, or the object's brackets never balance.
    pub fn scan(text: &str) -> Result<ManifestEntries<'_>, ManifestParseError> {
        let block = dependencies_block(text)?;
        Ok(ManifestEntries {
            pairs: DependencyPairs { block, pos: 0 },
        })
    }

    /// Like [`scan`](Self::scan), but a malformed manifest is logged and
    /// yields nothing.
    #[must_use]
    pub fn scan_or_empty(text: &str) -> ManifestEntries<'_> {
        Self::scan(text).unwrap_or_else(|e| {
            error!(error = %e, "failed to scan manifest dependencies");
            ManifestEntries::empty()
        })
    }

    /// Read a manifest file and collect its git packages.
    ///
    /// # Errors
    ///
    /// Returns [`ManifestReadError`] if the file cannot be read or scanned.
    pub fn scan_file<F: FileSystem>(
        fs: &F,
        path: &Path,
    ) -> Result<Vec<PackageDescriptor>, ManifestReadError> {
        let text = fs
            .read_file(path)
            .map_err(|source| ManifestReadError::FileSystem {
                path: path.to_path_buf(),
                source,
            })?;

        let packages: Vec<_> = Self::scan(&text)
            .map_err(|source| ManifestReadError::Parse {
                path: path.to_path_buf(),
                source,
            })?
            .collect();

        debug!(path = %path.display(), found = packages.len(), "scanned manifest");
        Ok(packages)
    }
}

/// Git packages found in a dependency block
#[derive(Debug, Clone)]
pub struct ManifestEntries<'a> {
    pairs: DependencyPairs<'a>,
}

impl ManifestEntries<'_> {
    fn empty() -> Self {
        ManifestEntries {
            pairs: DependencyPairs { block: "", pos: 0 },
        }
    }
}

impl Iterator for ManifestEntries<'_> {
    type Item = PackageDescriptor;

    fn next(&mut self) -> Option<Self::Item> {
        self.pairs
            .by_ref()
            .find(|(_, value)| is_git_specifier(value))
            .map(|(identifier, value)| detected_descriptor(identifier, &value))
    }
}

fn detected_descriptor(identifier: String, value: &str) -> PackageDescriptor {
    let specifier = Specifier::decode(value);
    let display_name = identifier
        .rsplit('.')
        .next()
        .unwrap_or(&identifier)
        .to_string();

    PackageDescriptor {
        identifier,
        display_name,
        description: String::new(),
        repository_url: specifier.repository_url,
        subdirectory_path: specifier.subdirectory_path,
        revision: specifier.revision,
        installed: true,
        version: String::new(),
        category: FALLBACK_CATEGORY.to_string(),
    }
}

/// Top-level `"key": "value"` pairs of an object body (without its braces).
/// Pairs whose value is not a string are skipped.
#[derive(Debug, Clone)]
struct DependencyPairs<'a> {
    block: &'a str,
    pos: usize,
}

impl Iterator for DependencyPairs<'_> {
    type Item = (String, String);

    fn next(&mut self) -> Option<Self::Item> {
        let bytes = self.block.as_bytes();

        loop {
            self.pos = skip_while(bytes, self.pos, |b| b.is_ascii_whitespace() || b == b',');
            if self.pos >= bytes.len() {
                return None;
            }

            if bytes[self.pos] != b'"' {
                self.pos = skip_value(bytes, self.pos);
                continue;
            }

            let key_start = self.pos;
            let Some(key_end) = string_end(bytes, key_start) else {
                self.pos = bytes.len();
                return None;
            };

            self.pos = skip_while(bytes, key_end, |b| b.is_ascii_whitespace());
            if bytes.get(self.pos) != Some(&b':') {
                self.pos = skip_value(bytes, self.pos);
                continue;
            }
            self.pos = skip_while(bytes, self.pos + 1, |b| b.is_ascii_whitespace());

            if bytes.get(self.pos) != Some(&b'"') {
                self.pos = skip_value(bytes, self.pos);
                continue;
            }

            let value_start = self.pos;
            let Some(value_end) = string_end(bytes, value_start) else {
                self.pos = bytes.len();
                return None;
            };
            self.pos = value_end;

            let key = unquote(&self.block[key_start..key_end]);
            let value = unquote(&self.block[value_start..value_end]);
            if let (Some(key), Some(value)) = (key, value) {
                return Some((key, value));
            }
        }
    }
}

/// The body of the object that follows the first `"dependencies":` key,
/// without its enclosing braces.
fn dependencies_block(text: &str) -> Result<&str, ManifestParseError> {
    let bytes = text.as_bytes();
    let mut pos = 0;

    while pos < bytes.len() {
        if bytes[pos] != b'"' {
            pos += 1;
            continue;
        }

        let Some(end) = string_end(bytes, pos) else {
            break;
        };

        if &text[pos + 1..end - 1] == DEPENDENCIES_KEY {
            let colon = skip_while(bytes, end, |b| b.is_ascii_whitespace());
            if bytes.get(colon) == Some(&b':') {
                let open = skip_while(bytes, colon + 1, |b| b.is_ascii_whitespace());
                if bytes.get(open) != Some(&b'{') {
                    return Err(ManifestParseError::MissingBlock { offset: pos });
                }

                let close = matching_close(bytes, open)
                    .ok_or(ManifestParseError::Unbalanced { offset: open })?;
                return Ok(&text[open + 1..close]);
            }
        }

        pos = end;
    }

    Err(ManifestParseError::MissingDependencies)
}

/// Index just past the closing quote of the string literal opening at `start`
fn string_end(bytes: &[u8], start: usize) -> Option<usize> {
    let mut pos = start + 1;
    while pos < bytes.len() {
        match bytes[pos] {
            b'\\' => pos += 2,
            b'"' => return Some(pos + 1),
            _ => pos += 1,
        }
    }
    None
}

/// Index of the bracket closing the one at `open`
fn matching_close(bytes: &[u8], open: usize) -> Option<usize> {
    let mut depth = 0usize;
    let mut pos = open;

    while pos < bytes.len() {
        match bytes[pos] {
            b'"' => {
                pos = string_end(bytes, pos)?;
                continue;
            }
            b'{' | b'[' => depth += 1,
            b'}' | b']' => {
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    return Some(pos);
                }
            }
            _ => {}
        }
        pos += 1;
    }

    None
}

/// Skip one value (or stray token) up to the next top-level comma
fn skip_value(bytes: &[u8], start: usize) -> usize {
    let mut pos = start;
    while pos < bytes.len() {
        match bytes[pos] {
            b',' => return pos,
            b'"' => match string_end(bytes, pos) {
                Some(end) => pos = end,
                None => return bytes.len(),
            },
            b'{' | b'[' => match matching_close(bytes, pos) {
                Some(close) => pos = close + 1,
                None => return bytes.len(),
            },
            _ => pos += 1,
        }
    }
    bytes.len()
}

fn skip_while(bytes: &[u8], start: usize, pred: impl Fn(u8) -> bool) -> usize {
    let mut pos = start;
    while pos < bytes.len() && pred(bytes[pos]) {
        pos += 1;
    }
    pos
}

/// Decode a quoted JSON string literal, escapes included
fn unquote(literal: &str) -> Option<String> {
    serde_json::from_str(literal)
        .inspect_err(|e| debug!(literal, error = %e, "skipping undecodable string"))
        .ok()
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::fs::filesystem::MockFileSystem;

    const UNITY_MANIFEST: &str = r##"{
  "dependencies": {
    "com.unity.textmeshpro": "3.0.6",
    "com.owner.tool": "https://github.com/owner/tool.git?path=Packages/tool#v1.2.0",
    "com.owner.plain": "git@github.com:owner/plain.git",
    "com.unity.modules.ui": "1.0.0",
    "com.local.thing": "file:../LocalThing"
  },
  "scopedRegistries": []
}"##;

    fn identifiers(entries: ManifestEntries<'_>) -> Vec<String> {
        entries.map(|p| p.identifier).collect()
    }

    #[test]
    fn test_scan_keeps_only_git_and_http_values() {
        let entries = ManifestScanner::scan(UNITY_MANIFEST).unwrap();
        assert_eq!(identifiers(entries), vec!["com.owner.tool", "com.owner.plain"]);
    }

    #[test]
    fn test_scan_decodes_specifier() {
        let tool = ManifestScanner::scan(UNITY_MANIFEST)
            .unwrap()
            .next()
            .unwrap();

        assert_eq!(tool.identifier, "com.owner.tool");
        assert_eq!(tool.display_name, "tool");
        assert_eq!(tool.repository_url, "https://github.com/owner/tool.git");
        assert_eq!(tool.subdirectory_path, "Packages/tool");
        assert_eq!(tool.revision, "v1.2.0");
        assert!(tool.installed);
        assert_eq!(tool.category, FALLBACK_CATEGORY);
    }

    #[test]
    fn test_scan_defaults_revision() {
        let plain = ManifestScanner::scan(UNITY_MANIFEST).unwrap().nth(1).unwrap();
        assert_eq!(plain.repository_url, "git@github.com:owner/plain.git");
        assert_eq!(plain.revision, "main");
        assert_eq!(plain.subdirectory_path, "");
    }

    #[test]
    fn test_scan_skips_nested_and_non_string_values() {
        let text = r#"{"dependencies": {
            "com.a.nested": {"version": "https://nope", "list": [1, "}"]},
            "com.a.number": 42,
            "com.a.flag": true,
            "com.a.git": "https://host/a.git"
        }}"#;

        let entries = ManifestScanner::scan(text).unwrap();
        assert_eq!(identifiers(entries), vec!["com.a.git"]);
    }

    #[test]
    fn test_scan_handles_escapes_and_braces_in_strings() {
        let text = r#"{
            "description": "not \"dependencies\": { here",
            "dependencies": {
                "com.a.odd": "https:\/\/host\/odd.git#fix-}-brace"
            }
        }"#;

        let odd: Vec<_> = ManifestScanner::scan(text).unwrap().collect();
        assert_eq!(odd.len(), 1);
        assert_eq!(odd[0].repository_url, "https://host/odd.git");
        assert_eq!(odd[0].revision, "fix-}-brace");
    }

    #[test]
    fn test_scan_block_embedded_in_larger_text() {
        let text = "header line\n\"dependencies\" : {\"com.x.y\": \"http://h/y.git\"} trailing";
        let entries = ManifestScanner::scan(text).unwrap();
        assert_eq!(identifiers(entries), vec!["com.x.y"]);
    }

    #[test]
    fn test_scan_yields_duplicates_in_source_order() {
        let text = r#"{"dependencies": {
            "com.a.dup": "https://host/a.git#one",
            "com.a.dup": "https://host/a.git#two"
        }}"#;

        let revisions: Vec<_> = ManifestScanner::scan(text)
            .unwrap()
            .map(|p| p.revision)
            .collect();
        assert_eq!(revisions, vec!["one", "two"]);
    }

    #[test]
    fn test_empty_block_is_not_an_error() {
        let entries = ManifestScanner::scan(r#"{"dependencies": {}}"#).unwrap();
        assert_eq!(entries.count(), 0);
    }

    #[test]
    fn test_missing_key() {
        let err = ManifestScanner::scan(r#"{"devDependencies": {}}"#).unwrap_err();
        assert_eq!(err, ManifestParseError::MissingDependencies);
    }

    #[test]
    fn test_missing_block() {
        let err = ManifestScanner::scan(r#"{"dependencies": ["a"]}"#).unwrap_err();
        assert_eq!(err, ManifestParseError::MissingBlock { offset: 1 });
    }

    #[test]
    fn test_unbalanced_block() {
        let err = ManifestScanner::scan(r#"{"dependencies": {"a": "https://x""#).unwrap_err();
        assert!(matches!(err, ManifestParseError::Unbalanced { .. }));

        let err = ManifestScanner::scan(r#"{"dependencies": {"a": "https://x"#).unwrap_err();
        assert!(matches!(err, ManifestParseError::Unbalanced { .. }));
    }

    #[test]
    fn test_scan_or_empty_swallows_errors() {
        assert_eq!(ManifestScanner::scan_or_empty("not a manifest").count(), 0);
        assert_eq!(ManifestScanner::scan_or_empty(UNITY_MANIFEST).count(), 2);
    }

    #[test]
    fn test_scan_file() {
        let mut fs = MockFileSystem::default();
        fs.mock_read_file("/project/Packages/manifest.json", UNITY_MANIFEST);

        let packages =
            ManifestScanner::scan_file(&fs, Path::new("/project/Packages/manifest.json")).unwrap();
        assert_eq!(packages.len(), 2);
    }

    #[test]
    fn test_scan_file_reports_path() {
        let mut fs = MockFileSystem::default();
        fs.mock_read_file("/m.json", "{}");

        let err = ManifestScanner::scan_file(&fs, Path::new("/m.json")).unwrap_err();
        assert!(matches!(
            err,
            ManifestReadError::Parse {
                source: ManifestParseError::MissingDependencies,
                ..
            }
        ));
        assert!(err.to_string().contains("/m.json"));
    }
}
