use std::path::Path;

use crate::validation::{ValidationErrorCategory, ValidationIssue, ValidationIssues};

use super::AppConfig;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValidationResult {
    /// List of validation issues found
    ///
    pub(crate) issues: ValidationIssues,
}

impl ValidationResult {
    #[must_use]
    pub fn issues(&self) -> &ValidationIssues {
        &self.issues
    }

    #[must_use]
    pub fn is_valid(&self) -> bool {
        !self.issues.has_errors()
    }
}

impl AppConfig {
    /// Full validation for the `AppConfig`
    ///
    #[must_use]
    pub fn validate(&self) -> ValidationResult {
        let mut issues = Vec::new();

        issues.extend(validate_store_path(&self.store_path));
        issues.extend(validate_manifest_path(&self.manifest_path));

        if self.tick_interval_ms == 0 {
            issues.push(ValidationIssue::error(
                ValidationErrorCategory::InvalidValue,
                "tick_interval_ms",
                "The tick interval must be greater than zero",
                Some("Remove `tick_interval_ms` to use the default of 100"),
            ));
        }

        if self.operation_timeout == 0 {
            issues.push(ValidationIssue::error(
                ValidationErrorCategory::InvalidValue,
                "operation_timeout",
                "The operation timeout must be greater than zero",
                Some("Set a timeout in seconds. Ex. `operation_timeout: 120`"),
            ));
        }

        ValidationResult {
            issues: issues.into(),
        }
    }
}

fn validate_store_path(store_path: &Path) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();

    if store_path.as_os_str().is_empty() {
        issues.push(ValidationIssue::error(
            ValidationErrorCategory::RequiredField,
            "store_path",
            "The `store_path` field exists, but has no value",
            Some("Set a value for `store_path`. Ex. `store_path: ~/.config/gitdeps/packages.yaml`"),
        ));
        return issues;
    }

    if !has_extension(store_path, &["yaml", "yml"]) {
        issues.push(ValidationIssue::warning(
            ValidationErrorCategory::PathFormat,
            "store_path",
            "The package store is written as YAML but the file does not end in `.yaml`",
            None,
        ));
    }

    let raw = store_path.to_string_lossy();
    let expanded = shellexpand::tilde(&raw);
    if !Path::new(expanded.as_ref()).is_absolute() {
        issues.push(ValidationIssue::warning(
            ValidationErrorCategory::PathFormat,
            "store_path",
            "The path at `store_path` is relative and depends on the working directory",
            Some("Provide an absolute path or one starting with `~`"),
        ));
    }

    issues
}

fn validate_manifest_path(manifest_path: &Path) -> Vec<ValidationIssue> {
    if manifest_path.as_os_str().is_empty() {
        return vec![ValidationIssue::error(
            ValidationErrorCategory::RequiredField,
            "manifest_path",
            "The `manifest_path` field exists, but has no value",
            Some("Set a value for `manifest_path`. Ex. `manifest_path: Packages/manifest.json`"),
        )];
    }

    if has_extension(manifest_path, &["json"]) {
        Vec::new()
    } else {
        vec![ValidationIssue::warning(
            ValidationErrorCategory::PathFormat,
            "manifest_path",
            "The manifest is a JSON document but the file does not end in `.json`",
            None,
        )]
    }
}

fn has_extension(path: &Path, allowed: &[&str]) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| allowed.iter().any(|a| ext.eq_ignore_ascii_case(a)))
}
