use std::sync::LazyLock;

use regex::Regex;

use crate::{
    specifier::is_git_specifier,
    validation::{ValidationErrorCategory, ValidationIssue, ValidationIssues},
};

use super::{ALL_CATEGORY, CategorySet, PackageDescriptor};

/// Reverse-domain identifiers like `com.owner.tool`
static IDENTIFIER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-z0-9][a-z0-9_-]*(\.[a-z0-9][a-z0-9_-]*)+$").expect("valid regex")
});

/// Results of validating a package descriptor
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValidationResult {
    pub(crate) identifier: String,
    pub(crate) issues: ValidationIssues,
}

impl ValidationResult {
    #[must_use]
    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    #[must_use]
    pub fn issues(&self) -> &ValidationIssues {
        &self.issues
    }

    /// Returns true if the validation passed (warnings are okay)
    #[must_use]
    pub fn is_valid(&self) -> bool {
        !self.issues.has_errors()
    }
}

impl PackageDescriptor {
    /// Check the descriptor against the categories of the store it belongs to
    #[must_use]
    pub fn validate(&self, categories: &CategorySet) -> ValidationResult {
        let mut issues = Vec::new();

        issues.extend(self.validate_identifier());
        issues.extend(self.validate_repository_url());
        issues.extend(self.validate_revision());
        issues.extend(self.validate_category(categories));

        ValidationResult {
            identifier: self.identifier.clone(),
            issues: issues.into(),
        }
    }

    fn validate_identifier(&self) -> Option<ValidationIssue> {
        if self.identifier.is_empty() {
            Some(ValidationIssue::error(
                ValidationErrorCategory::RequiredField,
                "identifier",
                "Package identifier is required",
                Some("Use a reverse-domain identifier, e.g. `com.owner.package`."),
            ))
        } else if !IDENTIFIER_RE.is_match(&self.identifier) {
            Some(ValidationIssue::warning(
                ValidationErrorCategory::InvalidValue,
                "identifier",
                "Package identifier is not a lowercase reverse-domain name",
                Some("Backends usually expect identifiers like `com.owner.package`."),
            ))
        } else {
            None
        }
    }

    fn validate_repository_url(&self) -> Option<ValidationIssue> {
        if self.repository_url.is_empty() {
            Some(ValidationIssue::error(
                ValidationErrorCategory::RequiredField,
                "repository_url",
                "Repository URL is required",
                Some("Set it to something like `https://github.com/owner/repo.git`."),
            ))
        } else if self.repository_url.contains(['?', '#']) {
            Some(ValidationIssue::error(
                ValidationErrorCategory::UrlFormat,
                "repository_url",
                "Repository URL must not contain `?` or `#`",
                Some("Put the subdirectory and revision in their own fields."),
            ))
        } else if !is_git_specifier(&self.repository_url) && !self.is_local() {
            Some(ValidationIssue::warning(
                ValidationErrorCategory::UrlFormat,
                "repository_url",
                "Repository URL does not start with `git`, `http` or `file:`",
                None,
            ))
        } else {
            None
        }
    }

    fn validate_revision(&self) -> Option<ValidationIssue> {
        self.revision.contains(['?', '&', '#']).then(|| {
            ValidationIssue::error(
                ValidationErrorCategory::InvalidValue,
                "revision",
                "Revision must not contain `?`, `&` or `#`",
                None,
            )
        })
    }

    fn validate_category(&self, categories: &CategorySet) -> Option<ValidationIssue> {
        if self.category == ALL_CATEGORY || !categories.contains(&self.category) {
            Some(ValidationIssue::warning(
                ValidationErrorCategory::Category,
                "category",
                &format!("Category `{}` is not a known category", self.category),
                Some("Pick one of the categories listed by `gitdeps-cli category list`."),
            ))
        } else {
            None
        }
    }
}
