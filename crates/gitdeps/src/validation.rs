//! Issues found while validating configuration and package descriptors
//!
//! Errors block an operation; warnings are shown but do not.

use core::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationLevel {
    Error,
    Warning,
}

/// What kind of problem an issue describes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValidationErrorCategory {
    /// A field that must be set is empty
    RequiredField,

    InvalidValue,

    /// Repository URLs carrying `?`/`#` or an unknown scheme
    UrlFormat,

    /// Store and manifest locations
    PathFormat,

    /// A package filed under a category the store does not know
    Category,
}

impl fmt::Display for ValidationErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::RequiredField => "required_field",
            Self::InvalidValue => "invalid_value",
            Self::UrlFormat => "url_format",
            Self::PathFormat => "path_format",
            Self::Category => "category",
        })
    }
}

/// One finding, tied to the field it was found in
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationIssue {
    pub(crate) category: ValidationErrorCategory,
    pub(crate) field: String,
    pub(crate) message: String,
    pub(crate) level: ValidationLevel,
    pub(crate) suggestion: Option<String>,
}

impl ValidationIssue {
    fn new(
        level: ValidationLevel,
        category: ValidationErrorCategory,
        field: &str,
        message: &str,
        suggestion: Option<&str>,
    ) -> Self {
        Self {
            category,
            field: field.to_string(),
            message: message.to_string(),
            level,
            suggestion: suggestion.map(str::to_string),
        }
    }

    pub(crate) fn error(
        category: ValidationErrorCategory,
        field: &str,
        message: &str,
        suggestion: Option<&str>,
    ) -> Self {
        Self::new(ValidationLevel::Error, category, field, message, suggestion)
    }

    pub(crate) fn warning(
        category: ValidationErrorCategory,
        field: &str,
        message: &str,
        suggestion: Option<&str>,
    ) -> Self {
        Self::new(ValidationLevel::Warning, category, field, message, suggestion)
    }

    #[must_use]
    pub fn category(&self) -> ValidationErrorCategory {
        self.category
    }

    #[must_use]
    pub fn field(&self) -> &str {
        &self.field
    }

    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    #[must_use]
    pub fn level(&self) -> ValidationLevel {
        self.level
    }

    #[must_use]
    pub fn suggestion(&self) -> Option<&str> {
        self.suggestion.as_deref()
    }

    #[must_use]
    pub fn is_error(&self) -> bool {
        self.level == ValidationLevel::Error
    }
}

/// Issues in the order they were found
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValidationIssues(Vec<ValidationIssue>);

impl ValidationIssues {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.0.iter().any(ValidationIssue::is_error)
    }

    #[must_use]
    pub fn has_warnings(&self) -> bool {
        self.0.iter().any(|issue| !issue.is_error())
    }

    #[must_use]
    pub fn errors(&self) -> Vec<&ValidationIssue> {
        self.with_level(ValidationLevel::Error)
    }

    #[must_use]
    pub fn warnings(&self) -> Vec<&ValidationIssue> {
        self.with_level(ValidationLevel::Warning)
    }

    #[must_use]
    pub fn by_category(&self, category: ValidationErrorCategory) -> Vec<&ValidationIssue> {
        self.0.iter().filter(|i| i.category == category).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ValidationIssue> {
        self.0.iter()
    }

    fn with_level(&self, level: ValidationLevel) -> Vec<&ValidationIssue> {
        self.0.iter().filter(|i| i.level == level).collect()
    }
}

impl From<Vec<ValidationIssue>> for ValidationIssues {
    fn from(issues: Vec<ValidationIssue>) -> Self {
        Self(issues)
    }
}
