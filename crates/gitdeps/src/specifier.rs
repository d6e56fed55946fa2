//! Dependency specifier codec
//!
//! A specifier packs a dependency location into one string:
//!
//! ```text
//! <repository_url>[?path=<subdirectory_path>][#<revision>]
//! ```
//!
//! [`Specifier::decode`] splits such a string apart and [`encode`] builds the
//! compact form for a stored descriptor. The revision is not
//! part of [`encode`]'s output; it travels next to the specifier in an
//! [`AddRequest`](crate::backend::AddRequest).

use std::fmt;

use url::Url;

use crate::package::PackageDescriptor;

/// Revision used when a specifier carries none
pub const DEFAULT_REVISION: &str = "main";

const PATH_PARAM: &str = "?path=";

/// The decoded parts of a dependency specifier
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Specifier {
    pub repository_url: String,

    /// Empty when the package lives at the repository root
    pub subdirectory_path: String,

    pub revision: String,
}

impl Specifier {
    /// Split a specifier string into URL, subdirectory and revision.
    ///
    /// Decoding never fails: a string without `?` or `#` is taken to be a
    /// bare repository URL on the default revision.
    ///
    /// ```
    /// use gitdeps::specifier::Specifier;
    ///
    /// let spec = Specifier::decode("https://host/repo.git?path=sub#dev");
    /// assert_eq!(spec.repository_url, "https://host/repo.git");
    /// assert_eq!(spec.subdirectory_path, "sub");
    /// assert_eq!(spec.revision, "dev");
    /// ```
    #[must_use]
    pub fn decode(specifier: &str) -> Self {
        let subdirectory_path = specifier
            .find(PATH_PARAM)
            .map(|start| {
                let value = &specifier[start + PATH_PARAM.len()..];
                let end = value.find(['&', '#']).unwrap_or(value.len());
                value[..end].to_string()
            })
            .unwrap_or_default();

        let revision = specifier
            .find('#')
            .map(|start| {
                let value = &specifier[start + 1..];
                let end = value.find(['&', '?']).unwrap_or(value.len());
                &value[..end]
            })
            .filter(|rev| !rev.is_empty())
            .unwrap_or(DEFAULT_REVISION)
            .to_string();

        let url_end = specifier.find(['?', '#']).unwrap_or(specifier.len());

        Self {
            repository_url: specifier[..url_end].to_string(),
            subdirectory_path,
            revision,
        }
    }

    /// The compact form without the revision
    #[must_use]
    pub fn location(&self) -> String {
        compose(&self.repository_url, &self.subdirectory_path)
    }

    /// The full form, `<url>[?path=..]#<revision>`
    #[must_use]
    pub fn with_revision(&self) -> String {
        format!("{}#{}", self.location(), self.revision)
    }
}

impl fmt::Display for Specifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.with_revision())
    }
}

/// Build the specifier a backend is asked to install for `descriptor`.
#[must_use]
pub fn encode(descriptor: &PackageDescriptor) -> String {
    compose(&descriptor.repository_url, &descriptor.subdirectory_path)
}

fn compose(repository_url: &str, subdirectory_path: &str) -> String {
    if subdirectory_path.is_empty() {
        repository_url.to_string()
    } else {
        format!("{repository_url}{PATH_PARAM}{subdirectory_path}")
    }
}

/// Whether a dependency value points at a git or http(s) source rather than a
/// registry version.
#[must_use]
pub fn is_git_specifier(value: &str) -> bool {
    value.starts_with("git") || value.starts_with("http")
}

/// An identifier and display name guessed from a repository URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DerivedIdentity {
    pub identifier: String,
    pub display_name: String,
}

/// Guess a package identifier from a hosted repository URL.
///
/// `https://github.com/Some-User/cool-tool.git` becomes
/// `com.some-user.cool-tool` with display name `Cool Tool`. Returns `None`
/// when the URL does not parse or has fewer than two path segments.
#[must_use]
pub fn derive_identifier(repository_url: &str) -> Option<DerivedIdentity> {
    let url = Url::parse(repository_url).ok()?;
    let mut segments = url.path_segments()?.filter(|s| !s.is_empty());

    let owner = segments.next()?;
    let repo = segments.next()?;
    let repo = repo.strip_suffix(".git").unwrap_or(repo);
    if repo.is_empty() {
        return None;
    }

    let display_name = repo
        .split(['-', '.'])
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ");

    Some(DerivedIdentity {
        identifier: format!("com.{}.{}", owner.to_lowercase(), repo.to_lowercase()),
        display_name,
    })
}
