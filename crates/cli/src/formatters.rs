//! Shared text formatting utilities for consistent styling

use console::style;
use gitdeps::package::PackageDescriptor;
use std::fmt::Display;

/// Format text with key field styling (bold and cyan when colors enabled)
pub(crate) fn format_key<T: Display>(text: T, use_colors: bool) -> String {
    if use_colors {
        style(text.to_string()).bold().cyan().to_string()
    } else {
        text.to_string()
    }
}

/// `installed` or `-`, green when colors are enabled
pub(crate) fn format_installed(installed: bool, use_colors: bool) -> String {
    match (installed, use_colors) {
        (true, true) => style("installed").green().to_string(),
        (true, false) => "installed".to_string(),
        (false, _) => "-".to_string(),
    }
}

/// Where a package comes from: URL, subdirectory and revision
pub(crate) fn format_source(package: &PackageDescriptor) -> String {
    if package.is_local() {
        return package.repository_url.clone();
    }

    format!("{}#{}", package.specifier(), package.revision)
}
