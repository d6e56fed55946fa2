use gitdeps::{
    config::AppConfig,
    package::{ALL_CATEGORY, port::PackageStore},
};

use crate::{
    commands::open_store,
    formatters::{format_installed, format_key, format_source},
    tables::ListTableReporter,
    terminal_progress_reporter::TerminalProgressReporter,
};

pub(crate) fn handle_list(
    category: Option<&str>,
    search: Option<&str>,
    config: &AppConfig,
    reporter: TerminalProgressReporter,
) -> i32 {
    let packages = match open_store(config).load() {
        Ok(packages) => packages,
        Err(e) => {
            reporter.report_error(e);
            return 1;
        }
    };

    let category = category.unwrap_or(ALL_CATEGORY);
    if !packages.categories().contains(category) {
        reporter.report_error(format!("Unknown category '{category}'"));
        reporter.report_suggestion("Run 'gitdeps category list' to see categories");
        return 1;
    }

    let mut matching = packages.filter(category, search.unwrap_or_default());
    if matching.is_empty() {
        reporter.report_info("No packages found.");
        return 0;
    }

    matching.sort_by(|a, b| a.identifier.cmp(&b.identifier));

    let mut table = ListTableReporter::new(vec!["Identifier", "Name", "Category", "Source", "State"]);
    for package in matching {
        table.add_row(vec![
            format_key(&package.identifier, reporter.use_colors()),
            package.label().to_string(),
            package.category.clone(),
            format_source(package),
            format_installed(package.installed, reporter.use_colors()),
        ]);
    }
    table.print();

    0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::edit_store;
    use tempfile::TempDir;
    use test_common::{git_package, package_in_category, test_config_with_dir};

    fn reporter() -> TerminalProgressReporter {
        TerminalProgressReporter::new(false)
    }

    #[test]
    fn test_list_empty_store() {
        let temp_dir = TempDir::new().unwrap();
        let config = test_config_with_dir(temp_dir.path());

        assert_eq!(handle_list(None, None, &config, reporter()), 0);
    }

    #[test]
    fn test_list_with_filters() {
        let temp_dir = TempDir::new().unwrap();
        let config = test_config_with_dir(temp_dir.path());
        edit_store(&config, |packages| {
            packages.add_package(git_package("com.acme.tools"))?;
            packages.add_package(package_in_category("com.acme.effects", "VFX"))
        })
        .unwrap();

        assert_eq!(handle_list(Some("VFX"), None, &config, reporter()), 0);
        assert_eq!(handle_list(None, Some("tools"), &config, reporter()), 0);
    }

    #[test]
    fn test_list_unknown_category_fails() {
        let temp_dir = TempDir::new().unwrap();
        let config = test_config_with_dir(temp_dir.path());

        assert_eq!(handle_list(Some("Nope"), None, &config, reporter()), 1);
    }

    #[test]
    fn test_list_unreadable_store_fails() {
        let temp_dir = TempDir::new().unwrap();
        let config = test_config_with_dir(temp_dir.path());
        std::fs::write(config.store_path(), "packages: [not: valid").unwrap();

        assert_eq!(handle_list(None, None, &config, reporter()), 1);
    }
}
