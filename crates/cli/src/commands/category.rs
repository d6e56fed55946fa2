use gitdeps::{
    config::AppConfig,
    package::{ALL_CATEGORY, CategorySet, FALLBACK_CATEGORY, port::PackageStore},
};
use tracing::info;

use crate::{
    commands::{edit_store, open_store, report_reconcile_error},
    formatters::format_key,
    tables::ListTableReporter,
    terminal_progress_reporter::TerminalProgressReporter,
};

pub(crate) fn handle_list(config: &AppConfig, reporter: TerminalProgressReporter) -> i32 {
    let packages = match open_store(config).load() {
        Ok(packages) => packages,
        Err(e) => {
            reporter.report_error(e);
            return 1;
        }
    };

    let mut table = ListTableReporter::new(vec!["Category", "Packages", "Protected"]);
    for category in packages.categories().iter() {
        let count = packages.filter(category, "").len();
        table.add_row(vec![
            format_key(category, reporter.use_colors()),
            count.to_string(),
            if CategorySet::is_protected(category) { "yes" } else { "" }.to_string(),
        ]);
    }
    table.print();

    0
}

pub(crate) fn handle_add(name: &str, config: &AppConfig, reporter: TerminalProgressReporter) -> i32 {
    info!("Adding category: {}", name);

    match edit_store(config, |packages| packages.add_category(name)) {
        Ok(()) => {
            reporter.report_success(format!("Added category '{}'", name.trim()));
            0
        }
        Err(e) => {
            report_reconcile_error(&e, reporter);
            1
        }
    }
}

pub(crate) fn handle_delete(
    name: &str,
    config: &AppConfig,
    reporter: TerminalProgressReporter,
) -> i32 {
    info!("Deleting category: {}", name);

    if CategorySet::is_protected(name) {
        reporter.report_error(format!("Category '{name}' cannot be deleted"));
        reporter.report_info(format!(
            "'{ALL_CATEGORY}' and '{FALLBACK_CATEGORY}' are always present"
        ));
        return 1;
    }

    match edit_store(config, |packages| packages.delete_category(name)) {
        Ok(0) => {
            reporter.report_success(format!("Deleted category '{name}'"));
            0
        }
        Ok(moved) => {
            reporter.report_success(format!("Deleted category '{name}'"));
            reporter.report_info(format!("Moved {moved} package(s) to '{FALLBACK_CATEGORY}'"));
            0
        }
        Err(e) => {
            report_reconcile_error(&e, reporter);
            1
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;
    use test_common::{package_in_category, test_config_with_dir};

    use super::*;

    fn reporter() -> TerminalProgressReporter {
        TerminalProgressReporter::new(false)
    }

    #[test]
    fn test_list_default_categories() {
        let temp_dir = TempDir::new().unwrap();
        let config = test_config_with_dir(temp_dir.path());

        assert_eq!(handle_list(&config, reporter()), 0);
    }

    #[test]
    fn test_add_then_duplicate() {
        let temp_dir = TempDir::new().unwrap();
        let config = test_config_with_dir(temp_dir.path());

        assert_eq!(handle_add("Networking", &config, reporter()), 0);
        assert_eq!(handle_add("Networking", &config, reporter()), 1);
        assert!(open_store(&config).load().unwrap().categories().contains("Networking"));
    }

    #[test]
    fn test_delete_moves_packages_to_fallback() {
        let temp_dir = TempDir::new().unwrap();
        let config = test_config_with_dir(temp_dir.path());
        edit_store(&config, |packages| {
            packages.add_package(package_in_category("com.acme.tools", "Tools"))
        })
        .unwrap();

        assert_eq!(handle_delete("Tools", &config, reporter()), 0);

        let packages = open_store(&config).load().unwrap();
        assert!(!packages.categories().contains("Tools"));
        assert_eq!(packages.get("com.acme.tools").unwrap().category, FALLBACK_CATEGORY);
    }

    #[test]
    fn test_protected_categories_cannot_be_deleted() {
        let temp_dir = TempDir::new().unwrap();
        let config = test_config_with_dir(temp_dir.path());

        assert_eq!(handle_delete(ALL_CATEGORY, &config, reporter()), 1);
        assert_eq!(handle_delete(FALLBACK_CATEGORY, &config, reporter()), 1);
        assert!(!config.store_path().exists());
    }

    #[test]
    fn test_delete_unknown_category_fails() {
        let temp_dir = TempDir::new().unwrap();
        let config = test_config_with_dir(temp_dir.path());

        assert_eq!(handle_delete("Missing", &config, reporter()), 1);
    }
}
