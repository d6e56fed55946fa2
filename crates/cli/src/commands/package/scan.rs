use gitdeps::{config::AppConfig, fs::RealFileSystem, manifest::ManifestScanner};
use tracing::info;

use crate::{
    commands::{edit_store, report_reconcile_error},
    formatters::{format_key, format_source},
    tables::ListTableReporter,
    terminal_progress_reporter::TerminalProgressReporter,
};

pub(crate) fn handle_scan(
    import: bool,
    config: &AppConfig,
    reporter: TerminalProgressReporter,
) -> i32 {
    info!("Scanning manifest: {}", config.manifest_path().display());

    let detected = match ManifestScanner::scan_file(&RealFileSystem, config.manifest_path()) {
        Ok(detected) => detected,
        Err(e) => {
            reporter.report_error(e);
            reporter.report_suggestion("Check `manifest_path` in config.yaml or pass --manifest-path");
            return 1;
        }
    };

    if detected.is_empty() {
        reporter.report_info("No git packages found in the manifest.");
        return 0;
    }

    let mut table = ListTableReporter::new(vec!["Identifier", "Source"]);
    for package in &detected {
        table.add_row(vec![
            format_key(&package.identifier, reporter.use_colors()),
            format_source(package),
        ]);
    }
    table.print();

    if !import {
        reporter.report_suggestion("Run 'gitdeps package scan --import' to add them to the store");
        return 0;
    }

    match edit_store(config, |packages| Ok(packages.merge_detected(detected))) {
        Ok(added) if added.is_empty() => {
            reporter.report_info("Every detected package is already stored.");
            0
        }
        Ok(added) => {
            reporter.report_success(format!("Imported {} package(s)", added.len()));
            for identifier in added {
                TerminalProgressReporter::report(4, identifier);
            }
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
    use gitdeps::package::port::PackageStore;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;
    use test_common::{create_manifest_file, git_package, sample_manifest, test_config_with_dir};

    use super::*;
    use crate::commands::open_store;

    fn reporter() -> TerminalProgressReporter {
        TerminalProgressReporter::new(false)
    }

    #[test]
    fn test_scan_without_import_leaves_store() {
        let temp_dir = TempDir::new().unwrap();
        let config = test_config_with_dir(temp_dir.path());
        let _ = create_manifest_file(&temp_dir, sample_manifest());

        assert_eq!(handle_scan(false, &config, reporter()), 0);
        assert!(!config.store_path().exists());
    }

    #[test]
    fn test_scan_import_adds_new_git_packages() {
        let temp_dir = TempDir::new().unwrap();
        let config = test_config_with_dir(temp_dir.path());
        let _ = create_manifest_file(&temp_dir, sample_manifest());
        let mut existing = git_package("com.acme.tools");
        existing.description = "kept".to_string();
        edit_store(&config, |packages| packages.add_package(existing)).unwrap();

        assert_eq!(handle_scan(true, &config, reporter()), 0);

        let packages = open_store(&config).load().unwrap();
        assert_eq!(packages.packages().len(), 2);
        assert_eq!(packages.get("com.acme.tools").unwrap().description, "kept");
        let render = packages.get("com.vendor.render").unwrap();
        assert_eq!(render.subdirectory_path, "/Packages/core");
        assert!(render.installed);
        assert!(!packages.contains("com.unity.textmeshpro"));
    }

    #[test]
    fn test_scan_missing_manifest_fails() {
        let temp_dir = TempDir::new().unwrap();
        let config = test_config_with_dir(temp_dir.path());

        assert_eq!(handle_scan(true, &config, reporter()), 1);
    }
}
