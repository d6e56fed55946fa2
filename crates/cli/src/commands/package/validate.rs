use gitdeps::{config::AppConfig, package::port::PackageStore};

use crate::{
    commands::open_store, tables::ValidationTableReporter,
    terminal_progress_reporter::TerminalProgressReporter,
};

/// Validate one stored package, or all of them
pub(crate) fn handle_validate(
    identifier: Option<&str>,
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

    let selected: Vec<_> = match identifier {
        Some(identifier) => match packages.get(identifier) {
            Some(package) => vec![package],
            None => {
                reporter.report_error(format!("Package '{identifier}' not found"));
                return 1;
            }
        },
        None => packages.packages().iter().collect(),
    };

    if selected.is_empty() {
        reporter.report_info("No packages to validate.");
        return 0;
    }

    let mut table = ValidationTableReporter::new();
    let mut invalid = 0;
    for package in &selected {
        let result = package.validate(packages.categories());
        if !result.is_valid() {
            invalid += 1;
        }
        table.add_issues(Some(result.identifier()), result.issues(), reporter);
    }

    if table.is_empty() {
        reporter.report_success(format!("{} package(s) are valid", selected.len()));
        return 0;
    }

    table.print();
    if invalid == 0 {
        reporter.report_success(format!(
            "{} package(s) are valid, with warnings",
            selected.len()
        ));
        0
    } else {
        reporter.report_error(format!("{invalid} package(s) have errors"));
        1
    }
}
