use dialoguer::{Confirm, theme::SimpleTheme};
use gitdeps::{config::AppConfig, package::port::PackageStore};
use tracing::info;

use crate::{
    commands::{edit_store, open_store, report_reconcile_error},
    terminal_progress_reporter::TerminalProgressReporter,
};

pub(crate) fn handle_delete(
    identifier: &str,
    yes: bool,
    config: &AppConfig,
    reporter: TerminalProgressReporter,
) -> i32 {
    info!("Deleting package: {}", identifier);

    let installed = match open_store(config).load() {
        Ok(packages) => match packages.get(identifier) {
            Some(package) => package.installed,
            None => {
                reporter.report_error(format!("Package '{identifier}' not found"));
                return 1;
            }
        },
        Err(e) => {
            reporter.report_error(e);
            return 1;
        }
    };

    if installed {
        reporter.report_warning(format!(
            "'{identifier}' is installed; deleting it from the store does not uninstall it"
        ));
    }

    if !yes {
        let confirm = Confirm::with_theme(&SimpleTheme)
            .with_prompt(format!("Delete package '{identifier}'?"))
            .default(false)
            .interact();

        match confirm {
            Ok(true) => {}
            Ok(false) => {
                reporter.report_info("Deletion cancelled.");
                return 0;
            }
            Err(_) => {
                reporter.report_error("Failed to read user input.");
                reporter.report_suggestion("Pass --yes to delete without asking");
                return 1;
            }
        }
    }

    match edit_store(config, |packages| packages.remove_package(identifier)) {
        Ok(_) => {
            reporter.report_success(format!("Deleted '{identifier}'"));
            if installed {
                reporter.report_suggestion(format!(
                    "Run 'gitdeps package remove {identifier}' to uninstall it"
                ));
            }
            0
        }
        Err(e) => {
            report_reconcile_error(&e, reporter);
            1
        }
    }
}
