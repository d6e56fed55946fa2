use gitdeps::{config::AppConfig, package::port::PackageStore};
use tracing::info;

use super::{add::apply_fields, report_descriptor_issues};
use crate::{
    cli::DescriptorFields,
    commands::{edit_store, open_store, report_reconcile_error},
    terminal_progress_reporter::TerminalProgressReporter,
};

pub(crate) struct EditArgs<'a> {
    pub(crate) url: Option<&'a str>,
    pub(crate) path: Option<&'a str>,
    pub(crate) revision: Option<&'a str>,
    pub(crate) fields: &'a DescriptorFields,
}

pub(crate) fn handle_edit(
    identifier: &str,
    args: &EditArgs<'_>,
    config: &AppConfig,
    reporter: TerminalProgressReporter,
) -> i32 {
    info!("Editing package: {}", identifier);

    let packages = match open_store(config).load() {
        Ok(packages) => packages,
        Err(e) => {
            reporter.report_error(e);
            return 1;
        }
    };

    let Some(mut edited) = packages.get(identifier).cloned() else {
        reporter.report_error(format!("Package '{identifier}' not found"));
        reporter.report_suggestion("Run 'gitdeps package list' to see stored packages");
        return 1;
    };

    if let Some(url) = args.url {
        edited.repository_url = url.to_string();
    }
    if let Some(path) = args.path {
        edited.subdirectory_path = path.to_string();
    }
    if let Some(revision) = args.revision {
        edited.revision = revision.to_string();
    }
    apply_fields(&mut edited, args.fields);

    let result = edited.validate(packages.categories());
    if !report_descriptor_issues(&edited, result.issues(), reporter) {
        reporter.report_error(format!("Package '{identifier}' was not changed"));
        return 1;
    }

    match edit_store(config, |packages| {
        packages.update_package(identifier, |descriptor| *descriptor = edited)
    }) {
        Ok(()) => {
            reporter.report_success(format!("Updated '{identifier}'"));
            0
        }
        Err(e) => {
            report_reconcile_error(&e, reporter);
            1
        }
    }
}
