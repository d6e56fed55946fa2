use std::path::Path;

use dialoguer::{Confirm, theme::SimpleTheme};
use gitdeps::{
    config::AppConfig,
    fs::RealFileSystem,
    package::{
        PackageDescriptor,
        exchange::{ConflictResolution, ConflictResolver, ExportDocument},
        port::PackageStore,
    },
};
use tracing::{info, warn};

use crate::{
    cli::OnConflict,
    commands::{edit_store, open_store, report_reconcile_error},
    formatters::format_source,
    tables::ValidationTableReporter,
    terminal_progress_reporter::TerminalProgressReporter,
};

pub(crate) fn handle_validate(original_config: &AppConfig, reporter: TerminalProgressReporter) -> i32 {
    info!("Validating configuration");

    let result = original_config.validate();

    if result.issues().has_errors() {
        reporter.report_error("Validation failed.");

        let mut table = ValidationTableReporter::new();
        table.add_issues(None, result.issues(), reporter).print();
        1
    } else if result.issues().has_warnings() {
        let mut table = ValidationTableReporter::new();
        table.add_issues(None, result.issues(), reporter).print();
        0
    } else {
        reporter.report_success("Configuration is valid.");
        0
    }
}

pub(crate) fn handle_export(
    file: &Path,
    packages: &[String],
    config: &AppConfig,
    reporter: TerminalProgressReporter,
) -> i32 {
    info!("Exporting packages to {}", file.display());

    let stored = match open_store(config).load() {
        Ok(stored) => stored,
        Err(e) => {
            reporter.report_error(e);
            return 1;
        }
    };

    let document = match ExportDocument::from_config(&stored, packages) {
        Ok(document) => document,
        Err(e) => {
            reporter.report_error(e);
            reporter.report_suggestion("Run 'gitdeps package list' to see stored packages");
            return 1;
        }
    };

    if let Err(e) = document.write(&RealFileSystem, file) {
        reporter.report_error(e);
        return 1;
    }

    reporter.report_success(format!(
        "Exported {} package(s) to {}",
        document.packages.len(),
        file.display()
    ));
    0
}

pub(crate) fn handle_import(
    file: &Path,
    on_conflict: OnConflict,
    config: &AppConfig,
    reporter: TerminalProgressReporter,
) -> i32 {
    info!("Importing packages from {}", file.display());

    let document = match ExportDocument::read(&RealFileSystem, file) {
        Ok(document) => document,
        Err(e) => {
            reporter.report_error(e);
            return 1;
        }
    };

    let resolver: Box<dyn ConflictResolver> = match on_conflict {
        OnConflict::Ask => Box::new(PromptResolver),
        OnConflict::Update => Box::new(ConflictResolution::Update),
        OnConflict::Skip => Box::new(ConflictResolution::Skip),
    };

    match edit_store(config, |packages| Ok(document.merge_into(packages, resolver.as_ref()))) {
        Ok(summary) => {
            reporter.report_success(format!(
                "Imported {} new, updated {}, skipped {}",
                summary.imported, summary.updated, summary.skipped
            ));
            if summary.imported + summary.updated > 0 {
                reporter.report_suggestion("Run 'gitdeps package refresh' to update installed states");
            }
            0
        }
        Err(e) => {
            report_reconcile_error(&e, reporter);
            1
        }
    }
}

/// Asks on the terminal whether to replace a stored package. Unreadable input
/// keeps the stored package.
struct PromptResolver;

impl ConflictResolver for PromptResolver {
    fn resolve(
        &self,
        existing: &PackageDescriptor,
        incoming: &PackageDescriptor,
    ) -> ConflictResolution {
        let prompt = format!(
            "'{}' is already stored ({}). Replace it with {}?",
            existing.identifier,
            format_source(existing),
            format_source(incoming)
        );

        match Confirm::with_theme(&SimpleTheme)
            .with_prompt(prompt)
            .default(false)
            .interact()
        {
            Ok(true) => ConflictResolution::Update,
            Ok(false) => ConflictResolution::Skip,
            Err(e) => {
                warn!(identifier = %existing.identifier, error = %e, "no answer, skipping");
                ConflictResolution::Skip
            }
        }
    }
}
