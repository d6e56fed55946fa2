//! Commands that go through the backend: install, remove and refresh

use gitdeps::{config::AppConfig, reconciler::RefreshRequest};
use tracing::{debug, info};

use crate::{
    commands::{CliReconciler, open_reconciler, report_reconcile_error},
    event_reporter::EventReporter,
    terminal_progress_reporter::TerminalProgressReporter,
};

pub(crate) async fn handle_install(
    identifier: &str,
    config: &AppConfig,
    reporter: TerminalProgressReporter,
) -> i32 {
    info!("Installing package: {}", identifier);

    let Some(mut reconciler) = reconciler_or_report(config, reporter) else {
        return 1;
    };

    if let Some(package) = reconciler.config().get(identifier).filter(|p| p.installed) {
        reporter.report_info(format!(
            "'{identifier}' is already marked as installed, reinstalling at {}",
            package.revision
        ));
    }

    if let Err(e) = reconciler.install(identifier) {
        report_reconcile_error(&e, reporter);
        return 1;
    }
    reporter.report_progress(format!("Installing '{identifier}'"));

    drive(&mut reconciler, config, reporter).await
}

pub(crate) async fn handle_remove(
    identifier: &str,
    config: &AppConfig,
    reporter: TerminalProgressReporter,
) -> i32 {
    info!("Removing package: {}", identifier);

    let Some(mut reconciler) = reconciler_or_report(config, reporter) else {
        return 1;
    };

    if let Err(e) = reconciler.request_remove(identifier) {
        report_reconcile_error(&e, reporter);
        return 1;
    }
    reporter.report_progress(format!("Removing '{identifier}'"));

    drive(&mut reconciler, config, reporter).await
}

pub(crate) async fn handle_refresh(config: &AppConfig, reporter: TerminalProgressReporter) -> i32 {
    let Some(mut reconciler) = reconciler_or_report(config, reporter) else {
        return 1;
    };

    match reconciler.request_refresh() {
        RefreshRequest::Issued(id) => debug!(%id, "list issued"),
        RefreshRequest::Coalesced => debug!("list already pending"),
    }
    reporter.report_progress("Asking the backend for installed packages");

    drive(&mut reconciler, config, reporter).await
}

fn reconciler_or_report(
    config: &AppConfig,
    reporter: TerminalProgressReporter,
) -> Option<CliReconciler> {
    open_reconciler(config)
        .inspect_err(|e| report_reconcile_error(e, reporter))
        .ok()
}

async fn drive(
    reconciler: &mut CliReconciler,
    config: &AppConfig,
    reporter: TerminalProgressReporter,
) -> i32 {
    EventReporter::new(reporter)
        .drive(reconciler, config.tick_interval(), config.operation_timeout())
        .await
}
