//! Presenting reconciler events in the terminal
//!
//! Commands that issue backend operations drive the reconciler until it is
//! idle and hand the collected [`ReconcileEvent`]s to an [`EventReporter`],
//! which prints one line per event and turns the batch into an exit code.

use std::time::Duration;

use gitdeps::{
    backend::PackageBackend,
    package::port::PackageStore,
    reconciler::{InstallationReconciler, ReconcileEvent},
};
use tracing::warn;

use crate::terminal_progress_reporter::TerminalProgressReporter;

#[derive(Debug, Clone, Copy)]
pub(crate) struct EventReporter {
    reporter: TerminalProgressReporter,
}

impl EventReporter {
    pub(crate) fn new(reporter: TerminalProgressReporter) -> Self {
        Self { reporter }
    }

    /// Print one event. Returns `false` for failures.
    pub(crate) fn report(&self, event: &ReconcileEvent) -> bool {
        match event {
            ReconcileEvent::Added { identifier } => {
                self.reporter
                    .report_success(format!("Installed '{identifier}'"));
                true
            }
            ReconcileEvent::Removed { identifier } => {
                self.reporter
                    .report_success(format!("Removed '{identifier}'"));
                true
            }
            ReconcileEvent::Refreshed { installed, changed } => {
                self.reporter.report_info(format!(
                    "{installed} package(s) installed according to the backend"
                ));
                for identifier in changed {
                    TerminalProgressReporter::report(4, format!("updated: {identifier}"));
                }
                true
            }
            ReconcileEvent::Failed(failure) => {
                self.reporter.report_error(failure);
                false
            }
            ReconcileEvent::PersistFailed { kind, message } => {
                self.reporter.report_error(format!(
                    "The result of the {kind} operation was not saved: {message}"
                ));
                self.reporter
                    .report_suggestion("Run 'gitdeps package refresh' once the store is writable");
                false
            }
        }
    }

    /// Print every event. Returns the exit code for the batch.
    pub(crate) fn report_all(&self, events: &[ReconcileEvent]) -> i32 {
        let failures = events.iter().filter(|event| !self.report(event)).count();
        i32::from(failures > 0)
    }

    /// Tick the reconciler until idle or until `timeout` passes, then report
    /// what happened. Events seen before a timeout are still reported.
    pub(crate) async fn drive<S, B>(
        &self,
        reconciler: &mut InstallationReconciler<S, B>,
        tick_interval: Duration,
        timeout: Duration,
    ) -> i32
    where
        S: PackageStore,
        B: PackageBackend,
    {
        self.reporter.report_progress("Waiting for the backend...");

        let (events, finished) = collect_events(reconciler, tick_interval, timeout).await;
        let code = self.report_all(&events);
        if finished {
            return code;
        }

        warn!(?timeout, reported = events.len(), "backend did not finish in time");
        self.reporter.report_error(format!(
            "The backend did not finish within {} seconds",
            timeout.as_secs()
        ));
        self.reporter
            .report_suggestion("Raise `operation_timeout` in config.yaml");
        1
    }
}

/// Run the reconciler until idle or `timeout`. The flag is `false` on timeout.
async fn collect_events<S, B>(
    reconciler: &mut InstallationReconciler<S, B>,
    tick_interval: Duration,
    timeout: Duration,
) -> (Vec<ReconcileEvent>, bool)
where
    S: PackageStore,
    B: PackageBackend,
{
    let mut events = Vec::new();
    let finished = tokio::time::timeout(
        timeout,
        reconciler.run_until_idle_into(tick_interval, &mut events),
    )
    .await
    .is_ok();

    (events, finished)
}
