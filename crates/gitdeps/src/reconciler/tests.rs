//! Tests for the reconciler state machine

use std::{
    collections::BTreeSet,
    io,
    sync::{
        Arc, Mutex,
        atomic::{AtomicBool, AtomicUsize, Ordering},
    },
    time::Duration,
};

use pretty_assertions::assert_eq;

use super::*;
use crate::{
    backend::{Completer, MockPackageBackend},
    fs::FileSystemError,
    package::{PackageDescriptorBuilder, port::MockPackageStore},
};

/// Completers for every operation the mock backend was asked to start
#[derive(Default, Clone)]
struct Pending {
    add: Arc<Mutex<Vec<(AddRequest, Completer<String>)>>>,
    remove: Arc<Mutex<Vec<(String, Completer<()>)>>>,
    list: Arc<Mutex<Vec<Completer<BTreeSet<String>>>>>,
}

impl Pending {
    fn finish_add(&self, outcome: Result<(), &str>) -> AddRequest {
        let (request, completer) = self.add.lock().unwrap().remove(0);
        match outcome {
            Ok(()) => completer.succeed(request.identifier.clone()),
            Err(message) => completer.fail(message),
        }
        request
    }

    fn finish_remove(&self, outcome: Result<(), &str>) -> String {
        let (identifier, completer) = self.remove.lock().unwrap().remove(0);
        match outcome {
            Ok(()) => completer.succeed(()),
            Err(message) => completer.fail(message),
        }
        identifier
    }

    fn finish_list(&self, installed: &[&str]) {
        let completer = self.list.lock().unwrap().remove(0);
        completer.succeed(installed.iter().map(ToString::to_string).collect());
    }

    fn fail_list(&self, message: &str) {
        self.list.lock().unwrap().remove(0).fail(message);
    }

    fn lists_issued(&self) -> usize {
        self.list.lock().unwrap().len()
    }
}

fn backend() -> (MockPackageBackend, Pending) {
    let pending = Pending::default();
    let mut backend = MockPackageBackend::new();

    let add = pending.add.clone();
    backend.expect_add().returning(move |request| {
        let (completer, handle) = OperationHandle::channel();
        add.lock().unwrap().push((request.clone(), completer));
        handle
    });

    let remove = pending.remove.clone();
    backend.expect_remove().returning(move |identifier| {
        let (completer, handle) = OperationHandle::channel();
        remove
            .lock()
            .unwrap()
            .push((identifier.to_string(), completer));
        handle
    });

    let list = pending.list.clone();
    backend.expect_list().returning(move || {
        let (completer, handle) = OperationHandle::channel();
        list.lock().unwrap().push(completer);
        handle
    });

    (backend, pending)
}

/// Store mock that records every save and can be told to fail
#[derive(Default, Clone)]
struct StoreControl {
    saves: Arc<AtomicUsize>,
    fail_saves: Arc<AtomicBool>,
    last_saved: Arc<Mutex<Option<PackageConfig>>>,
}

fn store(initial: PackageConfig) -> (MockPackageStore, StoreControl) {
    let control = StoreControl::default();
    let mut store = MockPackageStore::new();

    store.expect_load().return_once(move || Ok(initial));

    let c = control.clone();
    store.expect_save().returning(move |config| {
        if c.fail_saves.load(Ordering::SeqCst) {
            return Err(StoreError::FileSystem {
                path: "/store.yaml".into(),
                source: FileSystemError::from(io::Error::other("disk full")),
            });
        }
        c.saves.fetch_add(1, Ordering::SeqCst);
        *c.last_saved.lock().unwrap() = Some(config.clone());
        Ok(())
    });

    (store, control)
}

fn initial_config() -> PackageConfig {
    let mut config = PackageConfig::default();
    for identifier in ["com.owner.one", "com.owner.two"] {
        config
            .add_package(
                PackageDescriptorBuilder::default()
                    .identifier(identifier)
                    .repository_url(&format!("https://github.com/owner/{identifier}.git"))
                    .category("Tools")
                    .build(),
            )
            .unwrap();
    }
    config.set_installed("com.owner.two", true);
    config
}

type TestReconciler = InstallationReconciler<MockPackageStore, MockPackageBackend>;

fn reconciler() -> (TestReconciler, Pending, StoreControl) {
    let (store, control) = store(initial_config());
    let (backend, pending) = backend();
    let reconciler = InstallationReconciler::new(store, backend).unwrap();
    (reconciler, pending, control)
}

fn installed_flags(reconciler: &TestReconciler) -> Vec<(String, bool)> {
    reconciler
        .config()
        .packages()
        .iter()
        .map(|p| (p.identifier.clone(), p.installed))
        .collect()
}

#[test]
fn test_new_takes_installed_view_from_cache() {
    let (reconciler, _, _) = reconciler();

    assert!(reconciler.is_idle());
    assert_eq!(
        reconciler.installed_identifiers().iter().collect::<Vec<_>>(),
        vec!["com.owner.two"]
    );
}

#[test]
fn test_new_reports_load_failure() {
    let mut store = MockPackageStore::new();
    store
        .expect_load()
        .return_once(|| Err(StoreError::Unavailable("offline".to_string())));
    let (backend, _) = backend();

    let err = InstallationReconciler::new(store, backend).unwrap_err();
    assert!(matches!(err, ReconcileError::Persistence(_)));
}

#[test]
fn test_tick_without_completion_changes_nothing() {
    let (mut reconciler, pending, control) = reconciler();
    reconciler.install("com.owner.one").unwrap();

    assert!(reconciler.tick().is_empty());
    assert!(reconciler.tick().is_empty());

    assert!(reconciler.pending(OperationKind::Add).is_some());
    assert_eq!(pending.add.lock().unwrap().len(), 1);
    assert_eq!(control.saves.load(Ordering::SeqCst), 0);
}

#[test]
fn test_add_success_sets_installed_persists_and_refreshes() {
    let (mut reconciler, pending, control) = reconciler();
    reconciler.install("com.owner.one").unwrap();

    let request = pending.finish_add(Ok(()));
    assert_eq!(request.specifier, "https://github.com/owner/com.owner.one.git");
    assert_eq!(request.revision, "main");

    let events = reconciler.tick();

    assert_eq!(events, vec![ReconcileEvent::Added {
        identifier: "com.owner.one".to_string()
    }]);
    assert!(reconciler.config().get("com.owner.one").unwrap().installed);
    assert_eq!(control.saves.load(Ordering::SeqCst), 1);
    assert!(reconciler.pending(OperationKind::Add).is_none());
    assert!(reconciler.pending(OperationKind::List).is_some());
    assert_eq!(pending.lists_issued(), 1);
}

#[test]
fn test_add_of_unstored_package_only_refreshes() {
    let (mut reconciler, pending, control) = reconciler();
    reconciler
        .request_add(AddRequest {
            identifier: "com.other.unmanaged".to_string(),
            specifier: "https://host/unmanaged.git".to_string(),
            revision: "main".to_string(),
        })
        .unwrap();
    pending.finish_add(Ok(()));

    let events = reconciler.tick();

    assert_eq!(events.len(), 1);
    assert_eq!(control.saves.load(Ordering::SeqCst), 0);
    assert!(reconciler
        .installed_identifiers()
        .contains("com.other.unmanaged"));
    assert_eq!(pending.lists_issued(), 1);
}

#[test]
fn test_add_failure_leaves_store_untouched() {
    let (mut reconciler, pending, control) = reconciler();
    let before = reconciler.config().clone();
    reconciler.install("com.owner.one").unwrap();
    pending.finish_add(Err("repository not found"));

    let events = reconciler.tick();

    assert_eq!(events, vec![ReconcileEvent::Failed(BackendFailure {
        kind: OperationKind::Add,
        identifier: Some("com.owner.one".to_string()),
        message: "repository not found".to_string(),
    })]);
    assert_eq!(reconciler.config(), &before);
    assert_eq!(control.saves.load(Ordering::SeqCst), 0);
    assert_eq!(pending.lists_issued(), 0);
    assert!(reconciler.is_idle());
}

#[test]
fn test_remove_success_refreshes_without_touching_flags() {
    let (mut reconciler, pending, control) = reconciler();
    reconciler.request_remove("com.owner.two").unwrap();
    pending.finish_remove(Ok(()));

    let events = reconciler.tick();

    assert_eq!(events, vec![ReconcileEvent::Removed {
        identifier: "com.owner.two".to_string()
    }]);
    assert!(reconciler.config().get("com.owner.two").unwrap().installed);
    assert_eq!(control.saves.load(Ordering::SeqCst), 0);
    assert_eq!(pending.lists_issued(), 1);

    pending.finish_list(&[]);
    let events = reconciler.tick();

    assert_eq!(events, vec![ReconcileEvent::Refreshed {
        installed: 0,
        changed: vec!["com.owner.two".to_string()],
    }]);
    assert!(!reconciler.config().get("com.owner.two").unwrap().installed);
    assert!(reconciler.is_idle());
}

#[test]
fn test_remove_failure_leaves_descriptor_untouched() {
    let (mut reconciler, pending, control) = reconciler();
    let before = reconciler.config().get("com.owner.two").cloned();
    reconciler.request_remove("com.owner.two").unwrap();
    pending.finish_remove(Err("package is locked"));

    let events = reconciler.tick();

    assert_eq!(events, vec![ReconcileEvent::Failed(BackendFailure {
        kind: OperationKind::Remove,
        identifier: Some("com.owner.two".to_string()),
        message: "package is locked".to_string(),
    })]);
    assert_eq!(reconciler.config().get("com.owner.two").cloned(), before);
    assert_eq!(control.saves.load(Ordering::SeqCst), 0);
    assert!(control.last_saved.lock().unwrap().is_none());
    assert_eq!(pending.lists_issued(), 0);
    assert!(reconciler.is_idle());
}

#[test]
fn test_remove_failure_is_reported() {
    let (mut reconciler, pending, control) = reconciler();
    let before = reconciler.config().clone();
    reconciler.request_remove("com.owner.one").unwrap();
    pending.finish_remove(Err("not installed"));

    let events = reconciler.tick();

    assert!(matches!(
        &events[..],
        [ReconcileEvent::Failed(BackendFailure {
            kind: OperationKind::Remove,
            identifier: Some(identifier),
            ..
        })] if identifier == "com.owner.one"
    ));
    assert_eq!(reconciler.config(), &before);
    assert_eq!(control.saves.load(Ordering::SeqCst), 0);
    assert_eq!(pending.lists_issued(), 0);
}

#[test]
fn test_list_success_reconciles_every_flag() {
    let (mut reconciler, pending, control) = reconciler();
    assert!(matches!(
        reconciler.request_refresh(),
        RefreshRequest::Issued(_)
    ));
    pending.finish_list(&["com.owner.one", "com.other.extra"]);

    reconciler.tick();

    assert_eq!(installed_flags(&reconciler), vec![
        ("com.owner.one".to_string(), true),
        ("com.owner.two".to_string(), false),
    ]);
    assert_eq!(
        reconciler.installed_identifiers().iter().collect::<Vec<_>>(),
        vec!["com.other.extra", "com.owner.one"]
    );
    assert_eq!(
        control.last_saved.lock().unwrap().as_ref(),
        Some(reconciler.config())
    );
}

#[test]
fn test_list_failure_keeps_previous_view() {
    let (mut reconciler, pending, control) = reconciler();
    reconciler.request_refresh();
    pending.fail_list("backend offline");

    let events = reconciler.tick();

    assert_eq!(events, vec![ReconcileEvent::Failed(BackendFailure {
        kind: OperationKind::List,
        identifier: None,
        message: "backend offline".to_string(),
    })]);
    assert_eq!(
        reconciler.installed_identifiers().iter().collect::<Vec<_>>(),
        vec!["com.owner.two"]
    );
    assert_eq!(control.saves.load(Ordering::SeqCst), 0);
}

#[test]
fn test_refresh_is_coalesced_while_pending() {
    let (mut reconciler, pending, _) = reconciler();

    let first = reconciler.request_refresh();
    let second = reconciler.request_refresh();

    assert!(matches!(first, RefreshRequest::Issued(_)));
    assert_eq!(second, RefreshRequest::Coalesced);
    assert_eq!(pending.lists_issued(), 1);
}

#[test]
fn test_refresh_after_add_coalesces_with_pending_list() {
    let (mut reconciler, pending, _) = reconciler();
    reconciler.request_refresh();
    reconciler.install("com.owner.one").unwrap();
    pending.finish_add(Ok(()));

    reconciler.tick();

    assert_eq!(pending.lists_issued(), 1);
    assert!(reconciler.config().get("com.owner.one").unwrap().installed);
}

#[test]
fn test_list_issued_before_add_is_discarded_and_reissued() {
    let (mut reconciler, pending, control) = reconciler();
    reconciler.request_refresh();
    reconciler.install("com.owner.one").unwrap();
    pending.finish_add(Ok(()));
    reconciler.tick();
    let saves = control.saves.load(Ordering::SeqCst);

    // Answer from before the add landed
    pending.finish_list(&["com.owner.two"]);
    let events = reconciler.tick();

    assert!(events.is_empty());
    assert!(reconciler.config().get("com.owner.one").unwrap().installed);
    assert!(reconciler.installed_identifiers().contains("com.owner.one"));
    assert_eq!(control.saves.load(Ordering::SeqCst), saves);
    assert!(reconciler.pending(OperationKind::List).is_some());
    assert_eq!(pending.lists_issued(), 1);

    pending.finish_list(&["com.owner.one", "com.owner.two"]);
    let events = reconciler.tick();

    assert_eq!(events, vec![ReconcileEvent::Refreshed {
        installed: 2,
        changed: vec![],
    }]);
    assert!(reconciler.is_idle());
}

#[test]
fn test_list_issued_before_remove_is_discarded_and_reissued() {
    let (mut reconciler, pending, _) = reconciler();
    reconciler.request_refresh();
    reconciler.request_remove("com.owner.two").unwrap();
    pending.finish_remove(Ok(()));
    pending.finish_list(&["com.owner.two"]);

    let events = reconciler.tick();

    assert_eq!(events, vec![ReconcileEvent::Removed {
        identifier: "com.owner.two".to_string()
    }]);
    assert_eq!(pending.lists_issued(), 1);

    pending.finish_list(&[]);
    reconciler.tick();

    assert!(!reconciler.config().get("com.owner.two").unwrap().installed);
    assert!(reconciler.is_idle());
}

#[test]
fn test_failed_stale_list_is_reissued() {
    let (mut reconciler, pending, _) = reconciler();
    reconciler.request_refresh();
    reconciler.install("com.owner.one").unwrap();
    pending.finish_add(Ok(()));
    reconciler.tick();

    pending.fail_list("backend restarting");
    let events = reconciler.tick();

    assert!(events.is_empty());
    assert!(reconciler.pending(OperationKind::List).is_some());
}

#[test]
fn test_second_add_is_rejected_while_busy() {
    let (mut reconciler, pending, _) = reconciler();
    reconciler.install("com.owner.one").unwrap();

    let err = reconciler.install("com.owner.two").unwrap_err();

    assert!(matches!(
        err,
        ReconcileError::OperationInProgress {
            kind: OperationKind::Add,
            ref identifier,
        } if identifier == "com.owner.one"
    ));
    assert_eq!(pending.add.lock().unwrap().len(), 1);
}

#[test]
fn test_remove_rejected_while_same_identifier_is_being_added() {
    let (mut reconciler, pending, _) = reconciler();
    reconciler.install("com.owner.one").unwrap();

    let err = reconciler.request_remove("com.owner.one").unwrap_err();
    assert!(matches!(
        err,
        ReconcileError::OperationInProgress {
            kind: OperationKind::Add,
            ..
        }
    ));

    reconciler.request_remove("com.owner.two").unwrap();
    assert_eq!(pending.remove.lock().unwrap().len(), 1);
}

#[test]
fn test_install_unknown_package() {
    let (mut reconciler, pending, _) = reconciler();

    let err = reconciler.install("com.owner.missing").unwrap_err();

    assert!(matches!(err, ReconcileError::PackageNotFound(_)));
    assert!(pending.add.lock().unwrap().is_empty());
}

#[test]
fn test_slot_is_free_again_after_completion() {
    let (mut reconciler, pending, _) = reconciler();
    reconciler.install("com.owner.one").unwrap();
    pending.finish_add(Err("boom"));
    reconciler.tick();

    reconciler.install("com.owner.one").unwrap();
    assert_eq!(pending.add.lock().unwrap().len(), 1);
}

#[test]
fn test_dropped_backend_operation_is_a_failure() {
    let (mut reconciler, pending, _) = reconciler();
    reconciler.request_remove("com.owner.two").unwrap();
    drop(pending.remove.lock().unwrap().remove(0));

    let events = reconciler.tick();

    assert!(matches!(&events[..], [ReconcileEvent::Failed(_)]));
}

#[test]
fn test_list_persist_failure_rolls_back() {
    let (mut reconciler, pending, control) = reconciler();
    let before = reconciler.config().clone();
    control.fail_saves.store(true, Ordering::SeqCst);

    reconciler.request_refresh();
    pending.finish_list(&["com.owner.one"]);
    let events = reconciler.tick();

    assert!(matches!(
        &events[..],
        [ReconcileEvent::PersistFailed {
            kind: OperationKind::List,
            ..
        }]
    ));
    assert_eq!(reconciler.config(), &before);
}

#[test]
fn test_add_persist_failure_rolls_back_but_still_refreshes() {
    let (mut reconciler, pending, control) = reconciler();
    control.fail_saves.store(true, Ordering::SeqCst);

    reconciler.install("com.owner.one").unwrap();
    pending.finish_add(Ok(()));
    let events = reconciler.tick();

    assert_eq!(events.len(), 2);
    assert!(matches!(events[1], ReconcileEvent::PersistFailed { .. }));
    assert!(!reconciler.config().get("com.owner.one").unwrap().installed);
    assert_eq!(pending.lists_issued(), 1);
}

#[test]
fn test_update_config_commits_on_save() {
    let (mut reconciler, _, control) = reconciler();

    let moved = reconciler
        .update_config(|c| c.delete_category("Tools"))
        .unwrap();

    assert_eq!(moved, 2);
    assert!(!reconciler.config().categories().contains("Tools"));
    assert_eq!(control.saves.load(Ordering::SeqCst), 1);
}

#[test]
fn test_update_config_rolls_back_on_save_failure() {
    let (mut reconciler, _, control) = reconciler();
    let before = reconciler.config().clone();
    control.fail_saves.store(true, Ordering::SeqCst);

    let err = reconciler
        .update_config(|c| c.remove_package("com.owner.one"))
        .unwrap_err();

    assert!(matches!(err, ReconcileError::Persistence(_)));
    assert_eq!(reconciler.config(), &before);
}

#[test]
fn test_update_config_change_error_skips_save() {
    let (mut reconciler, _, control) = reconciler();

    let err = reconciler
        .update_config(|c| c.delete_category("All"))
        .unwrap_err();

    assert!(matches!(err, ReconcileError::Config(_)));
    assert_eq!(control.saves.load(Ordering::SeqCst), 0);
}

#[test]
fn test_pending_operation_bookkeeping() {
    let (mut reconciler, _, _) = reconciler();
    let id = reconciler.request_remove("com.owner.two").unwrap();

    let operation = reconciler.pending(OperationKind::Remove).unwrap();
    assert_eq!(operation.id, id);
    assert_eq!(operation.kind, OperationKind::Remove);
    assert_eq!(operation.target.as_deref(), Some("com.owner.two"));
    assert!(reconciler.pending(OperationKind::List).is_none());
}

#[tokio::test]
async fn test_run_until_idle_follows_add_with_list() {
    let (mut reconciler, pending, _) = reconciler();
    reconciler.install("com.owner.one").unwrap();

    let driver = pending.clone();
    let finisher = tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(10)).await;
        driver.finish_add(Ok(()));
        while driver.lists_issued() == 0 {
            tokio::time::sleep(Duration::from_millis(2)).await;
        }
        driver.finish_list(&["com.owner.one", "com.owner.two"]);
    });

    let events = tokio::time::timeout(
        Duration::from_secs(5),
        reconciler.run_until_idle(Duration::from_millis(2)),
    )
    .await
    .unwrap();
    finisher.await.unwrap();

    assert_eq!(events.len(), 2);
    assert!(matches!(events[0], ReconcileEvent::Added { .. }));
    assert!(matches!(events[1], ReconcileEvent::Refreshed { installed: 2, .. }));
    assert!(reconciler.is_idle());
}

#[tokio::test]
async fn test_run_until_idle_into_keeps_events_when_cancelled() {
    let (mut reconciler, pending, _) = reconciler();
    reconciler.install("com.owner.one").unwrap();
    pending.finish_add(Ok(()));

    let mut events = Vec::new();
    let outcome = tokio::time::timeout(
        Duration::from_millis(50),
        reconciler.run_until_idle_into(Duration::from_millis(1), &mut events),
    )
    .await;

    assert!(outcome.is_err());
    assert_eq!(events, vec![ReconcileEvent::Added {
        identifier: "com.owner.one".to_string()
    }]);
    assert!(reconciler.pending(OperationKind::List).is_some());
}
