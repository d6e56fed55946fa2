//! Installation reconciler
//!
//! [`InstallationReconciler`] owns the loaded [`PackageConfig`], issues
//! add/remove/list operations against a [`PackageBackend`] and, on each
//! [`tick`](InstallationReconciler::tick), folds completed operations back
//! into the store. The cached `installed` flags only ever change in response
//! to a successful backend operation, and every store change is persisted
//! before it is kept in memory.
//!
//! There is one slot per operation kind. A slot holds at most one pending
//! operation; asking for a second add or remove while one is pending is
//! rejected, while a second list is coalesced into the pending one. A list
//! that was issued before an add or remove completed is stale: its answer is
//! discarded and a fresh list is issued in its place.

#[cfg(test)]
mod tests;

use std::{
    collections::BTreeSet,
    mem,
    time::{Duration, Instant},
};

use thiserror::Error;
use tracing::{debug, error, info, instrument, warn};

use crate::{
    backend::{AddRequest, OperationHandle, OperationId, OperationKind, PackageBackend},
    package::{
        PackageConfig, PackageConfigError,
        port::{PackageStore, StoreError},
    },
};

#[derive(Error, Debug, Clone)]
pub enum ReconcileError {
    #[error("A {kind} operation for `{identifier}` is already in progress")]
    OperationInProgress {
        kind: OperationKind,
        identifier: String,
    },

    #[error("Package `{0}` is not in the store")]
    PackageNotFound(String),

    #[error("Change was not saved: {0}")]
    Persistence(#[source] StoreError),

    #[error(transparent)]
    Config(#[from] PackageConfigError),
}

/// A backend operation that completed with an error
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{kind} {} failed: {message}", .identifier.as_deref().unwrap_or("packages"))]
pub struct BackendFailure {
    pub kind: OperationKind,

    /// Absent for list operations
    pub identifier: Option<String>,

    pub message: String,
}

/// What a tick observed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReconcileEvent {
    Added {
        identifier: String,
    },
    Removed {
        identifier: String,
    },
    Refreshed {
        installed: usize,
        /// Stored packages whose `installed` flag flipped
        changed: Vec<String>,
    },
    Failed(BackendFailure),
    PersistFailed {
        kind: OperationKind,
        message: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshRequest {
    Issued(OperationId),
    /// A list was already pending
    Coalesced,
}

/// Bookkeeping for an issued operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingOperation {
    pub id: OperationId,
    pub kind: OperationKind,
    pub target: Option<String>,
    pub issued_at: Instant,
}

#[derive(Debug)]
struct Slot<T> {
    operation: PendingOperation,
    handle: OperationHandle<T>,
}

impl<T> Slot<T> {
    fn issue(kind: OperationKind, target: Option<String>, handle: OperationHandle<T>) -> Self {
        Self {
            operation: PendingOperation {
                id: OperationId::new(),
                kind,
                target,
                issued_at: Instant::now(),
            },
            handle,
        }
    }
}

/// Completed slot, taken out of the reconciler
struct Completed<T> {
    operation: PendingOperation,
    outcome: Result<T, String>,
}

/// Take the slot's outcome if its operation has finished
fn take_completed<T>(slot: &mut Option<Slot<T>>) -> Option<Completed<T>> {
    let outcome = slot.as_mut()?.handle.take_outcome()?;
    let operation = slot.take()?.operation;
    Some(Completed { operation, outcome })
}

#[derive(Debug)]
pub struct InstallationReconciler<S, B> {
    store: S,
    backend: B,
    config: PackageConfig,
    installed: BTreeSet<String>,
    add: Option<Slot<String>>,
    remove: Option<Slot<()>>,
    list: Option<Slot<BTreeSet<String>>>,
    /// The pending list predates the last completed add or remove
    refresh_again: bool,
}

impl<S, B> InstallationReconciler<S, B>
where
    S: PackageStore,
    B: PackageBackend,
{
    /// Load the store and start with every slot idle.
    ///
    /// Until the first list completes, the installed view is taken from the
    /// cached flags.
    ///
    /// # Errors
    ///
    /// Returns [`ReconcileError::Persistence`] if the store cannot be loaded.
    pub fn new(store: S, backend: B) -> Result<Self, ReconcileError> {
        let config = store.load().map_err(ReconcileError::Persistence)?;
        let installed = config
            .packages()
            .iter()
            .filter(|p| p.installed)
            .map(|p| p.identifier.clone())
            .collect();

        Ok(Self {
            store,
            backend,
            config,
            installed,
            add: None,
            remove: None,
            list: None,
            refresh_again: false,
        })
    }

    #[must_use]
    pub fn config(&self) -> &PackageConfig {
        &self.config
    }

    /// Identifiers the backend last reported as installed
    #[must_use]
    pub fn installed_identifiers(&self) -> &BTreeSet<String> {
        &self.installed
    }

    #[must_use]
    pub fn is_idle(&self) -> bool {
        self.add.is_none() && self.remove.is_none() && self.list.is_none()
    }

    #[must_use]
    pub fn pending(&self, kind: OperationKind) -> Option<&PendingOperation> {
        match kind {
            OperationKind::Add => self.add.as_ref().map(|s| &s.operation),
            OperationKind::Remove => self.remove.as_ref().map(|s| &s.operation),
            OperationKind::List => self.list.as_ref().map(|s| &s.operation),
        }
    }

    /// Ask the backend for the installed set, unless a list is already
    /// pending.
    #[instrument(skip(self))]
    pub fn request_refresh(&mut self) -> RefreshRequest {
        if let Some(slot) = &self.list {
            debug!(id = %slot.operation.id, "list already pending, coalescing");
            return RefreshRequest::Coalesced;
        }

        let slot = Slot::issue(OperationKind::List, None, self.backend.list());
        let id = slot.operation.id;
        debug!(%id, "issued list");
        self.list = Some(slot);
        RefreshRequest::Issued(id)
    }

    /// Issue an add for an arbitrary request.
    ///
    /// # Errors
    ///
    /// Returns [`ReconcileError::OperationInProgress`] if an add is pending or
    /// the identifier has a remove pending.
    #[instrument(skip_all, fields(identifier = %request.identifier))]
    pub fn request_add(&mut self, request: AddRequest) -> Result<OperationId, ReconcileError> {
        self.ensure_free(OperationKind::Add, &request.identifier)?;

        let handle = self.backend.add(&request);
        let slot = Slot::issue(OperationKind::Add, Some(request.identifier), handle);
        let id = slot.operation.id;
        info!(%id, specifier = %request.specifier, revision = %request.revision, "issued add");
        self.add = Some(slot);
        Ok(id)
    }

    /// Issue an add for a package already in the store.
    ///
    /// # Errors
    ///
    /// Returns [`ReconcileError::PackageNotFound`] for an unknown identifier,
    /// otherwise see [`request_add`](Self::request_add).
    pub fn install(&mut self, identifier: &str) -> Result<OperationId, ReconcileError> {
        let request = self
            .config
            .get(identifier)
            .map(AddRequest::from_descriptor)
            .ok_or_else(|| ReconcileError::PackageNotFound(identifier.to_string()))?;

        self.request_add(request)
    }

    /// Issue a remove. The identifier does not have to be in the store.
    ///
    /// # Errors
    ///
    /// Returns [`ReconcileError::OperationInProgress`] if a remove is pending
    /// or the identifier has an add pending.
    #[instrument(skip(self))]
    pub fn request_remove(&mut self, identifier: &str) -> Result<OperationId, ReconcileError> {
        self.ensure_free(OperationKind::Remove, identifier)?;

        let slot = Slot::issue(
            OperationKind::Remove,
            Some(identifier.to_string()),
            self.backend.remove(identifier),
        );
        let id = slot.operation.id;
        info!(%id, "issued remove");
        self.remove = Some(slot);
        Ok(id)
    }

    fn ensure_free(&self, kind: OperationKind, identifier: &str) -> Result<(), ReconcileError> {
        let busy = |operation: &PendingOperation| ReconcileError::OperationInProgress {
            kind: operation.kind,
            identifier: operation.target.clone().unwrap_or_default(),
        };

        let other_kind = match kind {
            OperationKind::Add => OperationKind::Remove,
            OperationKind::Remove => OperationKind::Add,
            OperationKind::List => return Ok(()),
        };
        let own = self.pending(kind);
        let other = self.pending(other_kind);

        if let Some(operation) = own {
            warn!(%kind, %identifier, pending = ?operation.target, "slot busy");
            return Err(busy(operation));
        }

        if let Some(operation) = other.filter(|op| op.target.as_deref() == Some(identifier)) {
            warn!(%kind, %identifier, "identifier has a conflicting operation pending");
            return Err(busy(operation));
        }

        Ok(())
    }

    /// Fold every completed operation into the store. Never waits.
    ///
    /// Slots are processed in add, remove, list order.
    #[instrument(skip(self))]
    pub fn tick(&mut self) -> Vec<ReconcileEvent> {
        let mut events = Vec::new();

        if let Some(completed) = take_completed(&mut self.add) {
            self.complete_add(completed, &mut events);
        }
        if let Some(completed) = take_completed(&mut self.remove) {
            self.complete_remove(completed, &mut events);
        }
        if let Some(completed) = take_completed(&mut self.list) {
            self.complete_list(completed, &mut events);
        }

        events
    }

    fn complete_add(&mut self, completed: Completed<String>, events: &mut Vec<ReconcileEvent>) {
        let Completed { operation, outcome } = completed;
        let identifier = operation.target.clone().unwrap_or_default();
        let elapsed = operation.issued_at.elapsed();

        match outcome {
            Ok(installed_as) => {
                info!(%identifier, %installed_as, ?elapsed, "add succeeded");
                self.installed.insert(identifier.clone());
                events.push(ReconcileEvent::Added {
                    identifier: identifier.clone(),
                });

                if self.config.contains(&identifier) {
                    let mut next = self.config.clone();
                    next.set_installed(&identifier, true);
                    if let Err(e) = self.persist(next) {
                        events.push(persist_failed(OperationKind::Add, &e));
                    }
                }

                self.refresh_after_change();
            }
            Err(message) => events.push(backend_failed(operation, message)),
        }
    }

    fn complete_remove(&mut self, completed: Completed<()>, events: &mut Vec<ReconcileEvent>) {
        let Completed { operation, outcome } = completed;

        match outcome {
            Ok(()) => {
                let identifier = operation.target.unwrap_or_default();
                info!(%identifier, elapsed = ?operation.issued_at.elapsed(), "remove succeeded");
                events.push(ReconcileEvent::Removed { identifier });
                self.refresh_after_change();
            }
            Err(message) => events.push(backend_failed(operation, message)),
        }
    }

    /// Follow an add or remove with a list issued after it
    fn refresh_after_change(&mut self) {
        if self.list.is_some() {
            debug!("pending list predates this change, will list again");
            self.refresh_again = true;
        } else {
            self.request_refresh();
        }
    }

    fn complete_list(
        &mut self,
        completed: Completed<BTreeSet<String>>,
        events: &mut Vec<ReconcileEvent>,
    ) {
        let Completed { operation, outcome } = completed;

        if mem::take(&mut self.refresh_again) {
            debug!(id = %operation.id, ok = outcome.is_ok(), "discarding stale list");
            self.request_refresh();
            return;
        }

        match outcome {
            Ok(installed) => {
                let changed: Vec<String> = self
                    .config
                    .packages()
                    .iter()
                    .filter(|p| p.installed != installed.contains(&p.identifier))
                    .map(|p| p.identifier.clone())
                    .collect();
                debug!(
                    installed = installed.len(),
                    changed = changed.len(),
                    elapsed = ?operation.issued_at.elapsed(),
                    "list succeeded"
                );

                let mut next = self.config.clone();
                next.reconcile_installed(&installed);
                let count = installed.len();
                self.installed = installed;

                match self.persist(next) {
                    Ok(()) => events.push(ReconcileEvent::Refreshed {
                        installed: count,
                        changed,
                    }),
                    Err(e) => events.push(persist_failed(OperationKind::List, &e)),
                }
            }
            Err(message) => events.push(backend_failed(operation, message)),
        }
    }

    /// Apply a change to a copy of the store, save it and keep it only if the
    /// save succeeded.
    ///
    /// # Errors
    ///
    /// Returns [`ReconcileError::Config`] if `change` fails and
    /// [`ReconcileError::Persistence`] if the save fails. Either way the
    /// in-memory store is unchanged.
    #[instrument(skip_all)]
    pub fn update_config<R, F>(&mut self, change: F) -> Result<R, ReconcileError>
    where
        F: FnOnce(&mut PackageConfig) -> Result<R, PackageConfigError>,
    {
        let mut next = self.config.clone();
        let value = change(&mut next)?;
        self.persist(next).map_err(ReconcileError::Persistence)?;
        Ok(value)
    }

    fn persist(&mut self, next: PackageConfig) -> Result<(), StoreError> {
        match self.store.save(&next) {
            Ok(()) => {
                let previous = mem::replace(&mut self.config, next);
                debug!(
                    before = previous.packages().len(),
                    after = self.config.packages().len(),
                    "store saved"
                );
                Ok(())
            }
            Err(e) => {
                error!(error = %e, "store save failed, keeping previous state");
                Err(e)
            }
        }
    }

    /// Tick every `interval` until all slots are idle, collecting events.
    ///
    /// There is no timeout here; wrap the call in `tokio::time::timeout`.
    pub async fn run_until_idle(&mut self, interval: Duration) -> Vec<ReconcileEvent> {
        let mut events = Vec::new();
        self.run_until_idle_into(interval, &mut events).await;
        events
    }

    /// Like [`run_until_idle`](Self::run_until_idle), but appends to a
    /// caller-owned buffer so events survive the future being dropped.
    pub async fn run_until_idle_into(
        &mut self,
        interval: Duration,
        events: &mut Vec<ReconcileEvent>,
    ) {
        let mut ticker = tokio::time::interval(interval.max(Duration::from_millis(1)));

        while !self.is_idle() {
            ticker.tick().await;
            events.extend(self.tick());
        }
    }
}

fn backend_failed(operation: PendingOperation, message: String) -> ReconcileEvent {
    let failure = BackendFailure {
        kind: operation.kind,
        identifier: operation.target,
        message,
    };
    warn!(%failure, "backend operation failed");
    ReconcileEvent::Failed(failure)
}

fn persist_failed(kind: OperationKind, error: &StoreError) -> ReconcileEvent {
    ReconcileEvent::PersistFailed {
        kind,
        message: error.to_string(),
    }
}
