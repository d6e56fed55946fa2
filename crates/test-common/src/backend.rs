//! Scripted backend for reconciler integration tests.

use std::{
    collections::{BTreeSet, VecDeque},
    sync::{Arc, Mutex, MutexGuard},
};

use gitdeps::backend::{AddRequest, Completer, OperationHandle, PackageBackend};

#[derive(Debug, Default)]
struct Script {
    adds: VecDeque<(AddRequest, Completer<String>)>,
    removes: VecDeque<(String, Completer<()>)>,
    lists: VecDeque<Completer<BTreeSet<String>>>,
    add_requests: Vec<AddRequest>,
    remove_requests: Vec<String>,
    lists_issued: usize,
}

/// A [`PackageBackend`] whose operations stay pending until the test
/// finishes them.
///
/// Clones share state: give one to the reconciler and drive it through the
/// other.
#[derive(Debug, Clone, Default)]
pub struct ScriptedBackend {
    script: Arc<Mutex<Script>>,
}

impl ScriptedBackend {
    fn script(&self) -> MutexGuard<'_, Script> {
        self.script.lock().unwrap()
    }

    /// Every add request received so far
    #[must_use]
    pub fn add_requests(&self) -> Vec<AddRequest> {
        self.script().add_requests.clone()
    }

    #[must_use]
    pub fn remove_requests(&self) -> Vec<String> {
        self.script().remove_requests.clone()
    }

    #[must_use]
    pub fn lists_issued(&self) -> usize {
        self.script().lists_issued
    }

    /// Complete the oldest pending add. Returns false if none was pending.
    pub fn finish_add(&self, outcome: Result<String, String>) -> bool {
        let next = self.script().adds.pop_front();
        next.map(|(_, completer)| completer.finish(outcome))
            .is_some()
    }

    /// Complete the oldest pending remove. Returns false if none was pending.
    pub fn finish_remove(&self, outcome: Result<(), String>) -> bool {
        let next = self.script().removes.pop_front();
        next.map(|(_, completer)| completer.finish(outcome))
            .is_some()
    }

    /// Complete the oldest pending list with `installed`.
    pub fn finish_list(&self, installed: &[&str]) -> bool {
        let set = installed.iter().map(|s| (*s).to_string()).collect();
        let next = self.script().lists.pop_front();
        next.map(|completer| completer.succeed(set)).is_some()
    }

    pub fn fail_list(&self, message: &str) -> bool {
        let next = self.script().lists.pop_front();
        next.map(|completer| completer.fail(message)).is_some()
    }

    /// Drop every pending completer, as a crashed backend would
    pub fn abandon_all(&self) {
        let mut script = self.script();
        script.adds.clear();
        script.removes.clear();
        script.lists.clear();
    }
}

impl PackageBackend for ScriptedBackend {
    fn add(&self, request: &AddRequest) -> OperationHandle<String> {
        let (completer, handle) = OperationHandle::channel();
        let mut script = self.script();
        script.add_requests.push(request.clone());
        script.adds.push_back((request.clone(), completer));
        handle
    }

    fn remove(&self, identifier: &str) -> OperationHandle<()> {
        let (completer, handle) = OperationHandle::channel();
        let mut script = self.script();
        script.remove_requests.push(identifier.to_string());
        script.removes.push_back((identifier.to_string(), completer));
        handle
    }

    fn list(&self) -> OperationHandle<BTreeSet<String>> {
        let (completer, handle) = OperationHandle::channel();
        let mut script = self.script();
        script.lists_issued += 1;
        script.lists.push_back(completer);
        handle
    }
}
