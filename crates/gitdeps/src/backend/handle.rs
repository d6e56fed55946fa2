//! Fire-and-poll operation handles
//!
//! A backend creates a ([`Completer`], [`OperationHandle`]) pair, hands the
//! handle back to its caller and finishes the completer whenever the work is
//! done. Polling the handle never blocks. A completer that is dropped without
//! finishing counts as a failure.

use std::fmt;

use futures::FutureExt;
use tokio::sync::oneshot;
use uuid::Uuid;

const DROPPED_MESSAGE: &str = "backend dropped the operation without completing it";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationKind {
    Add,
    Remove,
    List,
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Add => f.write_str("add"),
            Self::Remove => f.write_str("remove"),
            Self::List => f.write_str("list"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompletionStatus {
    Succeeded,
    Failed,
}

/// Identifies one issued operation in logs and events
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OperationId(Uuid);

impl OperationId {
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for OperationId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for OperationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

type Outcome<T> = Result<T, String>;

/// Caller side of a backend operation
#[derive(Debug)]
pub struct OperationHandle<T> {
    receiver: Option<oneshot::Receiver<Outcome<T>>>,
    outcome: Option<Outcome<T>>,
}

/// Backend side of a backend operation
#[derive(Debug)]
pub struct Completer<T> {
    sender: oneshot::Sender<Outcome<T>>,
}

impl<T> OperationHandle<T> {
    /// A pending handle and the completer that finishes it
    #[must_use]
    pub fn channel() -> (Completer<T>, Self) {
        let (sender, receiver) = oneshot::channel();
        (
            Completer { sender },
            Self {
                receiver: Some(receiver),
                outcome: None,
            },
        )
    }

    /// A handle that is already complete, for backends that answer at once
    #[must_use]
    pub fn completed(outcome: Result<T, String>) -> Self {
        Self {
            receiver: None,
            outcome: Some(outcome),
        }
    }

    fn poll(&mut self) {
        if self.outcome.is_some() {
            return;
        }

        let Some(receiver) = self.receiver.as_mut() else {
            return;
        };

        match receiver.now_or_never() {
            None => {}
            Some(Ok(outcome)) => {
                self.outcome = Some(outcome);
                self.receiver = None;
            }
            Some(Err(_)) => {
                self.outcome = Some(Err(DROPPED_MESSAGE.to_string()));
                self.receiver = None;
            }
        }
    }

    pub fn is_complete(&mut self) -> bool {
        self.poll();
        self.outcome.is_some()
    }

    /// `None` while pending (or after the outcome was taken)
    pub fn status(&mut self) -> Option<CompletionStatus> {
        self.poll();
        self.outcome.as_ref().map(|outcome| match outcome {
            Ok(_) => CompletionStatus::Succeeded,
            Err(_) => CompletionStatus::Failed,
        })
    }

    pub fn result(&mut self) -> Option<&T> {
        self.poll();
        self.outcome.as_ref().and_then(|o| o.as_ref().ok())
    }

    pub fn error(&mut self) -> Option<&str> {
        self.poll();
        self.outcome
            .as_ref()
            .and_then(|o| o.as_ref().err())
            .map(String::as_str)
    }

    /// Move the outcome out once the operation is complete.
    pub fn take_outcome(&mut self) -> Option<Result<T, String>> {
        self.poll();
        self.outcome.take()
    }
}

impl<T> Completer<T> {
    pub fn succeed(self, value: T) {
        self.finish(Ok(value));
    }

    pub fn fail(self, message: impl Into<String>) {
        self.finish(Err(message.into()));
    }

    pub fn finish(self, outcome: Result<T, String>) {
        if self.sender.send(outcome).is_err() {
            tracing::debug!("operation handle dropped before completion");
        }
    }
}
