//! Per-correlation-id accumulation state.

use serde_json::Value;
use tokio::sync::watch;

use crate::status::{Outcome, ResponseError};

/// Completion state published to waiting callers.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(super) enum Completion {
    Pending,
    Succeeded,
    Failed(ResponseError),
}

impl Completion {
    pub(super) fn is_terminal(&self) -> bool { !matches!(self, Self::Pending) }

    /// Outcome reported to waiters once terminal.
    pub(super) fn outcome(&self) -> Option<Outcome> {
        match self {
            Self::Pending => None,
            Self::Succeeded => Some(Outcome::Success),
            Self::Failed(error) => Some(Outcome::Failure(error.clone())),
        }
    }
}

/// Accumulated payload and completion signal for one correlation id.
///
/// `accumulated` only grows until the entry is removed. The completion
/// channel moves from `Pending` to a terminal value at most once.
#[derive(Debug)]
pub(super) struct AggregationEntry {
    accumulated: Vec<Value>,
    completion: watch::Sender<Completion>,
}

impl AggregationEntry {
    pub(super) fn new() -> Self {
        let (completion, _) = watch::channel(Completion::Pending);
        Self {
            accumulated: Vec::new(),
            completion,
        }
    }

    pub(super) fn is_complete(&self) -> bool { self.completion.borrow().is_terminal() }

    /// Completed by giving up on the request rather than by a response.
    pub(super) fn is_abandoned(&self) -> bool {
        matches!(&*self.completion.borrow(), Completion::Failed(error) if error.is_abandoned())
    }

    pub(super) fn last_error(&self) -> Option<ResponseError> {
        match &*self.completion.borrow() {
            Completion::Failed(error) => Some(error.clone()),
            Completion::Pending | Completion::Succeeded => None,
        }
    }

    pub(super) fn snapshot(&self) -> Vec<Value> { self.accumulated.clone() }

    pub(super) fn subscribe(&self) -> watch::Receiver<Completion> { self.completion.subscribe() }

    /// Append `payload` and publish `next` if it is terminal.
    ///
    /// Callers must check [`is_complete`](Self::is_complete) first.
    pub(super) fn apply(&mut self, payload: Vec<Value>, next: Completion) -> bool {
        self.accumulated.extend(payload);
        if next.is_terminal() {
            self.completion.send_replace(next);
            true
        } else {
            false
        }
    }

    /// Publish a terminal failure without touching the payload.
    pub(super) fn fail(&self, error: ResponseError) {
        self.completion.send_replace(Completion::Failed(error));
    }
}

/// Map slot: a live entry, or a tombstone for an id deleted while pending.
#[derive(Debug)]
pub(super) enum Slot {
    Live(AggregationEntry),
    Abandoned,
}

impl Slot {
    pub(super) fn live(&self) -> Option<&AggregationEntry> {
        match self {
            Self::Live(entry) => Some(entry),
            Self::Abandoned => None,
        }
    }

    pub(super) fn live_mut(&mut self) -> Option<&mut AggregationEntry> {
        match self {
            Self::Live(entry) => Some(entry),
            Self::Abandoned => None,
        }
    }
}
