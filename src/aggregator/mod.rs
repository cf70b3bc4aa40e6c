//! Per-connection accumulation of response payloads.
//!
//! [`ResponseAggregator`] maps each [`CorrelationId`] to the ordered payload
//! received for it so far and to its completion state. Entries move through
//! `Absent → Pending → Complete`:
//!
//! - the first save, failure or waiter for an unseen id creates a `Pending`
//!   entry;
//! - partial responses append while the entry stays `Pending`;
//! - the first terminal success or failure marks it `Complete`;
//! - only [`ResponseAggregator::delete_response`] returns it to `Absent`.
//!
//! The map is a [`DashMap`], so operations on different ids only contend on
//! a shard lock for the duration of the mutation. No lock is held across an
//! `.await`: waiters subscribe to the entry's completion channel under the
//! shard lock and then wait on the channel alone.
//!
//! An entry deleted while still `Pending` leaves a tombstone in its slot.
//! Late messages for that id are discarded instead of recreating the entry,
//! and the tombstone is cleared by the id's terminal message or by
//! [`ResponseAggregator::drain_all_as_failed`]. Entries completed by
//! abandonment (timeout, drain, [`ResponseAggregator::abandon`]) discard
//! late messages in the same way.
//!
//! Draining closes the aggregator: it belongs to one connection, and once
//! that connection is gone unseen ids fail immediately instead of creating
//! entries nothing would complete.

mod entry;
mod error;

use std::{sync::OnceLock, time::Duration};

use dashmap::{DashMap, mapref::entry::Entry};
use log::{debug, info, warn};
use serde_json::Value;
use tokio::sync::watch;

use self::entry::{AggregationEntry, Completion, Slot};
pub use self::error::ProtocolViolation;
use crate::{
    correlation::CorrelationId,
    decode::ResponseRecord,
    status::{AbandonReason, Outcome, ResponseError},
};

/// Result of a successful save.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Saved {
    /// The entry accepted the payload and awaits further messages.
    Pending,
    /// The entry reached its terminal state.
    Complete,
    /// The request was abandoned, or the aggregator closed; the message was dropped.
    Discarded,
}

/// Observable state of a correlation id.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EntryState {
    /// No entry exists.
    Absent,
    /// The entry exists and has not completed.
    Pending,
    /// The entry has completed and awaits deletion by its caller.
    Complete,
}

/// Concurrent store of in-flight and completed responses for one connection.
///
/// # Examples
///
/// ```
/// use gremwire::{
///     aggregator::ResponseAggregator,
///     correlation::CorrelationId,
///     decode::{ResponseRecord, ResponseStatus},
///     status::{Outcome, StatusCode},
/// };
/// use serde_json::json;
///
/// let aggregator = ResponseAggregator::new();
/// let id = CorrelationId::from("r1");
/// let record = ResponseRecord::new(
///     id.clone(),
///     ResponseStatus::new(StatusCode::PARTIAL_CONTENT),
///     vec![json!(1)],
/// );
///
/// aggregator
///     .save_response(record, Outcome::SuccessPartial)
///     .expect("entry is still pending");
/// assert_eq!(aggregator.retrieve_response(&id), vec![json!(1)]);
/// aggregator.delete_response(&id);
/// assert!(aggregator.retrieve_response(&id).is_empty());
/// ```
#[derive(Debug, Default)]
pub struct ResponseAggregator {
    slots: DashMap<CorrelationId, Slot>,
    closed: OnceLock<AbandonReason>,
}

impl ResponseAggregator {
    /// Create an empty aggregator.
    #[must_use]
    pub fn new() -> Self { Self::default() }

    /// Record one classified response.
    ///
    /// Success and partial outcomes append the record's payload; a failure
    /// records the error without appending. Success and failure both mark
    /// the entry complete.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolViolation`] if the entry had already completed with
    /// a response. The entry is left unchanged. Messages for abandoned or
    /// deleted ids, and for unseen ids once the aggregator is closed, are
    /// dropped with [`Saved::Discarded`] instead.
    pub fn save_response(
        &self,
        record: ResponseRecord,
        outcome: Outcome,
    ) -> Result<Saved, ProtocolViolation> {
        let label = outcome.label();
        let (id, payload) = record.into_parts();
        let elements = payload.len();
        let result = match outcome {
            Outcome::Success => self.apply(&id, payload, Completion::Succeeded, label),
            Outcome::SuccessPartial => self.apply(&id, payload, Completion::Pending, label),
            Outcome::Failure(error) => {
                self.apply(&id, Vec::new(), Completion::Failed(error), label)
            }
        };
        if matches!(result, Ok(Saved::Pending | Saved::Complete)) {
            crate::metrics::inc_responses(label);
            tracing::debug!(
                correlation_id = %id,
                outcome = label,
                elements,
                "response saved"
            );
        }
        result
    }

    /// Mark `id` complete with `error`, creating the entry if needed.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolViolation`] if the entry had already completed with a response.
    pub fn record_failure(
        &self,
        id: &CorrelationId,
        error: ResponseError,
    ) -> Result<Saved, ProtocolViolation> {
        self.apply(id, Vec::new(), Completion::Failed(error), "failure")
    }

    fn apply(
        &self,
        id: &CorrelationId,
        payload: Vec<Value>,
        next: Completion,
        label: &'static str,
    ) -> Result<Saved, ProtocolViolation> {
        let terminal = next.is_terminal();
        let result = match self.slots.entry(id.clone()) {
            Entry::Vacant(_) if self.closed.get().is_some() => Ok(Saved::Discarded),
            Entry::Vacant(vacant) => {
                let mut entry = AggregationEntry::new();
                let saved = saved_from(entry.apply(payload, next));
                vacant.insert(Slot::Live(entry));
                Ok(saved)
            }
            Entry::Occupied(occupied) if matches!(occupied.get(), Slot::Abandoned) => {
                if terminal {
                    occupied.remove();
                }
                Ok(Saved::Discarded)
            }
            Entry::Occupied(mut occupied) => match occupied.get_mut().live_mut() {
                Some(entry) if !entry.is_complete() => {
                    Ok(saved_from(entry.apply(payload, next)))
                }
                Some(entry) if entry.is_abandoned() => Ok(Saved::Discarded),
                _ => Err(ProtocolViolation::new(id.clone(), label)),
            },
        };

        match &result {
            Err(violation) => {
                warn!("protocol violation: {violation}, correlation_id={id}, outcome={label}");
                crate::metrics::inc_protocol_violations();
            }
            Ok(Saved::Discarded) => {
                debug!(
                    "discarded response for abandoned request: correlation_id={id}, \
                     outcome={label}"
                );
            }
            Ok(_) => {}
        }
        result
    }

    /// Snapshot of the payload accumulated for `id`.
    ///
    /// Returns an empty vector for unknown ids. This neither blocks nor
    /// implies that the entry has completed.
    #[must_use]
    pub fn retrieve_response(&self, id: &CorrelationId) -> Vec<Value> {
        self.slots
            .get(id)
            .and_then(|slot| slot.live().map(AggregationEntry::snapshot))
            .unwrap_or_default()
    }

    /// Wait until `id` completes.
    ///
    /// Resolves with [`Outcome::Success`] or [`Outcome::Failure`]; never with
    /// [`Outcome::SuccessPartial`]. An id with no entry yet is registered as
    /// pending so callers may start waiting before the first response
    /// arrives. Deleting the entry or draining the aggregator resolves the
    /// wait with an abandoned failure.
    pub async fn await_completion(&self, id: &CorrelationId) -> Outcome {
        match self.subscribe(id) {
            Ok(mut receiver) => wait_terminal(&mut receiver).await,
            Err(reason) => abandoned(reason),
        }
    }

    /// Wait until `id` completes or `timeout` elapses.
    ///
    /// On expiry the id is abandoned with [`AbandonReason::TimedOut`] and that
    /// failure is returned, unless the entry completed in the meantime.
    pub async fn await_completion_timeout(
        &self,
        id: &CorrelationId,
        timeout: Duration,
    ) -> Outcome {
        let mut receiver = match self.subscribe(id) {
            Ok(receiver) => receiver,
            Err(reason) => return abandoned(reason),
        };
        if let Ok(outcome) = tokio::time::timeout(timeout, wait_terminal(&mut receiver)).await {
            return outcome;
        }

        self.abandon(id, AbandonReason::TimedOut);
        let outcome = receiver.borrow().outcome();
        outcome.unwrap_or_else(|| abandoned(AbandonReason::TimedOut))
    }

    fn subscribe(
        &self,
        id: &CorrelationId,
    ) -> Result<watch::Receiver<Completion>, AbandonReason> {
        match self.slots.entry(id.clone()) {
            Entry::Occupied(occupied) => occupied
                .get()
                .live()
                .map(AggregationEntry::subscribe)
                .ok_or(AbandonReason::Deleted),
            Entry::Vacant(vacant) => {
                if let Some(reason) = self.closed.get() {
                    return Err(reason.clone());
                }
                let entry = AggregationEntry::new();
                let receiver = entry.subscribe();
                vacant.insert(Slot::Live(entry));
                Ok(receiver)
            }
        }
    }

    /// Remove the entry for `id`.
    ///
    /// Deleting an unknown id is a no-op. Deleting a pending entry releases
    /// its waiters with [`AbandonReason::Deleted`] and leaves a tombstone so
    /// that late messages for the id are discarded.
    pub fn delete_response(&self, id: &CorrelationId) {
        let Entry::Occupied(mut occupied) = self.slots.entry(id.clone()) else {
            return;
        };
        if matches!(occupied.get(), Slot::Abandoned) {
            return;
        }
        if occupied.get().live().is_some_and(AggregationEntry::is_complete) {
            occupied.remove();
            return;
        }
        if let Slot::Live(entry) = std::mem::replace(occupied.get_mut(), Slot::Abandoned) {
            entry.fail(ResponseError::abandoned(AbandonReason::Deleted));
        }
        drop(occupied);
        crate::metrics::inc_abandoned(1);
        debug!("deleted pending request: correlation_id={id}");
    }

    /// Force a pending `id` to complete with an abandoned failure.
    ///
    /// Returns `true` if the entry transitioned. Unknown and already complete
    /// ids are left untouched.
    pub fn abandon(&self, id: &CorrelationId, reason: AbandonReason) -> bool {
        let Some(mut slot) = self.slots.get_mut(id) else {
            return false;
        };
        let Some(entry) = slot.live_mut().filter(|entry| !entry.is_complete()) else {
            return false;
        };
        entry.fail(ResponseError::abandoned(reason));
        drop(slot);
        crate::metrics::inc_abandoned(1);
        debug!("abandoned pending request: correlation_id={id}");
        true
    }

    /// Complete every pending entry with an abandoned failure.
    ///
    /// Invoked once per connection-loss event. Waiters for the drained ids
    /// are released. Completed entries stay until their callers delete them;
    /// tombstones are cleared since no further messages will arrive. Returns
    /// the number of entries drained.
    ///
    /// The aggregator is closed afterwards: waits on unseen ids resolve at
    /// once with the first drain's reason, and messages for unseen ids are
    /// discarded.
    pub fn drain_all_as_failed(&self, reason: AbandonReason) -> usize {
        // Closing before the sweep means an entry inserted concurrently is
        // either visited by `retain` or refused by the closed check.
        let _ = self.closed.set(reason.clone());
        let mut drained = 0usize;
        self.slots.retain(|_, slot| match slot.live() {
            Some(entry) => {
                if !entry.is_complete() {
                    entry.fail(ResponseError::abandoned(reason.clone()));
                    drained += 1;
                }
                true
            }
            None => false,
        });
        crate::metrics::inc_abandoned(drained as u64);
        info!("drained pending responses: count={drained}, reason={reason}");
        drained
    }

    /// Returns `true` once [`drain_all_as_failed`](Self::drain_all_as_failed)
    /// has run.
    #[must_use]
    pub fn is_closed(&self) -> bool { self.closed.get().is_some() }

    /// Current state of `id`.
    #[must_use]
    pub fn state(&self, id: &CorrelationId) -> EntryState {
        match self.slots.get(id).as_deref().and_then(Slot::live) {
            Some(entry) if entry.is_complete() => EntryState::Complete,
            Some(_) => EntryState::Pending,
            None => EntryState::Absent,
        }
    }

    /// Failure recorded for `id`, if it completed with one.
    #[must_use]
    pub fn last_error(&self, id: &CorrelationId) -> Option<ResponseError> {
        self.slots
            .get(id)
            .and_then(|slot| slot.live().and_then(AggregationEntry::last_error))
    }

    /// Identifiers of all entries that have not completed.
    #[must_use]
    pub fn pending_ids(&self) -> Vec<CorrelationId> {
        self.slots
            .iter()
            .filter(|slot| slot.value().live().is_some_and(|entry| !entry.is_complete()))
            .map(|slot| slot.key().clone())
            .collect()
    }

    /// Identifiers of all live entries, pending or complete.
    #[must_use]
    pub fn ids(&self) -> Vec<CorrelationId> {
        self.slots
            .iter()
            .filter(|slot| slot.value().live().is_some())
            .map(|slot| slot.key().clone())
            .collect()
    }

    /// Number of live entries, pending or complete.
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots
            .iter()
            .filter(|slot| slot.value().live().is_some())
            .count()
    }

    /// Returns `true` if there are no live entries.
    #[must_use]
    pub fn is_empty(&self) -> bool { self.len() == 0 }
}

fn saved_from(completed: bool) -> Saved {
    if completed {
        Saved::Complete
    } else {
        Saved::Pending
    }
}

fn abandoned(reason: AbandonReason) -> Outcome {
    Outcome::Failure(ResponseError::abandoned(reason))
}

async fn wait_terminal(receiver: &mut watch::Receiver<Completion>) -> Outcome {
    match receiver.wait_for(Completion::is_terminal).await {
        Ok(completion) => completion
            .outcome()
            .unwrap_or_else(|| abandoned(AbandonReason::Deleted)),
        Err(_) => abandoned(AbandonReason::ConnectionLost(
            "response aggregator dropped".to_owned(),
        )),
    }
}
