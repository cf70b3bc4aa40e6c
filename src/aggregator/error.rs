//! Errors reported by the response aggregator.

use thiserror::Error;

use crate::correlation::CorrelationId;

/// A response arrived for a correlation id that had already completed.
///
/// The aggregator reports the violation and leaves the entry untouched.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("{outcome} response for {correlation_id} arrived after the request completed")]
pub struct ProtocolViolation {
    correlation_id: CorrelationId,
    outcome: &'static str,
}

impl ProtocolViolation {
    pub(crate) fn new(correlation_id: CorrelationId, outcome: &'static str) -> Self {
        Self {
            correlation_id,
            outcome,
        }
    }

    /// Identifier of the already-complete entry.
    #[must_use]
    pub fn correlation_id(&self) -> &CorrelationId { &self.correlation_id }

    /// Label of the rejected outcome (`success`, `partial` or `failure`).
    #[must_use]
    pub fn outcome(&self) -> &'static str { self.outcome }
}
