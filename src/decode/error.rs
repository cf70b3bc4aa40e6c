//! Errors raised while decoding a response message.

use thiserror::Error;

use crate::correlation::CorrelationId;

/// A response message could not be turned into a
/// [`ResponseRecord`](super::ResponseRecord).
///
/// Decode failures are never stored against a correlation identifier, since
/// the identifier itself may be unrecoverable.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// The bytes are not a JSON envelope of the expected shape.
    #[error("malformed response envelope: {0}")]
    Malformed(#[from] serde_json::Error),
    /// The envelope carries an empty `requestId`.
    #[error("response envelope has an empty requestId")]
    EmptyCorrelationId,
    /// `result.data` is present but is not a list.
    #[error("result.data for request {correlation_id} must be a list, found {found}")]
    UnexpectedData {
        /// Identifier of the offending message.
        correlation_id: CorrelationId,
        /// JSON kind that was found instead.
        found: &'static str,
    },
}

impl DecodeError {
    /// Correlation identifier of the message, when it could be recovered.
    #[must_use]
    pub fn correlation_id(&self) -> Option<&CorrelationId> {
        match self {
            Self::UnexpectedData { correlation_id, .. } => Some(correlation_id),
            Self::Malformed(_) | Self::EmptyCorrelationId => None,
        }
    }
}
