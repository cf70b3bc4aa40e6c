//! Failure types produced by status classification and request abandonment.

use std::fmt;

use thiserror::Error;

use super::StatusCode;

/// Broad category of a failing status code.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FailureClass {
    /// Client or authentication error (4xx family).
    Client,
    /// Server-side failure (5xx family).
    Server,
    /// The code is not present in the status table.
    Unknown,
}

impl fmt::Display for FailureClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::Client => "client error",
            Self::Server => "server error",
            Self::Unknown => "unknown status",
        };
        f.write_str(text)
    }
}

/// A response whose status code classified as a failure.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("status {code} ({class}): {message}")]
pub struct StatusError {
    code: StatusCode,
    class: FailureClass,
    message: String,
}

impl StatusError {
    /// Create a status error.
    #[must_use]
    pub fn new(code: StatusCode, class: FailureClass, message: impl Into<String>) -> Self {
        Self {
            code,
            class,
            message: message.into(),
        }
    }

    /// Raw status code reported by the server.
    #[must_use]
    pub fn code(&self) -> StatusCode { self.code }

    /// Failure category of the code.
    #[must_use]
    pub fn class(&self) -> FailureClass { self.class }

    /// Server message, or the table's description when the server sent none.
    #[must_use]
    pub fn message(&self) -> &str { &self.message }

    /// Returns `true` when the code was absent from the status table.
    #[must_use]
    pub fn is_unknown(&self) -> bool { self.class == FailureClass::Unknown }
}

/// Why a pending request was completed without a terminal response.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AbandonReason {
    /// The caller deleted the entry before it completed.
    Deleted,
    /// The underlying connection was lost.
    ConnectionLost(String),
    /// The caller stopped waiting after its completion timeout.
    TimedOut,
    /// The connection collaborator cancelled the request.
    Cancelled,
}

impl fmt::Display for AbandonReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Deleted => f.write_str("entry deleted while pending"),
            Self::ConnectionLost(reason) => write!(f, "connection lost: {reason}"),
            Self::TimedOut => f.write_str("timed out waiting for completion"),
            Self::Cancelled => f.write_str("cancelled"),
        }
    }
}

/// Terminal failure recorded against a correlation identifier.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ResponseError {
    /// The server answered with a failing status code.
    #[error(transparent)]
    Status(#[from] StatusError),
    /// The request was force-completed before a terminal response arrived.
    #[error("request abandoned: {reason}")]
    Abandoned {
        /// Cause of the abandonment.
        reason: AbandonReason,
    },
}

impl ResponseError {
    /// Build an [`ResponseError::Abandoned`] value.
    #[must_use]
    pub fn abandoned(reason: AbandonReason) -> Self { Self::Abandoned { reason } }

    /// Borrow the status failure, if this error came from a status code.
    #[must_use]
    pub fn status(&self) -> Option<&StatusError> {
        match self {
            Self::Status(error) => Some(error),
            Self::Abandoned { .. } => None,
        }
    }

    /// Returns `true` if the request was abandoned rather than failed by the
    /// server.
    #[must_use]
    pub fn is_abandoned(&self) -> bool { matches!(self, Self::Abandoned { .. }) }
}
