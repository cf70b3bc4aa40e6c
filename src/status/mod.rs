//! Classification of response status codes.
//!
//! Every response message carries a numeric status code. [`classify`] maps
//! that code onto an [`Outcome`]: a terminal success, a partial success that
//! will be followed by more messages for the same correlation identifier, or
//! a terminal failure. The mapping is total; codes absent from the table are
//! failures of class [`FailureClass::Unknown`] that keep the raw value.
//!
//! The mapping lives in a [`StatusTable`], which protocols can extend with
//! additional codes without touching the classifier itself.

mod error;
mod table;

use std::fmt;

use serde::Deserialize;

pub use error::{AbandonReason, FailureClass, ResponseError, StatusError};
pub use table::{Disposition, StatusTable};

/// Numeric status code carried in the `status.code` field of a response.
///
/// Backed by `i64` so that classification is defined for any integer the
/// wire format can carry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize)]
#[serde(transparent)]
pub struct StatusCode(i64);

impl StatusCode {
    /// The request succeeded and this is the final message.
    pub const SUCCESS: Self = Self(200);
    /// The request succeeded but produced no content.
    pub const NO_CONTENT: Self = Self(204);
    /// The request succeeded and more messages will follow.
    pub const PARTIAL_CONTENT: Self = Self(206);
    /// The request was not authorised.
    pub const UNAUTHORIZED: Self = Self(401);
    /// The server issued an authentication challenge.
    pub const AUTHENTICATE: Self = Self(407);
    /// The request message could not be parsed by the server.
    pub const MALFORMED_REQUEST: Self = Self(498);
    /// The request arguments were invalid.
    pub const INVALID_REQUEST_ARGUMENTS: Self = Self(499);
    /// Generic server failure.
    pub const SERVER_ERROR: Self = Self(500);
    /// The submitted script failed to evaluate.
    pub const SCRIPT_EVALUATION_ERROR: Self = Self(597);
    /// The server timed out while processing the request.
    pub const SERVER_TIMEOUT: Self = Self(598);
    /// The server could not serialise the result.
    pub const SERVER_SERIALIZATION_ERROR: Self = Self(599);

    /// Create a status code from its raw value.
    #[must_use]
    pub const fn new(code: i64) -> Self { Self(code) }

    /// Return the raw numeric value.
    #[must_use]
    pub const fn as_i64(self) -> i64 { self.0 }
}

impl From<i64> for StatusCode {
    fn from(value: i64) -> Self { Self(value) }
}

impl fmt::Display for StatusCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "{}", self.0) }
}

/// Classified result of a status code.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Outcome {
    /// Terminal success: the full result is available.
    Success,
    /// Success for this message only; more messages for the same correlation
    /// identifier will follow.
    SuccessPartial,
    /// Terminal failure: nothing further is accumulated for the identifier.
    Failure(ResponseError),
}

impl Outcome {
    /// Returns `true` unless this is [`Outcome::SuccessPartial`].
    #[must_use]
    pub fn is_terminal(&self) -> bool { !matches!(self, Self::SuccessPartial) }

    /// Returns `true` for [`Outcome::Success`] and [`Outcome::SuccessPartial`].
    #[must_use]
    pub fn is_success(&self) -> bool { !matches!(self, Self::Failure(_)) }

    /// Borrow the failure carried by this outcome, if any.
    #[must_use]
    pub fn error(&self) -> Option<&ResponseError> {
        match self {
            Self::Failure(error) => Some(error),
            Self::Success | Self::SuccessPartial => None,
        }
    }

    /// Convert into a `Result`, treating both success variants as `Ok`.
    ///
    /// # Errors
    ///
    /// Returns the carried [`ResponseError`] for [`Outcome::Failure`].
    pub fn into_result(self) -> Result<(), ResponseError> {
        match self {
            Self::Failure(error) => Err(error),
            Self::Success | Self::SuccessPartial => Ok(()),
        }
    }

    /// Short label used for logging and metric labels.
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::SuccessPartial => "partial",
            Self::Failure(_) => "failure",
        }
    }
}

/// Classify `code` using the standard status table.
///
/// This never fails: unmapped codes yield [`Outcome::Failure`] with
/// [`FailureClass::Unknown`] and the raw value in the message.
///
/// # Examples
///
/// ```
/// use gremwire::status::{FailureClass, Outcome, StatusCode, classify};
///
/// assert_eq!(classify(StatusCode::SUCCESS), Outcome::Success);
/// assert_eq!(classify(StatusCode::new(206)), Outcome::SuccessPartial);
///
/// let outcome = classify(StatusCode::new(3434));
/// let error = outcome.error().and_then(|e| e.status()).expect("status failure");
/// assert_eq!(error.class(), FailureClass::Unknown);
/// assert_eq!(error.code(), StatusCode::new(3434));
/// ```
#[must_use]
pub fn classify(code: StatusCode) -> Outcome { StatusTable::shared().classify(code) }
