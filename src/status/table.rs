//! Extensible mapping from status codes to outcomes.

use std::{borrow::Cow, collections::HashMap, sync::OnceLock};

use super::{FailureClass, Outcome, ResponseError, StatusCode, StatusError};

/// How a single status code is treated.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Disposition {
    /// Terminal success.
    Success,
    /// Non-terminal success; more messages follow.
    Partial,
    /// Terminal failure with a default description.
    Failure {
        /// Failure category.
        class: FailureClass,
        /// Used as the error message when the server sends none.
        description: Cow<'static, str>,
    },
}

impl Disposition {
    /// Shorthand for a [`Disposition::Failure`].
    #[must_use]
    pub fn failure(class: FailureClass, description: impl Into<Cow<'static, str>>) -> Self {
        Self::Failure {
            class,
            description: description.into(),
        }
    }
}

/// Lookup table used to classify status codes.
///
/// [`StatusTable::standard`] holds the codes defined by the protocol. Further
/// codes can be added with [`StatusTable::with`] or [`StatusTable::insert`];
/// anything not in the table classifies as [`FailureClass::Unknown`].
///
/// # Examples
///
/// ```
/// use gremwire::status::{Disposition, Outcome, StatusCode, StatusTable};
///
/// let table = StatusTable::standard().with(StatusCode::new(203), Disposition::Success);
/// assert_eq!(table.classify(StatusCode::new(203)), Outcome::Success);
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StatusTable {
    entries: HashMap<StatusCode, Disposition>,
}

impl StatusTable {
    /// A table with no entries; every code classifies as unknown.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    /// The protocol's standard status codes.
    #[must_use]
    pub fn standard() -> Self {
        use FailureClass::{Client, Server};

        Self::empty()
            .with(StatusCode::SUCCESS, Disposition::Success)
            .with(StatusCode::NO_CONTENT, Disposition::Success)
            .with(StatusCode::PARTIAL_CONTENT, Disposition::Partial)
            .with(
                StatusCode::UNAUTHORIZED,
                Disposition::failure(Client, "unauthorized"),
            )
            .with(
                StatusCode::AUTHENTICATE,
                Disposition::failure(Client, "authentication challenge"),
            )
            .with(
                StatusCode::MALFORMED_REQUEST,
                Disposition::failure(Client, "malformed request"),
            )
            .with(
                StatusCode::INVALID_REQUEST_ARGUMENTS,
                Disposition::failure(Client, "invalid request arguments"),
            )
            .with(
                StatusCode::SERVER_ERROR,
                Disposition::failure(Server, "server error"),
            )
            .with(
                StatusCode::SCRIPT_EVALUATION_ERROR,
                Disposition::failure(Server, "script evaluation error"),
            )
            .with(
                StatusCode::SERVER_TIMEOUT,
                Disposition::failure(Server, "server timeout"),
            )
            .with(
                StatusCode::SERVER_SERIALIZATION_ERROR,
                Disposition::failure(Server, "server serialization error"),
            )
    }

    /// Process-wide standard table used by [`classify`](super::classify).
    pub(crate) fn shared() -> &'static Self {
        static STANDARD: OnceLock<StatusTable> = OnceLock::new();
        STANDARD.get_or_init(Self::standard)
    }

    /// Add or replace the disposition for `code`, returning the table.
    #[must_use]
    pub fn with(mut self, code: StatusCode, disposition: Disposition) -> Self {
        self.entries.insert(code, disposition);
        self
    }

    /// Add or replace the disposition for `code`, returning the previous one.
    pub fn insert(&mut self, code: StatusCode, disposition: Disposition) -> Option<Disposition> {
        self.entries.insert(code, disposition)
    }

    /// Look up the disposition registered for `code`.
    #[must_use]
    pub fn disposition(&self, code: StatusCode) -> Option<&Disposition> { self.entries.get(&code) }

    /// Classify `code` using only the table's default descriptions.
    #[must_use]
    pub fn classify(&self, code: StatusCode) -> Outcome { self.classify_with_message(code, "") }

    /// Classify `code`, preferring `message` over the default description
    /// when it is non-empty.
    #[must_use]
    pub fn classify_with_message(&self, code: StatusCode, message: &str) -> Outcome {
        let (class, description) = match self.entries.get(&code) {
            Some(Disposition::Success) => return Outcome::Success,
            Some(Disposition::Partial) => return Outcome::SuccessPartial,
            Some(Disposition::Failure { class, description }) => (*class, description.clone()),
            None => (
                FailureClass::Unknown,
                Cow::Owned(format!("unknown status code {code}")),
            ),
        };
        let message = if message.is_empty() {
            description.into_owned()
        } else {
            message.to_owned()
        };
        Outcome::Failure(ResponseError::Status(StatusError::new(code, class, message)))
    }
}

impl Default for StatusTable {
    fn default() -> Self { Self::standard() }
}
