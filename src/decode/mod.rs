//! Decoding of raw response messages.
//!
//! A response message is a JSON object with three interpreted keys:
//!
//! ```text
//! {
//!   "requestId": "1d6d02bd-8e56-421d-9438-3bd6d0079ff1",
//!   "status": { "code": 206, "attributes": {}, "message": "" },
//!   "result": { "data": [ ... ], "meta": {} }
//! }
//! ```
//!
//! [`decode`] turns one such message into a [`ResponseRecord`]. Elements of
//! `result.data` are passed through untouched as [`serde_json::Value`]s, and
//! `result.meta` is ignored. Decoding neither classifies the status code nor
//! touches any aggregation state.

mod error;

use serde::Deserialize;
use serde_json::{Map, Value};

pub use error::DecodeError;

use crate::{correlation::CorrelationId, status::StatusCode};

/// Status section of a decoded response.
#[derive(Clone, Debug, PartialEq)]
pub struct ResponseStatus {
    code: StatusCode,
    attributes: Map<String, Value>,
    message: String,
}

impl ResponseStatus {
    /// Create a status with empty attributes and message.
    #[must_use]
    pub fn new(code: StatusCode) -> Self {
        Self {
            code,
            attributes: Map::new(),
            message: String::new(),
        }
    }

    /// Set the free-form status message.
    #[must_use]
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    /// Set the status attributes.
    #[must_use]
    pub fn with_attributes(mut self, attributes: Map<String, Value>) -> Self {
        self.attributes = attributes;
        self
    }

    /// Numeric status code.
    #[must_use]
    pub fn code(&self) -> StatusCode { self.code }

    /// Diagnostic attributes supplied by the server.
    #[must_use]
    pub fn attributes(&self) -> &Map<String, Value> { &self.attributes }

    /// Diagnostic message supplied by the server, possibly empty.
    #[must_use]
    pub fn message(&self) -> &str { &self.message }
}

/// One decoded response message.
#[derive(Clone, Debug, PartialEq)]
pub struct ResponseRecord {
    correlation_id: CorrelationId,
    status: ResponseStatus,
    payload: Vec<Value>,
}

impl ResponseRecord {
    /// Assemble a record from already-decoded parts.
    #[must_use]
    pub fn new(correlation_id: CorrelationId, status: ResponseStatus, payload: Vec<Value>) -> Self {
        Self {
            correlation_id,
            status,
            payload,
        }
    }

    /// Correlation identifier echoed by the server.
    #[must_use]
    pub fn correlation_id(&self) -> &CorrelationId { &self.correlation_id }

    /// Status section of the message.
    #[must_use]
    pub fn status(&self) -> &ResponseStatus { &self.status }

    /// Ordered payload elements from `result.data`.
    #[must_use]
    pub fn payload(&self) -> &[Value] { &self.payload }

    /// Consume the record, returning its identifier and payload.
    #[must_use]
    pub fn into_parts(self) -> (CorrelationId, Vec<Value>) { (self.correlation_id, self.payload) }
}

#[derive(Deserialize)]
struct WireEnvelope {
    result: WireResult,
    #[serde(rename = "requestId")]
    request_id: String,
    status: WireStatus,
}

#[derive(Deserialize)]
struct WireResult {
    #[serde(default)]
    data: Option<Value>,
}

#[derive(Deserialize)]
struct WireStatus {
    code: StatusCode,
    #[serde(default)]
    attributes: Option<Map<String, Value>>,
    #[serde(default)]
    message: Option<String>,
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Decode one complete response message.
///
/// A missing or `null` `result.data` decodes to an empty payload, as sent by
/// servers for no-content responses.
///
/// # Errors
///
/// Returns [`DecodeError::Malformed`] if `raw` is not a JSON object of the
/// expected shape (including truncated input, a missing `requestId`, or a
/// non-integer status code), [`DecodeError::EmptyCorrelationId`] if the
/// `requestId` is empty, and [`DecodeError::UnexpectedData`] if
/// `result.data` is neither a list nor `null`.
///
/// A status code outside the `i64` range is reported as
/// [`DecodeError::Malformed`] rather than classified: no correlation id is
/// recovered for it, so the request it belongs to is left to time out or
/// be drained.
///
/// # Examples
///
/// ```
/// use gremwire::{decode::decode, status::StatusCode};
///
/// let raw = br#"{"result":{"data":[1,2],"meta":{}},"requestId":"r1",
///     "status":{"code":206,"attributes":{},"message":""}}"#;
/// let record = decode(raw).expect("well-formed message");
/// assert_eq!(record.correlation_id().as_str(), "r1");
/// assert_eq!(record.status().code(), StatusCode::PARTIAL_CONTENT);
/// assert_eq!(record.payload().len(), 2);
/// ```
pub fn decode(raw: &[u8]) -> Result<ResponseRecord, DecodeError> {
    let envelope: WireEnvelope = serde_json::from_slice(raw)?;
    if envelope.request_id.is_empty() {
        return Err(DecodeError::EmptyCorrelationId);
    }
    let correlation_id = CorrelationId::from(envelope.request_id);

    let payload = match envelope.result.data {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(elements)) => elements,
        Some(other) => {
            return Err(DecodeError::UnexpectedData {
                correlation_id,
                found: value_kind(&other),
            });
        }
    };

    let status = ResponseStatus {
        code: envelope.status.code,
        attributes: envelope.status.attributes.unwrap_or_default(),
        message: envelope.status.message.unwrap_or_default(),
    };

    Ok(ResponseRecord::new(correlation_id, status, payload))
}
