//! Canned response messages in the server's JSON wire format.

use serde_json::{Value, json};

/// Correlation id used by the canned success and partial messages.
pub const SUCCESS_REQUEST_ID: &str = "1d6d02bd-8e56-421d-9438-3bd6d0079ff1";

/// A terminal success carrying one vertex.
pub const SUCCESS_MESSAGE: &str = r#"{"result":{"data":[{"id": 2,"label": "person","type": "vertex","properties": [
  {"id": 2, "value": "vadas", "label": "name"},
  {"id": 3, "value": 27, "label": "age"}]}
  ], "meta":{}},
 "requestId":"1d6d02bd-8e56-421d-9438-3bd6d0079ff1",
 "status":{"code":200,"attributes":{},"message":""}}"#;

/// First half of a streamed result: a 206 partial response.
pub const PARTIAL_FIRST_MESSAGE: &str = r#"{"result":{"data":[{"id": 2,"label": "person","type": "vertex","properties": [
  {"id": 2, "value": "vadas", "label": "name"},
  {"id": 3, "value": 27, "label": "age"}]}
  ], "meta":{}},
 "requestId":"1d6d02bd-8e56-421d-9438-3bd6d0079ff1",
 "status":{"code":206,"attributes":{},"message":""}}"#;

/// Second half of a streamed result: the terminating 200 response.
pub const PARTIAL_FINAL_MESSAGE: &str = r#"{"result":{"data":[{"id": 4,"label": "person","type": "vertex","properties": [
  {"id": 5, "value": "quant", "label": "name"},
  {"id": 6, "value": 54, "label": "age"}]}
  ], "meta":{}},
 "requestId":"1d6d02bd-8e56-421d-9438-3bd6d0079ff1",
 "status":{"code":200,"attributes":{},"message":""}}"#;

/// Bytes of [`SUCCESS_MESSAGE`].
pub fn success_message() -> &'static [u8] { SUCCESS_MESSAGE.as_bytes() }

/// Builder for ad hoc response messages.
///
/// ```rust
/// use gremwire_testing::MessageBuilder;
///
/// let raw = MessageBuilder::new("r1", 206).data(vec![1.into()]).build();
/// assert!(raw.starts_with(b"{"));
/// ```
#[derive(Clone, Debug)]
pub struct MessageBuilder {
    request_id: String,
    code: i64,
    data: Value,
    message: String,
    attributes: Value,
}

impl MessageBuilder {
    /// Start a message for `request_id` with status `code` and no data.
    pub fn new(request_id: impl Into<String>, code: i64) -> Self {
        Self {
            request_id: request_id.into(),
            code,
            data: Value::Array(Vec::new()),
            message: String::new(),
            attributes: json!({}),
        }
    }

    /// Set `result.data` to a list of elements.
    #[must_use]
    pub fn data(mut self, elements: Vec<Value>) -> Self {
        self.data = Value::Array(elements);
        self
    }

    /// Set `result.data` to an arbitrary JSON value.
    #[must_use]
    pub fn raw_data(mut self, data: Value) -> Self {
        self.data = data;
        self
    }

    /// Set the status message.
    #[must_use]
    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    /// Set the status attributes.
    #[must_use]
    pub fn attributes(mut self, attributes: Value) -> Self {
        self.attributes = attributes;
        self
    }

    /// Serialise the message to bytes.
    pub fn build(self) -> Vec<u8> {
        json!({
            "result": {"data": self.data, "meta": {}},
            "requestId": self.request_id,
            "status": {
                "code": self.code,
                "attributes": self.attributes,
                "message": self.message,
            },
        })
        .to_string()
        .into_bytes()
    }
}
