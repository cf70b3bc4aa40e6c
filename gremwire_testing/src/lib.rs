//! Shared fixtures for `gremwire` integration tests.
//!
//! Provides canned response messages in the server's wire format, a
//! serialised `logtest` logger fixture and helpers for inspecting metrics
//! recorded through `metrics-util`'s debugging recorder.
//!
//! ```rust
//! use gremwire::ResponsePipeline;
//! use gremwire_testing::{SUCCESS_REQUEST_ID, success_message};
//!
//! let pipeline = ResponsePipeline::new(Default::default());
//! pipeline.handle_response(success_message()).unwrap();
//! # let _ = SUCCESS_REQUEST_ID;
//! ```

pub mod logging;
pub mod messages;
pub mod metrics;

pub use logging::{LoggerHandle, logger};
pub use messages::{
    MessageBuilder,
    PARTIAL_FINAL_MESSAGE,
    PARTIAL_FIRST_MESSAGE,
    SUCCESS_MESSAGE,
    SUCCESS_REQUEST_ID,
    success_message,
};
pub use metrics::{counter_total, debugging_recorder};

/// Result alias for fallible tests.
pub type TestResult<T = ()> = Result<T, Box<dyn std::error::Error + Send + Sync>>;
