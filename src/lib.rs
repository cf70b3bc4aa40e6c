#![doc(html_root_url = "https://docs.rs/gremwire/latest")]
//! Public API for the `gremwire` library.
//!
//! This crate correlates inbound response messages of a graph-traversal
//! server protocol with the requests that produced them. One connection
//! multiplexes many outstanding requests; each inbound message is decoded,
//! its status code classified, and its payload accumulated under the
//! request's correlation identifier until the caller collects it.

pub mod aggregator;
pub mod config;
pub mod correlation;
pub mod decode;
pub mod error;
pub mod metrics;
pub mod pipeline;
pub mod status;

pub use aggregator::{EntryState, ProtocolViolation, ResponseAggregator, Saved};
pub use config::PipelineConfig;
pub use correlation::CorrelationId;
pub use decode::{DecodeError, ResponseRecord, ResponseStatus, decode};
/// Result type alias re-exported for convenience when handling responses.
pub use error::{PipelineError, Result};
pub use pipeline::ResponsePipeline;
pub use status::{
    AbandonReason,
    Disposition,
    FailureClass,
    Outcome,
    ResponseError,
    StatusCode,
    StatusError,
    StatusTable,
    classify,
};
