//! Canonical error and result types for the crate.
//!
//! `PipelineError` is what [`ResponsePipeline::handle_response`] reports for
//! a single inbound message. Neither variant affects other correlation ids.
//!
//! [`ResponsePipeline::handle_response`]: crate::pipeline::ResponsePipeline::handle_response

use thiserror::Error;

use crate::{aggregator::ProtocolViolation, decode::DecodeError};

/// Failure to process one inbound message.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// The message could not be decoded and never reached the aggregator.
    #[error("failed to decode response: {0}")]
    Decode(#[from] DecodeError),
    /// The message arrived for a request that had already completed.
    #[error(transparent)]
    Violation(#[from] ProtocolViolation),
}

/// Canonical result alias used by `gremwire` public APIs.
pub type Result<T> = std::result::Result<T, PipelineError>;
