//! Metric helpers for `gremwire`.
//!
//! This module defines metric names and simple helper functions wrapping the
//! [`metrics`](https://docs.rs/metrics) crate. Without the `metrics` feature
//! the helpers compile to no-ops.

/// Name of the counter tracking saved responses, labelled by `outcome`.
pub const RESPONSES_TOTAL: &str = "gremwire_responses_total";
/// Name of the counter tracking messages that failed to decode.
pub const DECODE_ERRORS_TOTAL: &str = "gremwire_decode_errors_total";
/// Name of the counter tracking responses rejected after completion.
pub const PROTOCOL_VIOLATIONS_TOTAL: &str = "gremwire_protocol_violations_total";
/// Name of the counter tracking requests force-completed without a response.
pub const ABANDONED_TOTAL: &str = "gremwire_abandoned_total";

/// Record a saved response with the given outcome label.
pub fn inc_responses(outcome: &'static str) {
    #[cfg(feature = "metrics")]
    metrics::counter!(RESPONSES_TOTAL, "outcome" => outcome).increment(1);
    #[cfg(not(feature = "metrics"))]
    let _ = outcome;
}

/// Record a message that could not be decoded.
pub fn inc_decode_errors() {
    #[cfg(feature = "metrics")]
    metrics::counter!(DECODE_ERRORS_TOTAL).increment(1);
}

/// Record a response rejected because its request had already completed.
pub fn inc_protocol_violations() {
    #[cfg(feature = "metrics")]
    metrics::counter!(PROTOCOL_VIOLATIONS_TOTAL).increment(1);
}

/// Record `count` requests completed as abandoned.
pub fn inc_abandoned(count: u64) {
    #[cfg(feature = "metrics")]
    metrics::counter!(ABANDONED_TOTAL).increment(count);
    #[cfg(not(feature = "metrics"))]
    let _ = count;
}
