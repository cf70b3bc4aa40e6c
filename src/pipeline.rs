//! Entry point for inbound response messages.
//!
//! [`ResponsePipeline`] owns the [`ResponseAggregator`] of one logical
//! connection. The connection collaborator hands it each complete inbound
//! message via [`handle_response`](ResponsePipeline::handle_response), which
//! decodes the message, classifies its status code and saves the result.
//! On transport loss the collaborator calls
//! [`drain_all_as_failed`](ResponsePipeline::drain_all_as_failed) once so
//! that every waiting caller is released.

use std::sync::Arc;

use log::warn;
use serde_json::Value;

use crate::{
    aggregator::{ResponseAggregator, Saved},
    config::PipelineConfig,
    correlation::CorrelationId,
    decode::decode,
    error::{PipelineError, Result},
    status::{AbandonReason, Outcome},
};

/// Decoder, classifier and aggregator wired together for one connection.
///
/// # Examples
///
/// ```
/// use gremwire::{
///     config::PipelineConfig,
///     correlation::CorrelationId,
///     pipeline::ResponsePipeline,
/// };
///
/// let pipeline = ResponsePipeline::new(PipelineConfig::default());
/// let raw = br#"{"result":{"data":["v1"],"meta":{}},"requestId":"r1",
///     "status":{"code":200,"attributes":{},"message":""}}"#;
/// pipeline.handle_response(raw).expect("message should be saved");
///
/// let id = CorrelationId::from("r1");
/// assert_eq!(pipeline.retrieve_response(&id).len(), 1);
/// pipeline.delete_response(&id);
/// ```
#[derive(Debug)]
pub struct ResponsePipeline {
    config: PipelineConfig,
    aggregator: Arc<ResponseAggregator>,
}

impl ResponsePipeline {
    /// Create a pipeline with a fresh aggregator.
    #[must_use]
    pub fn new(config: PipelineConfig) -> Self {
        Self::with_aggregator(config, Arc::new(ResponseAggregator::new()))
    }

    /// Create a pipeline feeding an existing aggregator.
    ///
    /// Several decode paths for the same connection may share one
    /// aggregator this way.
    #[must_use]
    pub fn with_aggregator(config: PipelineConfig, aggregator: Arc<ResponseAggregator>) -> Self {
        Self { config, aggregator }
    }

    /// Shared handle to the aggregator.
    #[must_use]
    pub fn aggregator(&self) -> &Arc<ResponseAggregator> { &self.aggregator }

    /// Configuration in use.
    #[must_use]
    pub fn config(&self) -> &PipelineConfig { &self.config }

    /// Decode, classify and save one complete inbound message.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::Decode`] if the message is malformed; the
    /// aggregator is not touched. Returns [`PipelineError::Violation`] if the
    /// message belongs to a request that had already completed.
    pub fn handle_response(&self, raw: &[u8]) -> Result<Saved> {
        let record = match decode(raw) {
            Ok(record) => record,
            Err(e) => {
                warn!("failed to decode response: error={e}, bytes={}", raw.len());
                crate::metrics::inc_decode_errors();
                return Err(PipelineError::Decode(e));
            }
        };

        let status = record.status();
        let outcome = self
            .config
            .status_table()
            .classify_with_message(status.code(), status.message());
        tracing::trace!(
            correlation_id = %record.correlation_id(),
            status.code = status.code().as_i64(),
            outcome = outcome.label(),
            "response classified"
        );

        Ok(self.aggregator.save_response(record, outcome)?)
    }

    /// Snapshot of the payload accumulated for `id`.
    #[must_use]
    pub fn retrieve_response(&self, id: &CorrelationId) -> Vec<Value> {
        self.aggregator.retrieve_response(id)
    }

    /// Wait until `id` completes, honouring the configured timeout.
    pub async fn await_completion(&self, id: &CorrelationId) -> Outcome {
        match self.config.completion_timeout() {
            Some(timeout) => self.aggregator.await_completion_timeout(id, timeout).await,
            None => self.aggregator.await_completion(id).await,
        }
    }

    /// Remove the entry for `id`.
    pub fn delete_response(&self, id: &CorrelationId) { self.aggregator.delete_response(id); }

    /// Fail every pending request after the connection was lost.
    ///
    /// Later waits on ids the pipeline never saw fail with the same reason.
    /// Returns the number of requests drained.
    pub fn drain_all_as_failed(&self, reason: impl Into<String>) -> usize {
        self.aggregator
            .drain_all_as_failed(AbandonReason::ConnectionLost(reason.into()))
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use rstest::rstest;
    use serde_json::json;
    use tracing_test::traced_test;

    use super::ResponsePipeline;
    use crate::{
        aggregator::{EntryState, Saved},
        config::PipelineConfig,
        correlation::CorrelationId,
        error::PipelineError,
        status::{AbandonReason, Disposition, FailureClass, Outcome, ResponseError, StatusCode},
    };

    fn message(id: &str, code: i64, data: &serde_json::Value) -> Vec<u8> {
        json!({
            "result": {"data": data, "meta": {}},
            "requestId": id,
            "status": {"code": code, "attributes": {}, "message": ""}
        })
        .to_string()
        .into_bytes()
    }

    #[rstest]
    #[case(200, Saved::Complete, EntryState::Complete)]
    #[case(204, Saved::Complete, EntryState::Complete)]
    #[case(206, Saved::Pending, EntryState::Pending)]
    #[case(500, Saved::Complete, EntryState::Complete)]
    fn handle_response_saves_classified_message(
        #[case] code: i64,
        #[case] saved: Saved,
        #[case] state: EntryState,
    ) {
        let pipeline = ResponsePipeline::new(PipelineConfig::default());
        let id = CorrelationId::from("r");

        let result = pipeline
            .handle_response(&message("r", code, &json!([1])))
            .expect("message should be handled");
        assert_eq!(result, saved);
        assert_eq!(pipeline.aggregator().state(&id), state);
    }

    #[test]
    fn failures_do_not_accumulate_payload() {
        let pipeline = ResponsePipeline::new(PipelineConfig::default());
        let id = CorrelationId::from("r");
        pipeline
            .handle_response(&message("r", 598, &json!(["ignored"])))
            .expect("message should be handled");

        assert!(pipeline.retrieve_response(&id).is_empty());
        let error = pipeline.aggregator().last_error(&id).expect("failure recorded");
        let status = error.status().expect("status failure");
        assert_eq!(status.code(), StatusCode::SERVER_TIMEOUT);
        assert_eq!(status.class(), FailureClass::Server);
    }

    #[test]
    fn decode_failures_never_reach_the_aggregator() {
        let pipeline = ResponsePipeline::new(PipelineConfig::default());
        let err = pipeline
            .handle_response(b"{\"requestId\":\"r\"")
            .expect_err("truncated message should fail");

        assert!(matches!(err, PipelineError::Decode(_)));
        assert!(pipeline.aggregator().is_empty());
    }

    #[test]
    fn late_message_is_reported_as_violation() {
        let pipeline = ResponsePipeline::new(PipelineConfig::default());
        let id = CorrelationId::from("r");
        pipeline
            .handle_response(&message("r", 200, &json!([1])))
            .expect("first message should be handled");

        let err = pipeline
            .handle_response(&message("r", 206, &json!([2])))
            .expect_err("late message should be rejected");
        assert!(matches!(err, PipelineError::Violation(ref v) if v.correlation_id() == &id));
        assert_eq!(pipeline.retrieve_response(&id), vec![json!(1)]);
    }

    #[test]
    fn configured_table_is_used() {
        let config =
            PipelineConfig::default().with_status(StatusCode::new(209), Disposition::Partial);
        let pipeline = ResponsePipeline::new(config);
        let saved = pipeline
            .handle_response(&message("r", 209, &json!([1])))
            .expect("message should be handled");
        assert_eq!(saved, Saved::Pending);
    }

    #[tokio::test]
    async fn configured_timeout_abandons_request() {
        let config =
            PipelineConfig::default().with_completion_timeout(Duration::from_millis(10));
        let pipeline = ResponsePipeline::new(config);
        let id = CorrelationId::from("slow");

        let outcome = pipeline.await_completion(&id).await;
        assert_eq!(
            outcome,
            Outcome::Failure(ResponseError::abandoned(AbandonReason::TimedOut))
        );
        assert_eq!(pipeline.aggregator().state(&id), EntryState::Complete);
    }

    #[tokio::test]
    async fn drain_releases_waiters() {
        let pipeline = ResponsePipeline::new(PipelineConfig::default());
        let id = CorrelationId::from("r");
        pipeline
            .handle_response(&message("r", 206, &json!([1])))
            .expect("partial should be handled");

        assert_eq!(pipeline.drain_all_as_failed("socket reset"), 1);
        let outcome = pipeline.await_completion(&id).await;
        assert!(matches!(outcome, Outcome::Failure(ref e) if e.is_abandoned()));
    }

    #[traced_test]
    #[test]
    fn saved_responses_are_traced() {
        let pipeline = ResponsePipeline::new(PipelineConfig::default());
        pipeline
            .handle_response(&message("traced", 206, &json!([1, 2])))
            .expect("partial should be handled");

        assert!(logs_contain("response classified"));
        assert!(logs_contain("response saved"));
        assert!(logs_contain("correlation_id=traced"));
        assert!(logs_contain("elements=2"));
    }
}
