//! Tests asserting on the `log` records emitted while handling responses.

use std::time::Duration;

use gremwire::{CorrelationId, PipelineConfig, ResponsePipeline};
use gremwire_testing::{LoggerHandle, MessageBuilder, logger};
use log::Level;
use rstest::rstest;
use serial_test::serial;

#[rstest]
#[serial(logging)]
fn malformed_message_is_logged(mut logger: LoggerHandle) {
    let pipeline = ResponsePipeline::new(PipelineConfig::default());
    let raw = b"not json";

    assert!(pipeline.handle_response(raw).is_err());

    let warnings = logger.messages_at(Level::Warn);
    assert!(
        warnings
            .iter()
            .any(|m| m.starts_with("failed to decode response") && m.contains("bytes=8")),
        "decode warning missing: {warnings:?}"
    );
}

#[rstest]
#[serial(logging)]
fn late_response_is_logged_as_violation(mut logger: LoggerHandle) {
    let pipeline = ResponsePipeline::new(PipelineConfig::default());
    pipeline
        .handle_response(&MessageBuilder::new("r1", 200).build())
        .expect("terminal response");
    logger.clear();

    assert!(
        pipeline
            .handle_response(&MessageBuilder::new("r1", 200).build())
            .is_err()
    );

    let warnings = logger.messages_at(Level::Warn);
    assert_eq!(warnings.len(), 1, "unexpected warnings: {warnings:?}");
    assert!(warnings[0].starts_with("protocol violation"));
    assert!(warnings[0].contains("correlation_id=r1"));
}

#[rstest]
#[serial(logging)]
fn response_for_deleted_request_is_discarded_quietly(mut logger: LoggerHandle) {
    let pipeline = ResponsePipeline::new(PipelineConfig::default());
    let id = CorrelationId::from("r1");
    pipeline
        .handle_response(&MessageBuilder::new("r1", 206).build())
        .expect("partial response");
    pipeline.delete_response(&id);
    logger.clear();

    pipeline
        .handle_response(&MessageBuilder::new("r1", 206).build())
        .expect("late partial is discarded, not rejected");

    let debug = logger.messages_at(Level::Debug);
    assert!(
        debug
            .iter()
            .any(|m| m.starts_with("discarded response for abandoned request")),
        "discard record missing: {debug:?}"
    );
    assert!(pipeline.retrieve_response(&id).is_empty());
}

#[rstest]
#[serial(logging)]
fn drain_logs_count_and_reason(mut logger: LoggerHandle) {
    let pipeline = ResponsePipeline::new(PipelineConfig::default());
    for request in ["a", "b"] {
        pipeline
            .handle_response(&MessageBuilder::new(request, 206).build())
            .expect("partial response");
    }
    logger.clear();

    assert_eq!(pipeline.drain_all_as_failed("peer reset"), 2);

    let info = logger.messages_at(Level::Info);
    assert_eq!(
        info,
        vec!["drained pending responses: count=2, reason=connection lost: peer reset".to_string()]
    );
}

#[rstest]
#[serial(logging)]
#[tokio::test(start_paused = true)]
async fn response_after_timeout_is_not_a_violation(mut logger: LoggerHandle) {
    let config = PipelineConfig::default().with_completion_timeout(Duration::from_secs(1));
    let pipeline = ResponsePipeline::new(config);
    let id = CorrelationId::from("slow");
    pipeline.await_completion(&id).await;
    logger.clear();

    pipeline
        .handle_response(&MessageBuilder::new("slow", 200).build())
        .expect("late answer is discarded, not rejected");

    assert!(logger.messages_at(Level::Warn).is_empty());
}
