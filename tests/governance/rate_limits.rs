use super::pipeline_harness::{
    PipelineOptions, Reply, ScriptedModel, pipeline_with, read_records, safe_json,
};
use aegis_gate::governance::{GovernanceDecision, Session};
use aegis_gate::security::ManualClock;
use std::sync::Arc;
use std::time::Duration;

fn benign_model() -> Arc<ScriptedModel> {
    ScriptedModel::new(vec![Reply::text("Paris")], vec![safe_json()])
}

#[tokio::test]
async fn hourly_limit_throttles_then_recovers() {
    let clock = Arc::new(ManualClock::new());
    let p = pipeline_with(
        benign_model(),
        PipelineOptions {
            hourly: 3,
            burst: 10,
            clock: clock.clone(),
            ..PipelineOptions::default()
        },
    );
    let mut session = Session::new("alice");

    for _ in 0..3 {
        assert!(p.orchestrator.process(&mut session, "Hi").await.is_released());
        clock.advance(Duration::from_secs(120));
    }
    assert_eq!(
        p.orchestrator.process(&mut session, "Hi").await,
        GovernanceDecision::Throttled
    );

    clock.advance(Duration::from_secs(3600));
    assert!(p.orchestrator.process(&mut session, "Hi").await.is_released());
}

#[tokio::test]
async fn burst_limit_throttles_under_the_hourly_cap() {
    let clock = Arc::new(ManualClock::new());
    let p = pipeline_with(
        benign_model(),
        PipelineOptions {
            hourly: 100,
            burst: 2,
            clock: clock.clone(),
            ..PipelineOptions::default()
        },
    );
    let mut session = Session::new("alice");

    assert!(p.orchestrator.process(&mut session, "Hi").await.is_released());
    assert!(p.orchestrator.process(&mut session, "Hi").await.is_released());
    assert_eq!(
        p.orchestrator.process(&mut session, "Hi").await,
        GovernanceDecision::Throttled
    );

    clock.advance(Duration::from_secs(61));
    assert!(p.orchestrator.process(&mut session, "Hi").await.is_released());
}

#[tokio::test]
async fn throttled_requests_are_not_drafted_or_logged() {
    let p = pipeline_with(
        benign_model(),
        PipelineOptions {
            burst: 1,
            ..PipelineOptions::default()
        },
    );
    let mut session = Session::new("alice");

    p.orchestrator.process(&mut session, "Hi").await;
    p.orchestrator.process(&mut session, "Hi").await;

    assert_eq!(p.model.draft_calls(), 1);
    assert_eq!(read_records(&p.log_path).len(), 1);
}

#[tokio::test]
async fn callers_are_limited_independently() {
    let p = pipeline_with(
        benign_model(),
        PipelineOptions {
            burst: 1,
            ..PipelineOptions::default()
        },
    );
    let mut alice = Session::new("alice");
    let mut bob = Session::new("bob");

    assert!(p.orchestrator.process(&mut alice, "Hi").await.is_released());
    assert!(p.orchestrator.process(&mut bob, "Hi").await.is_released());
    assert!(!p.orchestrator.process(&mut alice, "Hi").await.is_released());
}
