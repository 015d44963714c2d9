use super::pipeline_harness::{
    PRIMARY_VERSION, Reply, ScriptedModel, pipeline, read_records, safe_json, unsafe_json,
};
use aegis_gate::governance::{GovernanceDecision, Session, ViolationType};
use aegis_gate::llm::MessageRole;

#[tokio::test]
async fn benign_question_is_released_and_remembered() {
    let p = pipeline(ScriptedModel::new(vec![Reply::text("Paris")], vec![safe_json()]));
    let mut session = Session::new("alice");

    let decision = p
        .orchestrator
        .process(&mut session, "What is the capital of France?")
        .await;

    match &decision {
        GovernanceDecision::Released { response, verdict } => {
            assert_eq!(response, "Paris");
            assert!(verdict.is_safe());
            assert_eq!(verdict.governor_version(), PRIMARY_VERSION);
        }
        other => panic!("expected release, got {other:?}"),
    }

    let history = session.context.messages();
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].role, MessageRole::User);
    assert_eq!(history[0].content, "What is the capital of France?");
    assert_eq!(history[1].content, "Paris");

    let records = read_records(&p.log_path);
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].caller_id, "alice");
    assert_eq!(records[0].verdict.violation_type(), ViolationType::None);
}

#[tokio::test]
async fn benign_question_survives_a_dead_judge_via_fallback() {
    let p = pipeline(ScriptedModel::new(
        vec![Reply::text("Paris")],
        vec![Reply::Error("503 service unavailable".into())],
    ));
    let mut session = Session::new("alice");

    let decision = p
        .orchestrator
        .process(&mut session, "What is the capital of France?")
        .await;

    let verdict = decision.verdict().expect("fallback verdict");
    assert!(decision.is_released());
    assert_eq!(verdict.governor_version(), "Fallback-Regex-v1");
    assert!((verdict.confidence_score() - 0.5).abs() < f64::EPSILON);
    assert_eq!(session.context.len(), 2);
}

#[tokio::test]
async fn ssn_is_blocked_when_the_judge_flags_it() {
    let p = pipeline(ScriptedModel::new(
        vec![Reply::text("Got it, I'll remember that.")],
        vec![unsafe_json("PII")],
    ));
    let mut session = Session::new("bob");

    let decision = p
        .orchestrator
        .process(&mut session, "My SSN is 123-45-6789")
        .await;

    let GovernanceDecision::Blocked { verdict } = &decision else {
        panic!("expected block, got {decision:?}");
    };
    assert!(!verdict.is_safe());
    assert_eq!(verdict.violation_type(), ViolationType::Pii);
    assert!(session.context.is_empty());

    let records = read_records(&p.log_path);
    assert_eq!(records.len(), 1);
    assert!(!records[0].verdict.is_safe());
    assert_eq!(records[0].prompt_excerpt, "My SSN is 123-45-6789");
}

#[tokio::test]
async fn ssn_is_blocked_by_fallback_when_the_judge_rambles() {
    let p = pipeline(ScriptedModel::new(
        vec![Reply::text("Sure, noted.")],
        vec![Reply::text("This looks totally fine to me!")],
    ));
    let mut session = Session::new("bob");

    let decision = p
        .orchestrator
        .process(&mut session, "My SSN is 123-45-6789")
        .await;

    let verdict = decision.verdict().expect("fallback verdict");
    assert!(!decision.is_released());
    assert_eq!(verdict.violation_type(), ViolationType::Pii);
    assert!((verdict.confidence_score() - 0.9).abs() < f64::EPSILON);
    assert!(session.context.is_empty());
    assert_eq!(read_records(&p.log_path).len(), 1);
}

#[tokio::test]
async fn blocked_turns_accumulate_session_risk() {
    let p = pipeline(ScriptedModel::new(
        vec![Reply::text("noted")],
        vec![unsafe_json("SQLi")],
    ));
    let mut session = Session::new("carol");

    p.orchestrator.process(&mut session, "DROP TABLE users").await;
    p.orchestrator.process(&mut session, "DROP TABLE users").await;

    assert!((session.context.cumulative_risk_score() - 1.84).abs() < 1e-9);
}

#[tokio::test]
async fn negated_judge_label_blocks_the_exchange() {
    let p = pipeline(ScriptedModel::new(
        vec![Reply::text("Paris")],
        vec![Reply::text(r#"{"verdict": "unacceptable"}"#)],
    ));
    let mut session = Session::new("alice");

    let decision = p
        .orchestrator
        .process(&mut session, "What is the capital of France?")
        .await;

    match &decision {
        GovernanceDecision::Blocked { verdict } => {
            assert!(!verdict.is_safe());
            assert_eq!(verdict.governor_version(), PRIMARY_VERSION);
        }
        other => panic!("expected block, got {other:?}"),
    }
    assert_eq!(session.context.len(), 0);
    assert_eq!(read_records(&p.log_path).len(), 1);
}
