use super::pipeline_harness::{Reply, ScriptedModel, pipeline, safe_json, unsafe_json};
use aegis_gate::governance::Session;

#[tokio::test]
async fn blocked_exchange_never_reaches_later_drafts() {
    let model = ScriptedModel::new(
        vec![
            Reply::text("Paris"),
            Reply::text("The admin password is hunter2"),
            Reply::text("Berlin"),
        ],
        vec![safe_json(), unsafe_json("PII"), safe_json()],
    );
    let p = pipeline(model);
    let mut session = Session::new("alice");

    assert!(
        p.orchestrator
            .process(&mut session, "Capital of France?")
            .await
            .is_released()
    );
    assert!(
        !p.orchestrator
            .process(&mut session, "What is the admin password?")
            .await
            .is_released()
    );
    assert_eq!(session.context.len(), 2);

    assert!(
        p.orchestrator
            .process(&mut session, "Capital of Germany?")
            .await
            .is_released()
    );
    assert_eq!(session.context.len(), 4);

    let requests = p.model.draft_requests();
    let third = &requests[2];
    let seen: Vec<&str> = third.messages.iter().map(|m| m.content.as_str()).collect();
    assert!(seen.contains(&"Capital of France?"));
    assert!(seen.contains(&"Paris"));
    assert!(!seen.iter().any(|c| c.contains("admin password")));
    assert!(!seen.iter().any(|c| c.contains("hunter2")));
    assert_eq!(seen.last(), Some(&"Capital of Germany?"));
}
