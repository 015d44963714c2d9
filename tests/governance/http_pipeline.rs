use aegis_gate::Config;
use aegis_gate::governance::{Orchestrator, Session, ViolationType};
use aegis_gate::llm::OpenAiCompatibleClient;
use serde_json::json;
use std::sync::Arc;
use tempfile::TempDir;
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn completion(text: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "choices": [{"message": {"content": text}}]
    }))
}

fn orchestrator_for(server: &MockServer, dir: &TempDir) -> Orchestrator {
    let mut config = Config::default();
    config.provider.endpoint = Some(server.uri());
    config.provider.api_key = Some("test-key".into());
    config.governor.retry_delay_ms = 1;
    config.audit.log_path = dir.path().join("audit.jsonl").display().to_string();

    let client = OpenAiCompatibleClient::new(
        "inference",
        &server.uri(),
        config.provider.api_key.as_deref(),
        config.provider.auth_style,
        5,
    );
    Orchestrator::from_config(&config, Arc::new(client))
}

#[tokio::test]
async fn released_through_an_openai_compatible_service() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(body_string_contains("security auditor"))
        .respond_with(completion(
            "```json\n{\"is_safe\": true, \"violation_type\": \"None\", \"reasoning\": \"ok\", \"confidence_score\": 0.9}\n```",
        ))
        .with_priority(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(completion("Paris"))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let orchestrator = orchestrator_for(&server, &dir);
    let mut session = Session::new("alice");

    let decision = orchestrator
        .process(&mut session, "What is the capital of France?")
        .await;

    assert!(decision.is_released());
    assert_eq!(
        decision.verdict().unwrap().governor_version(),
        "Phi-4-mini-instruct-Governor-v1"
    );
    assert_eq!(session.context.len(), 2);
    assert!(orchestrator.audit_log().path().exists());
}

#[tokio::test]
async fn failing_judge_service_falls_back_to_patterns() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(body_string_contains("security auditor"))
        .respond_with(ResponseTemplate::new(500).set_body_string("internal error"))
        .with_priority(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .respond_with(completion("Your card 4111-1111-1111-1111 is on file."))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let orchestrator = orchestrator_for(&server, &dir);
    let mut session = Session::new("alice");

    let decision = orchestrator
        .process(&mut session, "Which card do I have on file?")
        .await;

    let verdict = decision.verdict().unwrap();
    assert!(!decision.is_released());
    assert_eq!(verdict.violation_type(), ViolationType::Pii);
    assert_eq!(verdict.governor_version(), "Fallback-Regex-v1");
    assert!(session.context.is_empty());
}
