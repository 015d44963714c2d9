use crate::config::WorkerConfig;
use crate::error::PipelineError;
use crate::llm::{ChatMessage, CompletionClient, CompletionRequest, sanitize_api_error};
use std::sync::Arc;
use std::time::Duration;

const WORKER_SYSTEM_PROMPT: &str = "You are a helpful assistant. Never output personal information \
such as SSNs, passwords, or financial data. If asked for such data, politely decline.";

/// Produces candidate responses. Does not retry; a failed draft ends the request.
pub struct DraftGenerator {
    client: Arc<dyn CompletionClient>,
    model: String,
    max_tokens: u32,
    temperature: f64,
    top_p: f64,
    timeout: Duration,
}

impl DraftGenerator {
    pub fn new(
        client: Arc<dyn CompletionClient>,
        model: &str,
        config: &WorkerConfig,
        timeout: Duration,
    ) -> Self {
        Self {
            client,
            model: model.to_string(),
            max_tokens: config.max_response_length,
            temperature: config.temperature,
            top_p: config.top_p,
            timeout,
        }
    }

    /// `history` must already end with the sanitized user turn.
    pub async fn generate(&self, history: &[ChatMessage]) -> Result<String, PipelineError> {
        let mut messages = Vec::with_capacity(history.len() + 1);
        messages.push(ChatMessage::system(WORKER_SYSTEM_PROMPT));
        messages.extend_from_slice(history);

        let request = CompletionRequest {
            model: self.model.clone(),
            messages,
            max_tokens: self.max_tokens,
            temperature: self.temperature,
            top_p: Some(self.top_p),
        };

        match tokio::time::timeout(self.timeout, self.client.complete(&request)).await {
            Ok(Ok(draft)) => Ok(draft),
            Ok(Err(e)) => Err(PipelineError::WorkerFailure(sanitize_api_error(
                &e.to_string(),
            ))),
            Err(_) => Err(PipelineError::WorkerFailure(format!(
                "draft call timed out after {}s",
                self.timeout.as_secs_f64()
            ))),
        }
    }
}
