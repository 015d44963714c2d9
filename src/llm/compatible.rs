//! OpenAI-compatible chat completions client.
//! Azure AI inference, vLLM, Ollama's `/v1` shim and most hosted gateways
//! accept the same `/chat/completions` request shape.

use super::scrub::api_error;
use super::traits::CompletionClient;
use super::types::{AuthStyle, CompletionRequest};
use anyhow::Context;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

pub struct OpenAiCompatibleClient {
    pub(crate) name: String,
    pub(crate) base_url: String,
    /// Pre-computed `(header_name, header_value)` for auth (avoids `format!` per request).
    cached_auth: Option<(&'static str, String)>,
    /// Pre-computed chat completions URL.
    cached_chat_url: String,
    client: Client,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<Message<'a>>,
    max_tokens: u32,
    temperature: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    top_p: Option<f64>,
}

#[derive(Debug, Serialize)]
struct Message<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

impl OpenAiCompatibleClient {
    pub fn new(
        name: &str,
        base_url: &str,
        api_key: Option<&str>,
        auth_style: AuthStyle,
        timeout_secs: u64,
    ) -> Self {
        let base_url = base_url.trim_end_matches('/').to_string();
        let cached_chat_url = if base_url.ends_with("chat/completions") {
            base_url.clone()
        } else {
            format!("{base_url}/chat/completions")
        };

        let cached_auth = api_key.map(|k| match auth_style {
            AuthStyle::Bearer => ("Authorization", format!("Bearer {k}")),
            AuthStyle::ApiKey => ("api-key", k.to_string()),
        });

        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs.max(1)))
            .connect_timeout(Duration::from_secs(10))
            .pool_max_idle_per_host(10)
            .pool_idle_timeout(Duration::from_secs(90))
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            name: name.to_string(),
            base_url,
            cached_auth,
            cached_chat_url,
            client,
        }
    }

    fn chat_completions_url(&self) -> &str {
        &self.cached_chat_url
    }

    fn build_request(request: &CompletionRequest) -> ChatRequest<'_> {
        ChatRequest {
            model: &request.model,
            messages: request
                .messages
                .iter()
                .map(|m| Message {
                    role: m.role.as_str(),
                    content: &m.content,
                })
                .collect(),
            max_tokens: request.max_tokens,
            temperature: request.temperature,
            top_p: request.top_p,
        }
    }

    fn extract_text(&self, response: ChatResponse) -> anyhow::Result<String> {
        response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| anyhow::anyhow!("No response from {}", self.name))
    }

    async fn call_api(&self, request: &CompletionRequest) -> anyhow::Result<String> {
        let (header, value) = self.cached_auth.as_ref().ok_or_else(|| {
            anyhow::anyhow!(
                "{} API key not set. Set AEGIS_API_KEY or edit config.toml.",
                self.name
            )
        })?;

        let response = self
            .client
            .post(self.chat_completions_url())
            .header(*header, value)
            .json(&Self::build_request(request))
            .send()
            .await
            .with_context(|| format!("{} request failed", self.name))?;

        if !response.status().is_success() {
            return Err(api_error(&self.name, response).await);
        }

        let chat_response: ChatResponse = response
            .json()
            .await
            .with_context(|| format!("{} response JSON decode failed", self.name))?;
        self.extract_text(chat_response)
    }
}

impl CompletionClient for OpenAiCompatibleClient {
    fn name(&self) -> &str {
        &self.name
    }

    fn complete<'a>(
        &'a self,
        request: &'a CompletionRequest,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<String>> + Send + 'a>> {
        Box::pin(self.call_api(request))
    }
}
