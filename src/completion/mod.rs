//! Language-model completion client abstraction.
//!
//! The pipeline treats the completion service as a black box: role-tagged messages
//! in, one text completion out. The HTTP implementation speaks the OpenAI-compatible
//! `chat/completions` protocol, which hosted providers such as Groq expose verbatim.

use crate::config::get_config;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use thiserror::Error;

/// Errors surfaced by completion providers.
#[derive(Debug, Error)]
pub enum CompletionClientError {
    /// Provider could not be reached over the network.
    #[error("Completion provider unavailable: {0}")]
    ProviderUnavailable(String),
    /// Provider returned an error response.
    #[error("Failed to generate completion: {0}")]
    GenerationFailed(String),
    /// Provider response could not be parsed.
    #[error("Malformed provider response: {0}")]
    InvalidResponse(String),
}

/// Message author role understood by chat completion APIs.
#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Instructions framing the model's behavior.
    System,
    /// Content supplied on behalf of the caller.
    User,
}

/// One role-tagged message in a completion request.
#[derive(Debug, Clone, Serialize)]
pub struct ChatMessage {
    /// Author role of the message.
    pub role: Role,
    /// Message body.
    pub content: String,
}

impl ChatMessage {
    /// Build a system message.
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    /// Build a user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
}

/// Parameters for a single completion call.
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    /// Ordered role-tagged messages.
    pub messages: Vec<ChatMessage>,
    /// Upper bound on generated tokens.
    pub max_tokens: u32,
    /// Sampling temperature; the pipeline leans low for repeatable output.
    pub temperature: f32,
}

/// Interface implemented by completion backends.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    /// Issue one completion call and return the generated text.
    async fn complete(&self, request: CompletionRequest) -> Result<String, CompletionClientError>;
}

/// Completion client for OpenAI-compatible `chat/completions` endpoints.
pub struct OpenAiCompatClient {
    http: Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl OpenAiCompatClient {
    /// Construct a client for the given endpoint, key, and model.
    pub fn new(base_url: String, api_key: String, model: String) -> Self {
        let http = Client::builder()
            .user_agent("docqa/completion")
            .build()
            .expect("Failed to construct reqwest::Client for completions");
        Self {
            http,
            base_url,
            api_key,
            model,
        }
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url.trim_end_matches('/'))
    }
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    content: String,
}

#[async_trait]
impl CompletionClient for OpenAiCompatClient {
    async fn complete(&self, request: CompletionRequest) -> Result<String, CompletionClientError> {
        let payload = json!({
            "model": self.model,
            "messages": request.messages,
            "max_tokens": request.max_tokens,
            "temperature": request.temperature,
        });

        let response = self
            .http
            .post(self.endpoint())
            .bearer_auth(&self.api_key)
            .json(&payload)
            .send()
            .await
            .map_err(|error| {
                CompletionClientError::ProviderUnavailable(format!(
                    "failed to reach completion API at {}: {error}",
                    self.base_url
                ))
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(CompletionClientError::GenerationFailed(format!(
                "completion API returned {status}: {body}"
            )));
        }

        let body: ChatCompletionResponse = response.json().await.map_err(|error| {
            CompletionClientError::InvalidResponse(format!(
                "failed to decode completion response: {error}"
            ))
        })?;

        let choice = body.choices.into_iter().next().ok_or_else(|| {
            CompletionClientError::InvalidResponse("completion response had no choices".into())
        })?;

        Ok(choice.message.content.trim().to_string())
    }
}

/// Build a completion client from the loaded configuration.
pub fn get_completion_client() -> Arc<dyn CompletionClient> {
    let config = get_config();
    Arc::new(OpenAiCompatClient::new(
        config.completion_api_url.clone(),
        config.completion_api_key.clone(),
        config.completion_model.clone(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::{Method::POST, MockServer};

    fn test_client(base_url: String) -> OpenAiCompatClient {
        OpenAiCompatClient {
            http: Client::builder()
                .user_agent("docqa-test")
                .build()
                .expect("client"),
            base_url,
            api_key: "test-key".into(),
            model: "test-model".into(),
        }
    }

    fn request() -> CompletionRequest {
        CompletionRequest {
            messages: vec![
                ChatMessage::system("You are a helpful assistant."),
                ChatMessage::user("Say hi."),
            ],
            max_tokens: 32,
            temperature: 0.3,
        }
    }

    #[tokio::test]
    async fn decodes_successful_response() {
        let server = MockServer::start_async().await;
        let client = test_client(server.base_url());

        let mock = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/chat/completions")
                    .header("authorization", "Bearer test-key")
                    .json_body_partial(
                        r#"{"model": "test-model", "messages": [{"role": "system", "content": "You are a helpful assistant."}]}"#,
                    );
                then.status(200).json_body(json!({
                    "choices": [{"message": {"role": "assistant", "content": "  hi there  "}}]
                }));
            })
            .await;

        let text = client.complete(request()).await.expect("completion");
        mock.assert();
        assert_eq!(text, "hi there");
    }

    #[tokio::test]
    async fn surfaces_error_status_with_body() {
        let server = MockServer::start_async().await;
        let client = test_client(server.base_url());

        server
            .mock_async(|when, then| {
                when.method(POST).path("/chat/completions");
                then.status(429).body("rate limited");
            })
            .await;

        let error = client.complete(request()).await.expect_err("error status");
        match error {
            CompletionClientError::GenerationFailed(message) => {
                assert!(message.contains("429"), "{message}");
                assert!(message.contains("rate limited"), "{message}");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn rejects_response_without_choices() {
        let server = MockServer::start_async().await;
        let client = test_client(server.base_url());

        server
            .mock_async(|when, then| {
                when.method(POST).path("/chat/completions");
                then.status(200).json_body(json!({"choices": []}));
            })
            .await;

        let error = client.complete(request()).await.expect_err("no choices");
        assert!(matches!(error, CompletionClientError::InvalidResponse(_)));
    }
}
