//! Hosted LLM backend
//!
//! OpenAI-compatible chat completions, as served by OpenRouter.

use async_trait::async_trait;
use reqwest::{header, Client};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

use super::build_client;

/// System prompt sent with every health question
pub fn system_prompt(region: &str) -> String {
    format!(
        "You are a helpful health assistant for the people of {}, India. Provide accurate, clear health information in simple language. Be concise and helpful. Focus on preventive healthcare, disease symptoms, and vaccination information.",
        region
    )
}

/// Error types for LLM operations.
#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    /// No API key configured
    #[error("Backend unavailable: {0}")]
    Unavailable(String),

    #[error("Request failed: {0}")]
    RequestFailed(String),

    #[error("Rate limited")]
    RateLimited,

    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Parse error: {0}")]
    ParseError(String),
}

/// Request for a single-turn completion.
#[derive(Debug, Clone, Default)]
pub struct CompletionRequest {
    pub system_prompt: Option<String>,
    pub prompt: String,
    pub max_tokens: Option<u32>,
    pub temperature: Option<f32>,
}

impl CompletionRequest {
    pub fn user(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            ..Default::default()
        }
    }

    pub fn with_system(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = Some(prompt.into());
        self
    }

    pub fn with_max_tokens(mut self, max: u32) -> Self {
        self.max_tokens = Some(max);
        self
    }

    /// Set temperature (clamped to 0.0-2.0)
    pub fn with_temperature(mut self, temp: f32) -> Self {
        self.temperature = Some(temp.clamp(0.0, 2.0));
        self
    }
}

/// A chat-completion backend
#[async_trait]
pub trait LlmBackend: Send + Sync {
    /// Model identifier
    fn id(&self) -> &str;

    /// Generate a completion; returns the trimmed text
    async fn complete(&self, request: CompletionRequest) -> Result<String, LlmError>;
}

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: MessageResponse,
}

#[derive(Debug, Deserialize)]
struct MessageResponse {
    content: Option<String>,
}

/// OpenRouter (OpenAI-compatible) backend
pub struct OpenRouterBackend {
    client: Client,
    base_url: String,
    api_key: Option<String>,
    model: String,
    app_title: String,
}

impl OpenRouterBackend {
    pub fn new(
        base_url: impl Into<String>,
        model: impl Into<String>,
        api_key: Option<String>,
        timeout: Duration,
    ) -> Self {
        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::CONTENT_TYPE,
            header::HeaderValue::from_static("application/json"),
        );

        let client = build_client(
            Client::builder()
                .default_headers(headers)
                .timeout(timeout),
            "llm",
        );

        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.filter(|k| !k.is_empty()),
            model: model.into(),
            app_title: "Health Chatbot".to_string(),
        }
    }

    /// Set the `X-Title` attribution header
    pub fn with_app_title(mut self, title: impl Into<String>) -> Self {
        self.app_title = title.into();
        self
    }

    fn chat_completions_url(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }
}

#[async_trait]
impl LlmBackend for OpenRouterBackend {
    fn id(&self) -> &str {
        &self.model
    }

    async fn complete(&self, request: CompletionRequest) -> Result<String, LlmError> {
        let Some(api_key) = self.api_key.as_deref() else {
            return Err(LlmError::Unavailable("API key not configured".to_string()));
        };

        let mut messages = Vec::with_capacity(2);
        if let Some(system) = request.system_prompt {
            messages.push(ChatMessage {
                role: "system",
                content: system,
            });
        }
        messages.push(ChatMessage {
            role: "user",
            content: request.prompt,
        });

        let chat_request = ChatRequest {
            model: self.model.clone(),
            messages,
            max_tokens: request.max_tokens,
            temperature: request.temperature,
        };

        let response = self
            .client
            .post(self.chat_completions_url())
            .header(header::AUTHORIZATION, format!("Bearer {}", api_key))
            .header("HTTP-Referer", "http://localhost:8000")
            .header("X-Title", &self.app_title)
            .json(&chat_request)
            .send()
            .await
            .map_err(|e| LlmError::NetworkError(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();

            if status.as_u16() == 429 {
                return Err(LlmError::RateLimited);
            }

            return Err(LlmError::RequestFailed(format!("HTTP {}: {}", status, body)));
        }

        let chat_response: ChatResponse = response
            .json()
            .await
            .map_err(|e| LlmError::ParseError(e.to_string()))?;

        let content = chat_response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| LlmError::ParseError("No choices in response".to_string()))?
            .message
            .content
            .unwrap_or_default();

        debug!(model = %self.model, chars = content.len(), "LLM completion received");
        Ok(content.trim().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{header as header_eq, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn backend(uri: &str, key: Option<&str>) -> OpenRouterBackend {
        OpenRouterBackend::new(
            uri,
            "test-model",
            key.map(String::from),
            Duration::from_secs(5),
        )
    }

    #[tokio::test]
    async fn test_no_key_is_unavailable() {
        let err = backend("http://127.0.0.1:9", None)
            .complete(CompletionRequest::user("hi"))
            .await
            .unwrap_err();
        assert!(matches!(err, LlmError::Unavailable(_)));

        let err = backend("http://127.0.0.1:9", Some(""))
            .complete(CompletionRequest::user("hi"))
            .await
            .unwrap_err();
        assert!(matches!(err, LlmError::Unavailable(_)));
    }

    #[tokio::test]
    async fn test_completion_is_trimmed() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(header_eq("authorization", "Bearer sk-test"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "choices": [{"message": {"role": "assistant", "content": "  Drink clean water.\n"}}]
            })))
            .mount(&server)
            .await;

        let text = backend(&server.uri(), Some("sk-test"))
            .complete(
                CompletionRequest::user("How to avoid cholera?")
                    .with_system(system_prompt("Odisha"))
                    .with_max_tokens(500)
                    .with_temperature(0.7),
            )
            .await
            .unwrap();
        assert_eq!(text, "Drink clean water.");
    }

    #[tokio::test]
    async fn test_rate_limit_and_errors() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(429))
            .mount(&server)
            .await;

        let err = backend(&server.uri(), Some("k"))
            .complete(CompletionRequest::user("q"))
            .await
            .unwrap_err();
        assert!(matches!(err, LlmError::RateLimited));
    }

    #[tokio::test]
    async fn test_empty_choices_is_parse_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"choices": []})))
            .mount(&server)
            .await;

        let err = backend(&server.uri(), Some("k"))
            .complete(CompletionRequest::user("q"))
            .await
            .unwrap_err();
        assert!(matches!(err, LlmError::ParseError(_)));
    }

    #[test]
    fn test_temperature_clamped() {
        let req = CompletionRequest::user("q").with_temperature(5.0);
        assert_eq!(req.temperature, Some(2.0));
    }
}
