//! OpenAI-compatible provider
//!
//! Works with any API that implements the chat completions format:
//! - Mistral (api.mistral.ai)
//! - OpenAI (api.openai.com)
//! - Groq (api.groq.com)
//!
//! # Configuration
//!
//! ```toml
//! [llm]
//! provider = "mistral"
//! endpoint = "https://api.mistral.ai/v1"
//! api_key_env = "MISTRAL_API_KEY"
//! model = "mistral-medium"
//! ```

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::conversation::Message;

use super::{Candidate, ChatProvider, Completion, ProviderError};

/// Wire form of a chat message
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    content: String,
}

impl From<&Message> for ChatMessage {
    fn from(msg: &Message) -> Self {
        Self {
            role: msg.role.as_str().to_string(),
            content: msg.content.clone(),
        }
    }
}

/// Chat completion request
#[derive(Debug, Serialize)]
struct ChatCompletionRequest {
    model: String,
    messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
}

/// Chat completion response
#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Option<Vec<Choice>>,
    #[serde(default)]
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    #[serde(default)]
    message: Option<ResponseMessage>,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Usage {
    prompt_tokens: u32,
    completion_tokens: u32,
}

/// Error body in the OpenAI shape: `{"error": {"message": ...}}`
#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: ApiError,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    message: String,
}

/// Error body in the Mistral shape: `{"message": ..., "type": ...}`
#[derive(Debug, Deserialize)]
struct FlatErrorResponse {
    message: String,
}

fn api_error_message(body: &str) -> Option<String> {
    if let Ok(resp) = serde_json::from_str::<ErrorResponse>(body) {
        return Some(resp.error.message);
    }
    serde_json::from_str::<FlatErrorResponse>(body)
        .ok()
        .map(|resp| resp.message)
}

/// OpenAI-compatible provider configuration
#[derive(Debug, Clone)]
pub struct OpenAICompatConfig {
    /// Provider label used in logs
    pub name: String,
    /// Base URL for the API (e.g., https://api.mistral.ai/v1)
    pub base_url: String,
    /// API key sent as a bearer token
    pub api_key: String,
    /// Model used when the caller passes an empty model id
    pub default_model: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
}

impl OpenAICompatConfig {
    /// Create config for Mistral
    pub fn mistral(api_key: impl Into<String>) -> Self {
        Self {
            name: "mistral".to_string(),
            base_url: "https://api.mistral.ai/v1".to_string(),
            api_key: api_key.into(),
            default_model: "mistral-medium".to_string(),
            timeout_secs: 120,
            temperature: None,
            max_tokens: None,
        }
    }

    /// Create config for OpenAI
    pub fn openai(api_key: impl Into<String>) -> Self {
        Self {
            name: "openai".to_string(),
            base_url: "https://api.openai.com/v1".to_string(),
            default_model: "gpt-4o-mini".to_string(),
            ..Self::mistral(api_key)
        }
    }

    /// Create config for Groq
    pub fn groq(api_key: impl Into<String>) -> Self {
        Self {
            name: "groq".to_string(),
            base_url: "https://api.groq.com/openai/v1".to_string(),
            default_model: "llama-3.3-70b-versatile".to_string(),
            timeout_secs: 60,
            ..Self::mistral(api_key)
        }
    }
}

/// OpenAI-compatible API provider
pub struct OpenAICompatProvider {
    config: OpenAICompatConfig,
    client: Client,
}

impl OpenAICompatProvider {
    /// Create a new provider with the given configuration
    pub fn new(config: OpenAICompatConfig) -> Result<Self, ProviderError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self { config, client })
    }
}

#[async_trait]
impl ChatProvider for OpenAICompatProvider {
    fn name(&self) -> &str {
        &self.config.name
    }

    async fn chat(&self, messages: &[Message], model: &str) -> Result<Completion, ProviderError> {
        let url = format!("{}/chat/completions", self.config.base_url);

        let request = ChatCompletionRequest {
            model: if model.is_empty() {
                self.config.default_model.clone()
            } else {
                model.to_string()
            },
            messages: messages.iter().map(ChatMessage::from).collect(),
            temperature: self.config.temperature,
            max_tokens: self.config.max_tokens,
        };

        tracing::debug!(
            provider = %self.config.name,
            model = %request.model,
            messages = request.messages.len(),
            "Sending chat completion request"
        );

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.config.api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(ProviderError::InvalidResponse(match api_error_message(&body) {
                Some(message) => format!("API error ({}): {}", status, message),
                None => format!("HTTP {}: {}", status, body),
            }));
        }

        let completion: Option<ChatCompletionResponse> =
            serde_json::from_str(&body).map_err(|e| {
                ProviderError::InvalidResponse(format!(
                    "Failed to parse response: {} - Body: {}",
                    e, body
                ))
            })?;

        let Some(completion) = completion else {
            tracing::warn!(provider = %self.config.name, "Null completion body");
            return Ok(Completion::default());
        };

        if let Some(usage) = completion.usage {
            tracing::debug!(
                prompt_tokens = usage.prompt_tokens,
                completion_tokens = usage.completion_tokens,
                "Completion usage"
            );
        }

        let candidates = completion
            .choices
            .unwrap_or_default()
            .into_iter()
            .map(|choice| {
                if let Some(reason) = choice.finish_reason {
                    tracing::trace!(finish_reason = %reason, "Candidate finished");
                }
                Candidate {
                    content: choice.message.and_then(|m| m.content),
                }
            })
            .collect();

        Ok(Completion { candidates })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::Method::POST;
    use httpmock::MockServer;
    use serde_json::json;

    fn provider_for(server: &MockServer) -> OpenAICompatProvider {
        let mut config = OpenAICompatConfig::mistral("test-key");
        config.base_url = server.base_url();
        OpenAICompatProvider::new(config).unwrap()
    }

    fn request() -> Vec<Message> {
        vec![
            Message::system("You are a loan advisor."),
            Message::user("I want a home loan."),
        ]
    }

    #[test]
    fn test_config_presets() {
        let mistral = OpenAICompatConfig::mistral("m-key");
        assert!(mistral.base_url.contains("mistral.ai"));
        assert_eq!(mistral.default_model, "mistral-medium");
        assert_eq!(mistral.api_key, "m-key");

        let openai = OpenAICompatConfig::openai("o-key");
        assert!(openai.base_url.contains("openai.com"));
        assert_eq!(openai.name, "openai");

        let groq = OpenAICompatConfig::groq("g-key");
        assert!(groq.base_url.contains("groq.com"));
        assert_eq!(groq.timeout_secs, 60);
    }

    #[test]
    fn test_message_conversion() {
        let msg = Message::user("Hello");
        let chat_msg = ChatMessage::from(&msg);
        assert_eq!(chat_msg.role, "user");
        assert_eq!(chat_msg.content, "Hello");
    }

    #[test]
    fn test_api_error_message_shapes() {
        assert_eq!(
            api_error_message(r#"{"error":{"message":"bad key","type":"auth"}}"#).as_deref(),
            Some("bad key")
        );
        assert_eq!(
            api_error_message(r#"{"object":"error","message":"Unauthorized","type":"invalid_request_error"}"#)
                .as_deref(),
            Some("Unauthorized")
        );
        assert!(api_error_message("gateway timeout").is_none());
    }

    #[tokio::test]
    async fn test_chat_returns_candidates() {
        let server = MockServer::start_async().await;
        let chat_mock = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/chat/completions")
                    .header("authorization", "Bearer test-key");
                then.status(200)
                    .header("content-type", "application/json")
                    .json_body(json!({
                        "id": "cmpl-1",
                        "choices": [
                            {
                                "index": 0,
                                "message": {"role": "assistant", "content": "Eligibility, application, or rates?"},
                                "finish_reason": "stop"
                            }
                        ],
                        "usage": {"prompt_tokens": 12, "completion_tokens": 6, "total_tokens": 18}
                    }));
            })
            .await;

        let provider = provider_for(&server);
        let completion = provider.chat(&request(), "mistral-medium").await.unwrap();

        chat_mock.assert_calls(1);
        assert_eq!(completion.candidates.len(), 1);
        assert_eq!(completion.first_text(), Some("Eligibility, application, or rates?"));
    }

    #[tokio::test]
    async fn test_chat_without_choices_is_empty() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/chat/completions");
                then.status(200).json_body(json!({"id": "cmpl-2", "choices": []}));
            })
            .await;

        let completion = provider_for(&server).chat(&request(), "").await.unwrap();
        assert!(completion.candidates.is_empty());
    }

    #[tokio::test]
    async fn test_chat_null_choices_is_empty() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/chat/completions");
                then.status(200).json_body(json!({"id": "cmpl-3", "choices": null}));
            })
            .await;

        let completion = provider_for(&server).chat(&request(), "").await.unwrap();
        assert!(completion.candidates.is_empty());
        assert_eq!(completion.first_text(), None);
    }

    #[tokio::test]
    async fn test_chat_null_message_has_no_content() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/chat/completions");
                then.status(200).json_body(json!({
                    "id": "cmpl-4",
                    "choices": [{"index": 0, "message": null, "finish_reason": "stop"}]
                }));
            })
            .await;

        let completion = provider_for(&server).chat(&request(), "").await.unwrap();
        assert_eq!(completion.candidates, vec![Candidate { content: None }]);
        assert_eq!(completion.first_text(), None);
    }

    #[tokio::test]
    async fn test_chat_null_body_is_empty() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/chat/completions");
                then.status(200).body("null");
            })
            .await;

        let completion = provider_for(&server).chat(&request(), "").await.unwrap();
        assert_eq!(completion, Completion::default());
    }

    #[tokio::test]
    async fn test_chat_error_status() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/chat/completions");
                then.status(401)
                    .json_body(json!({"message": "Unauthorized", "type": "invalid_request_error"}));
            })
            .await;

        let err = provider_for(&server).chat(&request(), "").await.unwrap_err();
        match err {
            ProviderError::InvalidResponse(msg) => assert!(msg.contains("Unauthorized")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_chat_unparseable_body() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/chat/completions");
                then.status(200).body("<html>oops</html>");
            })
            .await;

        let err = provider_for(&server).chat(&request(), "").await.unwrap_err();
        assert!(matches!(err, ProviderError::InvalidResponse(_)));
    }
}
