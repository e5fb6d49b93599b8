//! AI provider integrations

mod openai_compat;

use async_trait::async_trait;
use thiserror::Error;

use crate::config::Config;
use crate::conversation::Message;

pub use openai_compat::{OpenAICompatConfig, OpenAICompatProvider};

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("Unknown provider: {0}")]
    UnknownProvider(String),

    #[error("Request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

/// One generated alternative. Content may be null on the wire.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Candidate {
    pub content: Option<String>,
}

impl Candidate {
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: Some(content.into()),
        }
    }
}

/// Result of a single chat call; zero candidates is a valid outcome.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Completion {
    pub candidates: Vec<Candidate>,
}

impl Completion {
    pub fn single(content: impl Into<String>) -> Self {
        Self {
            candidates: vec![Candidate::text(content)],
        }
    }

    /// Text of the first candidate, if there is one and it has content.
    pub fn first_text(&self) -> Option<&str> {
        self.candidates.first().and_then(|c| c.content.as_deref())
    }
}

/// A text-generation backend taking an ordered message list and a model id.
#[async_trait]
pub trait ChatProvider: Send + Sync {
    fn name(&self) -> &str;

    async fn chat(&self, messages: &[Message], model: &str) -> Result<Completion, ProviderError>;
}

/// Build the provider named in the resolved configuration.
pub fn from_config(config: &Config) -> Result<Box<dyn ChatProvider>, ProviderError> {
    let mut preset = match config.provider.to_lowercase().as_str() {
        "mistral" => OpenAICompatConfig::mistral(config.api_key.clone()),
        "openai" => OpenAICompatConfig::openai(config.api_key.clone()),
        "groq" => OpenAICompatConfig::groq(config.api_key.clone()),
        other => return Err(ProviderError::UnknownProvider(other.to_string())),
    };

    if let Some(ref endpoint) = config.endpoint {
        preset.base_url = endpoint.trim_end_matches('/').to_string();
    }
    preset.default_model = config.model.clone();
    preset.timeout_secs = config.timeout_secs;
    preset.temperature = config.temperature;
    preset.max_tokens = config.max_tokens;

    Ok(Box::new(OpenAICompatProvider::new(preset)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_for(provider: &str) -> Config {
        Config {
            provider: provider.to_string(),
            ..Config::for_tests()
        }
    }

    #[test]
    fn test_first_text() {
        assert_eq!(Completion::single("ok").first_text(), Some("ok"));
        assert_eq!(Completion::default().first_text(), None);

        let null_first = Completion {
            candidates: vec![Candidate::default(), Candidate::text("second")],
        };
        assert_eq!(null_first.first_text(), None);
    }

    #[test]
    fn test_from_config_known_providers() {
        for name in ["mistral", "openai", "Groq"] {
            let provider = from_config(&config_for(name)).unwrap();
            assert_eq!(provider.name(), name.to_lowercase());
        }
    }

    #[test]
    fn test_from_config_unknown_provider() {
        let err = from_config(&config_for("ollama")).err().unwrap();
        assert!(matches!(err, ProviderError::UnknownProvider(ref p) if p == "ollama"));
    }
}
