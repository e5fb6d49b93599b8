//! Advisor configuration loaded from TOML files
//!
//! Every section is optional; an empty file yields the built-in defaults:
//! - `[advisor]` texts shown by the terminal
//! - `[llm]` provider, model and credential settings
//! - `[prompt]` system prompt template and secrets store locations

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Root file configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FileConfig {
    /// Display texts
    #[serde(default)]
    pub advisor: DisplayConfig,

    /// LLM provider settings
    #[serde(default)]
    pub llm: LlmConfig,

    /// Prompt and secrets locations
    #[serde(default)]
    pub prompt: PromptConfig,
}

impl FileConfig {
    /// Load configuration from a TOML file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: FileConfig = toml::from_str(&content)?;
        Ok(config)
    }

    /// Load configuration from a TOML string
    pub fn from_str(content: &str) -> Result<Self, ConfigError> {
        let config: FileConfig = toml::from_str(content)?;
        Ok(config)
    }
}

/// Texts rendered by the display surface
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisplayConfig {
    #[serde(default = "default_title")]
    pub title: String,

    #[serde(default = "default_welcome")]
    pub welcome: String,

    /// Shown in front of the input line
    #[serde(default = "default_input_hint")]
    pub input_hint: String,
}

fn default_title() -> String {
    "💰 ShetJi Loan Advisor - AI Loan Assistant".to_string()
}

fn default_welcome() -> String {
    "Welcome to ShetJi Loan Advisor! I can assist you with:\n\
     - Understanding loan types\n\
     - Loan eligibility assessment\n\
     - Interest rates and monthly payments\n\
     - Application process guidance"
        .to_string()
}

fn default_input_hint() -> String {
    "Ask me about loans...".to_string()
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            title: default_title(),
            welcome: default_welcome(),
            input_hint: default_input_hint(),
        }
    }
}

/// LLM provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// Provider name: "mistral", "openai", "groq"
    #[serde(default = "default_provider")]
    pub provider: String,

    /// Model to use
    #[serde(default = "default_model")]
    pub model: String,

    /// Environment variable (and secrets key) holding the API key
    #[serde(default)]
    pub api_key_env: Option<String>,

    /// Custom API endpoint
    #[serde(default)]
    pub endpoint: Option<String>,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    #[serde(default)]
    pub temperature: Option<f32>,

    #[serde(default)]
    pub max_tokens: Option<u32>,
}

fn default_provider() -> String {
    "mistral".to_string()
}

fn default_model() -> String {
    "mistral-medium".to_string()
}

fn default_timeout_secs() -> u64 {
    120
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            model: default_model(),
            api_key_env: None,
            endpoint: None,
            timeout_secs: default_timeout_secs(),
            temperature: None,
            max_tokens: None,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PromptConfig {
    /// Prompt template replacing the built-in loan advisor instruction
    #[serde(default)]
    pub file: Option<PathBuf>,

    /// TOML secrets store consulted when the key is not in the environment
    #[serde(default)]
    pub secrets_file: Option<PathBuf>,
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("No API key found: set {0} in the environment or the secrets file")]
    MissingCredential(String),

    #[error("Unknown provider: {0} (expected mistral, openai or groq)")]
    UnknownProvider(String),

    #[error("Prompt template error: {0}")]
    Prompt(#[from] super::prompts::PromptError),

    #[error("Validation error: {0}")]
    Validation(String),
}
