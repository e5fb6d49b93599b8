//! Application configuration
//!
//! Resolution order, later wins: built-in defaults, TOML config file,
//! `ADVISOR_*` environment variables, command-line overrides. The credential
//! comes from the environment first and the secrets file second; without it
//! the application refuses to start.

pub mod file;
pub mod prompts;
pub mod secrets;

use std::env;
use std::fmt;
use std::path::{Path, PathBuf};

pub use file::{ConfigError, DisplayConfig, FileConfig};
pub use secrets::Secrets;

/// Secrets file consulted when no `[prompt] secrets_file` is configured
pub const DEFAULT_SECRETS_FILE: &str = ".advisor/secrets.toml";

/// Provider presets understood by `providers::from_config`
pub const SUPPORTED_PROVIDERS: &[&str] = &["mistral", "openai", "groq"];

/// Values that take precedence over everything else (command-line flags)
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub provider: Option<String>,
    pub model: Option<String>,
}

#[derive(Clone)]
pub struct Config {
    pub provider: String,
    pub model: String,
    pub endpoint: Option<String>,
    pub api_key: String,
    pub timeout_secs: u64,
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
    pub prompt_file: Option<PathBuf>,
    pub display: DisplayConfig,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("provider", &self.provider)
            .field("model", &self.model)
            .field("endpoint", &self.endpoint)
            .field("api_key", &"<redacted>")
            .field("timeout_secs", &self.timeout_secs)
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .field("prompt_file", &self.prompt_file)
            .finish()
    }
}

impl Config {
    /// Load from the process environment and an optional config file.
    pub fn load(path: Option<&Path>, overrides: Overrides) -> Result<Self, ConfigError> {
        let file = match path {
            Some(path) => {
                tracing::debug!(path = %path.display(), "Loading config file");
                FileConfig::from_file(path)?
            }
            None => FileConfig::default(),
        };

        Self::resolve(file, overrides, |key| env::var(key).ok())
    }

    /// Merge a parsed config file with environment lookups and overrides.
    pub fn resolve<F>(file: FileConfig, overrides: Overrides, env: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let lookup = |key: &str| env(key).filter(|v| !v.trim().is_empty());

        let provider = overrides
            .provider
            .or_else(|| lookup("ADVISOR_PROVIDER"))
            .unwrap_or(file.llm.provider)
            .to_lowercase();

        if !SUPPORTED_PROVIDERS.contains(&provider.as_str()) {
            return Err(ConfigError::UnknownProvider(provider));
        }

        let model = overrides
            .model
            .or_else(|| lookup("ADVISOR_MODEL"))
            .unwrap_or(file.llm.model);

        let endpoint = lookup("ADVISOR_ENDPOINT").or(file.llm.endpoint);

        let key_var = file
            .llm
            .api_key_env
            .clone()
            .unwrap_or_else(|| default_key_var(&provider).to_string());

        let api_key = match lookup(&key_var) {
            Some(key) => {
                tracing::debug!(var = %key_var, "Credential found in environment");
                key
            }
            None => {
                let secrets = match file.prompt.secrets_file {
                    Some(ref path) => Some(Secrets::from_file(path)?),
                    None => Secrets::from_file_if_exists(Path::new(DEFAULT_SECRETS_FILE))?,
                };
                secrets
                    .and_then(|s| s.get(&key_var))
                    .filter(|v| !v.trim().is_empty())
                    .ok_or_else(|| ConfigError::MissingCredential(key_var.clone()))?
            }
        };

        if file.llm.timeout_secs == 0 {
            return Err(ConfigError::Validation(
                "llm.timeout_secs must be greater than zero".to_string(),
            ));
        }

        Ok(Self {
            provider,
            model,
            endpoint,
            api_key,
            timeout_secs: file.llm.timeout_secs,
            temperature: file.llm.temperature,
            max_tokens: file.llm.max_tokens,
            prompt_file: file.prompt.file,
            display: file.advisor,
        })
    }

    /// System instruction: the configured template, or the built-in one.
    pub async fn load_instruction(&self) -> Result<String, ConfigError> {
        Ok(prompts::resolve_instruction(self.prompt_file.as_deref()).await?)
    }

    #[cfg(test)]
    pub fn for_tests() -> Self {
        let file = FileConfig::default();
        Self {
            provider: file.llm.provider,
            model: file.llm.model,
            endpoint: None,
            api_key: "test-key".to_string(),
            timeout_secs: file.llm.timeout_secs,
            temperature: None,
            max_tokens: None,
            prompt_file: None,
            display: file.advisor,
        }
    }
}

/// Conventional credential variable for each provider preset
fn default_key_var(provider: &str) -> &'static str {
    match provider {
        "openai" => "OPENAI_API_KEY",
        "groq" => "GROQ_API_KEY",
        _ => "MISTRAL_API_KEY",
    }
}
