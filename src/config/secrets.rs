//! Flat TOML secrets store (`KEY = "value"` pairs)

use std::collections::HashMap;
use std::path::Path;

use super::ConfigError;

#[derive(Debug, Clone, Default)]
pub struct Secrets {
    values: HashMap<String, toml::Value>,
}

impl Secrets {
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_str(&content)
    }

    /// Like `from_file`, but a missing file is not an error.
    pub fn from_file_if_exists(path: &Path) -> Result<Option<Self>, ConfigError> {
        if !path.exists() {
            return Ok(None);
        }
        Self::from_file(path).map(Some)
    }

    pub fn from_str(content: &str) -> Result<Self, ConfigError> {
        let values: HashMap<String, toml::Value> = toml::from_str(content)?;
        Ok(Self { values })
    }

    /// String value for `key`; non-string values are ignored.
    pub fn get(&self, key: &str) -> Option<String> {
        self.values
            .get(key)
            .and_then(|v| v.as_str())
            .map(str::to_string)
    }
}
