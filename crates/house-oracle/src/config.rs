//! Oracle Configuration
//!
//! Orchestrator tuning comes from TOML; LLM credentials come from the
//! environment so they never land in a config file.

use std::env;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error::LlmError;

pub const ENV_API_KEY: &str = "HOUSE_LLM_API_KEY";
pub const ENV_BASE_URL: &str = "HOUSE_LLM_BASE_URL";
pub const ENV_MODEL: &str = "HOUSE_LLM_MODEL";
pub const ENV_TIMEOUT_SECS: &str = "HOUSE_LLM_TIMEOUT_SECS";

const DEFAULT_BASE_URL: &str = "https://api.anthropic.com";
const DEFAULT_MODEL: &str = "claude-3-5-haiku-20241022";
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Orchestrator settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OracleConfig {
    /// Minimum gap between two external calls
    pub min_call_interval_ms: u64,
    /// Upper bound on a single external call
    pub request_timeout_secs: u64,
    /// Skip the external call entirely and always fall back
    pub fail_open: bool,
    /// Trailing window for consecutive-failure tracking
    pub error_window_secs: u64,
    /// Failures beyond this count within the window raise a notice
    pub error_threshold: u32,
    /// Fallback vetoes to save a nominee the holder likes more than this
    pub veto_relationship_threshold: f64,
    pub max_tokens: u32,
    pub temperature: f32,
}

impl Default for OracleConfig {
    fn default() -> Self {
        Self {
            min_call_interval_ms: 1_000,
            request_timeout_secs: DEFAULT_TIMEOUT_SECS,
            fail_open: false,
            error_window_secs: 300,
            error_threshold: 3,
            veto_relationship_threshold: 50.0,
            max_tokens: 512,
            temperature: 0.7,
        }
    }
}

impl OracleConfig {
    pub fn from_file(path: &Path) -> Result<Self, OracleConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, OracleConfigError> {
        Ok(toml::from_str(content)?)
    }

    pub fn min_call_interval(&self) -> Duration {
        Duration::from_millis(self.min_call_interval_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn error_window(&self) -> Duration {
        Duration::from_secs(self.error_window_secs)
    }
}

#[derive(Debug, Error)]
pub enum OracleConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
}

/// Connection settings for the HTTP client
#[derive(Debug, Clone)]
pub struct LlmConfig {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
    pub timeout: Duration,
}

impl LlmConfig {
    /// Reads the credential and overrides from the environment.
    ///
    /// A missing or blank API key is [`LlmError::MissingCredential`]; the
    /// orchestrator then runs on fallback decisions only.
    pub fn from_env() -> Result<Self, LlmError> {
        let api_key = env::var(ENV_API_KEY)
            .ok()
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
            .ok_or(LlmError::MissingCredential)?;

        let base_url = env::var(ENV_BASE_URL)
            .map(|value| value.trim().to_string())
            .unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());

        let model = env::var(ENV_MODEL)
            .map(|value| value.trim().to_string())
            .unwrap_or_else(|_| DEFAULT_MODEL.to_string());

        let timeout = env::var(ENV_TIMEOUT_SECS)
            .ok()
            .and_then(|value| value.parse::<u64>().ok())
            .filter(|value| *value > 0)
            .map(Duration::from_secs)
            .unwrap_or_else(|| Duration::from_secs(DEFAULT_TIMEOUT_SECS));

        Ok(Self {
            api_key,
            base_url,
            model,
            timeout,
        })
    }

    pub fn messages_url(&self) -> String {
        format!("{}/v1/messages", self.base_url.trim_end_matches('/'))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_toml() {
        let config = OracleConfig::from_toml_str("fail_open = true\nerror_threshold = 5\n").unwrap();
        assert!(config.fail_open);
        assert_eq!(config.error_threshold, 5);
        assert_eq!(config.error_window(), Duration::from_secs(300));
    }

    #[test]
    fn test_messages_url_trims_slash() {
        let config = LlmConfig {
            api_key: "k".to_string(),
            base_url: "http://localhost:8080/".to_string(),
            model: DEFAULT_MODEL.to_string(),
            timeout: Duration::from_secs(1),
        };
        assert_eq!(config.messages_url(), "http://localhost:8080/v1/messages");
    }
}
