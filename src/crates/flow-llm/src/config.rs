//! Common configuration structures for LLM providers.

use crate::error::{LlmError, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for the local, Ollama-compatible provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocalLlmConfig {
    /// Base URL for the local LLM server, e.g. `http://localhost:11434`.
    pub base_url: String,
    /// Model name/identifier.
    pub model: String,
    /// Request timeout.
    #[serde(default = "default_timeout")]
    pub timeout: Duration,
}

impl LocalLlmConfig {
    pub fn new(base_url: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            model: model.into(),
            timeout: default_timeout(),
        }
    }
}

/// Configuration for the remote, OpenAI-compatible provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteLlmConfig {
    /// API key for authentication.
    pub api_key: String,
    /// Base URL for the API, e.g. `https://api.openai.com/v1`.
    pub base_url: String,
    /// Model name/identifier.
    pub model: String,
    /// Request timeout.
    #[serde(default = "default_timeout")]
    pub timeout: Duration,
}

impl RemoteLlmConfig {
    pub fn new(api_key: impl Into<String>, base_url: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: base_url.into(),
            model: model.into(),
            timeout: default_timeout(),
        }
    }

    /// Build from an environment variable holding the API key.
    pub fn from_env(env_var: &str, base_url: impl Into<String>, model: impl Into<String>) -> Result<Self> {
        let api_key = std::env::var(env_var)
            .map_err(|_| LlmError::ApiKeyNotFound(format!("environment variable: {env_var}")))?;
        Ok(Self::new(api_key, base_url, model))
    }
}

fn default_timeout() -> Duration {
    Duration::from_secs(60)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remote_config_from_env_reads_key() {
        std::env::set_var("FLOW_LLM_TEST_KEY", "sk-test");
        let config = RemoteLlmConfig::from_env("FLOW_LLM_TEST_KEY", "https://api.openai.com/v1", "gpt-4o-mini").unwrap();
        assert_eq!(config.api_key, "sk-test");
        std::env::remove_var("FLOW_LLM_TEST_KEY");
    }

    #[test]
    fn remote_config_missing_env_is_an_error() {
        std::env::remove_var("FLOW_LLM_MISSING_KEY");
        let err = RemoteLlmConfig::from_env("FLOW_LLM_MISSING_KEY", "https://api.openai.com/v1", "gpt-4o-mini").unwrap_err();
        assert!(matches!(err, LlmError::ApiKeyNotFound(_)));
    }
}
