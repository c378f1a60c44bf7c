//! Error types for LLM provider implementations.

use thiserror::Error;

/// Result type for LLM operations.
pub type Result<T> = std::result::Result<T, LlmError>;

/// Errors that can occur when working with LLM providers.
#[derive(Debug, Error)]
pub enum LlmError {
    /// HTTP request failed.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Failed to serialize/deserialize data.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// API authentication failed.
    #[error("authentication failed: {0}")]
    Authentication(String),

    /// API key not found in environment.
    #[error("API key not found: {0}")]
    ApiKeyNotFound(String),

    /// Rate limit exceeded; the HTTP surface maps this to a 429.
    #[error("rate limit exceeded: {0}")]
    RateLimitExceeded(String),

    /// Invalid or unparseable response from the provider.
    #[error("invalid response: {0}")]
    InvalidResponse(String),

    /// General provider error not covered by a more specific variant.
    #[error("provider error: {0}")]
    Provider(String),
}

impl LlmError {
    /// Whether the HTTP surface should map this error to a 429 response.
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, LlmError::RateLimitExceeded(_))
    }
}
