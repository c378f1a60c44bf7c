//! Thin multi-provider LLM client consumed only by the ReAct agent node.
//!
//! Per SPEC_FULL.md §4.J this is deliberately not a general LLM framework:
//! the ReAct node needs exactly one blocking JSON-mode completion per
//! iteration, so the contract is a single trait method,
//! [`LlmClient::complete_json`], implemented for one remote (OpenAI-compatible
//! chat completion) and one local (Ollama-compatible) provider.

pub mod config;
pub mod error;
pub mod local;
pub mod remote;

use async_trait::async_trait;
use serde_json::Value;

pub use config::{LocalLlmConfig, RemoteLlmConfig};
pub use error::{LlmError, Result};

/// Role of a single chat message in the conversation sent to the model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// One message in the conversation history passed to [`LlmClient::complete_json`].
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn system(content: impl Into<String>) -> Self {
        Self { role: Role::System, content: content.into() }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self { role: Role::User, content: content.into() }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self { role: Role::Assistant, content: content.into() }
    }
}

/// A provider capable of producing exactly one JSON-mode completion for a
/// system prompt plus a message history. Implementations are expected to
/// request/parse a single JSON object from the model and return it as a
/// [`serde_json::Value`] — the ReAct agent deserializes `{thought, action,
/// args}` out of whatever comes back.
#[async_trait]
pub trait LlmClient: Send + Sync {
    async fn complete_json(&self, system: &str, messages: &[Message]) -> Result<Value>;
}

/// Which provider the ReAct agent should use, resolved from configuration.
#[derive(Debug, Clone)]
pub enum ProviderChoice {
    Remote(RemoteLlmConfig),
    Local(LocalLlmConfig),
}

/// Build the configured [`LlmClient`] implementation.
pub fn build_client(choice: ProviderChoice) -> Box<dyn LlmClient> {
    match choice {
        ProviderChoice::Remote(config) => Box::new(remote::openai::OpenAiClient::new(config)),
        ProviderChoice::Local(config) => Box::new(local::ollama::OllamaClient::new(config)),
    }
}
