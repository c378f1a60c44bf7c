//! Ollama-compatible local chat completion client.
//!
//! Grounded on the teacher's `llm::local::OllamaClient` for the `/api/chat`
//! request shape, trimmed to the single JSON-mode call the ReAct agent needs.
//! Ollama's `format: "json"` option constrains the model to emit a single
//! JSON object per response, same contract as the remote provider's
//! `response_format: json_object`.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::LocalLlmConfig;
use crate::error::{LlmError, Result};
use crate::{LlmClient, Message, Role};

pub struct OllamaClient {
    config: LocalLlmConfig,
    client: Client,
}

impl OllamaClient {
    pub fn new(config: LocalLlmConfig) -> Self {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .expect("failed to build HTTP client");
        Self { config, client }
    }

    fn convert_role(role: Role) -> &'static str {
        match role {
            Role::System => "system",
            Role::User => "user",
            // Ollama has no distinct tool role in the chat endpoint; assistant
            // history replays verbatim.
            Role::Assistant => "assistant",
        }
    }
}

#[async_trait]
impl LlmClient for OllamaClient {
    async fn complete_json(&self, system: &str, messages: &[Message]) -> Result<Value> {
        let url = format!("{}/api/chat", self.config.base_url);

        let mut wire_messages = vec![OllamaMessage { role: "system", content: system.to_string() }];
        wire_messages.extend(messages.iter().map(|m| OllamaMessage {
            role: Self::convert_role(m.role),
            content: m.content.clone(),
        }));

        let body = OllamaRequest {
            model: &self.config.model,
            messages: wire_messages,
            format: "json",
            stream: false,
        };

        let response = self.client.post(&url).json(&body).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(LlmError::Provider(format!("ollama API error {status}: {text}")));
        }

        let parsed: OllamaResponse = response.json().await?;
        serde_json::from_str(&parsed.message.content).map_err(|e| LlmError::InvalidResponse(e.to_string()))
    }
}

#[derive(Debug, Serialize)]
struct OllamaMessage {
    role: &'static str,
    content: String,
}

#[derive(Debug, Serialize)]
struct OllamaRequest<'a> {
    model: &'a str,
    messages: Vec<OllamaMessage>,
    format: &'static str,
    stream: bool,
}

#[derive(Debug, Deserialize)]
struct OllamaResponse {
    message: OllamaResponseMessage,
}

#[derive(Debug, Deserialize)]
struct OllamaResponseMessage {
    content: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_construction_does_not_panic() {
        let config = LocalLlmConfig::new("http://localhost:11434", "llama3");
        let _client = OllamaClient::new(config);
    }
}
