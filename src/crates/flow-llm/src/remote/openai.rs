//! OpenAI-compatible chat-completion client, used in JSON response mode.
//!
//! Grounded on the teacher's `llm::remote::OpenAiClient` for the request/
//! response shape and header conventions, trimmed to the single call the
//! ReAct agent needs.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::RemoteLlmConfig;
use crate::error::{LlmError, Result};
use crate::{LlmClient, Message, Role};

/// OpenAI (or OpenAI-compatible) chat completion client.
pub struct OpenAiClient {
    config: RemoteLlmConfig,
    client: Client,
}

impl OpenAiClient {
    pub fn new(config: RemoteLlmConfig) -> Self {
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
            Role::Assistant => "assistant",
        }
    }
}

#[async_trait]
impl LlmClient for OpenAiClient {
    async fn complete_json(&self, system: &str, messages: &[Message]) -> Result<Value> {
        let url = format!("{}/chat/completions", self.config.base_url);

        let mut wire_messages = vec![OpenAiMessage { role: "system", content: system.to_string() }];
        wire_messages.extend(messages.iter().map(|m| OpenAiMessage {
            role: Self::convert_role(m.role),
            content: m.content.clone(),
        }));

        let body = OpenAiRequest {
            model: &self.config.model,
            messages: wire_messages,
            response_format: ResponseFormat { format_type: "json_object" },
            temperature: 0.2,
        };

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.config.api_key)
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(match status.as_u16() {
                401 => LlmError::Authentication(text),
                429 => LlmError::RateLimitExceeded(text),
                _ => LlmError::Provider(format!("openai API error {status}: {text}")),
            });
        }

        let parsed: OpenAiResponse = response.json().await?;
        let content = parsed
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| LlmError::InvalidResponse("no choices in response".into()))?;

        serde_json::from_str(&content).map_err(|e| LlmError::InvalidResponse(e.to_string()))
    }
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    format_type: &'static str,
}

#[derive(Debug, Serialize)]
struct OpenAiRequest<'a> {
    model: &'a str,
    messages: Vec<OpenAiMessage>,
    response_format: ResponseFormat,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct OpenAiMessage {
    role: &'static str,
    content: String,
}

#[derive(Debug, Deserialize)]
struct OpenAiResponse {
    choices: Vec<OpenAiChoice>,
}

#[derive(Debug, Deserialize)]
struct OpenAiChoice {
    message: OpenAiResponseMessage,
}

#[derive(Debug, Deserialize)]
struct OpenAiResponseMessage {
    content: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_construction_does_not_panic() {
        let config = RemoteLlmConfig::new("test-key", "https://api.openai.com/v1", "gpt-4o-mini");
        let _client = OpenAiClient::new(config);
    }
}
