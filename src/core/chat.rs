//! AI assistant backed by an OpenAI-compatible chat completions API.

use crate::{
    config::services::ChatConfig,
    errors::{Error, Result},
};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, warn};

/// Instructions sent ahead of every user message.
pub const SYSTEM_PROMPT: &str = "You are the PC Builder AI assistant, an expert in choosing \
components and assembling computers. Answer in the language the user writes in. Help with \
picking components (processor, graphics card, memory, power supply and so on), checking \
compatibility, performance and power draw, assembly guides, and recommendations for gaming, \
work or streaming. Be friendly, informative and practical. If the user just says hello, greet \
them and offer help. Never reveal API keys, credentials or server configuration.";

const TEMPERATURE: f32 = 0.7;
const MAX_TOKENS: u32 = 500;

/// Answers a single user message.
#[async_trait]
pub trait ChatClient: Send + Sync {
    /// Returns the assistant's reply.
    async fn reply(&self, message: &str) -> Result<String>;
}

/// Chat client used when no API key is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct DisabledChat;

#[async_trait]
impl ChatClient for DisabledChat {
    async fn reply(&self, _message: &str) -> Result<String> {
        Err(Error::ServiceUnavailable {
            service: "AI assistant",
        })
    }
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ReplyMessage,
}

#[derive(Debug, Deserialize)]
struct ReplyMessage {
    #[serde(default)]
    content: String,
}

/// Client for an OpenAI-compatible completions endpoint.
#[derive(Debug, Clone)]
pub struct OpenAiChat {
    client: reqwest::Client,
    config: ChatConfig,
}

impl OpenAiChat {
    /// Creates a client with the given endpoint, key and model.
    #[must_use]
    pub const fn new(client: reqwest::Client, config: ChatConfig) -> Self {
        Self { client, config }
    }
}

#[async_trait]
impl ChatClient for OpenAiChat {
    async fn reply(&self, message: &str) -> Result<String> {
        let request = CompletionRequest {
            model: &self.config.model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT,
                },
                ChatMessage {
                    role: "user",
                    content: message,
                },
            ],
            temperature: TEMPERATURE,
            max_tokens: MAX_TOKENS,
        };

        debug!("Sending chat request to model {}", self.config.model);
        let response = self
            .client
            .post(&self.config.url)
            .bearer_auth(&self.config.api_key)
            .header(reqwest::header::CACHE_CONTROL, "no-cache")
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            warn!("Chat API responded with {status}");
            return Err(Error::Upstream {
                service: "AI assistant",
                status: status.as_u16(),
            });
        }

        let body: CompletionResponse = response.json().await?;
        first_reply(body)
    }
}

fn first_reply(body: CompletionResponse) -> Result<String> {
    body.choices
        .into_iter()
        .next()
        .map(|choice| choice.message.content)
        .ok_or(Error::Upstream {
            service: "AI assistant",
            status: 200,
        })
}

/// Picks the real client when configured, the disabled one otherwise.
#[must_use]
pub fn chat_from_config(client: reqwest::Client, config: Option<ChatConfig>) -> Arc<dyn ChatClient> {
    match config {
        Some(config) => Arc::new(OpenAiChat::new(client, config)),
        None => Arc::new(DisabledChat),
    }
}

/// Validates the message and asks the assistant.
///
/// # Errors
/// Returns [`Error::Validation`] for a blank message, otherwise whatever the
/// client reports.
pub async fn ask(client: &dyn ChatClient, message: &str) -> Result<String> {
    let message = message.trim();
    if message.is_empty() {
        return Err(Error::validation("Message is required"));
    }
    client.reply(message).await
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::test_utils::FakeChat;

    #[tokio::test]
    async fn test_blank_message_rejected() {
        let result = ask(&FakeChat, "   ").await;
        assert!(matches!(result, Err(Error::Validation { message: _ })));
    }

    #[tokio::test]
    async fn test_message_is_trimmed_before_sending() {
        let reply = ask(&FakeChat, "  which GPU?  ").await.unwrap();
        assert_eq!(reply, "echo: which GPU?");
    }

    #[tokio::test]
    async fn test_disabled_chat_is_unavailable() {
        let result = ask(&DisabledChat, "hello").await;
        assert!(matches!(result, Err(Error::ServiceUnavailable { .. })));
    }

    #[test]
    fn test_first_reply_parsing() {
        let body: CompletionResponse = serde_json::from_value(serde_json::json!({
            "choices": [{"message": {"role": "assistant", "content": "Pick the RX 7800 XT."}}]
        }))
        .unwrap();
        assert_eq!(first_reply(body).unwrap(), "Pick the RX 7800 XT.");
    }

    #[test]
    fn test_empty_choices_is_upstream_error() {
        let body: CompletionResponse = serde_json::from_value(serde_json::json!({})).unwrap();
        assert!(matches!(first_reply(body), Err(Error::Upstream { .. })));
    }
}
