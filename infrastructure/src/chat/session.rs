//! Chat-completions session.
//!
//! Provides [`ChatCompletionsSession`] which implements [`LlmSession`] by
//! replaying the conversation history on every request.

use crate::chat::error::{ChatError, Result};
use crate::chat::protocol::{ChatMessage, ChatRequest, ChatResponse, ErrorEnvelope};
use async_trait::async_trait;
use autofix_application::ports::llm_gateway::{GatewayError, LlmSession};
use std::sync::Mutex;
use tracing::debug;

const MAX_TOKENS: u32 = 2048;
const MAX_ERROR_LEN: usize = 200;

pub struct ChatCompletionsSession {
    client: reqwest::Client,
    url: String,
    api_key: Option<String>,
    model: String,
    history: Mutex<Vec<ChatMessage>>,
}

impl ChatCompletionsSession {
    pub fn new(
        client: reqwest::Client,
        url: String,
        api_key: Option<String>,
        model: String,
        history: Vec<ChatMessage>,
    ) -> Self {
        Self {
            client,
            url,
            api_key,
            model,
            history: Mutex::new(history),
        }
    }

    fn snapshot_with(&self, content: &str) -> Vec<ChatMessage> {
        let mut messages = self
            .history
            .lock()
            .map(|h| h.clone())
            .unwrap_or_default();
        messages.push(ChatMessage::user(content));
        messages
    }

    async fn complete(&self, messages: &[ChatMessage]) -> Result<String> {
        let request = ChatRequest {
            model: &self.model,
            messages,
            max_tokens: MAX_TOKENS,
            temperature: 0.0,
        };

        let mut builder = self.client.post(&self.url).json(&request);
        if let Some(key) = &self.api_key {
            builder = builder.bearer_auth(key);
        }

        let response = builder.send().await?;
        let status = response.status();
        let text = response.text().await?;

        // Some providers report upstream failures in a 200 body
        if let Ok(envelope) = serde_json::from_str::<ErrorEnvelope>(&text) {
            return Err(ChatError::Api {
                status: status.as_u16(),
                message: truncate(&envelope.error.message),
            });
        }

        if !status.is_success() {
            return Err(ChatError::Api {
                status: status.as_u16(),
                message: truncate(&text),
            });
        }

        let parsed: ChatResponse = serde_json::from_str(&text)?;
        parsed.into_text().ok_or(ChatError::EmptyResponse)
    }
}

fn truncate(text: &str) -> String {
    match text.char_indices().nth(MAX_ERROR_LEN) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}

#[async_trait]
impl LlmSession for ChatCompletionsSession {
    fn model(&self) -> &str {
        &self.model
    }

    async fn send(&self, content: &str) -> std::result::Result<String, GatewayError> {
        let messages = self.snapshot_with(content);
        debug!("Sending {} messages to {}", messages.len(), self.model);

        let reply = self.complete(&messages).await?;

        if let Ok(mut history) = self.history.lock() {
            history.push(ChatMessage::user(content));
            history.push(ChatMessage::assistant(reply.clone()));
        }
        Ok(reply)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_long_error() {
        let long = "e".repeat(500);
        let cut = truncate(&long);
        assert_eq!(cut.len(), MAX_ERROR_LEN + 3);
        assert_eq!(truncate("short"), "short");
    }

    #[test]
    fn test_snapshot_appends_user_message() {
        let session = ChatCompletionsSession::new(
            reqwest::Client::new(),
            "http://localhost:1/v1/chat/completions".to_string(),
            None,
            "m".to_string(),
            vec![ChatMessage::system("sys")],
        );
        let messages = session.snapshot_with("hello");
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[1], ChatMessage::user("hello"));
    }

    #[tokio::test]
    async fn test_unreachable_server_maps_to_gateway_error() {
        let session = ChatCompletionsSession::new(
            reqwest::Client::new(),
            "http://127.0.0.1:1/v1/chat/completions".to_string(),
            None,
            "m".to_string(),
            vec![],
        );
        assert!(session.send("hi").await.is_err());
    }
}
