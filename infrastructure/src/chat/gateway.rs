//! Chat-completions LLM Gateway implementation

use crate::chat::error::{ChatError, Result};
use crate::chat::protocol::{ChatMessage, completions_url};
use crate::chat::session::ChatCompletionsSession;
use async_trait::async_trait;
use autofix_application::ports::llm_gateway::{GatewayError, LlmGateway, LlmSession};
use std::time::Duration;
use tracing::{debug, info};

/// Default HTTP timeout for one completion request
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(90);

/// LLM Gateway for an OpenAI-compatible chat-completions endpoint
pub struct ChatCompletionsGateway {
    client: reqwest::Client,
    url: String,
    api_key: Option<String>,
}

impl ChatCompletionsGateway {
    /// Create a gateway for `base_url`.
    ///
    /// When `api_key_env` is given, the key is read from that environment
    /// variable now; a missing variable is an error.
    pub fn new(base_url: &str, api_key_env: Option<&str>) -> Result<Self> {
        let api_key = match api_key_env {
            Some(var) => Some(
                std::env::var(var)
                    .ok()
                    .filter(|key| !key.trim().is_empty())
                    .ok_or_else(|| ChatError::MissingApiKey(var.to_string()))?,
            ),
            None => None,
        };
        Self::with_api_key(base_url, api_key)
    }

    /// Create a gateway with an explicit key (or none for local servers)
    pub fn with_api_key(base_url: &str, api_key: Option<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(DEFAULT_REQUEST_TIMEOUT)
            .build()?;
        let url = completions_url(base_url);

        info!("ChatCompletionsGateway initialized for {}", url);

        Ok(Self {
            client,
            url,
            api_key,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl LlmGateway for ChatCompletionsGateway {
    async fn create_session_with_system_prompt(
        &self,
        model: &str,
        system_prompt: &str,
    ) -> std::result::Result<Box<dyn LlmSession>, GatewayError> {
        debug!("Creating chat session for {}", model);
        Ok(Box::new(ChatCompletionsSession::new(
            self.client.clone(),
            self.url.clone(),
            self.api_key.clone(),
            model.to_string(),
            vec![ChatMessage::system(system_prompt)],
        )))
    }
}
