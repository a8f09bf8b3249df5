//! Error types for the chat-completions adapter

use autofix_application::ports::llm_gateway::GatewayError;
use thiserror::Error;

/// Result type alias for chat-completions operations
pub type Result<T> = std::result::Result<T, ChatError>;

/// Errors that can occur when talking to a chat-completions endpoint
#[derive(Error, Debug)]
pub enum ChatError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("API key environment variable {0} is not set")]
    MissingApiKey(String),

    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },

    #[error("Response had no content")]
    EmptyResponse,
}

impl From<ChatError> for GatewayError {
    fn from(e: ChatError) -> Self {
        match e {
            ChatError::Http(err) if err.is_timeout() => GatewayError::Timeout,
            ChatError::Http(err) if err.is_connect() => {
                GatewayError::ConnectionError(err.to_string())
            }
            ChatError::Http(err) => GatewayError::RequestFailed(err.to_string()),
            ChatError::MissingApiKey(var) => {
                GatewayError::AuthenticationError(format!("{} is not set", var))
            }
            ChatError::Api { status, message } if status == 401 || status == 403 => {
                GatewayError::AuthenticationError(message)
            }
            ChatError::Api { status, message } if status == 404 => {
                GatewayError::ModelNotAvailable(message)
            }
            ChatError::Api { status, message } => {
                GatewayError::RequestFailed(format!("{}: {}", status, message))
            }
            ChatError::Serialization(err) => GatewayError::InvalidResponse(err.to_string()),
            ChatError::EmptyResponse => {
                GatewayError::InvalidResponse("response had no content".to_string())
            }
        }
    }
}
