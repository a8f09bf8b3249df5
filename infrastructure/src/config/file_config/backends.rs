//! Backend configuration from TOML (`[[backends]]` tables)

use serde::{Deserialize, Serialize};

pub const DEFAULT_BASE_URL: &str = "https://openrouter.ai/api/v1";
pub const DEFAULT_API_KEY_ENV: &str = "OPENROUTER_API_KEY";

/// One chat-completions backend
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileBackendConfig {
    pub name: String,
    pub model: String,
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Environment variable holding the API key; unset means no auth header
    #[serde(default = "default_api_key_env")]
    pub api_key_env: Option<String>,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_api_key_env() -> Option<String> {
    Some(DEFAULT_API_KEY_ENV.to_string())
}

impl FileBackendConfig {
    pub fn new(name: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            model: model.into(),
            base_url: default_base_url(),
            api_key_env: default_api_key_env(),
        }
    }
}

/// Built-in backend set used when no `[[backends]]` are configured
pub fn default_backends() -> Vec<FileBackendConfig> {
    vec![
        FileBackendConfig::new("openrouter", "anthropic/claude-3.5-sonnet"),
        FileBackendConfig::new("claude", "anthropic/claude-3.5-sonnet"),
        FileBackendConfig::new("gemini", "google/gemini-pro"),
    ]
}
