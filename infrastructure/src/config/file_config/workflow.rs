//! Workflow configuration from TOML (`[workflow]` section)

use autofix_application::config::DEFAULT_BACKEND_TIMEOUT;
use serde::{Deserialize, Serialize};

/// How conflicting proposals are resolved
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FileAdjudication {
    #[default]
    FirstSeen,
    Model,
}

/// Raw workflow configuration from TOML
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileWorkflowConfig {
    pub max_retries: u32,
    /// `unresolved_severity` or `never`
    pub retry_policy: String,
    /// Lowest unresolved severity that triggers another round
    pub retry_threshold: String,
    pub backend_timeout_seconds: u64,
    pub run_deadline_seconds: Option<u64>,
    /// Ceiling on the number of configured backends; each one runs concurrently
    pub max_concurrent_backends: usize,
    pub adjudication: FileAdjudication,
    /// Backend whose model arbitrates when `adjudication = "model"`
    pub arbiter: Option<String>,
    pub push: bool,
    pub remote: String,
}

impl Default for FileWorkflowConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            retry_policy: "unresolved_severity".to_string(),
            retry_threshold: "high".to_string(),
            backend_timeout_seconds: DEFAULT_BACKEND_TIMEOUT.as_secs(),
            run_deadline_seconds: None,
            max_concurrent_backends: 8,
            adjudication: FileAdjudication::FirstSeen,
            arbiter: None,
            push: true,
            remote: "origin".to_string(),
        }
    }
}
