//! Raw TOML configuration data types
//!
//! These structs mirror the config file. [`FileConfig::to_workflow_params`]
//! converts the `[workflow]` section into application-layer parameters.

mod backends;
mod output;
mod source;
mod workflow;

pub use backends::{DEFAULT_API_KEY_ENV, DEFAULT_BASE_URL, FileBackendConfig, default_backends};
pub use output::FileOutputConfig;
pub use source::FileSourceConfig;
pub use workflow::{FileAdjudication, FileWorkflowConfig};

use autofix_application::WorkflowParams;
use autofix_domain::{RetryRule, Severity};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::time::Duration;
use thiserror::Error;

/// Configuration validation errors
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigValidationError {
    #[error("workflow.backend_timeout_seconds cannot be 0")]
    InvalidTimeout,

    #[error("workflow.run_deadline_seconds cannot be 0")]
    InvalidDeadline,

    #[error("workflow.max_retries must be at least 1")]
    InvalidMaxRetries,

    #[error("workflow.max_concurrent_backends must be at least 1")]
    InvalidConcurrency,

    #[error("{count} backends configured but workflow.max_concurrent_backends is {max}")]
    TooManyBackends { count: usize, max: usize },

    #[error("unknown retry_policy '{0}' (expected 'unresolved_severity' or 'never')")]
    UnknownRetryPolicy(String),

    #[error("unknown retry_threshold '{0}'")]
    UnknownRetryThreshold(String),

    #[error("backend name cannot be empty")]
    EmptyBackendName,

    #[error("backend '{0}' has an empty model name")]
    EmptyModelName(String),

    #[error("duplicate backend name '{0}'")]
    DuplicateBackend(String),

    #[error("no backends configured")]
    NoBackends,

    #[error("adjudication = \"model\" requires workflow.arbiter")]
    MissingArbiter,

    #[error("arbiter '{0}' is not a configured backend")]
    UnknownArbiter(String),

    #[error("source.max_files must be at least 1")]
    InvalidMaxFiles,
}

/// Complete file configuration (raw TOML structure)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    pub workflow: FileWorkflowConfig,
    pub source: FileSourceConfig,
    pub backends: Vec<FileBackendConfig>,
    pub output: FileOutputConfig,
}

impl Default for FileConfig {
    fn default() -> Self {
        Self {
            workflow: FileWorkflowConfig::default(),
            source: FileSourceConfig::default(),
            backends: default_backends(),
            output: FileOutputConfig::default(),
        }
    }
}

impl FileConfig {
    /// Validate the configuration, stopping at the first problem
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        let workflow = &self.workflow;
        if workflow.backend_timeout_seconds == 0 {
            return Err(ConfigValidationError::InvalidTimeout);
        }
        if workflow.run_deadline_seconds == Some(0) {
            return Err(ConfigValidationError::InvalidDeadline);
        }
        if workflow.max_retries == 0 {
            return Err(ConfigValidationError::InvalidMaxRetries);
        }
        if workflow.max_concurrent_backends == 0 {
            return Err(ConfigValidationError::InvalidConcurrency);
        }
        if self.source.max_files == 0 {
            return Err(ConfigValidationError::InvalidMaxFiles);
        }
        self.retry_rule()?;

        if self.backends.is_empty() {
            return Err(ConfigValidationError::NoBackends);
        }
        if self.backends.len() > workflow.max_concurrent_backends {
            return Err(ConfigValidationError::TooManyBackends {
                count: self.backends.len(),
                max: workflow.max_concurrent_backends,
            });
        }
        let mut seen = HashSet::new();
        for backend in &self.backends {
            if backend.name.trim().is_empty() {
                return Err(ConfigValidationError::EmptyBackendName);
            }
            if backend.model.trim().is_empty() {
                return Err(ConfigValidationError::EmptyModelName(backend.name.clone()));
            }
            if !seen.insert(backend.name.as_str()) {
                return Err(ConfigValidationError::DuplicateBackend(backend.name.clone()));
            }
        }

        match (&workflow.adjudication, &workflow.arbiter) {
            (FileAdjudication::Model, None) => return Err(ConfigValidationError::MissingArbiter),
            (_, Some(arbiter)) if self.backend(arbiter).is_none() => {
                return Err(ConfigValidationError::UnknownArbiter(arbiter.clone()));
            }
            _ => {}
        }

        Ok(())
    }

    pub fn backend(&self, name: &str) -> Option<&FileBackendConfig> {
        self.backends.iter().find(|b| b.name == name)
    }

    /// Retry rule named by `retry_policy` / `retry_threshold`
    pub fn retry_rule(&self) -> Result<RetryRule, ConfigValidationError> {
        let policy = self.workflow.retry_policy.trim().to_lowercase();
        match policy.as_str() {
            "never" => Ok(RetryRule::Never),
            "unresolved_severity" => {
                let threshold = self
                    .workflow
                    .retry_threshold
                    .parse::<Severity>()
                    .map_err(|_| {
                        ConfigValidationError::UnknownRetryThreshold(
                            self.workflow.retry_threshold.clone(),
                        )
                    })?;
                Ok(RetryRule::UnresolvedSeverity { threshold })
            }
            _ => Err(ConfigValidationError::UnknownRetryPolicy(
                self.workflow.retry_policy.clone(),
            )),
        }
    }

    /// Convert the `[workflow]` section into application parameters
    pub fn to_workflow_params(&self) -> Result<WorkflowParams, ConfigValidationError> {
        let workflow = &self.workflow;
        let mut params = WorkflowParams::default()
            .with_max_retries(workflow.max_retries)
            .with_retry_rule(self.retry_rule()?)
            .with_backend_timeout(Duration::from_secs(workflow.backend_timeout_seconds))
            .with_run_deadline(workflow.run_deadline_seconds.map(Duration::from_secs))
            .with_remote(workflow.remote.clone());

        if !workflow.push {
            params = params.without_push();
        }
        Ok(params)
    }
}
