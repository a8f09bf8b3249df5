//! Application-level configuration.
//!
//! [`WorkflowParams`] controls how the run workflow behaves: how many
//! rounds it may take, how long backends may run, and where it pushes.

use autofix_domain::RetryRule;
use std::time::Duration;

/// Default per-backend sweep timeout
pub const DEFAULT_BACKEND_TIMEOUT: Duration = Duration::from_secs(120);

/// Runtime parameters for a review run.
#[derive(Debug, Clone)]
pub struct WorkflowParams {
    /// Upper bound on apply passes (at least 1)
    pub max_retries: u32,
    /// Rule deciding whether to loop back to dispatch
    pub retry_rule: RetryRule,
    /// Time limit for one backend's sweep over the file set
    pub backend_timeout: Duration,
    /// Time limit for all dispatch work in the run
    pub run_deadline: Option<Duration>,
    /// Push the branch after the final apply pass
    pub push: bool,
    /// Remote to push to
    pub remote: String,
}

impl Default for WorkflowParams {
    fn default() -> Self {
        Self {
            max_retries: 3,
            retry_rule: RetryRule::default(),
            backend_timeout: DEFAULT_BACKEND_TIMEOUT,
            run_deadline: None,
            push: true,
            remote: "origin".to_string(),
        }
    }
}

impl WorkflowParams {
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries.max(1);
        self
    }

    pub fn with_retry_rule(mut self, rule: RetryRule) -> Self {
        self.retry_rule = rule;
        self
    }

    pub fn with_backend_timeout(mut self, timeout: Duration) -> Self {
        self.backend_timeout = timeout;
        self
    }

    pub fn with_run_deadline(mut self, deadline: Option<Duration>) -> Self {
        self.run_deadline = deadline;
        self
    }

    pub fn without_push(mut self) -> Self {
        self.push = false;
        self
    }

    pub fn with_remote(mut self, remote: impl Into<String>) -> Self {
        self.remote = remote.into();
        self
    }
}
