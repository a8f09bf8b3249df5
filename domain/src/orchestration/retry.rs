//! Retry routing after the apply step.
//!
//! After every apply pass the workflow asks a [`RetryPolicy`] whether to
//! loop back to dispatch. Policies are plain predicates over [`RunState`],
//! so they can be tested without running a workflow.

use super::run_state::RunState;
use crate::review::Severity;
use serde::{Deserialize, Serialize};

/// Decides whether a run loops back to dispatch
pub trait RetryPolicy: Send + Sync {
    /// `true` to run another dispatch round
    fn should_retry(&self, state: &RunState) -> bool;

    /// Name used in logs
    fn name(&self) -> &str {
        "custom"
    }
}

impl<F> RetryPolicy for F
where
    F: Fn(&RunState) -> bool + Send + Sync,
{
    fn should_retry(&self, state: &RunState) -> bool {
        self(state)
    }
}

/// Configurable retry rules
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "policy", rename_all = "snake_case")]
pub enum RetryRule {
    /// Always proceed to output after the first apply pass
    Never,
    /// Retry while an unresolved issue at or above `threshold` remains
    UnresolvedSeverity { threshold: Severity },
}

impl Default for RetryRule {
    fn default() -> Self {
        RetryRule::UnresolvedSeverity {
            threshold: Severity::High,
        }
    }
}

impl RetryPolicy for RetryRule {
    fn should_retry(&self, state: &RunState) -> bool {
        if !state.can_retry() {
            return false;
        }
        match self {
            RetryRule::Never => false,
            RetryRule::UnresolvedSeverity { threshold } => {
                state.unresolved.iter().any(|u| u.severity >= *threshold)
            }
        }
    }

    fn name(&self) -> &str {
        match self {
            RetryRule::Never => "never",
            RetryRule::UnresolvedSeverity { .. } => "unresolved_severity",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::backend::BackendId;
    use crate::orchestration::value_objects::{Unresolved, UnresolvedReason};
    use crate::review::{Issue, IssueType};

    fn state_with(severity: Severity, retry_count: u32, max_retries: u32) -> RunState {
        let mut state = RunState::new("run", "branch", vec![], max_retries);
        state.retry_count = retry_count;
        let issue = Issue::new(BackendId::from("a"), "f.py", 1, IssueType::Logic, "m")
            .with_severity(severity);
        state.unresolved = vec![Unresolved::from_issue(&issue, UnresolvedReason::Unfixable)];
        state
    }

    #[test]
    fn test_never_retries() {
        assert!(!RetryRule::Never.should_retry(&state_with(Severity::Critical, 0, 5)));
    }

    #[test]
    fn test_retries_on_high_severity() {
        let rule = RetryRule::default();
        assert!(rule.should_retry(&state_with(Severity::High, 1, 3)));
        assert!(rule.should_retry(&state_with(Severity::Critical, 1, 3)));
        assert!(!rule.should_retry(&state_with(Severity::Medium, 1, 3)));
    }

    #[test]
    fn test_stops_at_max_retries() {
        let rule = RetryRule::default();
        assert!(!rule.should_retry(&state_with(Severity::Critical, 3, 3)));
    }

    #[test]
    fn test_no_unresolved_no_retry() {
        let mut state = state_with(Severity::Critical, 0, 3);
        state.unresolved.clear();
        assert!(!RetryRule::default().should_retry(&state));
    }

    #[test]
    fn test_closure_policy() {
        let policy = |state: &RunState| state.commits.is_empty();
        assert!(policy.should_retry(&state_with(Severity::Low, 0, 1)));
        assert_eq!(RetryPolicy::name(&policy), "custom");
    }

    #[test]
    fn test_rule_deserializes_from_tagged_form() {
        let rule: RetryRule =
            serde_json::from_str(r#"{"policy": "unresolved_severity", "threshold": "Critical"}"#)
                .unwrap();
        assert_eq!(
            rule,
            RetryRule::UnresolvedSeverity {
                threshold: Severity::Critical
            }
        );
    }
}
