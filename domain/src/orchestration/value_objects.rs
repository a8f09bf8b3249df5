//! Orchestration value objects - immutable results of a review run.
//!
//! - [`Unresolved`] - an issue the run did not fix, and why
//! - [`RoundSummary`] - counts for one dispatch → apply round
//! - [`RunReport`] - the serialized output handed to the result store

use crate::review::{BackendIssues, Commit, Fix, Issue, Severity};
use crate::scoring::Score;
use serde::{Deserialize, Serialize};

/// Why an issue stayed unresolved
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnresolvedReason {
    /// No backend offered replacement text for the location
    Unfixable,
    /// A moderator declined the fix
    Rejected,
    /// The applicator could not apply the fix (missing file, line out of range)
    Skipped,
}

/// An issue that is still open after a round
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Unresolved {
    pub file: String,
    pub line: u32,
    pub severity: Severity,
    pub message: String,
    pub reason: UnresolvedReason,
}

impl Unresolved {
    pub fn from_issue(issue: &Issue, reason: UnresolvedReason) -> Self {
        Self {
            file: issue.file.clone(),
            line: issue.line,
            severity: issue.severity,
            message: issue.message.clone(),
            reason,
        }
    }

    pub fn skipped(fix: &Fix) -> Self {
        Self {
            file: fix.file.clone(),
            line: fix.line,
            severity: fix.severity,
            message: fix.message.clone(),
            reason: UnresolvedReason::Skipped,
        }
    }
}

/// Counts for one dispatch → adjudicate → apply round
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundSummary {
    /// 1-based round number
    pub round: u32,
    pub issues_reported: usize,
    pub fixes_selected: usize,
    pub commits: usize,
    pub skipped: usize,
    /// Backends that reported nothing (failed, timed out, or found nothing)
    pub silent_backends: Vec<String>,
}

/// Final output of a run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    pub run_id: String,
    pub branch_name: String,
    pub commits: Vec<Commit>,
    pub fixes_applied: usize,
    pub score: Score,
    pub all_issues: BackendIssues,
    pub unresolved: Vec<Unresolved>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub push_error: Option<String>,
    pub pushed: bool,
    pub rounds: Vec<RoundSummary>,
}

impl RunReport {
    pub fn is_pushed(&self) -> bool {
        self.pushed
    }

    /// Total issues reported across all backends and rounds (not deduplicated)
    pub fn reported_issue_count(&self) -> usize {
        self.all_issues.total_issues()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::backend::BackendId;
    use crate::review::IssueType;

    #[test]
    fn test_unresolved_from_issue() {
        let issue = Issue::new(BackendId::from("a"), "x.go", 5, IssueType::Syntax, "missing brace")
            .with_severity(Severity::Critical);
        let unresolved = Unresolved::from_issue(&issue, UnresolvedReason::Unfixable);
        assert_eq!(unresolved.severity, Severity::Critical);
        assert_eq!(unresolved.reason, UnresolvedReason::Unfixable);
    }

    #[test]
    fn test_reason_serializes_snake_case() {
        let json = serde_json::to_string(&UnresolvedReason::Skipped).unwrap();
        assert_eq!(json, "\"skipped\"");
    }
}
