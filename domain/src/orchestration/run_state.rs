//! The single mutable record threaded through a run.

use super::value_objects::{RoundSummary, RunReport, Unresolved, UnresolvedReason};
use crate::review::{Adjudication, BackendIssues, CodeFile, Commit, Fix, IssueKey};
use crate::scoring::{Score, ScoreInputs};
use std::collections::BTreeSet;
use std::time::{Duration, Instant};

/// Mutable run state, owned by the workflow for the duration of one run.
///
/// `per_backend_issues`, `final_fixes` and `unresolved` describe the
/// current round; `all_issues`, `commits` and `rounds` accumulate.
#[derive(Debug, Clone)]
pub struct RunState {
    pub run_id: String,
    pub branch_name: String,
    pub code_files: Vec<CodeFile>,
    pub per_backend_issues: BackendIssues,
    pub all_issues: BackendIssues,
    pub final_fixes: Vec<Fix>,
    pub unresolved: Vec<Unresolved>,
    pub commits: Vec<Commit>,
    pub retry_count: u32,
    pub max_retries: u32,
    pub score: Option<Score>,
    pub pushed: bool,
    pub push_error: Option<String>,
    pub rounds: Vec<RoundSummary>,
    pub started_at: Instant,
    seen_keys: BTreeSet<IssueKey>,
}

impl RunState {
    /// `max_retries` is raised to 1: every run has at least one apply pass.
    pub fn new(
        run_id: impl Into<String>,
        branch_name: impl Into<String>,
        code_files: Vec<CodeFile>,
        max_retries: u32,
    ) -> Self {
        Self {
            run_id: run_id.into(),
            branch_name: branch_name.into(),
            code_files,
            per_backend_issues: BackendIssues::new(),
            all_issues: BackendIssues::new(),
            final_fixes: Vec::new(),
            unresolved: Vec::new(),
            commits: Vec::new(),
            retry_count: 0,
            max_retries: max_retries.max(1),
            score: None,
            pushed: false,
            push_error: None,
            rounds: Vec::new(),
            started_at: Instant::now(),
            seen_keys: BTreeSet::new(),
        }
    }

    /// Record one dispatch round's findings
    pub fn record_dispatch(&mut self, issues: BackendIssues) {
        self.seen_keys.extend(issues.flatten().map(|i| i.key()));
        self.all_issues.append(&issues);

        let silent_backends = issues
            .iter()
            .filter(|(_, list)| list.is_empty())
            .map(|(id, _)| id.to_string())
            .collect();

        self.rounds.push(RoundSummary {
            round: self.rounds.len() as u32 + 1,
            issues_reported: issues.total_issues(),
            silent_backends,
            ..Default::default()
        });
        self.per_backend_issues = issues;
    }

    /// Record the adjudicated fix list for the current round
    pub fn record_adjudication(&mut self, adjudication: Adjudication) {
        self.unresolved = adjudication
            .unfixable
            .iter()
            .map(|i| Unresolved::from_issue(i, UnresolvedReason::Unfixable))
            .chain(
                adjudication
                    .rejected
                    .iter()
                    .map(|i| Unresolved::from_issue(i, UnresolvedReason::Rejected)),
            )
            .collect();

        if let Some(round) = self.rounds.last_mut() {
            round.fixes_selected = adjudication.fixes.len();
        }
        self.final_fixes = adjudication.fixes;
    }

    /// Record the outcome of an apply pass and count it against `max_retries`
    pub fn record_apply(&mut self, commits: Vec<Commit>, skipped: &[Fix]) {
        self.unresolved.extend(skipped.iter().map(Unresolved::skipped));

        if let Some(round) = self.rounds.last_mut() {
            round.commits = commits.len();
            round.skipped = skipped.len();
        }
        self.commits.extend(commits);
        self.retry_count += 1;
    }

    /// Distinct `(file, line)` locations reported across all rounds
    pub fn total_issues(&self) -> usize {
        self.seen_keys.len()
    }

    pub fn fixes_applied(&self) -> usize {
        self.commits.len()
    }

    /// Measure elapsed time from `started_at` (the run start, before setup)
    pub fn with_started_at(mut self, started_at: Instant) -> Self {
        self.started_at = started_at;
        self
    }

    pub fn elapsed(&self) -> Duration {
        self.started_at.elapsed()
    }

    pub fn can_retry(&self) -> bool {
        self.retry_count < self.max_retries
    }

    pub fn score_inputs(&self, elapsed: Duration) -> ScoreInputs {
        ScoreInputs {
            total_issues: self.total_issues(),
            fixes_applied: self.fixes_applied(),
            commits_count: self.commits.len(),
            elapsed_minutes: elapsed.as_secs_f64() / 60.0,
        }
    }

    /// Compute and store the score
    pub fn finalize_score(&mut self, elapsed: Duration) -> &Score {
        self.score.insert(Score::compute(self.score_inputs(elapsed)))
    }

    /// Replace the snapshot of a file after it changed on disk
    pub fn refresh_files(&mut self, files: Vec<CodeFile>) {
        self.code_files = files;
    }

    /// Consume the state into the output record
    pub fn into_report(self, elapsed: Duration) -> RunReport {
        let score = self
            .score
            .clone()
            .unwrap_or_else(|| Score::compute(self.score_inputs(elapsed)));

        RunReport {
            run_id: self.run_id,
            branch_name: self.branch_name,
            fixes_applied: self.commits.len(),
            commits: self.commits,
            score,
            all_issues: self.all_issues,
            unresolved: self.unresolved,
            push_error: self.push_error,
            pushed: self.pushed,
            rounds: self.rounds,
        }
    }
}
