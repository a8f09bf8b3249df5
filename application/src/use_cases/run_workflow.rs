//! Run Workflow use case
//!
//! Drives one review run through the workflow graph:
//! Setup → Dispatch → Adjudicate → Apply → (Retry → Dispatch)* → Output → Terminal.

use crate::config::WorkflowParams;
use crate::ports::analysis_backend::AnalysisBackend;
use crate::ports::code_source::{CodeSource, CodeSourceError};
use crate::ports::progress::{NoProgress, ProgressNotifier};
use crate::ports::result_store::{NoResultStore, ResultStore};
use crate::ports::run_event_logger::{NoRunEventLogger, RunEvent, RunEventLogger};
use crate::ports::working_copy::{WorkingCopy, WorkingCopyError};
use crate::use_cases::adjudicate::{AdjudicationStrategy, FirstSeenWins};
use crate::use_cases::apply_patches::PatchApplicator;
use crate::use_cases::dispatch::FanOutDispatcher;
use autofix_domain::{
    DomainError, RetryPolicy, RunReport, RunState, WorkflowGraph, WorkflowState, branch_name,
};
use serde_json::json;
use std::sync::Arc;
use std::time::Instant;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Errors that end a run before it reaches `Output`
#[derive(Error, Debug)]
pub enum RunWorkflowError {
    #[error("No analysis backends registered")]
    NoBackends,

    #[error("Failed to acquire code files: {0}")]
    Source(#[from] CodeSourceError),

    #[error("Failed to prepare branch {branch}: {source}")]
    Branch {
        branch: String,
        #[source]
        source: WorkingCopyError,
    },

    #[error(transparent)]
    Domain(#[from] DomainError),
}

/// Input for the RunWorkflow use case
#[derive(Debug, Clone)]
pub struct RunWorkflowInput {
    pub run_id: String,
    pub team_name: String,
    pub team_leader: String,
}

impl RunWorkflowInput {
    pub fn new(
        run_id: impl Into<String>,
        team_name: impl Into<String>,
        team_leader: impl Into<String>,
    ) -> Self {
        Self {
            run_id: run_id.into(),
            team_name: team_name.into(),
            team_leader: team_leader.into(),
        }
    }
}

/// Use case for running a full review
pub struct RunWorkflowUseCase {
    dispatcher: FanOutDispatcher,
    code_source: Arc<dyn CodeSource>,
    working_copy: Arc<dyn WorkingCopy>,
    applicator: PatchApplicator,
    adjudicator: Arc<dyn AdjudicationStrategy>,
    retry_policy: Arc<dyn RetryPolicy>,
    result_store: Arc<dyn ResultStore>,
    events: Arc<dyn RunEventLogger>,
    params: WorkflowParams,
}

impl RunWorkflowUseCase {
    pub fn new(
        backends: Vec<Arc<dyn AnalysisBackend>>,
        code_source: Arc<dyn CodeSource>,
        working_copy: Arc<dyn WorkingCopy>,
    ) -> Self {
        let params = WorkflowParams::default();
        Self {
            dispatcher: FanOutDispatcher::new(backends, params.backend_timeout),
            code_source,
            applicator: PatchApplicator::new(Arc::clone(&working_copy)),
            working_copy,
            adjudicator: Arc::new(FirstSeenWins),
            retry_policy: Arc::new(params.retry_rule),
            result_store: Arc::new(NoResultStore),
            events: Arc::new(NoRunEventLogger),
            params,
        }
    }

    /// Replace the workflow parameters; also resets the retry policy to
    /// `params.retry_rule`.
    pub fn with_params(mut self, params: WorkflowParams) -> Self {
        self.dispatcher = self.dispatcher.with_backend_timeout(params.backend_timeout);
        self.retry_policy = Arc::new(params.retry_rule);
        self.params = params;
        self
    }

    pub fn with_adjudicator(mut self, adjudicator: Arc<dyn AdjudicationStrategy>) -> Self {
        self.adjudicator = adjudicator;
        self
    }

    pub fn with_retry_policy(mut self, policy: Arc<dyn RetryPolicy>) -> Self {
        self.retry_policy = policy;
        self
    }

    pub fn with_result_store(mut self, store: Arc<dyn ResultStore>) -> Self {
        self.result_store = store;
        self
    }

    pub fn with_event_logger(mut self, events: Arc<dyn RunEventLogger>) -> Self {
        self.events = events;
        self
    }

    /// Execute the use case with default (no-op) progress
    pub async fn execute(&self, input: RunWorkflowInput) -> Result<RunReport, RunWorkflowError> {
        self.execute_with_progress(input, &NoProgress).await
    }

    /// Execute the use case with progress callbacks
    pub async fn execute_with_progress(
        &self,
        input: RunWorkflowInput,
        progress: &dyn ProgressNotifier,
    ) -> Result<RunReport, RunWorkflowError> {
        let started_at = Instant::now();
        let mut graph = WorkflowGraph::new();
        self.notify_state(&graph, progress);

        let mut state = self.setup(&input, started_at).await?;

        let deadline = CancellationToken::new();
        let timer = self.params.run_deadline.map(|limit| {
            let token = deadline.clone();
            tokio::spawn(async move {
                tokio::time::sleep(limit).await;
                token.cancel();
            })
        });

        let mut next = WorkflowState::Dispatch;
        loop {
            graph.advance(next)?;
            self.notify_state(&graph, progress);

            next = match graph.current() {
                WorkflowState::Dispatch => {
                    self.dispatch(&mut state, &deadline, progress).await;
                    WorkflowState::Adjudicate
                }
                WorkflowState::Adjudicate => {
                    let adjudication = self.adjudicator.adjudicate(&state.per_backend_issues).await;
                    info!(
                        "Adjudication ({}) selected {} fixes, {} unresolved",
                        self.adjudicator.name(),
                        adjudication.fixes.len(),
                        adjudication.unresolved().count()
                    );
                    state.record_adjudication(adjudication);
                    WorkflowState::Apply
                }
                WorkflowState::Apply => {
                    let outcome = self
                        .applicator
                        .apply(&state.final_fixes, progress, self.events.as_ref())
                        .await;
                    let skipped = outcome.skipped_fixes();
                    state.record_apply(outcome.commits, &skipped);

                    if state.can_retry() && self.retry_policy.should_retry(&state) {
                        info!(
                            "Retry policy {} requested another round ({}/{})",
                            self.retry_policy.name(),
                            state.retry_count,
                            state.max_retries
                        );
                        WorkflowState::Retry
                    } else {
                        WorkflowState::Output
                    }
                }
                WorkflowState::Retry => {
                    self.refresh_files(&mut state).await;
                    WorkflowState::Dispatch
                }
                WorkflowState::Output => break,
                other => {
                    return Err(DomainError::IllegalTransition {
                        from: other.to_string(),
                        to: WorkflowState::Dispatch.to_string(),
                    }
                    .into());
                }
            };
        }

        if let Some(timer) = timer {
            timer.abort();
        }

        let report = self.output(state).await;

        graph.advance(WorkflowState::Terminal)?;
        self.notify_state(&graph, progress);
        Ok(report)
    }

    /// Setup: derive and prepare the branch, then acquire files from it.
    ///
    /// Files are read only after the branch is checked out, so line numbers
    /// reported by backends match the content the fixes are applied to.
    async fn setup(
        &self,
        input: &RunWorkflowInput,
        started_at: Instant,
    ) -> Result<RunState, RunWorkflowError> {
        if self.dispatcher.is_empty() {
            return Err(RunWorkflowError::NoBackends);
        }

        let branch = branch_name(&input.team_name, &input.team_leader);
        self.working_copy
            .prepare_branch(&branch)
            .await
            .map_err(|source| RunWorkflowError::Branch {
                branch: branch.clone(),
                source,
            })?;
        info!("Working on branch {}", branch);

        let files = self.code_source.load().await?;
        info!("Loaded {} code files", files.len());

        Ok(
            RunState::new(input.run_id.clone(), branch, files, self.params.max_retries)
                .with_started_at(started_at),
        )
    }

    async fn dispatch(
        &self,
        state: &mut RunState,
        deadline: &CancellationToken,
        progress: &dyn ProgressNotifier,
    ) {
        let round = state.rounds.len() as u32 + 1;
        progress.on_dispatch_start(round, &self.dispatcher.backend_ids(), state.code_files.len());

        let issues = self
            .dispatcher
            .dispatch(&state.code_files, deadline, progress, self.events.as_ref())
            .await;
        progress.on_dispatch_complete();

        info!(
            "Round {}: {} issues from {} backends",
            round,
            issues.total_issues(),
            issues.len()
        );
        state.record_dispatch(issues);
    }

    /// Re-read every file so the next round reviews the patched content
    async fn refresh_files(&self, state: &mut RunState) {
        let mut refreshed = Vec::with_capacity(state.code_files.len());

        for file in &state.code_files {
            match self.working_copy.read_file(&file.path).await {
                Ok(Some(content)) => {
                    let mut file = file.clone();
                    file.content = content;
                    refreshed.push(file);
                }
                Ok(None) => debug!("{} no longer exists, dropping it", file.path),
                Err(e) => {
                    warn!("Failed to refresh {}: {}", file.path, e);
                    refreshed.push(file.clone());
                }
            }
        }

        state.refresh_files(refreshed);
    }

    /// Output: push once, score, persist
    async fn output(&self, mut state: RunState) -> RunReport {
        if !self.params.push {
            debug!("Push disabled");
        } else if state.commits.is_empty() {
            debug!("No commits to push");
        } else {
            match self
                .working_copy
                .push(&self.params.remote, &state.branch_name)
                .await
            {
                Ok(()) => {
                    info!("Pushed {} to {}", state.branch_name, self.params.remote);
                    state.pushed = true;
                }
                Err(e) => {
                    warn!("Push failed: {}", e);
                    self.events.log(RunEvent::new(
                        "push_failed",
                        json!({
                            "remote": self.params.remote,
                            "branch": state.branch_name,
                            "error": e.to_string(),
                        }),
                    ));
                    state.push_error = Some(e.to_string());
                }
            }
        }

        let elapsed = state.elapsed();
        let score = state.finalize_score(elapsed).clone();
        info!(
            "Run {} scored {} ({} fixes, {} issues)",
            state.run_id,
            score.total,
            state.fixes_applied(),
            state.total_issues()
        );
        self.events.log(RunEvent::new(
            "run_finished",
            json!({
                "run_id": state.run_id,
                "branch": state.branch_name,
                "score": score.total,
                "fixes_applied": state.fixes_applied(),
                "total_issues": state.total_issues(),
                "rounds": state.rounds.len(),
                "elapsed_minutes": score.inputs.elapsed_minutes,
            }),
        ));

        let report = state.into_report(elapsed);
        match self.result_store.save(&report).await {
            Ok(location) => info!("Saved run report to {}", location),
            Err(e) => warn!("Failed to save run report: {}", e),
        }
        report
    }

    fn notify_state(&self, graph: &WorkflowGraph, progress: &dyn ProgressNotifier) {
        let state = graph.current();
        info!("Entering {}", state);
        progress.on_state_enter(state);
        self.events.log(RunEvent::new(
            "state_entered",
            json!({
                "state": state.as_str(),
                "round": graph.dispatch_rounds(),
            }),
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::analysis_backend::BackendError;
    use crate::ports::result_store::ResultStoreError;
    use async_trait::async_trait;
    use autofix_domain::{
        BackendId, CodeFile, Issue, IssueType, RetryRule, Severity, UnresolvedReason,
    };
    use std::collections::{BTreeMap, HashSet};
    use std::sync::Mutex;
    use std::time::Duration;

    // ==================== Mocks ====================

    struct StaticSource(Vec<CodeFile>);

    #[async_trait]
    impl CodeSource for StaticSource {
        async fn load(&self) -> Result<Vec<CodeFile>, CodeSourceError> {
            Ok(self.0.clone())
        }
    }

    struct BrokenSource;

    #[async_trait]
    impl CodeSource for BrokenSource {
        async fn load(&self) -> Result<Vec<CodeFile>, CodeSourceError> {
            Err(CodeSourceError::NotFound("/nowhere".to_string()))
        }
    }

    /// Reads whatever the repo's working tree currently holds
    struct CheckoutSource(Arc<MemoryRepo>);

    #[async_trait]
    impl CodeSource for CheckoutSource {
        async fn load(&self) -> Result<Vec<CodeFile>, CodeSourceError> {
            Ok(self
                .0
                .files
                .lock()
                .unwrap()
                .iter()
                .map(|(path, content)| CodeFile::new(path.clone(), content.clone()))
                .collect())
        }
    }

    struct SlowSource(Duration);

    #[async_trait]
    impl CodeSource for SlowSource {
        async fn load(&self) -> Result<Vec<CodeFile>, CodeSourceError> {
            tokio::time::sleep(self.0).await;
            Ok(files())
        }
    }

    #[derive(Default)]
    struct MemoryRepo {
        files: Mutex<BTreeMap<String, String>>,
        commits: Mutex<Vec<String>>,
        branches: Mutex<Vec<String>>,
        pushes: Mutex<Vec<(String, String)>>,
        /// Content the working tree holds once the branch is checked out
        branch_files: Option<BTreeMap<String, String>>,
        reject_push: bool,
        reject_branch: bool,
    }

    impl MemoryRepo {
        fn with(files: &[CodeFile]) -> Self {
            Self {
                files: Mutex::new(
                    files
                        .iter()
                        .map(|f| (f.path.clone(), f.content.clone()))
                        .collect(),
                ),
                ..Default::default()
            }
        }
    }

    #[async_trait]
    impl WorkingCopy for MemoryRepo {
        async fn prepare_branch(&self, branch: &str) -> Result<(), WorkingCopyError> {
            if self.reject_branch {
                return Err(WorkingCopyError::Branch("detached".to_string()));
            }
            self.branches.lock().unwrap().push(branch.to_string());
            if let Some(files) = &self.branch_files {
                *self.files.lock().unwrap() = files.clone();
            }
            Ok(())
        }

        async fn read_file(&self, path: &str) -> Result<Option<String>, WorkingCopyError> {
            Ok(self.files.lock().unwrap().get(path).cloned())
        }

        async fn write_file(&self, path: &str, content: &str) -> Result<(), WorkingCopyError> {
            self.files
                .lock()
                .unwrap()
                .insert(path.to_string(), content.to_string());
            Ok(())
        }

        async fn commit(&self, _path: &str, message: &str) -> Result<String, WorkingCopyError> {
            let mut commits = self.commits.lock().unwrap();
            commits.push(message.to_string());
            Ok(format!("{:040x}", commits.len()))
        }

        async fn push(&self, remote: &str, branch: &str) -> Result<(), WorkingCopyError> {
            if self.reject_push {
                return Err(WorkingCopyError::Push("permission denied".to_string()));
            }
            self.pushes
                .lock()
                .unwrap()
                .push((remote.to_string(), branch.to_string()));
            Ok(())
        }
    }

    /// Flags every line containing `needle` and offers `replacement`
    struct NeedleBackend {
        id: BackendId,
        needle: &'static str,
        replacement: Option<&'static str>,
        severity: Severity,
        delay: Duration,
    }

    impl NeedleBackend {
        fn fixing(name: &str, needle: &'static str, replacement: &'static str) -> Self {
            Self {
                id: BackendId::from(name),
                needle,
                replacement: Some(replacement),
                severity: Severity::Medium,
                delay: Duration::ZERO,
            }
        }

        fn reporting(name: &str, needle: &'static str, severity: Severity) -> Self {
            Self {
                id: BackendId::from(name),
                needle,
                replacement: None,
                severity,
                delay: Duration::ZERO,
            }
        }

        fn stuck(name: &str) -> Self {
            Self {
                delay: Duration::from_secs(3600),
                ..Self::fixing(name, "", "")
            }
        }
    }

    #[async_trait]
    impl AnalysisBackend for NeedleBackend {
        fn id(&self) -> &BackendId {
            &self.id
        }

        async fn analyze(&self, file: &CodeFile) -> Result<Vec<Issue>, BackendError> {
            if !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
            Ok(file
                .content
                .lines()
                .enumerate()
                .filter(|(_, line)| line.contains(self.needle))
                .map(|(i, _)| {
                    let issue = Issue::new(
                        self.id.clone(),
                        file.path.clone(),
                        i as u32 + 1,
                        IssueType::Logic,
                        format!("{} found", self.needle),
                    )
                    .with_severity(self.severity);
                    match self.replacement {
                        Some(text) => issue.with_new_text(text),
                        None => issue,
                    }
                })
                .collect())
        }
    }

    #[derive(Default)]
    struct RecordingStore(Mutex<Vec<String>>);

    #[async_trait]
    impl ResultStore for RecordingStore {
        async fn save(&self, report: &RunReport) -> Result<String, ResultStoreError> {
            self.0.lock().unwrap().push(report.run_id.clone());
            Ok(format!("memory://{}", report.run_id))
        }
    }

    #[derive(Default)]
    struct RecordingEvents(Mutex<Vec<&'static str>>);

    impl RunEventLogger for RecordingEvents {
        fn log(&self, event: RunEvent) {
            self.0.lock().unwrap().push(event.event_type);
        }
    }

    #[derive(Default)]
    struct RecordingProgress(Mutex<Vec<WorkflowState>>);

    impl ProgressNotifier for RecordingProgress {
        fn on_state_enter(&self, state: WorkflowState) {
            self.0.lock().unwrap().push(state);
        }
    }

    fn files() -> Vec<CodeFile> {
        vec![
            CodeFile::new("app.py", "x = 1\nbug()\ny = 2\n"),
            CodeFile::new("lib.py", "def f():\n    bug()\n"),
        ]
    }

    fn use_case(
        backends: Vec<Arc<dyn AnalysisBackend>>,
        repo: Arc<MemoryRepo>,
    ) -> RunWorkflowUseCase {
        RunWorkflowUseCase::new(backends, Arc::new(StaticSource(files())), repo)
    }

    fn input() -> RunWorkflowInput {
        RunWorkflowInput::new("run-1", "RIFT organisers", "Saiyam Kumar")
    }

    // ==================== Tests ====================

    #[tokio::test]
    async fn test_single_round_fixes_and_pushes() {
        let repo = Arc::new(MemoryRepo::with(&files()));
        let store = Arc::new(RecordingStore::default());
        let progress = RecordingProgress::default();

        let report = use_case(
            vec![Arc::new(NeedleBackend::fixing("a", "bug", "fixed()"))],
            Arc::clone(&repo),
        )
        .with_result_store(store.clone())
        .execute_with_progress(input(), &progress)
        .await
        .unwrap();

        assert_eq!(report.branch_name, "RIFT_ORGANISERS_SAIYAM_KUMAR_AI_Fix");
        assert_eq!(report.fixes_applied, 2);
        assert_eq!(report.commits.len(), 2);
        assert!(report.pushed);
        assert_eq!(report.rounds.len(), 1);
        // 100 + 10 speed + 4 quality, clamped
        assert_eq!(report.score.total, 100);

        assert_eq!(
            repo.files.lock().unwrap().get("app.py").map(String::as_str),
            Some("x = 1\nfixed()\ny = 2\n")
        );
        assert_eq!(
            repo.pushes.lock().unwrap().as_slice(),
            &[(
                "origin".to_string(),
                "RIFT_ORGANISERS_SAIYAM_KUMAR_AI_Fix".to_string()
            )]
        );
        assert_eq!(store.0.lock().unwrap().as_slice(), &["run-1".to_string()]);

        use WorkflowState::*;
        assert_eq!(
            progress.0.lock().unwrap().as_slice(),
            &[Setup, Dispatch, Adjudicate, Apply, Output, Terminal]
        );
    }

    #[tokio::test]
    async fn test_overlapping_backends_commit_each_location_once() {
        let repo = Arc::new(MemoryRepo::with(&files()));
        let report = use_case(
            vec![
                Arc::new(NeedleBackend::fixing("first", "bug", "first()")),
                Arc::new(NeedleBackend::fixing("second", "bug", "second()")),
            ],
            Arc::clone(&repo),
        )
        .execute(input())
        .await
        .unwrap();

        let keys: HashSet<_> = report.commits.iter().map(|c| (&c.file, c.line)).collect();
        assert_eq!(keys.len(), report.commits.len());
        assert_eq!(report.commits.len(), 2);
        assert_eq!(report.all_issues.total_issues(), 4);
        assert!(
            repo.files
                .lock()
                .unwrap()
                .values()
                .all(|c| !c.contains("second()"))
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_all_backends_timing_out_still_terminates() {
        let repo = Arc::new(MemoryRepo::with(&files()));
        let progress = RecordingProgress::default();
        let params = WorkflowParams::default().with_backend_timeout(Duration::from_secs(5));

        let report = use_case(
            vec![
                Arc::new(NeedleBackend::stuck("a")),
                Arc::new(NeedleBackend::stuck("b")),
            ],
            Arc::clone(&repo),
        )
        .with_params(params)
        .execute_with_progress(input(), &progress)
        .await
        .unwrap();

        assert!(report.commits.is_empty());
        assert!(report.all_issues.all_empty());
        assert!(!report.pushed);
        assert!((0..=100).contains(&report.score.total));
        assert_eq!(
            progress.0.lock().unwrap().last(),
            Some(&WorkflowState::Terminal)
        );
    }

    #[tokio::test]
    async fn test_unresolved_critical_issue_retries_until_limit() {
        let repo = Arc::new(MemoryRepo::with(&files()));
        let params = WorkflowParams::default().with_max_retries(2);

        let report = use_case(
            vec![Arc::new(NeedleBackend::reporting(
                "strict",
                "x = 1",
                Severity::Critical,
            ))],
            Arc::clone(&repo),
        )
        .with_params(params)
        .execute(input())
        .await
        .unwrap();

        assert_eq!(report.rounds.len(), 2);
        assert!(report.commits.is_empty());
        assert_eq!(report.unresolved.len(), 1);
        assert_eq!(report.unresolved[0].reason, UnresolvedReason::Unfixable);
        // one distinct location across both rounds: 100 + 10 - 5
        assert_eq!(report.score.quality_penalty, 5);
    }

    #[tokio::test]
    async fn test_retry_reviews_patched_content() {
        let repo = Arc::new(MemoryRepo::with(&files()));
        let params = WorkflowParams::default().with_max_retries(3);
        let retry_twice = |state: &RunState| state.retry_count < 2;

        let report = use_case(
            vec![Arc::new(NeedleBackend::fixing("a", "bug", "fixed()"))],
            Arc::clone(&repo),
        )
        .with_params(params)
        .with_retry_policy(Arc::new(retry_twice))
        .execute(input())
        .await
        .unwrap();

        assert_eq!(report.rounds.len(), 2);
        assert_eq!(report.rounds[0].issues_reported, 2);
        assert_eq!(report.rounds[1].issues_reported, 0);
        assert_eq!(report.commits.len(), 2);
    }

    #[tokio::test]
    async fn test_never_rule_stops_after_one_round() {
        let repo = Arc::new(MemoryRepo::with(&files()));
        let params = WorkflowParams::default()
            .with_max_retries(5)
            .with_retry_rule(RetryRule::Never);

        let report = use_case(
            vec![Arc::new(NeedleBackend::reporting(
                "strict",
                "bug",
                Severity::Critical,
            ))],
            repo,
        )
        .with_params(params)
        .execute(input())
        .await
        .unwrap();

        assert_eq!(report.rounds.len(), 1);
    }

    #[tokio::test]
    async fn test_push_failure_is_reported_not_fatal() {
        let repo = Arc::new(MemoryRepo {
            reject_push: true,
            ..MemoryRepo::with(&files())
        });
        let events = Arc::new(RecordingEvents::default());

        let report = use_case(
            vec![Arc::new(NeedleBackend::fixing("a", "bug", "fixed()"))],
            Arc::clone(&repo),
        )
        .with_event_logger(events.clone())
        .execute(input())
        .await
        .unwrap();

        assert!(!report.pushed);
        assert_eq!(report.push_error.as_deref(), Some("Push failed: permission denied"));
        assert_eq!(repo.commits.lock().unwrap().len(), 2);

        let logged = events.0.lock().unwrap();
        assert!(logged.contains(&"push_failed"));
        assert_eq!(logged.last(), Some(&"state_entered"));
        assert!(logged.contains(&"run_finished"));
        assert_eq!(logged.iter().filter(|e| **e == "fix_applied").count(), 2);
    }

    #[tokio::test]
    async fn test_no_push_flag() {
        let repo = Arc::new(MemoryRepo::with(&files()));
        let report = use_case(
            vec![Arc::new(NeedleBackend::fixing("a", "bug", "fixed()"))],
            Arc::clone(&repo),
        )
        .with_params(WorkflowParams::default().without_push())
        .execute(input())
        .await
        .unwrap();

        assert!(!report.pushed);
        assert!(report.push_error.is_none());
        assert!(repo.pushes.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_no_backends_is_fatal() {
        let repo = Arc::new(MemoryRepo::default());
        let result = use_case(vec![], repo).execute(input()).await;
        assert!(matches!(result, Err(RunWorkflowError::NoBackends)));
    }

    #[tokio::test]
    async fn test_source_failure_is_fatal() {
        let result = RunWorkflowUseCase::new(
            vec![Arc::new(NeedleBackend::fixing("a", "bug", "fixed()"))],
            Arc::new(BrokenSource),
            Arc::new(MemoryRepo::default()),
        )
        .execute(input())
        .await;
        assert!(matches!(result, Err(RunWorkflowError::Source(_))));
    }

    #[tokio::test]
    async fn test_branch_failure_is_fatal() {
        let repo = Arc::new(MemoryRepo {
            reject_branch: true,
            ..MemoryRepo::with(&files())
        });
        let result = use_case(
            vec![Arc::new(NeedleBackend::fixing("a", "bug", "fixed()"))],
            repo,
        )
        .execute(input())
        .await;
        assert!(matches!(result, Err(RunWorkflowError::Branch { .. })));
    }

    #[tokio::test]
    async fn test_files_are_read_from_prepared_branch() {
        let repo = Arc::new(MemoryRepo {
            branch_files: Some(BTreeMap::from([(
                "app.py".to_string(),
                "inserted\na\nb\nc\n".to_string(),
            )])),
            ..MemoryRepo::with(&[CodeFile::new("app.py", "a\nb\nc\n")])
        });

        let report = RunWorkflowUseCase::new(
            vec![Arc::new(NeedleBackend::fixing("a", "b", "B"))],
            Arc::new(CheckoutSource(Arc::clone(&repo))),
            repo.clone(),
        )
        .execute(input())
        .await
        .unwrap();

        assert_eq!(report.commits.len(), 1);
        assert_eq!(report.commits[0].line, 3);
        assert_eq!(
            repo.files.lock().unwrap().get("app.py").map(String::as_str),
            Some("inserted\na\nB\nc\n")
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_deadline_cancels_every_retry_round() {
        let repo = Arc::new(MemoryRepo::with(&files()));
        let progress = RecordingProgress::default();
        let params = WorkflowParams::default()
            .with_max_retries(3)
            .with_backend_timeout(Duration::from_secs(600))
            .with_run_deadline(Some(Duration::from_secs(30)));
        let always = |_: &RunState| true;
        let started = tokio::time::Instant::now();

        let report = use_case(
            vec![
                Arc::new(NeedleBackend::stuck("a")),
                Arc::new(NeedleBackend::stuck("b")),
            ],
            Arc::clone(&repo),
        )
        .with_params(params)
        .with_retry_policy(Arc::new(always))
        .execute_with_progress(input(), &progress)
        .await
        .unwrap();

        // one deadline for the whole run, not one backend timeout per round
        assert!(started.elapsed() < Duration::from_secs(60));
        assert_eq!(report.rounds.len(), 3);
        assert!(
            report
                .rounds
                .iter()
                .all(|round| round.issues_reported == 0 && round.silent_backends.len() == 2)
        );
        assert!(report.all_issues.all_empty());
        assert!(report.commits.is_empty());
        assert_eq!(
            progress.0.lock().unwrap().last(),
            Some(&WorkflowState::Terminal)
        );
    }

    #[tokio::test]
    async fn test_elapsed_time_includes_setup() {
        let repo = Arc::new(MemoryRepo::with(&files()));
        let report = RunWorkflowUseCase::new(
            vec![Arc::new(NeedleBackend::reporting("a", "bug", Severity::Low))],
            Arc::new(SlowSource(Duration::from_millis(200))),
            repo,
        )
        .execute(input())
        .await
        .unwrap();

        assert!(report.score.inputs.elapsed_minutes * 60.0 >= 0.2);
    }
}
