//! Fan-out dispatch
//!
//! Runs every registered backend over the file set at once and joins the
//! results into one [`BackendIssues`] map in registration order. Every
//! backend gets its own task from the start, so a stuck backend never
//! holds back a sibling.

use crate::ports::analysis_backend::AnalysisBackend;
use crate::ports::progress::ProgressNotifier;
use crate::ports::run_event_logger::{RunEvent, RunEventLogger};
use autofix_domain::{BackendId, BackendIssues, CodeFile, Issue};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

/// How one backend's sweep ended
#[derive(Debug)]
enum SweepOutcome {
    Completed(Vec<Issue>),
    TimedOut,
    Cancelled,
    Failed(String),
}

impl SweepOutcome {
    fn label(&self) -> &'static str {
        match self {
            SweepOutcome::Completed(_) => "completed",
            SweepOutcome::TimedOut => "timed_out",
            SweepOutcome::Cancelled => "cancelled",
            SweepOutcome::Failed(_) => "failed",
        }
    }
}

/// Fan-out / fan-in over the registered backends
pub struct FanOutDispatcher {
    backends: Vec<Arc<dyn AnalysisBackend>>,
    backend_timeout: Duration,
}

impl FanOutDispatcher {
    pub fn new(backends: Vec<Arc<dyn AnalysisBackend>>, backend_timeout: Duration) -> Self {
        Self {
            backends,
            backend_timeout,
        }
    }

    pub fn with_backend_timeout(mut self, timeout: Duration) -> Self {
        self.backend_timeout = timeout;
        self
    }

    pub fn backend_ids(&self) -> Vec<BackendId> {
        self.backends.iter().map(|b| b.id().clone()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.backends.is_empty()
    }

    /// Run every backend over `files`.
    ///
    /// The result has exactly one slot per backend, in registration order.
    /// A backend that times out, panics or is cancelled by `deadline`
    /// contributes an empty list; the others are unaffected.
    #[instrument(skip_all, fields(backends = self.backends.len(), files = files.len()))]
    pub async fn dispatch(
        &self,
        files: &[CodeFile],
        deadline: &CancellationToken,
        progress: &dyn ProgressNotifier,
        events: &dyn RunEventLogger,
    ) -> BackendIssues {
        let files: Arc<Vec<CodeFile>> = Arc::new(files.to_vec());
        let mut join_set = JoinSet::new();

        for (slot, backend) in self.backends.iter().enumerate() {
            let backend = Arc::clone(backend);
            let files = Arc::clone(&files);
            let deadline = deadline.clone();
            let timeout = self.backend_timeout;

            join_set.spawn(async move {
                let outcome = run_backend(backend, files, deadline, timeout).await;
                (slot, outcome)
            });
        }

        let mut slots: Vec<Vec<Issue>> = vec![Vec::new(); self.backends.len()];

        while let Some(joined) = join_set.join_next().await {
            let (slot, outcome) = match joined {
                Ok(pair) => pair,
                Err(e) => {
                    warn!("Dispatch task join error: {}", e);
                    continue;
                }
            };
            let id = self.backends[slot].id();
            let label = outcome.label();

            match outcome {
                SweepOutcome::Completed(issues) => {
                    info!("Backend {} reported {} issues", id, issues.len());
                    progress.on_backend_complete(id, issues.len(), true);
                    slots[slot] = issues;
                }
                SweepOutcome::TimedOut => {
                    warn!(
                        "Backend {} timed out after {:?}",
                        id, self.backend_timeout
                    );
                    progress.on_backend_complete(id, 0, false);
                }
                SweepOutcome::Cancelled => {
                    warn!("Backend {} cancelled by run deadline", id);
                    progress.on_backend_complete(id, 0, false);
                }
                SweepOutcome::Failed(reason) => {
                    warn!("Backend {} failed: {}", id, reason);
                    progress.on_backend_complete(id, 0, false);
                }
            }

            events.log(RunEvent::new(
                "backend_finished",
                json!({
                    "backend": id.as_str(),
                    "outcome": label,
                    "issues": slots[slot].len(),
                }),
            ));
        }

        self.backends
            .iter()
            .map(|b| b.id().clone())
            .zip(slots)
            .collect()
    }
}

/// Run one backend's sweep under its timeout and the run deadline.
async fn run_backend(
    backend: Arc<dyn AnalysisBackend>,
    files: Arc<Vec<CodeFile>>,
    deadline: CancellationToken,
    timeout: Duration,
) -> SweepOutcome {
    if deadline.is_cancelled() {
        return SweepOutcome::Cancelled;
    }

    // The sweep runs in its own task so a panic surfaces as a JoinError
    let handle = tokio::spawn(sweep(backend, files));
    let abort = handle.abort_handle();

    let outcome = tokio::select! {
        _ = deadline.cancelled() => SweepOutcome::Cancelled,
        joined = tokio::time::timeout(timeout, handle) => match joined {
            Ok(Ok(issues)) => SweepOutcome::Completed(issues),
            Ok(Err(e)) => SweepOutcome::Failed(e.to_string()),
            Err(_) => SweepOutcome::TimedOut,
        },
    };

    if !matches!(outcome, SweepOutcome::Completed(_)) {
        abort.abort();
    }
    outcome
}

/// Review every file in order. A failed file contributes nothing.
async fn sweep(backend: Arc<dyn AnalysisBackend>, files: Arc<Vec<CodeFile>>) -> Vec<Issue> {
    let id = backend.id().clone();
    let mut issues = Vec::new();

    for file in files.iter() {
        match backend.analyze(file).await {
            Ok(found) => {
                debug!("Backend {} found {} issues in {}", id, found.len(), file.path);
                issues.extend(found.into_iter().map(|mut issue| {
                    issue.backend = id.clone();
                    issue
                }));
            }
            Err(e) => warn!("Backend {} failed on {}: {}", id, file.path, e),
        }
    }

    issues
}
