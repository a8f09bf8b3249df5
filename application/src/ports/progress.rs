//! Progress notification port
//!
//! Defines the interface for reporting progress while a run walks the
//! workflow graph.

use autofix_domain::{BackendId, Commit, Fix, WorkflowState};

/// Callback for progress updates during a run
///
/// Implementations live in the presentation layer and can display
/// progress in various ways (progress bars, plain lines, etc.)
pub trait ProgressNotifier: Send + Sync {
    /// Called when the workflow enters a state
    fn on_state_enter(&self, state: WorkflowState);

    /// Called when a dispatch round starts
    fn on_dispatch_start(&self, _round: u32, _backends: &[BackendId], _files: usize) {}

    /// Called when one backend finishes its sweep
    fn on_backend_complete(&self, _backend: &BackendId, _issues: usize, _success: bool) {}

    /// Called when a dispatch round ends
    fn on_dispatch_complete(&self) {}

    /// Called when a fix is committed
    fn on_fix_applied(&self, _commit: &Commit) {}

    /// Called when a fix cannot be applied
    fn on_fix_skipped(&self, _fix: &Fix, _reason: &str) {}
}

/// No-op progress notifier for when progress reporting is not needed
pub struct NoProgress;

impl ProgressNotifier for NoProgress {
    fn on_state_enter(&self, _state: WorkflowState) {}
}
