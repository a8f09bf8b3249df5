//! Workflow state machine
//!
//! ```text
//! Setup ─▶ Dispatch ─▶ Adjudicate ─▶ Apply ─┬─▶ Output ─▶ Terminal
//!             ▲                             │
//!             └────────── Retry ◀───────────┘
//! ```
//!
//! `Terminal` is absorbing. Each run starts in `Setup` and reaches
//! `Terminal` at most once.

use crate::core::error::DomainError;
use serde::{Deserialize, Serialize};

/// State of a review run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WorkflowState {
    /// Acquire code files, derive the branch, initialise run state
    Setup,
    /// Fan the file set out to every backend
    Dispatch,
    /// Merge and deduplicate findings into a fix list
    Adjudicate,
    /// Apply fixes to the working copy, one commit each
    Apply,
    /// Refresh file contents before another dispatch round
    Retry,
    /// Push, score and persist the run report
    Output,
    /// Run finished
    Terminal,
}

impl WorkflowState {
    pub fn as_str(&self) -> &'static str {
        match self {
            WorkflowState::Setup => "setup",
            WorkflowState::Dispatch => "dispatch",
            WorkflowState::Adjudicate => "adjudicate",
            WorkflowState::Apply => "apply",
            WorkflowState::Retry => "retry",
            WorkflowState::Output => "output",
            WorkflowState::Terminal => "terminal",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            WorkflowState::Setup => "Setup",
            WorkflowState::Dispatch => "Dispatch",
            WorkflowState::Adjudicate => "Adjudicate",
            WorkflowState::Apply => "Apply",
            WorkflowState::Retry => "Retry",
            WorkflowState::Output => "Output",
            WorkflowState::Terminal => "Terminal",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, WorkflowState::Terminal)
    }

    /// Whether `next` is a legal successor of this state
    pub fn can_transition_to(&self, next: WorkflowState) -> bool {
        use WorkflowState::*;
        matches!(
            (self, next),
            (Setup, Dispatch)
                | (Dispatch, Adjudicate)
                | (Adjudicate, Apply)
                | (Apply, Retry)
                | (Apply, Output)
                | (Retry, Dispatch)
                | (Output, Terminal)
        )
    }
}

impl std::fmt::Display for WorkflowState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// The run's position in the state machine plus the path it took
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkflowGraph {
    current: WorkflowState,
    history: Vec<WorkflowState>,
}

impl Default for WorkflowGraph {
    fn default() -> Self {
        Self::new()
    }
}

impl WorkflowGraph {
    /// A fresh graph positioned at `Setup`
    pub fn new() -> Self {
        Self {
            current: WorkflowState::Setup,
            history: vec![WorkflowState::Setup],
        }
    }

    pub fn current(&self) -> WorkflowState {
        self.current
    }

    /// Every state visited, in order, including the current one
    pub fn history(&self) -> &[WorkflowState] {
        &self.history
    }

    pub fn is_finished(&self) -> bool {
        self.current.is_terminal()
    }

    /// Move to `next`, rejecting edges the graph does not have
    pub fn advance(&mut self, next: WorkflowState) -> Result<WorkflowState, DomainError> {
        if !self.current.can_transition_to(next) {
            return Err(DomainError::IllegalTransition {
                from: self.current.to_string(),
                to: next.to_string(),
            });
        }
        self.current = next;
        self.history.push(next);
        Ok(next)
    }

    /// Number of completed dispatch rounds so far
    pub fn dispatch_rounds(&self) -> usize {
        self.history
            .iter()
            .filter(|s| **s == WorkflowState::Dispatch)
            .count()
    }
}
