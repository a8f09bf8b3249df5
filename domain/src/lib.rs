//! Domain layer for autofix-council
//!
//! Entities, value objects and the pure rules of a review run. Nothing in
//! this crate performs I/O.
//!
//! # Core Concepts
//!
//! ## Council
//!
//! Several independent analysis backends review the same files. Their
//! findings are merged per `(file, line)` and adjudicated into a single fix
//! list, so one line is never edited twice in a round.
//!
//! ## Run
//!
//! A run walks the [`WorkflowState`] graph from `Setup` to `Terminal`,
//! looping through `Retry` while its [`RetryPolicy`] asks for another
//! round, and ends with a deterministic [`Score`].

pub mod config;
pub mod core;
pub mod orchestration;
pub mod prompt;
pub mod review;
pub mod scoring;

// Re-export commonly used types
pub use config::OutputFormat;
pub use core::{backend::BackendId, error::DomainError};
pub use orchestration::{
    RetryPolicy, RetryRule, RoundSummary, RunReport, RunState, Unresolved, UnresolvedReason,
    WorkflowGraph, WorkflowState,
};
pub use prompt::{DEFAULT_MAX_CHARS_PER_FILE, ReviewPromptTemplate};
pub use review::{
    Adjudication, BackendIssues, CodeFile, Commit, Fix, Issue, IssueKey, IssueType, Selection,
    Severity, adjudicate_first_seen, adjudicate_with_selection, branch_name,
    extract_first_json_array, fixable_candidates, parse_issue_array,
};
pub use scoring::{Score, ScoreInputs};
