//! Review run orchestration
//!
//! The workflow state machine, the run state it threads through each
//! state, and the retry routing decided after every apply pass.

pub mod entities;
pub mod retry;
pub mod run_state;
pub mod value_objects;

pub use entities::{WorkflowGraph, WorkflowState};
pub use retry::{RetryPolicy, RetryRule};
pub use run_state::RunState;
pub use value_objects::{RoundSummary, RunReport, Unresolved, UnresolvedReason};
