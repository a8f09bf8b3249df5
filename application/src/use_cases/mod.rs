//! Use cases
//!
//! Application-level operations that orchestrate domain logic.

pub mod adjudicate;
pub mod apply_patches;
pub mod dispatch;
pub mod run_workflow;
