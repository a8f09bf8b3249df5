//! Application layer for autofix-council
//!
//! This crate contains use cases, port definitions, and application configuration.
//! It depends only on the domain layer.

pub mod config;
pub mod ports;
pub mod use_cases;

// Re-export commonly used types
pub use config::WorkflowParams;
pub use ports::{
    analysis_backend::{AnalysisBackend, BackendError},
    code_source::{CodeSource, CodeSourceError},
    llm_gateway::{GatewayError, LlmGateway, LlmSession},
    progress::{NoProgress, ProgressNotifier},
    result_store::{NoResultStore, ResultStore, ResultStoreError},
    run_event_logger::{NoRunEventLogger, RunEvent, RunEventLogger},
    working_copy::{WorkingCopy, WorkingCopyError},
};
pub use use_cases::adjudicate::{AdjudicationStrategy, FirstSeenWins, ModelArbitration};
pub use use_cases::apply_patches::{ApplyOutcome, PatchApplicator, SkipReason, replace_line};
pub use use_cases::dispatch::FanOutDispatcher;
pub use use_cases::run_workflow::{RunWorkflowError, RunWorkflowInput, RunWorkflowUseCase};
