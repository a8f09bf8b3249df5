//! Infrastructure layer for autofix-council
//!
//! This crate contains adapters that implement the ports defined
//! in the application layer, including configuration file loading.

pub mod backend;
pub mod chat;
pub mod config;
pub mod logging;
pub mod source;
pub mod store;
pub mod working_copy;

// Re-export commonly used types
pub use backend::LlmAnalysisBackend;
pub use chat::{
    error::{ChatError, Result},
    gateway::ChatCompletionsGateway,
    session::ChatCompletionsSession,
};
pub use config::{
    ConfigLoader, ConfigValidationError, FileAdjudication, FileBackendConfig, FileConfig,
    FileOutputConfig, FileSourceConfig, FileWorkflowConfig,
};
pub use logging::JsonlRunEventLogger;
pub use source::LocalCodeSource;
pub use store::{InMemoryResultStore, JsonFileResultStore};
pub use working_copy::{GitWorkingCopy, InMemoryWorkingCopy, MemoryCommit};
