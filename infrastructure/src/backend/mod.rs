//! Analysis backend adapters

mod llm_backend;

pub use llm_backend::LlmAnalysisBackend;
