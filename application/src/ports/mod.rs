//! Port definitions (interfaces for external adapters)
//!
//! Ports define the contracts that infrastructure adapters must implement.

pub mod analysis_backend;
pub mod code_source;
pub mod llm_gateway;
pub mod progress;
pub mod result_store;
pub mod run_event_logger;
pub mod working_copy;
