//! Logging infrastructure: structured run-event transcripts.
//!
//! Provides [`JsonlRunEventLogger`], a JSONL file writer that implements
//! the [`RunEventLogger`](autofix_application::RunEventLogger) port.

mod run_event_log;

pub use run_event_log::JsonlRunEventLogger;
