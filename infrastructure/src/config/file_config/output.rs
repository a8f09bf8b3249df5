//! Output configuration from TOML (`[output]` section)

use autofix_domain::OutputFormat;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Raw output configuration from TOML
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileOutputConfig {
    pub format: OutputFormat,
    /// Enable colored terminal output
    pub color: bool,
    /// Where run reports are written
    pub results_dir: PathBuf,
    /// Where JSONL run-event transcripts are written
    pub events_dir: PathBuf,
}

impl Default for FileOutputConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::Full,
            color: true,
            results_dir: PathBuf::from(".autofix/results"),
            events_dir: PathBuf::from(".autofix/events"),
        }
    }
}
