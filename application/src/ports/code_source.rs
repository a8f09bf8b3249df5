//! Code source port
//!
//! Acquires the snapshot of files a run reviews.

use async_trait::async_trait;
use autofix_domain::CodeFile;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CodeSourceError {
    #[error("Source not found: {0}")]
    NotFound(String),

    #[error("Failed to read source {path}: {message}")]
    Read { path: String, message: String },
}

/// Provider of the reviewed file set
#[async_trait]
pub trait CodeSource: Send + Sync {
    /// Load the files to review, keyed by path relative to the source root
    async fn load(&self) -> Result<Vec<CodeFile>, CodeSourceError>;
}
