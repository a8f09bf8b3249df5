//! Working copy port
//!
//! The mutable checkout that fixes are applied to, one commit per fix.

use async_trait::async_trait;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum WorkingCopyError {
    #[error("Branch preparation failed: {0}")]
    Branch(String),

    #[error("I/O error on {path}: {message}")]
    Io { path: String, message: String },

    #[error("Commit failed: {0}")]
    Commit(String),

    #[error("Push failed: {0}")]
    Push(String),
}

/// A version-controlled checkout
#[async_trait]
pub trait WorkingCopy: Send + Sync {
    /// Create the branch, or switch to it if it already exists
    async fn prepare_branch(&self, branch: &str) -> Result<(), WorkingCopyError>;

    /// Read a file by relative path; `Ok(None)` when it does not exist
    async fn read_file(&self, path: &str) -> Result<Option<String>, WorkingCopyError>;

    /// Overwrite a file by relative path
    async fn write_file(&self, path: &str, content: &str) -> Result<(), WorkingCopyError>;

    /// Record the current content of `path` as a commit; returns the full hash
    async fn commit(&self, path: &str, message: &str) -> Result<String, WorkingCopyError>;

    /// Publish `branch` to `remote`
    async fn push(&self, remote: &str, branch: &str) -> Result<(), WorkingCopyError>;
}
