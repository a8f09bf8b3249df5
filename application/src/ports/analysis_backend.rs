//! Analysis backend port
//!
//! A backend reviews code files and reports issues. Backends are isolated
//! failure domains: an error from one never affects another.

use async_trait::async_trait;
use autofix_domain::{BackendId, CodeFile, Issue};
use thiserror::Error;

/// Errors a backend may report for a single file
#[derive(Error, Debug)]
pub enum BackendError {
    #[error("Gateway error: {0}")]
    Gateway(#[from] super::llm_gateway::GatewayError),

    #[error("Backend unavailable: {0}")]
    Unavailable(String),
}

/// An independent analysis capability
#[async_trait]
pub trait AnalysisBackend: Send + Sync {
    /// Identity used for tagging issues and ordering results
    fn id(&self) -> &BackendId;

    /// Review one file.
    ///
    /// Issues returned here must carry this backend's id.
    async fn analyze(&self, file: &CodeFile) -> Result<Vec<Issue>, BackendError>;
}
