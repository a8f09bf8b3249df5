//! Result store port
//!
//! Persists the report of a finished run.

use async_trait::async_trait;
use autofix_domain::RunReport;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ResultStoreError {
    #[error("Failed to serialize report: {0}")]
    Serialize(String),

    #[error("Failed to write report {location}: {message}")]
    Write { location: String, message: String },
}

#[async_trait]
pub trait ResultStore: Send + Sync {
    /// Store `report`; returns where it was stored
    async fn save(&self, report: &RunReport) -> Result<String, ResultStoreError>;
}

/// Store that discards reports
pub struct NoResultStore;

#[async_trait]
impl ResultStore for NoResultStore {
    async fn save(&self, report: &RunReport) -> Result<String, ResultStoreError> {
        Ok(format!("(discarded {})", report.run_id))
    }
}
