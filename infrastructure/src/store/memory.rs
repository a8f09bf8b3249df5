use async_trait::async_trait;
use autofix_application::ports::result_store::{ResultStore, ResultStoreError};
use autofix_domain::RunReport;
use std::sync::Mutex;

/// Keeps reports in memory
#[derive(Default)]
pub struct InMemoryResultStore {
    reports: Mutex<Vec<RunReport>>,
}

impl InMemoryResultStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reports(&self) -> Vec<RunReport> {
        self.reports
            .lock()
            .map(|r| r.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl ResultStore for InMemoryResultStore {
    async fn save(&self, report: &RunReport) -> Result<String, ResultStoreError> {
        let mut reports = self
            .reports
            .lock()
            .map_err(|e| ResultStoreError::Write {
                location: "memory".to_string(),
                message: e.to_string(),
            })?;
        reports.push(report.clone());
        Ok(format!("memory:{}", report.run_id))
    }
}
