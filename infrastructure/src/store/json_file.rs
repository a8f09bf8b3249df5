//! Run reports as pretty-printed JSON files

use async_trait::async_trait;
use autofix_application::ports::result_store::{ResultStore, ResultStoreError};
use autofix_domain::RunReport;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Writes each report to `<dir>/<run_id>.json`
pub struct JsonFileResultStore {
    dir: PathBuf,
}

impl JsonFileResultStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, run_id: &str) -> PathBuf {
        self.dir.join(format!("{}.json", run_id))
    }
}

#[async_trait]
impl ResultStore for JsonFileResultStore {
    async fn save(&self, report: &RunReport) -> Result<String, ResultStoreError> {
        let body = serde_json::to_string_pretty(report)
            .map_err(|e| ResultStoreError::Serialize(e.to_string()))?;
        let path = self.path_for(&report.run_id);
        let location = path.display().to_string();

        let write_err = |e: std::io::Error| ResultStoreError::Write {
            location: location.clone(),
            message: e.to_string(),
        };
        tokio::fs::create_dir_all(&self.dir).await.map_err(write_err)?;
        tokio::fs::write(&path, body).await.map_err(write_err)?;

        debug!("Wrote {}", location);
        Ok(location)
    }
}
