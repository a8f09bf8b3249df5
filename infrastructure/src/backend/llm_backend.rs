//! Analysis backend driven by a chat model

use async_trait::async_trait;
use autofix_application::ports::analysis_backend::{AnalysisBackend, BackendError};
use autofix_application::ports::llm_gateway::LlmGateway;
use autofix_domain::{
    BackendId, CodeFile, DEFAULT_MAX_CHARS_PER_FILE, Issue, ReviewPromptTemplate,
    parse_issue_array,
};
use std::sync::Arc;
use tracing::debug;

/// Reviews one file per request through an [`LlmGateway`].
///
/// Every file gets a fresh session so earlier files never leak into the
/// context of later ones.
pub struct LlmAnalysisBackend {
    id: BackendId,
    model: String,
    gateway: Arc<dyn LlmGateway>,
    max_chars_per_file: usize,
}

impl LlmAnalysisBackend {
    pub fn new(id: BackendId, model: impl Into<String>, gateway: Arc<dyn LlmGateway>) -> Self {
        Self {
            id,
            model: model.into(),
            gateway,
            max_chars_per_file: DEFAULT_MAX_CHARS_PER_FILE,
        }
    }

    pub fn with_max_chars_per_file(mut self, max_chars: usize) -> Self {
        self.max_chars_per_file = max_chars;
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl AnalysisBackend for LlmAnalysisBackend {
    fn id(&self) -> &BackendId {
        &self.id
    }

    async fn analyze(&self, file: &CodeFile) -> Result<Vec<Issue>, BackendError> {
        let session = self
            .gateway
            .create_session_with_system_prompt(&self.model, ReviewPromptTemplate::review_system())
            .await?;

        let prompt =
            ReviewPromptTemplate::review_file(&file.path, &file.content, self.max_chars_per_file);
        let response = session.send(&prompt).await?;

        let issues = parse_issue_array(&response, &self.id, &file.path);
        debug!(
            "{} ({}) parsed {} issues for {}",
            self.id,
            self.model,
            issues.len(),
            file.path
        );
        Ok(issues)
    }
}
