//! Adjudication strategies
//!
//! [`FirstSeenWins`] is the deterministic baseline. [`ModelArbitration`]
//! asks a moderator model to choose at contested locations and falls back
//! to the baseline on any failure.

use crate::ports::llm_gateway::{GatewayError, LlmGateway};
use async_trait::async_trait;
use autofix_domain::{
    Adjudication, BackendIssues, ReviewPromptTemplate, Selection, adjudicate_first_seen,
    adjudicate_with_selection, extract_first_json_array, fixable_candidates,
};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Turns one round's findings into a fix list unique by `(file, line)`
#[async_trait]
pub trait AdjudicationStrategy: Send + Sync {
    /// Name used in logs
    fn name(&self) -> &str;

    async fn adjudicate(&self, issues: &BackendIssues) -> Adjudication;
}

/// First fixable issue per location wins, in backend registration order
pub struct FirstSeenWins;

#[async_trait]
impl AdjudicationStrategy for FirstSeenWins {
    fn name(&self) -> &str {
        "first_seen"
    }

    async fn adjudicate(&self, issues: &BackendIssues) -> Adjudication {
        adjudicate_first_seen(issues)
    }
}

#[derive(Error, Debug)]
enum ArbitrationError {
    #[error("Gateway error: {0}")]
    Gateway(#[from] GatewayError),

    #[error("Moderator response contained no JSON array")]
    NoSelection,
}

/// Moderator-assisted adjudication.
///
/// Locations where only one fixable proposal exists are accepted as is;
/// the moderator only sees locations with competing proposals.
pub struct ModelArbitration<G: LlmGateway + 'static> {
    gateway: Arc<G>,
    model: String,
}

impl<G: LlmGateway + 'static> ModelArbitration<G> {
    pub fn new(gateway: Arc<G>, model: impl Into<String>) -> Self {
        Self {
            gateway,
            model: model.into(),
        }
    }

    async fn ask_moderator(
        &self,
        issues: &BackendIssues,
    ) -> Result<Option<Vec<Selection>>, ArbitrationError> {
        let candidates = fixable_candidates(issues);
        let (contested, uncontested): (Vec<_>, Vec<_>) = candidates
            .into_iter()
            .partition(|(_, proposals)| proposals.len() > 1);

        if contested.is_empty() {
            debug!("No contested locations, skipping moderator");
            return Ok(None);
        }

        info!(
            "Asking moderator {} to arbitrate {} locations",
            self.model,
            contested.len()
        );

        let session = self
            .gateway
            .create_session_with_system_prompt(&self.model, ReviewPromptTemplate::arbitration_system())
            .await?;
        let response = session
            .send(&ReviewPromptTemplate::arbitration_prompt(&contested))
            .await?;

        let entries = extract_first_json_array(&response).ok_or(ArbitrationError::NoSelection)?;

        let mut selections: Vec<Selection> = entries
            .into_iter()
            .filter_map(|value| serde_json::from_value::<Selection>(value).ok())
            .collect();

        selections.extend(uncontested.into_iter().map(|((file, line), _)| Selection {
            file,
            line,
            backend: None,
        }));

        Ok(Some(selections))
    }
}

#[async_trait]
impl<G: LlmGateway + 'static> AdjudicationStrategy for ModelArbitration<G> {
    fn name(&self) -> &str {
        "model"
    }

    async fn adjudicate(&self, issues: &BackendIssues) -> Adjudication {
        match self.ask_moderator(issues).await {
            Ok(Some(selections)) => adjudicate_with_selection(issues, &selections),
            Ok(None) => adjudicate_first_seen(issues),
            Err(e) => {
                warn!("Model arbitration failed, falling back to first-seen: {}", e);
                adjudicate_first_seen(issues)
            }
        }
    }
}
