//! Session handler for the app-server.
//!
//! Fetches and ingests paper sources, then hands the structure to the tutor.
//! Request validation happens here so the tutor only sees well-formed input.

use std::sync::Arc;

use readiscover_completion::{CompletionProvider, Credential, OpenRouterProvider};
use readiscover_paper::ingest;
use readiscover_tutor::{SessionRegistry, SessionStarted, StartSession, TurnOutcome, Tutor};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::config::ServerConfig;
use crate::error::ApiError;
use crate::source::{ArchiveSource, ArxivSource};

const MAX_ARXIV_ID_LEN: usize = 64;

/// Body of `POST /session/start`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StartSessionParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub arxiv_id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub openrouter_api_key: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_knowledge_text: Option<String>,
}

/// Body of `POST /session/answer`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_answer: Option<String>,
}

/// Check an archive identifier: 1-64 ASCII alphanumerics, `.`, `/` or `-`.
pub fn validate_arxiv_id(id: &str) -> Result<&str, ApiError> {
    let id = id.trim();
    let well_formed = !id.is_empty()
        && id.len() <= MAX_ARXIV_ID_LEN
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '/' | '-'));
    if well_formed {
        Ok(id)
    } else {
        Err(ApiError::Validation(format!("Invalid arxiv_id: {id:?}")))
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Handler for session operations.
pub struct SessionHandler {
    tutor: Tutor,
    source: Arc<dyn ArchiveSource>,
}

impl SessionHandler {
    pub fn new(tutor: Tutor, source: Arc<dyn ArchiveSource>) -> Self {
        Self { tutor, source }
    }

    /// Build the production handler: arXiv source, OpenRouter provider and a
    /// fresh registry.
    pub fn from_config(config: &ServerConfig) -> anyhow::Result<Self> {
        let provider: Arc<dyn CompletionProvider> =
            Arc::new(OpenRouterProvider::from_config(&config.completion));
        let registry = Arc::new(SessionRegistry::new(config.tutor.inactivity_timeout()));
        let tutor = Tutor::new(provider, registry, config.tutor.clone());
        let source = Arc::new(ArxivSource::from_config(&config.source)?);
        Ok(Self::new(tutor, source))
    }

    pub fn tutor(&self) -> &Tutor {
        &self.tutor
    }

    /// Fetch, ingest and start a tutoring session.
    pub async fn start_session(
        &self,
        params: StartSessionParams,
    ) -> Result<SessionStarted, ApiError> {
        let (Some(arxiv_id), Some(api_key)) = (
            non_empty(params.arxiv_id),
            non_empty(params.openrouter_api_key),
        ) else {
            return Err(ApiError::Validation(
                "Missing required fields: arxiv_id, openrouter_api_key".to_string(),
            ));
        };
        let arxiv_id = validate_arxiv_id(&arxiv_id)?;

        info!("Fetching source for {arxiv_id}");
        let archive = self.source.fetch(arxiv_id).await?;

        let structure = tokio::task::spawn_blocking(move || ingest(&archive))
            .await
            .map_err(|e| ApiError::Internal(format!("ingestion task failed: {e}")))??;
        if structure.is_degraded() {
            warn!("No title or figures recovered for {arxiv_id}");
        }
        info!(
            "Ingested {arxiv_id}: main document {}, {} figures",
            structure.main_document_path,
            structure.figures.len()
        );

        let started = self
            .tutor
            .start_session(StartSession {
                structure,
                credential: Credential::new(api_key),
                knowledge: params.user_knowledge_text.unwrap_or_default(),
            })
            .await?;
        Ok(started)
    }

    /// Submit one answer to a live session.
    pub async fn answer(&self, params: AnswerParams) -> Result<TurnOutcome, ApiError> {
        let (Some(session_id), Some(answer)) =
            (non_empty(params.session_id), non_empty(params.user_answer))
        else {
            return Err(ApiError::Validation(
                "Missing required fields: session_id, user_answer".to_string(),
            ));
        };

        Ok(self.tutor.submit_answer(&session_id, &answer).await?)
    }
}
