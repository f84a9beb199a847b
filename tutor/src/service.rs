//! Session start and answer submission.

use std::sync::Arc;

use readiscover_completion::{ChatMessage, CompletionProvider, CompletionRequest, Credential};
use readiscover_paper::PaperStructure;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::concept::ConceptDeriver;
use crate::config::{FALLBACK_TITLE, TutorConfig};
use crate::error::{Result, TutorError};
use crate::markers::strip_markers;
use crate::prompts;
use crate::registry::SessionRegistry;
use crate::session::{Session, TurnOutcome};

/// Input for [`Tutor::start_session`].
#[derive(Debug, Clone)]
pub struct StartSession {
    pub structure: PaperStructure,
    pub credential: Credential,

    /// Free-form description of what the learner already knows.
    pub knowledge: String,
}

/// Reply to a successful session start.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionStarted {
    pub session_id: String,
    pub paper_title: String,
    pub total_concepts: usize,
    pub initial_message: String,
}

/// Drives tutoring sessions against a completion provider.
pub struct Tutor {
    provider: Arc<dyn CompletionProvider>,
    registry: Arc<SessionRegistry>,
    deriver: ConceptDeriver,
    config: TutorConfig,
}

impl Tutor {
    pub fn new(
        provider: Arc<dyn CompletionProvider>,
        registry: Arc<SessionRegistry>,
        config: TutorConfig,
    ) -> Self {
        let deriver = ConceptDeriver::new(
            Arc::clone(&provider),
            config.summarizer_model.clone(),
            config.summarizer_temperature,
        );
        Self {
            provider,
            registry,
            deriver,
            config,
        }
    }

    pub fn registry(&self) -> &Arc<SessionRegistry> {
        &self.registry
    }

    pub fn config(&self) -> &TutorConfig {
        &self.config
    }

    /// Derive concepts, fetch the opening message and register the session.
    ///
    /// Nothing is registered unless every step succeeds.
    pub async fn start_session(&self, request: StartSession) -> Result<SessionStarted> {
        let StartSession {
            structure,
            credential,
            knowledge,
        } = request;

        if credential.is_empty() {
            return Err(TutorError::Validation(
                "Missing required fields: openrouter_api_key".to_string(),
            ));
        }

        self.registry.sweep_expired().await;

        let concepts = self
            .deriver
            .derive(&credential, &structure, &knowledge)
            .await?;

        let paper_title = if structure.title.trim().is_empty() {
            warn!("Paper has no title, using {FALLBACK_TITLE:?}");
            FALLBACK_TITLE.to_string()
        } else {
            structure.title.clone()
        };

        let messages = vec![
            ChatMessage::system(prompts::opening_system_prompt(
                &paper_title,
                &concepts,
                &knowledge,
            )),
            ChatMessage::user(prompts::OPENING_REQUEST),
        ];
        let response = self
            .provider
            .complete(self.dialogue_request(&credential, messages))
            .await?;
        let initial_message = strip_markers(&response.text);

        let session_id = uuid::Uuid::new_v4().to_string();
        let total_concepts = concepts.len();
        let session = Session::new(
            session_id.clone(),
            credential,
            knowledge,
            structure,
            concepts,
            initial_message.clone(),
        )?;
        self.registry.insert(session).await;

        info!("[{session_id}] Session started with {total_concepts} concepts");

        Ok(SessionStarted {
            session_id,
            paper_title,
            total_concepts,
            initial_message,
        })
    }

    /// Run one turn: send the answer with the history, then apply the reply.
    ///
    /// Looking the session up refreshes its activity stamp even if the turn
    /// fails afterwards. A failed provider call leaves history, cursor and
    /// registry membership unchanged.
    pub async fn submit_answer(&self, session_id: &str, answer: &str) -> Result<TurnOutcome> {
        if session_id.trim().is_empty() || answer.trim().is_empty() {
            return Err(TutorError::Validation(
                "Missing required fields: session_id, user_answer".to_string(),
            ));
        }

        self.registry.sweep_expired().await;

        let handle = self
            .registry
            .get(session_id)
            .await
            .ok_or_else(|| TutorError::SessionNotFound(session_id.to_string()))?;

        let mut session = handle.lock().await;
        if session.is_complete() {
            return Err(TutorError::SessionNotFound(session_id.to_string()));
        }

        debug!(
            "[{session_id}] Processing answer for concept {}",
            session.current_concept
        );

        let concept = session
            .current()
            .ok_or_else(|| TutorError::Upstream("session has no active concept".to_string()))?;
        let paper_excerpt = prompts::excerpt(
            &session.structure.full_text,
            self.config.context_excerpt_chars,
        );
        let system = prompts::dialogue_system_prompt(
            concept,
            session.current_concept,
            session.concepts.len(),
            &session.knowledge_text,
            &paper_excerpt,
        );

        let mut messages = vec![ChatMessage::system(system)];
        messages.extend(session.transcript_with(answer));

        let response = self
            .provider
            .complete(self.dialogue_request(&session.credential, messages))
            .await?;

        let outcome = session.apply_turn(answer, &response.text)?;
        drop(session);

        if outcome.is_complete {
            self.registry.remove(session_id).await;
            info!("[{session_id}] Session complete, removed from registry");
        }

        Ok(outcome)
    }

    fn dialogue_request(
        &self,
        credential: &Credential,
        messages: Vec<ChatMessage>,
    ) -> CompletionRequest {
        CompletionRequest::new(credential.clone(), messages)
            .with_model(self.config.dialogue_model.clone())
            .with_temperature(self.config.dialogue_temperature)
    }
}
