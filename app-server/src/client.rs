//! Client for the tutoring HTTP API.
//!
//! Also carries the helpers a front end needs: identifier parsing from
//! pasted links and a progress estimate across concepts.

use std::time::Duration;

use readiscover_tutor::{SessionStarted, TurnOutcome};
use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::{debug, warn};

use crate::session_handler::{AnswerParams, StartSessionParams};

/// Errors returned by [`TutorClient`].
#[derive(Error, Debug)]
pub enum ClientError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// The server answered with an error status.
    #[error("server returned {status}: {message}")]
    Api { status: u16, message: String },
}

impl ClientError {
    /// Transport failures and 5xx responses. A body that fails to decode
    /// arrived after the server applied the request, so it is not retried.
    fn is_retryable(&self) -> bool {
        match self {
            ClientError::Http(e) => !e.is_decode(),
            ClientError::Api { status, .. } => *status >= 500,
        }
    }
}

/// Exponential backoff for idempotent-enough calls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the first attempt.
    pub max_retries: u32,

    /// Delay before the first retry; doubles on each further retry.
    pub initial_delay: Duration,
}

impl RetryPolicy {
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            initial_delay: Duration::ZERO,
        }
    }

    pub fn with_initial_delay(mut self, delay: Duration) -> Self {
        self.initial_delay = delay;
        self
    }

    /// Delay before retry number `retry` (0-based).
    pub fn delay_for(&self, retry: u32) -> Duration {
        self.initial_delay
            .saturating_mul(2u32.saturating_pow(retry))
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_delay: Duration::from_secs(1),
        }
    }
}

/// HTTP client for `/session/start` and `/session/answer`.
pub struct TutorClient {
    base_url: String,
    http: reqwest::Client,
    retry: RetryPolicy,
}

impl TutorClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http: reqwest::Client::new(),
            retry: RetryPolicy::default(),
        }
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Start a session. Not retried: a repeated start would create a second session.
    pub async fn start_session(
        &self,
        arxiv_id: &str,
        api_key: &str,
        knowledge: &str,
    ) -> Result<SessionStarted, ClientError> {
        let params = StartSessionParams {
            arxiv_id: Some(arxiv_id.to_string()),
            openrouter_api_key: Some(api_key.to_string()),
            user_knowledge_text: Some(knowledge.to_string()),
        };
        self.post_json("/session/start", &params).await
    }

    /// Submit an answer, retrying transport errors and 5xx responses.
    pub async fn submit_answer(
        &self,
        session_id: &str,
        answer: &str,
    ) -> Result<TurnOutcome, ClientError> {
        let params = AnswerParams {
            session_id: Some(session_id.to_string()),
            user_answer: Some(answer.to_string()),
        };

        let mut retry = 0;
        loop {
            match self.post_json("/session/answer", &params).await {
                Err(e) if e.is_retryable() && retry < self.retry.max_retries => {
                    let delay = self.retry.delay_for(retry);
                    warn!("Answer submission failed ({e}), retrying in {delay:?}");
                    tokio::time::sleep(delay).await;
                    retry += 1;
                }
                result => return result,
            }
        }
    }

    async fn post_json<B, R>(&self, path: &str, body: &B) -> Result<R, ClientError>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let url = format!("{}{path}", self.base_url);
        debug!("POST {url}");

        let response = self.http.post(&url).json(body).send().await?;
        let status = response.status();
        if !status.is_success() {
            let message = response
                .json::<serde_json::Value>()
                .await
                .ok()
                .and_then(|v| v["error"].as_str().map(str::to_string))
                .unwrap_or_else(|| status.to_string());
            return Err(ClientError::Api {
                status: status.as_u16(),
                message,
            });
        }
        Ok(response.json().await?)
    }
}

/// Extract an archive identifier from a pasted link or a bare id.
///
/// Accepts `arxiv.org/abs/<id>`, `arxiv.org/pdf/<id>` and `<digits>.<digits>`.
pub fn parse_arxiv_id(input: &str) -> Option<String> {
    let input = input.trim();
    let patterns = [
        r"(?i)arxiv\.org/abs/(\d+\.\d+)",
        r"(?i)arxiv\.org/pdf/(\d+\.\d+)",
        r"^(\d+\.\d+)$",
    ];
    patterns.iter().find_map(|pattern| {
        let re = regex_lite::Regex::new(pattern).ok()?;
        re.captures(input)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().to_string())
    })
}

/// Messages assumed to cover one concept.
pub const MESSAGES_PER_CONCEPT: u32 = 5;

/// Progress estimate shown while a session runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConceptProgress {
    total_concepts: usize,
    current_concept: usize,
    messages_in_concept: u32,
}

impl ConceptProgress {
    pub fn new(total_concepts: usize) -> Self {
        Self {
            total_concepts,
            current_concept: 1,
            messages_in_concept: 0,
        }
    }

    /// Count one exchange; moving to another concept restarts the count.
    pub fn record_turn(&mut self, current_concept: usize) {
        if current_concept != self.current_concept {
            self.current_concept = current_concept;
            self.messages_in_concept = 0;
        }
        self.messages_in_concept += 1;
    }

    /// Percentage in `3.0..=100.0`, never past the current concept's share.
    pub fn percentage(&self) -> f64 {
        if self.total_concepts == 0 {
            return 100.0;
        }
        let total = self.total_concepts as f64;
        let done = self.current_concept.saturating_sub(1) as f64 / total;
        let within = f64::from(self.messages_in_concept) / f64::from(MESSAGES_PER_CONCEPT) / total;
        let ceiling = self.current_concept as f64 / total;
        ((done + within).min(ceiling) * 100.0).clamp(3.0, 100.0)
    }
}
