//! Configuration for the tutoring service.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Inactivity window after which a session is evicted.
pub const DEFAULT_INACTIVITY_TIMEOUT_SECS: u64 = 30 * 60;

/// Title reported when the paper has none.
pub const FALLBACK_TITLE: &str = "Research Paper";

/// Configuration for [`crate::Tutor`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TutorConfig {
    /// Model that derives concepts from the whole paper.
    pub summarizer_model: String,

    /// Model that produces dialogue turns.
    pub dialogue_model: String,

    /// Sampling temperature for concept derivation.
    pub summarizer_temperature: f32,

    /// Sampling temperature for dialogue turns.
    pub dialogue_temperature: f32,

    /// Seconds of inactivity before a session is swept.
    pub inactivity_timeout_secs: u64,

    /// Characters of paper text included in each dialogue prompt.
    pub context_excerpt_chars: usize,
}

impl TutorConfig {
    /// Set both model names.
    pub fn with_models(
        mut self,
        summarizer: impl Into<String>,
        dialogue: impl Into<String>,
    ) -> Self {
        self.summarizer_model = summarizer.into();
        self.dialogue_model = dialogue.into();
        self
    }

    /// Set the inactivity timeout.
    pub fn with_inactivity_timeout_secs(mut self, secs: u64) -> Self {
        self.inactivity_timeout_secs = secs;
        self
    }

    /// Set the excerpt length.
    pub fn with_context_excerpt_chars(mut self, chars: usize) -> Self {
        self.context_excerpt_chars = chars;
        self
    }

    pub fn inactivity_timeout(&self) -> Duration {
        Duration::from_secs(self.inactivity_timeout_secs)
    }
}

impl Default for TutorConfig {
    fn default() -> Self {
        Self {
            summarizer_model: "anthropic/claude-opus-4.5".to_string(),
            dialogue_model: "anthropic/claude-sonnet-4.5".to_string(),
            summarizer_temperature: 0.5,
            dialogue_temperature: 0.8,
            inactivity_timeout_secs: DEFAULT_INACTIVITY_TIMEOUT_SECS,
            context_excerpt_chars: 5000,
        }
    }
}
