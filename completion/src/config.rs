//! Configuration for the completion provider.

use serde::{Deserialize, Serialize};

/// Configuration for the chat-completions provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompletionConfig {
    /// API base URL (without the `/chat/completions` suffix).
    pub base_url: String,

    /// Model used when a request names none.
    pub default_model: String,

    /// Value of the `HTTP-Referer` header.
    pub referer: Option<String>,

    /// Value of the `X-Title` header.
    pub app_title: Option<String>,

    /// Per-request timeout; `None` leaves requests unbounded.
    pub request_timeout_secs: Option<u64>,
}

impl CompletionConfig {
    /// Set the base URL.
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set the default model.
    pub fn with_default_model(mut self, model: impl Into<String>) -> Self {
        self.default_model = model.into();
        self
    }

    /// Set the request timeout.
    pub fn with_request_timeout_secs(mut self, secs: u64) -> Self {
        self.request_timeout_secs = Some(secs);
        self
    }
}

impl Default for CompletionConfig {
    fn default() -> Self {
        Self {
            base_url: "https://openrouter.ai/api/v1".to_string(),
            default_model: "anthropic/claude-sonnet-4.5".to_string(),
            referer: Some("https://readiscover.7vik.io".to_string()),
            app_title: Some("Readiscover".to_string()),
            request_timeout_secs: None,
        }
    }
}
