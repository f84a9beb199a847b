//! Completion providers.
//!
//! The tutor talks to a single [`CompletionProvider`]; the HTTP implementation
//! targets an OpenAI-compatible chat-completions endpoint such as OpenRouter.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::CompletionConfig;
use crate::credential::Credential;
use crate::error::{CompletionError, Result};

/// Role of a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// A single message sent to the provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// Request for a single completion.
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    /// Caller-supplied credential, forwarded as a bearer token.
    pub credential: Credential,

    /// Model to use; falls back to the provider default.
    pub model: Option<String>,

    /// Ordered conversation, system message first.
    pub messages: Vec<ChatMessage>,

    /// Sampling temperature.
    pub temperature: Option<f32>,
}

impl CompletionRequest {
    /// Create a new completion request.
    pub fn new(credential: Credential, messages: Vec<ChatMessage>) -> Self {
        Self {
            credential,
            model: None,
            messages,
            temperature: None,
        }
    }

    /// Set the model to use.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Set the sampling temperature.
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }
}

/// Response from a completion call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletionResponse {
    /// Generated text.
    pub text: String,

    /// Model that produced the text.
    pub model: String,

    /// Token usage (if reported).
    pub tokens_used: Option<u64>,
}

/// Trait for completion providers.
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Get the name of this provider.
    fn name(&self) -> &str;

    /// Get the default model for this provider.
    fn default_model(&self) -> &str;

    /// Produce a completion for the given conversation.
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse>;
}

/// Chat-completions provider for OpenRouter and compatible APIs.
pub struct OpenRouterProvider {
    /// API base URL.
    base_url: String,

    /// HTTP client.
    client: reqwest::Client,

    /// Default model.
    default_model: String,

    /// `HTTP-Referer` header value.
    referer: Option<String>,

    /// `X-Title` header value.
    app_title: Option<String>,
}

impl OpenRouterProvider {
    /// Create a new provider with default settings.
    pub fn new() -> Self {
        Self::from_config(&CompletionConfig::default())
    }

    /// Create a provider from configuration.
    pub fn from_config(config: &CompletionConfig) -> Self {
        let mut builder = reqwest::Client::builder();
        if let Some(secs) = config.request_timeout_secs {
            builder = builder.timeout(std::time::Duration::from_secs(secs));
        }
        let client = match builder.build() {
            Ok(client) => client,
            Err(e) => {
                warn!("Failed to build HTTP client, using defaults: {e}");
                reqwest::Client::new()
            }
        };

        Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            client,
            default_model: config.default_model.clone(),
            referer: config.referer.clone(),
            app_title: config.app_title.clone(),
        }
    }

    /// Set the base URL.
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    /// Set the default model.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.default_model = model.into();
        self
    }
}

impl Default for OpenRouterProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CompletionProvider for OpenRouterProvider {
    fn name(&self) -> &str {
        "openrouter"
    }

    fn default_model(&self) -> &str {
        &self.default_model
    }

    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse> {
        if request.credential.is_empty() {
            return Err(CompletionError::NotConfigured);
        }

        let model = request
            .model
            .unwrap_or_else(|| self.default_model.clone());

        debug!(
            "Requesting completion with model {model} ({} messages)",
            request.messages.len()
        );

        let mut body = serde_json::json!({
            "model": model,
            "messages": request.messages,
        });
        if let Some(temperature) = request.temperature {
            body["temperature"] = serde_json::json!(temperature);
        }

        let mut http = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .header(
                "Authorization",
                format!("Bearer {}", request.credential.expose()),
            )
            .header("Content-Type", "application/json");
        if let Some(referer) = &self.referer {
            http = http.header("HTTP-Referer", referer);
        }
        if let Some(title) = &self.app_title {
            http = http.header("X-Title", title);
        }

        let response = http.json(&body).send().await?;
        let status = response.status();

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse().ok())
                .unwrap_or(60);

            return Err(CompletionError::RateLimited {
                retry_after_secs: retry_after,
            });
        }

        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN
        {
            let error_text = response.text().await.unwrap_or_default();
            warn!("Completion provider rejected credential ({status})");
            return Err(CompletionError::Unauthorized(error_text));
        }

        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(CompletionError::ApiRequest(format!(
                "API error ({status}): {error_text}"
            )));
        }

        let data: serde_json::Value = response.json().await?;
        parse_completion(&data, &model)
    }
}

/// Pull the first choice's content out of a chat-completions body.
fn parse_completion(data: &serde_json::Value, requested_model: &str) -> Result<CompletionResponse> {
    let text = data["choices"][0]["message"]["content"]
        .as_str()
        .ok_or_else(|| CompletionError::InvalidResponse("missing message content".to_string()))?
        .to_string();

    let model = data["model"]
        .as_str()
        .unwrap_or(requested_model)
        .to_string();

    let tokens_used = data["usage"]["total_tokens"].as_u64();

    Ok(CompletionResponse {
        text,
        model,
        tokens_used,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_message_serialization() {
        let message = ChatMessage::system("be brief");
        let value = serde_json::to_value(&message).unwrap();
        assert_eq!(
            value,
            serde_json::json!({"role": "system", "content": "be brief"})
        );
    }

    #[test]
    fn test_parse_completion() {
        let data = serde_json::json!({
            "model": "anthropic/claude-sonnet-4.5",
            "choices": [{"message": {"role": "assistant", "content": "hello"}}],
            "usage": {"total_tokens": 12}
        });
        let response = parse_completion(&data, "fallback").unwrap();
        assert_eq!(response.text, "hello");
        assert_eq!(response.model, "anthropic/claude-sonnet-4.5");
        assert_eq!(response.tokens_used, Some(12));
    }

    #[test]
    fn test_parse_completion_missing_content() {
        let data = serde_json::json!({"choices": []});
        let err = parse_completion(&data, "m").unwrap_err();
        assert!(matches!(err, CompletionError::InvalidResponse(_)));
    }

    #[test]
    fn test_defaults() {
        let provider = OpenRouterProvider::new();
        assert_eq!(provider.name(), "openrouter");
        assert_eq!(provider.default_model(), "anthropic/claude-sonnet-4.5");
    }
}
