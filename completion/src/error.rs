//! Error types for the completion boundary.

use thiserror::Error;

/// Result type alias for completion operations.
pub type Result<T> = std::result::Result<T, CompletionError>;

/// Errors that can occur while calling a completion provider.
#[derive(Error, Debug)]
pub enum CompletionError {
    /// No credential was supplied.
    #[error("completion provider not configured: missing credential")]
    NotConfigured,

    /// The provider rejected the credential.
    #[error("credential rejected by completion provider: {0}")]
    Unauthorized(String),

    /// Rate limit exceeded.
    #[error("rate limit exceeded, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    /// API request failed.
    #[error("API request failed: {0}")]
    ApiRequest(String),

    /// Invalid response from provider.
    #[error("invalid response: {0}")]
    InvalidResponse(String),

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// HTTP error.
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
}
