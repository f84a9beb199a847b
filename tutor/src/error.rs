//! Error types for tutoring sessions.

use readiscover_completion::CompletionError;
use thiserror::Error;

/// Result type alias for tutor operations.
pub type Result<T> = std::result::Result<T, TutorError>;

/// Errors that can occur while starting or advancing a session.
#[derive(Error, Debug)]
pub enum TutorError {
    /// A required request field was missing or malformed.
    #[error("{0}")]
    Validation(String),

    /// No live session with this id (never existed, expired or completed).
    #[error("session not found or expired: {0}")]
    SessionNotFound(String),

    /// The completion capability answered, but not in a usable shape.
    #[error("upstream capability error: {0}")]
    Upstream(String),

    /// The completion capability could not be reached or refused the call.
    #[error(transparent)]
    Completion(#[from] CompletionError),
}
