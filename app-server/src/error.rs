//! HTTP error mapping.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use readiscover_completion::CompletionError;
use readiscover_paper::PaperError;
use readiscover_tutor::TutorError;
use thiserror::Error;
use tracing::error;

use crate::source::SourceError;

/// Error returned by request handlers; rendered as `{"error": message}`.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),

    #[error("Session not found or expired")]
    SessionNotFound,

    #[error("{0}")]
    Unprocessable(String),

    #[error("{0}")]
    Upstream(String),

    #[error("Not found")]
    RouteNotFound,

    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::SessionNotFound | ApiError::RouteNotFound => StatusCode::NOT_FOUND,
            ApiError::Unprocessable(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Upstream(_) => StatusCode::BAD_GATEWAY,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<TutorError> for ApiError {
    fn from(err: TutorError) -> Self {
        error!("Tutor error: {err:?}");
        match err {
            TutorError::Validation(message) => ApiError::Validation(message),
            TutorError::SessionNotFound(_) => ApiError::SessionNotFound,
            TutorError::Upstream(message) => ApiError::Upstream(message),
            TutorError::Completion(e) => ApiError::Upstream(completion_message(&e).to_string()),
        }
    }
}

/// Caller-facing text for a provider failure; the provider's body stays in the log.
fn completion_message(err: &CompletionError) -> &'static str {
    match err {
        CompletionError::NotConfigured | CompletionError::Unauthorized(_) => {
            "Completion service rejected the API key"
        }
        CompletionError::RateLimited { .. } => "Completion service rate limit exceeded",
        _ => "Completion service request failed",
    }
}

impl From<PaperError> for ApiError {
    fn from(err: PaperError) -> Self {
        error!("Ingestion error: {err:?}");
        ApiError::Unprocessable(err.to_string())
    }
}

impl From<SourceError> for ApiError {
    fn from(err: SourceError) -> Self {
        error!("Archive source error: {err:?}");
        match err {
            SourceError::Unavailable { .. } => ApiError::Upstream(err.to_string()),
            SourceError::Http(_) => ApiError::Upstream("failed to fetch paper source".to_string()),
            SourceError::Decompress(_) => ApiError::Unprocessable(err.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(serde_json::json!({ "error": self.to_string() }));
        (self.status(), body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (
                ApiError::from(TutorError::Validation("missing".to_string())),
                StatusCode::BAD_REQUEST,
            ),
            (
                ApiError::from(TutorError::SessionNotFound("x".to_string())),
                StatusCode::NOT_FOUND,
            ),
            (
                ApiError::from(PaperError::MainDocumentMissing),
                StatusCode::UNPROCESSABLE_ENTITY,
            ),
            (
                ApiError::from(TutorError::Completion(CompletionError::ApiRequest(
                    "down".to_string(),
                ))),
                StatusCode::BAD_GATEWAY,
            ),
            (
                ApiError::from(SourceError::Unavailable {
                    id: "1".to_string(),
                    status: 404,
                }),
                StatusCode::BAD_GATEWAY,
            ),
            (
                ApiError::Internal("boom".to_string()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];
        for (err, status) in cases {
            assert_eq!(err.status(), status, "{err}");
        }
    }

    #[test]
    fn test_session_message_hides_id() {
        let err = ApiError::from(TutorError::SessionNotFound("secret-id".to_string()));
        assert_eq!(err.to_string(), "Session not found or expired");
    }

    #[test]
    fn test_provider_detail_stays_out_of_response() {
        let err = ApiError::from(TutorError::Completion(CompletionError::ApiRequest(
            "API error (500): internal trace id 42".to_string(),
        )));
        assert_eq!(err.status(), StatusCode::BAD_GATEWAY);
        assert_eq!(err.to_string(), "Completion service request failed");

        let err = ApiError::from(TutorError::Completion(CompletionError::Unauthorized(
            "{\"error\": \"bad key sk-123\"}".to_string(),
        )));
        assert_eq!(err.to_string(), "Completion service rejected the API key");
    }
}
