//! HTTP routes.

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Request, State};
use axum::http::header::{
    ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS, ACCESS_CONTROL_ALLOW_ORIGIN,
};
use axum::http::{HeaderValue, Method, StatusCode};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use readiscover_tutor::{SessionStarted, TurnOutcome};

use crate::error::ApiError;
use crate::session_handler::{AnswerParams, SessionHandler, StartSessionParams};

/// Build the application router.
pub fn router(handler: Arc<SessionHandler>) -> Router {
    Router::new()
        .route("/", get(health))
        .route("/health", get(health))
        .route("/session/start", post(start_session))
        .route("/session/answer", post(answer))
        .fallback(not_found)
        .layer(middleware::from_fn(cors))
        .with_state(handler)
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "service": "readiscover-api",
    }))
}

async fn start_session(
    State(handler): State<Arc<SessionHandler>>,
    payload: Result<Json<StartSessionParams>, JsonRejection>,
) -> Result<Json<SessionStarted>, ApiError> {
    let Json(params) = payload.map_err(|e| ApiError::Validation(e.body_text()))?;
    Ok(Json(handler.start_session(params).await?))
}

async fn answer(
    State(handler): State<Arc<SessionHandler>>,
    payload: Result<Json<AnswerParams>, JsonRejection>,
) -> Result<Json<TurnOutcome>, ApiError> {
    let Json(params) = payload.map_err(|e| ApiError::Validation(e.body_text()))?;
    Ok(Json(handler.answer(params).await?))
}

async fn not_found() -> ApiError {
    ApiError::RouteNotFound
}

/// Allow browser clients from any origin; preflight requests end here.
async fn cors(request: Request, next: Next) -> Response {
    let mut response = if request.method() == Method::OPTIONS {
        StatusCode::NO_CONTENT.into_response()
    } else {
        next.run(request).await
    };

    let headers = response.headers_mut();
    headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static("*"));
    headers.insert(
        ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static("GET, POST, OPTIONS"),
    );
    headers.insert(
        ACCESS_CONTROL_ALLOW_HEADERS,
        HeaderValue::from_static("Content-Type"),
    );
    response
}
