//! HTTP service for Readiscover.
//!
//! Exposes session start and answer submission over JSON, backed by the
//! ingestion pipeline and the tutor.

pub mod client;
pub mod config;
pub mod error;
pub mod routes;
pub mod session_handler;
pub mod source;

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{info, warn};

pub use client::{ClientError, ConceptProgress, RetryPolicy, TutorClient, parse_arxiv_id};
pub use config::{ServerConfig, SourceConfig};
pub use error::ApiError;
pub use routes::router;
pub use session_handler::{AnswerParams, SessionHandler, StartSessionParams, validate_arxiv_id};
pub use source::{ArchiveSource, ArxivSource, SourceError, gunzip_if_needed};

/// Bind and serve until interrupted.
pub async fn run(config: ServerConfig) -> Result<()> {
    let handler = Arc::new(SessionHandler::from_config(&config)?);
    let app = router(handler);

    let listener = tokio::net::TcpListener::bind(&config.listen)
        .await
        .with_context(|| format!("failed to bind {}", config.listen))?;
    info!("Listening on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {e}");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
