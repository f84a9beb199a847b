//! # Completion
//!
//! This crate is the boundary to the external text-completion capability
//! used to derive concepts and generate dialogue turns.
//!
//! ## Features
//!
//! - **Provider Trait**: One call, a message list in and text out
//! - **OpenRouter Provider**: Chat-completions over HTTP with a per-call credential
//! - **Redacted Credentials**: Keys never show up in `Debug` output or logs
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                      Completion Boundary                        │
//! ├─────────────────────────────────────────────────────────────────┤
//! │  CompletionRequest ──► CompletionProvider ──► CompletionResponse│
//! │                              │                                  │
//! │                              ▼                                  │
//! │                  OpenRouterProvider (reqwest)                   │
//! └─────────────────────────────────────────────────────────────────┘
//! ```

pub mod config;
pub mod credential;
pub mod error;
pub mod provider;

pub use config::CompletionConfig;
pub use credential::Credential;
pub use error::{CompletionError, Result};
pub use provider::{
    ChatMessage, CompletionProvider, CompletionRequest, CompletionResponse, OpenRouterProvider,
    Role,
};
