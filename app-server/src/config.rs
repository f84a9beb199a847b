//! Server configuration.
//!
//! Values come from defaults, then an optional TOML file, then
//! `READISCOVER_*` environment variables.

use std::path::Path;

use anyhow::{Context, Result};
use readiscover_completion::CompletionConfig;
use readiscover_tutor::TutorConfig;
use serde::{Deserialize, Serialize};

/// Configuration for the archive source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    /// Base URL; archives are fetched from `{base_url}/src/{id}`.
    pub base_url: String,

    /// Per-request timeout.
    pub timeout_secs: u64,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            base_url: "https://arxiv.org".to_string(),
            timeout_secs: 60,
        }
    }
}

/// Top-level server configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Socket address to bind.
    pub listen: String,

    pub source: SourceConfig,

    pub completion: CompletionConfig,

    pub tutor: TutorConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen: "127.0.0.1:8787".to_string(),
            source: SourceConfig::default(),
            completion: CompletionConfig::default(),
            tutor: TutorConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Load from an optional TOML file and apply environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => {
                let raw = std::fs::read_to_string(path)
                    .with_context(|| format!("failed to read config {}", path.display()))?;
                Self::from_toml(&raw)
                    .with_context(|| format!("failed to parse config {}", path.display()))?
            }
            None => Self::default(),
        };
        config.apply_overrides(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    pub fn from_toml(raw: &str) -> Result<Self> {
        Ok(toml::from_str(raw)?)
    }

    /// Apply `READISCOVER_*` overrides from `lookup`.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(listen) = lookup("READISCOVER_LISTEN") {
            self.listen = listen;
        }
        if let Some(url) = lookup("READISCOVER_SOURCE_BASE_URL") {
            self.source.base_url = url;
        }
        if let Some(url) = lookup("READISCOVER_COMPLETION_BASE_URL") {
            self.completion.base_url = url;
        }
        if let Some(model) = lookup("READISCOVER_SUMMARIZER_MODEL") {
            self.tutor.summarizer_model = model;
        }
        if let Some(model) = lookup("READISCOVER_DIALOGUE_MODEL") {
            self.tutor.dialogue_model = model;
        }
        if let Some(secs) = lookup("READISCOVER_INACTIVITY_TIMEOUT_SECS") {
            self.tutor.inactivity_timeout_secs = secs
                .parse()
                .with_context(|| format!("invalid READISCOVER_INACTIVITY_TIMEOUT_SECS: {secs}"))?;
        }
        Ok(())
    }
}
