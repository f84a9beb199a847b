//! Archive source: fetches e-print archives by identifier.

use std::io::Read;
use std::time::Duration;

use async_trait::async_trait;
use flate2::read::GzDecoder;
use thiserror::Error;
use tracing::{debug, info};

use crate::config::SourceConfig;

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// Errors from fetching an archive.
#[derive(Error, Debug)]
pub enum SourceError {
    /// The source answered with a non-success status.
    #[error("failed to fetch source for {id}: status {status}")]
    Unavailable { id: String, status: u16 },

    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("failed to decompress archive: {0}")]
    Decompress(#[from] std::io::Error),
}

/// Something that returns decompressed archive bytes for an identifier.
#[async_trait]
pub trait ArchiveSource: Send + Sync {
    async fn fetch(&self, id: &str) -> Result<Vec<u8>, SourceError>;
}

/// Fetches e-print sources over HTTP.
pub struct ArxivSource {
    base_url: String,
    client: reqwest::Client,
}

impl ArxivSource {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
        }
    }

    pub fn from_config(config: &SourceConfig) -> Result<Self, SourceError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            client,
        })
    }
}

#[async_trait]
impl ArchiveSource for ArxivSource {
    async fn fetch(&self, id: &str) -> Result<Vec<u8>, SourceError> {
        let url = format!("{}/src/{id}", self.base_url);
        debug!("Fetching archive from {url}");

        let response = self.client.get(&url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(SourceError::Unavailable {
                id: id.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response.bytes().await?;
        let archive = gunzip_if_needed(&body)?;
        info!("Fetched archive for {id} ({} bytes)", archive.len());
        Ok(archive)
    }
}

/// Gunzip `bytes` when they start with the gzip magic; otherwise copy them.
pub fn gunzip_if_needed(bytes: &[u8]) -> Result<Vec<u8>, SourceError> {
    if !bytes.starts_with(&GZIP_MAGIC) {
        return Ok(bytes.to_vec());
    }
    let mut decoded = Vec::new();
    GzDecoder::new(bytes).read_to_end(&mut decoded)?;
    Ok(decoded)
}
