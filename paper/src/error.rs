//! Error types for paper ingestion.

use thiserror::Error;

/// Result type alias for ingestion operations.
pub type Result<T> = std::result::Result<T, PaperError>;

/// Errors that abort ingestion.
///
/// An empty title or an empty figure inventory is not an error; the
/// pipeline continues with degraded data.
#[derive(Error, Debug)]
pub enum PaperError {
    /// The archive could not be decoded.
    #[error("archive error: {0}")]
    Archive(#[from] readiscover_archive::ArchiveError),

    /// No document qualifies as the main document.
    #[error("could not find main LaTeX file in source")]
    MainDocumentMissing,
}
