//! Error types for archive extraction.

use thiserror::Error;

/// Result type alias for archive operations.
pub type Result<T> = std::result::Result<T, ArchiveError>;

/// Errors that can occur while decoding an archive.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ArchiveError {
    /// An entry declares more content than the archive holds.
    #[error("archive truncated: entry {path} declares {declared} bytes but only {available} remain")]
    Truncated {
        /// Path of the offending entry.
        path: String,
        /// Size declared in the entry header.
        declared: u64,
        /// Bytes left in the archive after the header.
        available: u64,
    },
}
