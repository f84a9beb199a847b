//! # Archive
//!
//! This crate turns the raw (already decompressed) bytes of a paper source
//! archive into classified documents.
//!
//! ## Features
//!
//! - **Block Extraction**: Decode the 512-byte-block archive format into entries
//! - **Classification**: Tag each entry as text, image or binary by extension
//! - **Lenient Decoding**: Invalid UTF-8 in text sources is replaced, never fatal
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                         Archive                                 │
//! ├─────────────────────────────────────────────────────────────────┤
//! │  bytes ──► extract_entries ──► ArchiveEntry                     │
//! │                                     │                           │
//! │                                     ▼                           │
//! │                        classify ──► ParsedDocument              │
//! └─────────────────────────────────────────────────────────────────┘
//! ```

pub mod document;
pub mod error;
pub mod tar;

pub use document::{
    ContentClass, DocumentContent, ParsedDocument, classify, classify_all, extension_of,
};
pub use error::{ArchiveError, Result};
pub use tar::{ArchiveEntry, BLOCK_SIZE, EntryKind, encode_entries, extract_entries};
