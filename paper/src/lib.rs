//! # Paper Structure
//!
//! This crate recovers the structure of a paper from its classified source
//! documents. It provides:
//!
//! - **Main Document Resolution**: Pick the entry document of the source tree
//! - **Title Extraction**: Brace-aware capture and cleanup of the title
//! - **Figure Inventory**: Graphics inclusions resolved to image payloads,
//!   with nearby captions and labels
//! - **Ingestion**: One call from archive bytes to [`PaperStructure`]
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                     Ingestion Pipeline                          │
//! ├─────────────────────────────────────────────────────────────────┤
//! │  bytes ──► extract_entries ──► classify_all                     │
//! │                                     │                           │
//! │                                     ▼                           │
//! │  find_main_document ──► extract_structure ──► PaperStructure    │
//! │                          │            │                         │
//! │                          ▼            ▼                         │
//! │                    extract_title  extract_figures               │
//! └─────────────────────────────────────────────────────────────────┘
//! ```

pub mod error;
pub mod figure;
pub mod markup;
pub mod resolver;
pub mod structure;
pub mod title;

pub use error::{PaperError, Result};
pub use figure::{
    Figure, FigureFormat, GraphicsReference, extract_figures, find_graphics_references,
    resolve_image,
};
pub use resolver::{CONVENTIONAL_MAIN_NAMES, find_main_document};
pub use structure::{PaperStructure, concatenate_text, extract_structure, ingest};
pub use title::{extract_title, normalize_title};
