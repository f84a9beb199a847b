//! Paper structure and the ingestion entry point.

use readiscover_archive::{ContentClass, ParsedDocument, classify_all, extract_entries};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{PaperError, Result};
use crate::figure::{Figure, extract_figures};
use crate::resolver::find_main_document;
use crate::title::extract_title;

/// The recovered structure of a paper.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaperStructure {
    /// Best-effort title; empty when none was found.
    pub title: String,

    /// Path of the entry document.
    pub main_document_path: String,

    /// Every text document, each prefixed with a `% File: <path>` line.
    pub full_text: String,

    /// Figures in order of first inclusion.
    pub figures: Vec<Figure>,
}

impl PaperStructure {
    /// Labels of all figures, in inventory order.
    pub fn figure_labels(&self) -> Vec<&str> {
        self.figures.iter().map(|f| f.label.as_str()).collect()
    }

    /// First figure carrying `label`.
    pub fn figure(&self, label: &str) -> Option<&Figure> {
        self.figures.iter().find(|f| f.label == label)
    }

    /// Check if extraction produced neither a title nor figures.
    pub fn is_degraded(&self) -> bool {
        self.title.is_empty() && self.figures.is_empty()
    }
}

/// Concatenate all text documents with a provenance line per file.
pub fn concatenate_text(documents: &[ParsedDocument]) -> String {
    documents
        .iter()
        .filter(|d| d.content_class() == ContentClass::Text)
        .filter_map(|d| d.text().map(|text| format!("% File: {}\n{text}", d.path)))
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Derive the structure from classified documents and the chosen main document.
pub fn extract_structure(documents: &[ParsedDocument], main: &ParsedDocument) -> PaperStructure {
    let full_text = concatenate_text(documents);
    let title = extract_title(documents);
    let figures = extract_figures(&full_text, documents);

    if figures.is_empty() {
        warn!("No figures resolved for {}", main.path);
    }

    PaperStructure {
        title,
        main_document_path: main.path.clone(),
        full_text,
        figures,
    }
}

/// Run the whole pipeline over decompressed archive bytes.
pub fn ingest(archive: &[u8]) -> Result<PaperStructure> {
    let entries = extract_entries(archive)?;
    let documents = classify_all(&entries);

    let main = find_main_document(&documents).ok_or(PaperError::MainDocumentMissing)?;
    let structure = extract_structure(&documents, main);

    info!(
        "Ingested {} documents: main={}, title={:?}, figures={}",
        documents.len(),
        structure.main_document_path,
        structure.title,
        structure.figures.len()
    );

    Ok(structure)
}
