//! Main document resolution.

use readiscover_archive::ParsedDocument;
use tracing::debug;

/// Marker identifying a standalone document.
const DOCUMENT_CLASS_MARKER: &str = r"\documentclass";

/// Conventional main document names, in priority order.
pub const CONVENTIONAL_MAIN_NAMES: &[&str] = &["main.tex", "paper.tex", "manuscript.tex"];

/// Select the entry document among classified sources.
///
/// Resolution order:
/// 1. the first `tex` text document declaring a document class;
/// 2. the first document whose path ends with a conventional name, trying
///    the names in priority order;
/// 3. the first `tex` document.
pub fn find_main_document(documents: &[ParsedDocument]) -> Option<&ParsedDocument> {
    let tex_documents = || documents.iter().filter(|d| d.is_text_with_extension("tex"));

    if let Some(doc) = tex_documents()
        .find(|d| d.text().is_some_and(|text| text.contains(DOCUMENT_CLASS_MARKER)))
    {
        debug!("Main document {} declares a document class", doc.path);
        return Some(doc);
    }

    for name in CONVENTIONAL_MAIN_NAMES {
        if let Some(doc) = documents
            .iter()
            .find(|d| d.path.to_lowercase().ends_with(name))
        {
            debug!("Main document {} matched conventional name {name}", doc.path);
            return Some(doc);
        }
    }

    documents.iter().find(|d| d.extension == "tex")
}
