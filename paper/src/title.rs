//! Title extraction.

use readiscover_archive::ParsedDocument;
use tracing::{debug, warn};

use crate::markup::{balanced_group, collapse_whitespace};

const TITLE_MARKER: &str = r"\title{";

/// Find and normalize the paper title.
///
/// Text documents are searched in order; within a document only the first
/// title marker is considered, and a marker whose group never closes moves
/// the search on to the next document. Returns an empty string when no
/// document declares a title.
pub fn extract_title(documents: &[ParsedDocument]) -> String {
    for doc in documents {
        let Some(text) = doc.text() else {
            continue;
        };
        let Some(marker) = text.find(TITLE_MARKER) else {
            continue;
        };

        match balanced_group(text, marker + TITLE_MARKER.len()) {
            Some(raw) => {
                debug!("Raw title in {}: {raw:?}", doc.path);
                return normalize_title(raw);
            }
            None => debug!("Unterminated title in {}", doc.path),
        }
    }

    warn!("No title declaration found in any text document");
    String::new()
}

/// Reduce raw title markup to plain text.
///
/// `\cmd{content}` keeps its content (one pass, not recursive), remaining
/// commands and line breaks are dropped, and braces are removed.
pub fn normalize_title(raw: &str) -> String {
    let mut title = collapse_whitespace(raw).replace(r"\\", " ");

    if let Ok(re) = regex_lite::Regex::new(r"\\[a-zA-Z]+\{([^}]*)\}") {
        title = re.replace_all(&title, "$1").into_owned();
    }
    if let Ok(re) = regex_lite::Regex::new(r"\\[a-zA-Z]+") {
        title = re.replace_all(&title, "").into_owned();
    }

    collapse_whitespace(&title.replace(['{', '}'], ""))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use readiscover_archive::{ArchiveEntry, classify_all};

    fn docs(files: &[(&str, &str)]) -> Vec<ParsedDocument> {
        let entries: Vec<ArchiveEntry> = files
            .iter()
            .map(|(path, content)| ArchiveEntry::file(*path, content.as_bytes().to_vec()))
            .collect();
        classify_all(&entries)
    }

    #[test]
    fn test_nested_braces() {
        let docs = docs(&[("main.tex", r"\title{A {nested} B}")]);
        assert_eq!(extract_title(&docs), "A nested B");
    }

    #[test]
    fn test_no_title_is_empty() {
        let docs = docs(&[("main.tex", r"\section{Intro}")]);
        assert_eq!(extract_title(&docs), "");
    }

    #[test]
    fn test_multiline_title_with_commands() {
        let docs = docs(&[(
            "main.tex",
            "\\title{Learning to \\revThree{Rediscover}\n   Papers\\\\ with \\emph{Guided} Dialogue\\thanks}",
        )]);
        assert_eq!(
            extract_title(&docs),
            "Learning to Rediscover Papers with Guided Dialogue"
        );
    }

    #[test]
    fn test_unterminated_title_moves_to_next_document() {
        let docs = docs(&[
            ("a.tex", r"\title{Broken {"),
            ("b.tex", r"\title{Second Title}"),
        ]);
        assert_eq!(extract_title(&docs), "Second Title");
    }

    #[test]
    fn test_title_search_spans_documents() {
        let docs = docs(&[
            ("main.tex", "\\documentclass{article}\n\\input{front}"),
            ("front.tex", r"\title{From the Front Matter}"),
        ]);
        assert_eq!(extract_title(&docs), "From the Front Matter");
    }

    #[test]
    fn test_command_substitution_is_not_recursive() {
        assert_eq!(normalize_title(r"\textbf{Big \emph{Data}}"), "Big Data");
    }
}
