//! Classification of archive entries into documents.

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::tar::ArchiveEntry;

/// Extensions decoded as text.
pub const TEXT_EXTENSIONS: &[&str] = &["tex", "txt", "bib", "sty", "cls", "bst"];

/// Extensions retained as embeddable images.
pub const IMAGE_EXTENSIONS: &[&str] = &["pdf", "png", "jpg", "jpeg", "eps", "svg"];

/// Coarse content class of a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentClass {
    /// Markup or plain text sources.
    Text,

    /// Figures that can be embedded later.
    Image,

    /// Anything else; the payload is not kept.
    Binary,
}

impl ContentClass {
    /// Classify a lower-cased extension.
    pub fn from_extension(ext: &str) -> Self {
        if TEXT_EXTENSIONS.contains(&ext) {
            Self::Text
        } else if IMAGE_EXTENSIONS.contains(&ext) {
            Self::Image
        } else {
            Self::Binary
        }
    }
}

/// Payload retained for a document, by class.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentContent {
    /// Leniently decoded text.
    Text(String),

    /// Raw image bytes plus their base64 form.
    Image {
        /// Original bytes.
        bytes: Vec<u8>,
        /// Standard base64 of `bytes`.
        encoded: String,
    },

    /// Dropped payload.
    Binary,
}

/// A classified file from the paper source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedDocument {
    /// Path inside the archive.
    pub path: String,

    /// Lower-cased extension, empty when the name has none.
    pub extension: String,

    /// Retained payload.
    pub content: DocumentContent,
}

impl ParsedDocument {
    /// Class of this document.
    pub fn content_class(&self) -> ContentClass {
        match self.content {
            DocumentContent::Text(_) => ContentClass::Text,
            DocumentContent::Image { .. } => ContentClass::Image,
            DocumentContent::Binary => ContentClass::Binary,
        }
    }

    /// Text content, if this is a text document.
    pub fn text(&self) -> Option<&str> {
        match &self.content {
            DocumentContent::Text(text) => Some(text),
            _ => None,
        }
    }

    /// Base64 payload, if this is an image document.
    pub fn encoded_payload(&self) -> Option<&str> {
        match &self.content {
            DocumentContent::Image { encoded, .. } => Some(encoded),
            _ => None,
        }
    }

    /// Raw image bytes, if this is an image document.
    pub fn binary_payload(&self) -> Option<&[u8]> {
        match &self.content {
            DocumentContent::Image { bytes, .. } => Some(bytes),
            _ => None,
        }
    }

    /// Check if this is a text document with the given extension.
    pub fn is_text_with_extension(&self, ext: &str) -> bool {
        self.content_class() == ContentClass::Text && self.extension == ext
    }
}

/// Lower-cased suffix after the last `.` of the file name.
pub fn extension_of(path: &str) -> String {
    let file_name = path.rsplit('/').next().unwrap_or(path);
    match file_name.rsplit_once('.') {
        Some((_, ext)) => ext.to_lowercase(),
        None => String::new(),
    }
}

/// Classify a single entry; directories yield `None`.
pub fn classify(entry: &ArchiveEntry) -> Option<ParsedDocument> {
    if entry.is_directory() {
        return None;
    }

    let extension = extension_of(&entry.path);
    let content = match ContentClass::from_extension(&extension) {
        ContentClass::Text => {
            DocumentContent::Text(String::from_utf8_lossy(&entry.content).into_owned())
        }
        ContentClass::Image => DocumentContent::Image {
            encoded: BASE64_STANDARD.encode(&entry.content),
            bytes: entry.content.clone(),
        },
        ContentClass::Binary => DocumentContent::Binary,
    };

    Some(ParsedDocument {
        path: entry.path.clone(),
        extension,
        content,
    })
}

/// Classify every non-directory entry, preserving archive order.
pub fn classify_all(entries: &[ArchiveEntry]) -> Vec<ParsedDocument> {
    let documents: Vec<ParsedDocument> = entries.iter().filter_map(classify).collect();
    debug!(
        "Classified {} documents from {} archive entries",
        documents.len(),
        entries.len()
    );
    documents
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_extension_of() {
        assert_eq!(extension_of("main.TEX"), "tex");
        assert_eq!(extension_of("figs/plot.v2.PNG"), "png");
        assert_eq!(extension_of("README"), "");
        assert_eq!(extension_of("dir.d/Makefile"), "");
    }

    #[test]
    fn test_text_is_decoded_leniently() {
        let entry = ArchiveEntry::file("intro.tex", vec![b'a', 0xff, b'b']);
        let doc = classify(&entry).unwrap();

        assert_eq!(doc.content_class(), ContentClass::Text);
        assert_eq!(doc.text(), Some("a\u{fffd}b"));
    }

    #[test]
    fn test_image_keeps_bytes_and_base64() {
        let entry = ArchiveEntry::file("figs/a.png", b"abc".to_vec());
        let doc = classify(&entry).unwrap();

        assert_eq!(doc.content_class(), ContentClass::Image);
        assert_eq!(doc.binary_payload(), Some(&b"abc"[..]));
        assert_eq!(doc.encoded_payload(), Some("YWJj"));
    }

    #[test]
    fn test_binary_payload_is_dropped() {
        let entry = ArchiveEntry::file("data.zip", vec![1, 2, 3]);
        let doc = classify(&entry).unwrap();

        assert_eq!(doc.content_class(), ContentClass::Binary);
        assert_eq!(doc.content, DocumentContent::Binary);
    }

    #[test]
    fn test_directories_are_skipped() {
        let entries = vec![
            ArchiveEntry::directory("figs/"),
            ArchiveEntry::file("main.tex", b"\\documentclass{article}".to_vec()),
        ];

        let docs = classify_all(&entries);
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].path, "main.tex");
    }
}
