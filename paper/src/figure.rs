//! Figure inventory extraction.
//!
//! Graphics inclusions are found in the concatenated source text. Each one is
//! paired with the first caption and label found near it and resolved to an
//! image document from the archive.

use readiscover_archive::{ContentClass, ParsedDocument};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::markup::{balanced_group, char_window};

/// Characters inspected on each side of an inclusion for caption and label.
pub const CONTEXT_RADIUS: usize = 500;

/// Image format of a figure payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FigureFormat {
    Pdf,
    Png,
    Jpg,
    Jpeg,
    Gif,
    Svg,
    Eps,
    Unknown,
}

impl FigureFormat {
    /// Format for a lower-cased file extension.
    pub fn from_extension(ext: &str) -> Self {
        match ext {
            "pdf" => Self::Pdf,
            "png" => Self::Png,
            "jpg" => Self::Jpg,
            "jpeg" => Self::Jpeg,
            "gif" => Self::Gif,
            "svg" => Self::Svg,
            "eps" => Self::Eps,
            _ => Self::Unknown,
        }
    }

    /// Short name, matching the serialized form.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pdf => "pdf",
            Self::Png => "png",
            Self::Jpg => "jpg",
            Self::Jpeg => "jpeg",
            Self::Gif => "gif",
            Self::Svg => "svg",
            Self::Eps => "eps",
            Self::Unknown => "unknown",
        }
    }

    /// MIME type used when embedding the payload.
    pub fn mime_type(self) -> &'static str {
        match self {
            Self::Pdf => "application/pdf",
            Self::Png => "image/png",
            Self::Jpg | Self::Jpeg => "image/jpeg",
            Self::Gif => "image/gif",
            Self::Svg => "image/svg+xml",
            Self::Eps => "application/postscript",
            Self::Unknown => "application/octet-stream",
        }
    }
}

impl std::fmt::Display for FigureFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A figure resolved to an image document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Figure {
    /// Label from the source, or a synthetic `fig:<n>`.
    pub label: String,

    /// Caption found near the inclusion.
    pub caption: Option<String>,

    /// Path of the image document in the archive.
    pub source_path: String,

    /// Payload format.
    pub format: FigureFormat,

    /// Base64 payload.
    pub encoded_payload: String,
}

/// A graphics inclusion found in the text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GraphicsReference {
    /// Byte offset of the directive in the text.
    pub offset: usize,

    /// Referenced path, as written.
    pub path: String,
}

/// Every graphics inclusion in `text`, in order of appearance.
///
/// The optional bracketed argument is ignored.
pub fn find_graphics_references(text: &str) -> Vec<GraphicsReference> {
    let Ok(re) = regex_lite::Regex::new(r"\\includegraphics(?:\[[^\]]*\])?\{([^}]+)\}") else {
        return Vec::new();
    };

    re.captures_iter(text)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            let path = caps.get(1)?;
            Some(GraphicsReference {
                offset: whole.start(),
                path: path.as_str().trim().to_string(),
            })
        })
        .collect()
}

/// First caption in `window`, captured with nested braces intact.
fn first_caption(window: &str) -> Option<String> {
    let re = regex_lite::Regex::new(r"\\caption(?:\[[^\]]*\])?\{").ok()?;
    re.find_iter(window)
        .find_map(|m| balanced_group(window, m.end()))
        .map(|caption| caption.trim().to_string())
}

/// First label in `window`.
fn first_label(window: &str) -> Option<String> {
    let re = regex_lite::Regex::new(r"\\label\{([^}]+)\}").ok()?;
    re.captures(window)
        .and_then(|caps| caps.get(1))
        .map(|label| label.as_str().trim().to_string())
}

/// Find the image document a graphics reference points at.
///
/// An image document matches on exact path, path starting with the
/// reference (extension omitted in the source), path ending with
/// `/reference`, or path containing the reference. The first matching
/// document in archive order wins. An empty reference matches nothing.
pub fn resolve_image<'a>(
    reference: &str,
    documents: &'a [ParsedDocument],
) -> Option<&'a ParsedDocument> {
    let reference = reference.strip_prefix("./").unwrap_or(reference);
    if reference.trim().is_empty() {
        return None;
    }
    let suffix = format!("/{reference}");

    documents
        .iter()
        .filter(|d| d.content_class() == ContentClass::Image)
        .find(|d| {
            d.path == reference
                || d.path.starts_with(reference)
                || d.path.ends_with(&suffix)
                || d.path.contains(reference)
        })
}

/// Build the figure inventory from the concatenated text.
///
/// Unresolvable references are dropped. Labels are not deduplicated: two
/// inclusions sharing a nearby label both produce a figure.
pub fn extract_figures(full_text: &str, documents: &[ParsedDocument]) -> Vec<Figure> {
    let mut figures: Vec<Figure> = Vec::new();

    for reference in find_graphics_references(full_text) {
        let Some(image) = resolve_image(&reference.path, documents) else {
            debug!("Dropping unresolved graphics reference {}", reference.path);
            continue;
        };
        let Some(encoded) = image.encoded_payload() else {
            continue;
        };

        let (start, end) = char_window(full_text, reference.offset, CONTEXT_RADIUS);
        let window = &full_text[start..end];

        let label = first_label(window).unwrap_or_else(|| format!("fig:{}", figures.len()));
        let caption = first_caption(window);

        debug!("Figure {label} -> {}", image.path);

        figures.push(Figure {
            label,
            caption,
            source_path: image.path.clone(),
            format: FigureFormat::from_extension(&image.extension),
            encoded_payload: encoded.to_string(),
        });
    }

    figures
}
