//! Figure disclosure from `{{label}}` markers in generated text.

use readiscover_paper::{Figure, FigureFormat};
use serde::{Deserialize, Serialize};
use tracing::debug;

const FIGURE_MARKER: &str = r"\{\{([^{}]*)\}\}";

/// A figure returned to the caller alongside a dialogue turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisclosedFigure {
    pub label: String,

    /// Caption text, empty when the paper gave none.
    pub caption: String,

    pub format: FigureFormat,

    /// Base64-encoded image payload.
    pub data: String,
}

impl From<&Figure> for DisclosedFigure {
    fn from(figure: &Figure) -> Self {
        Self {
            label: figure.label.clone(),
            caption: figure.caption.clone().unwrap_or_default(),
            format: figure.format,
            data: figure.encoded_payload.clone(),
        }
    }
}

/// References named by `{{...}}` markers, trimmed, in order of appearance.
pub fn figure_references(text: &str) -> Vec<String> {
    let Ok(re) = regex_lite::Regex::new(FIGURE_MARKER) else {
        return Vec::new();
    };
    re.captures_iter(text)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_string())
        .filter(|reference| !reference.is_empty())
        .collect()
}

/// Find the figure a marker points at.
///
/// A figure matches on exact label, on `fig:` plus the reference, on its
/// label containing the reference, or on case-insensitive containment. The
/// first figure in inventory order matching any of these wins, so with
/// duplicate labels the earliest registered figure is the one disclosed.
pub fn resolve_reference<'a>(reference: &str, figures: &'a [Figure]) -> Option<&'a Figure> {
    let prefixed = format!("fig:{reference}");
    let lower = reference.to_lowercase();
    figures.iter().find(|figure| {
        figure.label == reference
            || figure.label == prefixed
            || figure.label.contains(reference)
            || figure.label.to_lowercase().contains(&lower)
    })
}

/// Resolve every marker against the inventory, each figure at most once.
pub fn disclose_figures(text: &str, figures: &[Figure]) -> Vec<DisclosedFigure> {
    let mut disclosed: Vec<DisclosedFigure> = Vec::new();

    for reference in figure_references(text) {
        let Some(figure) = resolve_reference(&reference, figures) else {
            debug!("No figure matches marker {reference:?}");
            continue;
        };
        if disclosed.iter().any(|d| d.label == figure.label) {
            continue;
        }
        disclosed.push(DisclosedFigure::from(figure));
    }

    disclosed
}

/// Remove every `{{...}}` marker, resolved or not.
pub fn strip_figure_markers(text: &str) -> String {
    match regex_lite::Regex::new(FIGURE_MARKER) {
        Ok(re) => re.replace_all(text, "").into_owned(),
        Err(_) => text.to_string(),
    }
}
