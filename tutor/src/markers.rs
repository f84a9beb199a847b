//! Protocol markers embedded in generated dialogue text.
//!
//! Generated turns may begin with a `PROGRESS: <n>%` line and may reference
//! figures as `{{label}}`. Concept advancement and completion are signalled by
//! plain phrases; both checks live here so a structured protocol can replace
//! them without touching the state machine.

use crate::disclosure::strip_figure_markers;

/// Phrases that ask to move on to the next concept.
pub const ADVANCE_PHRASES: [&str; 3] = [
    "let's move to the next concept",
    "move to the next concept",
    "ready for the next concept",
];

/// Substring that marks the whole session as finished.
pub const COMPLETION_PHRASE: &str = "complete";

/// Locate a leading progress line; returns the value and the byte offset
/// just past the line.
fn progress_marker(text: &str) -> Option<(u8, usize)> {
    let re = regex_lite::Regex::new(r"(?i)^\s*progress:\s*(\d+(?:\.\d+)?)\s*%[^\n]*").ok()?;
    let caps = re.captures(text)?;
    let end = caps.get(0)?.end();
    let value = caps
        .get(1)?
        .as_str()
        .parse::<f64>()
        .map_or(100.0, |n| n.round().min(100.0));
    // Bounded to 0..=100 above, so the cast cannot truncate.
    Some((value as u8, end))
}

/// Progress estimate from a leading `PROGRESS: <n>%` line, rounded and
/// clamped to 100.
pub fn parse_progress(text: &str) -> Option<u8> {
    progress_marker(text).map(|(value, _)| value)
}

/// Check if the text asks to advance to the next concept.
pub fn signals_concept_advance(text: &str) -> bool {
    let lower = text.to_lowercase();
    ADVANCE_PHRASES.iter().any(|phrase| lower.contains(phrase))
}

/// Check if the text declares the session complete.
pub fn signals_completion(text: &str) -> bool {
    text.to_lowercase().contains(COMPLETION_PHRASE)
}

/// Remove the progress line and every figure marker, then trim.
pub fn strip_markers(text: &str) -> String {
    let body = match progress_marker(text) {
        Some((_, end)) => &text[end..],
        None => text,
    };
    strip_figure_markers(body).trim().to_string()
}
