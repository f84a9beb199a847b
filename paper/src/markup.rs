//! Small scanning helpers for markup text.

/// Content of a brace group whose opening `{` ends right before `start`.
///
/// Nested groups are tracked by depth; the group closes at the first `}`
/// seen at the entry depth. Returns `None` when the group never closes.
pub fn balanced_group(text: &str, start: usize) -> Option<&str> {
    let mut depth = 0usize;
    for (offset, ch) in text.get(start..)?.char_indices() {
        match ch {
            '{' => depth += 1,
            '}' if depth == 0 => return Some(&text[start..start + offset]),
            '}' => depth -= 1,
            _ => {}
        }
    }
    None
}

/// Collapse every whitespace run (newlines included) to a single space.
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Byte range covering `radius` characters on each side of `at`.
pub fn char_window(text: &str, at: usize, radius: usize) -> (usize, usize) {
    let start = if radius == 0 {
        at
    } else {
        text[..at]
            .char_indices()
            .rev()
            .nth(radius - 1)
            .map_or(0, |(i, _)| i)
    };
    let end = text[at..]
        .char_indices()
        .nth(radius)
        .map_or(text.len(), |(i, _)| at + i);
    (start, end)
}
