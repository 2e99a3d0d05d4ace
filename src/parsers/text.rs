//! Plain text normalization shared by extraction and reconciliation.

/// Trims and collapses every whitespace run (including newlines) into one space
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Normalizes text read from a page element
///
/// Element text can carry layout whitespace (indentation, line breaks from
/// the markup); this reduces it to single spaces.
pub fn clean_text(text: &str) -> String {
    if text.trim().is_empty() {
        return String::new();
    }
    collapse_whitespace(text)
}

/// Joins answer fragments with newlines, skipping blank ones
pub fn join_fragments<I, S>(fragments: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    fragments
        .into_iter()
        .map(|f| f.as_ref().trim().to_string())
        .filter(|f| !f.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

/// First `n` characters of `text`
pub fn prefix_chars(text: &str, n: usize) -> &str {
    match text.char_indices().nth(n) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// Length in characters, not bytes
pub fn char_len(text: &str) -> usize {
    text.chars().count()
}
