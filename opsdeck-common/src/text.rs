//! Plain-text reduction for rich-text fields
//!
//! Timesheet bodies arrive as whatever the portal's editor produced, usually
//! HTML fragments. Summarization corpora need them flattened to plain text.

use once_cell::sync::Lazy;
use regex::Regex;

static TAGS: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]+>").unwrap());
static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// Strip markup tags, drop non-breaking-space artifacts, and collapse
/// whitespace runs to single spaces.
///
/// This is pure text sanitization, not HTML parsing: entities other than
/// `&nbsp;` pass through untouched.
pub fn to_plain_text(input: &str) -> String {
    if input.is_empty() {
        return String::new();
    }

    let no_tags = TAGS.replace_all(input, " ");
    let no_nbsp = no_tags.replace('\u{a0}', " ").replace("&nbsp;", " ");

    WHITESPACE.replace_all(&no_nbsp, " ").trim().to_string()
}

/// Truncate to at most `max` characters, respecting char boundaries.
pub fn truncate_chars(input: &str, max: usize) -> &str {
    match input.char_indices().nth(max) {
        Some((idx, _)) => &input[..idx],
        None => input,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_tags_and_collapses_whitespace() {
        let html = "<p>Migrated the <b>billing</b> batch jobs.</p>\n<ul><li>Cut runtime</li></ul>";
        assert_eq!(
            to_plain_text(html),
            "Migrated the billing batch jobs. Cut runtime"
        );
    }

    #[test]
    fn removes_nbsp_artifacts() {
        assert_eq!(to_plain_text("one\u{a0}two&nbsp;three"), "one two three");
        assert_eq!(to_plain_text(""), "");
    }

    #[test]
    fn plain_text_passes_through() {
        assert_eq!(to_plain_text("already plain"), "already plain");
    }

    #[test]
    fn truncate_respects_char_boundaries() {
        assert_eq!(truncate_chars("hello", 10), "hello");
        assert_eq!(truncate_chars("hello", 3), "hel");
        // Multi-byte chars count as one
        assert_eq!(truncate_chars("héllo", 2), "hé");
    }
}
