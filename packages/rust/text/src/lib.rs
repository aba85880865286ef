//! Plain-text normalization of EAD narrative markup.
//!
//! Note content arrives as raw inner markup of an element (`<p>`, `<lb/>`,
//! stray line wrapping). [`normalize`] turns it into narrative text with
//! paragraphs separated by a blank line. The result is stable under a second
//! pass: `normalize(normalize(x)) == normalize(x)`.

mod cleanup;

use std::sync::LazyLock;

use regex::Regex;

/// Normalize optional markup. `None` stays `None`; empty stays empty.
pub fn normalize(raw: Option<&str>) -> Option<String> {
    raw.map(normalize_str)
}

/// Normalize markup into plain narrative text.
pub fn normalize_str(raw: &str) -> String {
    if raw.is_empty() {
        return String::new();
    }
    cleanup::run_pipeline(raw)
}

/// Remove the first `<head>…</head>` element, which carries a note's label
/// rather than its content.
pub fn strip_head(markup: &str) -> String {
    static HEAD_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"(?s)<head(?:\s[^>]*)?>.*?</head>").expect("valid regex"));

    HEAD_RE.replacen(markup, 1, "").to_string()
}
