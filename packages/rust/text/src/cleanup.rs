//! Normalization pipeline for EAD narrative markup.
//!
//! Each pass is a function `&str -> String` applied in sequence.
//! Line breaks go first; everything after works on paragraph separators.

use std::sync::LazyLock;

use regex::{Captures, Regex};

/// Paragraph separator emitted by every marker pass.
const PARAGRAPH_BREAK: &str = "\n\n";

/// Run the full normalization pipeline on raw markup, repeating it until
/// the text stops changing.
///
/// A late pass can leave work for an earlier one (the final trim uncovers a
/// trailing comma; removing a comma closes `<p,` up into a paragraph tag).
/// Every pass either shortens the text or returns it unchanged, so the loop
/// ends.
pub(crate) fn run_pipeline(raw: &str) -> String {
    let mut current = run_passes(raw);
    loop {
        let next = run_passes(&current);
        if next == current {
            return current;
        }
        current = next;
    }
}

/// One pass of every cleanup step, in order.
fn run_passes(raw: &str) -> String {
    let mut result = strip_line_breaks(raw);

    result = replace_paragraph_markers(&result);
    result = replace_line_break_markers(&result);
    result = strip_trailing_commas(&result);
    result = collapse_breaks(&result);

    result.trim().to_string()
}

// ---------------------------------------------------------------------------
// Pass 1: Strip literal line breaks
// ---------------------------------------------------------------------------

/// Delete literal line breaks; a blank line becomes one paragraph separator.
///
/// Source files wrap lines at arbitrary columns, so a lone break carries no
/// meaning. Blank lines are kept so normalized text survives another pass.
fn strip_line_breaks(text: &str) -> String {
    static BREAK_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"\r?\n(?:[^\S\n]*\n)*").expect("valid regex"));

    BREAK_RE
        .replace_all(text, |caps: &Captures| {
            if caps[0].matches('\n').count() > 1 {
                PARAGRAPH_BREAK
            } else {
                ""
            }
        })
        .to_string()
}

// ---------------------------------------------------------------------------
// Pass 2: Paragraph markers
// ---------------------------------------------------------------------------

/// `<p>`, `<p attr="…">`, `<p/>` and `</p>` become paragraph separators.
fn replace_paragraph_markers(text: &str) -> String {
    static P_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"<p(?:\s[^>]*)?/?>|</p>").expect("valid regex"));

    P_RE.replace_all(text, PARAGRAPH_BREAK).to_string()
}

// ---------------------------------------------------------------------------
// Pass 3: Line-break markers
// ---------------------------------------------------------------------------

/// `<lb/>` and `<lb>` become paragraph separators; `</lb>` is dropped.
fn replace_line_break_markers(text: &str) -> String {
    static LB_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"<lb(?:\s[^>]*)?/?>").expect("valid regex"));

    LB_RE
        .replace_all(text, PARAGRAPH_BREAK)
        .replace("</lb>", "")
}

// ---------------------------------------------------------------------------
// Pass 4: Trailing commas
// ---------------------------------------------------------------------------

/// Remove runs of commas (with surrounding blanks) that end a line.
///
/// Applies to every line of the text, not just the last paragraph. Any
/// whitespace but a newline counts as a blank, so `\r`, NBSP and U+3000 do
/// not shield a comma.
fn strip_trailing_commas(text: &str) -> String {
    static COMMA_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"(?m)[^\S\n]*,(?:,|[^\S\n])*$").expect("valid regex"));

    COMMA_RE.replace_all(text, "").to_string()
}

// ---------------------------------------------------------------------------
// Pass 5: Collapse paragraph separators
// ---------------------------------------------------------------------------

/// Drop blanks around breaks and collapse runs of 3+ breaks into one separator.
fn collapse_breaks(text: &str) -> String {
    static PADDED_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"[^\S\n]*\n[^\S\n]*").expect("valid regex"));
    static MULTI_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"\n{3,}").expect("valid regex"));

    let unpadded = PADDED_RE.replace_all(text, "\n");
    MULTI_RE.replace_all(&unpadded, PARAGRAPH_BREAK).to_string()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
