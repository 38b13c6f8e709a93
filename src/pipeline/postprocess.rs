//! Post-processing: deterministic cleanup of vision-model OCR output.
//!
//! Even a well-prompted model occasionally wraps its transcription in code
//! fences, emits CRLF line endings, or leaks zero-width characters copied
//! from its training data. These rules fix such quirks without touching the
//! recognised text itself.
//!
//! ## Rule Order
//!
//! Fences are stripped before line endings are normalised, and invisible
//! characters are removed before the blank-page check, so a page containing
//! only a BOM is correctly treated as empty.

use once_cell::sync::Lazy;
use regex::Regex;

/// Marker the OCR prompt asks the model to emit for a page with no text.
pub const NO_TEXT_MARKER: &str = "[NO TEXT]";

/// Apply all cleanup rules to the raw model output for one page.
///
/// Returns an empty string for blank pages; otherwise the text ends with
/// exactly one newline so pages concatenated without a separator never glue
/// the last word of one page to the first word of the next.
pub fn clean_ocr_text(input: &str) -> String {
    let s = strip_fences(input);
    let s = normalise_line_endings(&s);
    let s = remove_invisible_chars(&s);
    let s = trim_trailing_whitespace(&s);
    let s = collapse_blank_lines(&s);
    if is_blank_page(&s) {
        return String::new();
    }
    ensure_final_newline(&s)
}

// ── Rule 1: Strip outer code fences ─────────────────────────────────────────

static RE_OUTER_FENCES: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)^```[a-zA-Z]*\r?\n(.*?)\r?\n```\s*$").unwrap());

fn strip_fences(input: &str) -> String {
    match RE_OUTER_FENCES.captures(input.trim()) {
        Some(caps) => caps[1].to_string(),
        None => input.to_string(),
    }
}

// ── Rule 2: Normalise line endings ──────────────────────────────────────────

fn normalise_line_endings(input: &str) -> String {
    input.replace("\r\n", "\n").replace('\r', "\n")
}

// ── Rule 3: Remove invisible Unicode characters ─────────────────────────────

fn remove_invisible_chars(input: &str) -> String {
    input.replace(
        ['\u{200B}', '\u{FEFF}', '\u{00AD}', '\u{200C}', '\u{200D}', '\u{2060}'],
        "",
    )
}

// ── Rule 4: Trim trailing whitespace per line ───────────────────────────────

fn trim_trailing_whitespace(input: &str) -> String {
    input
        .lines()
        .map(str::trim_end)
        .collect::<Vec<_>>()
        .join("\n")
}

// ── Rule 5: Collapse runs of blank lines ────────────────────────────────────

static RE_BLANK_LINES: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n{3,}").unwrap());

fn collapse_blank_lines(input: &str) -> String {
    RE_BLANK_LINES.replace_all(input, "\n\n").to_string()
}

// ── Rule 6: Blank-page detection ────────────────────────────────────────────

fn is_blank_page(input: &str) -> bool {
    let t = input.trim();
    t.is_empty() || t == NO_TEXT_MARKER
}

// ── Rule 7: Single trailing newline ─────────────────────────────────────────

fn ensure_final_newline(input: &str) -> String {
    format!("{}\n", input.trim_end())
}
