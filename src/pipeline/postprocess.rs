//! Post-processing: deterministic cleanup of text pulled out of a PDF.
//!
//! PDF text layers are messy. Producers emit `\r\n`, pad lines with spaces,
//! sprinkle zero-width characters through ligatures, and leave long runs of
//! empty lines where a table or image used to be. None of that helps the
//! model, and runs of blank lines waste prompt tokens.
//!
//! ## Rule Order
//!
//! Line endings are normalised first so the per-line rules see `\n` only.
//! Trailing whitespace is trimmed before blank lines are collapsed, so a
//! line holding only spaces counts as blank.

use once_cell::sync::Lazy;
use regex::Regex;

/// Join per-page text in document order and clean the result.
///
/// Pages that are blank after trimming are skipped; the rest are separated
/// by exactly one blank line.
pub fn assemble_pages<I, S>(pages: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let parts: Vec<String> = pages
        .into_iter()
        .map(|p| clean_text(p.as_ref()))
        .filter(|p| !p.is_empty())
        .collect();
    clean_text(&parts.join("\n\n"))
}

/// Apply all cleanup rules to one block of extracted text.
///
/// Rules (applied in order):
/// 1. Normalise line endings (CRLF/CR → LF)
/// 2. Trim trailing whitespace per line
/// 3. Strip invisible Unicode (zero-width spaces, BOM, soft hyphens, etc.)
/// 4. Collapse any run of blank lines down to a single blank line
/// 5. Trim the whole block
pub fn clean_text(input: &str) -> String {
    let s = normalise_line_endings(input);
    let s = trim_trailing_whitespace(&s);
    let s = remove_invisible_chars(&s);
    let s = collapse_blank_lines(&s);
    s.trim().to_string()
}

// ── Rule 1: Normalise line endings ───────────────────────────────────────────

fn normalise_line_endings(input: &str) -> String {
    input.replace("\r\n", "\n").replace('\r', "\n")
}

// ── Rule 2: Trim trailing whitespace per line ────────────────────────────────

fn trim_trailing_whitespace(input: &str) -> String {
    input
        .lines()
        .map(|line| line.trim_end())
        .collect::<Vec<_>>()
        .join("\n")
}

// ── Rule 3: Remove invisible Unicode characters ─────────────────────────────

fn remove_invisible_chars(input: &str) -> String {
    input.replace(
        [
            '\u{200B}', '\u{FEFF}', '\u{00AD}', '\u{200C}', '\u{200D}', '\u{2060}',
        ],
        "",
    )
}

// ── Rule 4: Collapse blank-line runs ─────────────────────────────────────────

static RE_BLANK_LINES: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n{3,}").unwrap());

fn collapse_blank_lines(input: &str) -> String {
    RE_BLANK_LINES.replace_all(input, "\n\n").to_string()
}

// ── Tests ────────────────────────────────────────────────────────────────────
