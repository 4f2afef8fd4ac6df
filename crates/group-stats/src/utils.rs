//! Shared utilities for value inspection and header formatting.
//!
//! This module contains the string predicates and numeric token patterns used
//! by coercion, inference and aggregation so that every stage agrees on what
//! "numeric" and "missing" mean.

use once_cell::sync::Lazy;
use regex::Regex;

// =============================================================================
// Numeric Token Patterns
// =============================================================================

/// Characters accepted as thousands separators inside a numeric token.
pub const GROUP_SEPARATORS: [char; 3] = [',', '\u{202F}', '\u{00A0}'];

/// Grouped-thousands form first so `1,200` is taken whole rather than as `1`
/// followed by `200`.
static NUMERIC_TOKEN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"-?\d{1,3}(?:[,\x{202F}\x{00A0}]\d{3})+(?:\.\d+)?|-?\d+(?:\.\d+)?")
        .expect("Invalid regex: numeric token")
});

static NUMERIC_LITERAL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^-?\d+(?:\.\d+)?$").expect("Invalid regex: numeric literal"));

/// Remove thousands separators from a token.
pub fn strip_group_separators(s: &str) -> String {
    s.chars().filter(|c| !GROUP_SEPARATORS.contains(c)).collect()
}

/// Parse the longest numeric token found in `s`.
///
/// Tokens are compared by their length once separators are stripped; the first
/// of equally long tokens wins.
///
/// # Example
///
/// ```rust,ignore
/// assert_eq!(longest_numeric_token("12,345.67 units"), Some(12345.67));
/// assert_eq!(longest_numeric_token("3 of 250"), Some(250.0));
/// ```
pub fn longest_numeric_token(s: &str) -> Option<f64> {
    let mut best: Option<String> = None;
    for m in NUMERIC_TOKEN.find_iter(s) {
        let norm = strip_group_separators(m.as_str());
        if best.as_ref().is_none_or(|b| norm.len() > b.len()) {
            best = Some(norm);
        }
    }
    best.and_then(|tok| tok.parse::<f64>().ok())
        .filter(|n| n.is_finite())
}

/// Whether `s` contains any numeric token at all.
pub fn contains_numeric_token(s: &str) -> bool {
    NUMERIC_TOKEN.is_match(s)
}

/// Whether `s` is a plain decimal once commas are removed (`1,200`, `-3.5`).
pub fn is_numeric_like(s: &str) -> bool {
    let cleaned = s.replace(',', "");
    NUMERIC_LITERAL.is_match(cleaned.trim())
}

// =============================================================================
// Missing Value Markers
// =============================================================================

/// Markers treated as "no value" when sampling and counting.
pub const BLANK_MARKERS: [&str; 2] = ["null", "nan"];

/// Markers treated as missing labels during column planning.
pub const MISSING_LABEL_MARKERS: [&str; 4] = ["null", "nan", "undefined", "(empty)"];

/// Markers that coerce to "unusable" rather than zero.
pub const UNUSABLE_NUMERIC_MARKERS: [&str; 3] = ["null", "nan", "undefined"];

fn matches_marker(s: &str, markers: &[&str]) -> bool {
    let trimmed = s.trim();
    trimmed.is_empty() || markers.iter().any(|m| trimmed.eq_ignore_ascii_case(m))
}

/// Empty after trimming, or `null` / `nan` in any casing.
pub fn is_blank_marker(s: &str) -> bool {
    matches_marker(s, &BLANK_MARKERS)
}

/// Empty after trimming, or `null` / `nan` / `undefined` / `(empty)` in any casing.
pub fn is_missing_like(s: &str) -> bool {
    matches_marker(s, &MISSING_LABEL_MARKERS)
}

/// Empty after trimming, or `null` / `nan` / `undefined` in any casing.
pub fn is_unusable_numeric_text(s: &str) -> bool {
    matches_marker(s, &UNUSABLE_NUMERIC_MARKERS)
}

// =============================================================================
// Header Formatting
// =============================================================================

/// Replace `_` and `.` with spaces and upper-case the first letter of each word.
pub fn to_title(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut at_word_start = true;
    for c in s.chars() {
        let c = if c == '_' || c == '.' { ' ' } else { c };
        let is_word = c.is_alphanumeric() || c == '_';
        if is_word && at_word_start {
            out.extend(c.to_uppercase());
        } else {
            out.push(c);
        }
        at_word_start = !is_word;
    }
    out
}

/// Human-readable property name: known prefix stripped, then title-cased.
pub fn pretty_prop(property_id: &str) -> String {
    to_title(crate::resolver::base_pid(property_id))
}

/// Round a ratio to a percentage with one decimal place.
pub fn percent_one_decimal(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        return 0.0;
    }
    (part as f64 / whole as f64 * 1000.0).round() / 10.0
}

// =============================================================================
// Tests
// =============================================================================
