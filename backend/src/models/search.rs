//! Catalog search semantics.
//!
//! A search term matches a lesson when it is a case-insensitive substring
//! of `subjectName` or `location`. Numeric terms additionally match
//! `price`, `availableSpaces` and `rating` by substring over the
//! stringified value, so `"1"` matches `1`, `10`, `21` and `1.5`. This is
//! observable behaviour of the catalog API and is kept as substring
//! matching rather than numeric comparison.

use serde_json::{Number, Value};

use super::document::Document;
use super::lesson::{NUMERIC_SEARCH_FIELDS, TEXT_SEARCH_FIELDS};

/// A normalized, non-empty search over lessons.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LessonSearch {
    term: String,
    needle: String,
    numeric: bool,
}

impl LessonSearch {
    /// Build a search from raw user input.
    ///
    /// Returns `None` when the trimmed term is empty, meaning "no filter".
    pub fn parse(raw: &str) -> Option<Self> {
        let term = raw.trim();
        if term.is_empty() {
            return None;
        }
        Some(Self {
            term: term.to_string(),
            needle: term.to_lowercase(),
            numeric: is_numeric_term(term),
        })
    }

    /// The trimmed term as entered.
    pub fn term(&self) -> &str {
        &self.term
    }

    /// Lowercased term used for matching.
    pub fn needle(&self) -> &str {
        &self.needle
    }

    /// Whether numeric fields take part in the match.
    pub fn is_numeric(&self) -> bool {
        self.numeric
    }

    pub fn matches(&self, lesson: &Document) -> bool {
        let text_hit = TEXT_SEARCH_FIELDS
            .iter()
            .filter_map(|field| lesson.get_str(field))
            .any(|value| self.contains(value));
        if text_hit || !self.numeric {
            return text_hit;
        }

        NUMERIC_SEARCH_FIELDS
            .iter()
            .filter_map(|field| lesson.get(field))
            .filter_map(searchable_text)
            .any(|value| self.contains(&value))
    }

    fn contains(&self, haystack: &str) -> bool {
        haystack.to_lowercase().contains(&self.needle)
    }
}

/// Text a numeric field contributes to matching: strings as-is, numbers
/// stringified, everything else nothing.
fn searchable_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(stringify_number(n)),
        _ => None,
    }
}

/// Render a JSON number the way it reads in a catalog: integral floats
/// lose their trailing `.0`.
pub fn stringify_number(number: &Number) -> String {
    if let Some(i) = number.as_i64() {
        return i.to_string();
    }
    if let Some(u) = number.as_u64() {
        return u.to_string();
    }
    match number.as_f64() {
        Some(f) if f.fract() == 0.0 && f.abs() < 1e15 => format!("{}", f as i64),
        Some(f) => f.to_string(),
        None => number.to_string(),
    }
}

/// Whether `term` reads as a number.
///
/// Accepts decimal/exponent notation (an exponent past the `f64` range still
/// counts), `0x`/`0o`/`0b` integer literals, and a signed or unsigned
/// `Infinity`.
pub fn is_numeric_term(term: &str) -> bool {
    let term = term.trim();
    if term.is_empty() {
        return false;
    }
    if matches!(term, "Infinity" | "+Infinity" | "-Infinity") {
        return true;
    }

    let lower = term.to_ascii_lowercase();
    for (prefix, radix) in [("0x", 16), ("0o", 8), ("0b", 2)] {
        if let Some(digits) = lower.strip_prefix(prefix) {
            return !digits.is_empty() && digits.chars().all(|c| c.is_digit(radix));
        }
    }

    // Rust's float grammar also takes "inf" and "nan"; those are words here.
    if lower.contains("inf") || lower.contains("nan") {
        return false;
    }
    term.parse::<f64>().is_ok()
}
