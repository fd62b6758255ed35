//! Placing span-less errors by searching the text for their `wrong` quote
//!
//! Analyses stored before the backend emitted spans only carry the quoted
//! fragment. When no error in a list has a span, each quote of two or more
//! chars is searched case-insensitively (Turkish rules, so `I`/`ı` and
//! `İ`/`i` pair up), falling back to a whitespace-tolerant pattern when the
//! plain search misses. Matches are ordered by start and overlaps dropped.

use regex::Regex;
use serde_json::{json, Value};
use shared_types::{parse_annotation, parse_annotation_slice, Annotation, AnnotationKind};

/// Quotes shorter than this are too ambiguous to search for
const MIN_QUOTE_CHARS: usize = 2;

/// Lowercase one char with Turkish casing. Always one char out, so char
/// offsets in the folded text match the original.
fn fold_char(c: char) -> char {
    match c {
        'I' => 'ı',
        'İ' => 'i',
        _ => {
            let mut lower = c.to_lowercase();
            match (lower.next(), lower.next()) {
                (Some(single), None) => single,
                _ => c,
            }
        }
    }
}

pub fn turkish_lowercase(text: &str) -> String {
    text.chars().map(fold_char).collect()
}

/// Whether a raw error carries a span with both offsets, valid or not
pub fn has_span(raw: &Value) -> bool {
    raw.get("span")
        .map(|span| span.get("start").is_some() && span.get("end").is_some())
        .unwrap_or(false)
}

/// Error annotations for `text`: parsed spans when any error has one,
/// otherwise located by quote.
pub fn error_annotations(text: &str, raw_errors: &[Value]) -> Vec<Annotation> {
    if raw_errors.iter().any(has_span) {
        parse_annotation_slice(raw_errors, AnnotationKind::Error)
    } else {
        locate_by_wrong(text, raw_errors)
    }
}

/// Search `text` for each error's `wrong` quote and attach the found spans.
///
/// Every occurrence is a candidate; the result is sorted by start with
/// overlapping candidates dropped, earliest first.
pub fn locate_by_wrong(text: &str, raw_errors: &[Value]) -> Vec<Annotation> {
    let folded = turkish_lowercase(text);
    let index = FoldedIndex::new(&folded);
    let mut found: Vec<(usize, usize, &Value)> = Vec::new();

    for raw in raw_errors {
        let Some(quote) = raw.get("wrong").and_then(Value::as_str) else {
            continue;
        };
        let needle = turkish_lowercase(quote.trim());
        if needle.chars().count() < MIN_QUOTE_CHARS {
            continue;
        }

        let before = found.len();
        let mut from = 0;
        while let Some(pos) = folded[from..].find(&needle) {
            let start = from + pos;
            let end = start + needle.len();
            found.push((index.char_at(start), index.char_at(end), raw));
            from = start + folded[start..].chars().next().map_or(1, char::len_utf8);
        }

        if found.len() == before {
            if let Some(pattern) = whitespace_tolerant(&needle) {
                for m in pattern.find_iter(&folded) {
                    found.push((index.char_at(m.start()), index.char_at(m.end()), raw));
                }
            }
        }
    }

    found.sort_by_key(|(start, _, _)| *start);

    let mut located = Vec::new();
    let mut last_end = 0;
    for (start, end, raw) in found {
        if start < last_end {
            continue;
        }
        let mut with_span = raw.clone();
        with_span["span"] = json!({"start": start, "end": end});
        match parse_annotation(&with_span, AnnotationKind::Error) {
            Ok(annotation) => {
                last_end = end;
                located.push(annotation);
            }
            Err(rejection) => tracing::debug!("dropping located error: {}", rejection),
        }
    }
    located
}

/// Quote words joined by "any whitespace run"
fn whitespace_tolerant(needle: &str) -> Option<Regex> {
    let words: Vec<String> = needle.split_whitespace().map(regex::escape).collect();
    if words.len() < 2 {
        return None;
    }
    Regex::new(&words.join(r"\s+")).ok()
}

/// Byte offset → char offset for the folded text
struct FoldedIndex {
    /// byte offset of each char, plus the total length
    boundaries: Vec<usize>,
}

impl FoldedIndex {
    fn new(text: &str) -> Self {
        let mut boundaries: Vec<usize> = text.char_indices().map(|(i, _)| i).collect();
        boundaries.push(text.len());
        Self { boundaries }
    }

    /// Char offset of a byte offset that lies on a char boundary
    fn char_at(&self, byte: usize) -> usize {
        self.boundaries.partition_point(|&b| b < byte)
    }
}
