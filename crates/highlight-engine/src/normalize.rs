//! Text normalization and char-offset slicing
//!
//! Backend offsets count chars of NFC text. Anything that slices essay text
//! goes through [`CharIndex`] so multi-byte Turkish letters (ç, ğ, ı, İ, ö,
//! ş, ü) never split a UTF-8 sequence.

use lazy_static::lazy_static;
use regex::Regex;
use unicode_normalization::{is_nfc, UnicodeNormalization};

lazy_static! {
    /// Zero-width space, non-joiner, joiner and BOM
    static ref ZERO_WIDTH_PATTERN: Regex = Regex::new(r"[\x{200B}\x{200C}\x{200D}\x{FEFF}]").unwrap();

    static ref WHITESPACE_RUN_PATTERN: Regex = Regex::new(r"\s+").unwrap();
}

/// NFC-normalize `text`. Already-normalized input is copied without work.
pub fn to_nfc(text: &str) -> String {
    if is_nfc(text) {
        text.to_string()
    } else {
        text.nfc().collect()
    }
}

/// Length in chars (Unicode scalar values)
pub fn char_len(text: &str) -> usize {
    text.chars().count()
}

/// Normalize a piece of evidence before comparing it with what the model
/// claims it saw: typographic apostrophes fold to `'`, zero-width
/// characters go, whitespace runs collapse to one space, ends are trimmed.
pub fn normalize_evidence(text: &str) -> String {
    let folded = text.replace(['\u{2019}', '`'], "'");
    let stripped = ZERO_WIDTH_PATTERN.replace_all(&folded, "");
    WHITESPACE_RUN_PATTERN
        .replace_all(&stripped, " ")
        .trim()
        .to_string()
}

/// Char offset → byte offset table for one text.
pub struct CharIndex<'a> {
    text: &'a str,
    /// `boundaries[i]` is the byte offset of char `i`; the last entry is `text.len()`
    boundaries: Vec<usize>,
}

impl<'a> CharIndex<'a> {
    pub fn new(text: &'a str) -> Self {
        let mut boundaries: Vec<usize> = text.char_indices().map(|(i, _)| i).collect();
        boundaries.push(text.len());
        Self { text, boundaries }
    }

    /// Number of chars in the text
    pub fn len(&self) -> usize {
        self.boundaries.len() - 1
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Slice `[start, end)` in chars, `None` when out of range or reversed
    pub fn slice(&self, start: usize, end: usize) -> Option<&'a str> {
        if start > end || end > self.len() {
            return None;
        }
        Some(&self.text[self.boundaries[start]..self.boundaries[end]])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nfc_composes_combining_marks() {
        // "s" + combining cedilla → "ş"
        let decomposed = "s\u{0327}u";
        let composed = to_nfc(decomposed);
        assert_eq!(composed, "\u{015F}u");
        assert_eq!(char_len(decomposed), 3);
        assert_eq!(char_len(&composed), 2);
    }

    #[test]
    fn test_nfc_passthrough() {
        assert_eq!(to_nfc("Güzel bir gün"), "Güzel bir gün");
    }

    #[test]
    fn test_normalize_evidence() {
        assert_eq!(normalize_evidence("  Ankara’ya \n gittim "), "Ankara'ya gittim");
        assert_eq!(normalize_evidence("de\u{200B}ğil"), "değil");
        assert_eq!(normalize_evidence("`a`"), "'a'");
    }

    #[test]
    fn test_char_index_slices_multibyte() {
        let text = "çok güzel";
        let index = CharIndex::new(text);
        assert_eq!(index.len(), 9);
        assert_eq!(index.slice(0, 3), Some("çok"));
        assert_eq!(index.slice(4, 9), Some("güzel"));
        assert_eq!(index.slice(4, 10), None);
        assert_eq!(index.slice(5, 4), None);
        assert_eq!(index.slice(9, 9), Some(""));
    }

    #[test]
    fn test_char_index_empty() {
        let index = CharIndex::new("");
        assert!(index.is_empty());
        assert_eq!(index.slice(0, 0), Some(""));
    }
}
