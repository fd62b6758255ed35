//! Span highlighting: annotated text → ordered plain/annotated segments
//!
//! The output is a left-to-right partition of the text. Annotations whose
//! span does not fit the text are dropped, and so is any annotation that
//! starts inside one already emitted. Nothing here returns an error; bad
//! backend data just renders as plain text.

use std::cmp::Reverse;

use shared_types::{Annotation, Segment};

use crate::normalize::CharIndex;

/// Sort key shared by inline highlighting and the error list:
/// start ascending, then widest first.
pub fn span_order(annotation: &Annotation) -> (usize, Reverse<usize>) {
    let span = annotation.span();
    (span.start, Reverse(span.len()))
}

/// Keep the annotations that fit a text of `text_len` chars, in render order.
///
/// The sort is stable, so identical spans keep their input order.
pub fn valid_sorted<'a>(annotations: &'a [Annotation], text_len: usize) -> Vec<&'a Annotation> {
    let mut valid: Vec<&Annotation> = annotations
        .iter()
        .filter(|a| {
            let fits = a.span().fits(text_len);
            if !fits {
                tracing::debug!(
                    "dropping annotation [{}, {}) for text of {} chars",
                    a.span().start,
                    a.span().end,
                    text_len
                );
            }
            fits
        })
        .collect();
    valid.sort_by_key(|a| span_order(a));
    valid
}

/// Split `text` into segments around `annotations`.
///
/// `text` must already be NFC-normalized; offsets are in chars. With no
/// annotation that fits, the result is a single plain segment spanning the
/// whole text, except for empty text, which yields no segments at all.
pub fn highlight(text: &str, annotations: &[Annotation]) -> Vec<Segment> {
    let index = CharIndex::new(text);
    let text_len = index.len();
    let sorted = valid_sorted(annotations, text_len);

    if sorted.is_empty() {
        if text.is_empty() {
            return Vec::new();
        }
        return vec![Segment::plain(text, 0, text_len)];
    }

    let mut segments = Vec::with_capacity(sorted.len() * 2 + 1);
    let mut cursor = 0;

    for annotation in sorted {
        let span = annotation.span();
        if span.start < cursor {
            tracing::debug!(
                "skipping overlapping annotation [{}, {}), cursor at {}",
                span.start,
                span.end,
                cursor
            );
            continue;
        }

        if span.start > cursor {
            if let Some(gap) = index.slice(cursor, span.start) {
                segments.push(Segment::plain(gap, cursor, span.start));
            }
        }

        if let Some(marked) = index.slice(span.start, span.end) {
            segments.push(Segment::annotated(marked, annotation.clone()));
        }
        cursor = span.end;
    }

    if cursor < text_len {
        if let Some(rest) = index.slice(cursor, text_len) {
            segments.push(Segment::plain(rest, cursor, text_len));
        }
    }

    segments
}

/// Highlighter that remembers its last input and output.
///
/// UIs re-render far more often than the annotated text changes; presenting
/// the same `(text, annotations)` again returns the cached segments.
#[derive(Debug, Default)]
pub struct MemoizedHighlighter {
    last: Option<(String, Vec<Annotation>, Vec<Segment>)>,
}

impl MemoizedHighlighter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn highlight(&mut self, text: &str, annotations: &[Annotation]) -> &[Segment] {
        let hit = matches!(&self.last, Some((t, a, _)) if t == text && a == annotations);
        if !hit {
            let segments = highlight(text, annotations);
            self.last = Some((text.to_string(), annotations.to_vec(), segments));
        }
        match &self.last {
            Some((_, _, segments)) => segments.as_slice(),
            None => &[],
        }
    }

    /// Forget the cached result (new capture or navigation away)
    pub fn reset(&mut self) {
        self.last = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use shared_types::{ErrorAnnotation, ErrorSeverity, SegmentKind, Span};

    fn err(start: usize, end: usize) -> Annotation {
        Annotation::Error(ErrorAnnotation {
            span: Span::new(start, end),
            original: String::new(),
            suggested: None,
            severity: ErrorSeverity::Confirmed,
            explanation: String::new(),
            rule_id: String::new(),
            error_type: None,
        })
    }

    fn texts(segments: &[Segment]) -> Vec<(&str, SegmentKind)> {
        segments.iter().map(|s| (s.text.as_str(), s.kind)).collect()
    }

    #[test]
    fn test_no_annotations_is_one_plain_segment() {
        let segments = highlight("hello world", &[]);
        assert_eq!(segments, vec![Segment::plain("hello world", 0, 11)]);
    }

    #[test]
    fn test_single_annotation() {
        let segments = highlight("the dog runs", &[err(4, 7)]);
        assert_eq!(
            texts(&segments),
            vec![
                ("the ", SegmentKind::Plain),
                ("dog", SegmentKind::Annotated),
                (" runs", SegmentKind::Plain),
            ]
        );
        assert_eq!(segments[1].annotation, Some(err(4, 7)));
        assert_eq!((segments[1].start, segments[1].end), (4, 7));
    }

    #[test]
    fn test_out_of_range_dropped() {
        let segments = highlight("abc", &[err(2, 10)]);
        assert_eq!(segments, vec![Segment::plain("abc", 0, 3)]);
    }

    #[test]
    fn test_overlap_dropped() {
        let segments = highlight("abcdef", &[err(0, 3), err(2, 5)]);
        assert_eq!(
            texts(&segments),
            vec![("abc", SegmentKind::Annotated), ("def", SegmentKind::Plain)]
        );
        assert_eq!(segments[0].annotation, Some(err(0, 3)));
    }

    #[test]
    fn test_zero_width_and_reversed_dropped() {
        let segments = highlight("abcdef", &[err(2, 2), err(4, 1), err(1, 2)]);
        assert_eq!(
            texts(&segments),
            vec![
                ("a", SegmentKind::Plain),
                ("b", SegmentKind::Annotated),
                ("cdef", SegmentKind::Plain),
            ]
        );
    }

    #[test]
    fn test_unsorted_input_is_sorted() {
        let segments = highlight("abcdef", &[err(4, 6), err(0, 1)]);
        assert_eq!(
            texts(&segments),
            vec![
                ("a", SegmentKind::Annotated),
                ("bcd", SegmentKind::Plain),
                ("ef", SegmentKind::Annotated),
            ]
        );
    }

    #[test]
    fn test_equal_start_widest_wins() {
        let segments = highlight("abcdef", &[err(1, 2), err(1, 4)]);
        assert_eq!(segments[1].annotation, Some(err(1, 4)));
        assert_eq!(segments[1].text, "bcd");
        assert_eq!(segments.len(), 3);
    }

    #[test]
    fn test_adjacent_annotations_have_no_gap_segment() {
        let segments = highlight("abcd", &[err(0, 2), err(2, 4)]);
        assert_eq!(
            texts(&segments),
            vec![("ab", SegmentKind::Annotated), ("cd", SegmentKind::Annotated)]
        );
    }

    #[test]
    fn test_multibyte_offsets_are_chars() {
        let text = "Şehre gittiğimde çok üzüldüm";
        let segments = highlight(text, &[err(6, 16), Annotation::uncertainty(17)]);
        assert_eq!(segments[1].text, "gittiğimde");
        assert_eq!(segments[3].text, "ç");
        assert_eq!(segments[3].kind, SegmentKind::Annotated);
        let joined: String = segments.iter().map(|s| s.text.as_str()).collect();
        assert_eq!(joined, text);
    }

    #[test]
    fn test_empty_text() {
        assert!(highlight("", &[]).is_empty());
        assert!(highlight("", &[err(0, 1)]).is_empty());
    }

    #[test]
    fn test_memoized_matches_plain_and_resets() {
        let mut memo = MemoizedHighlighter::new();
        let annotations = vec![err(0, 2)];
        let first = memo.highlight("abcd", &annotations).to_vec();
        let second = memo.highlight("abcd", &annotations).to_vec();
        assert_eq!(first, second);
        assert_eq!(first, highlight("abcd", &annotations));

        let changed = memo.highlight("abcd", &[]).to_vec();
        assert_eq!(changed, vec![Segment::plain("abcd", 0, 4)]);

        memo.reset();
        assert_eq!(memo.highlight("xy", &[]).len(), 1);
    }
}
