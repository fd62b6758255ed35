use serde::{Deserialize, Serialize};

/// Half-open character interval `[start, end)` into NFC-normalized text.
///
/// Offsets count Unicode scalar values (Rust `char`s), not bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.end <= self.start
    }

    /// True when the span is non-empty and lies inside a text of `text_len` chars
    pub fn fits(&self, text_len: usize) -> bool {
        !self.is_empty() && self.end <= text_len
    }
}

/// How sure the analysis backend is about a reported error
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorSeverity {
    #[default]
    Confirmed,
    Suspect,
}

/// A grammar or spelling correction reported by the analysis backend
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ErrorAnnotation {
    pub span: Span,
    /// Text as the student wrote it (backend field `wrong`)
    #[serde(alias = "wrong")]
    pub original: String,
    /// Replacement (backend field `correct`), absent when the model gave none
    #[serde(default, alias = "correct")]
    pub suggested: Option<String>,
    #[serde(default)]
    pub severity: ErrorSeverity,
    #[serde(default)]
    pub explanation: String,
    #[serde(default)]
    pub rule_id: String,
    /// Free-form error category such as "Yazım" (backend field `type`)
    #[serde(default, alias = "type", skip_serializing_if = "Option::is_none")]
    pub error_type: Option<String>,
}

/// Backend-supplied tag over a span of the essay text
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Annotation {
    Error(ErrorAnnotation),
    /// OCR low-confidence marker over a single unreadable character
    Uncertainty { span: Span },
}

impl Annotation {
    pub fn span(&self) -> Span {
        match self {
            Annotation::Error(err) => err.span,
            Annotation::Uncertainty { span } => *span,
        }
    }

    pub fn kind(&self) -> AnnotationKind {
        match self {
            Annotation::Error(_) => AnnotationKind::Error,
            Annotation::Uncertainty { .. } => AnnotationKind::Uncertainty,
        }
    }

    pub fn as_error(&self) -> Option<&ErrorAnnotation> {
        match self {
            Annotation::Error(err) => Some(err),
            Annotation::Uncertainty { .. } => None,
        }
    }

    pub fn uncertainty(start: usize) -> Self {
        Annotation::Uncertainty {
            span: Span::new(start, start + 1),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnnotationKind {
    Error,
    Uncertainty,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SegmentKind {
    Plain,
    Annotated,
}

/// Contiguous slice of rendered text, produced by the highlighter
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Segment {
    pub kind: SegmentKind,
    pub text: String,
    /// Char offset of the first character in the source text
    pub start: usize,
    /// Char offset one past the last character
    pub end: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub annotation: Option<Annotation>,
}

impl Segment {
    pub fn plain(text: impl Into<String>, start: usize, end: usize) -> Self {
        Self {
            kind: SegmentKind::Plain,
            text: text.into(),
            start,
            end,
            annotation: None,
        }
    }

    pub fn annotated(text: impl Into<String>, annotation: Annotation) -> Self {
        let span = annotation.span();
        Self {
            kind: SegmentKind::Annotated,
            text: text.into(),
            start: span.start,
            end: span.end,
            annotation: Some(annotation),
        }
    }

    pub fn is_annotated(&self) -> bool {
        self.kind == SegmentKind::Annotated
    }
}
