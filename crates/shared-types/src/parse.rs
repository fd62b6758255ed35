//! Narrowing loose backend JSON into typed annotations
//!
//! The analysis backend is a language model behind a thin HTTP layer, so
//! annotation objects arrive with missing fields, string offsets, negative
//! numbers and the like. Everything passes through [`parse_annotation`]; the
//! list helpers keep what parses and drop the rest.

use serde_json::Value;
use thiserror::Error;

use crate::types::{Annotation, AnnotationKind, ErrorAnnotation, ErrorSeverity, Span};

/// Why a raw annotation was not accepted
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AnnotationRejection {
    #[error("annotation is not a JSON object")]
    NotAnObject,

    #[error("annotation has no span with start and end")]
    MissingSpan,

    #[error("span offset is not an integer: {0}")]
    NonIntegerOffset(String),

    #[error("span offset is negative: {0}")]
    NegativeOffset(i64),

    #[error("span offset is too large: {0}")]
    OffsetTooLarge(u64),

    #[error("span is empty or reversed: [{start}, {end})")]
    EmptySpan { start: usize, end: usize },

    #[error("unknown annotation kind: {0}")]
    UnknownKind(String),
}

/// Parse one raw annotation.
///
/// `default_kind` applies when the object has no `kind` field, which is the
/// normal case: the backend puts errors and uncertainty markers in separate
/// lists.
pub fn parse_annotation(
    value: &Value,
    default_kind: AnnotationKind,
) -> Result<Annotation, AnnotationRejection> {
    let obj = value.as_object().ok_or(AnnotationRejection::NotAnObject)?;

    let kind = match obj.get("kind").and_then(Value::as_str) {
        Some("error") => AnnotationKind::Error,
        Some("uncertainty") => AnnotationKind::Uncertainty,
        Some(other) => return Err(AnnotationRejection::UnknownKind(other.to_string())),
        None => default_kind,
    };

    let span = parse_span(obj.get("span"))?;

    match kind {
        AnnotationKind::Uncertainty => Ok(Annotation::Uncertainty { span }),
        AnnotationKind::Error => {
            let severity = match str_field(value, &["severity"]).as_deref() {
                Some("suspect") => ErrorSeverity::Suspect,
                _ => ErrorSeverity::Confirmed,
            };

            Ok(Annotation::Error(ErrorAnnotation {
                span,
                original: str_field(value, &["wrong", "original"]).unwrap_or_default(),
                suggested: str_field(value, &["correct", "suggested"])
                    .filter(|s| !s.is_empty()),
                severity,
                explanation: str_field(value, &["explanation"]).unwrap_or_default(),
                rule_id: str_field(value, &["rule_id"]).unwrap_or_default(),
                error_type: str_field(value, &["type", "error_type"]),
            }))
        }
    }
}

/// Parse a span object, requiring non-negative integer `start < end`.
pub fn parse_span(value: Option<&Value>) -> Result<Span, AnnotationRejection> {
    let obj = value
        .and_then(Value::as_object)
        .ok_or(AnnotationRejection::MissingSpan)?;

    let start = offset(obj.get("start").ok_or(AnnotationRejection::MissingSpan)?)?;
    let end = offset(obj.get("end").ok_or(AnnotationRejection::MissingSpan)?)?;

    if end <= start {
        return Err(AnnotationRejection::EmptySpan { start, end });
    }

    Ok(Span { start, end })
}

/// Largest offset accepted, whatever the pointer width of the target
pub const MAX_OFFSET: u64 = u32::MAX as u64;

fn offset(value: &Value) -> Result<usize, AnnotationRejection> {
    if let Some(n) = value.as_u64() {
        if n > MAX_OFFSET {
            return Err(AnnotationRejection::OffsetTooLarge(n));
        }
        return usize::try_from(n).map_err(|_| AnnotationRejection::OffsetTooLarge(n));
    }
    match value.as_i64() {
        Some(n) => Err(AnnotationRejection::NegativeOffset(n)),
        None => Err(AnnotationRejection::NonIntegerOffset(value.to_string())),
    }
}

fn str_field(value: &Value, keys: &[&str]) -> Option<String> {
    keys.iter()
        .find_map(|key| value.get(*key))
        .and_then(|v| match v {
            Value::String(s) => Some(s.clone()),
            Value::Null => None,
            other => Some(other.to_string()),
        })
}

/// Parse a JSON array of annotations, silently dropping rejects.
///
/// Anything other than an array yields an empty list.
pub fn parse_annotations(value: &Value, default_kind: AnnotationKind) -> Vec<Annotation> {
    match value.as_array() {
        Some(items) => parse_annotation_slice(items, default_kind),
        None => Vec::new(),
    }
}

/// Same as [`parse_annotations`] for an already-split list.
pub fn parse_annotation_slice(items: &[Value], default_kind: AnnotationKind) -> Vec<Annotation> {
    items
        .iter()
        .filter_map(|item| match parse_annotation(item, default_kind) {
            Ok(annotation) => Some(annotation),
            Err(rejection) => {
                tracing::debug!("dropping annotation: {}", rejection);
                None
            }
        })
        .collect()
}
