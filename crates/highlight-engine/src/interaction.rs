//! What happens when a highlighted segment is clicked or tapped
//!
//! The UI owns the popover; this module only answers "segment N was
//! activated at (x, y), here is what to show".

use serde::{Deserialize, Serialize};
use shared_types::{Annotation, Segment};

use crate::rules::rule_title;

/// Hint shown for an OCR uncertainty marker
pub const UNCERTAINTY_HINT: &str =
    "Bu harf tam okunamadı. Fotoğraftaki el yazısıyla karşılaştırıp gerekirse metni düzeltin.";

/// Which annotation vocabulary a highlighted view renders
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HighlightMode {
    /// OCR review step: single-char uncertainty markers
    Uncertainty,
    /// Analysis result: grammar and spelling errors
    #[default]
    Error,
}

impl HighlightMode {
    /// Parse an API value, `None` for anything unknown
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "error" | "errors" => Some(Self::Error),
            "uncertainty" | "ocr" => Some(Self::Uncertainty),
            _ => None,
        }
    }
}

/// Popover content for an activated annotation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AnnotationDetail {
    Error {
        original: String,
        /// `"-"` when the backend gave no suggestion
        suggested: String,
        rule_title: String,
        explanation: String,
    },
    Uncertainty {
        message: String,
    },
}

impl AnnotationDetail {
    pub fn for_annotation(annotation: &Annotation) -> Self {
        match annotation {
            Annotation::Error(err) => AnnotationDetail::Error {
                original: err.original.clone(),
                suggested: err.suggested.clone().unwrap_or_else(|| "-".to_string()),
                rule_title: rule_title(&err.rule_id, err.error_type.as_deref()),
                explanation: err.explanation.clone(),
            },
            Annotation::Uncertainty { .. } => AnnotationDetail::Uncertainty {
                message: UNCERTAINTY_HINT.to_string(),
            },
        }
    }
}

/// An annotated segment was activated at screen position `(x, y)`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Activation {
    pub segment_index: usize,
    pub annotation: Annotation,
    pub detail: AnnotationDetail,
    pub x: f64,
    pub y: f64,
}

/// Resolve an activation; plain segments and bad indices yield `None`.
pub fn activate(segments: &[Segment], index: usize, x: f64, y: f64) -> Option<Activation> {
    let annotation = segments.get(index)?.annotation.as_ref()?;
    Some(Activation {
        segment_index: index,
        detail: AnnotationDetail::for_annotation(annotation),
        annotation: annotation.clone(),
        x,
        y,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::highlight::highlight;
    use shared_types::{ErrorAnnotation, ErrorSeverity, Span};

    fn herkes_error() -> Annotation {
        Annotation::Error(ErrorAnnotation {
            span: Span::new(0, 6),
            original: "Herkez".to_string(),
            suggested: Some("Herkes".to_string()),
            severity: ErrorSeverity::Confirmed,
            explanation: "'Herkes' kelimesi s ile yazılır.".to_string(),
            rule_id: "TDK_24_HERKES".to_string(),
            error_type: Some("Yazım".to_string()),
        })
    }

    #[test]
    fn test_activate_error_segment() {
        let segments = highlight("Herkez geldi.", &[herkes_error()]);
        let activation = activate(&segments, 0, 120.5, 48.0).unwrap();

        assert_eq!(activation.segment_index, 0);
        assert_eq!(activation.x, 120.5);
        assert_eq!(activation.y, 48.0);
        assert_eq!(
            activation.detail,
            AnnotationDetail::Error {
                original: "Herkez".to_string(),
                suggested: "Herkes".to_string(),
                rule_title: "Herkes (s/z)".to_string(),
                explanation: "'Herkes' kelimesi s ile yazılır.".to_string(),
            }
        );
    }

    #[test]
    fn test_activate_plain_or_missing_segment() {
        let segments = highlight("Herkez geldi.", &[herkes_error()]);
        assert!(activate(&segments, 1, 0.0, 0.0).is_none());
        assert!(activate(&segments, 7, 0.0, 0.0).is_none());
    }

    #[test]
    fn test_uncertainty_detail_is_static_hint() {
        let segments = highlight("k?tap", &[Annotation::uncertainty(1)]);
        let activation = activate(&segments, 1, 1.0, 2.0).unwrap();
        assert_eq!(
            activation.detail,
            AnnotationDetail::Uncertainty {
                message: UNCERTAINTY_HINT.to_string()
            }
        );
    }

    #[test]
    fn test_missing_suggestion_shows_dash() {
        let mut ann = herkes_error();
        if let Annotation::Error(err) = &mut ann {
            err.suggested = None;
        }
        match AnnotationDetail::for_annotation(&ann) {
            AnnotationDetail::Error { suggested, .. } => assert_eq!(suggested, "-"),
            other => panic!("unexpected detail: {:?}", other),
        }
    }

    #[test]
    fn test_mode_parse() {
        assert_eq!(HighlightMode::parse("Errors"), Some(HighlightMode::Error));
        assert_eq!(HighlightMode::parse("ocr"), Some(HighlightMode::Uncertainty));
        assert_eq!(HighlightMode::parse("other"), None);
    }
}
