//! Row view of analysis errors, shown under the highlighted text
//!
//! Rows follow the inline highlight order. Nothing is de-duplicated: when
//! the same error arrives in two source lists it is listed twice.

use serde::{Deserialize, Serialize};
use shared_types::{Annotation, Span};

use crate::highlight::span_order;
use crate::rules::rule_title;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorRow {
    pub span: Span,
    /// Rendered struck through
    pub original: String,
    /// `"-"` when the backend gave no suggestion
    pub suggested: String,
    pub rule_title: String,
    pub explanation: String,
}

/// Concatenate several annotation lists, in the given order, keeping duplicates.
pub fn combine_sources(sources: &[&[Annotation]]) -> Vec<Annotation> {
    sources.iter().flat_map(|s| s.iter().cloned()).collect()
}

/// One row per error annotation, sorted like inline highlighting.
///
/// Uncertainty markers are not errors and get no row. Rows are produced for
/// every error regardless of whether its span fits the text.
pub fn error_rows(annotations: &[Annotation]) -> Vec<ErrorRow> {
    let mut errors: Vec<&Annotation> = annotations
        .iter()
        .filter(|a| a.as_error().is_some())
        .collect();
    errors.sort_by_key(|a| span_order(a));

    errors
        .into_iter()
        .filter_map(Annotation::as_error)
        .map(|err| ErrorRow {
            span: err.span,
            original: if err.original.is_empty() {
                "-".to_string()
            } else {
                err.original.clone()
            },
            suggested: err.suggested.clone().unwrap_or_else(|| "-".to_string()),
            rule_title: rule_title(&err.rule_id, err.error_type.as_deref()),
            explanation: err.explanation.clone(),
        })
        .collect()
}
