//! Guard between a language model's analysis and anything that renders it
//!
//! A model asked for span-annotated errors will sometimes invent rules,
//! omit spans, count offsets wrong or quote text that is not there. An error
//! survives only if its rule is known, its span fits the text and the text
//! under the span is what the model says it is. Survivors are then made
//! non-overlapping, keeping the earlier and wider error.

use std::cmp::Reverse;
use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use shared_types::{AnalysisPayload, ErrorAnnotation, ErrorSeverity, Span};

use crate::error::EngineError;
use crate::normalize::{normalize_evidence, CharIndex};
use crate::rubric::RubricExt;

/// Drop counts per reason
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SanitizeReport {
    pub kept: usize,
    pub not_an_object: usize,
    pub unknown_rule: usize,
    pub missing_span: usize,
    pub malformed_span: usize,
    pub out_of_range: usize,
    pub evidence_mismatch: usize,
    pub overlapping: usize,
}

impl SanitizeReport {
    pub fn dropped(&self) -> usize {
        self.not_an_object
            + self.unknown_rule
            + self.missing_span
            + self.malformed_span
            + self.out_of_range
            + self.evidence_mismatch
            + self.overlapping
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SanitizedErrors {
    pub errors: Vec<ErrorAnnotation>,
    pub report: SanitizeReport,
}

/// Filter raw model errors against `full_text` and the allowed rule ids.
pub fn sanitize_errors(
    raw_errors: &[Value],
    full_text: &str,
    allowed_rule_ids: &HashSet<String>,
) -> SanitizedErrors {
    let index = CharIndex::new(full_text);
    let mut report = SanitizeReport::default();
    let mut candidates = Vec::new();

    for raw in raw_errors {
        let Some(obj) = raw.as_object() else {
            report.not_an_object += 1;
            continue;
        };

        let rule_id = match obj.get("rule_id").and_then(Value::as_str) {
            Some(id) if allowed_rule_ids.contains(id) => id.to_string(),
            other => {
                tracing::debug!("dropping error with unknown rule {:?}", other);
                report.unknown_rule += 1;
                continue;
            }
        };

        let (start, end) = match span_offsets(obj.get("span")) {
            SpanOffsets::Missing => {
                tracing::debug!("dropping error without span: {:?}", obj.get("wrong"));
                report.missing_span += 1;
                continue;
            }
            SpanOffsets::Malformed => {
                tracing::debug!("dropping error with malformed span: {:?}", obj.get("span"));
                report.malformed_span += 1;
                continue;
            }
            SpanOffsets::Parsed(start, end) => (start, end),
        };

        let located = usize::try_from(start)
            .ok()
            .zip(usize::try_from(end).ok())
            .filter(|(s, e)| s < e)
            .and_then(|(s, e)| index.slice(s, e).map(|evidence| (Span::new(s, e), evidence)));
        let Some((span, evidence)) = located else {
            report.out_of_range += 1;
            continue;
        };

        let wrong = text_field(obj.get("wrong"));
        if normalize_evidence(evidence) != normalize_evidence(&wrong) {
            tracing::debug!("evidence mismatch: model={:?} text={:?}", wrong, evidence);
            report.evidence_mismatch += 1;
            continue;
        }

        let correct = text_field(obj.get("correct"));
        candidates.push(ErrorAnnotation {
            span,
            original: wrong,
            suggested: if correct.is_empty() { None } else { Some(correct) },
            severity: ErrorSeverity::Confirmed,
            explanation: text_field(obj.get("explanation")),
            rule_id,
            error_type: Some(
                obj.get("type")
                    .and_then(Value::as_str)
                    .unwrap_or("Yazım")
                    .to_string(),
            ),
        });
    }

    candidates.sort_by_key(|e| (e.span.start, Reverse(e.span.len())));

    let mut errors: Vec<ErrorAnnotation> = Vec::with_capacity(candidates.len());
    let mut last_end = 0;
    for candidate in candidates {
        if candidate.span.start < last_end {
            report.overlapping += 1;
            continue;
        }
        last_end = candidate.span.end;
        errors.push(candidate);
    }

    report.kept = errors.len();
    SanitizedErrors { errors, report }
}

/// Sanitize a whole analysis object and recompute its total from the rubric.
pub fn sanitize_analysis(
    raw: &Value,
    full_text: &str,
    allowed_rule_ids: &HashSet<String>,
) -> Result<(AnalysisPayload, SanitizeReport), EngineError> {
    if !raw.is_object() {
        return Err(EngineError::MalformedAnalysis(
            "analysis is not a JSON object".to_string(),
        ));
    }

    let mut payload: AnalysisPayload = serde_json::from_value(raw.clone())
        .map_err(|e| EngineError::MalformedAnalysis(e.to_string()))?;

    let sanitized = sanitize_errors(&payload.errors, full_text, allowed_rule_ids);
    payload.errors = sanitized
        .errors
        .iter()
        .map(serde_json::to_value)
        .collect::<Result<_, _>>()
        .map_err(|e| EngineError::Serialization(e.to_string()))?;
    payload.score_total = Some(payload.rubric.total());

    Ok((payload, sanitized.report))
}

enum SpanOffsets {
    Missing,
    Malformed,
    Parsed(i64, i64),
}

/// Span offsets read like an integer cast: integers, truncated floats and
/// integer strings (`"5"`, `" 5 "`) are accepted; range checks happen later.
fn span_offsets(span: Option<&Value>) -> SpanOffsets {
    let Some(obj) = span.and_then(Value::as_object) else {
        return SpanOffsets::Missing;
    };
    let (Some(start), Some(end)) = (obj.get("start"), obj.get("end")) else {
        return SpanOffsets::Missing;
    };
    match (int_offset(start), int_offset(end)) {
        (Some(start), Some(end)) => SpanOffsets::Parsed(start, end),
        _ => SpanOffsets::Malformed,
    }
}

fn int_offset(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| {
            n.as_f64()
                .filter(|f| f.is_finite())
                .map(|f| f.trunc() as i64)
        }),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    }
}

fn text_field(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Null) | None => String::new(),
        Some(other) => other.to_string(),
    }
}
