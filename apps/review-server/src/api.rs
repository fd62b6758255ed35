//! API handlers for the review server
//!
//! Provides REST endpoints for:
//! - Span highlighting
//! - Error list rows and rule labels
//! - Sanitizing model output
//! - Rubric scoring, submission review and class statistics
//! - Classroom codes

use std::collections::HashSet;

use axum::{extract::rejection::JsonRejection, extract::State, Json};
use highlight_engine::{
    classroom::{generate_class_code, normalize_class_code},
    combine_sources,
    display::{country_flag, country_name, report_file_name},
    error_annotations, error_rows, normalize,
    rubric::{rubric_from_value, RubricCategory, RubricExt},
    rules::{known_rule_ids, TDK_RULES},
    sanitize_analysis, sanitize_errors, ClassStats, ErrorRow, HighlightMode, SanitizeReport,
    SubmissionView,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use shared_types::{
    parse_annotation_slice, parse_annotations, AnalysisPayload, AnnotationKind, ErrorAnnotation,
    Rubric, Segment, Submission,
};
use tracing::{debug, info};

use crate::error::ServerError;
use crate::AppState;

/// Health check response
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
    pub version: &'static str,
}

/// Handler: GET /health
pub async fn handle_health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        service: "review-server",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Rule list response
#[derive(Serialize)]
pub struct RuleListResponse {
    pub success: bool,
    pub rules: Vec<RuleInfo>,
    pub count: usize,
}

#[derive(Serialize)]
pub struct RuleInfo {
    pub id: &'static str,
    pub title: &'static str,
}

/// Handler: GET /api/rules
pub async fn handle_list_rules() -> Json<RuleListResponse> {
    let rules: Vec<RuleInfo> = TDK_RULES
        .iter()
        .map(|&(id, title)| RuleInfo { id, title })
        .collect();
    let count = rules.len();

    Json(RuleListResponse {
        success: true,
        rules,
        count,
    })
}

/// Highlight request body
#[derive(Deserialize)]
pub struct HighlightRequest {
    pub text: String,

    /// Raw annotation array; malformed entries are dropped. In error mode,
    /// errors without spans are located by their `wrong` quote.
    #[serde(default)]
    pub annotations: Value,

    /// "error" (default) or "uncertainty"
    #[serde(default)]
    pub mode: Option<String>,

    /// NFC-normalize the text before slicing
    #[serde(default)]
    pub normalize: bool,
}

#[derive(Serialize)]
pub struct HighlightResponse {
    pub success: bool,
    pub segments: Vec<Segment>,
    pub count: usize,
}

/// Handler: POST /api/highlight
pub async fn handle_highlight(
    State(state): State<AppState>,
    payload: Result<Json<HighlightRequest>, JsonRejection>,
) -> Result<Json<HighlightResponse>, ServerError> {
    let Json(req) = payload?;

    let mode = match req.mode.as_deref() {
        None => HighlightMode::default(),
        Some(raw) => HighlightMode::parse(raw).ok_or_else(|| {
            ServerError::InvalidRequest(format!(
                "Unknown mode '{}'. Valid modes: error, uncertainty",
                raw
            ))
        })?,
    };
    let default_kind = match mode {
        HighlightMode::Error => AnnotationKind::Error,
        HighlightMode::Uncertainty => AnnotationKind::Uncertainty,
    };

    let text = if req.normalize {
        normalize::to_nfc(&req.text)
    } else {
        req.text
    };
    let annotations = match (default_kind, req.annotations.as_array()) {
        (AnnotationKind::Error, Some(raw)) => error_annotations(&text, raw),
        _ => parse_annotations(&req.annotations, default_kind),
    };
    debug!(
        "Highlight request: {} chars, {} annotations, mode={:?}",
        text.chars().count(),
        annotations.len(),
        mode
    );

    let segments = state.engine.highlight(&text, &annotations, mode);
    let count = segments.len();

    Ok(Json(HighlightResponse {
        success: true,
        segments,
        count,
    }))
}

/// Error list request: the three backend error sources
#[derive(Deserialize)]
pub struct ErrorRowsRequest {
    #[serde(default)]
    pub student_errors: Vec<Value>,
    #[serde(default)]
    pub ocr_errors: Vec<Value>,
    #[serde(default)]
    pub errors: Vec<Value>,
}

#[derive(Serialize)]
pub struct ErrorRowsResponse {
    pub success: bool,
    pub rows: Vec<ErrorRow>,
    pub count: usize,
}

/// Handler: POST /api/errors
pub async fn handle_error_rows(
    payload: Result<Json<ErrorRowsRequest>, JsonRejection>,
) -> Result<Json<ErrorRowsResponse>, ServerError> {
    let Json(req) = payload?;

    let student = parse_annotation_slice(&req.student_errors, AnnotationKind::Error);
    let ocr = parse_annotation_slice(&req.ocr_errors, AnnotationKind::Error);
    let generic = parse_annotation_slice(&req.errors, AnnotationKind::Error);
    let combined = combine_sources(&[student.as_slice(), ocr.as_slice(), generic.as_slice()]);

    let rows = error_rows(&combined);
    let count = rows.len();

    Ok(Json(ErrorRowsResponse {
        success: true,
        rows,
        count,
    }))
}

/// Sanitize request body
#[derive(Deserialize)]
pub struct SanitizeRequest {
    /// Full essay text the spans point into
    pub text: String,

    /// Raw model errors
    #[serde(default)]
    pub errors: Vec<Value>,

    /// Whole analysis object; when present its errors are sanitized and its
    /// total recomputed
    #[serde(default)]
    pub analysis: Option<Value>,

    /// Defaults to every known TDK rule id
    #[serde(default)]
    pub allowed_rule_ids: Option<Vec<String>>,
}

#[derive(Serialize)]
pub struct SanitizeResponse {
    pub success: bool,
    pub errors: Vec<ErrorAnnotation>,
    pub report: SanitizeReport,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub analysis: Option<AnalysisPayload>,
}

/// Handler: POST /api/sanitize
pub async fn handle_sanitize(
    payload: Result<Json<SanitizeRequest>, JsonRejection>,
) -> Result<Json<SanitizeResponse>, ServerError> {
    let Json(req) = payload?;

    let allowed: HashSet<String> = match req.allowed_rule_ids {
        Some(ids) => ids.into_iter().collect(),
        None => known_rule_ids(),
    };

    let sanitized = sanitize_errors(&req.errors, &req.text, &allowed);
    let mut report = sanitized.report;

    let analysis = match req.analysis {
        Some(raw) => {
            let (payload, analysis_report) = sanitize_analysis(&raw, &req.text, &allowed)?;
            report = merge_reports(report, analysis_report);
            Some(payload)
        }
        None => None,
    };

    info!(
        "Sanitized errors: kept={}, dropped={}",
        report.kept,
        report.dropped()
    );

    Ok(Json(SanitizeResponse {
        success: true,
        errors: sanitized.errors,
        report,
        analysis,
    }))
}

fn merge_reports(a: SanitizeReport, b: SanitizeReport) -> SanitizeReport {
    SanitizeReport {
        kept: a.kept + b.kept,
        not_an_object: a.not_an_object + b.not_an_object,
        unknown_rule: a.unknown_rule + b.unknown_rule,
        missing_span: a.missing_span + b.missing_span,
        malformed_span: a.malformed_span + b.malformed_span,
        out_of_range: a.out_of_range + b.out_of_range,
        evidence_mismatch: a.evidence_mismatch + b.evidence_mismatch,
        overlapping: a.overlapping + b.overlapping,
    }
}

/// One rubric row as the score form shows it
#[derive(Serialize)]
pub struct RubricRow {
    pub key: &'static str,
    pub label: &'static str,
    pub max: i64,
    pub score: i64,
}

#[derive(Serialize)]
pub struct RubricResponse {
    pub success: bool,
    pub rubric: Rubric,
    pub categories: Vec<RubricRow>,
    pub total: i64,
    pub passed: bool,
}

/// Handler: POST /api/rubric
///
/// Body is the rubric object itself; values may be numbers or the raw
/// strings typed into the score form.
pub async fn handle_rubric(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<RubricResponse>, ServerError> {
    let Json(raw) = payload?;
    if !raw.is_object() {
        return Err(ServerError::InvalidRequest(
            "rubric must be a JSON object".to_string(),
        ));
    }

    let rubric = rubric_from_value(&raw);
    let total = rubric.total();
    let categories = RubricCategory::ALL
        .iter()
        .map(|c| RubricRow {
            key: c.key(),
            label: c.label(),
            max: c.max(),
            score: rubric.get(*c),
        })
        .collect();

    Ok(Json(RubricResponse {
        success: true,
        rubric,
        categories,
        total,
        passed: total >= state.engine.pass_threshold(),
    }))
}

#[derive(Serialize)]
pub struct ReviewResponse {
    pub success: bool,
    #[serde(flatten)]
    pub view: SubmissionView,
    pub report_file_name: String,
    pub country_name: Option<String>,
    pub country_flag: String,
}

/// Handler: POST /api/review
pub async fn handle_review(
    State(state): State<AppState>,
    payload: Result<Json<Submission>, JsonRejection>,
) -> Result<Json<ReviewResponse>, ServerError> {
    let Json(submission) = payload?;

    let view = state.engine.review(&submission);
    let country = submission.country.as_deref().unwrap_or_default();

    Ok(Json(ReviewResponse {
        success: true,
        view,
        report_file_name: report_file_name(&submission.student_name, &submission.student_surname),
        country_name: if country.is_empty() {
            None
        } else {
            Some(country_name(country))
        },
        country_flag: country_flag(country),
    }))
}

#[derive(Deserialize)]
pub struct StatsRequest {
    #[serde(default)]
    pub submissions: Vec<Submission>,
}

#[derive(Serialize)]
pub struct StatsResponse {
    pub success: bool,
    #[serde(flatten)]
    pub stats: ClassStats,
}

/// Handler: POST /api/stats
pub async fn handle_stats(
    State(state): State<AppState>,
    payload: Result<Json<StatsRequest>, JsonRejection>,
) -> Result<Json<StatsResponse>, ServerError> {
    let Json(req) = payload?;
    info!("Stats request: {} submissions", req.submissions.len());

    Ok(Json(StatsResponse {
        success: true,
        stats: state.engine.class_stats(&req.submissions),
    }))
}

#[derive(Serialize)]
pub struct ClassCodeResponse {
    pub success: bool,
    pub code: String,
}

/// Handler: GET /api/class-code
pub async fn handle_class_code() -> Result<Json<ClassCodeResponse>, ServerError> {
    let code = generate_class_code()?;
    debug!("Generated class code {}", code);
    Ok(Json(ClassCodeResponse {
        success: true,
        code,
    }))
}

#[derive(Deserialize)]
pub struct NormalizeClassCodeRequest {
    pub code: String,
}

/// Handler: POST /api/class-code/normalize
pub async fn handle_normalize_class_code(
    payload: Result<Json<NormalizeClassCodeRequest>, JsonRejection>,
) -> Result<Json<ClassCodeResponse>, ServerError> {
    let Json(req) = payload?;
    Ok(Json(ClassCodeResponse {
        success: true,
        code: normalize_class_code(&req.code)?,
    }))
}
