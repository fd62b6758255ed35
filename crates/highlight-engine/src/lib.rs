pub mod classroom;
pub mod display;
pub mod error;
pub mod error_list;
pub mod highlight;
pub mod interaction;
pub mod locate;
pub mod normalize;
pub mod rubric;
pub mod rules;
pub mod sanitize;
pub mod stats;

pub use error::EngineError;
pub use error_list::{combine_sources, error_rows, ErrorRow};
pub use highlight::{highlight, MemoizedHighlighter};
pub use interaction::{activate, Activation, AnnotationDetail, HighlightMode};
pub use locate::{error_annotations, locate_by_wrong};
pub use rubric::{RubricCategory, RubricExt, PASS_THRESHOLD};
pub use rules::rule_title;
pub use sanitize::{sanitize_analysis, sanitize_errors, SanitizeReport, SanitizedErrors};
pub use stats::{class_stats, ClassStats, ErrorCategory};

use serde::{Deserialize, Serialize};
use shared_types::{Annotation, AnnotationKind, Segment, Submission};

/// Everything a client needs to show one reviewed essay
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmissionView {
    pub segments: Vec<Segment>,
    pub error_rows: Vec<ErrorRow>,
    pub total: i64,
    pub passed: bool,
}

/// HighlightEngine entry point
pub struct HighlightEngine {
    pass_threshold: i64,
}

impl HighlightEngine {
    pub fn new() -> Self {
        Self::with_pass_threshold(PASS_THRESHOLD)
    }

    pub fn with_pass_threshold(pass_threshold: i64) -> Self {
        Self { pass_threshold }
    }

    pub fn pass_threshold(&self) -> i64 {
        self.pass_threshold
    }

    /// Highlight only the annotations that belong to `mode`.
    pub fn highlight(&self, text: &str, annotations: &[Annotation], mode: HighlightMode) -> Vec<Segment> {
        let wanted = match mode {
            HighlightMode::Error => AnnotationKind::Error,
            HighlightMode::Uncertainty => AnnotationKind::Uncertainty,
        };
        let selected: Vec<Annotation> = annotations
            .iter()
            .filter(|a| a.kind() == wanted)
            .cloned()
            .collect();
        highlight(text, &selected)
    }

    /// Like [`Self::highlight`] but NFC-normalizes `text` first, for text
    /// that did not come straight from the backend.
    pub fn highlight_normalized(
        &self,
        text: &str,
        annotations: &[Annotation],
        mode: HighlightMode,
    ) -> Vec<Segment> {
        self.highlight(&normalize::to_nfc(text), annotations, mode)
    }

    /// Segments, error rows and the pass/fail verdict for a stored submission.
    ///
    /// The OCR text is NFC-normalized before any offset is used. Analyses
    /// whose errors carry no spans are placed by quote search.
    pub fn review(&self, submission: &Submission) -> SubmissionView {
        let text = normalize::to_nfc(&submission.ocr_text);
        let raw_errors = submission
            .analysis_json
            .as_ref()
            .map(|a| a.raw_errors())
            .unwrap_or_default();
        let errors = error_annotations(&text, &raw_errors);
        let rubric = submission
            .analysis_json
            .as_ref()
            .map(|a| a.rubric)
            .unwrap_or_default();
        let total = rubric::resolve_total(submission.score_total, &rubric);

        SubmissionView {
            segments: self.highlight(&text, &errors, HighlightMode::Error),
            error_rows: error_rows(&errors),
            total,
            passed: rubric::passed(total, self.pass_threshold),
        }
    }

    pub fn class_stats(&self, submissions: &[Submission]) -> ClassStats {
        class_stats(submissions, self.pass_threshold)
    }
}

impl Default for HighlightEngine {
    fn default() -> Self {
        Self::new()
    }
}
