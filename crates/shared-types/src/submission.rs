//! Records shared with the hosted database and the analysis backend

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::loose::{deserialize_list, deserialize_loose_int, deserialize_score};
use crate::parse::parse_annotation_slice;
use crate::types::{Annotation, AnnotationKind};

/// Six-part scoring rubric as produced by the backend and edited by teachers.
///
/// Field names match the stored JSON. Scores read leniently: floats
/// truncate, numeric strings count, garbage is 0.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rubric {
    #[serde(default, deserialize_with = "deserialize_score")]
    pub uzunluk: i64,
    #[serde(default, deserialize_with = "deserialize_score")]
    pub noktalama: i64,
    #[serde(default, deserialize_with = "deserialize_score")]
    pub dil_bilgisi: i64,
    #[serde(default, deserialize_with = "deserialize_score")]
    pub soz_dizimi: i64,
    #[serde(default, deserialize_with = "deserialize_score")]
    pub kelime: i64,
    #[serde(default, deserialize_with = "deserialize_score")]
    pub icerik: i64,
}

/// The `analysis_json` column of a submission.
///
/// Annotation lists stay as raw JSON here and are narrowed on use, so a
/// single malformed entry never makes the whole record unreadable.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnalysisPayload {
    #[serde(default, deserialize_with = "deserialize_rubric")]
    pub rubric: Rubric,
    #[serde(default, deserialize_with = "deserialize_list")]
    pub errors: Vec<Value>,
    #[serde(
        default,
        deserialize_with = "deserialize_list",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub student_errors: Vec<Value>,
    #[serde(
        default,
        deserialize_with = "deserialize_list",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub ocr_errors: Vec<Value>,
    /// OCR low-confidence markers
    #[serde(
        default,
        deserialize_with = "deserialize_list",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub uncertain: Vec<Value>,
    #[serde(default)]
    pub teacher_note: Option<String>,
    #[serde(default, deserialize_with = "deserialize_loose_int")]
    pub score_total: Option<i64>,
}

/// A rubric that is not an object reads as all zeros.
fn deserialize_rubric<'de, D>(deserializer: D) -> Result<Rubric, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    if !value.is_object() {
        return Ok(Rubric::default());
    }
    Ok(serde_json::from_value(value).unwrap_or_default())
}

impl AnalysisPayload {
    /// Raw error objects of all three sources, in the order student, OCR,
    /// generic
    pub fn raw_errors(&self) -> Vec<Value> {
        self.student_errors
            .iter()
            .chain(&self.ocr_errors)
            .chain(&self.errors)
            .cloned()
            .collect()
    }

    /// All error annotations, source lists concatenated in the order
    /// student, OCR, generic. Duplicates across lists are kept.
    pub fn combined_errors(&self) -> Vec<Annotation> {
        parse_annotation_slice(&self.raw_errors(), AnnotationKind::Error)
    }

    pub fn uncertainty_markers(&self) -> Vec<Annotation> {
        parse_annotation_slice(&self.uncertain, AnnotationKind::Uncertainty)
    }
}

/// A student essay as stored in the `submissions` table
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Submission {
    #[serde(default)]
    pub id: Option<Value>,
    #[serde(default)]
    pub student_name: String,
    #[serde(default)]
    pub student_surname: String,
    #[serde(default)]
    pub classroom_code: String,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub ocr_text: String,
    #[serde(default)]
    pub level: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub native_language: Option<String>,
    #[serde(default)]
    pub analysis_json: Option<AnalysisPayload>,
    #[serde(default, deserialize_with = "deserialize_loose_int")]
    pub score_total: Option<i64>,
    #[serde(default)]
    pub human_note: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl Submission {
    pub fn errors(&self) -> Vec<Annotation> {
        self.analysis_json
            .as_ref()
            .map(AnalysisPayload::combined_errors)
            .unwrap_or_default()
    }
}

/// CEFR proficiency level of the writer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CefrLevel {
    A1,
    A2,
    B1,
    B2,
    C1,
    C2,
}

impl CefrLevel {
    pub fn parse_code(code: &str) -> Option<Self> {
        match code.trim().to_uppercase().as_str() {
            "A1" => Some(Self::A1),
            "A2" => Some(Self::A2),
            "B1" => Some(Self::B1),
            "B2" => Some(Self::B2),
            "C1" => Some(Self::C1),
            "C2" => Some(Self::C2),
            _ => None,
        }
    }

    /// Target essay length in words for this level
    pub fn expected_word_count(&self) -> u32 {
        match self {
            Self::A1 => 75,
            Self::A2 => 100,
            Self::B1 => 125,
            Self::B2 => 150,
            Self::C1 => 175,
            Self::C2 => 200,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_combined_errors_keeps_duplicates_in_source_order() {
        let payload: AnalysisPayload = serde_json::from_value(json!({
            "errors": [{"wrong": "c", "span": {"start": 4, "end": 5}}],
            "student_errors": [{"wrong": "a", "span": {"start": 0, "end": 1}}],
            "ocr_errors": [
                {"wrong": "a", "span": {"start": 0, "end": 1}},
                {"wrong": "bad", "span": {"start": 9, "end": 3}}
            ]
        }))
        .unwrap();

        let errors = payload.combined_errors();
        let originals: Vec<_> = errors
            .iter()
            .map(|a| a.as_error().unwrap().original.as_str())
            .collect();
        assert_eq!(originals, vec!["a", "a", "c"]);
    }

    #[test]
    fn test_submission_from_database_row() {
        let row = json!({
            "id": 17,
            "student_name": "Ayşe",
            "student_surname": "Yılmaz",
            "classroom_code": "K7P2Q",
            "ocr_text": "Ben de geldim.",
            "level": "A2",
            "country": "SY",
            "analysis_json": {
                "rubric": {"uzunluk": 10, "noktalama": 12},
                "errors": [],
                "teacher_note": "İyi"
            },
            "score_total": 22,
            "created_at": "2024-11-02T09:15:00+00:00"
        });

        let sub: Submission = serde_json::from_value(row).unwrap();
        assert_eq!(sub.student_name, "Ayşe");
        assert_eq!(sub.analysis_json.as_ref().unwrap().rubric.noktalama, 12);
        assert_eq!(sub.analysis_json.as_ref().unwrap().rubric.kelime, 0);
        assert!(sub.created_at.is_some());
        assert!(sub.errors().is_empty());
    }

    #[test]
    fn test_float_scores_do_not_spoil_the_row() {
        let rows: Vec<Submission> = serde_json::from_value(json!([
            {
                "score_total": 75.5,
                "analysis_json": {
                    "rubric": {"uzunluk": 12.5, "noktalama": "9", "kelime": "yok"},
                    "score_total": "61"
                }
            },
            {"score_total": 80},
            {"score_total": "n/a", "analysis_json": {"rubric": null, "errors": null}}
        ]))
        .unwrap();

        assert_eq!(rows[0].score_total, Some(75));
        let analysis = rows[0].analysis_json.as_ref().unwrap();
        assert_eq!(analysis.rubric.uzunluk, 12);
        assert_eq!(analysis.rubric.noktalama, 9);
        assert_eq!(analysis.rubric.kelime, 0);
        assert_eq!(analysis.score_total, Some(61));

        assert_eq!(rows[1].score_total, Some(80));

        assert_eq!(rows[2].score_total, None);
        let analysis = rows[2].analysis_json.as_ref().unwrap();
        assert_eq!(analysis.rubric, Rubric::default());
        assert!(analysis.errors.is_empty());
    }

    #[test]
    fn test_raw_errors_keep_spanless_entries() {
        let payload: AnalysisPayload = serde_json::from_value(json!({
            "errors": [{"wrong": "herkez"}],
            "student_errors": [{"wrong": "a", "span": {"start": 0, "end": 1}}]
        }))
        .unwrap();

        let raw = payload.raw_errors();
        assert_eq!(raw.len(), 2);
        assert_eq!(raw[0]["wrong"], "a");
        assert_eq!(payload.combined_errors().len(), 1);
    }

    #[test]
    fn test_cefr_levels() {
        assert_eq!(CefrLevel::parse_code(" b1 "), Some(CefrLevel::B1));
        assert_eq!(CefrLevel::parse_code("D1"), None);
        assert_eq!(CefrLevel::C2.expected_word_count(), 200);
    }
}
