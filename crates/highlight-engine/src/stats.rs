//! Classroom statistics for the teacher dashboard charts

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use shared_types::{ErrorAnnotation, Submission};

use crate::rubric::{passed, resolve_total};

/// Chart bucket for an error
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ErrorCategory {
    Grammar,
    Syntax,
    SpellingPunctuation,
    Vocabulary,
}

impl ErrorCategory {
    /// Chart order
    pub const ALL: [ErrorCategory; 4] = [
        ErrorCategory::Grammar,
        ErrorCategory::Syntax,
        ErrorCategory::SpellingPunctuation,
        ErrorCategory::Vocabulary,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            ErrorCategory::Grammar => "Dilbilgisi",
            ErrorCategory::Syntax => "Söz Dizimi",
            ErrorCategory::SpellingPunctuation => "Yazım/Nokt.",
            ErrorCategory::Vocabulary => "Kelime",
        }
    }
}

const SYNTAX_KEYWORDS: &[&str] = &[
    "söz", "cümle", "yapı", "anlatım", "devrik", "yüklem", "özne", "sıralama", "eksik",
];

const SPELLING_KEYWORDS: &[&str] = &[
    "yazım", "nokta", "virgül", "imla", "büyük", "küçük", "kesme",
];

const VOCABULARY_KEYWORDS: &[&str] = &["keli", "sözcük", "anlam", "seçim", "ifade"];

/// Bucket an error by keywords in its type (or rule id) and explanation.
///
/// Buckets are tried in the order syntax, spelling/punctuation, vocabulary;
/// anything unmatched is grammar.
pub fn classify(error: &ErrorAnnotation) -> ErrorCategory {
    classify_text(error.error_type.as_deref(), &error.rule_id, &error.explanation)
}

/// [`classify`] for a raw backend error. Needs no span, so errors the
/// highlighter cannot place still count.
pub fn classify_value(raw: &Value) -> ErrorCategory {
    let field = |key: &str| match raw.get(key) {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Null) | None => String::new(),
        Some(other) => other.to_string(),
    };
    let error_type = field("type");
    classify_text(Some(error_type.as_str()), &field("rule_id"), &field("explanation"))
}

fn classify_text(error_type: Option<&str>, rule_id: &str, explanation: &str) -> ErrorCategory {
    let label = match error_type {
        Some(t) if !t.is_empty() => t,
        _ => rule_id,
    };
    let haystack = format!("{} {}", label, explanation).to_lowercase();
    let has_any = |keywords: &[&str]| keywords.iter().any(|k| haystack.contains(k));

    if has_any(SYNTAX_KEYWORDS) {
        ErrorCategory::Syntax
    } else if has_any(SPELLING_KEYWORDS) {
        ErrorCategory::SpellingPunctuation
    } else if has_any(VOCABULARY_KEYWORDS) {
        ErrorCategory::Vocabulary
    } else {
        ErrorCategory::Grammar
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryCount {
    pub name: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassStats {
    /// Always one entry per [`ErrorCategory`], in chart order
    pub errors_by_category: Vec<CategoryCount>,
    /// Submissions per country, sorted by name
    pub submissions_by_country: Vec<CategoryCount>,
    pub submission_count: usize,
    pub passed: usize,
    pub failed: usize,
}

/// Label used for submissions with no country
pub const UNKNOWN_COUNTRY: &str = "Belirsiz";

pub fn class_stats(submissions: &[Submission], pass_threshold: i64) -> ClassStats {
    let mut by_category: BTreeMap<ErrorCategory, usize> =
        ErrorCategory::ALL.iter().map(|c| (*c, 0)).collect();
    let mut by_country: BTreeMap<String, usize> = BTreeMap::new();
    let mut passed_count = 0;

    for submission in submissions {
        if let Some(analysis) = &submission.analysis_json {
            for raw in analysis.raw_errors() {
                *by_category.entry(classify_value(&raw)).or_insert(0) += 1;
            }
        }

        let country = submission
            .country
            .as_deref()
            .filter(|c| !c.is_empty())
            .unwrap_or(UNKNOWN_COUNTRY);
        *by_country.entry(country.to_string()).or_insert(0) += 1;

        let rubric = submission
            .analysis_json
            .as_ref()
            .map(|a| a.rubric)
            .unwrap_or_default();
        if passed(resolve_total(submission.score_total, &rubric), pass_threshold) {
            passed_count += 1;
        }
    }

    ClassStats {
        errors_by_category: ErrorCategory::ALL
            .iter()
            .map(|c| CategoryCount {
                name: c.label().to_string(),
                count: by_category.get(c).copied().unwrap_or(0),
            })
            .collect(),
        submissions_by_country: by_country
            .into_iter()
            .map(|(name, count)| CategoryCount { name, count })
            .collect(),
        submission_count: submissions.len(),
        passed: passed_count,
        failed: submissions.len() - passed_count,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rubric::PASS_THRESHOLD;
    use serde_json::json;
    use shared_types::{ErrorSeverity, Span};

    fn error(error_type: Option<&str>, rule_id: &str, explanation: &str) -> ErrorAnnotation {
        ErrorAnnotation {
            span: Span::new(0, 1),
            original: String::new(),
            suggested: None,
            severity: ErrorSeverity::Confirmed,
            explanation: explanation.to_string(),
            rule_id: rule_id.to_string(),
            error_type: error_type.map(str::to_string),
        }
    }

    #[test]
    fn test_classify_buckets() {
        assert_eq!(
            classify(&error(Some("Söz Dizimi"), "", "")),
            ErrorCategory::Syntax
        );
        assert_eq!(
            classify(&error(Some("Yazım"), "", "")),
            ErrorCategory::SpellingPunctuation
        );
        assert_eq!(
            classify(&error(None, "TDK_21_VIRGUL", "Virgül eksik kullanılmış")),
            ErrorCategory::Syntax
        );
        assert_eq!(
            classify(&error(None, "", "Yanlış kelime seçilmiş")),
            ErrorCategory::Vocabulary
        );
        assert_eq!(
            classify(&error(Some("Ek"), "", "Hal eki hatalı")),
            ErrorCategory::Grammar
        );
    }

    #[test]
    fn test_classify_type_wins_over_rule_id() {
        // rule id mentions nothing; type decides
        assert_eq!(
            classify(&error(Some("Noktalama"), "TDK_20_NOKTA", "")),
            ErrorCategory::SpellingPunctuation
        );
    }

    #[test]
    fn test_class_stats() {
        let submissions: Vec<Submission> = serde_json::from_value(json!([
            {
                "country": "SY",
                "score_total": 80,
                "analysis_json": {
                    "errors": [
                        {"type": "Yazım", "span": {"start": 0, "end": 2}},
                        {"type": "Zaman", "explanation": "Kip uyumu", "span": {"start": 3, "end": 5}}
                    ]
                }
            },
            {
                "country": "",
                "analysis_json": {
                    "rubric": {"uzunluk": 10, "icerik": 20},
                    "student_errors": [{"type": "Cümle yapısı", "span": {"start": 0, "end": 2}}]
                }
            },
            {"country": "SY", "score_total": 70}
        ]))
        .unwrap();

        let stats = class_stats(&submissions, PASS_THRESHOLD);
        assert_eq!(stats.submission_count, 3);
        assert_eq!(stats.passed, 2);
        assert_eq!(stats.failed, 1);

        let counts: Vec<(&str, usize)> = stats
            .errors_by_category
            .iter()
            .map(|c| (c.name.as_str(), c.count))
            .collect();
        assert_eq!(
            counts,
            vec![
                ("Dilbilgisi", 1),
                ("Söz Dizimi", 1),
                ("Yazım/Nokt.", 1),
                ("Kelime", 0)
            ]
        );

        assert_eq!(
            stats.submissions_by_country,
            vec![
                CategoryCount {
                    name: "Belirsiz".to_string(),
                    count: 1
                },
                CategoryCount {
                    name: "SY".to_string(),
                    count: 2
                },
            ]
        );
    }

    #[test]
    fn test_spanless_errors_are_counted() {
        let submissions: Vec<Submission> = serde_json::from_value(json!([{
            "analysis_json": {
                "errors": [
                    {"type": "Yazım", "wrong": "herkez"},
                    {"rule_id": "TDK_24_HERKES", "explanation": "Kelime seçimi", "span": {"start": "x"}}
                ]
            }
        }]))
        .unwrap();

        let stats = class_stats(&submissions, PASS_THRESHOLD);
        let total: usize = stats.errors_by_category.iter().map(|c| c.count).sum();
        assert_eq!(total, 2);
        assert_eq!(stats.errors_by_category[2].count, 1);
        assert_eq!(stats.errors_by_category[3].count, 1);
    }

    #[test]
    fn test_classify_value_matches_classify() {
        let raw = json!({"type": "", "rule_id": "TDK_21_VIRGUL", "explanation": "Virgül eksik"});
        assert_eq!(
            classify_value(&raw),
            classify(&error(None, "TDK_21_VIRGUL", "Virgül eksik"))
        );
        assert_eq!(classify_value(&json!("not an object")), ErrorCategory::Grammar);
    }

    #[test]
    fn test_empty_class_has_all_buckets() {
        let stats = class_stats(&[], PASS_THRESHOLD);
        assert_eq!(stats.errors_by_category.len(), 4);
        assert!(stats.errors_by_category.iter().all(|c| c.count == 0));
        assert_eq!(stats.failed, 0);
    }
}
