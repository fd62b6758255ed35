//! Rubric categories, score entry and pass/fail
//!
//! Maxima add up to 100.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use shared_types::{leading_int, loose_int, Rubric};

/// Minimum total for a passing essay
pub const PASS_THRESHOLD: i64 = 70;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RubricCategory {
    Uzunluk,
    Noktalama,
    DilBilgisi,
    SozDizimi,
    Kelime,
    Icerik,
}

impl RubricCategory {
    pub const ALL: [RubricCategory; 6] = [
        RubricCategory::Uzunluk,
        RubricCategory::Noktalama,
        RubricCategory::DilBilgisi,
        RubricCategory::SozDizimi,
        RubricCategory::Kelime,
        RubricCategory::Icerik,
    ];

    pub fn max(&self) -> i64 {
        match self {
            RubricCategory::Uzunluk => 16,
            RubricCategory::Noktalama => 14,
            RubricCategory::DilBilgisi => 16,
            RubricCategory::SozDizimi => 20,
            RubricCategory::Kelime => 14,
            RubricCategory::Icerik => 20,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            RubricCategory::Uzunluk => "Uzunluk",
            RubricCategory::Noktalama => "Noktalama",
            RubricCategory::DilBilgisi => "Dil Bilgisi",
            RubricCategory::SozDizimi => "Söz Dizimi",
            RubricCategory::Kelime => "Kelime",
            RubricCategory::Icerik => "İçerik",
        }
    }

    /// JSON key in the stored rubric
    pub fn key(&self) -> &'static str {
        match self {
            RubricCategory::Uzunluk => "uzunluk",
            RubricCategory::Noktalama => "noktalama",
            RubricCategory::DilBilgisi => "dil_bilgisi",
            RubricCategory::SozDizimi => "soz_dizimi",
            RubricCategory::Kelime => "kelime",
            RubricCategory::Icerik => "icerik",
        }
    }
}

/// Score operations on the stored rubric record
pub trait RubricExt {
    fn get(&self, category: RubricCategory) -> i64;

    /// Set a category score, clamped into `0..=max`
    fn set(&mut self, category: RubricCategory, value: i64);

    fn total(&self) -> i64;

    /// Copy with every category clamped into range
    fn clamped(&self) -> Rubric;
}

impl RubricExt for Rubric {
    fn get(&self, category: RubricCategory) -> i64 {
        match category {
            RubricCategory::Uzunluk => self.uzunluk,
            RubricCategory::Noktalama => self.noktalama,
            RubricCategory::DilBilgisi => self.dil_bilgisi,
            RubricCategory::SozDizimi => self.soz_dizimi,
            RubricCategory::Kelime => self.kelime,
            RubricCategory::Icerik => self.icerik,
        }
    }

    fn set(&mut self, category: RubricCategory, value: i64) {
        let value = value.clamp(0, category.max());
        match category {
            RubricCategory::Uzunluk => self.uzunluk = value,
            RubricCategory::Noktalama => self.noktalama = value,
            RubricCategory::DilBilgisi => self.dil_bilgisi = value,
            RubricCategory::SozDizimi => self.soz_dizimi = value,
            RubricCategory::Kelime => self.kelime = value,
            RubricCategory::Icerik => self.icerik = value,
        }
    }

    fn total(&self) -> i64 {
        RubricCategory::ALL.iter().map(|c| self.get(*c)).sum()
    }

    fn clamped(&self) -> Rubric {
        let mut out = Rubric::default();
        for category in RubricCategory::ALL {
            out.set(category, self.get(category));
        }
        out
    }
}

/// Parse a score form field: leading integer digits count, anything
/// unparseable is 0, the result is clamped into `0..=max`.
pub fn parse_score_input(raw: &str, max: i64) -> i64 {
    leading_int(raw).unwrap_or(0).clamp(0, max)
}

/// Build a rubric from loosely typed JSON (numbers or numeric strings).
/// Missing or garbage values count as 0; everything is clamped.
pub fn rubric_from_value(value: &Value) -> Rubric {
    let mut rubric = Rubric::default();
    for category in RubricCategory::ALL {
        let score = value.get(category.key()).and_then(loose_int).unwrap_or(0);
        rubric.set(category, score);
    }
    rubric
}

/// Stored total when present, otherwise the rubric sum
pub fn resolve_total(stored_total: Option<i64>, rubric: &Rubric) -> i64 {
    stored_total.unwrap_or_else(|| rubric.total())
}

pub fn passed(total: i64, threshold: i64) -> bool {
    total >= threshold
}
