//! Lenient readers for numbers that pass through a language model and a
//! hand-edited score form before they reach the database
//!
//! Integers arrive as `12`, `12.5`, `"12"` or `" 12 puan"`. These helpers
//! read them the way the clients' `parseInt(x, 10) || 0` does, and the serde
//! adapters let a record with one odd field still deserialize.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Leading integer of a string: optional sign, then ASCII digits.
/// `None` when no digit follows.
pub fn leading_int(raw: &str) -> Option<i64> {
    let trimmed = raw.trim();
    let (negative, digits) = match trimmed.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, trimmed.strip_prefix('+').unwrap_or(trimmed)),
    };
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    if end == 0 {
        return None;
    }
    // overlong digit runs saturate instead of failing
    let value = digits[..end].parse::<i64>().unwrap_or(i64::MAX);
    Some(if negative { -value } else { value })
}

/// Integer view of a loose JSON value. Floats truncate toward zero; numeric
/// strings read their leading integer; anything else is `None`.
pub fn loose_int(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| {
            n.as_f64()
                .filter(|f| f.is_finite())
                .map(|f| f.trunc() as i64)
        }),
        Value::String(s) => leading_int(s),
        _ => None,
    }
}

/// `#[serde(deserialize_with)]` adapter: loose integer, garbage reads as `None`
pub fn deserialize_loose_int<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(loose_int(&value))
}

/// `#[serde(deserialize_with)]` adapter: loose integer, garbage reads as 0
pub fn deserialize_score<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(loose_int(&value).unwrap_or(0))
}

/// `#[serde(deserialize_with)]` adapter: a JSON array, or empty for anything else
pub fn deserialize_list<'de, D>(deserializer: D) -> Result<Vec<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Array(items) => Ok(items),
        _ => Ok(Vec::new()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_leading_int() {
        assert_eq!(leading_int("12"), Some(12));
        assert_eq!(leading_int(" 7abc"), Some(7));
        assert_eq!(leading_int("-3"), Some(-3));
        assert_eq!(leading_int("+4"), Some(4));
        assert_eq!(leading_int("12.9"), Some(12));
        assert_eq!(leading_int("abc"), None);
        assert_eq!(leading_int(""), None);
        assert_eq!(leading_int("-"), None);
        assert_eq!(leading_int("99999999999999999999999"), Some(i64::MAX));
    }

    #[test]
    fn test_loose_int() {
        assert_eq!(loose_int(&json!(15)), Some(15));
        assert_eq!(loose_int(&json!(12.5)), Some(12));
        assert_eq!(loose_int(&json!(-0.7)), Some(0));
        assert_eq!(loose_int(&json!("18")), Some(18));
        assert_eq!(loose_int(&json!(null)), None);
        assert_eq!(loose_int(&json!([1])), None);
        assert_eq!(loose_int(&json!(true)), None);
    }
}
