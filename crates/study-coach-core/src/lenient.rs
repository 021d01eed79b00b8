//! Tolerant numeric coercion for request fields and generated plans.
//!
//! Both browsers and language models are loose about numbers: `"90"`,
//! `90.0` and `" 45 minutes"` all show up where an integer is expected.

use serde::de::{self, Deserialize, Deserializer};
use serde_json::Value;

/// Parse the leading integer of a string, ignoring surrounding whitespace
/// and any trailing text (`" 45 minutes"` → `45`).
pub(crate) fn parse_int_prefix(s: &str) -> Option<i64> {
    let s = s.trim_start();
    let (negative, digits) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    let n: i64 = digits[..end].parse().ok()?;
    Some(if negative { -n } else { n })
}

/// Coerce a JSON value into a signed integer.
///
/// Floats are truncated toward zero; strings go through [`parse_int_prefix`].
pub(crate) fn coerce_int(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f.trunc() as i64)),
        Value::String(s) => parse_int_prefix(s),
        _ => None,
    }
}

/// Coerce a JSON value into a non-negative minute count.
///
/// `null` counts as zero. Floats are rounded, so `22.5` becomes `23`.
pub(crate) fn coerce_minutes(value: &Value) -> Option<u32> {
    match value {
        Value::Null => Some(0),
        Value::Number(n) => match n.as_u64() {
            Some(u) => u32::try_from(u).ok(),
            None => n
                .as_f64()
                .filter(|f| f.is_finite() && *f >= 0.0 && *f <= u32::MAX as f64)
                .map(|f| f.round() as u32),
        },
        Value::String(s) => parse_int_prefix(s).and_then(|n| u32::try_from(n).ok()),
        _ => None,
    }
}

pub(crate) fn minutes<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    coerce_minutes(&value)
        .ok_or_else(|| de::Error::custom("expected a minute count"))
}

pub(crate) fn optional_count<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    if value.is_null() {
        return Ok(None);
    }
    coerce_minutes(&value)
        .map(Some)
        .ok_or_else(|| de::Error::custom("expected a count"))
}

/// Treat an explicit `null` like an absent field.
pub(crate) fn null_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_int_prefix() {
        assert_eq!(parse_int_prefix("90"), Some(90));
        assert_eq!(parse_int_prefix(" 45 minutes"), Some(45));
        assert_eq!(parse_int_prefix("-5"), Some(-5));
        assert_eq!(parse_int_prefix("abc"), None);
        assert_eq!(parse_int_prefix(""), None);
    }

    #[test]
    fn test_coerce_int_truncates_floats() {
        assert_eq!(coerce_int(&json!(90)), Some(90));
        assert_eq!(coerce_int(&json!(12.9)), Some(12));
        assert_eq!(coerce_int(&json!("30")), Some(30));
        assert_eq!(coerce_int(&json!(true)), None);
        assert_eq!(coerce_int(&json!(null)), None);
    }

    #[test]
    fn test_coerce_minutes() {
        assert_eq!(coerce_minutes(&json!(25)), Some(25));
        assert_eq!(coerce_minutes(&json!(22.5)), Some(23));
        assert_eq!(coerce_minutes(&json!("5 min")), Some(5));
        assert_eq!(coerce_minutes(&json!(null)), Some(0));
        assert_eq!(coerce_minutes(&json!(-3)), None);
        assert_eq!(coerce_minutes(&json!([1])), None);
    }

    #[derive(serde::Deserialize)]
    struct Labels {
        #[serde(default, deserialize_with = "null_default")]
        names: Vec<String>,
        #[serde(default, deserialize_with = "null_default")]
        title: String,
    }

    #[test]
    fn test_null_default() {
        let l: Labels = serde_json::from_value(json!({"names": null, "title": null})).unwrap();
        assert!(l.names.is_empty());
        assert_eq!(l.title, "");
        let l: Labels = serde_json::from_value(json!({"names": ["a"], "title": "t"})).unwrap();
        assert_eq!(l.names, ["a"]);
        assert_eq!(l.title, "t");
    }
}
