//! Tolerant decoders for values written by older versions.
//!
//! The fence document has been hand-edited and produced by several schema
//! versions, so numbers sometimes arrive as strings and booleans as either
//! native JSON booleans or `"true"`/`"false"`. These helpers decode what
//! they can and leave the rest for the migration pass to repair; they never
//! fail the whole document.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Parses `"true"`/`"false"` case-insensitively, ignoring surrounding space.
#[must_use]
pub fn parse_bool(text: &str) -> Option<bool> {
    let text = text.trim();
    if text.eq_ignore_ascii_case("true") {
        Some(true)
    } else if text.eq_ignore_ascii_case("false") {
        Some(false)
    } else {
        None
    }
}

/// Reads a finite number from a JSON number or a numeric string.
#[must_use]
pub fn value_as_f64(value: &Value) -> Option<f64> {
    let number = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }?;
    number.is_finite().then_some(number)
}

/// Text field: strings pass through, numbers are stringified, anything else
/// is empty.
pub fn string_or_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where D: Deserializer<'de> {
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::String(s) => s,
        Value::Number(n) => n.to_string(),
        _ => String::new(),
    })
}

/// Geometry field: anything unreadable becomes `0.0`.
pub fn number_or_zero<'de, D>(deserializer: D) -> Result<f64, D::Error>
where D: Deserializer<'de> {
    let value = Value::deserialize(deserializer)?;
    Ok(value_as_f64(&value).unwrap_or(0.0))
}

/// Optional number: `null` is absent, anything unreadable is `NaN` so the
/// migration pass can tell "present but invalid" from "missing".
pub fn optional_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where D: Deserializer<'de> {
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Null => None,
        other => Some(value_as_f64(&other).unwrap_or(f64::NAN)),
    })
}

/// Optional boolean accepting native booleans or boolean strings.
/// Unreadable values decode as absent.
pub fn optional_bool<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where D: Deserializer<'de> {
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Bool(b) => Some(b),
        Value::String(s) => parse_bool(&s),
        _ => None,
    })
}

/// Optional non-negative index from a number or numeric string.
pub fn optional_index<'de, D>(deserializer: D) -> Result<Option<usize>, D::Error>
where D: Deserializer<'de> {
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Number(n) => n.as_u64().and_then(|n| usize::try_from(n).ok()),
        Value::String(s) => s.trim().parse::<usize>().ok(),
        _ => None,
    })
}

/// Optional integer sort key from a number or numeric string.
pub fn optional_integer<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where D: Deserializer<'de> {
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_parse_bool() {
        assert_eq!(parse_bool("true"), Some(true));
        assert_eq!(parse_bool(" False "), Some(false));
        assert_eq!(parse_bool("yes"), None);
        assert_eq!(parse_bool(""), None);
    }

    #[test]
    fn test_value_as_f64() {
        assert_eq!(value_as_f64(&json!(12.5)), Some(12.5));
        assert_eq!(value_as_f64(&json!("200")), Some(200.0));
        assert_eq!(value_as_f64(&json!("tall")), None);
        assert_eq!(value_as_f64(&json!(null)), None);
        assert_eq!(value_as_f64(&json!(true)), None);
    }

    #[derive(Deserialize)]
    struct Sample {
        #[serde(default, deserialize_with = "string_or_empty")]
        id: String,
        #[serde(default, deserialize_with = "number_or_zero")]
        width: f64,
        #[serde(default, deserialize_with = "optional_number")]
        height: Option<f64>,
        #[serde(default, deserialize_with = "optional_bool")]
        flag: Option<bool>,
        #[serde(default, deserialize_with = "optional_index")]
        index: Option<usize>,
    }

    #[test]
    fn test_lenient_fields() {
        let sample: Sample =
            serde_json::from_value(json!({"id": 42, "width": "300", "height": "abc", "flag": "TRUE", "index": "2"}))
                .unwrap();
        assert_eq!(sample.id, "42");
        assert!((sample.width - 300.0).abs() < f64::EPSILON);
        assert!(sample.height.unwrap().is_nan());
        assert_eq!(sample.flag, Some(true));
        assert_eq!(sample.index, Some(2));
    }

    #[test]
    fn test_lenient_fields_missing_and_null() {
        let sample: Sample = serde_json::from_value(json!({"height": null, "flag": 3})).unwrap();
        assert!(sample.id.is_empty());
        assert!(sample.width.abs() < f64::EPSILON);
        assert!(sample.height.is_none());
        assert!(sample.flag.is_none());
        assert!(sample.index.is_none());
    }
}
