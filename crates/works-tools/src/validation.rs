//! Pure argument validation shared by every tool.
//!
//! Nothing in here performs I/O: a tool call that fails one of these checks never reaches the
//! network.

use crate::error::{Result, WorksToolsError};
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::de::{DeserializeOwned, Error as _};
use serde::{Deserialize, Deserializer};
use serde_json::{Number, Value};
use std::ops::RangeInclusive;

/// Deserialize raw tool arguments into a typed argument struct.
///
/// `null` (no arguments at all) is treated as an empty object so that tools whose parameters are
/// all optional can be called bare.
///
/// # Errors
///
/// Returns a validation error if the payload has the wrong shape (unknown JSON types, a string
/// where a number is expected, ...).
pub fn parse_args<T: DeserializeOwned>(tool: &str, arguments: Value) -> Result<T> {
    let arguments = match arguments {
        Value::Null => Value::Object(serde_json::Map::new()),
        other => other,
    };
    serde_json::from_value(arguments)
        .map_err(|e| WorksToolsError::validation(format!("invalid arguments for {tool}: {e}")))
}

/// Deserialize an optional integer argument, accepting whole-number floats such as `50.0`.
///
/// Use with `#[serde(default, deserialize_with = "...")]`.
///
/// # Errors
///
/// Fails for fractional or non-numeric values.
pub fn lenient_int<'de, D>(deserializer: D) -> std::result::Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let Some(number) = Option::<Number>::deserialize(deserializer)? else {
        return Ok(None);
    };
    if let Some(v) = number.as_i64() {
        return Ok(Some(v));
    }
    match number.as_f64() {
        #[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
        Some(f) if f.fract() == 0.0 && f >= i64::MIN as f64 && f <= i64::MAX as f64 => {
            Ok(Some(f as i64))
        }
        _ => Err(D::Error::custom(format!("expected an integer, got {number}"))),
    }
}

/// Require a non-blank string and return it trimmed.
///
/// # Errors
///
/// Returns a validation error if the value is missing, empty or whitespace-only.
pub fn required_str<'a>(field: &str, value: Option<&'a str>) -> Result<&'a str> {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(WorksToolsError::validation(format!(
            "{field} is required and cannot be empty"
        ))),
    }
}

/// Trim an optional string, treating blank values as absent.
#[must_use]
pub fn optional_str(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Check that `value` is one of `allowed` (exact, case-sensitive match).
///
/// # Errors
///
/// Returns a validation error naming the allowed set.
pub fn one_of<'a>(field: &str, value: &'a str, allowed: &[&str]) -> Result<&'a str> {
    if allowed.contains(&value) {
        Ok(value)
    } else {
        Err(WorksToolsError::validation(format!(
            "{field} must be one of [{}], got '{value}'",
            allowed.join(", ")
        )))
    }
}

/// Check that `value` lies inside an inclusive range.
///
/// # Errors
///
/// Returns a validation error describing the range.
pub fn in_range(field: &str, value: i64, range: RangeInclusive<i64>) -> Result<i64> {
    if range.contains(&value) {
        Ok(value)
    } else {
        Err(WorksToolsError::validation(format!(
            "{field} must be between {} and {}, got {value}",
            range.start(),
            range.end()
        )))
    }
}

/// Check a maximum length, counted in Unicode scalar values.
///
/// # Errors
///
/// Returns a validation error if the string is longer than `max`.
pub fn max_chars(field: &str, value: &str, max: usize) -> Result<()> {
    let len = value.chars().count();
    if len > max {
        return Err(WorksToolsError::validation(format!(
            "{field} must be at most {max} characters long, got {len}"
        )));
    }
    Ok(())
}

/// Parse a `YYYY-MM-DD` calendar date.
///
/// # Errors
///
/// Returns a validation error if the value is not a valid date in that format.
pub fn calendar_date(field: &str, value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|_| {
        WorksToolsError::validation(format!(
            "{field} must be in YYYY-MM-DD format, got '{value}'"
        ))
    })
}

/// Require an ISO-8601 date or date-time.
///
/// # Errors
///
/// Returns a validation error if [`is_iso_datetime`] rejects the value.
pub fn iso_datetime(field: &str, value: &str) -> Result<()> {
    if is_iso_datetime(value) {
        Ok(())
    } else {
        Err(WorksToolsError::validation(format!(
            "{field} must be an ISO-8601 datetime (YYYY-MM-DDTHH:mm:ss[TZD]), got '{value}'"
        )))
    }
}

const NAIVE_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

const OFFSET_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f%:z",
    "%Y-%m-%dT%H:%M%:z",
    "%Y-%m-%d %H:%M:%S%.f%:z",
    "%Y-%m-%d %H:%M%:z",
];

/// Whether `value` is an ISO-8601 date (`YYYY-MM-DD`) or date-time, with an optional `Z` or
/// `±HH:MM` offset and optional fractional seconds.
#[must_use]
pub fn is_iso_datetime(value: &str) -> bool {
    if DateTime::parse_from_rfc3339(value).is_ok() {
        return true;
    }
    if NAIVE_DATETIME_FORMATS
        .iter()
        .any(|f| NaiveDateTime::parse_from_str(value, f).is_ok())
    {
        return true;
    }
    if OFFSET_DATETIME_FORMATS
        .iter()
        .any(|f| DateTime::parse_from_str(value, f).is_ok())
    {
        return true;
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d").is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;

    #[test]
    fn required_str_trims_and_rejects_blank() {
        assert_eq!(required_str("title", Some("  hi ")).expect("valid"), "hi");
        for bad in [None, Some(""), Some("   \t")] {
            let err = required_str("title", bad).expect_err("blank");
            assert!(err.to_string().contains("title is required"));
        }
    }

    #[test]
    fn optional_str_drops_blank_values() {
        assert_eq!(optional_str(Some(" c1 ")), Some("c1"));
        assert_eq!(optional_str(Some("  ")), None);
        assert_eq!(optional_str(None), None);
    }

    #[test]
    fn one_of_is_case_sensitive() {
        assert!(one_of("status", "TODO", &["TODO", "ALL"]).is_ok());
        let err = one_of("status", "todo", &["TODO", "ALL"]).expect_err("lowercase");
        assert!(err.to_string().contains("[TODO, ALL]"));
    }

    #[test]
    fn in_range_is_inclusive() {
        assert!(in_range("count", 0, 0..=100).is_ok());
        assert!(in_range("count", 100, 0..=100).is_ok());
        assert!(in_range("count", -1, 0..=100).is_err());
        assert!(in_range("count", 101, 0..=100).is_err());
    }

    #[test]
    fn max_chars_counts_scalar_values_not_bytes() {
        let korean = "가".repeat(50);
        assert!(korean.len() > 50);
        assert!(max_chars("calendarName", &korean, 50).is_ok());
        assert!(max_chars("calendarName", &"가".repeat(51), 50).is_err());
    }

    #[test]
    fn calendar_date_requires_year_month_day() {
        assert!(calendar_date("dueDate", "2024-02-15").is_ok());
        assert!(calendar_date("dueDate", "2024-02-30").is_err());
        assert!(calendar_date("dueDate", "15/02/2024").is_err());
        assert!(calendar_date("dueDate", "2024-02-15T10:00:00").is_err());
    }

    #[test]
    fn iso_datetime_accepts_common_shapes() {
        for ok in [
            "2024-01-15",
            "2024-01-15T14:00",
            "2024-01-15T14:00:00",
            "2024-01-15 14:00:00",
            "2024-01-15T14:00:00.250",
            "2024-01-15T14:00:00Z",
            "2024-01-15T14:00:00+09:00",
            "2024-01-15T14:00+09:00",
        ] {
            assert!(is_iso_datetime(ok), "expected '{ok}' to be accepted");
        }
    }

    #[test]
    fn iso_datetime_rejects_garbage() {
        for bad in [
            "",
            "tomorrow",
            "2024-13-01T00:00:00",
            "2024-01-15T25:00:00",
            "15-01-2024 14:00",
            "2024-01-15T14:00:00 trailing",
        ] {
            assert!(!is_iso_datetime(bad), "expected '{bad}' to be rejected");
        }
    }

    #[derive(Debug, Deserialize)]
    struct Args {
        #[serde(default, deserialize_with = "lenient_int")]
        count: Option<i64>,
    }

    #[test]
    fn parse_args_treats_null_as_empty_object() {
        let args: Args = parse_args("t", Value::Null).expect("null is empty");
        assert_eq!(args.count, None);
    }

    #[test]
    fn parse_args_reports_type_mismatches_as_validation_errors() {
        let err = parse_args::<Args>("get_my_tasks", json!({"count": "ten"})).expect_err("string");
        assert!(matches!(err, WorksToolsError::Validation(_)));
        assert!(err.to_string().contains("get_my_tasks"));
    }

    #[test]
    fn whole_number_floats_are_accepted_as_integers() {
        let args: Args = parse_args("t", json!({"count": 50.0})).expect("whole float");
        assert_eq!(args.count, Some(50));
        let args: Args = parse_args("t", json!({"count": 7})).expect("integer");
        assert_eq!(args.count, Some(7));
        let args: Args = parse_args("t", json!({"count": null})).expect("null");
        assert_eq!(args.count, None);
        let args: Args = parse_args("t", json!({})).expect("missing");
        assert_eq!(args.count, None);

        for bad in [json!({"count": 50.5}), json!({"count": "50"}), json!({"count": true})] {
            let err = parse_args::<Args>("t", bad).expect_err("not an integer");
            assert!(matches!(err, WorksToolsError::Validation(_)));
        }
    }
}
