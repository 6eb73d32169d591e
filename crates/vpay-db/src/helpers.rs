//! Row-to-entity parsing helpers.
//!
//! Every repo needs to convert `libsql::Row` (column-indexed) into typed entity
//! structs. Timestamps are written with [`format_datetime`] so that text order
//! matches time order; decimals are stored as TEXT to keep their scale.

use std::str::FromStr;

use chrono::{DateTime, SecondsFormat, SubsecRound, Utc};
use rust_decimal::Decimal;

use crate::error::DatabaseError;

/// Fixed-width RFC 3339 UTC timestamp with microseconds.
#[must_use]
pub fn format_datetime(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Current time at the precision [`format_datetime`] stores, so a returned
/// entity equals the same entity read back.
#[must_use]
pub fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}

/// Parse a required TEXT column as `DateTime<Utc>`.
///
/// Handles both RFC 3339 (`"2026-02-09T14:30:00.000000Z"`) and `SQLite`'s default
/// format (`"2026-02-09 14:30:00"`).
///
/// # Errors
///
/// Returns `DatabaseError::Query` if the string cannot be parsed as either format.
pub fn parse_datetime(s: &str) -> Result<DateTime<Utc>, DatabaseError> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }
    chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S")
        .map(|naive| naive.and_utc())
        .map_err(|e| DatabaseError::Query(format!("Failed to parse datetime '{s}': {e}")))
}

/// Parse a TEXT column into a serde-deserializable enum.
///
/// Works with all vpay-core enums that use `#[serde(rename_all = "snake_case")]`.
///
/// # Errors
///
/// Returns `DatabaseError::Query` if the string does not match any enum variant.
pub fn parse_enum<T: serde::de::DeserializeOwned>(s: &str) -> Result<T, DatabaseError> {
    serde_json::from_value(serde_json::Value::String(s.to_string()))
        .map_err(|e| DatabaseError::Query(format!("Failed to parse enum from '{s}': {e}")))
}

/// Read a nullable TEXT column. Returns `None` for both SQL NULL and empty string.
///
/// `row.get::<String>(idx)` on a NULL column returns an error, not `""`.
///
/// # Errors
///
/// Returns `DatabaseError` if the column read fails.
pub fn get_opt_string(row: &libsql::Row, idx: i32) -> Result<Option<String>, DatabaseError> {
    match row.get::<Option<String>>(idx)? {
        Some(s) if s.is_empty() => Ok(None),
        other => Ok(other),
    }
}

/// Parse a JSON TEXT column, treating NULL or empty as `default`.
///
/// # Errors
///
/// Returns `DatabaseError::Query` if a non-empty string contains invalid JSON.
pub fn parse_json_or(
    s: Option<&str>,
    default: serde_json::Value,
) -> Result<serde_json::Value, DatabaseError> {
    match s {
        Some(s) if !s.is_empty() => serde_json::from_str(s)
            .map_err(|e| DatabaseError::Query(format!("Invalid JSON in column: {e}"))),
        _ => Ok(default),
    }
}

/// Parse a required decimal TEXT column.
///
/// # Errors
///
/// Returns `DatabaseError::Query` if the text is not a decimal.
pub fn parse_decimal(s: &str) -> Result<Decimal, DatabaseError> {
    Decimal::from_str(s)
        .map_err(|e| DatabaseError::Query(format!("Failed to parse decimal '{s}': {e}")))
}

/// Parse a nullable decimal TEXT column.
///
/// # Errors
///
/// Returns `DatabaseError::Query` if a non-empty string is not a decimal.
pub fn parse_optional_decimal(s: Option<&str>) -> Result<Option<Decimal>, DatabaseError> {
    s.map(parse_decimal).transpose()
}

/// Store a boolean as `INTEGER` 0/1.
#[must_use]
pub fn bool_to_sql(value: bool) -> i64 {
    i64::from(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rstest::rstest;
    use vpay_core::enums::{ExtractionStatus, ValidationStatus};

    #[test]
    fn formatted_timestamps_sort_chronologically() {
        let earlier = Utc.with_ymd_and_hms(2024, 8, 1, 9, 0, 0).unwrap();
        let later = earlier + chrono::Duration::microseconds(1);
        assert!(format_datetime(&earlier) < format_datetime(&later));
        assert_eq!(format_datetime(&earlier), "2024-08-01T09:00:00.000000Z");
    }

    #[test]
    fn now_survives_a_text_roundtrip() {
        let at = now();
        assert_eq!(parse_datetime(&format_datetime(&at)).unwrap(), at);
    }

    #[test]
    fn datetime_parses_both_formats() {
        let a = parse_datetime("2024-08-01T09:00:00.000000Z").unwrap();
        let b = parse_datetime("2024-08-01 09:00:00").unwrap();
        assert_eq!(a, b);
    }

    #[rstest]
    #[case("valid", ValidationStatus::Valid)]
    #[case("already_validated", ValidationStatus::AlreadyValidated)]
    #[case("meta_not_found", ValidationStatus::MetaNotFound)]
    #[case("amount_mismatch", ValidationStatus::AmountMismatch)]
    fn validation_status_from_column(#[case] column: &str, #[case] expected: ValidationStatus) {
        assert_eq!(parse_enum::<ValidationStatus>(column).unwrap(), expected);
    }

    #[rstest]
    #[case("approved")]
    #[case("VALID")]
    #[case("")]
    fn unknown_status_column_rejected(#[case] column: &str) {
        assert!(parse_enum::<ValidationStatus>(column).is_err());
        assert!(parse_enum::<ExtractionStatus>(column).is_err());
    }

    #[test]
    fn decimal_keeps_scale() {
        assert_eq!(parse_decimal("1000.00").unwrap().to_string(), "1000.00");
        assert_eq!(parse_optional_decimal(None).unwrap(), None);
        assert!(parse_decimal("abc").is_err());
    }
}
