//! Coercion of loosely-typed feed values.
//!
//! The open-data API returns most columns as strings regardless of their
//! logical type, and CSV exports return everything as strings. Each helper
//! here accepts the forms the feed is known to produce and reports an
//! [`IssueKind::CoercionFailure`] for anything else.
//!
//! Callers check [`is_absent`] first; the helpers assume a present value.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use rat_map_sighting_models::Point;
use rat_map_sighting_models::fields::NOT_AVAILABLE;
use serde_json::Value;

use crate::{Expected, IssueKind};

/// Returns `true` for `null` and for blank strings.
#[must_use]
pub fn is_absent(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        _ => false,
    }
}

/// Returns `true` for the literal `"N/A"` placeholder.
#[must_use]
pub fn is_sentinel(value: &Value) -> bool {
    value.as_str() == Some(NOT_AVAILABLE)
}

fn failure(expected: Expected, value: &Value) -> IssueKind {
    IssueKind::CoercionFailure {
        expected,
        value: value.to_string(),
    }
}

/// Coerces a JSON integer, an integral float, or a numeric string.
///
/// # Errors
///
/// Returns [`IssueKind::CoercionFailure`] if the value is not a whole number.
pub fn integer(value: &Value) -> Result<i64, IssueKind> {
    let parsed = match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().and_then(integral)),
        Value::String(s) => {
            let s = s.trim();
            s.parse::<i64>()
                .ok()
                .or_else(|| s.parse::<f64>().ok().and_then(integral))
        }
        _ => None,
    };
    parsed.ok_or_else(|| failure(Expected::Integer, value))
}

#[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
fn integral(f: f64) -> Option<i64> {
    if f.is_finite() && f.fract() == 0.0 && f.abs() < i64::MAX as f64 {
        Some(f as i64)
    } else {
        None
    }
}

/// Coerces a five-digit style zip code.
///
/// # Errors
///
/// Returns [`IssueKind::CoercionFailure`] if the value is not a
/// non-negative whole number that fits in a `u32`.
pub fn zip_code(value: &Value) -> Result<u32, IssueKind> {
    integer(value)
        .ok()
        .and_then(|n| u32::try_from(n).ok())
        .ok_or_else(|| failure(Expected::ZipCode, value))
}

/// Coerces a JSON number or a numeric string to a finite `f64`.
///
/// # Errors
///
/// Returns [`IssueKind::CoercionFailure`] for anything else, including
/// `"NaN"` and `"inf"`.
pub fn float(value: &Value) -> Result<f64, IssueKind> {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    parsed
        .filter(|f| f.is_finite())
        .ok_or_else(|| failure(Expected::Number, value))
}

/// Coerces a string column. Only JSON strings are accepted; the string is
/// kept verbatim.
///
/// # Errors
///
/// Returns [`IssueKind::CoercionFailure`] for non-string values.
pub fn text(value: &Value) -> Result<String, IssueKind> {
    value
        .as_str()
        .map(String::from)
        .ok_or_else(|| failure(Expected::Text, value))
}

/// Coerces a timestamp string, or epoch milliseconds given as a JSON number.
///
/// # Errors
///
/// Returns [`IssueKind::CoercionFailure`] if no supported format matches.
pub fn timestamp(value: &Value) -> Result<DateTime<Utc>, IssueKind> {
    let parsed = match value {
        Value::String(s) => parse_feed_date(s),
        Value::Number(n) => n.as_i64().and_then(DateTime::from_timestamp_millis),
        _ => None,
    };
    parsed.ok_or_else(|| failure(Expected::Timestamp, value))
}

/// Decodes a `{"type": "Point", "coordinates": [lng, lat]}` object.
///
/// # Errors
///
/// Returns [`IssueKind::CoercionFailure`] if the tag is wrong, the
/// coordinates are not exactly two numbers, or extra keys are present.
pub fn point(value: &Value) -> Result<Point, IssueKind> {
    serde_json::from_value::<Point>(value.clone())
        .ok()
        .filter(|p| p.coordinates.iter().all(|c| c.is_finite()))
        .ok_or_else(|| failure(Expected::Point, value))
}

/// Parses the timestamp forms seen in the feed and its exports.
///
/// Floating timestamps (no offset) are interpreted as UTC. Accepted forms:
///
/// * Socrata floating timestamps, `2024-01-15T14:30:00.000` or without the
///   fraction
/// * RFC 3339 with an offset
/// * the portal's CSV export form, `01/15/2024 02:30:00 PM`
/// * bare dates, `2024-01-15` or `01/15/2024`
#[must_use]
pub fn parse_feed_date(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    if let Ok(naive) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(naive.and_utc());
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S") {
        return Some(naive.and_utc());
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f") {
        return Some(naive.and_utc());
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(s, "%m/%d/%Y %I:%M:%S %p") {
        return Some(naive.and_utc());
    }
    for format in ["%Y-%m-%d", "%m/%d/%Y"] {
        if let Ok(date) = NaiveDate::parse_from_str(s, format) {
            return Some(date.and_hms_opt(0, 0, 0)?.and_utc());
        }
    }
    None
}
