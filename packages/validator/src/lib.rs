#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Validation and normalization of raw 311 rat sighting rows.
//!
//! Raw rows arrive as [`serde_json::Value`] objects straight from the
//! open-data API (or a CSV export). [`validate_record`] coerces one row into
//! a [`RatSightingRecord`]; [`validate_batch`] does the same for a whole
//! snapshot without letting one bad row abort the rest.
//!
//! Two tiers are supported through [`ValidationMode`]:
//!
//! * **Lenient** (default): unknown columns pass through into
//!   [`RatSightingRecord::extra`], and out-of-vocabulary categorical values
//!   are kept and reported as [`ValidationWarning::EnumMismatch`].
//! * **Strict**: both of the above reject the record.
//!
//! Missing required columns and uncoercible values reject the record in
//! either mode.

pub mod batch;
pub mod coerce;
pub mod consistency;
pub mod record;

use std::fmt;

use chrono::{DateTime, Utc};
use strum_macros::{AsRefStr, Display};

pub use batch::{BatchReport, collapse_duplicates, validate_batch, validate_batch_str, validate_records};
pub use rat_map_sighting_models::{RatSightingRecord, ValidationMode};
pub use record::{ValidatedRecord, validate_record};

/// The target type a value failed to coerce into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, AsRefStr)]
#[strum(serialize_all = "snake_case")]
pub enum Expected {
    Integer,
    Number,
    #[strum(serialize = "zip code")]
    ZipCode,
    Timestamp,
    #[strum(serialize = "string")]
    Text,
    #[strum(serialize = "Point")]
    Point,
}

/// Why a single field was rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IssueKind {
    /// A required column is absent, `null`, or blank.
    #[error("required field is missing")]
    MissingRequiredField,

    /// A value is present but cannot be converted to its target type.
    #[error("expected {expected}, got {value}")]
    CoercionFailure {
        /// Target type.
        expected: Expected,
        /// Offending value rendered as JSON.
        value: String,
    },

    /// Strict mode only: the column is not part of the schema.
    #[error("unknown field")]
    UnknownField,

    /// Strict mode only: the value is outside the known vocabulary.
    #[error("{value:?} is not one of {allowed:?}")]
    EnumMismatch {
        /// Offending value.
        value: String,
        /// The known vocabulary for the column.
        allowed: &'static [&'static str],
    },
}

/// A rejected field and the reason it was rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldIssue {
    /// Upstream column name.
    pub field: String,
    pub kind: IssueKind,
}

impl FieldIssue {
    #[must_use]
    pub fn new(field: impl Into<String>, kind: IssueKind) -> Self {
        Self {
            field: field.into(),
            kind,
        }
    }
}

impl fmt::Display for FieldIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.kind)
    }
}

/// Why a record was rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// The row is not a JSON object at all.
    #[error("record is not a JSON object (got {0})")]
    NotAnObject(&'static str),

    /// One or more fields failed. Every failing field is listed, not just
    /// the first.
    #[error("{}", join_issues(.0))]
    Invalid(Vec<FieldIssue>),
}

impl ValidationError {
    /// Returns the field issues, empty for [`ValidationError::NotAnObject`].
    #[must_use]
    pub fn issues(&self) -> &[FieldIssue] {
        match self {
            Self::NotAnObject(_) => &[],
            Self::Invalid(issues) => issues,
        }
    }

    /// Returns the issue recorded for `field`, if any.
    #[must_use]
    pub fn issue_for(&self, field: &str) -> Option<&IssueKind> {
        self.issues()
            .iter()
            .find(|issue| issue.field == field)
            .map(|issue| &issue.kind)
    }
}

fn join_issues(issues: &[FieldIssue]) -> String {
    issues
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// A non-fatal finding attached to an accepted record.
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationWarning {
    /// Lenient mode: a categorical value outside the known vocabulary was
    /// kept verbatim.
    EnumMismatch {
        /// Upstream column name.
        field: String,
        /// The unrecognized value.
        value: String,
    },
    /// `closed_date` is earlier than `created_date`.
    ClosedBeforeCreated {
        created_at: DateTime<Utc>,
        closed_at: DateTime<Utc>,
    },
    /// Latitude and longitude are present but `location` is not.
    CoordinatesWithoutLocation,
    /// `location` is present but latitude/longitude are not.
    LocationWithoutCoordinates,
    /// Only one of latitude/longitude is present.
    PartialCoordinates,
    /// `location` and latitude/longitude disagree.
    LocationMismatch {
        /// `(latitude, longitude)` from the point.
        point: (f64, f64),
        /// `(latitude, longitude)` from the scalar columns.
        lat_lng: (f64, f64),
    },
}

impl fmt::Display for ValidationWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EnumMismatch { field, value } => {
                write!(f, "{field}: unrecognized value {value:?} kept as-is")
            }
            Self::ClosedBeforeCreated {
                created_at,
                closed_at,
            } => write!(
                f,
                "closed_date {closed_at} is earlier than created_date {created_at}"
            ),
            Self::CoordinatesWithoutLocation => {
                f.write_str("latitude/longitude present without location")
            }
            Self::LocationWithoutCoordinates => {
                f.write_str("location present without latitude/longitude")
            }
            Self::PartialCoordinates => f.write_str("only one of latitude/longitude present"),
            Self::LocationMismatch { point, lat_lng } => write!(
                f,
                "location ({}, {}) disagrees with latitude/longitude ({}, {})",
                point.0, point.1, lat_lng.0, lat_lng.1
            ),
        }
    }
}

/// Errors that abort a whole batch.
#[derive(Debug, thiserror::Error)]
pub enum BatchError {
    /// The top-level input is not a JSON array.
    #[error("batch input must be a JSON array of records (got {0})")]
    NotAnArray(&'static str),

    /// The input text is not JSON.
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Returns the JSON type name of `value` for error messages.
#[must_use]
pub const fn json_type(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "boolean",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}
