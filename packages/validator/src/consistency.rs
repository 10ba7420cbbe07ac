//! Cross-field checks on an already-coerced record.
//!
//! Upstream does not enforce these relationships, so violations are
//! reported as [`ValidationWarning`]s and never reject the record.

use rat_map_sighting_models::RatSightingRecord;

use crate::ValidationWarning;

/// Maximum disagreement, in degrees, tolerated between `location` and the
/// scalar latitude/longitude columns.
pub const COORDINATE_TOLERANCE: f64 = 1e-6;

/// Runs every cross-field check against `record`.
#[must_use]
pub fn check(record: &RatSightingRecord) -> Vec<ValidationWarning> {
    let mut warnings = Vec::new();

    if let Some(closed_at) = record.closed_at
        && closed_at < record.created_at
    {
        warnings.push(ValidationWarning::ClosedBeforeCreated {
            created_at: record.created_at,
            closed_at,
        });
    }

    match (record.latitude, record.longitude, record.location) {
        (Some(lat), Some(lng), Some(point)) => {
            if (point.latitude() - lat).abs() > COORDINATE_TOLERANCE
                || (point.longitude() - lng).abs() > COORDINATE_TOLERANCE
            {
                warnings.push(ValidationWarning::LocationMismatch {
                    point: (point.latitude(), point.longitude()),
                    lat_lng: (lat, lng),
                });
            }
        }
        (Some(_), Some(_), None) => warnings.push(ValidationWarning::CoordinatesWithoutLocation),
        (None, None, Some(_)) => warnings.push(ValidationWarning::LocationWithoutCoordinates),
        (Some(_), None, _) | (None, Some(_), _) => {
            warnings.push(ValidationWarning::PartialCoordinates);
        }
        (None, None, None) => {}
    }

    warnings
}
