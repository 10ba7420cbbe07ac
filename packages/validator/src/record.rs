//! Single-record validation.

use std::collections::BTreeMap;
use std::str::FromStr;

use rat_map_sighting_models::fields;
use rat_map_sighting_models::{Categorical, RatSightingRecord, ValidationMode};
use serde_json::{Map, Value};
use strum::VariantNames;

use crate::consistency;
use crate::{FieldIssue, IssueKind, ValidationError, ValidationWarning, coerce, json_type};

/// An accepted record together with any non-fatal findings.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedRecord {
    pub record: RatSightingRecord,
    pub warnings: Vec<ValidationWarning>,
}

/// Validates and normalizes one raw feed row.
///
/// Every field is checked; the returned error lists all failing fields
/// rather than stopping at the first. The `"N/A"` placeholder in numeric
/// columns (notably `incident_zip`) is treated as absent before coercion in
/// both modes.
///
/// # Errors
///
/// Returns [`ValidationError::NotAnObject`] if `raw` is not a JSON object,
/// or [`ValidationError::Invalid`] if any field is missing, uncoercible, or
/// (in strict mode) unknown or out of vocabulary.
pub fn validate_record(
    raw: &Value,
    mode: ValidationMode,
) -> Result<ValidatedRecord, ValidationError> {
    let Value::Object(row) = raw else {
        return Err(ValidationError::NotAnObject(json_type(raw)));
    };

    let mut reader = RowReader::new(row, mode);

    // ── Identity & timestamps ────────────────────────────────────────
    let id = reader.required_integer(fields::UNIQUE_KEY);
    let created_at = reader.required_timestamp(fields::CREATED_DATE);
    let closed_at = reader.optional(fields::CLOSED_DATE, coerce::timestamp);
    let due_date = reader.optional(fields::DUE_DATE, coerce::timestamp);
    let last_updated_at = reader.optional(fields::RESOLUTION_ACTION_UPDATED_DATE, coerce::timestamp);

    // ── Categorical columns ──────────────────────────────────────────
    let agency = reader.category(fields::AGENCY);
    let agency_name = reader.category(fields::AGENCY_NAME);
    let complaint_type = reader.category(fields::COMPLAINT_TYPE);
    let descriptor = reader.category(fields::DESCRIPTOR);
    let address_type = reader.category(fields::ADDRESS_TYPE);
    let status = reader.category(fields::STATUS);
    let borough = reader.category(fields::BOROUGH);
    let park_borough = reader.category(fields::PARK_BOROUGH);

    // ── Location ─────────────────────────────────────────────────────
    let zip_code = reader.optional_number(fields::INCIDENT_ZIP, coerce::zip_code);
    let x_plane = reader.optional_number(fields::X_COORDINATE_STATE_PLANE, coerce::float);
    let y_plane = reader.optional_number(fields::Y_COORDINATE_STATE_PLANE, coerce::float);
    let x_plane_alt = reader.optional_number(fields::X_COORDINATE_STATE_PLANE_ALT, coerce::float);
    let y_plane_alt = reader.optional_number(fields::Y_COORDINATE_STATE_PLANE_ALT, coerce::float);
    let latitude = reader.optional_number(fields::LATITUDE, coerce::float);
    let longitude = reader.optional_number(fields::LONGITUDE, coerce::float);
    let location = reader.optional(fields::LOCATION, coerce::point);

    // ── Free text ────────────────────────────────────────────────────
    let park_facility_name = reader.required_text(fields::PARK_FACILITY_NAME);
    let location_type = reader.text(fields::LOCATION_TYPE);
    let address = reader.text(fields::INCIDENT_ADDRESS);
    let street_name = reader.text(fields::STREET_NAME);
    let cross_street_1 = reader.text(fields::CROSS_STREET_1);
    let cross_street_2 = reader.text(fields::CROSS_STREET_2);
    let intersection_street_1 = reader.text(fields::INTERSECTION_STREET_1);
    let intersection_street_2 = reader.text(fields::INTERSECTION_STREET_2);
    let city = reader.text(fields::CITY);
    let landmark = reader.text(fields::LANDMARK);
    let facility_type = reader.text(fields::FACILITY_TYPE);
    let community_board = reader.text(fields::COMMUNITY_BOARD);
    let vehicle_type = reader.text(fields::VEHICLE_TYPE);
    let taxi_company_borough = reader.text(fields::TAXI_COMPANY_BOROUGH);
    let taxi_pick_up_location = reader.text(fields::TAXI_PICK_UP_LOCATION);
    let bridge_highway_name = reader.text(fields::BRIDGE_HIGHWAY_NAME);
    let bridge_highway_direction = reader.text(fields::BRIDGE_HIGHWAY_DIRECTION);
    let road_ramp = reader.text(fields::ROAD_RAMP);
    let bridge_highway_segment = reader.text(fields::BRIDGE_HIGHWAY_SEGMENT);

    // ── Computed regions & unknown columns ───────────────────────────
    let mut computed_regions = BTreeMap::new();
    let mut extra = Map::new();
    for (key, value) in row {
        if fields::is_computed_region(key) {
            if let Some(region) = reader.optional_number(key, coerce::integer) {
                computed_regions.insert(key.clone(), region);
            }
        } else if !fields::is_known(key) {
            match mode {
                ValidationMode::Strict => reader.reject(key, IssueKind::UnknownField),
                ValidationMode::Lenient => {
                    extra.insert(key.clone(), value.clone());
                }
            }
        }
    }

    let RowReader {
        issues,
        mut warnings,
        ..
    } = reader;

    let (Some(id), Some(created_at), Some(park_facility_name)) =
        (id, created_at, park_facility_name)
    else {
        return Err(ValidationError::Invalid(issues));
    };
    if !issues.is_empty() {
        return Err(ValidationError::Invalid(issues));
    }

    let record = RatSightingRecord {
        id,
        created_at,
        closed_at,
        agency,
        agency_name,
        complaint_type,
        descriptor,
        location_type,
        zip_code,
        address,
        street_name,
        cross_street_1,
        cross_street_2,
        intersection_street_1,
        intersection_street_2,
        address_type,
        city,
        landmark,
        facility_type,
        status,
        due_date,
        last_updated_at,
        community_board,
        borough,
        x_coordinate_state_plane: x_plane.or(x_plane_alt),
        y_coordinate_state_plane: y_plane.or(y_plane_alt),
        park_facility_name,
        park_borough,
        vehicle_type,
        taxi_company_borough,
        taxi_pick_up_location,
        bridge_highway_name,
        bridge_highway_direction,
        road_ramp,
        bridge_highway_segment,
        latitude,
        longitude,
        location,
        computed_regions,
        extra,
    };

    warnings.extend(consistency::check(&record));

    Ok(ValidatedRecord { record, warnings })
}

/// Reads fields out of one raw row, collecting issues and warnings as it
/// goes so that a single pass reports every problem.
struct RowReader<'a> {
    row: &'a Map<String, Value>,
    mode: ValidationMode,
    issues: Vec<FieldIssue>,
    warnings: Vec<ValidationWarning>,
}

impl<'a> RowReader<'a> {
    const fn new(row: &'a Map<String, Value>, mode: ValidationMode) -> Self {
        Self {
            row,
            mode,
            issues: Vec::new(),
            warnings: Vec::new(),
        }
    }

    fn reject(&mut self, field: &str, kind: IssueKind) {
        self.issues.push(FieldIssue::new(field, kind));
    }

    /// Returns the value unless it is missing, `null`, or blank.
    fn present(&self, field: &str) -> Option<&'a Value> {
        self.row.get(field).filter(|v| !coerce::is_absent(v))
    }

    fn coerced<T>(
        &mut self,
        field: &str,
        value: &Value,
        coerce: impl FnOnce(&Value) -> Result<T, IssueKind>,
    ) -> Option<T> {
        match coerce(value) {
            Ok(coerced) => Some(coerced),
            Err(kind) => {
                self.reject(field, kind);
                None
            }
        }
    }

    fn optional<T>(
        &mut self,
        field: &str,
        coerce: impl FnOnce(&Value) -> Result<T, IssueKind>,
    ) -> Option<T> {
        let value = self.present(field)?;
        self.coerced(field, value, coerce)
    }

    /// Like [`Self::optional`], but `"N/A"` counts as absent.
    fn optional_number<T>(
        &mut self,
        field: &str,
        coerce: impl FnOnce(&Value) -> Result<T, IssueKind>,
    ) -> Option<T> {
        let value = self.present(field)?;
        if coerce::is_sentinel(value) {
            return None;
        }
        self.coerced(field, value, coerce)
    }

    fn required_integer(&mut self, field: &str) -> Option<i64> {
        match self.present(field) {
            Some(value) if !coerce::is_sentinel(value) => {
                self.coerced(field, value, coerce::integer)
            }
            _ => {
                self.reject(field, IssueKind::MissingRequiredField);
                None
            }
        }
    }

    fn required_timestamp(&mut self, field: &str) -> Option<chrono::DateTime<chrono::Utc>> {
        if let Some(value) = self.present(field) {
            self.coerced(field, value, coerce::timestamp)
        } else {
            self.reject(field, IssueKind::MissingRequiredField);
            None
        }
    }

    /// Free text is kept verbatim, including the empty string.
    fn text(&mut self, field: &str) -> Option<String> {
        let value = self.row.get(field).filter(|v| !v.is_null())?;
        self.coerced(field, value, coerce::text)
    }

    fn required_text(&mut self, field: &str) -> Option<String> {
        if self.row.get(field).is_none_or(Value::is_null) {
            self.reject(field, IssueKind::MissingRequiredField);
            return None;
        }
        self.text(field)
    }

    /// Classifies a categorical column.
    ///
    /// Out-of-vocabulary values are errors in strict mode and warnings in
    /// lenient mode. A blank value outside the vocabulary counts as absent.
    fn category<T>(&mut self, field: &str) -> Option<Categorical<T>>
    where
        T: FromStr + VariantNames,
    {
        let value = self.row.get(field).filter(|v| !v.is_null())?;
        let raw = self.coerced(field, value, coerce::text)?;
        let parsed = Categorical::<T>::parse(&raw);
        if parsed.is_known() {
            return Some(parsed);
        }
        if raw.trim().is_empty() {
            return None;
        }

        match self.mode {
            ValidationMode::Strict => {
                self.reject(
                    field,
                    IssueKind::EnumMismatch {
                        value: raw,
                        allowed: T::VARIANTS,
                    },
                );
                None
            }
            ValidationMode::Lenient => {
                self.warnings.push(ValidationWarning::EnumMismatch {
                    field: field.to_string(),
                    value: raw,
                });
                Some(parsed)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use rat_map_sighting_models::{Agency, Borough, ParkBorough, Point, Status};
    use serde_json::json;

    use super::*;
    use crate::Expected;

    fn minimal() -> Value {
        json!({
            "unique_key": "12345",
            "created_date": "2023-01-05T00:00:00",
            "incident_zip": "N/A",
            "park_facility_name": "",
            "status": "Open",
            "agency": "DOHMH"
        })
    }

    fn full() -> Value {
        json!({
            "unique_key": "59893919",
            "created_date": "2023-12-31T23:12:07.000",
            "closed_date": "2024-01-02T10:41:19.000",
            "agency": "DOHMH",
            "agency_name": "Department of Health and Mental Hygiene",
            "complaint_type": "Rodent",
            "descriptor": "Rat Sighting",
            "location_type": "3+ Family Apt. Building",
            "incident_zip": "11221",
            "incident_address": "1078 BUSHWICK AVENUE",
            "street_name": "BUSHWICK AVENUE",
            "cross_street_1": "GREENE AVENUE",
            "cross_street_2": "GATES AVENUE",
            "address_type": "ADDRESS",
            "city": "BROOKLYN",
            "status": "Closed",
            "resolution_action_updated_date": "2024-01-02T10:41:23.000",
            "community_board": "04 BROOKLYN",
            "borough": "BROOKLYN",
            "x_coordinate_state_plane": "1006849",
            "y_coordinate_state_plane": "190402",
            "park_facility_name": "Unspecified",
            "park_borough": "BROOKLYN",
            "latitude": "40.690214",
            "longitude": "-73.919434",
            "location": {"type": "Point", "coordinates": [-73.919434, 40.690214]},
            ":@computed_region_efsh_h5xi": "17614",
            ":@computed_region_f5dn_yrer": "55",
            ":@computed_region_yeji_bk3q": "2",
            ":@computed_region_92fq_4b7q": "42",
            ":@computed_region_sbqj_enih": "79"
        })
    }

    fn with(mut base: Value, key: &str, value: Value) -> Value {
        base.as_object_mut().unwrap().insert(key.to_string(), value);
        base
    }

    fn without(mut base: Value, key: &str) -> Value {
        base.as_object_mut().unwrap().remove(key);
        base
    }

    #[test]
    fn strict_accepts_minimal_row_with_zip_sentinel() {
        let validated = validate_record(&minimal(), ValidationMode::Strict).unwrap();
        let record = validated.record;
        assert_eq!(record.id, 12345);
        assert_eq!(record.zip_code, None);
        assert_eq!(record.status, Some(Categorical::Known(Status::Open)));
        assert_eq!(record.agency, Some(Categorical::Known(Agency::Dohmh)));
        assert_eq!(record.park_facility_name, "");
        assert_eq!(record.created_at.to_string(), "2023-01-05 00:00:00 UTC");
        assert!(validated.warnings.is_empty());
    }

    #[test]
    fn zip_sentinel_is_absent_in_both_modes() {
        for mode in [ValidationMode::Strict, ValidationMode::Lenient] {
            let record = validate_record(&minimal(), mode).unwrap().record;
            assert_eq!(record.zip_code, None, "mode {mode}");
        }
    }

    #[test]
    fn normalizes_full_row() {
        let validated = validate_record(&full(), ValidationMode::Strict).unwrap();
        let record = validated.record;
        assert_eq!(record.id, 59_893_919);
        assert_eq!(record.zip_code, Some(11221));
        assert_eq!(record.borough, Some(Categorical::Known(Borough::Brooklyn)));
        assert_eq!(
            record.park_borough,
            Some(Categorical::Known(ParkBorough::Brooklyn))
        );
        assert_eq!(record.x_coordinate_state_plane, Some(1_006_849.0));
        assert_eq!(record.location, Some(Point::new(-73.919_434, 40.690_214)));
        assert_eq!(record.computed_regions.len(), 5);
        assert_eq!(record.computed_regions[":@computed_region_efsh_h5xi"], 17614);
        assert!(record.extra.is_empty());
        assert!(validated.warnings.is_empty());
    }

    #[test]
    fn location_round_trips_exactly() {
        let raw = with(
            minimal(),
            "location",
            json!({"type": "Point", "coordinates": [-73.9, 40.7]}),
        );
        let record = validate_record(&raw, ValidationMode::Strict)
            .unwrap()
            .record;
        let point = record.location.unwrap();
        assert_eq!(point.coordinates, [-73.9, 40.7]);
        assert_eq!(
            serde_json::to_value(point).unwrap(),
            json!({"type": "Point", "coordinates": [-73.9, 40.7]})
        );
    }

    #[test]
    fn malformed_location_is_a_coercion_failure() {
        let raw = with(
            minimal(),
            "location",
            json!({"type": "Point", "coordinates": [-73.9]}),
        );
        let err = validate_record(&raw, ValidationMode::Lenient).unwrap_err();
        assert!(matches!(
            err.issue_for("location"),
            Some(IssueKind::CoercionFailure {
                expected: Expected::Point,
                ..
            })
        ));
    }

    #[test]
    fn missing_created_date_fails_in_both_modes() {
        for mode in [ValidationMode::Strict, ValidationMode::Lenient] {
            let err = validate_record(&without(minimal(), "created_date"), mode).unwrap_err();
            assert_eq!(
                err.issue_for("created_date"),
                Some(&IssueKind::MissingRequiredField)
            );
        }
    }

    #[test]
    fn null_required_field_is_missing() {
        let raw = with(minimal(), "park_facility_name", Value::Null);
        let err = validate_record(&raw, ValidationMode::Lenient).unwrap_err();
        assert_eq!(
            err.issue_for("park_facility_name"),
            Some(&IssueKind::MissingRequiredField)
        );
    }

    #[test]
    fn non_numeric_unique_key_is_a_coercion_failure() {
        let raw = with(minimal(), "unique_key", json!("abc"));
        let err = validate_record(&raw, ValidationMode::Lenient).unwrap_err();
        assert_eq!(
            err.issue_for("unique_key"),
            Some(&IssueKind::CoercionFailure {
                expected: Expected::Integer,
                value: "\"abc\"".to_string(),
            })
        );
    }

    #[test]
    fn unparsable_optional_date_is_an_error() {
        let raw = with(minimal(), "closed_date", json!("yesterday"));
        let err = validate_record(&raw, ValidationMode::Lenient).unwrap_err();
        assert!(err.issue_for("closed_date").is_some());
    }

    #[test]
    fn blank_optional_date_is_absent() {
        let raw = with(minimal(), "closed_date", json!(""));
        let record = validate_record(&raw, ValidationMode::Strict)
            .unwrap()
            .record;
        assert_eq!(record.closed_at, None);
    }

    #[test]
    fn collects_every_failing_field() {
        let raw = json!({
            "unique_key": "abc",
            "latitude": "north",
            "park_facility_name": ""
        });
        let err = validate_record(&raw, ValidationMode::Lenient).unwrap_err();
        let fields: Vec<&str> = err.issues().iter().map(|i| i.field.as_str()).collect();
        assert_eq!(fields, vec!["unique_key", "created_date", "latitude"]);
    }

    #[test]
    fn unknown_key_rejected_in_strict_mode() {
        let raw = with(minimal(), "bbl", json!("3032520001"));
        let err = validate_record(&raw, ValidationMode::Strict).unwrap_err();
        assert_eq!(err.issue_for("bbl"), Some(&IssueKind::UnknownField));
    }

    #[test]
    fn unknown_key_passes_through_in_lenient_mode() {
        let raw = with(minimal(), "bbl", json!("3032520001"));
        let record = validate_record(&raw, ValidationMode::Lenient)
            .unwrap()
            .record;
        assert_eq!(record.extra.get("bbl"), Some(&json!("3032520001")));
    }

    #[test]
    fn unlisted_computed_region_is_unknown_in_strict_mode() {
        let raw = with(minimal(), ":@computed_region_new_zone", json!("7"));
        let err = validate_record(&raw, ValidationMode::Strict).unwrap_err();
        assert_eq!(
            err.issue_for(":@computed_region_new_zone"),
            Some(&IssueKind::UnknownField)
        );
    }

    #[test]
    fn unlisted_computed_region_passes_through_verbatim_in_lenient_mode() {
        for value in [json!("7"), json!("abc")] {
            let raw = with(minimal(), ":@computed_region_new_zone", value.clone());
            let record = validate_record(&raw, ValidationMode::Lenient)
                .unwrap()
                .record;
            assert!(record.computed_regions.is_empty());
            assert_eq!(record.extra.get(":@computed_region_new_zone"), Some(&value));
            assert_eq!(
                record.to_raw().get(":@computed_region_new_zone"),
                Some(&value)
            );
        }
    }

    #[test]
    fn listed_computed_region_is_coerced_in_both_modes() {
        for mode in [ValidationMode::Strict, ValidationMode::Lenient] {
            let raw = with(minimal(), ":@computed_region_sbqj_enih", json!("79"));
            let record = validate_record(&raw, mode).unwrap().record;
            assert_eq!(record.computed_regions[":@computed_region_sbqj_enih"], 79);
            assert!(record.extra.is_empty());
        }
    }

    #[test]
    fn sentinel_in_optional_numeric_columns_is_absent() {
        for mode in [ValidationMode::Strict, ValidationMode::Lenient] {
            let raw = with(
                with(
                    with(minimal(), "latitude", json!("N/A")),
                    "x_coordinate_state_plane",
                    json!("N/A"),
                ),
                ":@computed_region_efsh_h5xi",
                json!("N/A"),
            );
            let record = validate_record(&raw, mode).unwrap().record;
            assert_eq!(record.latitude, None, "mode {mode}");
            assert_eq!(record.x_coordinate_state_plane, None, "mode {mode}");
            assert!(record.computed_regions.is_empty(), "mode {mode}");
        }
    }

    #[test]
    fn sentinel_unique_key_is_missing() {
        for mode in [ValidationMode::Strict, ValidationMode::Lenient] {
            let raw = with(minimal(), "unique_key", json!("N/A"));
            let err = validate_record(&raw, mode).unwrap_err();
            assert_eq!(
                err.issue_for("unique_key"),
                Some(&IssueKind::MissingRequiredField),
                "mode {mode}"
            );
        }
    }

    #[test]
    fn bad_computed_region_is_a_coercion_failure() {
        let raw = with(minimal(), ":@computed_region_efsh_h5xi", json!("x"));
        assert!(validate_record(&raw, ValidationMode::Lenient).is_err());
    }

    #[test]
    fn enum_mismatch_is_error_in_strict_and_warning_in_lenient() {
        let raw = with(minimal(), "status", json!("Started"));

        let err = validate_record(&raw, ValidationMode::Strict).unwrap_err();
        assert!(matches!(
            err.issue_for("status"),
            Some(IssueKind::EnumMismatch { value, allowed })
                if value == "Started" && allowed.contains(&"In Progress")
        ));

        let validated = validate_record(&raw, ValidationMode::Lenient).unwrap();
        assert_eq!(
            validated.record.status,
            Some(Categorical::Unrecognized("Started".to_string()))
        );
        assert_eq!(
            validated.warnings,
            vec![ValidationWarning::EnumMismatch {
                field: "status".to_string(),
                value: "Started".to_string(),
            }]
        );
    }

    #[test]
    fn empty_park_borough_is_known() {
        let raw = with(minimal(), "park_borough", json!(""));
        let record = validate_record(&raw, ValidationMode::Strict)
            .unwrap()
            .record;
        assert_eq!(record.park_borough, Some(Categorical::Known(ParkBorough::Blank)));
    }

    #[test]
    fn blank_borough_is_absent() {
        let raw = with(minimal(), "borough", json!(""));
        let record = validate_record(&raw, ValidationMode::Strict)
            .unwrap()
            .record;
        assert_eq!(record.borough, None);
    }

    #[test]
    fn undocumented_state_plane_columns_fill_in() {
        let raw = with(minimal(), "x_coordinate_state_plane_", json!("1006849"));
        let record = validate_record(&raw, ValidationMode::Strict)
            .unwrap()
            .record;
        assert_eq!(record.x_coordinate_state_plane, Some(1_006_849.0));
    }

    #[test]
    fn non_string_free_text_is_rejected() {
        let raw = with(minimal(), "community_board", json!(4));
        let err = validate_record(&raw, ValidationMode::Lenient).unwrap_err();
        assert!(err.issue_for("community_board").is_some());
    }

    #[test]
    fn non_object_is_rejected() {
        assert_eq!(
            validate_record(&json!([1, 2]), ValidationMode::Lenient).unwrap_err(),
            ValidationError::NotAnObject("array")
        );
    }

    #[test]
    fn revalidating_output_is_idempotent() {
        let drifted = with(with(full(), "status", json!("Started")), "bbl", json!(42));
        for (raw, mode) in [
            (full(), ValidationMode::Strict),
            (minimal(), ValidationMode::Strict),
            (drifted, ValidationMode::Lenient),
        ] {
            let first = validate_record(&raw, mode).unwrap().record;
            let again = validate_record(&Value::Object(first.to_raw()), mode)
                .unwrap()
                .record;
            assert_eq!(first, again);
        }
    }
}
