#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Normalized rat sighting record and the types it is built from.
//!
//! A [`RatSightingRecord`] is one NYC 311 service request from the rodent
//! complaint feed after coercion: numbers are numbers, timestamps are
//! [`DateTime<Utc>`], and categorical columns are [`Categorical`] values that
//! tolerate vocabulary drift.

pub mod category;
pub mod fields;

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use strum_macros::{AsRefStr, Display, EnumString};

pub use category::{
    AddressType, Agency, AgencyName, Borough, Categorical, ComplaintType, Descriptor, ParkBorough,
    Status,
};

/// Timestamp format used by the Socrata API for floating timestamps.
///
/// The fractional part is only rendered when non-zero, so formatting and
/// re-parsing a value is lossless.
pub const SOCRATA_DATE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";

/// How strictly raw records are checked against the schema.
#[derive(
    Debug,
    Default,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum ValidationMode {
    /// Unknown keys and out-of-vocabulary categorical values reject the
    /// record.
    Strict,
    /// Unknown keys pass through verbatim and out-of-vocabulary categorical
    /// values only produce warnings.
    #[default]
    Lenient,
}

/// Tag of a [`Point`]. The feed only ever emits `"Point"`.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PointKind {
    #[default]
    Point,
}

/// A `GeoJSON`-style point: `{"type": "Point", "coordinates": [lng, lat]}`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Point {
    /// Always [`PointKind::Point`].
    #[serde(rename = "type")]
    pub kind: PointKind,
    /// `[longitude, latitude]` in WGS84.
    pub coordinates: [f64; 2],
}

impl Point {
    /// Creates a point from a longitude/latitude pair.
    #[must_use]
    pub const fn new(longitude: f64, latitude: f64) -> Self {
        Self {
            kind: PointKind::Point,
            coordinates: [longitude, latitude],
        }
    }

    /// Longitude, the first coordinate.
    #[must_use]
    pub const fn longitude(&self) -> f64 {
        self.coordinates[0]
    }

    /// Latitude, the second coordinate.
    #[must_use]
    pub const fn latitude(&self) -> f64 {
        self.coordinates[1]
    }
}

/// One rat sighting service request after validation.
///
/// Field names follow Rust conventions; [`RatSightingRecord::to_raw`] maps
/// them back to the upstream column names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RatSightingRecord {
    /// Upstream `unique_key`. Natural key of the record.
    pub id: i64,
    /// Upstream `created_date`. Required.
    pub created_at: DateTime<Utc>,
    /// Upstream `closed_date`.
    pub closed_at: Option<DateTime<Utc>>,
    /// Responding agency acronym (`"DOHMH"`).
    pub agency: Option<Categorical<Agency>>,
    pub agency_name: Option<Categorical<AgencyName>>,
    pub complaint_type: Option<Categorical<ComplaintType>>,
    pub descriptor: Option<Categorical<Descriptor>>,
    /// Kind of premises, e.g. `"3+ Family Apt. Building"`.
    pub location_type: Option<String>,
    /// `None` when upstream sent nothing or the `"N/A"` sentinel.
    pub zip_code: Option<u32>,
    /// Upstream `incident_address`.
    pub address: Option<String>,
    pub street_name: Option<String>,
    pub cross_street_1: Option<String>,
    pub cross_street_2: Option<String>,
    pub intersection_street_1: Option<String>,
    pub intersection_street_2: Option<String>,
    pub address_type: Option<Categorical<AddressType>>,
    pub city: Option<String>,
    pub landmark: Option<String>,
    pub facility_type: Option<String>,
    /// Request lifecycle state.
    pub status: Option<Categorical<Status>>,
    /// When the agency is expected to update the request (SLA based).
    pub due_date: Option<DateTime<Utc>>,
    /// Upstream `resolution_action_updated_date`.
    pub last_updated_at: Option<DateTime<Utc>>,
    /// Community district, e.g. `"04 BROOKLYN"`.
    pub community_board: Option<String>,
    /// Borough of the incident location.
    pub borough: Option<Categorical<Borough>>,
    /// New York State Plane (Long Island) X coordinate, in feet.
    pub x_coordinate_state_plane: Option<f64>,
    /// New York State Plane (Long Island) Y coordinate, in feet.
    pub y_coordinate_state_plane: Option<f64>,
    /// Required upstream, but usually the empty string.
    pub park_facility_name: String,
    pub park_borough: Option<Categorical<ParkBorough>>,
    pub vehicle_type: Option<String>,
    pub taxi_company_borough: Option<String>,
    pub taxi_pick_up_location: Option<String>,
    pub bridge_highway_name: Option<String>,
    pub bridge_highway_direction: Option<String>,
    pub road_ramp: Option<String>,
    pub bridge_highway_segment: Option<String>,
    /// WGS84 latitude column.
    pub latitude: Option<f64>,
    /// WGS84 longitude column.
    pub longitude: Option<f64>,
    /// The same position as a point; may disagree with the scalar columns.
    pub location: Option<Point>,
    /// Opaque `:@computed_region_*` identifiers, keyed by the full column
    /// name.
    pub computed_regions: BTreeMap<String, i64>,
    /// Unknown columns retained verbatim in lenient mode.
    pub extra: Map<String, Value>,
}

impl RatSightingRecord {
    /// Returns `true` if the record carries a usable coordinate, either as
    /// a point or as a latitude/longitude pair.
    #[must_use]
    pub const fn has_coordinates(&self) -> bool {
        self.location.is_some() || (self.latitude.is_some() && self.longitude.is_some())
    }

    /// Returns `(latitude, longitude)`, preferring the point when present.
    #[must_use]
    pub fn lat_lng(&self) -> Option<(f64, f64)> {
        self.location
            .map(|point| (point.latitude(), point.longitude()))
            .or_else(|| Some((self.latitude?, self.longitude?)))
    }

    /// Renders the record back into the upstream row shape.
    ///
    /// Absent optional fields are omitted. Validating the returned object
    /// yields a record equal to `self`.
    #[must_use]
    pub fn to_raw(&self) -> Map<String, Value> {
        let mut raw = Map::new();

        raw.insert(fields::UNIQUE_KEY.to_string(), Value::from(self.id));
        raw.insert(
            fields::CREATED_DATE.to_string(),
            Value::from(format_date(&self.created_at)),
        );
        put_date(&mut raw, fields::CLOSED_DATE, self.closed_at.as_ref());
        put_category(&mut raw, fields::AGENCY, self.agency.as_ref());
        put_category(&mut raw, fields::AGENCY_NAME, self.agency_name.as_ref());
        put_category(&mut raw, fields::COMPLAINT_TYPE, self.complaint_type.as_ref());
        put_category(&mut raw, fields::DESCRIPTOR, self.descriptor.as_ref());
        put_str(&mut raw, fields::LOCATION_TYPE, self.location_type.as_deref());
        if let Some(zip) = self.zip_code {
            raw.insert(fields::INCIDENT_ZIP.to_string(), Value::from(zip));
        }
        put_str(&mut raw, fields::INCIDENT_ADDRESS, self.address.as_deref());
        put_str(&mut raw, fields::STREET_NAME, self.street_name.as_deref());
        put_str(&mut raw, fields::CROSS_STREET_1, self.cross_street_1.as_deref());
        put_str(&mut raw, fields::CROSS_STREET_2, self.cross_street_2.as_deref());
        put_str(
            &mut raw,
            fields::INTERSECTION_STREET_1,
            self.intersection_street_1.as_deref(),
        );
        put_str(
            &mut raw,
            fields::INTERSECTION_STREET_2,
            self.intersection_street_2.as_deref(),
        );
        put_category(&mut raw, fields::ADDRESS_TYPE, self.address_type.as_ref());
        put_str(&mut raw, fields::CITY, self.city.as_deref());
        put_str(&mut raw, fields::LANDMARK, self.landmark.as_deref());
        put_str(&mut raw, fields::FACILITY_TYPE, self.facility_type.as_deref());
        put_category(&mut raw, fields::STATUS, self.status.as_ref());
        put_date(&mut raw, fields::DUE_DATE, self.due_date.as_ref());
        put_date(
            &mut raw,
            fields::RESOLUTION_ACTION_UPDATED_DATE,
            self.last_updated_at.as_ref(),
        );
        put_str(&mut raw, fields::COMMUNITY_BOARD, self.community_board.as_deref());
        put_category(&mut raw, fields::BOROUGH, self.borough.as_ref());
        put_f64(
            &mut raw,
            fields::X_COORDINATE_STATE_PLANE,
            self.x_coordinate_state_plane,
        );
        put_f64(
            &mut raw,
            fields::Y_COORDINATE_STATE_PLANE,
            self.y_coordinate_state_plane,
        );
        raw.insert(
            fields::PARK_FACILITY_NAME.to_string(),
            Value::from(self.park_facility_name.clone()),
        );
        put_category(&mut raw, fields::PARK_BOROUGH, self.park_borough.as_ref());
        put_str(&mut raw, fields::VEHICLE_TYPE, self.vehicle_type.as_deref());
        put_str(
            &mut raw,
            fields::TAXI_COMPANY_BOROUGH,
            self.taxi_company_borough.as_deref(),
        );
        put_str(
            &mut raw,
            fields::TAXI_PICK_UP_LOCATION,
            self.taxi_pick_up_location.as_deref(),
        );
        put_str(
            &mut raw,
            fields::BRIDGE_HIGHWAY_NAME,
            self.bridge_highway_name.as_deref(),
        );
        put_str(
            &mut raw,
            fields::BRIDGE_HIGHWAY_DIRECTION,
            self.bridge_highway_direction.as_deref(),
        );
        put_str(&mut raw, fields::ROAD_RAMP, self.road_ramp.as_deref());
        put_str(
            &mut raw,
            fields::BRIDGE_HIGHWAY_SEGMENT,
            self.bridge_highway_segment.as_deref(),
        );
        put_f64(&mut raw, fields::LATITUDE, self.latitude);
        put_f64(&mut raw, fields::LONGITUDE, self.longitude);
        if let Some(point) = &self.location
            && let Ok(value) = serde_json::to_value(point)
        {
            raw.insert(fields::LOCATION.to_string(), value);
        }
        for (key, id) in &self.computed_regions {
            raw.insert(key.clone(), Value::from(*id));
        }
        for (key, value) in &self.extra {
            raw.insert(key.clone(), value.clone());
        }

        raw
    }
}

fn format_date(date: &DateTime<Utc>) -> String {
    date.format(SOCRATA_DATE_FORMAT).to_string()
}

fn put_str(raw: &mut Map<String, Value>, key: &str, value: Option<&str>) {
    if let Some(value) = value {
        raw.insert(key.to_string(), Value::from(value));
    }
}

fn put_f64(raw: &mut Map<String, Value>, key: &str, value: Option<f64>) {
    if let Some(value) = value {
        raw.insert(key.to_string(), Value::from(value));
    }
}

fn put_date(raw: &mut Map<String, Value>, key: &str, value: Option<&DateTime<Utc>>) {
    if let Some(date) = value {
        raw.insert(key.to_string(), Value::from(format_date(date)));
    }
}

fn put_category<T: AsRef<str>>(
    raw: &mut Map<String, Value>,
    key: &str,
    value: Option<&Categorical<T>>,
) {
    if let Some(value) = value {
        raw.insert(key.to_string(), Value::from(value.as_str()));
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    fn sample() -> RatSightingRecord {
        let created_at = NaiveDate::from_ymd_opt(2023, 1, 5)
            .unwrap()
            .and_hms_milli_opt(9, 30, 0, 250)
            .unwrap()
            .and_utc();
        RatSightingRecord {
            id: 56_789_012,
            created_at,
            closed_at: None,
            agency: Some(Categorical::Known(Agency::Dohmh)),
            agency_name: None,
            complaint_type: Some(Categorical::Known(ComplaintType::Rodent)),
            descriptor: Some(Categorical::Known(Descriptor::RatSighting)),
            location_type: Some("3+ Family Apt. Building".to_string()),
            zip_code: Some(11_221),
            address: Some("100 MALCOLM X BOULEVARD".to_string()),
            street_name: None,
            cross_street_1: None,
            cross_street_2: None,
            intersection_street_1: None,
            intersection_street_2: None,
            address_type: Some(Categorical::Known(AddressType::Address)),
            city: Some("BROOKLYN".to_string()),
            landmark: None,
            facility_type: None,
            status: Some(Categorical::Unrecognized("Started".to_string())),
            due_date: None,
            last_updated_at: None,
            community_board: None,
            borough: Some(Categorical::Known(Borough::Brooklyn)),
            x_coordinate_state_plane: None,
            y_coordinate_state_plane: None,
            park_facility_name: String::new(),
            park_borough: Some(Categorical::Known(ParkBorough::Blank)),
            vehicle_type: None,
            taxi_company_borough: None,
            taxi_pick_up_location: None,
            bridge_highway_name: None,
            bridge_highway_direction: None,
            road_ramp: None,
            bridge_highway_segment: None,
            latitude: Some(40.69),
            longitude: Some(-73.93),
            location: Some(Point::new(-73.93, 40.69)),
            computed_regions: BTreeMap::from([(":@computed_region_efsh_h5xi".to_string(), 17_614)]),
            extra: Map::new(),
        }
    }

    #[test]
    fn point_serializes_with_type_tag() {
        let value = serde_json::to_value(Point::new(-73.9, 40.7)).unwrap();
        assert_eq!(
            value,
            serde_json::json!({"type": "Point", "coordinates": [-73.9, 40.7]})
        );
    }

    #[test]
    fn point_rejects_extra_keys() {
        let value = serde_json::json!({"type": "Point", "coordinates": [1.0, 2.0], "crs": 4326});
        assert!(serde_json::from_value::<Point>(value).is_err());
    }

    #[test]
    fn to_raw_uses_upstream_column_names() {
        let raw = sample().to_raw();
        assert_eq!(raw["unique_key"], serde_json::json!(56_789_012));
        assert_eq!(raw["created_date"], serde_json::json!("2023-01-05T09:30:00.250"));
        assert_eq!(raw["incident_zip"], serde_json::json!(11_221));
        assert_eq!(raw["status"], serde_json::json!("Started"));
        assert_eq!(raw["park_borough"], serde_json::json!(""));
        assert_eq!(raw[":@computed_region_efsh_h5xi"], serde_json::json!(17_614));
        assert!(!raw.contains_key("closed_date"));
    }

    #[test]
    fn whole_second_dates_render_without_fraction() {
        let mut record = sample();
        record.created_at = NaiveDate::from_ymd_opt(2023, 1, 5)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
            .and_utc();
        assert_eq!(
            record.to_raw()["created_date"],
            serde_json::json!("2023-01-05T00:00:00")
        );
    }

    #[test]
    fn lat_lng_prefers_point() {
        let mut record = sample();
        record.latitude = Some(1.0);
        assert_eq!(record.lat_lng(), Some((40.69, -73.93)));

        record.location = None;
        assert_eq!(record.lat_lng(), Some((1.0, -73.93)));
        assert!(record.has_coordinates());
    }

    #[test]
    fn parses_validation_mode() {
        assert_eq!("strict".parse::<ValidationMode>().unwrap(), ValidationMode::Strict);
        assert_eq!("Lenient".parse::<ValidationMode>().unwrap(), ValidationMode::Lenient);
        assert_eq!(ValidationMode::default(), ValidationMode::Lenient);
    }
}
