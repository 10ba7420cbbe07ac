//! Upstream column names of the 311 rodent feed.

pub const UNIQUE_KEY: &str = "unique_key";
pub const CREATED_DATE: &str = "created_date";
pub const CLOSED_DATE: &str = "closed_date";
pub const AGENCY: &str = "agency";
pub const AGENCY_NAME: &str = "agency_name";
pub const COMPLAINT_TYPE: &str = "complaint_type";
pub const DESCRIPTOR: &str = "descriptor";
pub const LOCATION_TYPE: &str = "location_type";
pub const INCIDENT_ZIP: &str = "incident_zip";
pub const INCIDENT_ADDRESS: &str = "incident_address";
pub const STREET_NAME: &str = "street_name";
pub const CROSS_STREET_1: &str = "cross_street_1";
pub const CROSS_STREET_2: &str = "cross_street_2";
pub const INTERSECTION_STREET_1: &str = "intersection_street_1";
pub const INTERSECTION_STREET_2: &str = "intersection_street_2";
pub const ADDRESS_TYPE: &str = "address_type";
pub const CITY: &str = "city";
pub const LANDMARK: &str = "landmark";
pub const FACILITY_TYPE: &str = "facility_type";
pub const STATUS: &str = "status";
pub const DUE_DATE: &str = "due_date";
pub const RESOLUTION_ACTION_UPDATED_DATE: &str = "resolution_action_updated_date";
pub const COMMUNITY_BOARD: &str = "community_board";
pub const BOROUGH: &str = "borough";
pub const X_COORDINATE_STATE_PLANE: &str = "x_coordinate_state_plane";
pub const Y_COORDINATE_STATE_PLANE: &str = "y_coordinate_state_plane";
pub const PARK_FACILITY_NAME: &str = "park_facility_name";
pub const PARK_BOROUGH: &str = "park_borough";
pub const VEHICLE_TYPE: &str = "vehicle_type";
pub const TAXI_COMPANY_BOROUGH: &str = "taxi_company_borough";
pub const TAXI_PICK_UP_LOCATION: &str = "taxi_pick_up_location";
pub const BRIDGE_HIGHWAY_NAME: &str = "bridge_highway_name";
pub const BRIDGE_HIGHWAY_DIRECTION: &str = "bridge_highway_direction";
pub const ROAD_RAMP: &str = "road_ramp";
pub const BRIDGE_HIGHWAY_SEGMENT: &str = "bridge_highway_segment";
pub const LATITUDE: &str = "latitude";
pub const LONGITUDE: &str = "longitude";
pub const LOCATION: &str = "location";

/// Undocumented duplicate of [`X_COORDINATE_STATE_PLANE`] present in the
/// live data.
pub const X_COORDINATE_STATE_PLANE_ALT: &str = "x_coordinate_state_plane_";
/// Undocumented duplicate of [`Y_COORDINATE_STATE_PLANE`] present in the
/// live data.
pub const Y_COORDINATE_STATE_PLANE_ALT: &str = "y_coordinate_state_plane_";

// ── Portal-generated computed-region columns ─────────────────────────
pub const COMPUTED_REGION_EFSH_H5XI: &str = ":@computed_region_efsh_h5xi";
pub const COMPUTED_REGION_F5DN_YRER: &str = ":@computed_region_f5dn_yrer";
pub const COMPUTED_REGION_YEJI_BK3Q: &str = ":@computed_region_yeji_bk3q";
pub const COMPUTED_REGION_92FQ_4B7Q: &str = ":@computed_region_92fq_4b7q";
pub const COMPUTED_REGION_SBQJ_ENIH: &str = ":@computed_region_sbqj_enih";

/// The computed-region columns the schema knows about. Any other
/// `:@computed_region_*` column is treated like any other unknown column.
pub const COMPUTED_REGIONS: &[&str] = &[
    COMPUTED_REGION_EFSH_H5XI,
    COMPUTED_REGION_F5DN_YRER,
    COMPUTED_REGION_YEJI_BK3Q,
    COMPUTED_REGION_92FQ_4B7Q,
    COMPUTED_REGION_SBQJ_ENIH,
];

/// Sentinel the feed occasionally sends in place of a zip code.
pub const NOT_AVAILABLE: &str = "N/A";

/// Every named column the schema knows about, apart from
/// [`COMPUTED_REGIONS`].
pub const KNOWN: &[&str] = &[
    UNIQUE_KEY,
    CREATED_DATE,
    CLOSED_DATE,
    AGENCY,
    AGENCY_NAME,
    COMPLAINT_TYPE,
    DESCRIPTOR,
    LOCATION_TYPE,
    INCIDENT_ZIP,
    INCIDENT_ADDRESS,
    STREET_NAME,
    CROSS_STREET_1,
    CROSS_STREET_2,
    INTERSECTION_STREET_1,
    INTERSECTION_STREET_2,
    ADDRESS_TYPE,
    CITY,
    LANDMARK,
    FACILITY_TYPE,
    STATUS,
    DUE_DATE,
    RESOLUTION_ACTION_UPDATED_DATE,
    COMMUNITY_BOARD,
    BOROUGH,
    X_COORDINATE_STATE_PLANE,
    Y_COORDINATE_STATE_PLANE,
    PARK_FACILITY_NAME,
    PARK_BOROUGH,
    VEHICLE_TYPE,
    TAXI_COMPANY_BOROUGH,
    TAXI_PICK_UP_LOCATION,
    BRIDGE_HIGHWAY_NAME,
    BRIDGE_HIGHWAY_DIRECTION,
    ROAD_RAMP,
    BRIDGE_HIGHWAY_SEGMENT,
    LATITUDE,
    LONGITUDE,
    LOCATION,
    X_COORDINATE_STATE_PLANE_ALT,
    Y_COORDINATE_STATE_PLANE_ALT,
];

/// Returns `true` if `key` is one of the known computed-region columns.
#[must_use]
pub fn is_computed_region(key: &str) -> bool {
    COMPUTED_REGIONS.contains(&key)
}

/// Returns `true` if `key` is a column the schema recognizes.
#[must_use]
pub fn is_known(key: &str) -> bool {
    KNOWN.contains(&key) || is_computed_region(key)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recognizes_only_listed_computed_regions() {
        assert!(is_known(":@computed_region_92fq_4b7q"));
        assert!(is_computed_region(":@computed_region_sbqj_enih"));
        assert!(!is_known(":@computed_region_new_one"));
        assert!(!is_computed_region(":@computed_region_new_one"));
        assert!(!is_known("computed_region_92fq_4b7q"));
    }

    #[test]
    fn recognizes_undocumented_state_plane_columns() {
        assert!(is_known("x_coordinate_state_plane_"));
        assert!(!is_known("bbl"));
    }
}
