//! Loading previously saved feed snapshots from disk.
//!
//! Two formats are supported:
//!
//! * a JSON document as returned by the API (normally an array of row
//!   objects), returned untouched so that a non-array document can be
//!   rejected by batch validation
//! * a CSV export from the open-data portal, converted row by row into JSON
//!   objects keyed by the column headers
//!
//! CSV headers are normalized to the API's column names
//! (`"X Coordinate (State Plane)"` becomes `"x_coordinate_state_plane"`),
//! every cell is kept as a string with empty cells as `""`, and the portal's
//! `"(lat, lng)"` location text is converted into a `Point` object.

use std::io::Read;
use std::path::Path;

use rat_map_sighting_models::fields;
use serde_json::{Map, Value, json};

use crate::SourceError;

/// Loads a snapshot, choosing the format by file extension (`.csv` for
/// CSV, anything else is treated as JSON).
///
/// # Errors
///
/// Returns [`SourceError`] if the file cannot be read or parsed.
pub fn load_snapshot(path: &Path) -> Result<Value, SourceError> {
    let is_csv = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"));

    let file = std::fs::File::open(path)?;
    let reader = std::io::BufReader::new(file);

    if is_csv {
        let rows = parse_csv(reader)?;
        log::info!("Loaded {} CSV rows from {}", rows.len(), path.display());
        Ok(Value::Array(rows))
    } else {
        let value: Value = serde_json::from_reader(reader)?;
        log::info!("Loaded JSON snapshot from {}", path.display());
        Ok(value)
    }
}

/// Parses a CSV export into row objects.
///
/// # Errors
///
/// Returns [`SourceError::Csv`] on malformed CSV, or
/// [`SourceError::Response`] if there is no header row.
pub fn parse_csv<R: Read>(input: R) -> Result<Vec<Value>, SourceError> {
    let mut reader = csv::ReaderBuilder::new().flexible(true).from_reader(input);

    let headers: Vec<String> = reader.headers()?.iter().map(normalize_header).collect();
    if headers.iter().all(String::is_empty) {
        return Err(SourceError::Response {
            message: "CSV file contains no header row".to_string(),
        });
    }

    let mut rows = Vec::new();
    for result in reader.records() {
        let record = result?;

        let mut map = Map::new();
        for (i, header) in headers.iter().enumerate() {
            let cell = record.get(i).unwrap_or("").trim();
            let value = if header == fields::LOCATION {
                parse_location_text(cell).unwrap_or_else(|| Value::from(cell))
            } else {
                Value::from(cell)
            };
            map.insert(header.clone(), value);
        }
        rows.push(Value::Object(map));
    }

    Ok(rows)
}

/// Converts a portal column header into the API's column name.
///
/// Headers that already look like API names (including `:@computed_region_*`
/// columns) pass through unchanged.
#[must_use]
pub fn normalize_header(header: &str) -> String {
    let header = header.trim();
    if header.starts_with(':') {
        return header.to_string();
    }

    let mut normalized = String::with_capacity(header.len());
    let mut pending_separator = false;
    for c in header.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_separator && !normalized.is_empty() {
                normalized.push('_');
            }
            pending_separator = false;
            normalized.push(c.to_ascii_lowercase());
        } else {
            pending_separator = true;
        }
    }
    // Preserve a meaningful trailing underscore (`x_coordinate_state_plane_`).
    if header.ends_with('_') && !normalized.is_empty() {
        normalized.push('_');
    }
    normalized
}

/// Parses the portal's `"(40.6981, -73.9334)"` location text into a
/// `{"type": "Point", "coordinates": [lng, lat]}` object.
#[must_use]
pub fn parse_location_text(text: &str) -> Option<Value> {
    let inner = text.strip_prefix('(')?.strip_suffix(')')?;
    let (lat, lng) = inner.split_once(',')?;
    let lat = lat.trim().parse::<f64>().ok()?;
    let lng = lng.trim().parse::<f64>().ok()?;
    Some(json!({"type": "Point", "coordinates": [lng, lat]}))
}
