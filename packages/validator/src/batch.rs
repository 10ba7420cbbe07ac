//! Batch validation over a whole feed snapshot.
//!
//! Rows are validated independently: a malformed row is reported by index
//! and never affects its neighbours. Only a structurally invalid input (not
//! a JSON array) fails the batch as a whole.

use std::collections::BTreeMap;

use rat_map_sighting_models::{RatSightingRecord, ValidationMode};
use serde_json::Value;

use crate::{BatchError, ValidationError, ValidationWarning, json_type, validate_record};

/// Outcome of validating a batch.
///
/// `valid` and `errors` both preserve input order. Indices in `errors` and
/// `warnings` refer to positions in the input.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct BatchReport {
    pub valid: Vec<RatSightingRecord>,
    pub errors: Vec<(usize, ValidationError)>,
    pub warnings: Vec<(usize, ValidationWarning)>,
}

impl BatchReport {
    /// Number of input rows.
    #[must_use]
    pub fn total(&self) -> usize {
        self.valid.len() + self.errors.len()
    }

    /// Number of rejected rows.
    #[must_use]
    pub fn skipped(&self) -> usize {
        self.errors.len()
    }
}

/// Validates every row of a JSON array.
///
/// # Errors
///
/// Returns [`BatchError::NotAnArray`] if `raw` is not an array. Per-row
/// failures, including non-object elements, are reported in
/// [`BatchReport::errors`] instead.
pub fn validate_batch(raw: &Value, mode: ValidationMode) -> Result<BatchReport, BatchError> {
    let Value::Array(rows) = raw else {
        return Err(BatchError::NotAnArray(json_type(raw)));
    };
    Ok(validate_records(rows, mode))
}

/// Parses `json` and validates it with [`validate_batch`].
///
/// # Errors
///
/// Returns [`BatchError::Json`] if `json` is not valid JSON, or
/// [`BatchError::NotAnArray`] if it is not an array.
pub fn validate_batch_str(json: &str, mode: ValidationMode) -> Result<BatchReport, BatchError> {
    let raw: Value = serde_json::from_str(json)?;
    validate_batch(&raw, mode)
}

/// Validates a slice of rows. Never short-circuits.
#[must_use]
pub fn validate_records(rows: &[Value], mode: ValidationMode) -> BatchReport {
    let mut report = BatchReport {
        valid: Vec::with_capacity(rows.len()),
        ..BatchReport::default()
    };

    for (index, row) in rows.iter().enumerate() {
        match validate_record(row, mode) {
            Ok(validated) => {
                report
                    .warnings
                    .extend(validated.warnings.into_iter().map(|w| (index, w)));
                report.valid.push(validated.record);
            }
            Err(e) => {
                log::debug!("Rejected row {index}: {e}");
                report.errors.push((index, e));
            }
        }
    }

    log::debug!(
        "Validated {} rows ({mode}): {} accepted, {} rejected, {} warnings",
        rows.len(),
        report.valid.len(),
        report.errors.len(),
        report.warnings.len()
    );

    report
}

/// Collapses records sharing an id into one.
///
/// The last occurrence wins, placed at the position where the id first
/// appeared.
#[must_use]
pub fn collapse_duplicates(records: Vec<RatSightingRecord>) -> Vec<RatSightingRecord> {
    let mut positions: BTreeMap<i64, usize> = BTreeMap::new();
    let mut collapsed: Vec<RatSightingRecord> = Vec::with_capacity(records.len());

    for record in records {
        if let Some(&pos) = positions.get(&record.id) {
            collapsed[pos] = record;
        } else {
            positions.insert(record.id, collapsed.len());
            collapsed.push(record);
        }
    }

    collapsed
}
