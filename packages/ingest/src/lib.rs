#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Library for turning raw rat sighting rows into a validated, deduplicated
//! record set.
//!
//! Rows come from [`rat_map_source`] (live API or a saved snapshot), go
//! through [`rat_map_validator`], and end up in an [`IngestReport`] that the
//! CLI writes out and summarizes.

use std::collections::BTreeMap;
use std::path::Path;
use std::time::Instant;

use chrono::{DateTime, Utc};
use rat_map_sighting_models::{RatSightingRecord, ValidationMode};
use rat_map_source::feed::FeedDefinition;
use rat_map_source::{FetchOptions, SourceError, snapshot, socrata};
use rat_map_validator::{
    BatchError, ValidationError, ValidationWarning, collapse_duplicates, validate_batch,
};
use serde::Serialize;
use serde_json::Value;

/// Errors that stop an ingestion run.
#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    /// Rows could not be obtained (feed unreachable, unreadable file).
    #[error(transparent)]
    Source(#[from] SourceError),

    /// The input is not a batch of rows at all.
    #[error(transparent)]
    Batch(#[from] BatchError),

    /// Writing output failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serializing output failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result of ingesting one batch.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct IngestReport {
    /// Accepted records, one per id, in first-seen order.
    pub records: Vec<RatSightingRecord>,
    /// Rejected rows by input index.
    pub rejected: Vec<(usize, ValidationError)>,
    /// Warnings on accepted rows by input index.
    pub warnings: Vec<(usize, ValidationWarning)>,
    /// Accepted rows dropped because a later row had the same id.
    pub duplicates_collapsed: usize,
}

/// Aggregate statistics over an [`IngestReport`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IngestSummary {
    /// Input rows, including rejected rows and collapsed duplicates.
    pub total_rows: usize,
    pub accepted: usize,
    pub rejected: usize,
    pub warnings: usize,
    pub duplicates_collapsed: usize,
    /// Accepted records by borough; records without one count as `"(none)"`.
    pub by_borough: BTreeMap<String, usize>,
    pub by_status: BTreeMap<String, usize>,
    /// `None` when no record was accepted.
    pub earliest_created_at: Option<DateTime<Utc>>,
    pub latest_created_at: Option<DateTime<Utc>>,
    /// Accepted records with a point or a latitude/longitude pair.
    pub with_coordinates: usize,
}

const NONE_BUCKET: &str = "(none)";

impl IngestReport {
    /// Number of input rows this report covers.
    #[must_use]
    pub fn total_rows(&self) -> usize {
        self.records.len() + self.duplicates_collapsed + self.rejected.len()
    }

    /// Computes summary statistics over the accepted records.
    #[must_use]
    pub fn summary(&self) -> IngestSummary {
        let mut by_borough: BTreeMap<String, usize> = BTreeMap::new();
        let mut by_status: BTreeMap<String, usize> = BTreeMap::new();

        for record in &self.records {
            let borough = record
                .borough
                .as_ref()
                .map_or(NONE_BUCKET, |b| b.as_str());
            *by_borough.entry(borough.to_string()).or_default() += 1;

            let status = record.status.as_ref().map_or(NONE_BUCKET, |s| s.as_str());
            *by_status.entry(status.to_string()).or_default() += 1;
        }

        IngestSummary {
            total_rows: self.total_rows(),
            accepted: self.records.len(),
            rejected: self.rejected.len(),
            warnings: self.warnings.len(),
            duplicates_collapsed: self.duplicates_collapsed,
            by_borough,
            by_status,
            earliest_created_at: self.records.iter().map(|r| r.created_at).min(),
            latest_created_at: self.records.iter().map(|r| r.created_at).max(),
            with_coordinates: self
                .records
                .iter()
                .filter(|r| r.lat_lng().is_some())
                .count(),
        }
    }
}

/// Validates a batch of raw rows and collapses duplicate ids.
///
/// Rejected rows are logged and skipped; they never abort the run.
///
/// # Errors
///
/// Returns [`IngestError::Batch`] if `rows` is not a JSON array.
pub fn ingest(rows: &Value, mode: ValidationMode) -> Result<IngestReport, IngestError> {
    let start = Instant::now();
    let batch = validate_batch(rows, mode)?;

    for (index, error) in &batch.errors {
        log::warn!("Skipping row {index}: {error}");
    }
    for (index, warning) in &batch.warnings {
        log::debug!("Row {index}: {warning}");
    }

    let accepted = batch.valid.len();
    let records = collapse_duplicates(batch.valid);
    let duplicates_collapsed = accepted - records.len();

    log::info!(
        "Ingested {} rows ({mode}) in {:.2}s: {} accepted, {} skipped, {} warnings, {duplicates_collapsed} duplicates collapsed",
        accepted + batch.errors.len(),
        start.elapsed().as_secs_f64(),
        records.len(),
        batch.errors.len(),
        batch.warnings.len(),
    );

    Ok(IngestReport {
        records,
        rejected: batch.errors,
        warnings: batch.warnings,
        duplicates_collapsed,
    })
}

/// Loads a saved snapshot (JSON or CSV) and ingests it.
///
/// # Errors
///
/// Returns [`IngestError`] if the file cannot be loaded or is not a batch.
pub fn ingest_file(path: &Path, mode: ValidationMode) -> Result<IngestReport, IngestError> {
    let rows = snapshot::load_snapshot(path)?;
    ingest(&rows, mode)
}

/// Fetches the live feed and ingests the rows.
///
/// # Errors
///
/// Returns [`IngestError::Source`] if the feed is unreachable.
pub async fn fetch_and_ingest(
    feed: &FeedDefinition,
    options: &FetchOptions,
    mode: ValidationMode,
) -> Result<IngestReport, IngestError> {
    log::info!("Fetching feed: {} ({})", feed.name(), feed.id());
    let rows = socrata::fetch_feed(feed, options).await?;
    ingest(&Value::Array(rows), mode)
}

/// Output shape for accepted records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Normalized records with typed fields.
    #[default]
    Normalized,
    /// Upstream column names, re-validatable as input.
    Raw,
}

/// Serializes accepted records as a pretty-printed JSON array.
///
/// # Errors
///
/// Returns [`IngestError::Json`] if serialization fails.
pub fn records_to_json(
    records: &[RatSightingRecord],
    format: OutputFormat,
) -> Result<String, IngestError> {
    let json = match format {
        OutputFormat::Normalized => serde_json::to_string_pretty(records)?,
        OutputFormat::Raw => {
            let raw: Vec<Value> = records
                .iter()
                .map(|r| Value::Object(r.to_raw()))
                .collect();
            serde_json::to_string_pretty(&raw)?
        }
    };
    Ok(json)
}

/// Writes the run summary to `path` as pretty-printed JSON.
///
/// # Errors
///
/// Returns [`IngestError`] if serialization or the write fails.
pub fn write_summary(path: &Path, summary: &IngestSummary) -> Result<(), IngestError> {
    std::fs::write(path, serde_json::to_string_pretty(summary)?)?;
    log::info!("Wrote summary to {}", path.display());
    Ok(())
}

/// Writes accepted records to `path`.
///
/// # Errors
///
/// Returns [`IngestError`] if serialization or the write fails.
pub fn write_records(
    path: &Path,
    records: &[RatSightingRecord],
    format: OutputFormat,
) -> Result<(), IngestError> {
    let json = records_to_json(records, format)?;
    std::fs::write(path, json)?;
    log::info!("Wrote {} records to {}", records.len(), path.display());
    Ok(())
}
