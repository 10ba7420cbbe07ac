#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Where raw rat sighting rows come from.
//!
//! The feed is described by a [`FeedDefinition`](feed::FeedDefinition)
//! loaded from embedded TOML. Rows are either fetched live from the Socrata
//! API ([`socrata::fetch_socrata`]) or loaded from a previously saved JSON
//! or CSV snapshot ([`snapshot::load_snapshot`]). Either way the result is
//! untyped [`serde_json::Value`] rows; validation happens downstream.

pub mod feed;
pub mod retry;
pub mod snapshot;
pub mod socrata;

use chrono::{DateTime, Utc};

use crate::retry::RetryPolicy;

/// Errors that can occur while obtaining raw feed rows.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// HTTP request failed.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O error (file read/write).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV parsing failed.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// The server answered, but not with something usable.
    #[error("Unexpected response: {message}")]
    Response {
        /// Description of what went wrong.
        message: String,
    },

    /// A feed definition could not be loaded.
    #[error("Invalid feed definition: {message}")]
    Config {
        /// Description of what went wrong.
        message: String,
    },
}

/// Configuration for fetching rows from the live feed.
#[derive(Debug, Clone, Default)]
pub struct FetchOptions {
    /// Only fetch records created after this timestamp.
    pub since: Option<DateTime<Utc>>,
    /// Maximum number of records to fetch.
    pub limit: Option<u64>,
    /// Socrata application token, sent as `X-App-Token`.
    pub app_token: Option<String>,
    /// Retry behaviour for transient HTTP failures.
    pub retry: RetryPolicy,
}
