//! Socrata SODA API fetcher.
//!
//! Pages through a dataset with `$limit`, `$offset`, `$order`, and
//! `$where`, newest rows first, until a short page or the requested limit.

use crate::feed::{FeedDefinition, FetcherConfig};
use crate::{FetchOptions, SourceError, retry};

/// Borrowed view of the Socrata settings needed for one fetch.
pub struct SocrataConfig<'a> {
    /// Dataset resource URL.
    pub api_url: &'a str,
    /// Date column for ordering and `since` filtering.
    pub date_column: &'a str,
    /// Filter applied to every page.
    pub where_clause: Option<&'a str>,
    /// Label for log messages.
    pub label: &'a str,
    /// Page size for pagination.
    pub page_size: u64,
}

impl<'a> SocrataConfig<'a> {
    /// Extracts the Socrata settings from a feed definition.
    #[must_use]
    pub fn from_feed(feed: &'a FeedDefinition) -> Self {
        match &feed.fetcher {
            FetcherConfig::Socrata {
                api_url,
                date_column,
                where_clause,
                page_size,
            } => Self {
                api_url,
                date_column,
                where_clause: where_clause.as_deref(),
                label: &feed.name,
                page_size: *page_size,
            },
        }
    }
}

/// Builds the SODA query parameters for one page.
#[must_use]
pub fn page_params(
    config: &SocrataConfig<'_>,
    options: &FetchOptions,
    offset: u64,
    page_limit: u64,
) -> Vec<(&'static str, String)> {
    let mut filters: Vec<String> = Vec::new();
    if let Some(clause) = config.where_clause {
        filters.push(format!("({clause})"));
    }
    if let Some(since) = &options.since {
        let since_str = since.format("%Y-%m-%dT%H:%M:%S").to_string();
        filters.push(format!("{} > '{since_str}'", config.date_column));
    }

    let mut params = vec![
        ("$limit", page_limit.to_string()),
        ("$offset", offset.to_string()),
        ("$order", format!("{} DESC", config.date_column)),
    ];
    if !filters.is_empty() {
        params.push(("$where", filters.join(" AND ")));
    }
    params
}

/// Fetches all matching rows from a Socrata dataset.
///
/// Rows are returned untyped and in API order.
///
/// # Errors
///
/// Returns [`SourceError`] if a request fails after retries or a page is
/// not a JSON array.
pub async fn fetch_socrata(
    config: &SocrataConfig<'_>,
    options: &FetchOptions,
) -> Result<Vec<serde_json::Value>, SourceError> {
    let client = reqwest::Client::new();
    let mut all_records: Vec<serde_json::Value> = Vec::new();
    let mut offset: u64 = 0;
    let fetch_limit = options.limit.unwrap_or(u64::MAX);

    loop {
        let remaining = fetch_limit.saturating_sub(offset);
        if remaining == 0 {
            break;
        }
        let page_limit = remaining.min(config.page_size);
        let params = page_params(config, options, offset, page_limit);

        log::info!(
            "Fetching {} data: offset={offset}, limit={page_limit}",
            config.label
        );
        let body = retry::send_json(&options.retry, || {
            let request = client.get(config.api_url).query(&params);
            match &options.app_token {
                Some(token) => request.header("X-App-Token", token),
                None => request,
            }
        })
        .await?;

        let serde_json::Value::Array(records) = body else {
            return Err(SourceError::Response {
                message: format!(
                    "{} returned a non-array page at offset {offset}",
                    config.label
                ),
            });
        };

        let count = records.len() as u64;
        if count == 0 {
            break;
        }

        all_records.extend(records);
        offset += count;

        if count < page_limit {
            break;
        }
    }

    log::info!(
        "Downloaded {} {} records total",
        all_records.len(),
        config.label
    );

    Ok(all_records)
}

/// Fetches all rows of `feed`.
///
/// # Errors
///
/// See [`fetch_socrata`].
pub async fn fetch_feed(
    feed: &FeedDefinition,
    options: &FetchOptions,
) -> Result<Vec<serde_json::Value>, SourceError> {
    fetch_socrata(&SocrataConfig::from_feed(feed), options).await
}
