//! Config-driven feed definition.
//!
//! [`FeedDefinition`] captures where the rat sighting rows live and how to
//! page through them. Definitions are TOML files under
//! `packages/source/sources/`, baked into the binary at compile time via
//! [`include_str!`].

use serde::Deserialize;

use crate::SourceError;

/// TOML configs embedded at compile time.
const FEED_TOMLS: &[(&str, &str)] = &[(
    "nyc_rat_sightings",
    include_str!("../sources/nyc_rat_sightings.toml"),
)];

/// A complete, config-driven feed definition.
#[derive(Debug, Clone, Deserialize)]
pub struct FeedDefinition {
    /// Unique identifier (e.g., `"nyc_rat_sightings"`).
    pub id: String,
    /// Human-readable name.
    pub name: String,
    /// Licensing and attribution metadata.
    pub license: LicenseInfo,
    /// How to fetch raw rows.
    pub fetcher: FetcherConfig,
    /// Human-readable portal page. Derived from the fetcher when unset.
    #[serde(default)]
    pub portal_url: Option<String>,
}

/// Licensing metadata for a feed.
#[derive(Debug, Clone, Deserialize)]
pub struct LicenseInfo {
    /// License type identifier (e.g., `"open_data"`, `"public_domain"`).
    pub license_type: String,
    /// URL to the terms of use, if available.
    pub tos_url: Option<String>,
    /// Whether attribution is required when using this data.
    pub attribution_required: bool,
    /// Attribution text to display.
    pub attribution_text: Option<String>,
}

/// How to fetch raw rows from the feed API.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FetcherConfig {
    /// Socrata SODA API (`$limit/$offset/$order/$where`).
    Socrata {
        /// Dataset resource URL ending in `.json`.
        api_url: String,
        /// Date column for ordering and `since` filtering.
        date_column: String,
        /// Row filter applied on every request.
        #[serde(default)]
        where_clause: Option<String>,
        /// Records per page.
        page_size: u64,
    },
}

impl FetcherConfig {
    /// Derives the human-readable dataset page from the API URL.
    ///
    /// `https://data.cityofnewyork.us/resource/erm2-nwe9.json` becomes
    /// `https://data.cityofnewyork.us/d/erm2-nwe9`.
    #[must_use]
    pub fn derive_portal_url(&self) -> Option<String> {
        match self {
            Self::Socrata { api_url, .. } => api_url.find("/resource/").map(|idx| {
                let base = &api_url[..idx];
                let rest = &api_url[idx + "/resource/".len()..];
                let dataset_id = rest.strip_suffix(".json").unwrap_or(rest);
                format!("{base}/d/{dataset_id}")
            }),
        }
    }
}

impl FeedDefinition {
    /// Returns the unique feed identifier.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Returns the human-readable feed name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the configured portal URL, or one derived from the fetcher.
    #[must_use]
    pub fn portal_url(&self) -> Option<String> {
        self.portal_url
            .clone()
            .or_else(|| self.fetcher.derive_portal_url())
    }
}

/// Parses a [`FeedDefinition`] from a TOML string.
///
/// # Errors
///
/// Returns [`SourceError::Config`] if the TOML is malformed or missing
/// required fields.
pub fn parse_feed_toml(toml_str: &str) -> Result<FeedDefinition, SourceError> {
    toml::de::from_str(toml_str).map_err(|e| SourceError::Config {
        message: e.to_string(),
    })
}

/// Loads every embedded feed definition.
///
/// # Errors
///
/// Returns [`SourceError::Config`] naming the first definition that fails
/// to parse.
pub fn all_feeds() -> Result<Vec<FeedDefinition>, SourceError> {
    FEED_TOMLS
        .iter()
        .map(|(name, toml_str)| {
            parse_feed_toml(toml_str).map_err(|e| SourceError::Config {
                message: format!("{name}.toml: {e}"),
            })
        })
        .collect()
}

/// Looks up an embedded feed definition by id.
///
/// # Errors
///
/// Returns [`SourceError::Config`] if no feed has that id or the
/// definitions fail to parse.
pub fn feed_by_id(id: &str) -> Result<FeedDefinition, SourceError> {
    all_feeds()?
        .into_iter()
        .find(|feed| feed.id == id)
        .ok_or_else(|| SourceError::Config {
            message: format!("unknown feed: {id}"),
        })
}

/// Id of the feed used when none is specified.
pub const DEFAULT_FEED_ID: &str = "nyc_rat_sightings";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_embedded_feed() {
        let feed = feed_by_id(DEFAULT_FEED_ID).unwrap();
        assert_eq!(feed.name(), "NYC 311 Rat Sightings");
        assert_eq!(feed.license.license_type, "open_data");
        let FetcherConfig::Socrata {
            date_column,
            where_clause,
            page_size,
            ..
        } = &feed.fetcher;
        assert_eq!(date_column, "created_date");
        assert!(where_clause.as_deref().unwrap().contains("Rat Sighting"));
        assert_eq!(*page_size, 50_000);
    }

    #[test]
    fn derives_portal_url() {
        let feed = feed_by_id(DEFAULT_FEED_ID).unwrap();
        assert_eq!(
            feed.portal_url().as_deref(),
            Some("https://data.cityofnewyork.us/d/erm2-nwe9")
        );
    }

    #[test]
    fn unknown_feed_is_config_error() {
        assert!(matches!(
            feed_by_id("chicago_rats"),
            Err(SourceError::Config { .. })
        ));
    }

    #[test]
    fn rejects_definition_without_fetcher() {
        let toml_str = r#"
            id = "broken"
            name = "Broken"

            [license]
            license_type = "unknown"
            attribution_required = false
        "#;
        assert!(parse_feed_toml(toml_str).is_err());
    }

    #[test]
    fn where_clause_is_optional() {
        let toml_str = r#"
            id = "rats_view"
            name = "Rat Sightings view"

            [license]
            license_type = "open_data"
            attribution_required = false

            [fetcher]
            type = "socrata"
            api_url = "https://data.cityofnewyork.us/resource/3q43-55fe.json"
            date_column = "created_date"
            page_size = 1000
        "#;
        let feed = parse_feed_toml(toml_str).unwrap();
        assert!(matches!(
            feed.fetcher,
            FetcherConfig::Socrata {
                where_clause: None,
                ..
            }
        ));
    }
}
