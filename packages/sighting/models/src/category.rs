//! Bounded vocabularies used by the 311 feed's categorical columns.
//!
//! Upstream spellings are reproduced exactly (including the mixed case of
//! `"Unspecified"` next to upper-case borough names). Matching is
//! case-sensitive, mirroring how the open-data portal emits them.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString, VariantNames};

/// A categorical value that is either one of the known variants of `T` or an
/// unrecognized raw string.
///
/// Unrecognized values are kept rather than dropped so that vocabulary drift
/// upstream does not lose data. Serializes as the raw string in both cases.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Categorical<T> {
    /// A value from the known vocabulary.
    Known(T),
    /// A value outside the known vocabulary, stored verbatim.
    Unrecognized(String),
}

impl<T: FromStr> Categorical<T> {
    /// Classifies a raw string against the known vocabulary of `T`.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        raw.parse::<T>()
            .map_or_else(|_| Self::Unrecognized(raw.to_string()), Self::Known)
    }
}

impl<T> Categorical<T> {
    /// Returns `true` if the value belongs to the known vocabulary.
    #[must_use]
    pub const fn is_known(&self) -> bool {
        matches!(self, Self::Known(_))
    }

    /// Returns the known variant, if any.
    #[must_use]
    pub const fn known(&self) -> Option<&T> {
        match self {
            Self::Known(value) => Some(value),
            Self::Unrecognized(_) => None,
        }
    }
}

impl<T: AsRef<str>> Categorical<T> {
    /// Returns the value exactly as the upstream feed spells it.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Known(value) => value.as_ref(),
            Self::Unrecognized(raw) => raw,
        }
    }
}

impl<T: AsRef<str>> fmt::Display for Categorical<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Acronym of the responding city agency.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
    VariantNames,
)]
pub enum Agency {
    /// Department of Health and Mental Hygiene
    #[serde(rename = "DOHMH")]
    #[strum(serialize = "DOHMH")]
    Dohmh,
}

/// Full name of the responding city agency.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
    VariantNames,
)]
pub enum AgencyName {
    #[serde(rename = "Department of Health and Mental Hygiene")]
    #[strum(serialize = "Department of Health and Mental Hygiene")]
    DepartmentOfHealthAndMentalHygiene,
}

/// First level of the complaint topic hierarchy.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
    VariantNames,
)]
pub enum ComplaintType {
    #[serde(rename = "Rodent")]
    #[strum(serialize = "Rodent")]
    Rodent,
}

/// Detail under the complaint type.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
    VariantNames,
)]
pub enum Descriptor {
    #[serde(rename = "Rat Sighting")]
    #[strum(serialize = "Rat Sighting")]
    RatSighting,
}

/// Lifecycle status of a service request.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
    VariantNames,
)]
pub enum Status {
    Assigned,
    Closed,
    Draft,
    #[serde(rename = "In Progress")]
    #[strum(serialize = "In Progress")]
    InProgress,
    Open,
    Pending,
    Unspecified,
}

/// Borough of the incident location.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
    VariantNames,
)]
pub enum Borough {
    #[serde(rename = "BRONX")]
    #[strum(serialize = "BRONX")]
    Bronx,
    #[serde(rename = "BROOKLYN")]
    #[strum(serialize = "BROOKLYN")]
    Brooklyn,
    #[serde(rename = "MANHATTAN")]
    #[strum(serialize = "MANHATTAN")]
    Manhattan,
    #[serde(rename = "QUEENS")]
    #[strum(serialize = "QUEENS")]
    Queens,
    #[serde(rename = "STATEN ISLAND")]
    #[strum(serialize = "STATEN ISLAND")]
    StatenIsland,
    Unspecified,
}

/// Borough of a Parks Department facility. Same as [`Borough`] plus the
/// empty string, which the feed uses for non-park incidents.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
    VariantNames,
)]
pub enum ParkBorough {
    #[serde(rename = "BRONX")]
    #[strum(serialize = "BRONX")]
    Bronx,
    #[serde(rename = "BROOKLYN")]
    #[strum(serialize = "BROOKLYN")]
    Brooklyn,
    #[serde(rename = "MANHATTAN")]
    #[strum(serialize = "MANHATTAN")]
    Manhattan,
    #[serde(rename = "QUEENS")]
    #[strum(serialize = "QUEENS")]
    Queens,
    #[serde(rename = "STATEN ISLAND")]
    #[strum(serialize = "STATEN ISLAND")]
    StatenIsland,
    Unspecified,
    /// Not a park incident.
    #[serde(rename = "")]
    #[strum(serialize = "")]
    Blank,
}

/// Kind of address information available for the incident location.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
    VariantNames,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum AddressType {
    Address,
    Blockface,
    Intersection,
    Latlong,
    Placename,
    Unrecognized,
}
