//! Core types for the location engine.

use serde::Serialize;
use std::fmt;

/// How a query's modifier token classified against the gazetteer's name
/// tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ModifierKind {
    /// Token is a known state/province name or abbreviation.
    State,
    /// Token is a known country name, code, or alias.
    Country,
    /// Token matches both a state and a country (e.g. "Georgia").
    Ambiguous,
    /// No modifier, or the token matches nothing known.
    None,
}

impl fmt::Display for ModifierKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::State => write!(f, "state"),
            Self::Country => write!(f, "country"),
            Self::Ambiguous => write!(f, "ambiguous"),
            Self::None => write!(f, "none"),
        }
    }
}

/// A raw query split into its city and modifier parts.
///
/// Immutable and request-scoped; produced by
/// [`QueryNormalizer`](crate::normalize::QueryNormalizer). The city and
/// modifier tokens never contain commas.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NormalizedQuery {
    /// The city-candidate portion of the query.
    pub city: String,
    /// The state/province/country portion, when one was detected.
    pub modifier: Option<String>,
    /// Classification of `modifier`.
    pub kind: ModifierKind,
    /// The query exactly as the user typed it.
    pub raw: String,
}

/// The canonical place chosen for a query after disambiguation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedLocation {
    /// Stable gazetteer key: folded `city:state:country`.
    pub key: String,
    /// Canonical city name, as spelled in the dataset.
    pub city: String,
    /// State/province code, when the entry carries one (e.g. "MD", "ON").
    pub state: Option<String>,
    /// Full country name (e.g. "United States").
    pub country: String,
}

impl ResolvedLocation {
    /// The canonical display string: "City, ST" when a state/province code
    /// exists, "City, Country" otherwise. Feed through
    /// [`display::format`](crate::display::format) before showing to users.
    pub fn display_name(&self) -> String {
        match &self.state {
            Some(code) => format!("{}, {}", self.city, code),
            None => format!("{}, {}", self.city, self.country),
        }
    }
}

/// Location engine errors.
///
/// `NotFound` is the resolver's miss outcome; callers treat it as a valid
/// result and fall back to the raw query text, not as a fault.
#[derive(Debug)]
pub enum AtlasError {
    /// The gazetteer dataset could not be read or failed validation.
    Dataset(String),
    /// No gazetteer entry matches the query's city token.
    NotFound(String),
    /// A pagination limit of zero was requested.
    InvalidLimit,
}

impl fmt::Display for AtlasError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Dataset(msg) => write!(f, "Gazetteer dataset error: {}", msg),
            Self::NotFound(q) => write!(f, "Location not found: '{}'", q),
            Self::InvalidLimit => write!(f, "Page limit must be at least 1"),
        }
    }
}

impl std::error::Error for AtlasError {}
