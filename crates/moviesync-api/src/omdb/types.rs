//! OMDb API response types and search parameters.

use serde::{Deserialize, Serialize};

// --- Envelope ---

/// `Response`/`Error` pair present on every OMDb payload.
///
/// OMDb reports "no data" as HTTP 200 with `"Response": "False"`, and
/// key/quota problems as HTTP 401 with the same shape.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct OmdbStatus {
    /// `"True"` or `"False"`.
    #[serde(rename = "Response")]
    pub response: String,
    /// Error message when `response` is `"False"`.
    #[serde(rename = "Error", default)]
    pub error: Option<String>,
}

impl OmdbStatus {
    /// Whether OMDb returned data.
    pub(crate) fn has_data(&self) -> bool {
        self.response.eq_ignore_ascii_case("true")
    }
}

// --- Search ---

/// Payload of the `?s=` search endpoint.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct OmdbSearchResponse {
    /// Search results (one page, at most 10 items).
    #[serde(rename = "Search", default)]
    pub search: Vec<OmdbSearchResult>,
    /// Total number of results across all pages, as a string.
    #[serde(rename = "totalResults", default)]
    pub total_results: Option<String>,
}

/// A single search hit.
///
/// Every field is optional; callers skip hits without `imdb_id`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct OmdbSearchResult {
    /// Title.
    #[serde(rename = "Title", default)]
    pub title: Option<String>,
    /// Year or year range (e.g. "2010", "2011–2019").
    #[serde(rename = "Year", default)]
    pub year: Option<String>,
    /// IMDb identifier (e.g. "tt1375666").
    #[serde(rename = "imdbID", default)]
    pub imdb_id: Option<String>,
    /// Media type ("movie", "series", "episode").
    #[serde(rename = "Type", default)]
    pub media_type: Option<String>,
    /// Poster URL or "N/A".
    #[serde(rename = "Poster", default)]
    pub poster: Option<String>,
}

// --- Title details ---

/// Payload of the `?i=` title endpoint.
///
/// OMDb uses the literal string "N/A" for unknown values; fields are kept
/// verbatim and interpreted by callers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct OmdbMovieDetails {
    /// Title.
    pub title: String,
    /// Year or year range.
    pub year: Option<String>,
    /// MPAA rating.
    pub rated: Option<String>,
    /// Release date (e.g. "16 Jul 2010").
    pub released: Option<String>,
    /// Runtime (e.g. "148 min").
    pub runtime: Option<String>,
    /// Comma-separated genres (e.g. "Action, Adventure, Sci-Fi").
    pub genre: Option<String>,
    /// Director(s).
    pub director: Option<String>,
    /// Writer(s).
    pub writer: Option<String>,
    /// Main cast.
    pub actors: Option<String>,
    /// Plot summary.
    pub plot: Option<String>,
    /// Spoken language(s).
    pub language: Option<String>,
    /// Production country(ies).
    pub country: Option<String>,
    /// Poster URL or "N/A".
    pub poster: Option<String>,
    /// IMDb rating (e.g. "8.8").
    #[serde(rename = "imdbRating")]
    pub imdb_rating: Option<String>,
    /// IMDb identifier.
    #[serde(rename = "imdbID")]
    pub imdb_id: Option<String>,
    /// Media type.
    #[serde(rename = "Type")]
    pub media_type: Option<String>,
}

// --- Parameters ---

/// Plot length requested on title lookups (`plot=`).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlotLength {
    /// One-paragraph plot (OMDb default).
    #[default]
    Short,
    /// Full plot.
    Full,
}

impl PlotLength {
    /// Returns the value OMDb expects in the `plot` parameter.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Short => "short",
            Self::Full => "full",
        }
    }
}

/// Parameters for the search endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchParams {
    /// Free-text query, sent as-is.
    pub query: String,
}

impl SearchParams {
    /// Creates new search params with the given query.
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
        }
    }

    /// Builds the query pairs for this search. Only the first page is requested.
    pub(crate) fn to_query(&self) -> Vec<(&'static str, String)> {
        vec![("s", self.query.clone()), ("page", String::from("1"))]
    }
}
