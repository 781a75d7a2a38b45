//! `OmdbApi` trait definition.
#![allow(clippy::future_not_send)]

use anyhow::Result;

use super::types::{OmdbMovieDetails, OmdbSearchResult, SearchParams};

/// OMDb API trait.
///
/// Abstracts API operations for mock substitution in tests.
/// Uses `trait_variant::make` to generate a `Send`-bound async trait.
#[allow(clippy::module_name_repetitions)]
#[trait_variant::make(OmdbApi: Send)]
pub trait LocalOmdbApi {
    /// Searches titles by free text (`?s=`).
    ///
    /// Returns an empty list when OMDb answers `"Response": "False"`
    /// (e.g. "Movie not found!").
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP request fails, the API responds with a
    /// non-success status, or JSON parsing fails.
    async fn search(&self, params: &SearchParams) -> Result<Vec<OmdbSearchResult>>;

    /// Fetches a single title by IMDb ID (`?i=`).
    ///
    /// Returns `None` when OMDb has no data for the ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP request fails, the API responds with a
    /// non-success status, or JSON parsing fails.
    async fn title_by_id(&self, imdb_id: &str) -> Result<Option<OmdbMovieDetails>>;
}
