//! OMDb API client module.
//!
//! Handles HTTP requests to the OMDb endpoint and retrieves
//! search results and title details.

mod api;
mod client;
mod rate_limiter;
mod types;

#[allow(clippy::module_name_repetitions)]
pub use api::{LocalOmdbApi, OmdbApi};
#[allow(clippy::module_name_repetitions)]
pub use client::{OmdbClient, OmdbClientBuilder};
#[allow(clippy::module_name_repetitions)]
pub use types::{OmdbMovieDetails, OmdbSearchResult, PlotLength, SearchParams};
