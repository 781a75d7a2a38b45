//! Shared fixtures for unit tests.
#![allow(clippy::unwrap_used)]

use std::sync::Mutex;
use std::sync::atomic::{AtomicU32, Ordering};

use anyhow::{Result, bail};
use moviesync_api::omdb::{LocalOmdbApi, OmdbMovieDetails, OmdbSearchResult, SearchParams};
use moviesync_db::open_db;
use rusqlite::Connection;

/// Opens a migrated database in a fresh temp directory.
pub fn setup_db() -> (Connection, tempfile::TempDir) {
    let dir = tempfile::tempdir().unwrap();
    let conn = open_db(Some(&dir.path().to_path_buf())).unwrap();
    (conn, dir)
}

/// Mock API returning canned responses and counting calls.
#[derive(Default)]
pub struct MockOmdbApi {
    pub search_results: Vec<OmdbSearchResult>,
    pub details: Option<OmdbMovieDetails>,
    pub fail: bool,
    pub search_calls: AtomicU32,
    pub title_calls: AtomicU32,
    pub last_query: Mutex<Option<String>>,
}

impl MockOmdbApi {
    pub fn with_search(results: Vec<OmdbSearchResult>) -> Self {
        Self {
            search_results: results,
            ..Self::default()
        }
    }

    pub fn with_details(details: OmdbMovieDetails) -> Self {
        Self {
            details: Some(details),
            ..Self::default()
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn search_calls(&self) -> u32 {
        self.search_calls.load(Ordering::SeqCst)
    }

    pub fn title_calls(&self) -> u32 {
        self.title_calls.load(Ordering::SeqCst)
    }
}

impl LocalOmdbApi for MockOmdbApi {
    async fn search(&self, params: &SearchParams) -> Result<Vec<OmdbSearchResult>> {
        self.search_calls.fetch_add(1, Ordering::SeqCst);
        *self.last_query.lock().unwrap() = Some(params.query.clone());
        if self.fail {
            bail!("OMDb API error (HTTP 503 Service Unavailable): upstream down");
        }
        Ok(self.search_results.clone())
    }

    async fn title_by_id(&self, _imdb_id: &str) -> Result<Option<OmdbMovieDetails>> {
        self.title_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            bail!("OMDb API error (HTTP 503 Service Unavailable): upstream down");
        }
        Ok(self.details.clone())
    }
}

/// Builds a search hit.
pub fn hit(imdb_id: Option<&str>, title: &str, year: &str) -> OmdbSearchResult {
    OmdbSearchResult {
        title: Some(String::from(title)),
        year: Some(String::from(year)),
        imdb_id: imdb_id.map(String::from),
        media_type: Some(String::from("movie")),
        poster: None,
    }
}

/// Builds title details with the fields the filler reads.
pub fn details(title: &str, year: &str, runtime: &str, genre: &str) -> OmdbMovieDetails {
    OmdbMovieDetails {
        title: String::from(title),
        year: Some(String::from(year)),
        plot: Some(format!("Plot of {title}.")),
        runtime: Some(String::from(runtime)),
        genre: Some(String::from(genre)),
        ..OmdbMovieDetails::default()
    }
}
