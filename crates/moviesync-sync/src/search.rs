//! Throttled OMDb search that mirrors hits as partial movie records.

use anyhow::{Context, Result};
use chrono::{DateTime, TimeDelta, Utc};
use moviesync_api::omdb::{LocalOmdbApi, SearchParams};
use moviesync_db::{NewMovie, get_or_create_movie, get_or_create_search_term, touch_search_term};
use rusqlite::Connection;
use tracing::instrument;

use crate::normalize::normalize_search_term;

/// Minimum time between two API searches for the same normalized term.
pub const DEFAULT_COOLDOWN: TimeDelta = TimeDelta::hours(24);

/// Result of [`search_and_save`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchOutcome {
    /// The term was searched within the cooldown; nothing was requested.
    Throttled {
        /// When the term was last searched.
        last_search: DateTime<Utc>,
    },
    /// OMDb returned no results.
    NoResults,
    /// Results were stored.
    Saved {
        /// Hits with an IMDb ID (new or already stored).
        saved: usize,
        /// Hits that created a new partial record.
        created: usize,
        /// Hits skipped for lacking an IMDb ID.
        skipped: usize,
    },
}

/// Searches OMDb for `search` and stores each hit as a partial movie.
///
/// The throttle key is [`normalize_search_term`] of `search`; OMDb receives
/// `search` unchanged. If the key was already searched less than `cooldown`
/// before `now`, returns [`SearchOutcome::Throttled`] without a request.
///
/// Hits without an IMDb ID are skipped. Existing movies are never modified:
/// title and year are taken from a hit only when it creates the record.
/// Once the request succeeds the term is stamped with `now`, including when
/// OMDb found nothing.
///
/// # Errors
///
/// Returns an error if the API request or a database operation fails. The
/// term's timestamp is left unchanged in that case.
#[instrument(skip(api, conn, cooldown, now))]
pub async fn search_and_save(
    api: &impl LocalOmdbApi,
    conn: &Connection,
    search: &str,
    cooldown: TimeDelta,
    now: DateTime<Utc>,
) -> Result<SearchOutcome> {
    let key = normalize_search_term(search);
    let (term, created) = get_or_create_search_term(conn, &key)?;

    if !created
        && let Some(last_search) = term.last_search
        && now.signed_duration_since(last_search) < cooldown
    {
        tracing::warn!(
            term = %key,
            last_search = %last_search,
            "Search was performed recently so not searching again"
        );
        return Ok(SearchOutcome::Throttled { last_search });
    }

    let results = api
        .search(&SearchParams::new(search))
        .await
        .with_context(|| format!("OMDb search failed for '{search}'"))?;

    if results.is_empty() {
        tracing::warn!(search, "No results found for search term");
        touch_search_term(conn, term.id, now)?;
        return Ok(SearchOutcome::NoResults);
    }

    let mut saved: usize = 0;
    let mut created_count: usize = 0;
    let mut skipped: usize = 0;
    for hit in &results {
        let Some(imdb_id) = hit.imdb_id.as_deref().filter(|id| !id.is_empty()) else {
            tracing::debug!(title = ?hit.title, "Skipping search hit without IMDb ID");
            skipped = skipped.saturating_add(1);
            continue;
        };

        let title = hit.title.as_deref().unwrap_or_default();
        tracing::info!(title, imdb_id, "Saving movie");

        let defaults = NewMovie {
            title: String::from(title),
            year: hit.year.clone(),
        };
        let (movie, was_created) = get_or_create_movie(conn, imdb_id, &defaults)?;
        if was_created {
            tracing::info!(title = %movie.title, "Movie created");
            created_count = created_count.saturating_add(1);
        }
        saved = saved.saturating_add(1);
    }

    touch_search_term(conn, term.id, now)?;

    Ok(SearchOutcome::Saved {
        saved,
        created: created_count,
        skipped,
    })
}
