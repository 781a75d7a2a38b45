//! Upgrades partial movie records from OMDb title lookups.

use std::collections::HashSet;

use anyhow::{Context, Result, bail};
use moviesync_api::omdb::LocalOmdbApi;
use moviesync_db::{
    Genre, Movie, load_movie_by_imdb_id, load_partial_movies, replace_movie_genres, update_movie,
};
use rusqlite::Connection;
use tracing::instrument;

use crate::genres::resolve_genres;
use crate::normalize::{parse_runtime_minutes, split_genres};

/// Result of [`fill_movie_details`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FillOutcome {
    /// The record was already full; nothing was fetched or written.
    AlreadyFull(Movie),
    /// OMDb had no data for the ID; the record is unchanged and partial.
    NotFound,
    /// The record was filled and stored.
    Filled {
        /// Stored movie.
        movie: Movie,
        /// Genres now associated with the movie, in OMDb order.
        genres: Vec<Genre>,
    },
}

/// Counters from [`fill_partial_movies`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FillSummary {
    /// Records upgraded to full.
    pub filled: usize,
    /// Records OMDb had no data for.
    pub not_found: usize,
    /// Records whose lookup or write failed.
    pub failed: usize,
}

/// Fetches full details for the stored movie `imdb_id` and marks it full.
///
/// Does nothing (and makes no request) when the record is already full.
/// When OMDb has no data for the ID the record is left partial. Otherwise
/// title, year, and plot are overwritten, the runtime is parsed (unparsable
/// values become `None`), the genre set is replaced, and the record is
/// flagged full, all in one transaction.
///
/// # Errors
///
/// Returns an error if no movie with `imdb_id` is stored, the API request
/// fails, or a database operation fails.
#[instrument(skip(api, conn))]
pub async fn fill_movie_details(
    api: &impl LocalOmdbApi,
    conn: &Connection,
    imdb_id: &str,
) -> Result<FillOutcome> {
    let Some(mut movie) = load_movie_by_imdb_id(conn, imdb_id)? else {
        bail!("movie {imdb_id} is not in the database; search for it first");
    };

    if movie.is_full_record {
        tracing::warn!(title = %movie.title, "Movie is already a full record");
        return Ok(FillOutcome::AlreadyFull(movie));
    }

    let fetched = api
        .title_by_id(&movie.imdb_id)
        .await
        .with_context(|| format!("OMDb title lookup failed for {imdb_id}"))?;
    let Some(details) = fetched else {
        tracing::error!(imdb_id, "No details found for IMDb ID");
        return Ok(FillOutcome::NotFound);
    };

    movie.title = details.title;
    movie.year = details.year;
    movie.plot = details.plot;
    movie.runtime_minutes = details.runtime.as_deref().and_then(parse_runtime_minutes);
    if movie.runtime_minutes.is_none() {
        tracing::debug!(runtime = ?details.runtime, "runtime not parsable, stored as unknown");
    }
    movie.is_full_record = true;

    // A missing Genre field clears the set rather than storing a blank genre.
    let genre_names = details.genre.as_deref().map(split_genres).unwrap_or_default();

    let tx = conn
        .unchecked_transaction()
        .context("failed to begin transaction")?;
    let mut genres = resolve_genres(&tx, genre_names)
        .collect::<Result<Vec<_>>>()
        .with_context(|| format!("failed to resolve genres for {imdb_id}"))?;
    // Repeated names resolve to the same row; keep the first occurrence.
    let mut seen = HashSet::new();
    genres.retain(|g| seen.insert(g.id));
    let genre_ids: Vec<i64> = genres.iter().map(|g| g.id).collect();
    update_movie(&tx, &movie)?;
    replace_movie_genres(&tx, movie.id, &genre_ids)?;
    tx.commit()
        .with_context(|| format!("failed to commit details for {imdb_id}"))?;

    tracing::info!(
        title = %movie.title,
        runtime = ?movie.runtime_minutes,
        genres = genres.len(),
        "Movie filled"
    );

    Ok(FillOutcome::Filled { movie, genres })
}

/// Runs [`fill_movie_details`] for every partial record.
///
/// A failure on one movie is logged and counted, then the next is tried.
///
/// # Errors
///
/// Returns an error only if the partial records cannot be listed.
#[instrument(skip_all)]
pub async fn fill_partial_movies(api: &impl LocalOmdbApi, conn: &Connection) -> Result<FillSummary> {
    let partial = load_partial_movies(conn).context("failed to load partial movies")?;
    tracing::info!("Filling {} partial records", partial.len());

    let mut summary = FillSummary::default();
    for movie in &partial {
        match fill_movie_details(api, conn, &movie.imdb_id).await {
            Ok(FillOutcome::Filled { .. }) => summary.filled = summary.filled.saturating_add(1),
            Ok(FillOutcome::NotFound) => summary.not_found = summary.not_found.saturating_add(1),
            // Filled concurrently since the list was loaded.
            Ok(FillOutcome::AlreadyFull(_)) => {}
            Err(e) => {
                tracing::warn!(imdb_id = %movie.imdb_id, error = %format!("{e:#}"), "Fill failed");
                summary.failed = summary.failed.saturating_add(1);
            }
        }
    }

    Ok(summary)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::panic)]

    use moviesync_db::{NewMovie, get_or_create_movie, load_genres, load_movie_genres};

    use super::*;
    use crate::testing::{MockOmdbApi, details, setup_db};

    fn seed_partial(conn: &Connection, imdb_id: &str, title: &str) -> Movie {
        let defaults = NewMovie {
            title: String::from(title),
            year: Some(String::from("2010")),
        };
        get_or_create_movie(conn, imdb_id, &defaults).unwrap().0
    }

    #[tokio::test]
    async fn test_fill_maps_fields_and_genres() {
        // Arrange
        let (conn, _dir) = setup_db();
        let seeded = seed_partial(&conn, "tt1375666", "Inception");
        let api = MockOmdbApi::with_details(details(
            "Inception",
            "2010",
            "148 min",
            "Action, Sci-Fi",
        ));

        // Act
        let outcome = fill_movie_details(&api, &conn, "tt1375666").await.unwrap();

        // Assert
        let FillOutcome::Filled { movie, genres } = outcome else {
            panic!("expected Filled, got {outcome:?}");
        };
        assert_eq!(movie.id, seeded.id);
        assert_eq!(movie.runtime_minutes, Some(148));
        assert_eq!(movie.plot.as_deref(), Some("Plot of Inception."));
        assert!(movie.is_full_record);
        assert_eq!(genres.len(), 2);

        let stored = load_movie_by_imdb_id(&conn, "tt1375666").unwrap().unwrap();
        assert_eq!(stored, movie);
        let names: Vec<String> = load_movie_genres(&conn, movie.id)
            .unwrap()
            .into_iter()
            .map(|g| g.name)
            .collect();
        assert_eq!(names, vec![String::from("Action"), String::from("Sci-Fi")]);
    }

    #[tokio::test]
    async fn test_fill_twice_is_idempotent() {
        // Arrange
        let (conn, _dir) = setup_db();
        seed_partial(&conn, "tt1375666", "Inception");
        let api = MockOmdbApi::with_details(details(
            "Inception",
            "2010",
            "148 min",
            "Action, Sci-Fi",
        ));
        fill_movie_details(&api, &conn, "tt1375666").await.unwrap();
        let after_first = load_movie_by_imdb_id(&conn, "tt1375666").unwrap().unwrap();

        // Act
        let outcome = fill_movie_details(&api, &conn, "tt1375666").await.unwrap();

        // Assert
        assert_eq!(outcome, FillOutcome::AlreadyFull(after_first.clone()));
        assert_eq!(api.title_calls(), 1);
        let after_second = load_movie_by_imdb_id(&conn, "tt1375666").unwrap().unwrap();
        assert_eq!(after_second, after_first);
        assert_eq!(load_movie_genres(&conn, after_first.id).unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_fill_not_found_leaves_partial() {
        // Arrange
        let (conn, _dir) = setup_db();
        let seeded = seed_partial(&conn, "tt0000001", "Lost");
        let api = MockOmdbApi::default();

        // Act
        let outcome = fill_movie_details(&api, &conn, "tt0000001").await.unwrap();

        // Assert
        assert_eq!(outcome, FillOutcome::NotFound);
        assert_eq!(api.title_calls(), 1);
        let stored = load_movie_by_imdb_id(&conn, "tt0000001").unwrap().unwrap();
        assert_eq!(stored, seeded);
    }

    #[tokio::test]
    async fn test_fill_unparsable_runtime_is_none() {
        // Arrange
        let (conn, _dir) = setup_db();
        seed_partial(&conn, "tt0000002", "Short Film");
        let api = MockOmdbApi::with_details(details("Short Film", "1999", "N/A", "Short"));

        // Act
        let outcome = fill_movie_details(&api, &conn, "tt0000002").await.unwrap();

        // Assert
        let FillOutcome::Filled { movie, .. } = outcome else {
            panic!("expected Filled, got {outcome:?}");
        };
        assert!(movie.is_full_record);
        assert_eq!(movie.runtime_minutes, None);
    }

    #[tokio::test]
    async fn test_fill_replaces_existing_genres() {
        // Arrange
        let (conn, _dir) = setup_db();
        let seeded = seed_partial(&conn, "tt0000003", "Remake");
        let (western, _) = moviesync_db::get_or_create_genre(&conn, "Western").unwrap();
        replace_movie_genres(&conn, seeded.id, &[western.id]).unwrap();
        let api = MockOmdbApi::with_details(details("Remake", "2020", "101 min", "Drama"));

        // Act
        fill_movie_details(&api, &conn, "tt0000003").await.unwrap();

        // Assert
        let names: Vec<String> = load_movie_genres(&conn, seeded.id)
            .unwrap()
            .into_iter()
            .map(|g| g.name)
            .collect();
        assert_eq!(names, vec![String::from("Drama")]);
        // The genre itself is never deleted.
        assert_eq!(load_genres(&conn).unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_fill_repeated_genre_reported_once() {
        // Arrange
        let (conn, _dir) = setup_db();
        let seeded = seed_partial(&conn, "tt0000005", "Echo");
        let api =
            MockOmdbApi::with_details(details("Echo", "2005", "90 min", "Action, Action, Drama"));

        // Act
        let outcome = fill_movie_details(&api, &conn, "tt0000005").await.unwrap();

        // Assert
        let FillOutcome::Filled { genres, .. } = outcome else {
            panic!("expected Filled, got {outcome:?}");
        };
        let returned: Vec<&str> = genres.iter().map(|g| g.name.as_str()).collect();
        assert_eq!(returned, ["Action", "Drama"]);
        assert_eq!(load_movie_genres(&conn, seeded.id).unwrap(), genres);
    }

    #[tokio::test]
    async fn test_fill_na_genre_is_stored_literally() {
        // Arrange
        let (conn, _dir) = setup_db();
        let seeded = seed_partial(&conn, "tt0000006", "Unrated Short");
        let api = MockOmdbApi::with_details(details("Unrated Short", "1999", "N/A", "N/A"));

        // Act
        fill_movie_details(&api, &conn, "tt0000006").await.unwrap();

        // Assert
        let names: Vec<String> = load_movie_genres(&conn, seeded.id)
            .unwrap()
            .into_iter()
            .map(|g| g.name)
            .collect();
        assert_eq!(names, vec![String::from("N/A")]);
    }

    #[tokio::test]
    async fn test_fill_missing_genre_field_clears_genres() {
        // Arrange
        let (conn, _dir) = setup_db();
        let seeded = seed_partial(&conn, "tt0000004", "No Genre");
        let mut no_genre = details("No Genre", "2001", "80 min", "");
        no_genre.genre = None;
        let api = MockOmdbApi::with_details(no_genre);

        // Act
        fill_movie_details(&api, &conn, "tt0000004").await.unwrap();

        // Assert
        assert!(load_movie_genres(&conn, seeded.id).unwrap().is_empty());
        assert!(load_genres(&conn).unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_fill_unknown_movie_is_error() {
        // Arrange
        let (conn, _dir) = setup_db();
        let api = MockOmdbApi::default();

        // Act
        let result = fill_movie_details(&api, &conn, "tt9999999").await;

        // Assert
        assert!(result.unwrap_err().to_string().contains("not in the database"));
        assert_eq!(api.title_calls(), 0);
    }

    #[tokio::test]
    async fn test_fill_api_error_propagates_and_leaves_record() {
        // Arrange
        let (conn, _dir) = setup_db();
        let seeded = seed_partial(&conn, "tt0000005", "Flaky");
        let api = MockOmdbApi::failing();

        // Act
        let result = fill_movie_details(&api, &conn, "tt0000005").await;

        // Assert
        assert!(result.is_err());
        let stored = load_movie_by_imdb_id(&conn, "tt0000005").unwrap().unwrap();
        assert_eq!(stored, seeded);
    }

    #[tokio::test]
    async fn test_fill_partial_movies_counts() {
        // Arrange
        let (conn, _dir) = setup_db();
        seed_partial(&conn, "tt0000010", "One");
        seed_partial(&conn, "tt0000011", "Two");
        let api = MockOmdbApi::with_details(details("Same", "2000", "90 min", "Drama"));

        // Act
        let summary = fill_partial_movies(&api, &conn).await.unwrap();

        // Assert
        assert_eq!(
            summary,
            FillSummary {
                filled: 2,
                not_found: 0,
                failed: 0
            }
        );
        assert!(load_partial_movies(&conn).unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_fill_partial_movies_continues_after_failure() {
        // Arrange
        let (conn, _dir) = setup_db();
        seed_partial(&conn, "tt0000020", "A");
        seed_partial(&conn, "tt0000021", "B");
        let api = MockOmdbApi::failing();

        // Act
        let summary = fill_partial_movies(&api, &conn).await.unwrap();

        // Assert
        assert_eq!(summary.failed, 2);
        assert_eq!(api.title_calls(), 2);
    }
}
