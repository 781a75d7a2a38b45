//! Synchronizes the local movie database with OMDb.
//!
//! - [`search_and_save`] mirrors search hits as partial records, at most once
//!   per cooldown window for each normalized term.
//! - [`fill_movie_details`] upgrades a partial record to a full one from a
//!   title lookup, resolving its genres through [`resolve_genres`].

mod details;
mod genres;
mod normalize;
mod search;
#[cfg(test)]
mod testing;

pub use details::{FillOutcome, FillSummary, fill_movie_details, fill_partial_movies};
pub use genres::resolve_genres;
pub use normalize::{normalize_search_term, parse_runtime_minutes, split_genres};
pub use search::{DEFAULT_COOLDOWN, SearchOutcome, search_and_save};

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use chrono::Utc;
    use moviesync_db::{load_movie_genres, load_partial_movies};

    use super::*;
    use crate::testing::{MockOmdbApi, details, hit, setup_db};

    #[tokio::test]
    async fn test_search_then_fill() {
        // Arrange
        let (conn, _dir) = setup_db();
        let mut api = MockOmdbApi::with_search(vec![hit(Some("tt1375666"), "Inception", "2010")]);
        api.details = Some(details("Inception", "2010", "148 min", "Action, Adventure, Sci-Fi"));

        // Act
        search_and_save(&api, &conn, "Inception", DEFAULT_COOLDOWN, Utc::now())
            .await
            .unwrap();
        let partial_before = load_partial_movies(&conn).unwrap();
        let summary = fill_partial_movies(&api, &conn).await.unwrap();

        // Assert
        assert_eq!(partial_before.len(), 1);
        assert_eq!(summary.filled, 1);
        assert!(load_partial_movies(&conn).unwrap().is_empty());
        let genres = load_movie_genres(&conn, partial_before.first().unwrap().id).unwrap();
        let names: Vec<_> = genres.iter().map(|g| g.name.as_str()).collect();
        assert_eq!(names, ["Action", "Adventure", "Sci-Fi"]);
    }
}
