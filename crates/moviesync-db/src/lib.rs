//! Database module for the local movie catalogue.
//!
//! Uses `rusqlite` (bundled `SQLite`) to store movies, genres, and
//! search-term throttle timestamps.

/// Genre CRUD operations.
pub mod genres;
/// Movie CRUD operations and genre associations.
pub mod movies;
/// Search-term throttle bookkeeping.
pub mod search_terms;
mod connection;
mod migrations;

#[allow(clippy::module_name_repetitions)]
pub use connection::open_db;
pub use genres::{Genre, get_or_create_genre, load_genres};
pub use movies::{
    Movie, NewMovie, get_or_create_movie, load_movie_by_imdb_id, load_movie_genres, load_movies,
    load_partial_movies, replace_movie_genres, update_movie,
};
pub use search_terms::{
    SearchTerm, get_or_create_search_term, load_search_term, touch_search_term,
};
