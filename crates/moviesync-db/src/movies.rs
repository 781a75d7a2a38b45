//! Movie CRUD operations.

use anyhow::{Context, Result, bail};
use rusqlite::{Connection, OptionalExtension, Row};

use crate::genres::Genre;

/// Column list shared by every movie query, in `Movie::from_row` order.
const MOVIE_COLUMNS: &str = "id, imdb_id, title, year, plot, runtime_minutes, is_full_record";

/// A stored movie.
///
/// Partial records come from search hits (title/year only); full records
/// have been enriched with a title lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Movie {
    /// Row ID.
    pub id: i64,
    /// IMDb identifier (unique).
    pub imdb_id: String,
    /// Title.
    pub title: String,
    /// Year or year range, verbatim from OMDb (nullable).
    pub year: Option<String>,
    /// Plot summary (nullable).
    pub plot: Option<String>,
    /// Runtime in minutes (nullable, unknown when unparsable).
    pub runtime_minutes: Option<u32>,
    /// Whether the record has been filled from a title lookup.
    pub is_full_record: bool,
}

impl Movie {
    /// Maps a row selected with `MOVIE_COLUMNS`.
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            imdb_id: row.get(1)?,
            title: row.get(2)?,
            year: row.get(3)?,
            plot: row.get(4)?,
            runtime_minutes: row.get(5)?,
            is_full_record: row.get(6)?,
        })
    }
}

/// Values used when `get_or_create_movie` has to insert a row.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewMovie {
    /// Title.
    pub title: String,
    /// Year or year range.
    pub year: Option<String>,
}

/// Returns the movie with `imdb_id`, creating a partial record from
/// `defaults` if none exists.
///
/// Existing rows are returned untouched; `defaults` only apply on insert.
/// The second tuple element is `true` when the row was created by this call.
///
/// # Errors
///
/// Returns an error if the database operation fails.
pub fn get_or_create_movie(
    conn: &Connection,
    imdb_id: &str,
    defaults: &NewMovie,
) -> Result<(Movie, bool)> {
    let inserted = conn
        .prepare_cached(
            "INSERT INTO movies (imdb_id, title, year, is_full_record)
             VALUES (?1, ?2, ?3, 0)
             ON CONFLICT(imdb_id) DO NOTHING",
        )
        .context("failed to prepare movie insert")?
        .execute(rusqlite::params![imdb_id, defaults.title, defaults.year])
        .with_context(|| format!("failed to insert movie {imdb_id}"))?;

    let movie = load_movie_by_imdb_id(conn, imdb_id)?
        .with_context(|| format!("movie {imdb_id} missing after insert"))?;

    Ok((movie, inserted > 0))
}

/// Loads a movie by IMDb ID.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn load_movie_by_imdb_id(conn: &Connection, imdb_id: &str) -> Result<Option<Movie>> {
    let sql = format!("SELECT {MOVIE_COLUMNS} FROM movies WHERE imdb_id = ?1");
    conn.prepare_cached(&sql)
        .context("failed to prepare movie query")?
        .query_row([imdb_id], Movie::from_row)
        .optional()
        .with_context(|| format!("failed to load movie {imdb_id}"))
}

/// Loads all movies ordered by title, then IMDb ID.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn load_movies(conn: &Connection) -> Result<Vec<Movie>> {
    query_movies(conn, "")
}

/// Loads movies that have not been filled yet.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn load_partial_movies(conn: &Connection) -> Result<Vec<Movie>> {
    query_movies(conn, "WHERE is_full_record = 0")
}

/// Runs a movie `SELECT` with an optional `WHERE` clause.
fn query_movies(conn: &Connection, filter: &str) -> Result<Vec<Movie>> {
    let sql = format!("SELECT {MOVIE_COLUMNS} FROM movies {filter} ORDER BY title, imdb_id");
    let mut stmt = conn
        .prepare(&sql)
        .context("failed to prepare movies query")?;

    let rows = stmt
        .query_map([], Movie::from_row)
        .context("failed to query movies")?;

    rows.collect::<std::result::Result<Vec<_>, _>>()
        .context("failed to read movies rows")
}

/// Writes every column of `movie` back to its row (matched by `id`).
///
/// # Errors
///
/// Returns an error if the database operation fails or no row has `movie.id`.
pub fn update_movie(conn: &Connection, movie: &Movie) -> Result<()> {
    let rows = conn
        .execute(
            "UPDATE movies SET
                imdb_id = ?1,
                title = ?2,
                year = ?3,
                plot = ?4,
                runtime_minutes = ?5,
                is_full_record = ?6
             WHERE id = ?7",
            rusqlite::params![
                movie.imdb_id,
                movie.title,
                movie.year,
                movie.plot,
                movie.runtime_minutes,
                movie.is_full_record,
                movie.id,
            ],
        )
        .with_context(|| format!("failed to update movie {}", movie.imdb_id))?;

    if rows == 0 {
        bail!("movie {} (id {}) does not exist", movie.imdb_id, movie.id);
    }
    Ok(())
}

/// Replaces the movie's genre associations with `genre_ids`.
///
/// Duplicate IDs collapse to one association. Runs as separate statements;
/// wrap the call in a transaction to make the swap atomic.
///
/// # Errors
///
/// Returns an error if the database operation fails.
pub fn replace_movie_genres(conn: &Connection, movie_id: i64, genre_ids: &[i64]) -> Result<()> {
    conn.execute("DELETE FROM movie_genres WHERE movie_id = ?1", [movie_id])
        .with_context(|| format!("failed to clear genres of movie {movie_id}"))?;

    let mut stmt = conn
        .prepare_cached("INSERT OR IGNORE INTO movie_genres (movie_id, genre_id) VALUES (?1, ?2)")
        .context("failed to prepare movie_genres insert")?;
    for genre_id in genre_ids {
        stmt.execute([movie_id, *genre_id])
            .with_context(|| format!("failed to link genre {genre_id} to movie {movie_id}"))?;
    }

    Ok(())
}

/// Loads the genres associated with a movie, ordered by name.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn load_movie_genres(conn: &Connection, movie_id: i64) -> Result<Vec<Genre>> {
    let mut stmt = conn
        .prepare_cached(
            "SELECT g.id, g.name
             FROM genres g
             JOIN movie_genres mg ON mg.genre_id = g.id
             WHERE mg.movie_id = ?1
             ORDER BY g.name",
        )
        .context("failed to prepare movie genres query")?;

    let rows = stmt
        .query_map([movie_id], Genre::from_row)
        .context("failed to query movie genres")?;

    rows.collect::<std::result::Result<Vec<_>, _>>()
        .context("failed to read movie genres rows")
}
