//! Genre CRUD operations.

use anyhow::{Context, Result};
use rusqlite::{Connection, Row};

/// A stored genre, shared across movies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Genre {
    /// Row ID.
    pub id: i64,
    /// Genre name (unique, matched exactly).
    pub name: String,
}

impl Genre {
    /// Maps a `SELECT id, name` row.
    pub(crate) fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            name: row.get(1)?,
        })
    }
}

/// Returns the genre named `name`, creating it first if needed.
///
/// The second tuple element is `true` when the row was created by this call.
/// Names are matched exactly; an empty name is stored like any other.
///
/// # Errors
///
/// Returns an error if the database operation fails.
pub fn get_or_create_genre(conn: &Connection, name: &str) -> Result<(Genre, bool)> {
    let inserted = conn
        .prepare_cached("INSERT INTO genres (name) VALUES (?1) ON CONFLICT(name) DO NOTHING")
        .context("failed to prepare genre insert")?
        .execute([name])
        .with_context(|| format!("failed to insert genre '{name}'"))?;

    let genre = conn
        .prepare_cached("SELECT id, name FROM genres WHERE name = ?1")
        .context("failed to prepare genre query")?
        .query_row([name], Genre::from_row)
        .with_context(|| format!("failed to load genre '{name}'"))?;

    if inserted > 0 {
        tracing::debug!(genre = %genre.name, id = genre.id, "genre created");
    }

    Ok((genre, inserted > 0))
}

/// Loads all genres ordered by name.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn load_genres(conn: &Connection) -> Result<Vec<Genre>> {
    let mut stmt = conn
        .prepare("SELECT id, name FROM genres ORDER BY name")
        .context("failed to prepare genres query")?;

    let rows = stmt
        .query_map([], Genre::from_row)
        .context("failed to query genres")?;

    rows.collect::<std::result::Result<Vec<_>, _>>()
        .context("failed to read genres rows")
}
