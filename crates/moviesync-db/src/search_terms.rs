//! Search-term throttle bookkeeping.

use anyhow::{Context, Result, bail};
use chrono::{DateTime, Utc};
use rusqlite::{Connection, OptionalExtension, Row};

/// A normalized search string and when it was last sent to the API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchTerm {
    /// Row ID.
    pub id: i64,
    /// Normalized term (unique).
    pub term: String,
    /// Last completed search (`None` until the first one completes).
    pub last_search: Option<DateTime<Utc>>,
}

impl SearchTerm {
    /// Maps a `SELECT id, term, last_search` row.
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            term: row.get(1)?,
            last_search: row.get(2)?,
        })
    }
}

/// Returns the search term row for `term`, creating it with no timestamp
/// if needed. The second tuple element is `true` when the row was created.
///
/// `term` is stored verbatim; normalize it before calling.
///
/// # Errors
///
/// Returns an error if the database operation fails.
pub fn get_or_create_search_term(conn: &Connection, term: &str) -> Result<(SearchTerm, bool)> {
    let inserted = conn
        .execute(
            "INSERT INTO search_terms (term) VALUES (?1) ON CONFLICT(term) DO NOTHING",
            [term],
        )
        .with_context(|| format!("failed to insert search term '{term}'"))?;

    let search_term = load_search_term(conn, term)?
        .with_context(|| format!("search term '{term}' missing after insert"))?;

    Ok((search_term, inserted > 0))
}

/// Loads a search term by its normalized text.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn load_search_term(conn: &Connection, term: &str) -> Result<Option<SearchTerm>> {
    conn.query_row(
        "SELECT id, term, last_search FROM search_terms WHERE term = ?1",
        [term],
        SearchTerm::from_row,
    )
    .optional()
    .with_context(|| format!("failed to load search term '{term}'"))
}

/// Sets `last_search` of the search term with `id` to `at`.
///
/// # Errors
///
/// Returns an error if the database operation fails or the row is missing.
pub fn touch_search_term(conn: &Connection, id: i64, at: DateTime<Utc>) -> Result<()> {
    let rows = conn
        .execute(
            "UPDATE search_terms SET last_search = ?1 WHERE id = ?2",
            rusqlite::params![at, id],
        )
        .with_context(|| format!("failed to update search term {id}"))?;

    if rows == 0 {
        bail!("search term {id} does not exist");
    }
    Ok(())
}
