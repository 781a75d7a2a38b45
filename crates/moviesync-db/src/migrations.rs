//! Schema version management using `PRAGMA user_version`.

use anyhow::{Context, Result};
use rusqlite::Connection;

/// Current schema version.
const CURRENT_VERSION: u32 = 1;

/// Runs database migrations up to `CURRENT_VERSION`.
///
/// # Errors
///
/// Returns an error if any SQL statement fails.
pub fn run_migrations(conn: &Connection) -> Result<()> {
    let version: u32 = conn
        .pragma_query_value(None, "user_version", |row| row.get(0))
        .context("failed to read user_version")?;

    if version < 1 {
        migrate_v1(conn).context("migration to v1 failed")?;
    }

    if version < CURRENT_VERSION {
        tracing::info!(from = version, to = CURRENT_VERSION, "database schema migrated");
    }

    conn.pragma_update(None, "user_version", CURRENT_VERSION)
        .context("failed to update user_version")?;

    Ok(())
}

/// Migration to v1: create `genres`, `movies`, `movie_genres`, and
/// `search_terms` tables.
fn migrate_v1(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS genres (
            id    INTEGER PRIMARY KEY,
            name  TEXT NOT NULL UNIQUE
        );

        CREATE TABLE IF NOT EXISTS movies (
            id               INTEGER PRIMARY KEY,
            imdb_id          TEXT NOT NULL UNIQUE,
            title            TEXT NOT NULL,
            year             TEXT,
            plot             TEXT,
            runtime_minutes  INTEGER,
            is_full_record   INTEGER NOT NULL DEFAULT 0
        );

        CREATE TABLE IF NOT EXISTS movie_genres (
            movie_id  INTEGER NOT NULL REFERENCES movies(id) ON DELETE CASCADE,
            genre_id  INTEGER NOT NULL REFERENCES genres(id) ON DELETE CASCADE,
            PRIMARY KEY (movie_id, genre_id)
        );

        CREATE TABLE IF NOT EXISTS search_terms (
            id           INTEGER PRIMARY KEY,
            term         TEXT NOT NULL UNIQUE,
            last_search  TEXT
        );

        CREATE INDEX IF NOT EXISTS idx_movie_genres_genre_id ON movie_genres(genre_id);
        CREATE INDEX IF NOT EXISTS idx_movies_is_full_record ON movies(is_full_record);",
    )
    .context("failed to create tables")?;

    Ok(())
}
