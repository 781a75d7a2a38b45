//! Genre name resolution.

use anyhow::Result;
use moviesync_db::{Genre, get_or_create_genre};
use rusqlite::Connection;

/// Lazily resolves genre names to stored genres, creating missing ones.
///
/// Yields one item per name in input order. Each step performs its upsert
/// when pulled, so dropping the iterator early leaves later names untouched;
/// iterating again repeats the upserts, which never duplicate a genre.
/// Blank names are stored as-is.
pub fn resolve_genres<I>(conn: &Connection, names: I) -> impl Iterator<Item = Result<Genre>>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    names.into_iter().map(move |name| {
        let (genre, created) = get_or_create_genre(conn, name.as_ref())?;
        if created {
            tracing::info!(genre = %genre.name, "Genre created");
        }
        Ok(genre)
    })
}
