//! String handling for search keys and OMDb detail fields.

/// Builds the throttle key for a search string.
///
/// Whitespace runs collapse to a single space, leading and trailing
/// whitespace is dropped, and the result is lowercased. The key is only used
/// locally; OMDb receives the caller's original string.
#[must_use]
pub fn normalize_search_term(search: &str) -> String {
    search
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Parses an OMDb runtime such as `"148 min"` into minutes.
///
/// Only the first whitespace-delimited token is read. Returns `None` when it
/// is not an unsigned integer (e.g. `"N/A"`) or the input is blank.
#[must_use]
pub fn parse_runtime_minutes(runtime: &str) -> Option<u32> {
    runtime.split_whitespace().next()?.parse().ok()
}

/// Splits OMDb's comma-separated genre field (`"Action, Sci-Fi"`).
///
/// Splits on `", "` exactly, so every piece (including an empty one) is kept.
#[must_use]
pub fn split_genres(genre: &str) -> Vec<&str> {
    genre.split(", ").collect()
}
