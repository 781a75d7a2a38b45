//! API client library for moviesync.
//!
//! Provides a client for the OMDb (Open Movie Database) API.

/// OMDb API client.
pub mod omdb;
