//! Local catalog rows owned by a user.
//!
//! Defines the persisted entities [`LocalAlbum`] and [`LocalSong`], plus the
//! write payloads the import pipeline hands to the store.
//!
//! # Database Schema
//!
//! The models map to the following tables:
//! - `albums` - One row per (user_id, artist, title); genres and track titles as JSON arrays
//! - `songs` - Append-only tracks, unique per (album_id, title, artist)
//! - `artists` - Provider artists persisted from search, unique by display name

use serde::Serialize;
use sqlx::FromRow;

/// Rating given to an album the first time it is imported.
pub const DEFAULT_RATING: i32 = 3;

/// An album in a user's local catalog.
#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct LocalAlbum {
    /// Database ID (auto-generated)
    pub id: i64,
    /// Owning user
    pub user_id: i64,
    pub title: String,
    pub artist: String,
    /// Resolved year (never null; 1970 when unknown)
    pub release_year: i32,
    #[sqlx(json)]
    pub genres: Vec<String>,
    /// Denormalized track titles
    #[sqlx(json)]
    pub tracks: Vec<String>,
    pub rating: i32,
    pub cover_url: Option<String>,
    /// Provider the album was first imported from
    pub provider: Option<String>,
    pub external_id: Option<String>,
}

/// A track belonging to one local album.
#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct LocalSong {
    pub id: i64,
    pub album_id: i64,
    pub title: String,
    pub artist: String,
    pub duration_seconds: i64,
    pub track_number: Option<i64>,
    pub disc_number: Option<i64>,
    pub isrc: Option<String>,
}

/// Payload for a first-time album import.
#[derive(Debug, Clone, PartialEq)]
pub struct NewAlbum {
    pub user_id: i64,
    pub title: String,
    pub artist: String,
    pub release_year: i32,
    pub genres: Vec<String>,
    pub tracks: Vec<String>,
    pub rating: i32,
    pub cover_url: Option<String>,
    pub provider: String,
    pub external_id: String,
}

/// Fields refreshed in place when an album is re-imported.
///
/// Id and rating are never touched.
#[derive(Debug, Clone, PartialEq)]
pub struct AlbumRefresh {
    pub release_year: i32,
    pub genres: Vec<String>,
    pub tracks: Vec<String>,
    /// Only overwrites the stored cover when present
    pub cover_url: Option<String>,
}

/// Payload for a track that does not exist locally yet.
#[derive(Debug, Clone, PartialEq)]
pub struct NewSong {
    pub album_id: i64,
    pub title: String,
    pub artist: String,
    pub duration_seconds: i64,
    pub track_number: Option<i64>,
    pub disc_number: Option<i64>,
    pub isrc: Option<String>,
}
