//! Database module for the local catalog.
//!
//! Uses SQLx with SQLite for lightweight, embedded database storage.
//! [`SqliteCatalogStore`] implements [`CatalogStore`] on top of it:
//! - Session token → user resolution
//! - Album lookup / insert / in-place refresh keyed on (user, artist, title)
//! - Append-only song inserts keyed on (album, title, artist)
//! - Artist upsert by display name
//!
//! # Example
//!
//! ```ignore
//! use music_catalog::db::{init_db, db_url, SqliteCatalogStore};
//!
//! let pool = init_db(&db_url(None)).await?;
//! let store = SqliteCatalogStore::new(pool);
//! ```

use async_trait::async_trait;
use sha2::{Digest, Sha256};
use sqlx::migrate::MigrateDatabase;
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};

use crate::catalog::domain::{Artist, CatalogError};
use crate::catalog::traits::CatalogStore;
use crate::model::{AlbumRefresh, LocalAlbum, LocalSong, NewAlbum, NewSong};

/// Default database filename.
pub const DEFAULT_DB_NAME: &str = "music_catalog.db";

const ALBUM_COLUMNS: &str =
    "id, user_id, title, artist, release_year, genres, tracks, rating, cover_url, provider, external_id";

const SONG_COLUMNS: &str =
    "id, album_id, title, artist, duration_seconds, track_number, disc_number, isrc";

/// Build a SQLite database URL from an optional path.
///
/// If no path is provided, uses [`DEFAULT_DB_NAME`] in the current directory.
pub fn db_url(path: Option<&std::path::Path>) -> String {
    match path {
        Some(p) => format!("sqlite:{}", p.display()),
        None => format!("sqlite:{}", DEFAULT_DB_NAME),
    }
}

/// Initialize the database connection pool and run migrations.
///
/// Creates the database file if it doesn't exist, establishes a connection
/// pool with up to 5 connections, and runs all pending migrations.
pub async fn init_db(db_url: &str) -> Result<SqlitePool, sqlx::Error> {
    if !sqlx::Sqlite::database_exists(db_url).await.unwrap_or(false) {
        sqlx::Sqlite::create_database(db_url).await?;
    }

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect(db_url)
        .await?;

    sqlx::migrate!("./migrations").run(&pool).await?;

    Ok(pool)
}

/// Hex SHA-256 of a session token; tokens are never stored in the clear.
pub fn hash_token(token: &str) -> String {
    format!("{:x}", Sha256::digest(token.as_bytes()))
}

fn now() -> String {
    chrono::Utc::now().to_rfc3339()
}

fn to_json(values: &[String]) -> String {
    serde_json::to_string(values).unwrap_or_else(|_| "[]".to_string())
}

impl From<sqlx::Error> for CatalogError {
    fn from(e: sqlx::Error) -> Self {
        CatalogError::Persistence(e.to_string())
    }
}

/// [`CatalogStore`] backed by the SQLite pool.
#[derive(Debug, Clone)]
pub struct SqliteCatalogStore {
    pool: SqlitePool,
}

impl SqliteCatalogStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Get an album by its database ID.
    pub async fn album_by_id(&self, album_id: i64) -> sqlx::Result<Option<LocalAlbum>> {
        sqlx::query_as::<_, LocalAlbum>(&format!(
            "SELECT {} FROM albums WHERE id = ?",
            ALBUM_COLUMNS
        ))
        .bind(album_id)
        .fetch_optional(&self.pool)
        .await
    }

    /// All songs of an album, in insertion order.
    pub async fn songs_for_album(&self, album_id: i64) -> sqlx::Result<Vec<LocalSong>> {
        sqlx::query_as::<_, LocalSong>(&format!(
            "SELECT {} FROM songs WHERE album_id = ? ORDER BY id",
            SONG_COLUMNS
        ))
        .bind(album_id)
        .fetch_all(&self.pool)
        .await
    }
}

#[async_trait]
impl CatalogStore for SqliteCatalogStore {
    async fn user_id_by_token(&self, token: &str) -> Result<i64, CatalogError> {
        let row: Option<(i64,)> = sqlx::query_as(
            "SELECT user_id FROM sessions WHERE token_hash = ? \
             AND (expires_at IS NULL OR julianday(expires_at) > julianday('now'))",
        )
        .bind(hash_token(token))
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| CatalogError::Authorization(format!("session lookup failed: {}", e)))?;

        row.map(|(id,)| id)
            .ok_or_else(|| CatalogError::Authorization("invalid or expired token".to_string()))
    }

    async fn find_album(
        &self,
        user_id: i64,
        artist: &str,
        title: &str,
    ) -> Result<Option<LocalAlbum>, CatalogError> {
        let album = sqlx::query_as::<_, LocalAlbum>(&format!(
            "SELECT {} FROM albums WHERE user_id = ? AND artist = ? AND title = ?",
            ALBUM_COLUMNS
        ))
        .bind(user_id)
        .bind(artist)
        .bind(title)
        .fetch_optional(&self.pool)
        .await?;
        Ok(album)
    }

    async fn insert_album(&self, album: &NewAlbum) -> Result<i64, CatalogError> {
        let ts = now();
        let result = sqlx::query(
            r#"
            INSERT INTO albums
                (user_id, title, artist, release_year, genres, tracks, rating,
                 cover_url, provider, external_id, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(album.user_id)
        .bind(&album.title)
        .bind(&album.artist)
        .bind(album.release_year)
        .bind(to_json(&album.genres))
        .bind(to_json(&album.tracks))
        .bind(album.rating)
        .bind(&album.cover_url)
        .bind(&album.provider)
        .bind(&album.external_id)
        .bind(&ts)
        .bind(&ts)
        .execute(&self.pool)
        .await?;
        Ok(result.last_insert_rowid())
    }

    async fn refresh_album(
        &self,
        album_id: i64,
        refresh: &AlbumRefresh,
    ) -> Result<(), CatalogError> {
        sqlx::query(
            r#"
            UPDATE albums SET
                release_year = ?,
                genres = ?,
                tracks = ?,
                cover_url = COALESCE(?, cover_url),
                updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(refresh.release_year)
        .bind(to_json(&refresh.genres))
        .bind(to_json(&refresh.tracks))
        .bind(&refresh.cover_url)
        .bind(now())
        .bind(album_id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn song_exists(
        &self,
        album_id: i64,
        title: &str,
        artist: &str,
    ) -> Result<bool, CatalogError> {
        let row: Option<(i64,)> = sqlx::query_as(
            "SELECT id FROM songs WHERE album_id = ? AND title = ? AND artist = ? LIMIT 1",
        )
        .bind(album_id)
        .bind(title)
        .bind(artist)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.is_some())
    }

    async fn insert_song(&self, song: &NewSong) -> Result<i64, CatalogError> {
        let result = sqlx::query(
            r#"
            INSERT INTO songs
                (album_id, title, artist, duration_seconds, track_number, disc_number, isrc, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(song.album_id)
        .bind(&song.title)
        .bind(&song.artist)
        .bind(song.duration_seconds)
        .bind(song.track_number)
        .bind(song.disc_number)
        .bind(&song.isrc)
        .bind(now())
        .execute(&self.pool)
        .await?;
        Ok(result.last_insert_rowid())
    }

    async fn find_artist_by_name(&self, name: &str) -> Result<Option<i64>, CatalogError> {
        let row: Option<(i64,)> = sqlx::query_as("SELECT id FROM artists WHERE name = ?")
            .bind(name)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(|(id,)| id))
    }

    async fn insert_artist(&self, artist: &Artist) -> Result<i64, CatalogError> {
        let ts = now();
        let result = sqlx::query(
            r#"
            INSERT INTO artists
                (name, external_id, provider, image_url, biography, genres,
                 popularity, external_url, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&artist.name)
        .bind(&artist.external_id)
        .bind(artist.provider.as_str())
        .bind(&artist.image_url)
        .bind(&artist.biography)
        .bind(to_json(&artist.genres))
        .bind(artist.popularity.map(i64::from))
        .bind(&artist.external_url)
        .bind(&ts)
        .bind(&ts)
        .execute(&self.pool)
        .await?;
        Ok(result.last_insert_rowid())
    }

    async fn update_artist(&self, id: i64, artist: &Artist) -> Result<(), CatalogError> {
        sqlx::query(
            r#"
            UPDATE artists SET
                external_id = ?,
                provider = ?,
                image_url = COALESCE(?, image_url),
                biography = COALESCE(?, biography),
                genres = ?,
                popularity = COALESCE(?, popularity),
                external_url = COALESCE(?, external_url),
                updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&artist.external_id)
        .bind(artist.provider.as_str())
        .bind(&artist.image_url)
        .bind(&artist.biography)
        .bind(to_json(&artist.genres))
        .bind(artist.popularity.map(i64::from))
        .bind(&artist.external_url)
        .bind(now())
        .bind(id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}
