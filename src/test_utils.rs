//! Test utilities and fixtures for music-catalog tests.
//!
//! This module provides database helpers to reduce boilerplate in tests.
//!
//! # Example
//!
//! ```ignore
//! use music_catalog::test_utils::{temp_db, insert_user_with_token};
//!
//! #[tokio::test]
//! async fn test_something() {
//!     let (pool, _dir) = temp_db().await;
//!     let user_id = insert_user_with_token(&pool, "alice", "token").await;
//!     // ... test logic
//! }
//! ```

use sqlx::sqlite::SqlitePool;
use tempfile::TempDir;

/// Creates a temporary database for testing.
///
/// The database is created in a temporary directory that is automatically
/// cleaned up when the returned `TempDir` is dropped. Migrations are run
/// automatically.
///
/// Keep the TempDir alive for the duration of your test.
pub async fn temp_db() -> (SqlitePool, TempDir) {
    let dir = tempfile::tempdir().expect("Failed to create temp directory");
    let db_path = dir.path().join("test.db");

    let pool = crate::db::init_db(&crate::db::db_url(Some(&db_path)))
        .await
        .expect("Failed to initialize test database");

    (pool, dir)
}

/// Inserts a user with a non-expiring session token and returns the user id.
pub async fn insert_user_with_token(pool: &SqlitePool, username: &str, token: &str) -> i64 {
    let user_id = sqlx::query("INSERT INTO users (username) VALUES (?)")
        .bind(username)
        .execute(pool)
        .await
        .expect("Failed to insert user")
        .last_insert_rowid();

    sqlx::query("INSERT INTO sessions (token_hash, user_id, expires_at) VALUES (?, ?, NULL)")
        .bind(crate::db::hash_token(token))
        .bind(user_id)
        .execute(pool)
        .await
        .expect("Failed to insert session");

    user_id
}

/// Simulates a user editing their rating outside the import flow.
pub async fn set_album_rating(pool: &SqlitePool, album_id: i64, rating: i32) {
    sqlx::query("UPDATE albums SET rating = ? WHERE id = ?")
        .bind(rating)
        .bind(album_id)
        .execute(pool)
        .await
        .expect("Failed to set rating");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_temp_db_creates_working_database() {
        let (pool, _dir) = temp_db().await;

        // Should be able to query
        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM albums")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(count.0, 0);
    }

    #[tokio::test]
    async fn test_insert_user_with_token() {
        let (pool, _dir) = temp_db().await;

        let a = insert_user_with_token(&pool, "alice", "t1").await;
        let b = insert_user_with_token(&pool, "bob", "t2").await;
        assert!(a > 0);
        assert_ne!(a, b);

        let sessions: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM sessions")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(sessions.0, 2);
    }
}
