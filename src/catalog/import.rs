//! Catalog import: copy one provider album and its tracks into a user's
//! local catalog.
//!
//! The flow is:
//! 1. Resolve the bearer token to a user
//! 2. Resolve the named provider (unconfigured is an error here, unlike search)
//! 3. Fetch album + tracks from that one provider (all or nothing)
//! 4. Upsert the album by (user, artist, title)
//! 5. Insert only the tracks missing locally
//!
//! Writes are sequential and not wrapped in a transaction. A failure between
//! the album upsert and the last track insert leaves a partial track set;
//! re-running the import fills in the gaps.

use std::sync::Arc;

use serde::Serialize;

use super::context::CallContext;
use super::domain::{Album, CatalogError, ProviderId, Track};
use super::registry::ProviderRegistry;
use super::traits::CatalogStore;
use crate::model::{AlbumRefresh, DEFAULT_RATING, NewAlbum, NewSong};

/// Year stored when neither an explicit year nor a parseable date exists.
pub const FALLBACK_RELEASE_YEAR: i32 = 1970;

/// What one import call did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImportReport {
    pub album_id: i64,
    /// True when the album row was inserted rather than refreshed
    pub created: bool,
    pub tracks_added: usize,
    /// Tracks already present locally
    pub tracks_skipped: usize,
    /// Tracks whose existence check or insert failed (logged, not fatal)
    pub tracks_failed: usize,
}

pub struct ImportPipeline {
    registry: Arc<ProviderRegistry>,
    store: Arc<dyn CatalogStore>,
}

impl ImportPipeline {
    pub fn new(registry: Arc<ProviderRegistry>, store: Arc<dyn CatalogStore>) -> Self {
        Self { registry, store }
    }

    /// Import `external_album_id` from `provider` for the user behind `token`.
    ///
    /// Returns the local album id. Calling this twice with the same arguments
    /// returns the same id and never duplicates tracks.
    pub async fn import_album_for_user(
        &self,
        ctx: &CallContext,
        token: &str,
        external_album_id: &str,
        provider: ProviderId,
    ) -> Result<i64, CatalogError> {
        self.import_album_detailed(ctx, token, external_album_id, provider)
            .await
            .map(|report| report.album_id)
    }

    /// Same as [`import_album_for_user`](Self::import_album_for_user), with a
    /// breakdown of what changed.
    pub async fn import_album_detailed(
        &self,
        ctx: &CallContext,
        token: &str,
        external_album_id: &str,
        provider: ProviderId,
    ) -> Result<ImportReport, CatalogError> {
        let token = token.trim();
        if token.is_empty() {
            return Err(CatalogError::Authorization(
                "missing bearer token".to_string(),
            ));
        }

        let external_album_id = external_album_id.trim();
        if external_album_id.is_empty() {
            return Err(CatalogError::InvalidInput("album_id is required".to_string()));
        }

        let user_id = self
            .store
            .user_id_by_token(token)
            .await
            .map_err(|e| match e {
                CatalogError::Authorization(_) => e,
                other => CatalogError::Authorization(other.to_string()),
            })?;

        let adapter = self.registry.require(provider)?;

        let (album, tracks) = ctx.run(adapter.get_album(external_album_id)).await?;
        tracing::debug!(
            provider = %provider,
            album = %album.title,
            tracks = tracks.len(),
            "Fetched album detail"
        );

        let (album_id, created) = self.upsert_album(user_id, &album, &tracks).await?;
        let mut report = ImportReport {
            album_id,
            created,
            tracks_added: 0,
            tracks_skipped: 0,
            tracks_failed: 0,
        };

        self.reconcile_tracks(&album, &tracks, &mut report).await;

        tracing::info!(
            user_id,
            album_id,
            created,
            added = report.tracks_added,
            skipped = report.tracks_skipped,
            failed = report.tracks_failed,
            "Imported '{}' by {} from {}",
            album.title,
            album.artist,
            provider
        );

        Ok(report)
    }

    /// Insert the album, or refresh the existing row in place.
    async fn upsert_album(
        &self,
        user_id: i64,
        album: &Album,
        tracks: &[Track],
    ) -> Result<(i64, bool), CatalogError> {
        let release_year = resolve_release_year(album.release_year, album.release_date.as_deref());
        let genres = split_genres(album.genre.as_deref());
        let titles: Vec<String> = tracks
            .iter()
            .map(|t| t.title.trim())
            .filter(|t| !t.is_empty())
            .map(str::to_string)
            .collect();

        let existing = self
            .store
            .find_album(user_id, &album.artist, &album.title)
            .await?;

        match existing {
            Some(local) => {
                let refresh = AlbumRefresh {
                    release_year,
                    genres,
                    tracks: titles,
                    cover_url: album.cover_url.clone(),
                };
                self.store.refresh_album(local.id, &refresh).await?;
                Ok((local.id, false))
            }
            None => {
                let new_album = NewAlbum {
                    user_id,
                    title: album.title.clone(),
                    artist: album.artist.clone(),
                    release_year,
                    genres,
                    tracks: titles,
                    rating: DEFAULT_RATING,
                    cover_url: album.cover_url.clone(),
                    provider: album.provider.to_string(),
                    external_id: album.external_id.clone(),
                };
                let id = self.store.insert_album(&new_album).await?;
                Ok((id, true))
            }
        }
    }

    /// Insert tracks not yet stored locally. Per-track failures are logged and
    /// counted, never propagated.
    async fn reconcile_tracks(&self, album: &Album, tracks: &[Track], report: &mut ImportReport) {
        for track in tracks {
            let title = track.title.trim();
            if title.is_empty() {
                continue;
            }
            let artist = match track.artist.trim() {
                "" => album.artist.as_str(),
                a => a,
            };

            match self.store.song_exists(report.album_id, title, artist).await {
                Ok(true) => {
                    report.tracks_skipped += 1;
                    continue;
                }
                Ok(false) => {}
                Err(e) => {
                    tracing::warn!("Existence check failed for '{}': {}", title, e);
                    report.tracks_failed += 1;
                    continue;
                }
            }

            let song = NewSong {
                album_id: report.album_id,
                title: title.to_string(),
                artist: artist.to_string(),
                duration_seconds: i64::from(track.duration_seconds),
                track_number: track.track_number.map(i64::from),
                disc_number: track.disc_number.map(i64::from),
                isrc: track.isrc.clone(),
            };
            match self.store.insert_song(&song).await {
                Ok(_) => report.tracks_added += 1,
                Err(e) => {
                    tracing::warn!("Failed to insert track '{}': {}", title, e);
                    report.tracks_failed += 1;
                }
            }
        }
    }
}

/// Resolve the year stored on a local album.
///
/// Prefers an explicit positive year, then the first four characters of the
/// release date, then [`FALLBACK_RELEASE_YEAR`].
pub fn resolve_release_year(explicit: Option<i32>, release_date: Option<&str>) -> i32 {
    if let Some(year) = explicit.filter(|y| *y > 0) {
        return year;
    }

    release_date
        .and_then(|d| d.get(..4))
        .and_then(|y| y.parse::<i32>().ok())
        .filter(|y| *y > 0)
        .unwrap_or(FALLBACK_RELEASE_YEAR)
}

/// Split a comma-joined provider genre string into a clean list.
pub fn split_genres(raw: Option<&str>) -> Vec<String> {
    raw.unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|g| !g.is_empty())
        .map(str::to_string)
        .collect()
}
