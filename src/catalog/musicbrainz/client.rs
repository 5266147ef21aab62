//! MusicBrainz HTTP client
//!
//! Handles communication with the MusicBrainz web service.
//! See: https://musicbrainz.org/doc/MusicBrainz_API
//!
//! IMPORTANT: MusicBrainz requires a User-Agent header and rate limits to 1 req/sec.

use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use tokio::sync::Mutex;
use tokio::time::Instant;

use super::{adapter, dto};
use crate::catalog::domain::{Album, Artist, CatalogError, ProviderId, Track};
use crate::catalog::http;
use crate::catalog::traits::{ArtistDiscography, MusicProvider};

/// User agent string - MusicBrainz requires this
const USER_AGENT: &str = concat!(
    "MusicCatalog/",
    env!("CARGO_PKG_VERSION"),
    " (https://github.com/music-catalog)"
);

/// Minimum spacing between requests
const MIN_INTERVAL: Duration = Duration::from_millis(1000);

/// Search and browse endpoints return at most 100 entities
const MAX_PAGE: usize = 100;

/// MusicBrainz API client
pub struct MusicBrainzProvider {
    http_client: reqwest::Client,
    base_url: String,
    /// Time of the last request; held while waiting so callers queue up
    last_request: Mutex<Option<Instant>>,
}

impl MusicBrainzProvider {
    /// Create a new client
    pub fn new() -> Result<Self, CatalogError> {
        Self::with_base_url("https://musicbrainz.org/ws/2")
    }

    /// Create a client against another MusicBrainz mirror
    pub fn with_base_url(base_url: impl Into<String>) -> Result<Self, CatalogError> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| CatalogError::Configuration(format!("musicbrainz http client: {}", e)))?;

        Ok(Self {
            http_client,
            base_url: base_url.into(),
            last_request: Mutex::new(None),
        })
    }

    /// Wait until a request is allowed under the 1 req/sec policy.
    async fn throttle(&self) {
        let mut last = self.last_request.lock().await;
        if let Some(prev) = *last {
            let elapsed = prev.elapsed();
            if elapsed < MIN_INTERVAL {
                tokio::time::sleep(MIN_INTERVAL - elapsed).await;
            }
        }
        *last = Some(Instant::now());
    }

    /// Send the HTTP request and parse the response
    async fn get<T: DeserializeOwned>(&self, path: &str, what: &str) -> Result<T, CatalogError> {
        self.throttle().await;

        let url = format!("{}{}", self.base_url, path);
        tracing::debug!("MusicBrainz GET {}", url);

        let response = self
            .http_client
            .get(&url)
            .send()
            .await
            .map_err(http::network)?;

        http::decode(ProviderId::MusicBrainz, what, response).await
    }
}

fn search_path(entity: &str, query: &str, limit: usize) -> String {
    format!(
        "/{}?query={}&fmt=json&limit={}",
        entity,
        urlencoding::encode(query),
        http::clamp_limit(limit, MAX_PAGE)
    )
}

fn lookup_path(entity: &str, id: &str, inc: &str) -> String {
    format!(
        "/{}/{}?fmt=json&inc={}",
        entity,
        urlencoding::encode(id),
        inc
    )
}

#[async_trait]
impl MusicProvider for MusicBrainzProvider {
    fn id(&self) -> ProviderId {
        ProviderId::MusicBrainz
    }

    async fn search_artists(&self, query: &str, limit: usize) -> Result<Vec<Artist>, CatalogError> {
        let search: dto::ArtistSearch = self
            .get(&search_path("artist", query, limit), "artist search")
            .await?;
        Ok(search.artists.into_iter().map(adapter::to_artist).collect())
    }

    async fn search_albums(&self, query: &str, limit: usize) -> Result<Vec<Album>, CatalogError> {
        let search: dto::ReleaseList = self
            .get(&search_path("release", query, limit), "release search")
            .await?;
        Ok(search.releases.iter().map(adapter::to_album).collect())
    }

    async fn search_tracks(&self, query: &str, limit: usize) -> Result<Vec<Track>, CatalogError> {
        let search: dto::RecordingSearch = self
            .get(&search_path("recording", query, limit), "recording search")
            .await?;
        Ok(search.recordings.into_iter().map(adapter::to_track).collect())
    }

    async fn get_artist(&self, id: &str) -> Result<Artist, CatalogError> {
        let artist: dto::Artist = self
            .get(&lookup_path("artist", id, "tags+genres"), &format!("artist {}", id))
            .await?;
        Ok(adapter::to_artist(artist))
    }

    async fn get_album(&self, id: &str) -> Result<(Album, Vec<Track>), CatalogError> {
        let release: dto::Release = self
            .get(
                &lookup_path("release", id, "artist-credits+recordings+isrcs+release-groups+genres"),
                &format!("release {}", id),
            )
            .await?;
        Ok(adapter::to_album_with_tracks(release))
    }

    async fn get_track(&self, id: &str) -> Result<Track, CatalogError> {
        let recording: dto::Recording = self
            .get(
                &lookup_path("recording", id, "artist-credits+releases+release-groups+isrcs"),
                &format!("recording {}", id),
            )
            .await?;
        Ok(adapter::to_track(recording))
    }

    fn discography(&self) -> Option<&dyn ArtistDiscography> {
        Some(self)
    }
}

#[async_trait]
impl ArtistDiscography for MusicBrainzProvider {
    /// Official album releases credited to the artist (browse, not search).
    async fn artist_albums(&self, artist_id: &str, limit: usize) -> Result<Vec<Album>, CatalogError> {
        let path = format!(
            "/release?artist={}&type=album&status=official&inc=artist-credits+release-groups&fmt=json&limit={}",
            urlencoding::encode(artist_id),
            http::clamp_limit(limit, MAX_PAGE)
        );
        let list: dto::ReleaseList = self.get(&path, &format!("artist {}", artist_id)).await?;
        Ok(list.releases.iter().map(adapter::to_album).collect())
    }
}
