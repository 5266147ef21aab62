//! Spotify Web API client
//!
//! Handles communication with the Spotify Web API using an app-only
//! (client-credentials) token.
//! See: https://developer.spotify.com/documentation/web-api

use async_trait::async_trait;
use serde::de::DeserializeOwned;

use super::auth::TokenSource;
use super::{adapter, dto};
use crate::catalog::domain::{Album, Artist, CatalogError, ProviderId, SearchResults, Track};
use crate::catalog::http;
use crate::catalog::traits::{ArtistDiscography, MusicProvider};
use crate::config::SpotifyCredentials;

const BASE_URL: &str = "https://api.spotify.com/v1";

/// Search and browse endpoints accept at most 50 items per page
const MAX_PAGE: usize = 50;

pub struct SpotifyProvider {
    http_client: reqwest::Client,
    base_url: String,
    auth: TokenSource,
}

impl SpotifyProvider {
    /// Build the adapter. No request is made until the first call.
    pub fn new(creds: &SpotifyCredentials) -> Result<Self, CatalogError> {
        if creds.client_id.trim().is_empty() || creds.client_secret.trim().is_empty() {
            return Err(CatalogError::Configuration(
                "spotify client_id and client_secret must be set".to_string(),
            ));
        }

        let http_client = reqwest::Client::builder()
            .user_agent(concat!("music-catalog/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| CatalogError::Configuration(format!("spotify http client: {}", e)))?;

        Ok(Self {
            auth: TokenSource::new(http_client.clone(), creds),
            http_client,
            base_url: BASE_URL.to_string(),
        })
    }

    /// Authenticated GET against `base_url + path`.
    async fn get<T: DeserializeOwned>(&self, path: &str, what: &str) -> Result<T, CatalogError> {
        let token = self.auth.access_token().await?;
        let url = format!("{}{}", self.base_url, path);
        tracing::debug!("Spotify GET {}", url);

        let response = self
            .http_client
            .get(&url)
            .bearer_auth(token)
            .send()
            .await
            .map_err(http::network)?;

        if response.status() == reqwest::StatusCode::UNAUTHORIZED {
            // Revoked early; the next call fetches a new token
            self.auth.invalidate().await;
        }

        http::decode(ProviderId::Spotify, what, response).await
    }

    async fn search_raw(
        &self,
        query: &str,
        types: &str,
        limit: usize,
    ) -> Result<dto::SearchResponse, CatalogError> {
        let path = search_path(query, types, limit);
        self.get(&path, "search").await
    }
}

fn search_path(query: &str, types: &str, limit: usize) -> String {
    format!(
        "/search?q={}&type={}&limit={}",
        urlencoding::encode(query),
        types,
        http::clamp_limit(limit, MAX_PAGE)
    )
}

fn items<T>(page: Option<dto::Paging<T>>) -> Vec<T> {
    page.map(|p| p.items).unwrap_or_default()
}

#[async_trait]
impl MusicProvider for SpotifyProvider {
    fn id(&self) -> ProviderId {
        ProviderId::Spotify
    }

    async fn search_artists(&self, query: &str, limit: usize) -> Result<Vec<Artist>, CatalogError> {
        let response = self.search_raw(query, "artist", limit).await?;
        Ok(items(response.artists).into_iter().map(adapter::to_artist).collect())
    }

    async fn search_albums(&self, query: &str, limit: usize) -> Result<Vec<Album>, CatalogError> {
        let response = self.search_raw(query, "album", limit).await?;
        Ok(items(response.albums).into_iter().map(adapter::to_album).collect())
    }

    async fn search_tracks(&self, query: &str, limit: usize) -> Result<Vec<Track>, CatalogError> {
        let response = self.search_raw(query, "track", limit).await?;
        Ok(items(response.tracks).into_iter().map(adapter::to_track).collect())
    }

    /// One request for all three sections.
    async fn search(&self, query: &str, limit: usize) -> Result<SearchResults, CatalogError> {
        let response = self.search_raw(query, "artist,album,track", limit).await?;
        Ok(SearchResults {
            artists: items(response.artists).into_iter().map(adapter::to_artist).collect(),
            albums: items(response.albums).into_iter().map(adapter::to_album).collect(),
            tracks: items(response.tracks).into_iter().map(adapter::to_track).collect(),
            ..Default::default()
        })
    }

    async fn get_artist(&self, id: &str) -> Result<Artist, CatalogError> {
        let path = format!("/artists/{}", urlencoding::encode(id));
        let artist: dto::Artist = self.get(&path, &format!("artist {}", id)).await?;
        Ok(adapter::to_artist(artist))
    }

    async fn get_album(&self, id: &str) -> Result<(Album, Vec<Track>), CatalogError> {
        let path = format!("/albums/{}", urlencoding::encode(id));
        let album: dto::Album = self.get(&path, &format!("album {}", id)).await?;
        Ok(adapter::to_album_with_tracks(album))
    }

    async fn get_track(&self, id: &str) -> Result<Track, CatalogError> {
        let path = format!("/tracks/{}", urlencoding::encode(id));
        let track: dto::Track = self.get(&path, &format!("track {}", id)).await?;
        Ok(adapter::to_track(track))
    }

    fn discography(&self) -> Option<&dyn ArtistDiscography> {
        Some(self)
    }
}

#[async_trait]
impl ArtistDiscography for SpotifyProvider {
    async fn artist_albums(&self, artist_id: &str, limit: usize) -> Result<Vec<Album>, CatalogError> {
        let path = format!(
            "/artists/{}/albums?include_groups=album,single,compilation&limit={}",
            urlencoding::encode(artist_id),
            http::clamp_limit(limit, MAX_PAGE)
        );
        let page: dto::Paging<dto::SimplifiedAlbum> =
            self.get(&path, &format!("artist {}", artist_id)).await?;
        Ok(page.items.into_iter().map(adapter::to_album).collect())
    }
}
