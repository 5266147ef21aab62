//! Apple Music catalog API client
//!
//! Every request carries a developer token in the `Authorization` header.
//! The storefront (country) comes from config.
//! See: https://developer.apple.com/documentation/applemusicapi

use async_trait::async_trait;
use serde::de::DeserializeOwned;

use super::token::DeveloperTokenSigner;
use super::{adapter, dto};
use crate::catalog::domain::{Album, Artist, CatalogError, ProviderId, SearchResults, Track};
use crate::catalog::http;
use crate::catalog::traits::MusicProvider;
use crate::config::AppleMusicCredentials;

const BASE_URL: &str = "https://api.music.apple.com/v1";

/// Catalog search returns at most 25 items per type
const MAX_PAGE: usize = 25;

pub struct AppleMusicProvider {
    http_client: reqwest::Client,
    base_url: String,
    storefront: String,
    signer: DeveloperTokenSigner,
}

impl AppleMusicProvider {
    /// Build the adapter, reading and validating the signing key up front.
    pub fn new(creds: &AppleMusicCredentials) -> Result<Self, CatalogError> {
        if creds.team_id.trim().is_empty() || creds.key_id.trim().is_empty() {
            return Err(CatalogError::Configuration(
                "apple music team_id and key_id must be set".to_string(),
            ));
        }

        let pem = creds
            .private_key_pem()
            .map_err(|e| CatalogError::Configuration(e.to_string()))?;
        let signer = DeveloperTokenSigner::new(&creds.team_id, &creds.key_id, &pem)?;

        let http_client = reqwest::Client::builder()
            .user_agent(concat!("music-catalog/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| CatalogError::Configuration(format!("apple music http client: {}", e)))?;

        Ok(Self {
            http_client,
            base_url: BASE_URL.to_string(),
            storefront: creds.storefront.clone(),
            signer,
        })
    }

    /// GET `{base}/catalog/{storefront}{path}` with a developer token.
    async fn get<T: DeserializeOwned>(&self, path: &str, what: &str) -> Result<T, CatalogError> {
        let token = self.signer.token()?;
        let url = format!("{}/catalog/{}{}", self.base_url, self.storefront, path);
        tracing::debug!("Apple Music GET {}", url);

        let response = self
            .http_client
            .get(&url)
            .bearer_auth(token)
            .send()
            .await
            .map_err(http::network)?;

        http::decode(ProviderId::AppleMusic, what, response).await
    }

    async fn search_raw(
        &self,
        query: &str,
        types: &str,
        limit: usize,
    ) -> Result<dto::SearchResults, CatalogError> {
        let response: dto::SearchResponse = self.get(&search_path(query, types, limit), "search").await?;
        Ok(response.results)
    }

    /// Lookups answer `{"data": [resource]}`; an empty list means not found.
    async fn lookup<A: DeserializeOwned>(
        &self,
        path: &str,
        what: &str,
    ) -> Result<dto::Resource<A>, CatalogError> {
        let response: dto::ResponseData<A> = self.get(path, what).await?;
        response
            .data
            .into_iter()
            .next()
            .ok_or_else(|| CatalogError::NotFound(format!("{} {}", ProviderId::AppleMusic, what)))
    }
}

fn search_path(query: &str, types: &str, limit: usize) -> String {
    format!(
        "/search?term={}&types={}&limit={}",
        urlencoding::encode(query),
        types,
        http::clamp_limit(limit, MAX_PAGE)
    )
}

fn convert<A, T>(
    section: Option<dto::ResponseData<A>>,
    f: fn(dto::Resource<A>) -> Option<T>,
) -> Vec<T> {
    section
        .map(|s| s.data)
        .unwrap_or_default()
        .into_iter()
        .filter_map(f)
        .collect()
}

fn missing_attributes(what: &str) -> CatalogError {
    CatalogError::Parse(format!("{} lookup returned no attributes", what))
}

#[async_trait]
impl MusicProvider for AppleMusicProvider {
    fn id(&self) -> ProviderId {
        ProviderId::AppleMusic
    }

    async fn search_artists(&self, query: &str, limit: usize) -> Result<Vec<Artist>, CatalogError> {
        let results = self.search_raw(query, "artists", limit).await?;
        Ok(convert(results.artists, adapter::to_artist))
    }

    async fn search_albums(&self, query: &str, limit: usize) -> Result<Vec<Album>, CatalogError> {
        let results = self.search_raw(query, "albums", limit).await?;
        Ok(convert(results.albums, adapter::to_album))
    }

    async fn search_tracks(&self, query: &str, limit: usize) -> Result<Vec<Track>, CatalogError> {
        let results = self.search_raw(query, "songs", limit).await?;
        Ok(convert(results.songs, adapter::to_track))
    }

    /// One request for all three sections.
    async fn search(&self, query: &str, limit: usize) -> Result<SearchResults, CatalogError> {
        let results = self.search_raw(query, "artists,albums,songs", limit).await?;
        Ok(SearchResults {
            artists: convert(results.artists, adapter::to_artist),
            albums: convert(results.albums, adapter::to_album),
            tracks: convert(results.songs, adapter::to_track),
            ..Default::default()
        })
    }

    async fn get_artist(&self, id: &str) -> Result<Artist, CatalogError> {
        let what = format!("artist {}", id);
        let path = format!("/artists/{}", urlencoding::encode(id));
        let resource = self.lookup::<dto::ArtistAttributes>(&path, &what).await?;
        adapter::to_artist(resource).ok_or_else(|| missing_attributes(&what))
    }

    async fn get_album(&self, id: &str) -> Result<(Album, Vec<Track>), CatalogError> {
        let what = format!("album {}", id);
        let path = format!("/albums/{}?include=tracks,artists", urlencoding::encode(id));
        let resource = self.lookup::<dto::AlbumAttributes>(&path, &what).await?;
        adapter::to_album_with_tracks(resource).ok_or_else(|| missing_attributes(&what))
    }

    async fn get_track(&self, id: &str) -> Result<Track, CatalogError> {
        let what = format!("track {}", id);
        let path = format!("/songs/{}?include=albums,artists", urlencoding::encode(id));
        let resource = self.lookup::<dto::SongAttributes>(&path, &what).await?;
        adapter::to_track(resource).ok_or_else(|| missing_attributes(&what))
    }
}
