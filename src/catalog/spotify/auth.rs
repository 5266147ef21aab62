//! Client-credentials token management.
//!
//! Spotify app tokens live for an hour. The cached token is reused until it
//! is within [`REFRESH_MARGIN`] of expiry, then replaced before the next call.

use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::Instant;

use super::dto;
use crate::catalog::domain::{CatalogError, ProviderId};
use crate::catalog::http;
use crate::config::SpotifyCredentials;

pub const TOKEN_URL: &str = "https://accounts.spotify.com/api/token";

/// Refresh this long before the token actually expires.
pub const REFRESH_MARGIN: Duration = Duration::from_secs(60);

#[derive(Debug, Clone)]
pub(crate) struct CachedToken {
    pub access_token: String,
    pub expires_at: Instant,
}

impl CachedToken {
    pub fn new(access_token: String, expires_in: Duration, now: Instant) -> Self {
        Self {
            access_token,
            expires_at: now + expires_in,
        }
    }

    /// Usable without refresh at `now`.
    pub fn is_fresh(&self, now: Instant) -> bool {
        now + REFRESH_MARGIN < self.expires_at
    }
}

pub(crate) struct TokenSource {
    http_client: reqwest::Client,
    token_url: String,
    client_id: String,
    client_secret: String,
    cached: Mutex<Option<CachedToken>>,
}

impl TokenSource {
    pub fn new(http_client: reqwest::Client, creds: &SpotifyCredentials) -> Self {
        Self {
            http_client,
            token_url: TOKEN_URL.to_string(),
            client_id: creds.client_id.clone(),
            client_secret: creds.client_secret.clone(),
            cached: Mutex::new(None),
        }
    }

    /// Current bearer token, fetching a new one when needed.
    ///
    /// The lock is held across the token request so concurrent searches
    /// share a single refresh.
    pub async fn access_token(&self) -> Result<String, CatalogError> {
        let mut cached = self.cached.lock().await;

        if let Some(token) = cached.as_ref().filter(|t| t.is_fresh(Instant::now())) {
            return Ok(token.access_token.clone());
        }

        tracing::debug!("Requesting Spotify access token");
        let response = self
            .http_client
            .post(&self.token_url)
            .basic_auth(&self.client_id, Some(&self.client_secret))
            .form(&[("grant_type", "client_credentials")])
            .send()
            .await
            .map_err(http::network)?;

        let token: dto::TokenResponse =
            http::decode(ProviderId::Spotify, "token", response).await?;

        let fresh = CachedToken::new(
            token.access_token,
            Duration::from_secs(token.expires_in),
            Instant::now(),
        );
        let access_token = fresh.access_token.clone();
        *cached = Some(fresh);
        Ok(access_token)
    }

    /// Drop the cached token after the API rejected it.
    pub async fn invalidate(&self) {
        *self.cached.lock().await = None;
    }

    #[cfg(test)]
    pub async fn seed(&self, token: CachedToken) {
        *self.cached.lock().await = Some(token);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_freshness_honours_margin() {
        let now = Instant::now();
        let token = CachedToken::new("t".to_string(), Duration::from_secs(3600), now);

        assert!(token.is_fresh(now));
        assert!(token.is_fresh(now + Duration::from_secs(3500)));
        // Inside the last minute it must be refreshed
        assert!(!token.is_fresh(now + Duration::from_secs(3541)));
        assert!(!token.is_fresh(now + Duration::from_secs(4000)));
    }

    #[test]
    fn test_short_lived_token_is_never_fresh() {
        let now = Instant::now();
        let token = CachedToken::new("t".to_string(), Duration::from_secs(30), now);
        assert!(!token.is_fresh(now));
    }

    #[tokio::test]
    async fn test_seeded_token_is_reused_without_network() {
        let source = TokenSource::new(
            reqwest::Client::new(),
            &SpotifyCredentials {
                client_id: "id".to_string(),
                client_secret: "secret".to_string(),
            },
        );
        source
            .seed(CachedToken::new(
                "cached".to_string(),
                Duration::from_secs(3600),
                Instant::now(),
            ))
            .await;

        assert_eq!(source.access_token().await.unwrap(), "cached");
    }
}
