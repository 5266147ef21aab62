//! Provider registry: maps a [`ProviderId`] to its configured adapter.
//!
//! A provider is available iff its adapter was constructed, which only happens
//! when its credentials are present. Search treats absence as "skip"; import
//! treats it as a configuration error.

use std::sync::Arc;

use super::apple_music::AppleMusicProvider;
use super::domain::{CatalogError, ProviderId, ProviderSelector};
use super::musicbrainz::MusicBrainzProvider;
use super::spotify::SpotifyProvider;
use super::traits::MusicProvider;
use crate::config::ProvidersConfig;

#[derive(Clone, Default)]
pub struct ProviderRegistry {
    /// Kept sorted by `ProviderId` so iteration order is stable
    providers: Vec<Arc<dyn MusicProvider>>,
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build every adapter whose credentials are configured.
    ///
    /// An adapter that fails to construct (bad key, TLS init failure) is
    /// logged and left out, exactly as if it were unconfigured.
    pub fn from_config(config: &ProvidersConfig) -> Self {
        let mut registry = Self::new();

        if let Some(ref creds) = config.spotify {
            match SpotifyProvider::new(creds) {
                Ok(p) => registry = registry.with_provider(Arc::new(p)),
                Err(e) => tracing::error!("Spotify adapter disabled: {}", e),
            }
        }

        if let Some(ref creds) = config.apple_music {
            match AppleMusicProvider::new(creds) {
                Ok(p) => registry = registry.with_provider(Arc::new(p)),
                Err(e) => tracing::error!("Apple Music adapter disabled: {}", e),
            }
        }

        if config.musicbrainz.enabled {
            match MusicBrainzProvider::new() {
                Ok(p) => registry = registry.with_provider(Arc::new(p)),
                Err(e) => tracing::error!("MusicBrainz adapter disabled: {}", e),
            }
        }

        tracing::info!("Configured providers: {:?}", registry.configured());
        registry
    }

    /// Register an adapter, replacing any existing one with the same id.
    pub fn with_provider(mut self, provider: Arc<dyn MusicProvider>) -> Self {
        let id = provider.id();
        self.providers.retain(|p| p.id() != id);
        self.providers.push(provider);
        self.providers.sort_by_key(|p| p.id());
        self
    }

    pub fn get(&self, id: ProviderId) -> Option<Arc<dyn MusicProvider>> {
        self.providers.iter().find(|p| p.id() == id).cloned()
    }

    /// Like [`get`](Self::get), but absence is an error.
    pub fn require(&self, id: ProviderId) -> Result<Arc<dyn MusicProvider>, CatalogError> {
        self.get(id)
            .ok_or_else(|| CatalogError::Configuration(format!("{} is not configured", id)))
    }

    /// Providers a search should dispatch to. Unconfigured ones are skipped.
    pub fn select(&self, selector: &ProviderSelector) -> Vec<Arc<dyn MusicProvider>> {
        match selector {
            ProviderSelector::All => self.providers.clone(),
            ProviderSelector::One(id) => self.get(*id).into_iter().collect(),
        }
    }

    pub fn configured(&self) -> Vec<ProviderId> {
        self.providers.iter().map(|p| p.id()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }
}
