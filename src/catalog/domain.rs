//! Provider-neutral catalog models.
//!
//! Every adapter converts its API responses into these types. They are plain
//! values with no lifecycle: they live only for the duration of a search or
//! import call.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Default page size when a caller asks for `limit == 0`.
pub const DEFAULT_SEARCH_LIMIT: usize = 20;

/// External metadata services we know how to talk to.
///
/// Declaration order is also registry iteration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderId {
    Spotify,
    AppleMusic,
    #[serde(rename = "musicbrainz")]
    MusicBrainz,
}

impl ProviderId {
    /// All known providers, in registry order.
    pub const ALL: [ProviderId; 3] = [
        ProviderId::Spotify,
        ProviderId::AppleMusic,
        ProviderId::MusicBrainz,
    ];

    /// Wire name used in config, CLI arguments and stored rows.
    pub fn as_str(self) -> &'static str {
        match self {
            ProviderId::Spotify => "spotify",
            ProviderId::AppleMusic => "apple_music",
            ProviderId::MusicBrainz => "musicbrainz",
        }
    }
}

impl fmt::Display for ProviderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProviderId {
    type Err = CatalogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "spotify" => Ok(ProviderId::Spotify),
            "apple_music" | "applemusic" | "apple" => Ok(ProviderId::AppleMusic),
            "musicbrainz" => Ok(ProviderId::MusicBrainz),
            other => Err(CatalogError::InvalidInput(format!(
                "unknown provider '{}'",
                other
            ))),
        }
    }
}

/// Which providers a search should fan out to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProviderSelector {
    /// Every configured provider
    #[default]
    All,
    /// Exactly one provider (skipped silently if unconfigured)
    One(ProviderId),
}

impl FromStr for ProviderSelector {
    type Err = CatalogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() || s.eq_ignore_ascii_case("all") {
            return Ok(ProviderSelector::All);
        }
        s.parse().map(ProviderSelector::One)
    }
}

/// Which typed search to run on each provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResultType {
    Artist,
    Album,
    Track,
    /// Use the provider's combined search
    #[default]
    All,
}

impl FromStr for ResultType {
    type Err = CatalogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "all" => Ok(ResultType::All),
            "artist" | "artists" => Ok(ResultType::Artist),
            "album" | "albums" => Ok(ResultType::Album),
            "track" | "tracks" | "song" | "songs" => Ok(ResultType::Track),
            other => Err(CatalogError::InvalidInput(format!(
                "unknown result type '{}'",
                other
            ))),
        }
    }
}

/// An artist as reported by one provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Artist {
    pub external_id: String,
    /// Display name; this is the storage identity (exact, case-sensitive)
    pub name: String,
    pub provider: ProviderId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub biography: Option<String>,
    #[serde(default)]
    pub genres: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub popularity: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_url: Option<String>,
}

/// An album as reported by one provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Album {
    pub external_id: String,
    pub title: String,
    /// Artist display name
    pub artist: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub artist_external_id: Option<String>,
    pub provider: ProviderId,
    /// Explicit year if the provider reports one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub release_year: Option<i32>,
    /// Raw release date (YYYY, YYYY-MM or YYYY-MM-DD)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub release_date: Option<String>,
    /// Single genre string, possibly comma-joined
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub genre: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cover_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub track_count: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_url: Option<String>,
}

/// A track as reported by one provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Track {
    pub external_id: String,
    pub title: String,
    /// Artist display name (may be blank; import falls back to the album artist)
    pub artist: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub artist_external_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub album: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub album_external_id: Option<String>,
    pub provider: ProviderId,
    pub duration_seconds: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub track_number: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub disc_number: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub isrc: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preview_url: Option<String>,
}

/// Provider durations come in milliseconds; rounded to the nearest second.
pub fn millis_to_seconds(ms: u64) -> u32 {
    u32::try_from((ms + 500) / 1000).unwrap_or(u32::MAX)
}

/// Outcome of one provider's task in a fan-out search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ProviderStatus {
    Ok {
        artists: usize,
        albums: usize,
        tracks: usize,
    },
    Failed {
        error: String,
    },
}

impl ProviderStatus {
    pub fn is_failed(&self) -> bool {
        matches!(self, ProviderStatus::Failed { .. })
    }
}

/// Merged search output.
///
/// Sections are appended provider by provider with no cross-provider dedup.
/// Empty sections are omitted when serialized.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchResults {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub artists: Vec<Artist>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub albums: Vec<Album>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tracks: Vec<Track>,
    /// Per-provider outcome, so "no results" and "provider failed" can be told apart
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub provider_status: BTreeMap<ProviderId, ProviderStatus>,
}

impl SearchResults {
    /// True when no artists, albums or tracks were found.
    pub fn is_empty(&self) -> bool {
        self.artists.is_empty() && self.albums.is_empty() && self.tracks.is_empty()
    }

    /// Append another result set, preserving its internal order.
    pub fn append(&mut self, other: SearchResults) {
        self.artists.extend(other.artists);
        self.albums.extend(other.albums);
        self.tracks.extend(other.tracks);
        self.provider_status.extend(other.provider_status);
    }

    /// Section counts as an `Ok` status.
    pub fn status(&self) -> ProviderStatus {
        ProviderStatus::Ok {
            artists: self.artists.len(),
            albums: self.albums.len(),
            tracks: self.tracks.len(),
        }
    }
}

/// Coarse error classes, used for propagation policy and status codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    InvalidInput,
    Authorization,
    Configuration,
    Provider,
    Persistence,
}

impl ErrorKind {
    /// Status code the HTTP boundary reports for this class.
    pub fn http_status(self) -> u16 {
        match self {
            ErrorKind::InvalidInput => 400,
            ErrorKind::Authorization => 401,
            ErrorKind::Configuration => 501,
            ErrorKind::Provider | ErrorKind::Persistence => 500,
        }
    }
}

/// Errors raised by the catalog core and its collaborators.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CatalogError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Unauthorized: {0}")]
    Authorization(String),

    #[error("Provider not configured: {0}")]
    Configuration(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("{provider} API error: {message}")]
    Provider {
        provider: ProviderId,
        message: String,
    },

    #[error("Failed to parse response: {0}")]
    Parse(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("{0} rate limited - try again later")]
    RateLimited(ProviderId),

    #[error("Request cancelled")]
    Cancelled,

    #[error("Deadline exceeded")]
    DeadlineExceeded,

    #[error("Storage error: {0}")]
    Persistence(String),
}

impl CatalogError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            CatalogError::InvalidInput(_) => ErrorKind::InvalidInput,
            CatalogError::Authorization(_) => ErrorKind::Authorization,
            CatalogError::Configuration(_) => ErrorKind::Configuration,
            CatalogError::Persistence(_) => ErrorKind::Persistence,
            CatalogError::Network(_)
            | CatalogError::Provider { .. }
            | CatalogError::Parse(_)
            | CatalogError::NotFound(_)
            | CatalogError::RateLimited(_)
            | CatalogError::Cancelled
            | CatalogError::DeadlineExceeded => ErrorKind::Provider,
        }
    }

    pub fn provider(provider: ProviderId, message: impl Into<String>) -> Self {
        Self::Provider {
            provider,
            message: message.into(),
        }
    }

    pub fn persistence(message: impl fmt::Display) -> Self {
        Self::Persistence(message.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_id_wire_names() {
        for id in ProviderId::ALL {
            assert_eq!(id.as_str().parse::<ProviderId>().unwrap(), id);

            let json = serde_json::to_string(&id).unwrap();
            assert_eq!(json, format!("\"{}\"", id.as_str()));
            assert_eq!(serde_json::from_str::<ProviderId>(&json).unwrap(), id);
        }
        assert!("tidal".parse::<ProviderId>().is_err());
    }

    #[test]
    fn test_selector_parsing() {
        assert_eq!("all".parse::<ProviderSelector>().unwrap(), ProviderSelector::All);
        assert_eq!("".parse::<ProviderSelector>().unwrap(), ProviderSelector::All);
        assert_eq!(
            "spotify".parse::<ProviderSelector>().unwrap(),
            ProviderSelector::One(ProviderId::Spotify)
        );
    }

    #[test]
    fn test_result_type_parsing() {
        assert_eq!("".parse::<ResultType>().unwrap(), ResultType::All);
        assert_eq!("album".parse::<ResultType>().unwrap(), ResultType::Album);
        assert!(matches!(
            "playlist".parse::<ResultType>(),
            Err(CatalogError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_empty_sections_are_omitted() {
        let mut results = SearchResults::default();
        results.provider_status.insert(
            ProviderId::Spotify,
            ProviderStatus::Failed {
                error: "timeout".to_string(),
            },
        );

        let json = serde_json::to_value(&results).unwrap();
        assert!(json.get("artists").is_none());
        assert!(json.get("albums").is_none());
        assert_eq!(json["provider_status"]["spotify"]["status"], "failed");
    }

    #[test]
    fn test_error_kinds_map_to_status_codes() {
        assert_eq!(
            CatalogError::Authorization("x".into()).kind().http_status(),
            401
        );
        assert_eq!(
            CatalogError::Configuration("x".into()).kind().http_status(),
            501
        );
        assert_eq!(CatalogError::Cancelled.kind(), ErrorKind::Provider);
        assert_eq!(CatalogError::persistence("disk full").kind().http_status(), 500);
        assert_eq!(CatalogError::InvalidInput("x".into()).kind().http_status(), 400);
    }

    #[test]
    fn test_millis_to_seconds_rounds() {
        assert_eq!(millis_to_seconds(0), 0);
        assert_eq!(millis_to_seconds(1_499), 1);
        assert_eq!(millis_to_seconds(1_500), 2);
    }
}
