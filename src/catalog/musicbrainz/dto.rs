//! MusicBrainz API Data Transfer Objects
//!
//! These types match EXACTLY what the MusicBrainz API returns.
//! DO NOT add fields that aren't in the API response.
//! DO NOT use these types outside the musicbrainz module - convert to domain types.
//!
//! API Reference: https://musicbrainz.org/doc/MusicBrainz_API
//!
//! Searches use the Lucene `query` endpoints; lookups use `inc=` subqueries to
//! pull artist credits, recordings and genres in one request.

use serde::Deserialize;

/// `/artist?query=` response
#[derive(Debug, Clone, Deserialize)]
pub struct ArtistSearch {
    #[serde(default)]
    pub artists: Vec<Artist>,
}

/// `/release?query=` and `/release?artist=` (browse) response
#[derive(Debug, Clone, Deserialize)]
pub struct ReleaseList {
    #[serde(default)]
    pub releases: Vec<Release>,
}

/// `/recording?query=` response
#[derive(Debug, Clone, Deserialize)]
pub struct RecordingSearch {
    #[serde(default)]
    pub recordings: Vec<Recording>,
}

/// Artist info
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Artist {
    /// MusicBrainz artist ID
    pub id: String,
    /// Official artist name
    pub name: String,
    /// Sort name (e.g., "Beatles, The")
    pub sort_name: Option<String>,
    /// Artist type (Person, Group, etc.)
    #[serde(rename = "type")]
    pub artist_type: Option<String>,
    pub disambiguation: Option<String>,
    pub country: Option<String>,
    /// Search relevance 0-100 (search responses only)
    pub score: Option<u32>,
    #[serde(default)]
    pub tags: Vec<Tag>,
    #[serde(default)]
    pub genres: Vec<Tag>,
}

/// Artist credit (can be multiple for collaborations)
#[derive(Debug, Clone, Deserialize)]
pub struct ArtistCredit {
    /// The artist
    pub artist: CreditedArtist,
    /// How this artist is credited (may differ from official name)
    pub name: Option<String>,
    /// Join phrase (e.g., " & ", " feat. ")
    pub joinphrase: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreditedArtist {
    pub id: String,
    pub name: String,
}

/// Release (album/single/EP)
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Release {
    /// MusicBrainz release ID
    pub id: String,
    /// Release title
    pub title: String,
    /// Release status (Official, Bootleg, etc.)
    pub status: Option<String>,
    /// Release date (YYYY, YYYY-MM, or YYYY-MM-DD)
    pub date: Option<String>,
    /// Country code
    pub country: Option<String>,
    #[serde(default)]
    pub artist_credit: Vec<ArtistCredit>,
    /// Release group (groups same album across editions)
    pub release_group: Option<ReleaseGroup>,
    /// Total track count (search responses)
    pub track_count: Option<u32>,
    /// Media (discs) in this release
    #[serde(default)]
    pub media: Vec<Medium>,
    #[serde(default)]
    pub genres: Vec<Tag>,
    pub cover_art_archive: Option<CoverArtArchive>,
}

/// Release group (e.g., "Abbey Road" across all editions)
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ReleaseGroup {
    /// MusicBrainz release group ID
    pub id: String,
    /// Title
    pub title: Option<String>,
    /// Primary type (Album, Single, EP, etc.)
    pub primary_type: Option<String>,
    /// First release date
    pub first_release_date: Option<String>,
    #[serde(default)]
    pub genres: Vec<Tag>,
}

/// Medium (disc) within a release
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Medium {
    /// Position in release (disc number)
    pub position: Option<u32>,
    /// Format (CD, Vinyl, Digital, etc.)
    pub format: Option<String>,
    /// Number of tracks
    pub track_count: Option<u32>,
    /// Tracks on this medium (lookups with inc=recordings)
    #[serde(default)]
    pub tracks: Vec<MediumTrack>,
}

/// Track on a medium
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct MediumTrack {
    pub id: Option<String>,
    /// Track position on medium
    pub position: Option<u32>,
    /// Track number (may include disc prefix like "1-5")
    pub number: Option<String>,
    /// Track title (may differ from recording title)
    pub title: Option<String>,
    /// Track length in milliseconds
    pub length: Option<u64>,
    #[serde(default)]
    pub artist_credit: Vec<ArtistCredit>,
    pub recording: Option<Recording>,
}

/// Recording (a distinct performance, independent of release)
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Recording {
    /// MusicBrainz recording ID
    pub id: String,
    pub title: String,
    /// Duration in milliseconds
    pub length: Option<u64>,
    #[serde(default)]
    pub artist_credit: Vec<ArtistCredit>,
    /// Releases this recording appears on
    #[serde(default)]
    pub releases: Vec<Release>,
    #[serde(default)]
    pub isrcs: Vec<String>,
}

/// Folksonomy tag or curated genre with its vote count
#[derive(Debug, Clone, Deserialize)]
pub struct Tag {
    pub name: String,
    #[serde(default)]
    pub count: i32,
}

/// Cover Art Archive availability flags on a release
#[derive(Debug, Clone, Deserialize)]
pub struct CoverArtArchive {
    #[serde(default)]
    pub front: bool,
    #[serde(default)]
    pub count: u32,
}

// ============================================================================
// CONTRACT TESTS
// These verify our DTOs match what the real API returns.
// If these fail, the API has changed and we need to update our DTOs.
// ============================================================================
