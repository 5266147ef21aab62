//! Apple Music API Data Transfer Objects
//!
//! These types match what the Apple Music catalog API returns.
//! DO NOT use these types outside the apple_music module - convert to domain types.
//!
//! API Reference: https://developer.apple.com/documentation/applemusicapi

use serde::Deserialize;

/// `/catalog/{storefront}/search` response
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub results: SearchResults,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchResults {
    pub artists: Option<ResponseData<ArtistAttributes>>,
    pub albums: Option<ResponseData<AlbumAttributes>>,
    pub songs: Option<ResponseData<SongAttributes>>,
}

/// Generic `{ "data": [...] }` envelope used by lookups and relationships
#[derive(Debug, Clone, Deserialize)]
pub struct ResponseData<A> {
    #[serde(default = "Vec::new")]
    pub data: Vec<Resource<A>>,
}

/// Catalog resource. Relationship entries may come without attributes.
#[derive(Debug, Clone, Deserialize)]
pub struct Resource<A> {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub attributes: Option<A>,
    #[serde(default)]
    pub relationships: Relationships,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Relationships {
    pub tracks: Option<ResponseData<SongAttributes>>,
    pub artists: Option<ResponseData<ArtistAttributes>>,
    pub albums: Option<ResponseData<AlbumAttributes>>,
}

/// Artwork with a `{w}x{h}` URL template
#[derive(Debug, Clone, Deserialize)]
pub struct Artwork {
    pub url: String,
    pub width: Option<u32>,
    pub height: Option<u32>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EditorialNotes {
    pub standard: Option<String>,
    pub short: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArtistAttributes {
    pub name: String,
    #[serde(default)]
    pub genre_names: Vec<String>,
    pub url: Option<String>,
    pub artwork: Option<Artwork>,
    pub editorial_notes: Option<EditorialNotes>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlbumAttributes {
    pub name: String,
    pub artist_name: String,
    /// YYYY-MM-DD, occasionally only YYYY
    pub release_date: Option<String>,
    #[serde(default)]
    pub genre_names: Vec<String>,
    pub artwork: Option<Artwork>,
    pub track_count: Option<u32>,
    pub url: Option<String>,
    pub record_label: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Preview {
    pub url: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SongAttributes {
    pub name: String,
    pub artist_name: String,
    pub album_name: Option<String>,
    pub duration_in_millis: Option<u64>,
    pub track_number: Option<u32>,
    pub disc_number: Option<u32>,
    pub isrc: Option<String>,
    pub url: Option<String>,
    #[serde(default)]
    pub previews: Vec<Preview>,
}

// ============================================================================
// CONTRACT TESTS
// ============================================================================

#[cfg(test)]
mod contract_tests {
    use super::*;

    #[test]
    fn test_parse_search_response() {
        let json = r#"{
            "results": {
                "albums": {
                    "href": "/v1/catalog/us/search?term=geogaddi&types=albums",
                    "data": [{
                        "id": "1434371887",
                        "type": "albums",
                        "attributes": {
                            "name": "Geogaddi",
                            "artistName": "Boards of Canada",
                            "releaseDate": "2002-02-18",
                            "genreNames": ["Electronic", "Music"],
                            "artwork": {"url": "https://is1.mzstatic.com/{w}x{h}bb.jpg", "width": 1400, "height": 1400},
                            "trackCount": 23,
                            "url": "https://music.apple.com/us/album/geogaddi/1434371887"
                        }
                    }]
                }
            }
        }"#;

        let response: SearchResponse = serde_json::from_str(json).expect("Should parse search");
        let albums = response.results.albums.unwrap();
        let attrs = albums.data[0].attributes.as_ref().unwrap();
        assert_eq!(attrs.artist_name, "Boards of Canada");
        assert_eq!(attrs.track_count, Some(23));
        assert!(response.results.artists.is_none());
    }

    #[test]
    fn test_parse_empty_search() {
        let response: SearchResponse =
            serde_json::from_str(r#"{"results": {}, "meta": {"results": {"order": []}}}"#)
                .expect("Should parse empty search");
        assert!(response.results.songs.is_none());
    }

    #[test]
    fn test_parse_album_lookup_with_relationships() {
        let json = r#"{
            "data": [{
                "id": "1434371887",
                "type": "albums",
                "attributes": {"name": "Geogaddi", "artistName": "Boards of Canada"},
                "relationships": {
                    "artists": {"data": [{"id": "4486541", "type": "artists"}]},
                    "tracks": {"data": [{
                        "id": "1434371888",
                        "type": "songs",
                        "attributes": {
                            "name": "Ready Lets Go",
                            "artistName": "Boards of Canada",
                            "albumName": "Geogaddi",
                            "durationInMillis": 59573,
                            "trackNumber": 1,
                            "discNumber": 1,
                            "isrc": "GBBPW0200001",
                            "previews": [{"url": "https://audio.example/p.m4a"}]
                        }
                    }]}
                }
            }]
        }"#;

        let response: ResponseData<AlbumAttributes> =
            serde_json::from_str(json).expect("Should parse album lookup");
        let album = &response.data[0];
        let artists = album.relationships.artists.as_ref().unwrap();
        assert_eq!(artists.data[0].id, "4486541");
        assert!(artists.data[0].attributes.is_none());

        let tracks = album.relationships.tracks.as_ref().unwrap();
        let song = tracks.data[0].attributes.as_ref().unwrap();
        assert_eq!(song.duration_in_millis, Some(59573));
        assert_eq!(song.previews.len(), 1);
    }
}
