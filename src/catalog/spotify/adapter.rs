//! Adapter layer: Convert Spotify DTOs to domain models
//!
//! This is the ONLY place where Spotify DTO types are converted to domain types.

use super::dto;
use crate::catalog::domain::{Album, Artist, ProviderId, Track, millis_to_seconds};

const PROVIDER: ProviderId = ProviderId::Spotify;

pub fn to_artist(artist: dto::Artist) -> Artist {
    Artist {
        external_id: artist.id,
        name: artist.name,
        provider: PROVIDER,
        image_url: largest_image(&artist.images),
        biography: None,
        genres: artist.genres,
        popularity: artist.popularity,
        external_url: artist.external_urls.spotify,
    }
}

pub fn to_album(album: dto::SimplifiedAlbum) -> Album {
    Album {
        external_id: album.id,
        title: album.name,
        artist: join_artists(&album.artists),
        artist_external_id: first_artist_id(&album.artists),
        provider: PROVIDER,
        release_year: parse_year(album.release_date.as_deref()),
        release_date: album.release_date,
        genre: None,
        cover_url: largest_image(&album.images),
        track_count: album.total_tracks,
        external_url: album.external_urls.spotify,
    }
}

/// Convert a full album lookup into the album and its track list.
///
/// Album tracks carry no album reference, so title and id are filled in here.
pub fn to_album_with_tracks(album: dto::Album) -> (Album, Vec<Track>) {
    let domain = Album {
        external_id: album.id.clone(),
        title: album.name.clone(),
        artist: join_artists(&album.artists),
        artist_external_id: first_artist_id(&album.artists),
        provider: PROVIDER,
        release_year: parse_year(album.release_date.as_deref()),
        release_date: album.release_date,
        genre: (!album.genres.is_empty()).then(|| album.genres.join(", ")),
        cover_url: largest_image(&album.images),
        track_count: album.total_tracks,
        external_url: album.external_urls.spotify,
    };

    let tracks = album
        .tracks
        .map(|page| page.items)
        .unwrap_or_default()
        .into_iter()
        .map(|t| {
            let mut track = to_track(t);
            track.album = Some(album.name.clone());
            track.album_external_id = Some(album.id.clone());
            track
        })
        .collect();

    (domain, tracks)
}

pub fn to_track(track: dto::Track) -> Track {
    let (album, album_external_id) = match track.album {
        Some(a) => (Some(a.name), Some(a.id)),
        None => (None, None),
    };

    Track {
        external_id: track.id.unwrap_or_default(),
        title: track.name,
        artist: join_artists(&track.artists),
        artist_external_id: first_artist_id(&track.artists),
        album,
        album_external_id,
        provider: PROVIDER,
        duration_seconds: millis_to_seconds(track.duration_ms),
        track_number: track.track_number,
        disc_number: track.disc_number,
        isrc: track.external_ids.isrc,
        external_url: track.external_urls.spotify,
        preview_url: track.preview_url,
    }
}

/// Widest image wins; order in the response is not guaranteed.
fn largest_image(images: &[dto::Image]) -> Option<String> {
    images
        .iter()
        .max_by_key(|i| i.width.unwrap_or(0))
        .map(|i| i.url.clone())
}

fn join_artists(artists: &[dto::SimplifiedArtist]) -> String {
    artists
        .iter()
        .map(|a| a.name.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

fn first_artist_id(artists: &[dto::SimplifiedArtist]) -> Option<String> {
    artists.first().and_then(|a| a.id.clone())
}

fn parse_year(date: Option<&str>) -> Option<i32> {
    date.and_then(|d| d.split('-').next())
        .and_then(|y| y.parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn simple_artist(id: Option<&str>, name: &str) -> dto::SimplifiedArtist {
        dto::SimplifiedArtist {
            id: id.map(String::from),
            name: name.to_string(),
        }
    }

    fn image(url: &str, width: u32) -> dto::Image {
        dto::Image {
            url: url.to_string(),
            height: Some(width),
            width: Some(width),
        }
    }

    #[test]
    fn test_album_joins_artists_and_parses_year() {
        let album = dto::SimplifiedAlbum {
            id: "alb".to_string(),
            name: "Split".to_string(),
            artists: vec![simple_artist(Some("a1"), "Low"), simple_artist(Some("a2"), "Dirty Three")],
            release_date: Some("2001-09".to_string()),
            release_date_precision: Some("month".to_string()),
            total_tracks: Some(6),
            images: vec![image("small", 64), image("big", 640), image("mid", 300)],
            external_urls: dto::ExternalUrls::default(),
        };

        let domain = to_album(album);
        assert_eq!(domain.artist, "Low, Dirty Three");
        assert_eq!(domain.artist_external_id.as_deref(), Some("a1"));
        assert_eq!(domain.release_year, Some(2001));
        assert_eq!(domain.release_date.as_deref(), Some("2001-09"));
        assert_eq!(domain.cover_url.as_deref(), Some("big"));
        assert_eq!(domain.provider, ProviderId::Spotify);
    }

    #[test]
    fn test_album_tracks_reference_their_album() {
        let album = dto::Album {
            id: "alb".to_string(),
            name: "Geogaddi".to_string(),
            artists: vec![simple_artist(Some("boc"), "Boards of Canada")],
            release_date: Some("2002-02-18".to_string()),
            total_tracks: Some(1),
            images: vec![],
            genres: vec!["idm".to_string(), "ambient".to_string()],
            external_urls: dto::ExternalUrls::default(),
            tracks: Some(dto::Paging {
                items: vec![dto::Track {
                    id: Some("t1".to_string()),
                    name: "Music Is Math".to_string(),
                    artists: vec![simple_artist(Some("boc"), "Boards of Canada")],
                    album: None,
                    duration_ms: 321_499,
                    track_number: Some(5),
                    disc_number: Some(1),
                    external_ids: dto::ExternalIds::default(),
                    external_urls: dto::ExternalUrls::default(),
                    preview_url: None,
                }],
                total: Some(1),
            }),
        };

        let (domain, tracks) = to_album_with_tracks(album);
        assert_eq!(domain.genre.as_deref(), Some("idm, ambient"));
        assert_eq!(tracks.len(), 1);
        assert_eq!(tracks[0].album.as_deref(), Some("Geogaddi"));
        assert_eq!(tracks[0].album_external_id.as_deref(), Some("alb"));
        assert_eq!(tracks[0].duration_seconds, 321);
    }

    #[test]
    fn test_album_without_genres_has_none() {
        let album = dto::Album {
            id: "x".to_string(),
            name: "X".to_string(),
            artists: vec![],
            release_date: None,
            total_tracks: None,
            images: vec![],
            genres: vec![],
            external_urls: dto::ExternalUrls::default(),
            tracks: None,
        };
        let (domain, tracks) = to_album_with_tracks(album);
        assert!(domain.genre.is_none());
        assert!(domain.release_year.is_none());
        assert!(tracks.is_empty());
    }
}
