//! Adapter layer: Convert Apple Music DTOs to domain models
//!
//! This is the ONLY place where Apple Music DTO types are converted to domain types.
//! Resources without attributes (bare relationship references) are dropped.

use super::dto;
use crate::catalog::domain::{Album, Artist, ProviderId, Track, millis_to_seconds};

const PROVIDER: ProviderId = ProviderId::AppleMusic;

/// Square edge requested from artwork templates
const ARTWORK_SIZE: u32 = 600;

/// Catch-all genre Apple attaches to everything
const GENERIC_GENRE: &str = "Music";

/// Resource type of a song in an album's tracks relationship
const SONG_KIND: &str = "songs";

pub fn to_artist(resource: dto::Resource<dto::ArtistAttributes>) -> Option<Artist> {
    let attrs = resource.attributes?;
    Some(Artist {
        external_id: resource.id,
        name: attrs.name,
        provider: PROVIDER,
        image_url: attrs.artwork.as_ref().map(artwork_url),
        biography: attrs
            .editorial_notes
            .and_then(|n| n.standard.or(n.short)),
        genres: specific_genres(attrs.genre_names),
        popularity: None,
        external_url: attrs.url,
    })
}

pub fn to_album(resource: dto::Resource<dto::AlbumAttributes>) -> Option<Album> {
    let artist_external_id = first_id(resource.relationships.artists.as_ref());
    let attrs = resource.attributes?;
    let genres = specific_genres(attrs.genre_names);

    Some(Album {
        external_id: resource.id,
        title: attrs.name,
        artist: attrs.artist_name,
        artist_external_id,
        provider: PROVIDER,
        release_year: attrs
            .release_date
            .as_deref()
            .and_then(|d| d.split('-').next())
            .and_then(|y| y.parse().ok()),
        release_date: attrs.release_date,
        genre: (!genres.is_empty()).then(|| genres.join(", ")),
        cover_url: attrs.artwork.as_ref().map(artwork_url),
        track_count: attrs.track_count,
        external_url: attrs.url,
    })
}

pub fn to_track(resource: dto::Resource<dto::SongAttributes>) -> Option<Track> {
    let artist_external_id = first_id(resource.relationships.artists.as_ref());
    let album_external_id = first_id(resource.relationships.albums.as_ref());
    let attrs = resource.attributes?;

    Some(Track {
        external_id: resource.id,
        title: attrs.name,
        artist: attrs.artist_name,
        artist_external_id,
        album: attrs.album_name,
        album_external_id,
        provider: PROVIDER,
        duration_seconds: attrs.duration_in_millis.map(millis_to_seconds).unwrap_or(0),
        track_number: attrs.track_number,
        disc_number: attrs.disc_number,
        isrc: attrs.isrc,
        external_url: attrs.url,
        preview_url: attrs.previews.into_iter().next().map(|p| p.url),
    })
}

/// Album lookup with `include=tracks,artists`.
///
/// The tracks relationship also lists music videos; only songs are kept.
pub fn to_album_with_tracks(
    mut resource: dto::Resource<dto::AlbumAttributes>,
) -> Option<(Album, Vec<Track>)> {
    let songs = resource
        .relationships
        .tracks
        .take()
        .map(|t| t.data)
        .unwrap_or_default();
    let album = to_album(resource)?;

    let tracks = songs
        .into_iter()
        .filter(|r| r.kind.as_deref() == Some(SONG_KIND))
        .filter_map(to_track)
        .map(|mut t| {
            t.album_external_id = Some(album.external_id.clone());
            t.album.get_or_insert_with(|| album.title.clone());
            if t.artist_external_id.is_none() && t.artist == album.artist {
                t.artist_external_id = album.artist_external_id.clone();
            }
            t
        })
        .collect();

    Some((album, tracks))
}

/// Fill the `{w}x{h}` template.
pub(crate) fn artwork_url(artwork: &dto::Artwork) -> String {
    let size = ARTWORK_SIZE.to_string();
    artwork.url.replace("{w}", &size).replace("{h}", &size)
}

fn specific_genres(genres: Vec<String>) -> Vec<String> {
    genres.into_iter().filter(|g| g != GENERIC_GENRE).collect()
}

fn first_id<A>(data: Option<&dto::ResponseData<A>>) -> Option<String> {
    data.and_then(|d| d.data.first()).map(|r| r.id.clone())
}
