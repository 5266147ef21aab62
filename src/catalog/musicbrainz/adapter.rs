//! Adapter layer: Convert MusicBrainz DTOs to domain models
//!
//! This is the ONLY place where DTO types are converted to domain types.
//! This isolates API changes - if MusicBrainz changes their response format,
//! only this file and dto.rs need to change.

use super::dto;
use crate::catalog::domain::{Album, Artist, ProviderId, Track, millis_to_seconds};

const PROVIDER: ProviderId = ProviderId::MusicBrainz;

const SITE_URL: &str = "https://musicbrainz.org";
const COVER_ART_URL: &str = "https://coverartarchive.org";

pub fn to_artist(artist: dto::Artist) -> Artist {
    // Curated genres when the lookup asked for them, folksonomy tags otherwise
    let genres = if artist.genres.is_empty() {
        extract_genres(&artist.tags)
    } else {
        extract_genres(&artist.genres)
    };

    Artist {
        external_url: Some(format!("{}/artist/{}", SITE_URL, artist.id)),
        external_id: artist.id,
        name: artist.name,
        provider: PROVIDER,
        image_url: None,
        biography: artist.disambiguation.filter(|d| !d.is_empty()),
        genres,
        popularity: artist.score,
    }
}

pub fn to_album(release: &dto::Release) -> Album {
    let genres = if release.genres.is_empty() {
        release
            .release_group
            .as_ref()
            .map(|rg| extract_genres(&rg.genres))
            .unwrap_or_default()
    } else {
        extract_genres(&release.genres)
    };

    let date = release.date.clone().filter(|d| !d.is_empty()).or_else(|| {
        release
            .release_group
            .as_ref()
            .and_then(|rg| rg.first_release_date.clone())
            .filter(|d| !d.is_empty())
    });

    let track_count = release.track_count.or_else(|| {
        let total: u32 = release.media.iter().filter_map(|m| m.track_count).sum();
        (total > 0).then_some(total)
    });

    Album {
        external_id: release.id.clone(),
        title: release.title.clone(),
        artist: build_artist_string(&release.artist_credit).unwrap_or_default(),
        artist_external_id: release.artist_credit.first().map(|c| c.artist.id.clone()),
        provider: PROVIDER,
        release_year: parse_year(date.as_deref()),
        release_date: date,
        genre: (!genres.is_empty()).then(|| genres.join(", ")),
        cover_url: cover_url(release),
        track_count,
        external_url: Some(format!("{}/release/{}", SITE_URL, release.id)),
    }
}

/// Release lookup (inc=recordings) into the album and its ordered track list.
pub fn to_album_with_tracks(release: dto::Release) -> (Album, Vec<Track>) {
    let album = to_album(&release);
    let multi_disc = release.media.len() > 1;

    let mut tracks = Vec::new();
    for medium in &release.media {
        for t in &medium.tracks {
            let recording = t.recording.as_ref();

            let title = t
                .title
                .clone()
                .or_else(|| recording.map(|r| r.title.clone()))
                .unwrap_or_default();

            let credits = if !t.artist_credit.is_empty() {
                &t.artist_credit
            } else {
                recording.map(|r| &r.artist_credit).unwrap_or(&t.artist_credit)
            };

            tracks.push(Track {
                external_id: recording
                    .map(|r| r.id.clone())
                    .or_else(|| t.id.clone())
                    .unwrap_or_default(),
                title,
                artist: build_artist_string(credits).unwrap_or_else(|| album.artist.clone()),
                artist_external_id: credits
                    .first()
                    .map(|c| c.artist.id.clone())
                    .or_else(|| album.artist_external_id.clone()),
                album: Some(album.title.clone()),
                album_external_id: Some(album.external_id.clone()),
                provider: PROVIDER,
                duration_seconds: t
                    .length
                    .or_else(|| recording.and_then(|r| r.length))
                    .map(millis_to_seconds)
                    .unwrap_or(0),
                track_number: t.position,
                // Only include disc number for multi-disc releases
                disc_number: if multi_disc { medium.position } else { None },
                isrc: recording.and_then(|r| r.isrcs.first().cloned()),
                external_url: recording.map(|r| format!("{}/recording/{}", SITE_URL, r.id)),
                preview_url: None,
            });
        }
    }

    (album, tracks)
}

pub fn to_track(recording: dto::Recording) -> Track {
    let release = preferred_release(&recording.releases);

    Track {
        external_url: Some(format!("{}/recording/{}", SITE_URL, recording.id)),
        artist: build_artist_string(&recording.artist_credit).unwrap_or_default(),
        artist_external_id: recording.artist_credit.first().map(|c| c.artist.id.clone()),
        album: release.map(|r| r.title.clone()),
        album_external_id: release.map(|r| r.id.clone()),
        provider: PROVIDER,
        duration_seconds: recording.length.map(millis_to_seconds).unwrap_or(0),
        track_number: None,
        disc_number: None,
        isrc: recording.isrcs.into_iter().next(),
        preview_url: None,
        external_id: recording.id,
        title: recording.title,
    }
}

/// Build a combined artist string from artist credits
fn build_artist_string(credits: &[dto::ArtistCredit]) -> Option<String> {
    if credits.is_empty() {
        return None;
    }

    let mut result = String::new();
    for credit in credits {
        // Use credited name if available, otherwise official name
        let name = credit.name.as_ref().unwrap_or(&credit.artist.name);
        result.push_str(name);

        // Add join phrase if present (e.g., " & ", " feat. ")
        if let Some(ref join) = credit.joinphrase {
            result.push_str(join);
        }
    }

    Some(result)
}

/// Prefer official album releases over singles/bootlegs
fn preferred_release(releases: &[dto::Release]) -> Option<&dto::Release> {
    releases
        .iter()
        .find(|r| {
            r.status.as_deref() == Some("Official")
                && r.release_group
                    .as_ref()
                    .and_then(|rg| rg.primary_type.as_deref())
                    == Some("Album")
        })
        .or_else(|| {
            releases
                .iter()
                .find(|r| r.status.as_deref() == Some("Official"))
        })
        .or_else(|| releases.first())
}

/// Front cover thumbnail; searches omit the flag so the URL is offered optimistically.
fn cover_url(release: &dto::Release) -> Option<String> {
    let has_front = release
        .cover_art_archive
        .as_ref()
        .map(|c| c.front)
        .unwrap_or(true);
    has_front.then(|| format!("{}/release/{}/front-500", COVER_ART_URL, release.id))
}

/// Parse year from date (YYYY, YYYY-MM, or YYYY-MM-DD)
fn parse_year(date: Option<&str>) -> Option<i32> {
    date.and_then(|d| d.split('-').next())
        .and_then(|y| y.parse().ok())
}

/// Top 5 tags by vote count, title-cased
fn extract_genres(tags: &[dto::Tag]) -> Vec<String> {
    let mut sorted_tags: Vec<_> = tags.iter().filter(|t| t.count > 0).collect();
    sorted_tags.sort_by(|a, b| b.count.cmp(&a.count));

    sorted_tags
        .into_iter()
        .take(5)
        .map(|t| {
            t.name
                .split_whitespace()
                .map(|word| {
                    let mut chars = word.chars();
                    match chars.next() {
                        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                        None => String::new(),
                    }
                })
                .collect::<Vec<_>>()
                .join(" ")
        })
        .collect()
}
