//! MusicBrainz API integration
//!
//! Keyless catalog search over the open MusicBrainz database. Albums are
//! releases, tracks are recordings. Cover art links point at the Cover Art
//! Archive.
//!
//! API docs: https://musicbrainz.org/doc/MusicBrainz_API

pub mod dto;
mod adapter;
mod client;

pub use client::MusicBrainzProvider;
