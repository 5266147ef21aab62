//! Spotify Web API integration
//!
//! Searches the Spotify catalog with an app-only token obtained through the
//! client-credentials grant. Supports artist discography listing.
//!
//! API docs: https://developer.spotify.com/documentation/web-api

pub mod dto;
mod adapter;
mod auth;
mod client;

pub use client::SpotifyProvider;
