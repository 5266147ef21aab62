//! Apple Music catalog integration
//!
//! Searches the Apple Music catalog of one storefront using a locally signed
//! developer token. No user token is needed for catalog reads.
//!
//! API docs: https://developer.apple.com/documentation/applemusicapi

pub mod dto;
mod adapter;
mod client;
mod token;

pub use client::AppleMusicProvider;
