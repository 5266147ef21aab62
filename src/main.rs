//! Music Catalog - search external music providers and import albums into a
//! personal catalog.
//!
//! Searches fan out to every configured provider (Spotify, Apple Music,
//! MusicBrainz) concurrently and merge whatever comes back. Imports pull one
//! album with its track list into the local SQLite catalog, idempotently.

pub mod catalog;
pub mod cli;
pub mod config;
pub mod db;
pub mod error;
pub mod model;
#[cfg(test)]
pub mod test_utils;

use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

fn main() -> anyhow::Result<()> {
    let args = cli::Cli::parse();

    // Initialize logging; stdout carries the JSON result, so logs go to stderr
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
        .with(EnvFilter::from_default_env().add_directive("music_catalog=info".parse()?))
        .init();

    if !cli::run_command(&args)? {
        std::process::exit(1);
    }

    Ok(())
}
