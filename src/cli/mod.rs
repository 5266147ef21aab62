//! Command-line interface for music-catalog.
//!
//! This module exposes catalog search, album import and provider
//! inspection as CLI commands with JSON output.

mod commands;

pub use commands::{Cli, Commands, run_command};
