//! CLI command definitions and dispatch.
//!
//! This module provides the command-line interface for Music Catalog.
//! Each subcommand is implemented in its own submodule for maintainability:
//! - `search`: Fan-out catalog search and artist discographies
//! - `import`: Album import into a user's local catalog
//! - `providers`: Provider status and config file bootstrap
//!
//! Every command prints one JSON document on stdout. Failures print
//! `{"error": "...", "status": <code>}` instead.

mod import;
mod providers;
mod search;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use serde_json::json;
use tokio::runtime::Runtime;

use crate::catalog::{CallContext, ProviderId, ProviderRegistry, ProviderSelector, ResultType};
use crate::config::{self, Config, CredentialOverrides};
use crate::db::{self, SqliteCatalogStore};
use crate::error::{self, ResultExt};

pub use import::cmd_import;
pub use providers::{cmd_init_config, cmd_providers};
pub use search::{cmd_artist_albums, cmd_search};

/// Music Catalog CLI
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Config file (default: OS config dir/music-catalog/config.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Catalog database (overrides [database] path)
    #[arg(long, global = true)]
    pub db: Option<PathBuf>,

    /// Overall deadline in seconds (overrides [search] timeout_secs; 0 disables)
    #[arg(long, global = true)]
    pub timeout: Option<u64>,

    #[command(flatten)]
    pub credentials: CredentialArgs,

    #[command(subcommand)]
    pub command: Commands,
}

/// Provider credentials that override the config file
#[derive(Args, Debug, Default)]
pub struct CredentialArgs {
    /// Spotify client id (or set SPOTIFY_CLIENT_ID env var)
    #[arg(long, env = "SPOTIFY_CLIENT_ID", hide_env_values = true, global = true)]
    pub spotify_client_id: Option<String>,

    /// Spotify client secret (or set SPOTIFY_CLIENT_SECRET env var)
    #[arg(long, env = "SPOTIFY_CLIENT_SECRET", hide_env_values = true, global = true)]
    pub spotify_client_secret: Option<String>,

    /// Apple developer team id (or set APPLE_MUSIC_TEAM_ID env var)
    #[arg(long, env = "APPLE_MUSIC_TEAM_ID", global = true)]
    pub apple_team_id: Option<String>,

    /// Apple Music key id (or set APPLE_MUSIC_KEY_ID env var)
    #[arg(long, env = "APPLE_MUSIC_KEY_ID", global = true)]
    pub apple_key_id: Option<String>,

    /// Apple Music PKCS#8 private key PEM (or set APPLE_MUSIC_PRIVATE_KEY env var)
    #[arg(long, env = "APPLE_MUSIC_PRIVATE_KEY", hide_env_values = true, global = true)]
    pub apple_private_key: Option<String>,

    /// Enable MusicBrainz even if the config file does not
    #[arg(long, global = true)]
    pub musicbrainz: bool,
}

impl CredentialArgs {
    fn overrides(&self) -> CredentialOverrides {
        CredentialOverrides {
            spotify_client_id: self.spotify_client_id.clone(),
            spotify_client_secret: self.spotify_client_secret.clone(),
            apple_team_id: self.apple_team_id.clone(),
            apple_key_id: self.apple_key_id.clone(),
            apple_private_key: self.apple_private_key.clone(),
            musicbrainz: self.musicbrainz,
        }
    }
}

/// Available subcommands
#[derive(Subcommand)]
pub enum Commands {
    /// Search every configured provider at once
    Search {
        /// Free-text query
        query: String,
        /// Result type: all, artist, album, track
        #[arg(short = 't', long = "type", default_value = "all")]
        result_type: ResultType,
        /// Provider: all, spotify, apple_music, musicbrainz
        #[arg(short, long, default_value = "all")]
        provider: ProviderSelector,
        /// Results per provider and section (0 = configured default)
        #[arg(short, long, default_value_t = 0)]
        limit: usize,
        /// Save returned artists to the catalog database
        #[arg(long)]
        store: bool,
    },
    /// Import an album and its tracks into a user's catalog
    Import {
        /// Provider-side album id
        album_id: String,
        /// Provider the id belongs to
        #[arg(short, long)]
        provider: ProviderId,
        /// Session token of the importing user (or set MUSIC_CATALOG_TOKEN env var)
        #[arg(long, env = "MUSIC_CATALOG_TOKEN", hide_env_values = true)]
        token: Option<String>,
        /// Print track counts instead of just the album id
        #[arg(long)]
        detailed: bool,
    },
    /// List an artist's albums from a provider that supports it
    ArtistAlbums {
        /// Provider-side artist id
        artist_id: String,
        #[arg(short, long)]
        provider: ProviderId,
        #[arg(short, long, default_value_t = 0)]
        limit: usize,
    },
    /// Show which providers are configured
    Providers,
    /// Write a default config file
    InitConfig {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

/// Run the specified CLI command.
///
/// Returns `Ok(false)` when the command failed and printed an error document,
/// so the caller can exit non-zero.
pub fn run_command(cli: &Cli) -> anyhow::Result<bool> {
    let rt = Runtime::new()?;
    let config = load_config(cli);

    let outcome = match &cli.command {
        Commands::Search {
            query,
            result_type,
            provider,
            limit,
            store,
        } => cmd_search(&rt, cli, &config, query, *result_type, *provider, *limit, *store),
        Commands::Import {
            album_id,
            provider,
            token,
            detailed,
        } => cmd_import(&rt, cli, &config, album_id, *provider, token.as_deref(), *detailed),
        Commands::ArtistAlbums {
            artist_id,
            provider,
            limit,
        } => cmd_artist_albums(&rt, cli, &config, artist_id, *provider, *limit),
        Commands::Providers => cmd_providers(&config),
        Commands::InitConfig { force } => cmd_init_config(cli, *force),
    };

    report(outcome)
}

// ============================================================================
// Shared helper functions
// ============================================================================

/// Config file plus command-line credential overrides
fn load_config(cli: &Cli) -> Config {
    let mut config = match &cli.config {
        Some(path) => config::load_from(path),
        None => config::load(),
    };
    config.providers.apply_overrides(&cli.credentials.overrides());
    config
}

pub(crate) fn build_registry(config: &Config) -> Arc<ProviderRegistry> {
    Arc::new(ProviderRegistry::from_config(&config.providers))
}

/// Open (and migrate) the catalog database
pub(crate) async fn open_store(cli: &Cli, config: &Config) -> error::Result<Arc<SqliteCatalogStore>> {
    let path = cli.db.clone().or_else(|| config.database.path.clone());
    let url = db::db_url(path.as_deref());
    let pool = db::init_db(&url)
        .await
        .with_context(format!("opening catalog database {}", url))?;
    Ok(Arc::new(SqliteCatalogStore::new(pool)))
}

/// Per-call context: the configured deadline, cancelled on Ctrl-C.
///
/// Must be called inside the runtime.
pub(crate) fn call_context(cli: &Cli, config: &Config) -> CallContext {
    let secs = cli.timeout.or(config.search.timeout_secs).unwrap_or(0);
    let ctx = if secs > 0 {
        CallContext::new().with_timeout(Duration::from_secs(secs))
    } else {
        CallContext::new()
    };

    let on_interrupt = ctx.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupted, cancelling in-flight requests");
            on_interrupt.cancel();
        }
    });

    ctx
}

/// Print the command's JSON result, or the error document
fn report(outcome: error::Result<serde_json::Value>) -> anyhow::Result<bool> {
    match outcome {
        Ok(value) => {
            println!("{}", serde_json::to_string_pretty(&value)?);
            Ok(true)
        }
        Err(e) => {
            tracing::debug!("Command failed: {:?}", e);
            println!("{}", serde_json::to_string_pretty(&error_document(&e))?);
            Ok(false)
        }
    }
}

fn error_document(e: &error::Error) -> serde_json::Value {
    json!({
        "error": e.to_string(),
        "status": e.status(),
    })
}
