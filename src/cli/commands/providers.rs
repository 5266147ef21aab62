//! Provider status and config bootstrap commands.

use serde_json::json;

use crate::catalog::{CatalogError, ProviderId};
use crate::config::{self, Config, ConfigError};
use crate::error;

use super::{Cli, build_registry};

/// Show every known provider and whether it is usable
pub fn cmd_providers(config: &Config) -> error::Result<serde_json::Value> {
    let registry = build_registry(config);

    let providers: Vec<_> = ProviderId::ALL
        .iter()
        .map(|&id| {
            let adapter = registry.get(id);
            json!({
                "id": id,
                "configured": adapter.is_some(),
                "artist_albums": adapter.as_ref().is_some_and(|p| p.discography().is_some()),
            })
        })
        .collect();

    Ok(json!({ "providers": providers }))
}

/// Write a default config file to `--config` or the OS config dir
pub fn cmd_init_config(cli: &Cli, force: bool) -> error::Result<serde_json::Value> {
    let path = match &cli.config {
        Some(p) => p.clone(),
        None => config::config_path().ok_or(ConfigError::NoConfigDir)?,
    };

    if path.exists() && !force {
        return Err(CatalogError::InvalidInput(format!(
            "{} already exists (use --force to overwrite)",
            path.display()
        ))
        .into());
    }

    config::save_to(&Config::default(), &path)?;
    Ok(json!({ "written": path }))
}
