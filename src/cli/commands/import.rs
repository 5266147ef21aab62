//! Album import command.

use serde_json::json;
use tokio::runtime::Runtime;

use crate::catalog::{CatalogError, CatalogStore, ImportPipeline, ProviderId};
use crate::config::Config;
use crate::error;

use super::{Cli, build_registry, call_context, open_store};

/// Import one album for the user behind `token`
pub fn cmd_import(
    rt: &Runtime,
    cli: &Cli,
    config: &Config,
    album_id: &str,
    provider: ProviderId,
    token: Option<&str>,
    detailed: bool,
) -> error::Result<serde_json::Value> {
    // Reject before the database is created or migrated
    let Some(token) = token.map(str::trim).filter(|t| !t.is_empty()) else {
        return Err(CatalogError::Authorization("missing bearer token".to_string()).into());
    };

    rt.block_on(async {
        let store: std::sync::Arc<dyn CatalogStore> = open_store(cli, config).await?;
        let pipeline = ImportPipeline::new(build_registry(config), store);
        let ctx = call_context(cli, config);

        if detailed {
            let report = pipeline
                .import_album_detailed(&ctx, token, album_id, provider)
                .await?;
            Ok(serde_json::to_value(&report)?)
        } else {
            let id = pipeline
                .import_album_for_user(&ctx, token, album_id, provider)
                .await?;
            Ok(json!({ "album_id": id }))
        }
    })
}
