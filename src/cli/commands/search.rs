//! Catalog search commands.

use serde_json::json;
use tokio::runtime::Runtime;

use crate::catalog::{
    CatalogError, ProviderId, ProviderSelector, ResultType, SearchAggregator, SearchRequest,
};
use crate::config::Config;
use crate::error;

use super::{Cli, build_registry, call_context, open_store};

/// Fan out a search and print the merged results
#[allow(clippy::too_many_arguments)]
pub fn cmd_search(
    rt: &Runtime,
    cli: &Cli,
    config: &Config,
    query: &str,
    result_type: ResultType,
    providers: ProviderSelector,
    limit: usize,
    store: bool,
) -> error::Result<serde_json::Value> {
    rt.block_on(async {
        let registry = build_registry(config);
        let mut aggregator =
            SearchAggregator::new(registry).with_default_limit(config.search.default_limit);

        if store {
            aggregator = aggregator.with_store(open_store(cli, config).await?);
        }

        let ctx = call_context(cli, config);
        let request = SearchRequest {
            query: query.to_string(),
            result_type,
            providers,
            limit,
            store_results: store,
        };

        let results = aggregator.search(&ctx, request).await;
        tracing::info!(
            "Search '{}': {} artists, {} albums, {} tracks",
            query,
            results.artists.len(),
            results.albums.len(),
            results.tracks.len()
        );

        Ok(serde_json::to_value(&results)?)
    })
}

/// List an artist's albums through the discography capability
pub fn cmd_artist_albums(
    rt: &Runtime,
    cli: &Cli,
    config: &Config,
    artist_id: &str,
    provider_id: ProviderId,
    limit: usize,
) -> error::Result<serde_json::Value> {
    rt.block_on(async {
        if artist_id.trim().is_empty() {
            return Err(CatalogError::InvalidInput("artist id is required".to_string()).into());
        }

        let registry = build_registry(config);
        let provider = registry.require(provider_id)?;
        let discography = provider.discography().ok_or_else(|| {
            CatalogError::Configuration(format!("{} cannot list artist albums", provider_id))
        })?;

        let limit = if limit == 0 {
            config.search.default_limit
        } else {
            limit
        };

        let ctx = call_context(cli, config);
        let albums = ctx
            .run(discography.artist_albums(artist_id.trim(), limit))
            .await?;

        Ok(json!({
            "provider": provider_id,
            "artist_id": artist_id.trim(),
            "albums": albums,
        }))
    })
}
