//! Concurrent, best-effort search across providers.
//!
//! One task per selected provider is spawned on the runtime. Every task's
//! outcome goes into a [`ResultAccumulator`]; a failing provider contributes
//! nothing but a `Failed` status and never affects its siblings. The call
//! returns once every task has finished.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::task::JoinSet;

use super::context::CallContext;
use super::domain::{
    CatalogError, DEFAULT_SEARCH_LIMIT, ProviderId, ProviderSelector, ProviderStatus, ResultType,
    SearchResults,
};
use super::registry::ProviderRegistry;
use super::traits::{CatalogStore, MusicProvider};

/// Parameters of one aggregated search.
#[derive(Debug, Clone, Default)]
pub struct SearchRequest {
    pub query: String,
    pub result_type: ResultType,
    pub providers: ProviderSelector,
    /// 0 means "use the default"
    pub limit: usize,
    /// Persist merged artists (albums and tracks are never persisted by search)
    pub store_results: bool,
}

/// Shared merge target for provider tasks.
///
/// The lock is held only inside these methods, never across a provider call.
#[derive(Debug, Default)]
pub struct ResultAccumulator {
    inner: Mutex<SearchResults>,
}

impl ResultAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one provider's partial result.
    pub fn merge_success(&self, provider: ProviderId, mut partial: SearchResults) {
        let status = partial.status();
        partial.provider_status.clear();

        let mut results = self.inner.lock();
        results.append(partial);
        results.provider_status.insert(provider, status);
    }

    /// Record that `provider` contributed nothing because it failed.
    pub fn record_failure(&self, provider: ProviderId, error: &CatalogError) {
        self.inner.lock().provider_status.insert(
            provider,
            ProviderStatus::Failed {
                error: error.to_string(),
            },
        );
    }

    pub fn into_results(self) -> SearchResults {
        self.inner.into_inner()
    }

    /// Copy of everything merged so far.
    pub fn snapshot(&self) -> SearchResults {
        self.inner.lock().clone()
    }
}

pub struct SearchAggregator {
    registry: Arc<ProviderRegistry>,
    store: Option<Arc<dyn CatalogStore>>,
    default_limit: usize,
}

impl SearchAggregator {
    pub fn new(registry: Arc<ProviderRegistry>) -> Self {
        Self {
            registry,
            store: None,
            default_limit: DEFAULT_SEARCH_LIMIT,
        }
    }

    /// Store used when a request sets `store_results`.
    pub fn with_store(mut self, store: Arc<dyn CatalogStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Override the page size used for `limit == 0`.
    pub fn with_default_limit(mut self, limit: usize) -> Self {
        if limit > 0 {
            self.default_limit = limit;
        }
        self
    }

    /// Fan out `request` to every selected provider and merge what comes back.
    ///
    /// Never fails: provider errors, cancellation and timeouts show up only as
    /// `Failed` entries in `provider_status`.
    pub async fn search(&self, ctx: &CallContext, request: SearchRequest) -> SearchResults {
        let query = request.query.trim();
        if query.is_empty() {
            return SearchResults::default();
        }

        let limit = if request.limit == 0 {
            self.default_limit
        } else {
            request.limit
        };

        let providers = self.registry.select(&request.providers);
        if providers.is_empty() {
            tracing::debug!("No configured provider matches {:?}", request.providers);
            return SearchResults::default();
        }

        let accumulator = Arc::new(ResultAccumulator::new());
        let mut tasks = JoinSet::new();
        let mut dispatched = HashMap::new();

        for provider in providers {
            let id = provider.id();
            let ctx = ctx.clone();
            let query = query.to_string();
            let accumulator = Arc::clone(&accumulator);
            let result_type = request.result_type;

            tracing::debug!(provider = %id, query = %query, limit, "Dispatching search");
            let handle = tasks.spawn(async move {
                let outcome = ctx
                    .run(dispatch(provider.as_ref(), result_type, &query, limit))
                    .await;
                match outcome {
                    Ok(partial) => accumulator.merge_success(id, partial),
                    Err(e) => {
                        tracing::warn!(provider = %id, "Search failed: {}", e);
                        accumulator.record_failure(id, &e);
                    }
                }
            });
            dispatched.insert(handle.id(), id);
        }

        while let Some(joined) = tasks.join_next_with_id().await {
            let Err(e) = joined else { continue };
            if let Some(&id) = dispatched.get(&e.id()) {
                // The task panicked before it could record anything
                tracing::error!(provider = %id, "Search task aborted: {}", e);
                accumulator.record_failure(id, &CatalogError::provider(id, "search task aborted"));
            }
        }

        let results = match Arc::try_unwrap(accumulator) {
            Ok(acc) => acc.into_results(),
            Err(shared) => shared.snapshot(),
        };

        if request.store_results {
            self.store_artists(&results).await;
        }

        results
    }

    /// Upsert merged artists by display name. Failures are logged and skipped.
    async fn store_artists(&self, results: &SearchResults) {
        let Some(ref store) = self.store else {
            tracing::warn!("store_results requested but no catalog store is attached");
            return;
        };

        let mut stored = 0usize;
        for artist in &results.artists {
            match store.upsert_artist_by_name(artist).await {
                Ok(_) => stored += 1,
                Err(e) => tracing::warn!("Failed to store artist '{}': {}", artist.name, e),
            }
        }
        tracing::info!("Stored {}/{} artists", stored, results.artists.len());
    }
}

/// Call the provider method matching `result_type`.
async fn dispatch(
    provider: &dyn MusicProvider,
    result_type: ResultType,
    query: &str,
    limit: usize,
) -> Result<SearchResults, CatalogError> {
    let results = match result_type {
        ResultType::All => provider.search(query, limit).await?,
        ResultType::Artist => SearchResults {
            artists: provider.search_artists(query, limit).await?,
            ..Default::default()
        },
        ResultType::Album => SearchResults {
            albums: provider.search_albums(query, limit).await?,
            ..Default::default()
        },
        ResultType::Track => SearchResults {
            tracks: provider.search_tracks(query, limit).await?,
            ..Default::default()
        },
    };
    Ok(results)
}
