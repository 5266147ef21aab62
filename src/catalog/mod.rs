//! Catalog search and import - queries external music providers and pulls
//! albums into the local catalog.
//!
//! # Architecture
//!
//! This module follows a clean separation between:
//! - **Domain models** (`domain.rs`) - Provider-neutral Artist/Album/Track and errors
//! - **Provider modules** (`spotify/`, `apple_music/`, `musicbrainz/`) - each split
//!   into DTOs (exact API shapes), an adapter (DTO→domain) and an HTTP client
//! - **Traits** (`traits.rs`) - The `MusicProvider` and `CatalogStore` seams
//! - **Registry** (`registry.rs`) - Which providers are configured
//! - **Aggregator** (`aggregator.rs`) - Concurrent fan-out search with partial results
//! - **Import** (`import.rs`) - Idempotent album + track reconciliation
//!
//! This decoupling means:
//! 1. API changes don't ripple through our codebase
//! 2. We can test API contracts independently
//! 3. Tests swap real providers and storage for mocks
//!
//! # Usage
//!
//! ```ignore
//! use catalog::{CallContext, ProviderRegistry, SearchAggregator, SearchRequest};
//!
//! let registry = Arc::new(ProviderRegistry::from_config(&config.providers));
//! let aggregator = SearchAggregator::new(registry);
//!
//! let ctx = CallContext::new().with_timeout(Duration::from_secs(30));
//! let results = aggregator
//!     .search(&ctx, SearchRequest { query: "geogaddi".into(), ..Default::default() })
//!     .await;
//! ```

pub mod aggregator;
pub mod apple_music;
pub mod context;
pub mod domain;
pub mod http;
pub mod import;
pub mod musicbrainz;
pub mod registry;
pub mod spotify;
pub mod traits;

pub use aggregator::{SearchAggregator, SearchRequest};
pub use context::CallContext;
pub use domain::{
    Album, Artist, CatalogError, ErrorKind, ProviderId, ProviderSelector, ProviderStatus,
    ResultType, SearchResults, Track,
};
pub use import::{ImportPipeline, ImportReport};
pub use registry::ProviderRegistry;
pub use traits::{ArtistDiscography, CatalogStore, MusicProvider};
