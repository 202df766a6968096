//! Query Service - Main application use case
//!
//! Combines selection, fetch and caching for one lookup. This is the
//! entry point for the inbound HTTP adapter.

use crate::domain::entities::{CanonicalResponse, QueryStatus};
use crate::domain::error::QueryError;
use crate::adapters::outbound::UpstreamRegistry;
use crate::domain::ports::{GeoProvider, ProviderFactory, QueryCache};
use crate::domain::services::ProviderSelector;
use std::sync::Arc;

/// Query service - the lookup orchestrator.
///
/// Owns the selector, the provider factory and the cache; provider clients
/// are built per request through the factory.
pub struct QueryService<F: ProviderFactory = UpstreamRegistry> {
    selector: ProviderSelector,
    providers: F,
    cache: Arc<dyn QueryCache>,
}

impl<F: ProviderFactory> QueryService<F> {
    pub fn new(selector: ProviderSelector, providers: F, cache: Arc<dyn QueryCache>) -> Self {
        Self {
            selector,
            providers,
            cache,
        }
    }

    pub fn selector(&self) -> &ProviderSelector {
        &self.selector
    }

    /// Resolve a validated address.
    ///
    /// With `use_cache` a live cache entry is returned without touching the
    /// upstream. Without it the upstream is always queried, and a success
    /// still refreshes the cached entry. Failures are never cached.
    pub async fn resolve(
        &self,
        addr: &str,
        use_cache: bool,
    ) -> Result<CanonicalResponse, QueryError> {
        if use_cache {
            if let Some(cached) = self.cache.get(addr) {
                tracing::debug!("cache hit for {}", addr);
                return Ok(cached);
            }
        }

        let provider = self.selector.select()?;
        let client = self.providers.construct(provider);

        match client.fetch(addr).await {
            Ok(mut resp) => {
                resp.status = QueryStatus::Success;
                resp.message = None;
                self.cache.set_default(addr.to_string(), resp.clone());
                tracing::debug!("fetched {} from {}", addr, provider);
                Ok(resp)
            }
            Err(source) => {
                tracing::warn!("upstream {} failed for {}: {}", provider, addr, source);
                Err(QueryError::Upstream { provider, source })
            }
        }
    }
}
