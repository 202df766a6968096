//! ipapi-agent - Geolocation lookup service with hexagonal architecture
//!
//! This is the composition root that wires together all the components.

use ipapi_agent::adapters::inbound::{ApiServer, ApiState, TargetPolicy};
use ipapi_agent::adapters::outbound::{build_http_client, DashMapQueryCache, UpstreamRegistry};
use ipapi_agent::config::load_config;
use ipapi_agent::domain::services::ProviderSelector;
use ipapi_agent::infrastructure::{shutdown_signal, ShutdownController};
use ipapi_agent::QueryService;
use std::sync::Arc;
use tracing_subscriber::fmt::format::FmtSpan;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration from environment
    let cfg = load_config()?;

    // Setup logging
    let log_level = if cfg.debug {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };

    tracing_subscriber::fmt()
        .with_max_level(log_level)
        .with_span_events(FmtSpan::CLOSE)
        .init();

    // Colour is decided per request, not by TTY detection
    colored::control::set_override(true);

    tracing::info!(
        "starting ipapi-agent {} listen={} mode={} pool={:?}",
        env!("CARGO_PKG_VERSION"),
        cfg.listen_addr,
        cfg.upstream_mode,
        cfg.upstream_pool
    );

    // ===== COMPOSITION ROOT =====

    // 1. Outbound adapters
    let http = build_http_client(cfg.upstream_timeout())?;
    let registry = UpstreamRegistry::new(http);

    let policy = match cfg.selection_policy(&registry) {
        Ok(policy) => policy,
        Err(e) => {
            tracing::error!("invalid upstream configuration: {}", e);
            return Err(e.into());
        }
    };

    let shutdown = ShutdownController::new();

    let cache = Arc::new(DashMapQueryCache::new(cfg.cache_ttl()));
    let sweep = cache.start_sweep(cfg.cache_sweep_interval(), &shutdown);

    // 2. Application service
    let service = Arc::new(QueryService::new(
        ProviderSelector::new(policy),
        registry,
        cache,
    ));

    // 3. Inbound adapter
    let targets = TargetPolicy::new(cfg.domain_enabled, &cfg.domain_block_suffix);
    let state = ApiState::new(service, targets, cfg.trusted_proxies.clone());
    let server = ApiServer::new(cfg.listen_addr.clone(), state, cfg.access_log);

    tokio::spawn(shutdown_signal(shutdown.clone()));

    let result = server.run(shutdown.clone()).await;

    // Stop the sweep even when the server exits on its own
    shutdown.shutdown();
    let _ = sweep.await;

    result
}
