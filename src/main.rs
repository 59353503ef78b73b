//! Career Aggregator — Binary Entrypoint
//! Boots the Axum HTTP server: provider registry from environment
//! credentials, in-memory cache store with the configured TTL policy, the
//! background expiry sweep, and the Prometheus exporter.

use std::sync::Arc;

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use career_aggregator::aggregator::AggregationEngine;
use career_aggregator::api::{self, AppState};
use career_aggregator::cache::sweeper::spawn_sweeper;
use career_aggregator::cache::{CacheStore, MemoryCache};
use career_aggregator::config::AppConfig;
use career_aggregator::metrics::Metrics;
use career_aggregator::providers::careerjet::CareerjetProvider;
use career_aggregator::providers::jsearch::JsearchProvider;
use career_aggregator::providers::udemy::UdemyProvider;
use career_aggregator::providers::ProviderRegistry;

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("career_aggregator=info,warn"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact())
        .init();
}

/// Register every provider whose credentials are present. Which sources are
/// enabled is environment-level configuration, not part of the engine.
fn build_registry() -> ProviderRegistry {
    let mut registry = ProviderRegistry::new();

    if let Ok(key) = std::env::var("JSEARCH_API_KEY") {
        registry = registry.register(Arc::new(JsearchProvider::from_api_key(key)));
    }
    if let Ok(key) = std::env::var("CAREERJET_API_KEY") {
        registry = registry.register(Arc::new(CareerjetProvider::from_api_key(key)));
    }
    if let Ok(token) = std::env::var("UDEMY_API_TOKEN") {
        registry = registry.register(Arc::new(UdemyProvider::from_token(token)));
    }

    if registry.is_empty() {
        tracing::warn!(
            "no provider credentials configured; every search will return empty results"
        );
    }
    registry
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env in local/dev; no-op in prod environments.
    let _ = dotenvy::dotenv();
    init_tracing();

    let cfg = AppConfig::load_default()?;
    let metrics = Metrics::init();

    let cache: Arc<dyn CacheStore> = Arc::new(MemoryCache::with_policy(cfg.ttl_policy()));
    spawn_sweeper(cache.clone(), cfg.sweep_interval());

    let engine = Arc::new(AggregationEngine::new(
        build_registry(),
        cache,
        cfg.engine_config(),
    ));

    let router = api::create_router(AppState { engine }).merge(metrics.router());

    let port = std::env::var("PORT").unwrap_or_else(|_| "8080".to_string());
    let addr = format!("0.0.0.0:{port}");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(%addr, "career-aggregator listening");
    axum::serve(listener, router).await?;
    Ok(())
}
