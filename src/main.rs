use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tracing_subscriber::EnvFilter;

use whereabouts::api::AppState;
use whereabouts::config::LoggingConfig;
use whereabouts::{
    CachedPositionSource, GeocodingClient, LocationCache, LocationResolver, PositionSource,
    StaticPositionSource, WhereaboutsConfig, web,
};

#[tokio::main]
async fn main() -> Result<()> {
    let config = WhereaboutsConfig::load()?;
    init_tracing(&config.logging)?;
    tracing::info!(version = whereabouts::VERSION, "starting whereabouts");

    let cache = Arc::new(LocationCache::new(Duration::from_secs(
        u64::from(config.cache.ttl_hours) * 3600,
    )));
    let geocoder = Arc::new(GeocodingClient::new(
        config.geocoding.clone(),
        Arc::clone(&cache),
    )?);

    // The server has no device of its own; live positions only come in with
    // requests. The cached wrapper still applies the timeout and max-age
    // rules when a deployment injects a real source here.
    let positions: Arc<dyn PositionSource> = Arc::new(CachedPositionSource::new(
        StaticPositionSource::unavailable(),
        Duration::from_secs(config.resolver.device_timeout_seconds.into()),
        Duration::from_secs(config.resolver.position_max_age_seconds.into()),
    ));

    let tiers = config.resolver.parse_tiers()?;
    let resolver = Arc::new(LocationResolver::with_tiers(
        Arc::clone(&geocoder),
        positions,
        tiers,
    ));

    let state = AppState {
        resolver,
        geocoder,
        cache,
    };

    web::run(state, config.server.port).await
}

fn init_tracing(logging: &LoggingConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&logging.level))?;

    if logging.format == "json" {
        tracing_subscriber::fmt().with_env_filter(filter).json().init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
    Ok(())
}
