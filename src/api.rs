//! HTTP API for the location resolution pipeline

use axum::{
    Router,
    extract::State,
    response::Json,
    routing::{get, post},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::cache::LocationCache;
use crate::geocode::{CountryInfo, GeocodingClient};
use crate::map_link;
use crate::models::{Coordinate, ServiceRecord};
use crate::position::StaticPositionSource;
use crate::resolver::{LocationResolver, LocationSource, UNAVAILABLE_LABEL};

/// Shared handler state
#[derive(Clone)]
pub struct AppState {
    pub resolver: Arc<LocationResolver>,
    pub geocoder: Arc<GeocodingClient>,
    pub cache: Arc<LocationCache>,
}

#[derive(Debug, Deserialize)]
pub struct ResolveRequest {
    /// Service record fields, accepted at the top level of the body
    #[serde(flatten)]
    pub service: ServiceRecord,
    /// Device coordinates the client sent along, if any
    pub device_position: Option<CoordinateDto>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct CoordinateDto {
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Serialize)]
pub struct ResolveResponse {
    pub label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<LocationSource>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<CountryInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub map_url: Option<String>,
    pub resolved_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct BatchRequest {
    pub coordinates: Vec<CoordinateDto>,
}

#[derive(Debug, Serialize)]
pub struct BatchResponse {
    pub labels: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct CacheClearResponse {
    pub cleared: usize,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/location/resolve", post(resolve_location))
        .route("/location/batch", post(batch_resolve))
        .route("/location/cache/clear", post(clear_cache))
        .route("/health", get(health))
        .with_state(state)
}

async fn resolve_location(
    State(state): State<AppState>,
    Json(request): Json<ResolveRequest>,
) -> Json<ResolveResponse> {
    let resolved = match request.device_position {
        Some(position) => {
            let source = Coordinate::new(position.latitude, position.longitude)
                .map(StaticPositionSource::fixed)
                .unwrap_or_else(StaticPositionSource::unavailable);
            state
                .resolver
                .resolve_with_source(&request.service, &source)
                .await
        }
        None => state.resolver.resolve(&request.service).await,
    };

    let map_url = resolved.coordinate.map(map_link::coordinate_url);

    Json(ResolveResponse {
        label: resolved.label,
        source: resolved.source,
        country: resolved.country,
        map_url,
        resolved_at: Utc::now(),
    })
}

async fn batch_resolve(
    State(state): State<AppState>,
    Json(request): Json<BatchRequest>,
) -> Json<BatchResponse> {
    let parsed: Vec<Option<Coordinate>> = request
        .coordinates
        .iter()
        .map(|c| Coordinate::new(c.latitude, c.longitude))
        .collect();

    let valid: Vec<Coordinate> = parsed.iter().filter_map(|c| *c).collect();
    let resolved = state.geocoder.display_names(&valid).await;
    let mut resolved = resolved.into_iter();

    // Invalid coordinates keep their slot in the response
    let labels = parsed
        .iter()
        .map(|c| match c {
            Some(_) => resolved
                .next()
                .unwrap_or_else(|| UNAVAILABLE_LABEL.to_string()),
            None => UNAVAILABLE_LABEL.to_string(),
        })
        .collect();

    Json(BatchResponse { labels })
}

async fn clear_cache(State(state): State<AppState>) -> Json<CacheClearResponse> {
    let cleared = state.cache.clear();
    tracing::info!(cleared, "location cache cleared");
    Json(CacheClearResponse { cleared })
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: crate::VERSION,
    })
}
