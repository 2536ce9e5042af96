//! Reverse geocoding client
//!
//! Resolves coordinates to place names through the marketplace backend, with
//! an optional direct-provider fallback and the in-memory result cache
//! wrapped around every lookup. The public entry points never fail: every
//! error path degrades to a fallback label so callers always receive a
//! displayable string.

use crate::WhereaboutsError;
use crate::cache::LocationCache;
use crate::config::GeocodingConfig;
use crate::fallback;
use crate::models::Coordinate;
use futures::future::join_all;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, instrument, warn};

/// Address component types checked when the backend did not assemble a
/// formatted address, most specific first
const COMPONENT_PREFERENCE: &[&[&str]] = &[
    &["neighborhood", "neighbourhood"],
    &["sublocality", "sublocality_level_1"],
    &["locality"],
    &["administrative_area_level_1", "administrative_area_level_2"],
];

/// Country metadata attached to a resolved place
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountryInfo {
    /// ISO 3166-1 alpha-2 code
    pub code: String,
    /// Country display name
    #[serde(rename = "countryName")]
    pub name: String,
}

/// A resolved place name with optional country metadata. Country data is
/// only present on fresh network resolutions; cache hits and fallback
/// labels carry the name alone.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedPlace {
    pub label: String,
    pub country: Option<CountryInfo>,
}

#[derive(Debug, Serialize)]
struct ReverseRequest {
    latitude: f64,
    longitude: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    detail_level: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ReverseResponse {
    formatted_address: Option<String>,
    address_components: Option<Vec<AddressComponent>>,
}

#[derive(Debug, Deserialize)]
struct AddressComponent {
    long_name: String,
    short_name: String,
    types: Vec<String>,
}

/// Direct provider response, reduced to the fields we read
#[derive(Debug, Deserialize)]
struct ProviderResponse {
    status: String,
    #[serde(default)]
    results: Vec<ProviderResult>,
}

#[derive(Debug, Deserialize)]
struct ProviderResult {
    formatted_address: Option<String>,
}

/// Reverse geocoding client with a result cache
pub struct GeocodingClient {
    client: Client,
    config: GeocodingConfig,
    cache: Arc<LocationCache>,
}

impl GeocodingClient {
    /// Create a new client
    pub fn new(config: GeocodingConfig, cache: Arc<LocationCache>) -> crate::Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds.into()))
            .user_agent(concat!("whereabouts/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| {
                WhereaboutsError::network(format!("Failed to create HTTP client: {e}"))
            })?;

        Ok(Self {
            client,
            config,
            cache,
        })
    }

    /// Resolve a coordinate to a place name. Checks the cache first, then
    /// the backend, then the direct provider (when a key is configured),
    /// and finally the pure fallback formatter. Never fails; every outcome
    /// is cached under the rounded coordinate key.
    #[instrument(skip(self), fields(lat = coordinate.latitude, lng = coordinate.longitude))]
    pub async fn resolve_place(&self, coordinate: Coordinate) -> ResolvedPlace {
        let key = coordinate.cache_key();

        if let Some(name) = self.cache.get(&key) {
            return ResolvedPlace {
                label: name,
                country: None,
            };
        }

        match self.reverse(coordinate).await {
            Ok(place) => {
                self.cache.insert(&key, &place.label);
                place
            }
            Err(err) => {
                warn!(error = %err, "backend reverse geocoding failed");

                if let Some(api_key) = self.config.provider_api_key.as_deref() {
                    match self.provider_lookup(coordinate, api_key).await {
                        Ok(label) => {
                            self.cache.insert(&key, &label);
                            return ResolvedPlace {
                                label,
                                country: None,
                            };
                        }
                        Err(err) => {
                            warn!(error = %err, "direct provider fallback failed");
                        }
                    }
                }

                let label = fallback::format_position(coordinate);
                self.cache.insert(&key, &label);
                ResolvedPlace {
                    label,
                    country: None,
                }
            }
        }
    }

    /// Convenience wrapper returning only the display label
    pub async fn display_name(&self, coordinate: Coordinate) -> String {
        self.resolve_place(coordinate).await.label
    }

    /// Resolve a list of coordinates, reusing cached entries and fetching
    /// the rest concurrently in fixed-size chunks. The returned labels are
    /// aligned with the input order.
    pub async fn display_names(&self, coordinates: &[Coordinate]) -> Vec<String> {
        let (cached, missing) = self.cache.partition(coordinates);
        debug!(
            cached = cached.len(),
            missing = missing.len(),
            "batch resolution partitioned"
        );

        let mut resolved: HashMap<String, String> = cached
            .into_iter()
            .map(|(coordinate, name)| (coordinate.cache_key(), name))
            .collect();

        for chunk in missing.chunks(self.config.batch_size.max(1)) {
            let places = join_all(chunk.iter().map(|c| self.resolve_place(*c))).await;
            for (coordinate, place) in chunk.iter().zip(places) {
                resolved.insert(coordinate.cache_key(), place.label);
            }
        }

        coordinates
            .iter()
            .map(|coordinate| {
                resolved
                    .get(&coordinate.cache_key())
                    .cloned()
                    .unwrap_or_else(|| fallback::format_position(*coordinate))
            })
            .collect()
    }

    /// Call the backend reverse-geocoding endpoint
    async fn reverse(&self, coordinate: Coordinate) -> crate::Result<ResolvedPlace> {
        let url = format!(
            "{}/api/geocoding/reverse",
            self.config.base_url.trim_end_matches('/')
        );
        let body = ReverseRequest {
            latitude: coordinate.latitude,
            longitude: coordinate.longitude,
            detail_level: self.config.detail_level.clone(),
        };

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    WhereaboutsError::network(format!("Reverse geocoding timed out: {e}"))
                } else {
                    WhereaboutsError::network(format!("Reverse geocoding request failed: {e}"))
                }
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();

            return match status.as_u16() {
                401 | 403 => Err(WhereaboutsError::authentication(
                    "Backend rejected the reverse geocoding request",
                )),
                429 => Err(WhereaboutsError::rate_limit(
                    "Backend reverse geocoding rate limit exceeded",
                )),
                _ => Err(WhereaboutsError::api(format!(
                    "Reverse geocoding error {status}: {error_text}"
                ))),
            };
        }

        let payload: ReverseResponse = response.json().await.map_err(|e| {
            WhereaboutsError::parse(format!("Failed to parse reverse geocoding response: {e}"))
        })?;

        let country = payload.country();
        let label = payload
            .formatted_address
            .filter(|s| !s.trim().is_empty())
            .or_else(|| pick_component(payload.address_components.as_deref().unwrap_or(&[])))
            .ok_or_else(|| {
                WhereaboutsError::parse("Reverse geocoding response contained no usable address")
            })?;

        Ok(ResolvedPlace { label, country })
    }

    /// Direct provider lookup, only reached when an API key is configured
    async fn provider_lookup(&self, coordinate: Coordinate, api_key: &str) -> crate::Result<String> {
        let url = format!(
            "https://maps.googleapis.com/maps/api/geocode/json?latlng={:.6},{:.6}&language={}&key={}",
            coordinate.latitude, coordinate.longitude, self.config.language, api_key
        );

        let response = self.client.get(&url).send().await.map_err(|e| {
            WhereaboutsError::network(format!("Provider request failed: {e}"))
        })?;

        if !response.status().is_success() {
            return Err(WhereaboutsError::api(format!(
                "Provider returned HTTP {}",
                response.status()
            )));
        }

        let payload: ProviderResponse = response.json().await.map_err(|e| {
            WhereaboutsError::parse(format!("Failed to parse provider response: {e}"))
        })?;

        if payload.status != "OK" {
            return Err(WhereaboutsError::api(format!(
                "Provider status: {}",
                payload.status
            )));
        }

        payload
            .results
            .into_iter()
            .filter_map(|r| r.formatted_address)
            .find(|addr| !addr.trim().is_empty())
            .ok_or_else(|| WhereaboutsError::parse("Provider response contained no address"))
    }
}

impl ReverseResponse {
    fn country(&self) -> Option<CountryInfo> {
        self.address_components
            .as_deref()
            .unwrap_or(&[])
            .iter()
            .find(|c| c.types.iter().any(|t| t == "country"))
            .map(|c| CountryInfo {
                code: c.short_name.clone(),
                name: c.long_name.clone(),
            })
    }
}

fn pick_component(components: &[AddressComponent]) -> Option<String> {
    for wanted in COMPONENT_PREFERENCE {
        if let Some(component) = components
            .iter()
            .find(|c| c.types.iter().any(|t| wanted.contains(&t.as_str())))
        {
            return Some(component.long_name.clone());
        }
    }
    None
}
