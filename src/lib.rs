//! `whereabouts` - location resolution for marketplace service listings
//!
//! This library turns heterogeneous service and creator records into a
//! human-readable place label through a tiered fallback chain: fixed service
//! GPS, creator GPS (with suspicious-default detection), live device
//! position, free-text address, and finally the listing title. Reverse
//! geocoding results are cached in memory with a fixed TTL, and a pure
//! formatter provides last-resort regional labels.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod extract;
pub mod fallback;
pub mod geocode;
pub mod map_link;
pub mod models;
pub mod position;
pub mod resolver;
pub mod web;

// Re-export core types for public API
pub use cache::{Clock, LocationCache, ManualClock, SystemClock};
pub use config::WhereaboutsConfig;
pub use error::WhereaboutsError;
pub use geocode::{CountryInfo, GeocodingClient, ResolvedPlace};
pub use models::{BoundingBox, Coordinate, CreatorRecord, ServiceRecord};
pub use position::{CachedPositionSource, PositionSource, StaticPositionSource};
pub use resolver::{
    LocationResolver, LocationSource, ResolvedLocation, Tier, UNAVAILABLE_LABEL,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Core result type used throughout the library
pub type Result<T> = std::result::Result<T, WhereaboutsError>;
