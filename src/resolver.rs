//! Tiered location resolution
//!
//! Resolves a service record to a display label by walking an ordered chain
//! of data sources: the service's own fixed GPS, the creator's GPS (guarded
//! by suspicious-default detection), the live device position, the free-text
//! address, and finally the listing title. The first tier that yields a
//! usable label wins.

use crate::extract;
use crate::geocode::{CountryInfo, GeocodingClient};
use crate::models::{BoundingBox, Coordinate, ServiceRecord};
use crate::position::PositionSource;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, instrument, warn};

/// Terminal label when every tier fails
pub const UNAVAILABLE_LABEL: &str = "Localisation non disponible";

/// Generic label when a suspicious creator position cannot be overridden
pub const CREATOR_POSITION_LABEL: &str = "Position du créateur";

/// Bounding boxes around known signup-default coordinates (Lagos, Abuja,
/// Kwara). Creator positions inside one of these are assumed to be stale
/// defaults rather than real locations.
const SUSPICIOUS_DEFAULTS: &[BoundingBox] = &[
    BoundingBox::new(6.3, 6.8, 3.1, 3.8),
    BoundingBox::new(8.9, 9.3, 7.2, 7.7),
    BoundingBox::new(8.2, 9.1, 4.2, 5.2),
];

/// Data source a resolved label came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LocationSource {
    /// The service's own fixed GPS field
    Service,
    /// Live device position
    User,
    /// Creator record GPS
    Creator,
    /// Free-text address field
    Adresse,
    /// Listing title
    Titre,
}

/// Resolution tier, in the vocabulary of the configurable tier order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tier {
    ServiceFixedGps,
    CreatorGps,
    DevicePosition,
    ServiceAddress,
    ServiceTitle,
}

impl Tier {
    /// The default five-tier chain
    #[must_use]
    pub fn default_order() -> &'static [Tier] {
        &[
            Tier::ServiceFixedGps,
            Tier::CreatorGps,
            Tier::DevicePosition,
            Tier::ServiceAddress,
            Tier::ServiceTitle,
        ]
    }

    /// Parse a tier from its configuration name
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "service" => Some(Tier::ServiceFixedGps),
            "creator" => Some(Tier::CreatorGps),
            "user" => Some(Tier::DevicePosition),
            "adresse" => Some(Tier::ServiceAddress),
            "titre" => Some(Tier::ServiceTitle),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Tier::ServiceFixedGps => "service",
            Tier::CreatorGps => "creator",
            Tier::DevicePosition => "user",
            Tier::ServiceAddress => "adresse",
            Tier::ServiceTitle => "titre",
        }
    }
}

/// Final resolution result
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedLocation {
    /// Human-readable place label; never empty
    pub label: String,
    /// Which tier produced the label; `None` for the terminal fallback
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<LocationSource>,
    /// Country metadata when the geocoding backend provided it
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<CountryInfo>,
    /// Coordinate the label was derived from, when one was involved
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coordinate: Option<Coordinate>,
}

impl ResolvedLocation {
    #[must_use]
    pub fn unavailable() -> Self {
        Self {
            label: UNAVAILABLE_LABEL.to_string(),
            source: None,
            country: None,
            coordinate: None,
        }
    }
}

/// Check a coordinate against the known signup-default boxes
#[must_use]
pub fn is_suspicious_default(coordinate: Coordinate) -> bool {
    SUSPICIOUS_DEFAULTS.iter().any(|b| b.contains(coordinate))
}

/// Tier-configurable location resolver
pub struct LocationResolver {
    geocoder: Arc<GeocodingClient>,
    positions: Arc<dyn PositionSource>,
    tiers: Vec<Tier>,
}

impl LocationResolver {
    /// Create a resolver with the default tier order
    #[must_use]
    pub fn new(geocoder: Arc<GeocodingClient>, positions: Arc<dyn PositionSource>) -> Self {
        Self::with_tiers(geocoder, positions, Tier::default_order().to_vec())
    }

    /// Create a resolver with an explicit tier order
    #[must_use]
    pub fn with_tiers(
        geocoder: Arc<GeocodingClient>,
        positions: Arc<dyn PositionSource>,
        tiers: Vec<Tier>,
    ) -> Self {
        Self {
            geocoder,
            positions,
            tiers,
        }
    }

    /// Resolve a service record using the configured position source
    pub async fn resolve(&self, record: &ServiceRecord) -> ResolvedLocation {
        self.resolve_with_source(record, self.positions.as_ref())
            .await
    }

    /// Resolve a service record with a caller-supplied position source,
    /// e.g. coordinates the requesting device sent along
    #[instrument(skip_all)]
    pub async fn resolve_with_source(
        &self,
        record: &ServiceRecord,
        positions: &dyn PositionSource,
    ) -> ResolvedLocation {
        for tier in &self.tiers {
            debug!(tier = tier.as_str(), "trying resolution tier");

            let outcome = match tier {
                Tier::ServiceFixedGps => self.from_service_gps(record).await,
                Tier::CreatorGps => self.from_creator_gps(record, positions).await,
                Tier::DevicePosition => self.from_device(positions).await,
                Tier::ServiceAddress => {
                    Self::from_text_field(record.adresse.as_ref(), LocationSource::Adresse)
                }
                Tier::ServiceTitle => {
                    Self::from_text_field(record.titre.as_ref(), LocationSource::Titre)
                }
            };

            if let Some(resolved) = outcome {
                if !resolved.label.trim().is_empty() && resolved.label != UNAVAILABLE_LABEL {
                    debug!(
                        tier = tier.as_str(),
                        label = %resolved.label,
                        "tier produced a label"
                    );
                    return resolved;
                }
            }
        }

        debug!("every tier failed, returning unavailable label");
        ResolvedLocation::unavailable()
    }

    async fn from_service_gps(&self, record: &ServiceRecord) -> Option<ResolvedLocation> {
        let raw = record.gps_fixe.as_ref().map(extract::field_text)?;
        if !raw.contains(',') {
            return None;
        }
        let coordinate = Coordinate::parse_pair(&raw)?;

        let place = self.geocoder.resolve_place(coordinate).await;
        Some(ResolvedLocation {
            label: place.label,
            source: Some(LocationSource::Service),
            country: place.country,
            coordinate: Some(coordinate),
        })
    }

    async fn from_creator_gps(
        &self,
        record: &ServiceRecord,
        positions: &dyn PositionSource,
    ) -> Option<ResolvedLocation> {
        let creator = record.creator.as_ref()?;
        let raw = creator.gps.as_ref().map(extract::field_text)?;
        if !raw.contains(',') {
            return None;
        }
        let coordinate = Coordinate::parse_pair(&raw)?;

        if is_suspicious_default(coordinate) {
            warn!(
                lat = coordinate.latitude,
                lng = coordinate.longitude,
                "creator GPS matches a signup default, requesting device position"
            );

            return match positions.current_position().await {
                Ok(live) => {
                    let place = self.geocoder.resolve_place(live).await;
                    Some(ResolvedLocation {
                        label: place.label,
                        source: Some(LocationSource::User),
                        country: place.country,
                        coordinate: Some(live),
                    })
                }
                Err(err) => {
                    debug!(error = %err, "device override unavailable, using generic creator label");
                    Some(ResolvedLocation {
                        label: CREATOR_POSITION_LABEL.to_string(),
                        source: Some(LocationSource::Creator),
                        country: None,
                        coordinate: Some(coordinate),
                    })
                }
            };
        }

        let place = self.geocoder.resolve_place(coordinate).await;
        Some(ResolvedLocation {
            label: place.label,
            source: Some(LocationSource::Creator),
            country: place.country,
            coordinate: Some(coordinate),
        })
    }

    async fn from_device(&self, positions: &dyn PositionSource) -> Option<ResolvedLocation> {
        match positions.current_position().await {
            Ok(coordinate) => {
                let place = self.geocoder.resolve_place(coordinate).await;
                Some(ResolvedLocation {
                    label: place.label,
                    source: Some(LocationSource::User),
                    country: place.country,
                    coordinate: Some(coordinate),
                })
            }
            Err(err) => {
                debug!(error = %err, "device position unavailable, skipping tier");
                None
            }
        }
    }

    fn from_text_field(value: Option<&Value>, source: LocationSource) -> Option<ResolvedLocation> {
        let text = value.map(extract::field_text)?;
        let text = text.trim();
        if text.is_empty() {
            return None;
        }
        Some(ResolvedLocation {
            label: text.to_string(),
            source: Some(source),
            country: None,
            coordinate: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(6.5, 3.5, true)] // Lagos
    #[case(9.06, 7.49, true)] // Abuja
    #[case(8.5, 4.55, true)] // Kwara
    #[case(4.05, 9.7, false)] // Douala
    #[case(3.8667, 11.5167, false)] // Yaoundé
    fn test_suspicious_default_detection(
        #[case] lat: f64,
        #[case] lng: f64,
        #[case] expected: bool,
    ) {
        let coordinate = Coordinate::new(lat, lng).unwrap();
        assert_eq!(is_suspicious_default(coordinate), expected);
    }

    #[test]
    fn test_tier_names_round_trip() {
        for tier in Tier::default_order() {
            assert_eq!(Tier::from_name(tier.as_str()), Some(*tier));
        }
        assert_eq!(Tier::from_name("Service"), Some(Tier::ServiceFixedGps));
        assert_eq!(Tier::from_name("satellite"), None);
    }

    #[test]
    fn test_source_tags_serialize_lowercase() {
        assert_eq!(
            serde_json::to_string(&LocationSource::Adresse).unwrap(),
            "\"adresse\""
        );
        assert_eq!(
            serde_json::to_string(&LocationSource::User).unwrap(),
            "\"user\""
        );
    }

    #[test]
    fn test_unavailable_result() {
        let resolved = ResolvedLocation::unavailable();
        assert_eq!(resolved.label, UNAVAILABLE_LABEL);
        assert!(resolved.source.is_none());
        assert!(resolved.coordinate.is_none());
    }
}
