//! Coordinate model, parsing, and cache key generation

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Geographic coordinate pair
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    /// Latitude in decimal degrees
    pub latitude: f64,
    /// Longitude in decimal degrees
    pub longitude: f64,
}

impl Coordinate {
    /// Create a coordinate, returning `None` when either value is out of
    /// range or not finite
    #[must_use]
    pub fn new(latitude: f64, longitude: f64) -> Option<Self> {
        if Self::is_valid(latitude, longitude) {
            Some(Self {
                latitude,
                longitude,
            })
        } else {
            None
        }
    }

    /// Check coordinate ranges: latitude in [-90, 90], longitude in [-180, 180]
    #[must_use]
    pub fn is_valid(latitude: f64, longitude: f64) -> bool {
        latitude.is_finite()
            && longitude.is_finite()
            && (-90.0..=90.0).contains(&latitude)
            && (-180.0..=180.0).contains(&longitude)
    }

    /// Parse a comma-joined pair like `"4.0503,9.7679"`.
    ///
    /// Axis order is inferred: a value within [-90, 90] is taken as the
    /// latitude. When both values qualify, the first one is assumed to be
    /// the latitude.
    #[must_use]
    pub fn parse_pair(input: &str) -> Option<Self> {
        let parts: Vec<&str> = input
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .collect();

        if parts.len() != 2 {
            return None;
        }

        let first = parts[0].parse::<f64>().ok()?;
        let second = parts[1].parse::<f64>().ok()?;
        if first.is_nan() || second.is_nan() {
            return None;
        }

        let in_lat_range = |v: f64| (-90.0..=90.0).contains(&v);

        if in_lat_range(first) {
            Self::new(first, second)
        } else if in_lat_range(second) {
            Self::new(second, first)
        } else {
            None
        }
    }

    /// Parse from a JSON value: either a `"lat,lng"` string or an object
    /// with `lat`/`latitude` and `lng`/`lon`/`longitude` keys. Object input
    /// is unambiguous and skips the axis inference.
    #[must_use]
    pub fn from_json(value: &Value) -> Option<Self> {
        match value {
            Value::String(s) => Self::parse_pair(s),
            Value::Object(map) => {
                let latitude = number_field(map, &["lat", "latitude"])?;
                let longitude = number_field(map, &["lng", "lon", "longitude"])?;
                Self::new(latitude, longitude)
            }
            _ => None,
        }
    }

    /// Cache key: coordinates rounded to 6 decimal places, comma-joined
    #[must_use]
    pub fn cache_key(&self) -> String {
        format!("{:.6},{:.6}", self.latitude, self.longitude)
    }

    /// Format as a short display string, 2-3 decimal places depending on
    /// magnitude
    #[must_use]
    pub fn format_short(&self) -> String {
        format!(
            "{}, {}",
            format_component(self.latitude),
            format_component(self.longitude)
        )
    }
}

fn format_component(value: f64) -> String {
    if value.abs() >= 10.0 {
        format!("{value:.2}")
    } else {
        format!("{value:.3}")
    }
}

fn number_field(map: &serde_json::Map<String, Value>, keys: &[&str]) -> Option<f64> {
    for key in keys {
        match map.get(*key) {
            Some(Value::Number(n)) => return n.as_f64(),
            Some(Value::String(s)) => return s.trim().parse::<f64>().ok(),
            _ => {}
        }
    }
    None
}

/// Axis-aligned bounding box over latitude/longitude
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lng: f64,
    pub max_lng: f64,
}

impl BoundingBox {
    #[must_use]
    pub const fn new(min_lat: f64, max_lat: f64, min_lng: f64, max_lng: f64) -> Self {
        Self {
            min_lat,
            max_lat,
            min_lng,
            max_lng,
        }
    }

    /// Check whether a coordinate lies inside the box (inclusive)
    #[must_use]
    pub fn contains(&self, coordinate: Coordinate) -> bool {
        coordinate.latitude >= self.min_lat
            && coordinate.latitude <= self.max_lat
            && coordinate.longitude >= self.min_lng
            && coordinate.longitude <= self.max_lng
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    #[rstest]
    #[case("4.0503,9.7679", 4.0503, 9.7679)]
    #[case("4.0503, 9.7679", 4.0503, 9.7679)]
    #[case("  6.5 , 3.5 ", 6.5, 3.5)]
    #[case("-46.8182,-8.2275", -46.8182, -8.2275)]
    fn test_parse_pair(#[case] input: &str, #[case] lat: f64, #[case] lng: f64) {
        let coord = Coordinate::parse_pair(input).unwrap();
        assert_eq!(coord.latitude, lat);
        assert_eq!(coord.longitude, lng);
    }

    #[test]
    fn test_parse_pair_keeps_latitude_when_unambiguous() {
        // Second value is outside [-90, 90], so the first must stay latitude
        let coord = Coordinate::parse_pair("45.2,120.5").unwrap();
        assert_eq!(coord.latitude, 45.2);
        assert_eq!(coord.longitude, 120.5);
    }

    #[test]
    fn test_parse_pair_swaps_reversed_axes() {
        let coord = Coordinate::parse_pair("120.5,45.2").unwrap();
        assert_eq!(coord.latitude, 45.2);
        assert_eq!(coord.longitude, 120.5);
    }

    #[test]
    fn test_parse_pair_ambiguous_first_wins() {
        // Both values qualify as latitude; the first is assumed to be it
        let coord = Coordinate::parse_pair("6.5,3.5").unwrap();
        assert_eq!(coord.latitude, 6.5);
        assert_eq!(coord.longitude, 3.5);
    }

    #[rstest]
    #[case("")]
    #[case("4.05")]
    #[case("4.05,9.7,3.2")]
    #[case("abc,def")]
    #[case("120.5,195.0")]
    fn test_parse_pair_rejects(#[case] input: &str) {
        assert!(Coordinate::parse_pair(input).is_none());
    }

    #[test]
    fn test_from_json_object_forms() {
        let coord = Coordinate::from_json(&json!({"lat": 4.05, "lng": 9.7})).unwrap();
        assert_eq!(coord.latitude, 4.05);

        let coord = Coordinate::from_json(&json!({"lat": "4.05", "lon": "9.7"})).unwrap();
        assert_eq!(coord.longitude, 9.7);

        assert!(Coordinate::from_json(&json!(42)).is_none());
        assert!(Coordinate::from_json(&json!({"lat": 4.05})).is_none());
    }

    #[test]
    fn test_cache_key_rounds_to_six_decimals() {
        let coord = Coordinate::new(4.050_312_789, 9.767_945_123).unwrap();
        assert_eq!(coord.cache_key(), "4.050313,9.767945");
    }

    #[test]
    fn test_format_short() {
        let coord = Coordinate::new(4.0503, 9.7679).unwrap();
        assert_eq!(coord.format_short(), "4.050, 9.768");

        let coord = Coordinate::new(46.8182, 120.5).unwrap();
        assert_eq!(coord.format_short(), "46.82, 120.50");
    }

    #[test]
    fn test_bounding_box_contains() {
        let lagos = BoundingBox::new(6.3, 6.8, 3.1, 3.8);
        assert!(lagos.contains(Coordinate::new(6.5, 3.5).unwrap()));
        assert!(!lagos.contains(Coordinate::new(4.05, 9.7).unwrap()));
    }
}
