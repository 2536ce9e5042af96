//! Last-resort position labels
//!
//! When every geocoding path fails, coordinates degrade to a heuristic
//! regional label from a fixed table of bounding boxes, or to plain
//! formatted coordinates. The boxes are approximations and must only ever
//! be used as terminal fallbacks, never as primary place data.

use crate::models::{BoundingBox, Coordinate};

struct Region {
    bounds: BoundingBox,
    name: &'static str,
}

const fn region(
    min_lat: f64,
    max_lat: f64,
    min_lng: f64,
    max_lng: f64,
    name: &'static str,
) -> Region {
    Region {
        bounds: BoundingBox::new(min_lat, max_lat, min_lng, max_lng),
        name,
    }
}

/// Named regions, checked in order; first match wins. Cameroon regions come
/// before the continent-scale buckets.
const REGIONS: &[Region] = &[
    region(3.2, 5.2, 9.0, 10.5, "Littoral, Cameroun"),
    region(4.0, 6.3, 8.4, 9.4, "Sud-Ouest, Cameroun"),
    region(3.0, 5.0, 10.5, 12.5, "Centre, Cameroun"),
    region(5.0, 5.8, 9.8, 11.0, "Ouest, Cameroun"),
    region(5.8, 7.1, 9.7, 11.0, "Nord-Ouest, Cameroun"),
    region(6.0, 8.0, 11.0, 15.0, "Adamaoua, Cameroun"),
    region(8.0, 10.0, 12.5, 15.5, "Nord, Cameroun"),
    region(10.0, 13.1, 13.5, 15.7, "Extrême-Nord, Cameroun"),
    region(2.0, 3.2, 9.8, 13.3, "Sud, Cameroun"),
    region(2.0, 6.0, 12.5, 16.2, "Est, Cameroun"),
    region(-5.0, 15.0, 8.0, 28.0, "Afrique centrale"),
    region(36.0, 46.0, -10.0, 30.0, "Europe du Sud"),
    region(36.0, 71.0, -25.0, 45.0, "Europe"),
];

/// Look up the heuristic region name for a coordinate
#[must_use]
pub fn region_label(coordinate: Coordinate) -> Option<&'static str> {
    REGIONS
        .iter()
        .find(|r| r.bounds.contains(coordinate))
        .map(|r| r.name)
}

/// Format a position for display when geocoding failed entirely: the region
/// name when a box matches, otherwise short formatted coordinates. Pure and
/// total.
#[must_use]
pub fn format_position(coordinate: Coordinate) -> String {
    match region_label(coordinate) {
        Some(name) => name.to_string(),
        None => coordinate.format_short(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn coord(lat: f64, lng: f64) -> Coordinate {
        Coordinate::new(lat, lng).unwrap()
    }

    #[rstest]
    #[case(4.05, 9.7, "Littoral, Cameroun")]
    #[case(3.8667, 11.5167, "Centre, Cameroun")]
    #[case(5.47, 10.42, "Ouest, Cameroun")]
    #[case(5.96, 10.15, "Nord-Ouest, Cameroun")]
    #[case(7.32, 13.58, "Adamaoua, Cameroun")]
    #[case(9.3, 13.4, "Nord, Cameroun")]
    #[case(10.6, 14.3, "Extrême-Nord, Cameroun")]
    #[case(2.9, 11.15, "Sud, Cameroun")]
    #[case(4.58, 13.68, "Est, Cameroun")]
    fn test_cameroon_regions(#[case] lat: f64, #[case] lng: f64, #[case] expected: &str) {
        assert_eq!(region_label(coord(lat, lng)), Some(expected));
    }

    #[test]
    fn test_broader_buckets() {
        // Bangui: inside the Central Africa box, outside every Cameroon region
        assert_eq!(region_label(coord(4.39, 18.55)), Some("Afrique centrale"));
        // Madrid
        assert_eq!(region_label(coord(40.42, -3.7)), Some("Europe du Sud"));
        // Oslo: Europe, north of the southern bucket
        assert_eq!(region_label(coord(59.91, 10.75)), Some("Europe"));
    }

    #[test]
    fn test_format_position_falls_back_to_coordinates() {
        // Middle of the Atlantic matches nothing
        assert_eq!(region_label(coord(-30.0, -40.0)), None);
        assert_eq!(format_position(coord(-30.0, -40.0)), "-30.00, -40.00");
    }

    #[test]
    fn test_format_position_prefers_region() {
        assert_eq!(format_position(coord(4.05, 9.7)), "Littoral, Cameroun");
    }
}
