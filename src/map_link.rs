//! External map link construction for "view on map" actions

use crate::models::Coordinate;

/// Link to a coordinate pin
#[must_use]
pub fn coordinate_url(coordinate: Coordinate) -> String {
    format!(
        "https://www.google.com/maps?q={:.6},{:.6}",
        coordinate.latitude, coordinate.longitude
    )
}

/// Link to a free-text place search
#[must_use]
pub fn search_url(query: &str) -> String {
    format!(
        "https://www.google.com/maps/search/?api=1&query={}",
        urlencoding::encode(query)
    )
}
