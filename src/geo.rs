//! Static geographic reference for the regional service area.
//!
//! Lookup only, no external geocoding. Unknown pairs resolve to `None`,
//! which callers treat as a normal outcome.

use crate::models::GeoPoint;

/// One known (city, state) pair. Keys are stored pre-normalized
/// (trimmed, lowercase).
struct GeoEntry {
    city: &'static str,
    state: &'static str,
    coordinates: GeoPoint,
}

/// Reference table covering the NJ/PA/DE service area.
const GEO_REFERENCE: &[GeoEntry] = &[
    GeoEntry { city: "toms river", state: "nj", coordinates: GeoPoint(-74.1979, 39.9537) },
    GeoEntry { city: "atlantic city", state: "nj", coordinates: GeoPoint(-74.4229, 39.3643) },
    GeoEntry { city: "newark", state: "nj", coordinates: GeoPoint(-74.1724, 40.7357) },
    GeoEntry { city: "jersey city", state: "nj", coordinates: GeoPoint(-74.074, 40.7282) },
    GeoEntry { city: "trenton", state: "nj", coordinates: GeoPoint(-74.7439, 40.2171) },
    GeoEntry { city: "camden", state: "nj", coordinates: GeoPoint(-75.1196, 39.9259) },
    GeoEntry { city: "cherry hill", state: "nj", coordinates: GeoPoint(-75.0379, 39.9268) },
    GeoEntry { city: "philadelphia", state: "pa", coordinates: GeoPoint(-75.1652, 39.9526) },
    GeoEntry { city: "king of prussia", state: "pa", coordinates: GeoPoint(-75.3899, 40.1013) },
    GeoEntry { city: "wilmington", state: "de", coordinates: GeoPoint(-75.5467, 39.7447) },
];

/// Resolve a free-form (city, state) pair to coordinates.
///
/// Inputs are trimmed and lowercased before lookup. Returns `None` when the
/// pair is not in the reference table.
pub fn resolve_coordinates(city: &str, state: &str) -> Option<GeoPoint> {
    let city = city.trim().to_lowercase();
    let state = state.trim().to_lowercase();

    GEO_REFERENCE
        .iter()
        .find(|entry| entry.city == city && entry.state == state)
        .map(|entry| entry.coordinates)
}
