//! Built-in city catalog
//!
//! The fixed set of stops a route can be built from, a table of known
//! city-to-city distances, and the great-circle fallback used for pairs the
//! table does not cover.

use crate::models::City;
use std::sync::LazyLock;

/// Distance assumed when neither the table nor coordinates can help
pub const FALLBACK_DISTANCE_KM: f64 = 5000.0;

/// Ids of the default delivery route, in stop order
pub const DEFAULT_ROUTE: [&str; 6] = ["nyc", "london", "tokyo", "dubai", "sydney", "saopaulo"];

static CITIES: LazyLock<Vec<City>> = LazyLock::new(|| {
    vec![
        City::new("nyc", "New York, NY, USA", "New York", 40.7128, -74.0060),
        City::new("london", "London, UK", "London", 51.5074, -0.1278),
        City::new("tokyo", "Tokyo, Japan", "Tokyo", 35.6762, 139.6503),
        City::new("dubai", "Dubai, UAE", "Dubai", 25.2048, 55.2708),
        City::new("sydney", "Sydney, Australia", "Sydney", -33.8688, 151.2093),
        City::new("saopaulo", "São Paulo, Brazil", "São Paulo", -23.5505, -46.6333),
        City::new("paris", "Paris, France", "Paris", 48.8566, 2.3522),
        City::new("moscow", "Moscow, Russia", "Moscow", 55.7558, 37.6173),
        City::new("beijing", "Beijing, China", "Beijing", 39.9042, 116.4074),
        City::new("mumbai", "Mumbai, India", "Mumbai", 19.0760, 72.8777),
        City::new("cairo", "Cairo, Egypt", "Cairo", 30.0444, 31.2357),
        City::new("capetown", "Cape Town, South Africa", "Cape Town", -33.9249, 18.4241),
    ]
});

// Surveyed distances (km), looked up in either direction
const KNOWN_DISTANCES: [(&str, &str, f64); 10] = [
    ("nyc", "london", 5571.0),
    ("london", "tokyo", 9588.0),
    ("tokyo", "dubai", 7779.0),
    ("dubai", "sydney", 12051.0),
    ("sydney", "saopaulo", 13553.0),
    ("saopaulo", "nyc", 7688.0),
    ("paris", "london", 344.0),
    ("moscow", "beijing", 5794.0),
    ("mumbai", "dubai", 1933.0),
    ("cairo", "capetown", 7245.0),
];

/// All selectable cities in catalog order
#[must_use]
pub fn all() -> &'static [City] {
    &CITIES
}

/// Look up a city by id
#[must_use]
pub fn find(id: &str) -> Option<&'static City> {
    CITIES.iter().find(|city| city.id == id)
}

/// Look up a city by its full display name
#[must_use]
pub fn find_by_name(name: &str) -> Option<&'static City> {
    CITIES.iter().find(|city| city.name == name)
}

/// Resolve ids to cities, keeping order and skipping unknown ids
#[must_use]
pub fn resolve<S: AsRef<str>>(ids: &[S]) -> Vec<City> {
    ids.iter()
        .filter_map(|id| find(id.as_ref()))
        .cloned()
        .collect()
}

/// The default delivery route
#[must_use]
pub fn default_route() -> Vec<City> {
    resolve(&DEFAULT_ROUTE)
}

/// Distance between two catalog cities in kilometers.
///
/// Uses the surveyed table first (either direction), then the great-circle
/// distance between the catalog coordinates.
#[must_use]
pub fn distance_km(origin: &City, destination: &City) -> f64 {
    KNOWN_DISTANCES
        .iter()
        .find(|(a, b, _)| {
            (*a == origin.id && *b == destination.id) || (*a == destination.id && *b == origin.id)
        })
        .map_or_else(|| origin.distance_km(destination), |(_, _, km)| *km)
}

/// Distance between two cities identified by display name.
///
/// Names that are not in the catalog yield [`FALLBACK_DISTANCE_KM`].
#[must_use]
pub fn distance_km_by_name(origin: &str, destination: &str) -> f64 {
    match (find_by_name(origin), find_by_name(destination)) {
        (Some(origin), Some(destination)) => distance_km(origin, destination),
        _ => FALLBACK_DISTANCE_KM,
    }
}
