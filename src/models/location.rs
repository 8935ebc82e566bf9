//! City model for selectable route stops

use serde::{Deserialize, Serialize};

/// A stop that can be placed on a route
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct City {
    /// Short identifier used by API clients (e.g. "nyc")
    pub id: String,
    /// Full display name (e.g. "New York, NY, USA")
    pub name: String,
    /// Compact name for map labels
    pub short_name: String,
    /// Latitude in decimal degrees
    pub latitude: f64,
    /// Longitude in decimal degrees
    pub longitude: f64,
}

impl City {
    /// Create a new city
    #[must_use]
    pub fn new(id: &str, name: &str, short_name: &str, latitude: f64, longitude: f64) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            short_name: short_name.to_string(),
            latitude,
            longitude,
        }
    }

    /// Format location as coordinates string
    #[must_use]
    pub fn format_coordinates(&self) -> String {
        format!("{:.4}, {:.4}", self.latitude, self.longitude)
    }

    /// Great-circle distance to another city in kilometers
    #[must_use]
    pub fn distance_km(&self, other: &City) -> f64 {
        haversine::distance(
            haversine::Location {
                latitude: self.latitude,
                longitude: self.longitude,
            },
            haversine::Location {
                latitude: other.latitude,
                longitude: other.longitude,
            },
            haversine::Units::Kilometers,
        )
    }
}
