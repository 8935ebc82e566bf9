//! Routing facts for one leg of a multi-stop route

use serde::{Deserialize, Serialize};

/// One origin-to-destination segment as reported by a routing source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoutingLeg {
    pub origin: String,
    pub destination: String,
    /// Distance in kilometers
    pub distance_km: f64,
    /// Unadjusted travel time in seconds
    pub duration_seconds: f64,
}

impl RoutingLeg {
    #[must_use]
    pub fn new(
        origin: impl Into<String>,
        destination: impl Into<String>,
        distance_km: f64,
        duration_seconds: f64,
    ) -> Self {
        Self {
            origin: origin.into(),
            destination: destination.into(),
            distance_km,
            duration_seconds,
        }
    }
}
