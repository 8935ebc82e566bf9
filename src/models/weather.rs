//! Weather observation attached to each route destination

use serde::{Deserialize, Serialize};

const UNKNOWN: &str = "Unknown";

/// Forecast facts for one destination.
///
/// Every field has a default so partially filled records coming from
/// upstream sources deserialize without error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WeatherObservation {
    /// Location the forecast was taken for
    pub location: String,
    /// Free-text condition label (e.g. "Light Rain")
    pub condition: String,
    /// Precipitation probability in percent (nominally 0-100)
    pub precipitation_probability: i32,
    /// Wind speed in km/h
    pub wind_speed_kmh: f64,
    /// Temperature in Celsius
    pub temperature_celsius: f64,
    /// WMO weather interpretation code
    pub weather_code: i32,
}

impl Default for WeatherObservation {
    fn default() -> Self {
        Self {
            location: UNKNOWN.to_string(),
            condition: UNKNOWN.to_string(),
            precipitation_probability: 0,
            wind_speed_kmh: 0.0,
            temperature_celsius: 0.0,
            weather_code: 0,
        }
    }
}

impl WeatherObservation {
    /// Fallback observation used when no forecast could be obtained
    #[must_use]
    pub fn unknown(location: impl Into<String>) -> Self {
        Self {
            location: location.into(),
            ..Self::default()
        }
    }
}
