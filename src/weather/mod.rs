//! Weather data sources
//!
//! Every source yields the same [`WeatherObservation`] shape, whether it is
//! backed by canned presets, the OpenMeteo API or a captured agent
//! transcript.

use anyhow::Result;
use async_trait::async_trait;

use crate::models::{City, WeatherObservation};

pub mod mock;
pub mod open_meteo;
pub mod parser;
pub mod transcript;

pub use mock::MockWeatherSource;
pub use open_meteo::OpenMeteoWeatherSource;
pub use parser::{
    FreeTextObservationParser, JsonObservationParser, ObservationParser, parse_observation,
};
pub use transcript::TranscriptWeatherSource;

/// Supplies a forecast for a route destination
#[async_trait]
pub trait WeatherSource: Send + Sync {
    async fn observe(&self, city: &City) -> Result<WeatherObservation>;
}

/// Emoji for a forecast, from its condition text or WMO code
#[must_use]
pub fn weather_icon(condition: &str, code: i32) -> &'static str {
    let condition = condition.to_lowercase();
    if condition.contains("snow") || crate::risk::is_snow_or_ice(code) {
        return "🌨️";
    }
    if condition.contains("rain")
        || condition.contains("shower")
        || matches!(code, 61 | 63 | 65 | 80 | 81 | 82)
    {
        return "🌧️";
    }
    if condition.contains("thunder") || condition.contains("storm") || matches!(code, 95 | 96 | 99)
    {
        return "⛈️";
    }
    if condition.contains("fog") || matches!(code, 45 | 48) {
        return "🌫️";
    }
    if condition.contains("cloud") || matches!(code, 2 | 3) {
        return "☁️";
    }
    if condition.contains("wind") {
        return "💨";
    }
    "☀️"
}
