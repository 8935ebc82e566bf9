//! Weather source backed by a captured agent transcript

use anyhow::Result;
use async_trait::async_trait;
use std::path::Path;
use tracing::debug;

use super::{WeatherSource, parse_observation};
use crate::models::{City, WeatherObservation};

/// Serves observations parsed out of a tool-calling agent's final output
#[derive(Debug, Clone)]
pub struct TranscriptWeatherSource {
    text: String,
}

impl TranscriptWeatherSource {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    pub async fn from_file(path: impl AsRef<Path>) -> crate::Result<Self> {
        let path = path.as_ref();
        debug!("Reading transcript {}", path.display());
        let text = tokio::fs::read_to_string(path).await?;
        Ok(Self::new(text))
    }
}

#[async_trait]
impl WeatherSource for TranscriptWeatherSource {
    async fn observe(&self, city: &City) -> Result<WeatherObservation> {
        let observation = parse_observation(&self.text, &city.name);
        debug!(
            "Parsed transcript weather for {}: {} ({}%, {} km/h)",
            city.name,
            observation.condition,
            observation.precipitation_probability,
            observation.wind_speed_kmh
        );
        Ok(observation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cities;
    use std::io::Write;

    #[tokio::test]
    async fn test_observe_parses_transcript_section() {
        let source = TranscriptWeatherSource::new(
            "Beijing forecast: Light Snow, weather code 71, wind 45 km/h, temperature 0°C",
        );
        let beijing = cities::find("beijing").unwrap();
        let observation = source.observe(beijing).await.unwrap();
        assert_eq!(observation.location, "Beijing, China");
        assert_eq!(observation.weather_code, 71);
        assert_eq!(observation.wind_speed_kmh, 45.0);
    }

    #[tokio::test]
    async fn test_missing_city_yields_defaults() {
        let source = TranscriptWeatherSource::new("nothing useful");
        let cairo = cities::find("cairo").unwrap();
        let observation = source.observe(cairo).await.unwrap();
        assert_eq!(observation, WeatherObservation::unknown("Cairo, Egypt"));
    }

    #[tokio::test]
    async fn test_missing_transcript_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = TranscriptWeatherSource::from_file(dir.path().join("missing.txt"))
            .await
            .unwrap_err();
        assert!(matches!(err, crate::RouteError::Io { .. }));
    }

    #[tokio::test]
    async fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{{\"weather_code\": 86}}").unwrap();
        let source = TranscriptWeatherSource::from_file(file.path()).await.unwrap();
        let moscow = cities::find("moscow").unwrap();
        assert_eq!(source.observe(moscow).await.unwrap().weather_code, 86);
    }
}
