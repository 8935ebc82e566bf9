//! OpenMeteo forecast client
//!
//! Reads the daily forecast for a destination and reduces the selected day
//! to a [`WeatherObservation`]. No API key is required.

use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest_middleware::ClientWithMiddleware;
use serde::Deserialize;
use std::time::Instant;
use tracing::{debug, info, instrument, warn};

use super::WeatherSource;
use crate::RouteError;
use crate::models::{City, WeatherObservation};

const DAILY_FIELDS: &str =
    "temperature_2m_max,precipitation_probability_max,wind_speed_10m_max,weather_code";

/// Daily forecast response from `OpenMeteo`
#[derive(Debug, Deserialize)]
pub struct ForecastResponse {
    pub latitude: f64,
    pub longitude: f64,
    pub daily: Option<DailyData>,
}

/// Daily weather data from `OpenMeteo`; any entry may be null
#[derive(Debug, Deserialize)]
pub struct DailyData {
    pub time: Vec<String>,
    #[serde(rename = "temperature_2m_max")]
    pub temperature_max: Option<Vec<Option<f64>>>,
    #[serde(rename = "precipitation_probability_max")]
    pub precipitation_probability: Option<Vec<Option<i32>>>,
    #[serde(rename = "wind_speed_10m_max")]
    pub wind_speed_max: Option<Vec<Option<f64>>>,
    pub weather_code: Option<Vec<Option<i32>>>,
}

fn value_at<T: Copy>(values: &Option<Vec<Option<T>>>, index: usize) -> Option<T> {
    values.as_ref().and_then(|v| v.get(index).copied().flatten())
}

impl DailyData {
    /// Index of the requested day, or the first day when absent
    fn day_index(&self, date: Option<NaiveDate>) -> usize {
        let Some(date) = date else {
            return 0;
        };
        let wanted = date.format("%Y-%m-%d").to_string();
        self.time.iter().position(|t| *t == wanted).unwrap_or_else(|| {
            warn!("Forecast date {} not in response, using first day", wanted);
            0
        })
    }

    /// Reduce one day to an observation, defaulting missing values
    #[must_use]
    pub fn observation(&self, location: &str, date: Option<NaiveDate>) -> WeatherObservation {
        let i = self.day_index(date);
        let weather_code = value_at(&self.weather_code, i).unwrap_or(0);

        WeatherObservation {
            location: location.to_string(),
            condition: weather_code_to_description(weather_code).to_string(),
            precipitation_probability: value_at(&self.precipitation_probability, i).unwrap_or(0),
            wind_speed_kmh: value_at(&self.wind_speed_max, i).unwrap_or(0.0),
            temperature_celsius: value_at(&self.temperature_max, i).unwrap_or(0.0),
            weather_code,
        }
    }
}

/// Convert a WMO weather code to a human-readable description
#[must_use]
pub fn weather_code_to_description(code: i32) -> &'static str {
    match code {
        0 => "Clear sky",
        1 => "Mainly clear",
        2 => "Partly cloudy",
        3 => "Overcast",
        45 => "Fog",
        48 => "Depositing rime fog",
        51 => "Light drizzle",
        53 => "Moderate drizzle",
        55 => "Dense drizzle",
        56 => "Light freezing drizzle",
        57 => "Dense freezing drizzle",
        61 => "Slight rain",
        63 => "Moderate rain",
        65 => "Heavy rain",
        66 => "Light freezing rain",
        67 => "Heavy freezing rain",
        71 => "Slight snow fall",
        73 => "Moderate snow fall",
        75 => "Heavy snow fall",
        77 => "Snow grains",
        80 => "Slight rain showers",
        81 => "Moderate rain showers",
        82 => "Violent rain showers",
        85 => "Slight snow showers",
        86 => "Heavy snow showers",
        95 => "Thunderstorm",
        96 => "Thunderstorm with slight hail",
        99 => "Thunderstorm with heavy hail",
        _ => "Unknown",
    }
}

/// Live forecasts from the OpenMeteo API
pub struct OpenMeteoWeatherSource {
    client: ClientWithMiddleware,
    base_url: String,
    forecast_date: Option<NaiveDate>,
}

impl OpenMeteoWeatherSource {
    pub fn new(
        client: ClientWithMiddleware,
        base_url: impl Into<String>,
        forecast_date: Option<NaiveDate>,
    ) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            forecast_date,
        }
    }

    fn forecast_url(&self, city: &City) -> String {
        format!(
            "{}/forecast?latitude={}&longitude={}&daily={}&timezone=auto&forecast_days=16",
            self.base_url.trim_end_matches('/'),
            city.latitude,
            city.longitude,
            DAILY_FIELDS
        )
    }
}

#[async_trait]
impl WeatherSource for OpenMeteoWeatherSource {
    #[instrument(skip(self, city), fields(city = %city.id))]
    async fn observe(&self, city: &City) -> Result<WeatherObservation> {
        let start_time = Instant::now();
        let url = self.forecast_url(city);
        debug!("OpenMeteo API request URL: {}", url);

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| RouteError::api(format!("OpenMeteo request failed: {e}")))?
            .error_for_status()
            .map_err(|e| RouteError::api(format!("OpenMeteo returned an error status: {e}")))?;

        let forecast: ForecastResponse = response
            .json()
            .await
            .with_context(|| "Failed to parse OpenMeteo forecast response")?;

        let daily = forecast
            .daily
            .ok_or_else(|| anyhow!("No daily forecast for {}", city.format_coordinates()))?;

        let observation = daily.observation(&city.name, self.forecast_date);

        let total_duration = start_time.elapsed();
        info!(
            "Retrieved forecast for {} in {:.3}s",
            city.name,
            total_duration.as_secs_f64()
        );
        if total_duration.as_secs() > 5 {
            warn!(
                "Slow forecast API response: {:.3}s",
                total_duration.as_secs_f64()
            );
        }

        Ok(observation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RESPONSE: &str = r#"{
        "latitude": 51.5,
        "longitude": -0.12,
        "timezone": "Europe/London",
        "daily": {
            "time": ["2026-12-23", "2026-12-24"],
            "temperature_2m_max": [7.1, 4.5],
            "precipitation_probability_max": [20, 85],
            "wind_speed_10m_max": [18.2, null],
            "weather_code": [3, 73]
        }
    }"#;

    #[test]
    fn test_observation_for_requested_day() {
        let response: ForecastResponse = serde_json::from_str(RESPONSE).unwrap();
        let daily = response.daily.unwrap();
        let observation = daily.observation("London, UK", NaiveDate::from_ymd_opt(2026, 12, 24));

        assert_eq!(observation.location, "London, UK");
        assert_eq!(observation.temperature_celsius, 4.5);
        assert_eq!(observation.precipitation_probability, 85);
        assert_eq!(observation.wind_speed_kmh, 0.0);
        assert_eq!(observation.weather_code, 73);
        assert_eq!(observation.condition, "Moderate snow fall");
    }

    #[test]
    fn test_observation_defaults_to_first_day() {
        let response: ForecastResponse = serde_json::from_str(RESPONSE).unwrap();
        let daily = response.daily.unwrap();

        let first = daily.observation("London, UK", None);
        assert_eq!(first.weather_code, 3);
        assert_eq!(first.wind_speed_kmh, 18.2);

        let missing = daily.observation("London, UK", NaiveDate::from_ymd_opt(2027, 1, 1));
        assert_eq!(missing, first);
    }

    #[test]
    fn test_missing_series_default_to_zero() {
        let daily: DailyData = serde_json::from_str(r#"{"time": ["2026-12-24"]}"#).unwrap();
        let observation = daily.observation("Nowhere", None);
        assert_eq!(observation.precipitation_probability, 0);
        assert_eq!(observation.condition, "Clear sky");
    }

    #[test]
    fn test_weather_code_descriptions() {
        assert_eq!(weather_code_to_description(61), "Slight rain");
        assert_eq!(weather_code_to_description(86), "Heavy snow showers");
        assert_eq!(weather_code_to_description(42), "Unknown");
    }
}
