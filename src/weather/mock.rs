//! Canned per-city forecasts for offline planning and demos

use anyhow::Result;
use async_trait::async_trait;
use rand::RngExt;

use super::WeatherSource;
use crate::models::{City, WeatherObservation};

#[derive(Debug, Clone, Copy)]
struct Preset {
    temperature: i32,
    precipitation: i32,
    wind: i32,
    code: i32,
    condition: &'static str,
}

const fn preset(
    temperature: i32,
    precipitation: i32,
    wind: i32,
    code: i32,
    condition: &'static str,
) -> Preset {
    Preset {
        temperature,
        precipitation,
        wind,
        code,
        condition,
    }
}

// Keyed by short name
const PRESETS: [(&str, Preset); 12] = [
    ("New York", preset(2, 45, 28, 3, "Partly Cloudy")),
    ("London", preset(6, 75, 42, 61, "Light Rain")),
    ("Tokyo", preset(12, 20, 18, 2, "Clear")),
    ("Dubai", preset(28, 5, 22, 0, "Clear Sky")),
    ("Sydney", preset(26, 35, 30, 3, "Scattered Clouds")),
    ("São Paulo", preset(24, 65, 15, 80, "Rain Showers")),
    ("Paris", preset(8, 55, 25, 45, "Foggy")),
    ("Moscow", preset(-8, 80, 35, 73, "Heavy Snow")),
    ("Beijing", preset(0, 30, 45, 71, "Light Snow")),
    ("Mumbai", preset(30, 10, 12, 1, "Mostly Clear")),
    ("Cairo", preset(22, 2, 20, 0, "Clear Sky")),
    ("Cape Town", preset(24, 15, 38, 2, "Few Clouds")),
];

const UNKNOWN_CITY: Preset = preset(15, 20, 15, 0, "Clear");

const RANDOM_CODES: [i32; 9] = [0, 1, 2, 3, 45, 61, 71, 73, 80];
const RANDOM_CONDITIONS: [&str; 5] = ["Clear", "Cloudy", "Rain", "Snow", "Windy"];

/// Weather source backed by fixed per-city presets.
///
/// With jitter enabled each lookup perturbs the preset slightly and unknown
/// cities get a random preset; without jitter results are deterministic.
#[derive(Debug, Clone)]
pub struct MockWeatherSource {
    jitter: bool,
}

impl MockWeatherSource {
    pub fn new(jitter: bool) -> Self {
        Self { jitter }
    }

    /// Deterministic source, useful for tests and reproducible plans
    pub fn fixed() -> Self {
        Self::new(false)
    }

    /// Generate an observation for a location given by display name
    pub fn generate(&self, location: &str) -> WeatherObservation {
        let short_name = location.split(',').next().unwrap_or(location).trim();
        let base = PRESETS
            .iter()
            .find(|(name, _)| *name == short_name)
            .map(|(_, preset)| *preset);

        let base = match (base, self.jitter) {
            (Some(preset), _) => preset,
            (None, true) => random_preset(),
            (None, false) => UNKNOWN_CITY,
        };

        let (temperature, precipitation, wind) = if self.jitter {
            let mut rng = rand::rng();
            (
                base.temperature + rng.random_range(-3..=3),
                (base.precipitation + rng.random_range(-10..=10)).clamp(0, 100),
                (base.wind + rng.random_range(-5..=10)).max(0),
            )
        } else {
            (base.temperature, base.precipitation, base.wind)
        };

        WeatherObservation {
            location: location.to_string(),
            condition: base.condition.to_string(),
            precipitation_probability: precipitation,
            wind_speed_kmh: f64::from(wind),
            temperature_celsius: f64::from(temperature),
            weather_code: base.code,
        }
    }
}

fn random_preset() -> Preset {
    let mut rng = rand::rng();
    preset(
        rng.random_range(-5..=30),
        rng.random_range(0..=100),
        rng.random_range(5..=60),
        RANDOM_CODES[rng.random_range(0..RANDOM_CODES.len())],
        RANDOM_CONDITIONS[rng.random_range(0..RANDOM_CONDITIONS.len())],
    )
}

#[async_trait]
impl WeatherSource for MockWeatherSource {
    async fn observe(&self, city: &City) -> Result<WeatherObservation> {
        Ok(self.generate(&city.name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cities;

    #[test]
    fn test_fixed_presets_are_deterministic() {
        let source = MockWeatherSource::fixed();
        let london = source.generate("London, UK");
        assert_eq!(london.location, "London, UK");
        assert_eq!(london.condition, "Light Rain");
        assert_eq!(london.precipitation_probability, 75);
        assert_eq!(london.wind_speed_kmh, 42.0);
        assert_eq!(london.weather_code, 61);
        assert_eq!(source.generate("London, UK"), london);
    }

    #[test]
    fn test_unknown_city_without_jitter_is_clear() {
        let observation = MockWeatherSource::fixed().generate("Atlantis");
        assert_eq!(observation.condition, "Clear");
        assert_eq!(observation.weather_code, 0);
    }

    #[test]
    fn test_jitter_stays_within_bounds() {
        let source = MockWeatherSource::new(true);
        for _ in 0..50 {
            let dubai = source.generate("Dubai, UAE");
            assert!((0..=15).contains(&dubai.precipitation_probability));
            assert!((17.0..=32.0).contains(&dubai.wind_speed_kmh));
            assert!((25.0..=31.0).contains(&dubai.temperature_celsius));
            assert_eq!(dubai.weather_code, 0);

            let atlantis = source.generate("Atlantis");
            assert!((0..=100).contains(&atlantis.precipitation_probability));
            assert!(atlantis.wind_speed_kmh >= 0.0);
        }
    }

    #[test]
    fn test_every_catalog_city_has_a_preset() {
        for city in cities::all() {
            assert!(
                PRESETS.iter().any(|(name, _)| *name == city.short_name),
                "{} has no preset",
                city.name
            );
        }
    }

    #[tokio::test]
    async fn test_observe_uses_city_name() {
        let moscow = cities::find("moscow").unwrap();
        let observation = MockWeatherSource::fixed().observe(moscow).await.unwrap();
        assert_eq!(observation.location, "Moscow, Russia");
        assert_eq!(observation.weather_code, 73);
    }
}
