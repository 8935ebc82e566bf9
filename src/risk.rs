//! Weather risk classification
//!
//! Maps a single [`WeatherObservation`] to a [`RiskVerdict`]. All three
//! checks (snow/ice, precipitation, wind) are evaluated independently; the
//! resulting multiplier is the largest triggered candidate, never a sum.

use crate::models::WeatherObservation;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Multiplier applied when snow or ice is forecast
pub const SNOW_MULTIPLIER: f64 = 1.40;
/// Multiplier applied when precipitation probability is high
pub const PRECIPITATION_MULTIPLIER: f64 = 1.30;
/// Multiplier applied when winds are high
pub const WIND_MULTIPLIER: f64 = 1.15;

/// Precipitation probability (percent) above which a leg is HIGH risk
pub const PRECIPITATION_THRESHOLD: i32 = 70;
/// Wind speed (km/h) above which a leg is at least MEDIUM risk
pub const WIND_THRESHOLD_KMH: f64 = 40.0;

const CLEAR_CONDITIONS: &str = "Clear conditions";

/// Risk severity, ordered from least to most severe
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    /// Display color for this level
    #[must_use]
    pub fn color(self) -> RiskColor {
        match self {
            RiskLevel::Low => RiskColor::Green,
            RiskLevel::Medium => RiskColor::Yellow,
            RiskLevel::High => RiskColor::Red,
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            RiskLevel::Low => "LOW",
            RiskLevel::Medium => "MEDIUM",
            RiskLevel::High => "HIGH",
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Traffic-light color derived from a [`RiskLevel`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskColor {
    Green,
    Yellow,
    Red,
}

impl RiskColor {
    /// Hex code used by the web frontend
    #[must_use]
    pub fn hex(self) -> &'static str {
        match self {
            RiskColor::Red => "#ef4444",
            RiskColor::Yellow => "#f59e0b",
            RiskColor::Green => "#10b981",
        }
    }
}

/// Outcome of classifying one weather observation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskVerdict {
    pub level: RiskLevel,
    pub color: RiskColor,
    /// Delay multiplier, always >= 1.0
    pub multiplier: f64,
    /// Triggered checks in evaluation order, or "Clear conditions"
    pub factors: Vec<String>,
}

/// Whether the WMO code denotes snow or ice (71-77 snow, 85-86 snow showers)
#[must_use]
pub fn is_snow_or_ice(weather_code: i32) -> bool {
    matches!(weather_code, 71..=77 | 85 | 86)
}

/// Classify the travel risk of a weather observation.
///
/// Wind never downgrades a HIGH verdict set by snow or precipitation, but
/// its multiplier candidate and factor string still apply.
#[must_use]
pub fn classify(observation: &WeatherObservation) -> RiskVerdict {
    let mut level = RiskLevel::Low;
    let mut multiplier: f64 = 1.0;
    let mut factors = Vec::new();

    if is_snow_or_ice(observation.weather_code) {
        level = RiskLevel::High;
        multiplier = multiplier.max(SNOW_MULTIPLIER);
        factors.push("Snow/ice conditions".to_string());
    }

    if observation.precipitation_probability > PRECIPITATION_THRESHOLD {
        level = RiskLevel::High;
        multiplier = multiplier.max(PRECIPITATION_MULTIPLIER);
        factors.push(format!(
            "High precipitation ({}%)",
            observation.precipitation_probability
        ));
    }

    if observation.wind_speed_kmh > WIND_THRESHOLD_KMH {
        if level != RiskLevel::High {
            level = RiskLevel::Medium;
        }
        multiplier = multiplier.max(WIND_MULTIPLIER);
        factors.push(format!("High winds ({} km/h)", observation.wind_speed_kmh));
    }

    if factors.is_empty() {
        factors.push(CLEAR_CONDITIONS.to_string());
    }

    RiskVerdict {
        level,
        color: level.color(),
        multiplier,
        factors,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn observation(precipitation: i32, wind: f64, code: i32) -> WeatherObservation {
        WeatherObservation {
            location: "Test".to_string(),
            condition: "Test".to_string(),
            precipitation_probability: precipitation,
            wind_speed_kmh: wind,
            temperature_celsius: 5.0,
            weather_code: code,
        }
    }

    #[rstest]
    #[case(0, 0.0, 0)]
    #[case(70, 40.0, 3)]
    #[case(45, 28.0, 61)]
    #[case(65, 15.0, 80)]
    #[case(70, 40.0, 78)]
    #[case(70, 12.0, 84)]
    fn test_calm_weather_is_low_risk(#[case] precip: i32, #[case] wind: f64, #[case] code: i32) {
        let verdict = classify(&observation(precip, wind, code));
        assert_eq!(verdict.level, RiskLevel::Low);
        assert_eq!(verdict.color, RiskColor::Green);
        assert_eq!(verdict.multiplier, 1.0);
        assert_eq!(verdict.factors, vec!["Clear conditions"]);
    }

    #[rstest]
    #[case(71)]
    #[case(73)]
    #[case(75)]
    #[case(77)]
    #[case(85)]
    #[case(86)]
    fn test_snow_codes_are_high_risk(#[case] code: i32) {
        let verdict = classify(&observation(0, 0.0, code));
        assert_eq!(verdict.level, RiskLevel::High);
        assert_eq!(verdict.color, RiskColor::Red);
        assert_eq!(verdict.multiplier, 1.40);
        assert_eq!(verdict.factors, vec!["Snow/ice conditions"]);
    }

    #[test]
    fn test_precipitation_beats_wind_without_downgrade() {
        let verdict = classify(&observation(71, 45.0, 61));
        assert_eq!(verdict.level, RiskLevel::High);
        assert_eq!(verdict.color, RiskColor::Red);
        assert_eq!(verdict.multiplier, 1.30);
        assert_eq!(
            verdict.factors,
            vec!["High precipitation (71%)", "High winds (45 km/h)"]
        );
    }

    #[test]
    fn test_wind_alone_is_medium_risk() {
        let verdict = classify(&observation(10, 40.5, 2));
        assert_eq!(verdict.level, RiskLevel::Medium);
        assert_eq!(verdict.color, RiskColor::Yellow);
        assert_eq!(verdict.multiplier, 1.15);
        assert_eq!(verdict.factors, vec!["High winds (40.5 km/h)"]);
    }

    #[test]
    fn test_all_checks_take_max_multiplier() {
        let verdict = classify(&observation(95, 60.0, 75));
        assert_eq!(verdict.level, RiskLevel::High);
        assert_eq!(verdict.multiplier, 1.40);
        assert_eq!(
            verdict.factors,
            vec![
                "Snow/ice conditions",
                "High precipitation (95%)",
                "High winds (60 km/h)"
            ]
        );
    }

    #[test]
    fn test_out_of_range_precipitation_is_accepted() {
        let verdict = classify(&observation(250, 0.0, 0));
        assert_eq!(verdict.level, RiskLevel::High);
        assert_eq!(verdict.factors, vec!["High precipitation (250%)"]);

        let verdict = classify(&observation(-5, 0.0, 0));
        assert_eq!(verdict.level, RiskLevel::Low);
    }

    #[test]
    fn test_default_observation_never_fails() {
        let verdict = classify(&WeatherObservation::default());
        assert_eq!(verdict.level, RiskLevel::Low);
        assert_eq!(verdict.multiplier, 1.0);
    }

    #[test]
    fn test_level_ordering_and_colors() {
        assert!(RiskLevel::High > RiskLevel::Medium);
        assert!(RiskLevel::Medium > RiskLevel::Low);
        assert_eq!(RiskLevel::High.color().hex(), "#ef4444");
        assert_eq!(RiskLevel::Medium.color().hex(), "#f59e0b");
        assert_eq!(RiskLevel::Low.color().hex(), "#10b981");
        assert_eq!(serde_json::to_string(&RiskLevel::Medium).unwrap(), "\"MEDIUM\"");
        assert_eq!(serde_json::to_string(&RiskColor::Yellow).unwrap(), "\"yellow\"");
    }
}
