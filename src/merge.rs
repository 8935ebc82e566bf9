//! Route merging and aggregation
//!
//! Pairs each routing leg with the weather observation for its destination,
//! applies the risk multiplier to the leg duration and aggregates the route
//! summary. Values are kept unrounded; [`MergedRoute::report`] is the only
//! place rounding happens.

use crate::error::RouteError;
use crate::models::{RoutingLeg, WeatherObservation};
use crate::risk::{self, RiskColor, RiskLevel};
use serde::{Deserialize, Serialize};

/// Kilometers to statute miles
pub const KM_TO_MILES: f64 = 0.621_371;

const SECONDS_PER_HOUR: f64 = 3600.0;

/// One leg with its weather, risk verdict and adjusted timing
#[derive(Debug, Clone, PartialEq)]
pub struct LegResult {
    /// 1-based position in the route
    pub leg_number: usize,
    pub origin: String,
    pub destination: String,
    pub distance_km: f64,
    pub distance_miles: f64,
    pub base_duration_seconds: f64,
    pub base_eta_hours: f64,
    pub weather: WeatherObservation,
    pub risk_level: RiskLevel,
    pub risk_color: RiskColor,
    pub risk_multiplier: f64,
    pub risk_factors: Vec<String>,
    pub adjusted_duration_seconds: f64,
    pub adjusted_eta_hours: f64,
    pub delay_hours: f64,
}

/// Route-level aggregates
#[derive(Debug, Clone, PartialEq)]
pub struct RouteSummary {
    pub total_distance_miles: f64,
    pub total_base_eta_hours: f64,
    pub total_adjusted_eta_hours: f64,
    pub total_delay_hours: f64,
    pub high_risk_legs: usize,
    pub medium_risk_legs: usize,
    pub low_risk_legs: usize,
    pub overall_risk: RiskLevel,
}

/// Merged legs plus their summary
#[derive(Debug, Clone, PartialEq)]
pub struct MergedRoute {
    pub legs: Vec<LegResult>,
    pub summary: RouteSummary,
}

/// Route-level risk from the per-leg distribution.
///
/// Two or more HIGH legs make the route HIGH; a single HIGH leg or three
/// or more MEDIUM legs make it MEDIUM.
#[must_use]
pub fn overall_risk(high_risk_legs: usize, medium_risk_legs: usize) -> RiskLevel {
    if high_risk_legs >= 2 {
        RiskLevel::High
    } else if high_risk_legs >= 1 || medium_risk_legs >= 3 {
        RiskLevel::Medium
    } else {
        RiskLevel::Low
    }
}

fn merge_leg(leg_number: usize, leg: &RoutingLeg, weather: &WeatherObservation) -> LegResult {
    let verdict = risk::classify(weather);

    let base_eta_hours = leg.duration_seconds / SECONDS_PER_HOUR;
    let adjusted_duration_seconds = leg.duration_seconds * verdict.multiplier;
    let adjusted_eta_hours = adjusted_duration_seconds / SECONDS_PER_HOUR;

    LegResult {
        leg_number,
        origin: leg.origin.clone(),
        destination: leg.destination.clone(),
        distance_km: leg.distance_km,
        distance_miles: leg.distance_km * KM_TO_MILES,
        base_duration_seconds: leg.duration_seconds,
        base_eta_hours,
        weather: weather.clone(),
        risk_level: verdict.level,
        risk_color: verdict.color,
        risk_multiplier: verdict.multiplier,
        risk_factors: verdict.factors,
        adjusted_duration_seconds,
        adjusted_eta_hours,
        delay_hours: adjusted_eta_hours - base_eta_hours,
    }
}

fn summarize(legs: &[LegResult]) -> RouteSummary {
    let total_distance_miles: f64 = legs.iter().map(|l| l.distance_miles).sum();
    let total_base_eta_hours: f64 = legs.iter().map(|l| l.base_eta_hours).sum();
    let total_adjusted_eta_hours: f64 = legs.iter().map(|l| l.adjusted_eta_hours).sum();

    let count = |level: RiskLevel| legs.iter().filter(|l| l.risk_level == level).count();
    let high_risk_legs = count(RiskLevel::High);
    let medium_risk_legs = count(RiskLevel::Medium);
    let low_risk_legs = count(RiskLevel::Low);

    RouteSummary {
        total_distance_miles,
        total_base_eta_hours,
        total_adjusted_eta_hours,
        total_delay_hours: total_adjusted_eta_hours - total_base_eta_hours,
        high_risk_legs,
        medium_risk_legs,
        low_risk_legs,
        overall_risk: overall_risk(high_risk_legs, medium_risk_legs),
    }
}

/// Merge routing legs with the weather at each destination.
///
/// Leg `i` is paired with observation `i`. When the slices differ in length
/// only the overlapping prefix is processed; use [`try_merge`] to reject
/// mismatched input instead.
#[must_use]
pub fn merge(legs: &[RoutingLeg], observations: &[WeatherObservation]) -> MergedRoute {
    let legs: Vec<LegResult> = legs
        .iter()
        .zip(observations)
        .enumerate()
        .map(|(i, (leg, weather))| merge_leg(i + 1, leg, weather))
        .collect();
    let summary = summarize(&legs);

    MergedRoute { legs, summary }
}

/// Like [`merge`], but fails when the two sequences differ in length.
pub fn try_merge(
    legs: &[RoutingLeg],
    observations: &[WeatherObservation],
) -> Result<MergedRoute, RouteError> {
    if legs.len() != observations.len() {
        return Err(RouteError::LengthMismatch {
            legs: legs.len(),
            observations: observations.len(),
        });
    }
    Ok(merge(legs, observations))
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10_f64.powi(decimals);
    (value * factor).round() / factor
}

/// Round to 2 decimal places for presentation
#[must_use]
pub fn round2(value: f64) -> f64 {
    round_to(value, 2)
}

/// Round to 1 decimal place for presentation
#[must_use]
pub fn round1(value: f64) -> f64 {
    round_to(value, 1)
}

/// Serializable leg as presented to consumers
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LegReport {
    pub leg_number: usize,
    pub from: String,
    pub to: String,
    pub distance_km: f64,
    pub distance_miles: f64,
    pub base_duration_seconds: f64,
    pub base_eta_hours: f64,
    pub weather: WeatherObservation,
    pub risk_level: RiskLevel,
    pub risk_color: RiskColor,
    pub risk_multiplier: f64,
    pub risk_factors: Vec<String>,
    pub adjusted_duration_seconds: i64,
    pub adjusted_eta_hours: f64,
    pub delay_hours: f64,
}

/// Serializable summary as presented to consumers
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouteSummaryReport {
    pub total_distance_miles: f64,
    pub total_base_eta_hours: f64,
    pub total_adjusted_eta_hours: f64,
    pub total_delay_hours: f64,
    pub high_risk_legs: usize,
    pub medium_risk_legs: usize,
    pub low_risk_legs: usize,
    pub overall_risk: RiskLevel,
}

/// Full serializable route payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouteReport {
    pub route_summary: RouteSummaryReport,
    pub legs: Vec<LegReport>,
}

impl From<&LegResult> for LegReport {
    fn from(leg: &LegResult) -> Self {
        let mut weather = leg.weather.clone();
        weather.location = leg.destination.clone();

        Self {
            leg_number: leg.leg_number,
            from: leg.origin.clone(),
            to: leg.destination.clone(),
            distance_km: round2(leg.distance_km),
            distance_miles: round2(leg.distance_miles),
            base_duration_seconds: leg.base_duration_seconds,
            base_eta_hours: round2(leg.base_eta_hours),
            weather,
            risk_level: leg.risk_level,
            risk_color: leg.risk_color,
            risk_multiplier: leg.risk_multiplier,
            risk_factors: leg.risk_factors.clone(),
            adjusted_duration_seconds: leg.adjusted_duration_seconds.round() as i64,
            adjusted_eta_hours: round2(leg.adjusted_eta_hours),
            delay_hours: round2(leg.delay_hours),
        }
    }
}

impl From<&RouteSummary> for RouteSummaryReport {
    fn from(summary: &RouteSummary) -> Self {
        Self {
            total_distance_miles: round2(summary.total_distance_miles),
            total_base_eta_hours: round2(summary.total_base_eta_hours),
            total_adjusted_eta_hours: round2(summary.total_adjusted_eta_hours),
            total_delay_hours: round2(summary.total_delay_hours),
            high_risk_legs: summary.high_risk_legs,
            medium_risk_legs: summary.medium_risk_legs,
            low_risk_legs: summary.low_risk_legs,
            overall_risk: summary.overall_risk,
        }
    }
}

impl MergedRoute {
    /// Presentation payload with display rounding applied
    #[must_use]
    pub fn report(&self) -> RouteReport {
        RouteReport {
            route_summary: RouteSummaryReport::from(&self.summary),
            legs: self.legs.iter().map(LegReport::from).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn weather(precipitation: i32, wind: f64, code: i32) -> WeatherObservation {
        WeatherObservation {
            location: "Somewhere".to_string(),
            condition: "Test".to_string(),
            precipitation_probability: precipitation,
            wind_speed_kmh: wind,
            temperature_celsius: 0.0,
            weather_code: code,
        }
    }

    fn leg(distance_km: f64, duration_seconds: f64) -> RoutingLeg {
        RoutingLeg::new("A", "B", distance_km, duration_seconds)
    }

    fn assert_close(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < 1e-9,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn test_single_rainy_leg_end_to_end() {
        let route = merge(&[leg(5571.0, 77400.0)], &[weather(75, 42.0, 61)]);

        let result = &route.legs[0];
        assert_eq!(result.leg_number, 1);
        assert_eq!(result.risk_level, RiskLevel::High);
        assert_eq!(result.risk_multiplier, 1.30);
        assert_close(result.distance_miles, 5571.0 * 0.621_371);
        assert_close(result.base_eta_hours, 21.5);
        assert_close(result.adjusted_eta_hours, 27.95);
        assert_close(result.delay_hours, 6.45);
        assert_eq!(
            result.risk_factors,
            vec!["High precipitation (75%)", "High winds (42 km/h)"]
        );

        // a single HIGH leg is not enough for an overall HIGH
        assert_eq!(route.summary.high_risk_legs, 1);
        assert_eq!(route.summary.overall_risk, RiskLevel::Medium);
    }

    #[test]
    fn test_leg_timing_identities_hold_before_rounding() {
        let route = merge(
            &[leg(1234.5, 12345.0), leg(10.0, 777.0)],
            &[weather(10, 41.0, 0), weather(0, 0.0, 86)],
        );
        for result in &route.legs {
            assert_eq!(
                result.adjusted_duration_seconds / 3600.0,
                result.adjusted_eta_hours
            );
            assert_eq!(
                result.delay_hours,
                result.adjusted_eta_hours - result.base_eta_hours
            );
        }
    }

    #[rstest]
    #[case(vec![weather(0, 0.0, 73), weather(80, 0.0, 3)], RiskLevel::High)]
    #[case(vec![weather(0, 45.0, 0), weather(0, 45.0, 0), weather(0, 45.0, 0)], RiskLevel::Medium)]
    #[case(vec![weather(0, 45.0, 0), weather(0, 45.0, 0), weather(0, 0.0, 0)], RiskLevel::Low)]
    #[case(vec![weather(0, 0.0, 0), weather(0, 0.0, 85), weather(0, 0.0, 0)], RiskLevel::Medium)]
    #[case(vec![], RiskLevel::Low)]
    fn test_overall_risk_policy(
        #[case] observations: Vec<WeatherObservation>,
        #[case] expected: RiskLevel,
    ) {
        let legs: Vec<RoutingLeg> = observations.iter().map(|_| leg(100.0, 3600.0)).collect();
        let route = merge(&legs, &observations);
        assert_eq!(route.summary.overall_risk, expected);
        assert_eq!(
            route.summary.high_risk_legs + route.summary.medium_risk_legs + route.summary.low_risk_legs,
            observations.len()
        );
    }

    #[test]
    fn test_mismatched_lengths_process_overlapping_prefix() {
        let legs = vec![leg(100.0, 3600.0), leg(200.0, 7200.0), leg(300.0, 10800.0)];
        let observations = vec![weather(0, 0.0, 0), weather(0, 0.0, 0)];

        let route = merge(&legs, &observations);
        assert_eq!(route.legs.len(), 2);
        assert_eq!(route.legs[1].leg_number, 2);
        assert_close(route.summary.total_base_eta_hours, 3.0);
    }

    #[test]
    fn test_try_merge_rejects_mismatched_lengths() {
        let err = try_merge(&[leg(100.0, 3600.0)], &[]).unwrap_err();
        assert!(matches!(
            err,
            RouteError::LengthMismatch {
                legs: 1,
                observations: 0
            }
        ));
        assert!(try_merge(&[leg(100.0, 3600.0)], &[weather(0, 0.0, 0)]).is_ok());
    }

    #[test]
    fn test_totals_use_unrounded_values() {
        // 0.004h base and 0.0052h adjusted per leg; summing rounded legs would give 0.0 and 0.03
        let legs: Vec<RoutingLeg> = (0..3).map(|_| leg(0.0, 14.4)).collect();
        let observations: Vec<WeatherObservation> =
            (0..3).map(|_| weather(90, 0.0, 0)).collect();

        let route = merge(&legs, &observations);
        assert_close(route.summary.total_base_eta_hours, 0.012);
        assert_close(route.summary.total_adjusted_eta_hours, 0.0156);

        let report = route.report();
        assert_eq!(report.route_summary.total_base_eta_hours, 0.01);
        assert_eq!(report.route_summary.total_adjusted_eta_hours, 0.02);
        assert_eq!(report.route_summary.total_delay_hours, 0.0);
        assert_eq!(report.legs[0].base_eta_hours, 0.0);
    }

    #[test]
    fn test_report_rounds_for_presentation() {
        let route = merge(&[leg(5571.0, 77400.0)], &[weather(75, 42.0, 61)]);
        let report = route.report();

        let leg = &report.legs[0];
        assert_eq!(leg.from, "A");
        assert_eq!(leg.to, "B");
        assert_eq!(leg.weather.location, "B");
        assert_eq!(leg.distance_miles, 3461.66);
        assert_eq!(leg.base_eta_hours, 21.5);
        assert_eq!(leg.adjusted_eta_hours, 27.95);
        assert_eq!(leg.delay_hours, 6.45);
        assert_eq!(leg.adjusted_duration_seconds, 100_620);

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["route_summary"]["overall_risk"], "MEDIUM");
        assert_eq!(json["legs"][0]["risk_color"], "red");
        assert_eq!(json["legs"][0]["risk_level"], "HIGH");
    }

    #[test]
    fn test_round_helpers() {
        assert_eq!(round2(21.499_999), 21.5);
        assert_eq!(round2(3461.657_841), 3461.66);
        assert_eq!(round1(27.96), 28.0);
        assert_eq!(round1(21.44), 21.4);
    }
}
