//! Route planning service
//!
//! Resolves selected cities, gathers routing and weather facts through the
//! injected sources and hands them to the merge engine. Upstream failures
//! degrade to catalog estimates or unknown-weather observations instead of
//! failing the plan.

use std::sync::Arc;

use anyhow::Result as AnyResult;
use futures::future::join_all;
use tracing::{debug, info, instrument, warn};

use crate::cities;
use crate::config::{DataSourceMode, RouteWhispererConfig};
use crate::http;
use crate::merge::{self, MergedRoute};
use crate::models::{City, RoutingLeg, WeatherObservation};
use crate::routing::{CatalogRoutingSource, GraphHopperRoutingSource, RoutingSource};
use crate::weather::{MockWeatherSource, OpenMeteoWeatherSource, WeatherSource};
use crate::{Result, RouteError};

/// A planned route: the resolved stops and the merged legs
#[derive(Debug, Clone)]
pub struct PlannedRoute {
    pub cities: Vec<City>,
    pub route: MergedRoute,
}

/// Builds risk-adjusted routes from city selections
pub struct RoutePlanner {
    routing: Arc<dyn RoutingSource>,
    weather: Arc<dyn WeatherSource>,
    fallback: CatalogRoutingSource,
}

impl RoutePlanner {
    pub fn new(routing: Arc<dyn RoutingSource>, weather: Arc<dyn WeatherSource>) -> Self {
        Self {
            routing,
            weather,
            fallback: CatalogRoutingSource::new(800.0),
        }
    }

    /// Catalog estimate speed used when the routing source fails
    #[must_use]
    pub fn with_fallback_speed(mut self, speed_kmh: f64) -> Self {
        self.fallback = CatalogRoutingSource::new(speed_kmh);
        self
    }

    /// Select sources according to the configured data source mode
    pub fn from_config(config: &RouteWhispererConfig) -> AnyResult<Self> {
        let speed = config.routing.sleigh_speed_kmh;
        let catalog = Arc::new(CatalogRoutingSource::new(speed));

        let planner = match config.data_source.mode {
            DataSourceMode::Mock => {
                info!("Using mock routing and weather data");
                Self::new(
                    catalog,
                    Arc::new(MockWeatherSource::new(config.weather.mock_jitter)),
                )
            }
            DataSourceMode::Live => {
                let client =
                    http::build_client(config.weather.timeout_seconds, config.weather.max_retries)?;

                let routing: Arc<dyn RoutingSource> = match config.routing_api_key() {
                    Some(key) => {
                        info!("Using GraphHopper routing");
                        Arc::new(GraphHopperRoutingSource::new(
                            client.clone(),
                            config.routing.graphhopper_url.clone(),
                            key,
                            config.routing.profile.clone(),
                        ))
                    }
                    None => {
                        warn!("No GraphHopper API key configured, estimating legs from the catalog");
                        catalog
                    }
                };

                info!("Using OpenMeteo weather");
                Self::new(
                    routing,
                    Arc::new(OpenMeteoWeatherSource::new(
                        client,
                        config.weather.base_url.clone(),
                        config.weather.forecast_date,
                    )),
                )
            }
        };

        Ok(planner.with_fallback_speed(speed))
    }

    /// Replace the weather source, keeping routing as is
    #[must_use]
    pub fn with_weather(mut self, weather: Arc<dyn WeatherSource>) -> Self {
        self.weather = weather;
        self
    }

    async fn leg(&self, origin: &City, destination: &City) -> RoutingLeg {
        match self.routing.route(origin, destination).await {
            Ok(leg) => leg,
            Err(e) => {
                warn!(
                    "Routing {} -> {} failed, using catalog estimate: {:#}",
                    origin.id, destination.id, e
                );
                self.fallback.estimate(origin, destination)
            }
        }
    }

    async fn observe(&self, city: &City) -> WeatherObservation {
        match self.weather.observe(city).await {
            Ok(observation) => observation,
            Err(e) => {
                warn!("Weather lookup for {} failed: {:#}", city.name, e);
                WeatherObservation::unknown(city.name.clone())
            }
        }
    }

    /// Plan a route through the given city ids, in order
    #[instrument(skip(self))]
    pub async fn plan<S: AsRef<str> + std::fmt::Debug>(&self, city_ids: &[S]) -> Result<PlannedRoute> {
        if city_ids.len() < 2 {
            return Err(RouteError::validation("Please select at least 2 cities"));
        }

        let cities = cities::resolve(city_ids);
        if cities.len() < 2 {
            return Err(RouteError::validation("Invalid city selection"));
        }
        debug!(
            "Planning route through {} cities: {}",
            cities.len(),
            cities
                .iter()
                .map(|c| c.short_name.as_str())
                .collect::<Vec<_>>()
                .join(" → ")
        );

        let pairs: Vec<(&City, &City)> = cities.windows(2).map(|w| (&w[0], &w[1])).collect();

        let legs = join_all(pairs.iter().map(|(from, to)| self.leg(from, to))).await;
        let observations = join_all(pairs.iter().map(|(_, to)| self.observe(to))).await;

        let route = merge::try_merge(&legs, &observations)?;
        info!(
            "Planned {} legs, overall risk {}, delay {:.2}h",
            route.legs.len(),
            route.summary.overall_risk,
            route.summary.total_delay_hours
        );

        Ok(PlannedRoute { cities, route })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::risk::RiskLevel;
    use anyhow::anyhow;
    use async_trait::async_trait;

    struct FailingRouting;

    #[async_trait]
    impl RoutingSource for FailingRouting {
        async fn route(&self, _origin: &City, _destination: &City) -> AnyResult<RoutingLeg> {
            Err(anyhow!("routing service down"))
        }
    }

    struct FailingWeather;

    #[async_trait]
    impl WeatherSource for FailingWeather {
        async fn observe(&self, _city: &City) -> AnyResult<WeatherObservation> {
            Err(anyhow!("weather service down"))
        }
    }

    fn mock_planner() -> RoutePlanner {
        RoutePlanner::new(
            Arc::new(CatalogRoutingSource::new(800.0)),
            Arc::new(MockWeatherSource::fixed()),
        )
    }

    #[tokio::test]
    async fn test_plan_three_stops() {
        let planned = mock_planner()
            .plan(&["nyc", "london", "tokyo"])
            .await
            .unwrap();

        assert_eq!(planned.cities.len(), 3);
        let legs = &planned.route.legs;
        assert_eq!(legs.len(), 2);
        assert_eq!(legs[0].origin, "New York, NY, USA");
        assert_eq!(legs[0].destination, "London, UK");
        assert_eq!(legs[0].risk_level, RiskLevel::High);
        assert_eq!(legs[1].destination, "Tokyo, Japan");
        assert_eq!(legs[1].risk_level, RiskLevel::Low);
        assert_eq!(planned.route.summary.overall_risk, RiskLevel::Medium);
    }

    #[tokio::test]
    async fn test_two_snowy_destinations_are_high_overall() {
        let planned = mock_planner()
            .plan(&["paris", "moscow", "beijing"])
            .await
            .unwrap();
        assert_eq!(planned.route.summary.high_risk_legs, 2);
        assert_eq!(planned.route.summary.overall_risk, RiskLevel::High);
    }

    #[tokio::test]
    async fn test_plan_requires_two_cities() {
        let err = mock_planner().plan(&["nyc"]).await.unwrap_err();
        assert_eq!(err.user_message(), "Please select at least 2 cities");

        let err = mock_planner().plan(&["nyc", "atlantis"]).await.unwrap_err();
        assert_eq!(err.user_message(), "Invalid city selection");
    }

    #[tokio::test]
    async fn test_unknown_ids_are_skipped() {
        let planned = mock_planner()
            .plan(&["nyc", "atlantis", "london"])
            .await
            .unwrap();
        assert_eq!(planned.route.legs.len(), 1);
    }

    #[tokio::test]
    async fn test_failing_sources_degrade_gracefully() {
        let planner = RoutePlanner::new(Arc::new(FailingRouting), Arc::new(FailingWeather));
        let planned = planner.plan(&["nyc", "london"]).await.unwrap();

        let leg = &planned.route.legs[0];
        assert_eq!(leg.distance_km, 5571.0);
        assert_eq!(leg.base_duration_seconds, 25070.0);
        assert_eq!(leg.weather.condition, "Unknown");
        assert_eq!(leg.weather.location, "London, UK");
        assert_eq!(leg.risk_level, RiskLevel::Low);
    }

    #[tokio::test]
    async fn test_from_config_defaults_to_mock() {
        let mut config = RouteWhispererConfig::default();
        config.weather.mock_jitter = false;
        let planner = RoutePlanner::from_config(&config).unwrap();
        let planned = planner.plan(&["tokyo", "dubai"]).await.unwrap();
        assert_eq!(planned.route.legs[0].weather.condition, "Clear Sky");
    }
}
