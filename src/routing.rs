use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use reqwest_middleware::ClientWithMiddleware;
use serde::Deserialize;
use tracing::instrument;

use crate::{RouteError, cities, merge::round2, models::City, models::RoutingLeg};

/// Supplies distance and travel time between two stops
#[async_trait]
pub trait RoutingSource: Send + Sync {
    async fn route(&self, origin: &City, destination: &City) -> Result<RoutingLeg>;
}

/// Estimates legs from the city catalog and a constant cruise speed
#[derive(Debug, Clone)]
pub struct CatalogRoutingSource {
    speed_kmh: f64,
}

impl CatalogRoutingSource {
    pub fn new(speed_kmh: f64) -> Self {
        Self { speed_kmh }
    }

    /// Stops outside the catalog are estimated at [`cities::FALLBACK_DISTANCE_KM`]
    pub fn estimate(&self, origin: &City, destination: &City) -> RoutingLeg {
        let distance_km = cities::distance_km_by_name(&origin.name, &destination.name);
        let duration_seconds = (distance_km * 3600.0 / self.speed_kmh).round();

        RoutingLeg::new(
            origin.name.clone(),
            destination.name.clone(),
            round2(distance_km),
            duration_seconds,
        )
    }
}

#[async_trait]
impl RoutingSource for CatalogRoutingSource {
    async fn route(&self, origin: &City, destination: &City) -> Result<RoutingLeg> {
        Ok(self.estimate(origin, destination))
    }
}

/// Live routing through the GraphHopper route API
pub struct GraphHopperRoutingSource {
    client: ClientWithMiddleware,
    base_url: String,
    api_key: String,
    profile: String,
}

impl GraphHopperRoutingSource {
    pub fn new(
        client: ClientWithMiddleware,
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        profile: impl Into<String>,
    ) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            api_key: api_key.into(),
            profile: profile.into(),
        }
    }
}

#[async_trait]
impl RoutingSource for GraphHopperRoutingSource {
    #[instrument(skip(self), fields(origin = %origin.id, destination = %destination.id))]
    async fn route(&self, origin: &City, destination: &City) -> Result<RoutingLeg> {
        tracing::debug!("Calling the API");
        let url = format!(
            "{}/route?point={},{}&point={},{}&profile={}&points_encoded=false&calc_points=false&key={}",
            self.base_url.trim_end_matches('/'),
            origin.latitude,
            origin.longitude,
            destination.latitude,
            destination.longitude,
            self.profile,
            self.api_key,
        );
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| RouteError::api(format!("GraphHopper request failed: {e}")))?
            .error_for_status()
            .map_err(|e| RouteError::api(format!("GraphHopper returned an error status: {e}")))?;
        let response: ApiResponse = response
            .json()
            .await
            .context("Failed to parse GraphHopper response")?;

        response
            .paths
            .first()
            .map(|path| {
                RoutingLeg::new(
                    origin.name.clone(),
                    destination.name.clone(),
                    round2(path.distance / 1000.0),
                    (path.time as f64 / 1000.0).round(),
                )
            })
            .ok_or(anyhow!("No paths in response"))
    }
}

#[derive(Debug, Deserialize)]
struct PathResponse {
    /// metres
    distance: f64,
    /// milliseconds
    time: u64,
}

#[derive(Debug, Deserialize)]
struct ApiResponse {
    paths: Vec<PathResponse>,
}
