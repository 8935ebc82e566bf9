use std::sync::Arc;

use axum::{
    Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use tracing::{error, warn};

use crate::{
    RouteError, cities,
    merge::{RouteSummaryReport, round1},
    models::City,
    planner::{PlannedRoute, RoutePlanner},
    weather::weather_icon,
};

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiCity {
    pub id: String,
    pub name: String,
    pub short_name: String,
    pub lat: f64,
    pub lng: f64,
}

impl From<&City> for ApiCity {
    fn from(city: &City) -> Self {
        Self {
            id: city.id.clone(),
            name: city.name.clone(),
            short_name: city.short_name.clone(),
            lat: city.latitude,
            lng: city.longitude,
        }
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct OptimizeRequest {
    #[serde(default)]
    pub cities: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiStop {
    pub name: String,
    pub full_name: String,
    pub lat: f64,
    pub lng: f64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ApiPoint {
    pub name: String,
    pub lat: f64,
    pub lng: f64,
}

impl From<&City> for ApiPoint {
    fn from(city: &City) -> Self {
        Self {
            name: city.short_name.clone(),
            lat: city.latitude,
            lng: city.longitude,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ApiWeather {
    pub icon: String,
    pub condition: String,
    pub temp: f64,
    pub wind: f64,
    pub precip: i32,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiLeg {
    pub from: ApiPoint,
    pub to: ApiPoint,
    /// Miles, whole number
    pub distance: i64,
    #[serde(rename = "baseETA")]
    pub base_eta: f64,
    #[serde(rename = "adjustedETA")]
    pub adjusted_eta: f64,
    pub risk: String,
    pub risk_color: String,
    pub weather: ApiWeather,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct OptimizeResponse {
    pub summary: RouteSummaryReport,
    pub cities: Vec<ApiStop>,
    pub legs: Vec<ApiLeg>,
}

impl From<&PlannedRoute> for OptimizeResponse {
    fn from(planned: &PlannedRoute) -> Self {
        let stops = &planned.cities;
        let legs = planned
            .route
            .legs
            .iter()
            .zip(stops.windows(2))
            .map(|(leg, pair)| {
                let weather = &leg.weather;
                ApiLeg {
                    from: ApiPoint::from(&pair[0]),
                    to: ApiPoint::from(&pair[1]),
                    distance: leg.distance_miles.round() as i64,
                    base_eta: round1(leg.base_eta_hours),
                    adjusted_eta: round1(leg.adjusted_eta_hours),
                    risk: leg.risk_level.as_str().to_string(),
                    risk_color: leg.risk_color.hex().to_string(),
                    weather: ApiWeather {
                        icon: weather_icon(&weather.condition, weather.weather_code).to_string(),
                        condition: weather.condition.clone(),
                        temp: weather.temperature_celsius,
                        wind: weather.wind_speed_kmh,
                        precip: weather.precipitation_probability,
                    },
                }
            })
            .collect();

        Self {
            summary: planned.route.report().route_summary,
            cities: stops
                .iter()
                .map(|c| ApiStop {
                    name: c.short_name.clone(),
                    full_name: c.name.clone(),
                    lat: c.latitude,
                    lng: c.longitude,
                })
                .collect(),
            legs,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ApiError {
    pub error: String,
}

impl IntoResponse for RouteError {
    fn into_response(self) -> Response {
        let status = if self.is_client_error() {
            warn!("Rejected request: {}", self);
            StatusCode::BAD_REQUEST
        } else {
            error!("Request failed: {}", self);
            StatusCode::INTERNAL_SERVER_ERROR
        };
        (
            status,
            Json(ApiError {
                error: self.user_message(),
            }),
        )
            .into_response()
    }
}

pub fn router(planner: Arc<RoutePlanner>) -> Router {
    Router::new()
        .route("/cities", get(get_cities))
        .route("/optimize", post(optimize_route))
        .with_state(planner)
}

async fn get_cities() -> Json<Vec<ApiCity>> {
    Json(cities::all().iter().map(ApiCity::from).collect())
}

async fn optimize_route(
    State(planner): State<Arc<RoutePlanner>>,
    Json(request): Json<OptimizeRequest>,
) -> Result<Json<OptimizeResponse>, RouteError> {
    let planned = planner.plan(&request.cities).await?;
    Ok(Json(OptimizeResponse::from(&planned)))
}
