//! `RouteWhisperer` - weather-aware multi-stop delivery route planning
//!
//! This library scores weather risk for each leg of a route, adjusts the
//! leg ETAs accordingly and summarizes the route, with pluggable routing
//! and weather sources and an HTTP front end.

pub mod api;
pub mod cities;
pub mod config;
pub mod error;
pub mod http;
pub mod merge;
pub mod models;
pub mod planner;
pub mod risk;
pub mod routing;
pub mod telemetry;
pub mod weather;
pub mod web;

// Re-export core types for public API
pub use config::{DataSourceMode, RouteWhispererConfig};
pub use error::RouteError;
pub use merge::{MergedRoute, RouteReport, merge, try_merge};
pub use models::{City, RoutingLeg, WeatherObservation};
pub use planner::{PlannedRoute, RoutePlanner};
pub use risk::{RiskColor, RiskLevel, RiskVerdict, classify};
pub use routing::{CatalogRoutingSource, GraphHopperRoutingSource, RoutingSource};
pub use weather::{
    MockWeatherSource, OpenMeteoWeatherSource, TranscriptWeatherSource, WeatherSource,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Core result type used throughout the library
pub type Result<T> = std::result::Result<T, RouteError>;
