//! Data models for the route planner
//!
//! This module contains the input facts consumed by the risk engine:
//! - Location: selectable cities and their coordinates
//! - Route: routing facts for a single leg
//! - Weather: forecast facts for a destination

pub mod location;
pub mod route;
pub mod weather;

// Re-export all public types for convenient access
pub use location::City;
pub use route::RoutingLeg;
pub use weather::WeatherObservation;
