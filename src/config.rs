//! Configuration management for the route planner
//!
//! Handles loading configuration from files, environment variables,
//! and provides validation for all configuration settings.

use crate::RouteError;
use anyhow::{Context, Result};
use chrono::NaiveDate;
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RouteWhispererConfig {
    /// Where routing and weather facts come from
    #[serde(default)]
    pub data_source: DataSourceConfig,
    /// Weather API configuration
    #[serde(default)]
    pub weather: WeatherConfig,
    /// Routing API and estimation configuration
    #[serde(default)]
    pub routing: RoutingConfig,
    /// HTTP server configuration
    #[serde(default)]
    pub server: ServerConfig,
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Data acquisition strategy
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataSourceMode {
    /// Catalog distances and canned weather presets
    #[default]
    Mock,
    /// GraphHopper routing and OpenMeteo forecasts
    Live,
}

/// Data source selection
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DataSourceConfig {
    #[serde(default)]
    pub mode: DataSourceMode,
}

/// Weather API configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeatherConfig {
    /// Base URL for the OpenMeteo forecast API
    #[serde(default = "default_weather_base_url")]
    pub base_url: String,
    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u32,
    /// Maximum number of retries for failed requests
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    /// Randomize mock presets slightly on every lookup
    #[serde(default = "default_mock_jitter")]
    pub mock_jitter: bool,
    /// Forecast day to read from live responses (first day when unset)
    #[serde(default)]
    pub forecast_date: Option<NaiveDate>,
}

/// Routing configuration settings
#[derive(Clone, Serialize, Deserialize)]
pub struct RoutingConfig {
    /// Cruise speed used to estimate leg durations from distance
    #[serde(default = "default_sleigh_speed")]
    pub sleigh_speed_kmh: f64,
    /// Base URL for the GraphHopper routing API
    #[serde(default = "default_graphhopper_url")]
    pub graphhopper_url: String,
    /// GraphHopper API key (falls back to GRAPHHOPPER_API_KEY)
    #[serde(default)]
    pub api_key: Option<String>,
    /// GraphHopper vehicle profile
    #[serde(default = "default_routing_profile")]
    pub profile: String,
}

/// HTTP server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Per-request timeout in seconds
    #[serde(default = "default_timeout")]
    pub request_timeout_seconds: u32,
    /// Maximum accepted request body in kilobytes
    #[serde(default = "default_body_limit")]
    pub body_limit_kb: u32,
    /// PEM certificate for HTTPS (requires the `tls` feature)
    #[serde(default)]
    pub tls_cert_path: Option<PathBuf>,
    /// PEM private key for HTTPS (requires the `tls` feature)
    #[serde(default)]
    pub tls_key_path: Option<PathBuf>,
}

/// Logging configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug, trace)
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Log format (pretty or json)
    #[serde(default = "default_log_format")]
    pub format: String,
}

// Default value functions
fn default_weather_base_url() -> String {
    "https://api.open-meteo.com/v1".to_string()
}

fn default_timeout() -> u32 {
    30
}

fn default_max_retries() -> u32 {
    3
}

fn default_mock_jitter() -> bool {
    true
}

fn default_sleigh_speed() -> f64 {
    800.0
}

fn default_graphhopper_url() -> String {
    "https://graphhopper.com/api/1".to_string()
}

fn default_routing_profile() -> String {
    "car".to_string()
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    5001
}

fn default_body_limit() -> u32 {
    64
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            base_url: default_weather_base_url(),
            timeout_seconds: default_timeout(),
            max_retries: default_max_retries(),
            mock_jitter: default_mock_jitter(),
            forecast_date: None,
        }
    }
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            sleigh_speed_kmh: default_sleigh_speed(),
            graphhopper_url: default_graphhopper_url(),
            api_key: None,
            profile: default_routing_profile(),
        }
    }
}

// Keeps the API key out of debug logs
impl fmt::Debug for RoutingConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RoutingConfig")
            .field("sleigh_speed_kmh", &self.sleigh_speed_kmh)
            .field("graphhopper_url", &self.graphhopper_url)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("profile", &self.profile)
            .finish()
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            request_timeout_seconds: default_timeout(),
            body_limit_kb: default_body_limit(),
            tls_cert_path: None,
            tls_key_path: None,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl RouteWhispererConfig {
    /// Load configuration from file and environment variables
    pub fn load() -> Result<Self> {
        Self::load_from_path(None)
    }

    /// Load configuration from specified path
    pub fn load_from_path(config_path: Option<PathBuf>) -> Result<Self> {
        let mut builder = Config::builder();

        // Load from file if path is provided or use default location
        let config_file = config_path.unwrap_or_else(|| {
            Self::get_config_path().unwrap_or_else(|| PathBuf::from("config.toml"))
        });

        if config_file.exists() {
            builder = builder.add_source(
                File::from(config_file.clone())
                    .required(false)
                    .format(config::FileFormat::Toml),
            );
        }

        // ROUTEWHISPERER__SERVER__PORT=8080 style overrides
        builder = builder.add_source(
            Environment::with_prefix("ROUTEWHISPERER")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        );

        let settings = builder
            .build()
            .with_context(|| "Failed to build configuration")?;

        let mut config: RouteWhispererConfig = settings
            .try_deserialize()
            .with_context(|| "Failed to deserialize configuration")?;

        config.apply_defaults();
        config.validate()?;

        Ok(config)
    }

    /// Get the default configuration file path
    #[must_use]
    pub fn get_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("routewhisperer").join("config.toml"))
    }

    /// Apply default values to empty or zeroed configuration fields
    pub fn apply_defaults(&mut self) {
        if self.weather.base_url.is_empty() {
            self.weather.base_url = default_weather_base_url();
        }
        if self.weather.timeout_seconds == 0 {
            self.weather.timeout_seconds = default_timeout();
        }
        if self.routing.sleigh_speed_kmh <= 0.0 {
            self.routing.sleigh_speed_kmh = default_sleigh_speed();
        }
        if self.routing.graphhopper_url.is_empty() {
            self.routing.graphhopper_url = default_graphhopper_url();
        }
        if self.routing.profile.is_empty() {
            self.routing.profile = default_routing_profile();
        }
        if self.server.host.is_empty() {
            self.server.host = default_host();
        }
        if self.server.request_timeout_seconds == 0 {
            self.server.request_timeout_seconds = default_timeout();
        }
        if self.server.body_limit_kb == 0 {
            self.server.body_limit_kb = default_body_limit();
        }
        if self.logging.level.is_empty() {
            self.logging.level = default_log_level();
        }
        if self.logging.format.is_empty() {
            self.logging.format = default_log_format();
        }
    }

    /// Validate all configuration settings
    pub fn validate(&self) -> Result<()> {
        self.validate_numeric_ranges()?;
        self.validate_string_values()?;
        self.validate_tls()?;
        Ok(())
    }

    /// The GraphHopper key from config, or from GRAPHHOPPER_API_KEY
    #[must_use]
    pub fn routing_api_key(&self) -> Option<String> {
        self.routing
            .api_key
            .clone()
            .filter(|key| !key.is_empty())
            .or_else(|| std::env::var("GRAPHHOPPER_API_KEY").ok())
            .filter(|key| !key.is_empty())
    }

    /// Validate numeric configuration ranges
    fn validate_numeric_ranges(&self) -> Result<()> {
        if self.weather.timeout_seconds > 300 {
            return Err(
                RouteError::config("Weather API timeout cannot exceed 300 seconds").into(),
            );
        }

        if self.weather.max_retries > 10 {
            return Err(RouteError::config("Weather API max retries cannot exceed 10").into());
        }

        if !(self.routing.sleigh_speed_kmh.is_finite() && self.routing.sleigh_speed_kmh <= 5000.0)
        {
            return Err(RouteError::config("Sleigh speed cannot exceed 5000 km/h").into());
        }

        if self.server.request_timeout_seconds > 300 {
            return Err(RouteError::config("Request timeout cannot exceed 300 seconds").into());
        }

        if self.server.body_limit_kb > 10_240 {
            return Err(RouteError::config("Body limit cannot exceed 10240 KB").into());
        }

        Ok(())
    }

    /// Validate string configuration values
    fn validate_string_values(&self) -> Result<()> {
        let valid_log_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_log_levels.contains(&self.logging.level.as_str()) {
            return Err(RouteError::config(format!(
                "Invalid log level '{}'. Must be one of: {}",
                self.logging.level,
                valid_log_levels.join(", ")
            ))
            .into());
        }

        let valid_log_formats = ["pretty", "json"];
        if !valid_log_formats.contains(&self.logging.format.as_str()) {
            return Err(RouteError::config(format!(
                "Invalid log format '{}'. Must be one of: {}",
                self.logging.format,
                valid_log_formats.join(", ")
            ))
            .into());
        }

        for (name, url) in [
            ("Weather API", &self.weather.base_url),
            ("Routing API", &self.routing.graphhopper_url),
        ] {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(RouteError::config(format!(
                    "{name} base URL must be a valid HTTP or HTTPS URL"
                ))
                .into());
            }
        }

        Ok(())
    }

    /// Certificate and key must be configured together
    fn validate_tls(&self) -> Result<()> {
        if self.server.tls_cert_path.is_some() != self.server.tls_key_path.is_some() {
            return Err(RouteError::config(
                "TLS requires both tls_cert_path and tls_key_path",
            )
            .into());
        }
        Ok(())
    }
}
