//! Error types and handling for the route planner

use thiserror::Error;

/// Main error type for the route planner
#[derive(Error, Debug)]
pub enum RouteError {
    /// Configuration-related errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Upstream routing or weather API errors
    #[error("API error: {message}")]
    Api { message: String },

    /// Input validation errors
    #[error("Invalid input: {message}")]
    Validation { message: String },

    /// Routing legs and weather observations do not pair up
    #[error("Length mismatch: {legs} routing legs but {observations} weather observations")]
    LengthMismatch { legs: usize, observations: usize },

    /// I/O operation errors
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },

    /// General application errors
    #[error("Application error: {message}")]
    General { message: String },
}

impl RouteError {
    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a new API error
    pub fn api<S: Into<String>>(message: S) -> Self {
        Self::Api {
            message: message.into(),
        }
    }

    /// Create a new validation error
    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Create a new general error
    pub fn general<S: Into<String>>(message: S) -> Self {
        Self::General {
            message: message.into(),
        }
    }

    /// Whether the caller supplied bad input (as opposed to a server-side failure)
    #[must_use]
    pub fn is_client_error(&self) -> bool {
        matches!(self, RouteError::Validation { .. })
    }

    /// Get a user-friendly error message
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            RouteError::Config { .. } => {
                "Configuration error. Please check your config file and API keys.".to_string()
            }
            RouteError::Api { .. } => {
                "Unable to reach routing or weather services. Please check your internet connection."
                    .to_string()
            }
            RouteError::Validation { message } => message.clone(),
            RouteError::LengthMismatch { .. } => self.to_string(),
            RouteError::Io { .. } => {
                "File operation failed. Please check file permissions.".to_string()
            }
            RouteError::General { message } => message.clone(),
        }
    }
}

impl From<anyhow::Error> for RouteError {
    fn from(err: anyhow::Error) -> Self {
        match err.downcast::<RouteError>() {
            Ok(route_err) => route_err,
            Err(err) => RouteError::general(format!("{err:#}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let config_err = RouteError::config("missing API key");
        assert!(matches!(config_err, RouteError::Config { .. }));

        let api_err = RouteError::api("connection failed");
        assert!(matches!(api_err, RouteError::Api { .. }));

        let validation_err = RouteError::validation("unknown city");
        assert!(matches!(validation_err, RouteError::Validation { .. }));
    }

    #[test]
    fn test_user_messages() {
        let config_err = RouteError::config("test");
        assert!(config_err.user_message().contains("Configuration error"));

        let api_err = RouteError::api("test");
        assert!(api_err.user_message().contains("Unable to reach"));

        let validation_err = RouteError::validation("Please select at least 2 cities");
        assert_eq!(
            validation_err.user_message(),
            "Please select at least 2 cities"
        );
    }

    #[test]
    fn test_only_validation_is_client_error() {
        let err = RouteError::LengthMismatch {
            legs: 3,
            observations: 2,
        };
        assert!(!err.is_client_error());
        assert!(RouteError::validation("bad").is_client_error());
        assert!(err.to_string().contains("3 routing legs"));
        assert!(!RouteError::api("down").is_client_error());
    }

    #[test]
    fn test_anyhow_roundtrip_keeps_variant() {
        let wrapped: anyhow::Error = RouteError::validation("bad").into();
        let back: RouteError = wrapped.into();
        assert!(matches!(back, RouteError::Validation { .. }));

        let plain: RouteError = anyhow::anyhow!("boom").into();
        assert!(matches!(plain, RouteError::General { .. }));
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let route_err: RouteError = io_err.into();
        assert!(matches!(route_err, RouteError::Io { .. }));
    }
}
