//! Error types and handling for the `whereabouts` library

use thiserror::Error;

/// Main error type for the `whereabouts` library
#[derive(Error, Debug)]
pub enum WhereaboutsError {
    /// Configuration-related errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Input validation errors
    #[error("Invalid input: {message}")]
    Validation { message: String },

    /// Network-level failures (connect errors, timeouts)
    #[error("Network error: {message}")]
    Network { message: String },

    /// Application-level errors reported by a geocoding backend
    #[error("API error: {message}")]
    Api { message: String },

    /// Authentication failures against a geocoding provider
    #[error("Authentication error: {message}")]
    Authentication { message: String },

    /// Rate limiting by a geocoding provider
    #[error("Rate limit error: {message}")]
    RateLimit { message: String },

    /// Malformed or unusable responses
    #[error("Parse error: {message}")]
    Parse { message: String },

    /// Device position unavailable, denied, or timed out
    #[error("Position error: {message}")]
    Position { message: String },

    /// Cache operation errors
    #[error("Cache error: {message}")]
    Cache { message: String },

    /// I/O operation errors
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },
}

impl WhereaboutsError {
    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a new validation error
    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Create a new network error
    pub fn network<S: Into<String>>(message: S) -> Self {
        Self::Network {
            message: message.into(),
        }
    }

    /// Create a new API error
    pub fn api<S: Into<String>>(message: S) -> Self {
        Self::Api {
            message: message.into(),
        }
    }

    /// Create a new authentication error
    pub fn authentication<S: Into<String>>(message: S) -> Self {
        Self::Authentication {
            message: message.into(),
        }
    }

    /// Create a new rate limit error
    pub fn rate_limit<S: Into<String>>(message: S) -> Self {
        Self::RateLimit {
            message: message.into(),
        }
    }

    /// Create a new parse error
    pub fn parse<S: Into<String>>(message: S) -> Self {
        Self::Parse {
            message: message.into(),
        }
    }

    /// Create a new position error
    pub fn position<S: Into<String>>(message: S) -> Self {
        Self::Position {
            message: message.into(),
        }
    }

    /// Create a new cache error
    pub fn cache<S: Into<String>>(message: S) -> Self {
        Self::Cache {
            message: message.into(),
        }
    }

    /// Get a user-friendly error message
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            WhereaboutsError::Config { .. } => {
                "Configuration error. Please check your config file.".to_string()
            }
            WhereaboutsError::Validation { message } => {
                format!("Invalid input: {message}")
            }
            WhereaboutsError::Network { .. } => {
                "Unable to reach the geocoding service. Please check your internet connection."
                    .to_string()
            }
            WhereaboutsError::Api { .. } | WhereaboutsError::Parse { .. } => {
                "The geocoding service returned an unusable response.".to_string()
            }
            WhereaboutsError::Authentication { .. } => {
                "Geocoding provider rejected the configured API key.".to_string()
            }
            WhereaboutsError::RateLimit { .. } => {
                "Geocoding provider rate limit reached. Please retry later.".to_string()
            }
            WhereaboutsError::Position { .. } => {
                "Device position is not available.".to_string()
            }
            WhereaboutsError::Cache { .. } => {
                "Cache operation failed.".to_string()
            }
            WhereaboutsError::Io { .. } => {
                "File operation failed. Please check file permissions.".to_string()
            }
        }
    }
}
