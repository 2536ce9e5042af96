//! Configuration management for the `whereabouts` service
//!
//! Handles loading configuration from files, environment variables,
//! and provides validation for all configuration settings.

use crate::WhereaboutsError;
use crate::resolver::Tier;
use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure for the `whereabouts` service
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WhereaboutsConfig {
    /// Reverse geocoding configuration
    pub geocoding: GeocodingConfig,
    /// Result cache configuration
    pub cache: CacheConfig,
    /// Resolver tier configuration
    pub resolver: ResolverConfig,
    /// Logging configuration
    pub logging: LoggingConfig,
    /// HTTP server configuration
    pub server: ServerConfig,
}

/// Reverse geocoding configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeocodingConfig {
    /// Base URL of the backend exposing `POST /api/geocoding/reverse`
    pub base_url: String,
    /// Request timeout in seconds
    pub timeout_seconds: u32,
    /// Optional detail level forwarded to the backend
    pub detail_level: Option<String>,
    /// API key for the direct provider fallback; the fallback is skipped
    /// entirely when no key is configured
    pub provider_api_key: Option<String>,
    /// Language requested from the direct provider
    pub language: String,
    /// Number of uncached coordinates resolved concurrently per batch chunk
    pub batch_size: usize,
}

/// Result cache configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Cache TTL in hours
    pub ttl_hours: u32,
}

/// Resolver tier configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolverConfig {
    /// Tier order; each entry is a source tag understood by [`Tier::from_name`]
    pub tiers: Vec<String>,
    /// Device position request timeout in seconds
    pub device_timeout_seconds: u32,
    /// Maximum age of a cached device position in seconds
    pub position_max_age_seconds: u32,
}

/// Logging configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug, trace)
    pub level: String,
    /// Log format (pretty or json)
    pub format: String,
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Listen port
    pub port: u16,
}

impl Default for GeocodingConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
            timeout_seconds: 10,
            detail_level: None,
            provider_api_key: None,
            language: "fr".to_string(),
            batch_size: 50,
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        // 7 days
        Self { ttl_hours: 168 }
    }
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            tiers: Tier::default_order()
                .iter()
                .map(|t| t.as_str().to_string())
                .collect(),
            device_timeout_seconds: 10,
            position_max_age_seconds: 60,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { port: 8080 }
    }
}

impl Default for WhereaboutsConfig {
    fn default() -> Self {
        Self {
            geocoding: GeocodingConfig::default(),
            cache: CacheConfig::default(),
            resolver: ResolverConfig::default(),
            logging: LoggingConfig::default(),
            server: ServerConfig::default(),
        }
    }
}

impl WhereaboutsConfig {
    /// Load configuration from file and environment variables
    pub fn load() -> Result<Self> {
        Self::load_from_path(None)
    }

    /// Load configuration from specified path
    pub fn load_from_path(config_path: Option<PathBuf>) -> Result<Self> {
        let mut builder = Config::builder();

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

        // Environment variable overrides with WHEREABOUTS_ prefix
        builder = builder.add_source(
            Environment::with_prefix("WHEREABOUTS")
                .separator("__")
                .try_parsing(true),
        );

        let settings = builder
            .build()
            .with_context(|| "Failed to build configuration")?;

        let config: WhereaboutsConfig = settings
            .try_deserialize()
            .with_context(|| "Failed to deserialize configuration")?;

        config.validate()?;

        Ok(config)
    }

    /// Get the default configuration file path
    #[must_use]
    pub fn get_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("whereabouts").join("config.toml"))
    }

    /// Validate all configuration settings
    pub fn validate(&self) -> Result<()> {
        self.validate_numeric_ranges()?;
        self.validate_string_values()?;
        Ok(())
    }

    /// Validate numeric configuration ranges
    fn validate_numeric_ranges(&self) -> Result<()> {
        if self.geocoding.timeout_seconds == 0 || self.geocoding.timeout_seconds > 300 {
            return Err(WhereaboutsError::config(
                "Geocoding timeout must be between 1 and 300 seconds",
            )
            .into());
        }

        if self.geocoding.batch_size == 0 || self.geocoding.batch_size > 500 {
            return Err(
                WhereaboutsError::config("Batch size must be between 1 and 500").into(),
            );
        }

        if self.cache.ttl_hours == 0 || self.cache.ttl_hours > 720 {
            return Err(WhereaboutsError::config(
                "Cache TTL must be between 1 and 720 hours (30 days)",
            )
            .into());
        }

        if self.resolver.device_timeout_seconds == 0 || self.resolver.device_timeout_seconds > 60 {
            return Err(WhereaboutsError::config(
                "Device position timeout must be between 1 and 60 seconds",
            )
            .into());
        }

        Ok(())
    }

    /// Validate string configuration values
    fn validate_string_values(&self) -> Result<()> {
        let valid_log_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_log_levels.contains(&self.logging.level.as_str()) {
            return Err(WhereaboutsError::config(format!(
                "Invalid log level '{}'. Must be one of: {}",
                self.logging.level,
                valid_log_levels.join(", ")
            ))
            .into());
        }

        let valid_log_formats = ["pretty", "json"];
        if !valid_log_formats.contains(&self.logging.format.as_str()) {
            return Err(WhereaboutsError::config(format!(
                "Invalid log format '{}'. Must be one of: {}",
                self.logging.format,
                valid_log_formats.join(", ")
            ))
            .into());
        }

        if !self.geocoding.base_url.starts_with("http://")
            && !self.geocoding.base_url.starts_with("https://")
        {
            return Err(WhereaboutsError::config(
                "Geocoding base URL must be a valid HTTP or HTTPS URL",
            )
            .into());
        }

        if let Some(api_key) = &self.geocoding.provider_api_key {
            if api_key.trim().is_empty() {
                return Err(WhereaboutsError::config(
                    "Provider API key cannot be empty if provided. Either remove it or provide a valid key.",
                )
                .into());
            }
        }

        if self.resolver.tiers.is_empty() {
            return Err(
                WhereaboutsError::config("Resolver tier order cannot be empty").into(),
            );
        }

        for name in &self.resolver.tiers {
            if Tier::from_name(name).is_none() {
                return Err(WhereaboutsError::config(format!(
                    "Unknown resolver tier '{name}'. Must be one of: service, creator, user, adresse, titre"
                ))
                .into());
            }
        }

        Ok(())
    }
}

impl ResolverConfig {
    /// Resolve the configured tier names into [`Tier`] values
    pub fn parse_tiers(&self) -> Result<Vec<Tier>> {
        self.tiers
            .iter()
            .map(|name| {
                Tier::from_name(name).ok_or_else(|| {
                    WhereaboutsError::config(format!("Unknown resolver tier '{name}'")).into()
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = WhereaboutsConfig::default();
        assert_eq!(config.geocoding.base_url, "http://localhost:8000");
        assert_eq!(config.geocoding.timeout_seconds, 10);
        assert_eq!(config.geocoding.batch_size, 50);
        assert_eq!(config.cache.ttl_hours, 168);
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.server.port, 8080);
        assert!(config.geocoding.provider_api_key.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_default_tier_order() {
        let config = ResolverConfig::default();
        let tiers = config.parse_tiers().unwrap();
        assert_eq!(
            tiers,
            vec![
                Tier::ServiceFixedGps,
                Tier::CreatorGps,
                Tier::DevicePosition,
                Tier::ServiceAddress,
                Tier::ServiceTitle,
            ]
        );
    }

    #[test]
    fn test_config_validation_invalid_log_level() {
        let mut config = WhereaboutsConfig::default();
        config.logging.level = "invalid".to_string();
        let result = config.validate();
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("Invalid log level"));
    }

    #[test]
    fn test_config_validation_numeric_ranges() {
        let mut config = WhereaboutsConfig::default();
        config.geocoding.timeout_seconds = 500;
        let result = config.validate();
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("timeout"));

        let mut config = WhereaboutsConfig::default();
        config.cache.ttl_hours = 10_000;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation_unknown_tier() {
        let mut config = WhereaboutsConfig::default();
        config.resolver.tiers = vec!["service".to_string(), "satellite".to_string()];
        let result = config.validate();
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("satellite"));
    }

    #[test]
    fn test_config_validation_empty_api_key() {
        let mut config = WhereaboutsConfig::default();
        config.geocoding.provider_api_key = Some("  ".to_string());
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_path_generation() {
        let path = WhereaboutsConfig::get_config_path();
        assert!(path.is_some());
        let path = path.unwrap();
        assert!(path.to_string_lossy().contains("whereabouts"));
        assert!(path.to_string_lossy().contains("config.toml"));
    }
}
