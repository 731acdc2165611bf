//! Configuration management for the PM2.5 predictor
//!
//! Handles loading configuration from files, environment variables,
//! and provides validation for all configuration settings.

use crate::AqiError;
use crate::models::DEFAULT_AOD_PLACEHOLDER;
use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Environment variable holding the geocoding API key
pub const GEOAPIFY_KEY_VAR: &str = "GEOAPIFY_API_KEY";
/// Environment variable holding the weather API key
pub const OPENWEATHER_KEY_VAR: &str = "OPENWEATHER_API_KEY";

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AqiConfig {
    /// Geocoding API configuration
    pub geocoding: GeocodingConfig,
    /// IP geolocation configuration
    pub ip_location: IpLocationConfig,
    /// Weather API configuration
    pub weather: WeatherConfig,
    /// Timeout and retry policy shared by all outbound calls
    pub http: HttpConfig,
    /// Model artifact configuration
    pub model: ModelConfig,
    /// Logging configuration
    pub logging: LoggingConfig,
    /// Web server configuration
    pub server: ServerConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeocodingConfig {
    pub api_key: Option<String>,
    pub base_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IpLocationConfig {
    pub base_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WeatherConfig {
    pub api_key: Option<String>,
    pub base_url: String,
    /// Unit system requested from the weather API
    pub units: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    /// Request timeout in seconds
    pub timeout_seconds: u32,
    /// Maximum number of retries for transient failures
    pub max_retries: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Path of the serialized model artifact
    pub path: PathBuf,
    /// AOD value used when no measurement is supplied
    pub aod_placeholder: f64,
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

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub port: u16,
}

// Default value functions
fn default_geocoding_base_url() -> String {
    "https://api.geoapify.com".to_string()
}

fn default_ip_location_base_url() -> String {
    "https://ipinfo.io".to_string()
}

fn default_weather_base_url() -> String {
    "https://api.openweathermap.org".to_string()
}

fn default_weather_units() -> String {
    "metric".to_string()
}

fn default_http_timeout() -> u32 {
    10
}

fn default_http_max_retries() -> u32 {
    2
}

fn default_model_path() -> PathBuf {
    PathBuf::from("models/pm25_model.json")
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

fn default_server_port() -> u16 {
    8501
}

impl Default for GeocodingConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_geocoding_base_url(),
        }
    }
}

impl Default for IpLocationConfig {
    fn default() -> Self {
        Self {
            base_url: default_ip_location_base_url(),
        }
    }
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_weather_base_url(),
            units: default_weather_units(),
        }
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: default_http_timeout(),
            max_retries: default_http_max_retries(),
        }
    }
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            path: default_model_path(),
            aod_placeholder: DEFAULT_AOD_PLACEHOLDER,
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

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: default_server_port(),
        }
    }
}

impl AqiConfig {
    /// Load configuration from the given file (or the default location)
    /// and environment variables
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

        // AQI_HTTP__TIMEOUT_SECONDS=5 overrides http.timeout_seconds
        builder = builder.add_source(
            Environment::with_prefix("AQI")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let settings = builder
            .build()
            .with_context(|| "Failed to build configuration")?;

        let mut config: AqiConfig = settings
            .try_deserialize()
            .with_context(|| "Failed to deserialize configuration")?;

        config.apply_api_key_env();
        config.apply_defaults();
        config.validate()?;

        Ok(config)
    }

    /// Get the default configuration file path
    #[must_use]
    pub fn get_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("aqi-predictor").join("config.toml"))
    }

    /// Pick up API keys from their conventional environment variables when
    /// the config file and `AQI_` overrides leave them unset.
    pub fn apply_api_key_env(&mut self) {
        if self.geocoding.api_key.is_none() {
            self.geocoding.api_key = std::env::var(GEOAPIFY_KEY_VAR).ok();
        }
        if self.weather.api_key.is_none() {
            self.weather.api_key = std::env::var(OPENWEATHER_KEY_VAR).ok();
        }
    }

    /// Apply default values to empty configuration fields
    pub fn apply_defaults(&mut self) {
        if self.geocoding.base_url.is_empty() {
            self.geocoding.base_url = default_geocoding_base_url();
        }
        if self.ip_location.base_url.is_empty() {
            self.ip_location.base_url = default_ip_location_base_url();
        }
        if self.weather.base_url.is_empty() {
            self.weather.base_url = default_weather_base_url();
        }
        if self.weather.units.is_empty() {
            self.weather.units = default_weather_units();
        }
        if self.http.timeout_seconds == 0 {
            self.http.timeout_seconds = default_http_timeout();
        }
        if self.model.path.as_os_str().is_empty() {
            self.model.path = default_model_path();
        }
        if self.logging.level.is_empty() {
            self.logging.level = default_log_level();
        }
        if self.logging.format.is_empty() {
            self.logging.format = default_log_format();
        }
        if self.server.port == 0 {
            self.server.port = default_server_port();
        }
    }

    /// Validate all configuration settings
    pub fn validate(&self) -> Result<()> {
        self.validate_numeric_ranges()?;
        self.validate_string_values()?;
        Ok(())
    }

    /// Names of API keys that are not configured.
    ///
    /// Missing keys are not fatal: the upstream service rejects the request
    /// and the interaction fails with the usual stage message.
    #[must_use]
    pub fn missing_api_keys(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.geocoding.api_key.as_deref().is_none_or(str::is_empty) {
            missing.push(GEOAPIFY_KEY_VAR);
        }
        if self.weather.api_key.as_deref().is_none_or(str::is_empty) {
            missing.push(OPENWEATHER_KEY_VAR);
        }
        missing
    }

    fn validate_numeric_ranges(&self) -> Result<()> {
        if self.http.timeout_seconds == 0 || self.http.timeout_seconds > 300 {
            return Err(
                AqiError::config("HTTP timeout must be between 1 and 300 seconds").into(),
            );
        }

        if self.http.max_retries > 10 {
            return Err(AqiError::config("HTTP max retries cannot exceed 10").into());
        }

        if !self.model.aod_placeholder.is_finite() {
            return Err(AqiError::config("AOD placeholder must be a finite number").into());
        }

        Ok(())
    }

    fn validate_string_values(&self) -> Result<()> {
        let valid_log_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_log_levels.contains(&self.logging.level.as_str()) {
            return Err(AqiError::config(format!(
                "Invalid log level '{}'. Must be one of: {}",
                self.logging.level,
                valid_log_levels.join(", ")
            ))
            .into());
        }

        let valid_log_formats = ["pretty", "json"];
        if !valid_log_formats.contains(&self.logging.format.as_str()) {
            return Err(AqiError::config(format!(
                "Invalid log format '{}'. Must be one of: {}",
                self.logging.format,
                valid_log_formats.join(", ")
            ))
            .into());
        }

        for (name, url) in [
            ("Geocoding", &self.geocoding.base_url),
            ("IP location", &self.ip_location.base_url),
            ("Weather", &self.weather.base_url),
        ] {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(AqiError::config(format!(
                    "{name} API base URL must be a valid HTTP or HTTPS URL"
                ))
                .into());
            }
        }

        Ok(())
    }
}
