//! `aqi-predictor` - Real-time PM2.5 prediction
//!
//! Resolves a location (typed city or IP-based), fetches the current weather
//! there, and feeds weather features plus an aerosol-optical-depth value into
//! a pre-trained regression model.

pub mod api;
pub mod config;
pub mod error;
pub mod geocoding;
pub mod http;
pub mod ip_location;
pub mod location_resolver;
pub mod logging;
pub mod models;
pub mod prediction_service;
pub mod predictor;
pub mod weather;
pub mod web;

// Re-export core types for public API
pub use config::AqiConfig;
pub use error::AqiError;
pub use location_resolver::{LocationInput, LocationResolver};
pub use models::{Aod, FeatureVector, Location, PredictionMode, PredictionReport, WeatherReading};
pub use prediction_service::{PredictionRequest, PredictionService};
pub use predictor::{Pm25Model, Predictor, RegressionModel};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Core result type used throughout the library
pub type Result<T> = std::result::Result<T, AqiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_set() {
        assert!(!VERSION.is_empty());
    }
}
