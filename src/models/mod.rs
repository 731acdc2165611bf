//! Data models for the PM2.5 predictor
//!
//! This module contains the request-scoped domain models:
//! - Location: resolved coordinates and city label
//! - Weather: current observations used as model input
//! - Prediction: feature vector, AOD input and the final report

pub mod location;
pub mod prediction;
pub mod weather;

pub use location::Location;
pub use prediction::{
    Aod, DEFAULT_AOD_PLACEHOLDER, FEATURE_NAMES, FeatureVector, PredictionMode, PredictionReport,
};
pub use weather::WeatherReading;
