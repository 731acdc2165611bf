//! Error types and handling for the PM2.5 predictor

use thiserror::Error;

use crate::models::PredictionMode;

/// Main error type for the prediction chain.
///
/// Every external-call wrapper (geocoding, IP location, weather, model)
/// reports failures through its own variant, so the orchestrator can map a
/// failure to the stage that produced it.
#[derive(Error, Debug)]
pub enum AqiError {
    /// City name could not be turned into coordinates
    #[error("Geocoding error: {message}")]
    Geocoding { message: String },

    /// The caller's IP address could not be located
    #[error("IP location error: {message}")]
    IpLocation { message: String },

    /// Current weather could not be fetched
    #[error("Weather error: {message}")]
    Weather { message: String },

    /// Model loading or inference failed
    #[error("Model error: {message}")]
    Model { message: String },

    /// Input validation errors
    #[error("Invalid input: {message}")]
    Validation { message: String },

    /// Configuration-related errors
    #[error("Configuration error: {message}")]
    Config { message: String },
}

impl AqiError {
    pub fn geocoding<S: Into<String>>(message: S) -> Self {
        Self::Geocoding {
            message: message.into(),
        }
    }

    pub fn ip_location<S: Into<String>>(message: S) -> Self {
        Self::IpLocation {
            message: message.into(),
        }
    }

    pub fn weather<S: Into<String>>(message: S) -> Self {
        Self::Weather {
            message: message.into(),
        }
    }

    pub fn model<S: Into<String>>(message: S) -> Self {
        Self::Model {
            message: message.into(),
        }
    }

    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Get the message shown to the user for a failed interaction.
    ///
    /// The wording depends on the mode the chain was started in; the
    /// diagnostic detail stays in the logs.
    #[must_use]
    pub fn user_message(&self, mode: PredictionMode) -> String {
        match (self, mode) {
            (AqiError::Geocoding { .. }, _) => "City not found.".to_string(),
            (AqiError::IpLocation { .. }, _) => "IP location not available.".to_string(),
            (AqiError::Weather { .. }, PredictionMode::Manual) => {
                "Couldn't fetch weather.".to_string()
            }
            (AqiError::Weather { .. }, PredictionMode::Auto) => "Weather data failed.".to_string(),
            (AqiError::Model { .. }, _) => "Prediction failed.".to_string(),
            (AqiError::Validation { message }, _) => message.clone(),
            (AqiError::Config { .. }, _) => {
                "Configuration error. Please check your config file and API keys.".to_string()
            }
        }
    }
}
