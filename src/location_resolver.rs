//! Location Resolution Module
//!
//! Turns the user's location choice (a typed city or "wherever I am") into a
//! structured Location for the weather lookup.

use std::sync::Arc;

use tracing::debug;

use crate::geocoding::Geocoder;
use crate::ip_location::IpLocator;
use crate::models::{Location, PredictionMode};
use crate::{AqiError, Result};

/// Message shown when manual mode is submitted without a city
pub const EMPTY_CITY_MESSAGE: &str = "Please enter a city name.";

/// Location input as chosen by the user
#[derive(Debug, Clone, PartialEq)]
pub enum LocationInput {
    /// Free-text city name
    City(String),
    /// Locate the caller by IP address
    Auto,
}

impl LocationInput {
    #[must_use]
    pub fn mode(&self) -> PredictionMode {
        match self {
            LocationInput::City(_) => PredictionMode::Manual,
            LocationInput::Auto => PredictionMode::Auto,
        }
    }
}

/// Service for resolving location inputs
#[derive(Clone)]
pub struct LocationResolver {
    geocoder: Arc<dyn Geocoder>,
    ip_locator: Arc<dyn IpLocator>,
}

impl LocationResolver {
    pub fn new(geocoder: Arc<dyn Geocoder>, ip_locator: Arc<dyn IpLocator>) -> Self {
        Self {
            geocoder,
            ip_locator,
        }
    }

    /// Resolve a location input into a structured Location
    pub async fn resolve_location(&self, location_input: &LocationInput) -> Result<Location> {
        debug!("Resolving location input: {:?}", location_input);

        let location = match location_input {
            LocationInput::City(name) => self.resolve_name(name).await?,
            LocationInput::Auto => self.ip_locator.resolve_by_ip().await?,
        };

        debug!(
            "Resolved location: {} at ({}, {})",
            location.city, location.latitude, location.longitude
        );

        Ok(location)
    }

    async fn resolve_name(&self, name: &str) -> Result<Location> {
        let name = name.trim();
        if name.is_empty() {
            return Err(AqiError::validation(EMPTY_CITY_MESSAGE));
        }
        self.geocoder.resolve_by_name(name).await
    }
}
