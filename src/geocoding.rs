//! Forward geocoding: city name to coordinates via the Geoapify search API

use async_trait::async_trait;
use reqwest_middleware::ClientWithMiddleware;
use serde::Deserialize;
use tracing::{debug, info, instrument, warn};

use crate::config::GeocodingConfig;
use crate::http::{describe_body_error, describe_send_error, trim_base_url};
use crate::models::Location;
use crate::{AqiError, Result};

/// Turns a free-text city name into a location
#[async_trait]
pub trait Geocoder: Send + Sync {
    async fn resolve_by_name(&self, city: &str) -> Result<Location>;
}

/// Geoapify geocoding client
pub struct GeoapifyClient {
    client: ClientWithMiddleware,
    api_key: String,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    features: Vec<Feature>,
}

#[derive(Debug, Deserialize)]
struct Feature {
    properties: FeatureProperties,
}

#[derive(Debug, Deserialize)]
struct FeatureProperties {
    lat: f64,
    lon: f64,
    city: Option<String>,
}

impl GeoapifyClient {
    pub fn new(client: ClientWithMiddleware, config: &GeocodingConfig) -> Self {
        Self {
            client,
            api_key: config.api_key.clone().unwrap_or_default(),
            base_url: trim_base_url(&config.base_url),
        }
    }
}

#[async_trait]
impl Geocoder for GeoapifyClient {
    /// First candidate wins; no disambiguation between multiple matches.
    #[instrument(skip(self))]
    async fn resolve_by_name(&self, city: &str) -> Result<Location> {
        info!("Geocoding city: '{}'", city);

        let url = format!(
            "{}/v1/geocode/search?text={}&apiKey={}",
            self.base_url,
            urlencoding::encode(city),
            urlencoding::encode(&self.api_key)
        );

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| {
                AqiError::geocoding(format!(
                    "Request failed: {}",
                    describe_send_error(e, &self.api_key)
                ))
            })?;

        let status = response.status();
        if !status.is_success() {
            warn!("Geocoding API returned status {}", status);
            return Err(AqiError::geocoding(format!(
                "Geocoding API returned status {status}"
            )));
        }

        let body: SearchResponse = response.json().await.map_err(|e| {
            AqiError::geocoding(format!(
                "Failed to parse geocoding response: {}",
                describe_body_error(e)
            ))
        })?;

        debug!("Geocoding returned {} candidates", body.features.len());

        let Some(first) = body.features.into_iter().next() else {
            warn!("No results found for city '{}'", city);
            return Err(AqiError::geocoding(format!("City not found: {city}")));
        };

        let label = first
            .properties
            .city
            .filter(|c| !c.trim().is_empty())
            .unwrap_or_else(|| city.to_string());

        let location = Location::new(first.properties.lat, first.properties.lon, label)
            .map_err(|e| AqiError::geocoding(e.to_string()))?;

        info!(
            "Found location: {} ({})",
            location.city,
            location.format_coordinates()
        );
        Ok(location)
    }
}
