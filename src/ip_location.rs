//! IP-based geolocation of the caller via an ipinfo-compatible API

use async_trait::async_trait;
use reqwest_middleware::ClientWithMiddleware;
use serde::Deserialize;
use tracing::{debug, info, instrument, warn};

use crate::config::IpLocationConfig;
use crate::http::{describe_body_error, describe_send_error, trim_base_url};
use crate::models::Location;
use crate::{AqiError, Result};

/// City label used when the service does not name one
pub const DEFAULT_CITY_LABEL: &str = "Your Area";

/// Locates the caller from its network-visible address
#[async_trait]
pub trait IpLocator: Send + Sync {
    async fn resolve_by_ip(&self) -> Result<Location>;
}

pub struct IpInfoClient {
    client: ClientWithMiddleware,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct IpInfoResponse {
    city: Option<String>,
    /// "lat,lon"
    loc: Option<String>,
    #[serde(default)]
    bogon: bool,
    error: Option<serde_json::Value>,
}

impl IpInfoResponse {
    fn is_ok(&self) -> bool {
        self.error.is_none() && !self.bogon
    }
}

/// Parse the `"lat,lon"` pair reported by the service
fn parse_lat_lng(loc: &str) -> Option<(f64, f64)> {
    let mut parts = loc.split(',').map(str::trim);
    let lat = parts.next()?.parse().ok()?;
    let lon = parts.next()?.parse().ok()?;
    if parts.next().is_some() {
        return None;
    }
    Some((lat, lon))
}

impl IpInfoClient {
    pub fn new(client: ClientWithMiddleware, config: &IpLocationConfig) -> Self {
        Self {
            client,
            base_url: trim_base_url(&config.base_url),
        }
    }
}

#[async_trait]
impl IpLocator for IpInfoClient {
    #[instrument(skip(self))]
    async fn resolve_by_ip(&self) -> Result<Location> {
        info!("Locating caller via IP");

        let url = format!("{}/json", self.base_url);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| {
                AqiError::ip_location(format!("Request failed: {}", describe_send_error(e, "")))
            })?;

        let status = response.status();
        if !status.is_success() {
            warn!("IP location service returned status {}", status);
            return Err(AqiError::ip_location(format!(
                "IP location service returned status {status}"
            )));
        }

        let body: IpInfoResponse = response.json().await.map_err(|e| {
            AqiError::ip_location(format!(
                "Failed to parse IP location response: {}",
                describe_body_error(e)
            ))
        })?;

        if !body.is_ok() {
            warn!("IP location service reported failure: {:?}", body.error);
            return Err(AqiError::ip_location("IP location service reported failure"));
        }

        let (lat, lon) = body
            .loc
            .as_deref()
            .and_then(parse_lat_lng)
            .ok_or_else(|| AqiError::ip_location("No coordinates in IP location response"))?;

        debug!("IP location coordinates: {}, {}", lat, lon);

        let city = body
            .city
            .filter(|c| !c.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_CITY_LABEL.to_string());

        Location::new(lat, lon, city).map_err(|e| AqiError::ip_location(e.to_string()))
    }
}
