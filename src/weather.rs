//! Weather API client for OpenWeatherMap current conditions
//!
//! Fetches temperature, humidity and wind speed for a coordinate pair in the
//! configured unit system. No unit conversion or caching happens here.

use std::time::Instant;

use async_trait::async_trait;
use reqwest_middleware::ClientWithMiddleware;
use tracing::{debug, info, instrument, warn};

use crate::config::WeatherConfig;
use crate::http::{describe_body_error, describe_send_error, trim_base_url};
use crate::models::WeatherReading;
use crate::{AqiError, Result};

/// Source of current weather observations
#[async_trait]
pub trait WeatherProvider: Send + Sync {
    async fn fetch(&self, lat: f64, lon: f64) -> Result<WeatherReading>;
}

pub struct OpenWeatherClient {
    client: ClientWithMiddleware,
    api_key: String,
    base_url: String,
    units: String,
}

impl OpenWeatherClient {
    pub fn new(client: ClientWithMiddleware, config: &WeatherConfig) -> Self {
        Self {
            client,
            api_key: config.api_key.clone().unwrap_or_default(),
            base_url: trim_base_url(&config.base_url),
            units: config.units.clone(),
        }
    }
}

#[async_trait]
impl WeatherProvider for OpenWeatherClient {
    #[instrument(skip(self))]
    async fn fetch(&self, lat: f64, lon: f64) -> Result<WeatherReading> {
        info!("Getting current weather for coordinates: {:.4}, {:.4}", lat, lon);
        let start_time = Instant::now();

        let url = format!(
            "{}/data/2.5/weather?lat={}&lon={}&appid={}&units={}",
            self.base_url,
            lat,
            lon,
            urlencoding::encode(&self.api_key),
            urlencoding::encode(&self.units)
        );

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| {
                AqiError::weather(format!(
                    "Request failed: {}",
                    describe_send_error(e, &self.api_key)
                ))
            })?;

        let status = response.status();
        if !status.is_success() {
            warn!("Weather API returned status {}", status);
            return Err(AqiError::weather(format!("Weather API returned status {status}")));
        }

        let body: openweather::CurrentWeatherResponse = response.json().await.map_err(|e| {
            AqiError::weather(format!(
                "Failed to parse weather response: {}",
                describe_body_error(e)
            ))
        })?;

        let reading = WeatherReading::from(body);
        debug!("Weather reading: {:?}", reading);
        info!(
            "Retrieved current weather in {:.3}s",
            start_time.elapsed().as_secs_f64()
        );

        Ok(reading)
    }
}

/// OpenWeatherMap response structures
mod openweather {
    use super::WeatherReading;
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    pub struct CurrentWeatherResponse {
        pub main: MainData,
        pub wind: WindData,
    }

    #[derive(Debug, Deserialize)]
    pub struct MainData {
        pub temp: f64,
        pub humidity: f64,
    }

    #[derive(Debug, Deserialize)]
    pub struct WindData {
        pub speed: f64,
    }

    impl From<CurrentWeatherResponse> for WeatherReading {
        fn from(response: CurrentWeatherResponse) -> Self {
            Self {
                temperature: response.main.temp,
                humidity: response.main.humidity,
                wind_speed: response.wind.speed,
            }
        }
    }
}
