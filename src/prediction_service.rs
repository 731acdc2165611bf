//! PM2.5 Prediction Service
//!
//! Drives one interaction: resolve location, fetch weather, predict. Each
//! step runs only if the previous one succeeded; the first failure ends the
//! chain with no partial output.

use std::sync::Arc;

use anyhow::Context;
use chrono::Utc;
use tracing::{info, instrument, warn};

use crate::config::AqiConfig;
use crate::geocoding::GeoapifyClient;
use crate::http::build_client;
use crate::ip_location::IpInfoClient;
use crate::location_resolver::{LocationInput, LocationResolver};
use crate::models::{Aod, FeatureVector, PredictionReport};
use crate::predictor::Predictor;
use crate::weather::{OpenWeatherClient, WeatherProvider};
use crate::{AqiError, Result};

/// One user interaction
#[derive(Debug, Clone, PartialEq)]
pub struct PredictionRequest {
    pub input: LocationInput,
    /// Measured AOD; the configured placeholder is used when absent
    pub aod: Option<f64>,
}

impl PredictionRequest {
    pub fn manual(city: impl Into<String>) -> Self {
        Self {
            input: LocationInput::City(city.into()),
            aod: None,
        }
    }

    #[must_use]
    pub fn auto() -> Self {
        Self {
            input: LocationInput::Auto,
            aod: None,
        }
    }

    #[must_use]
    pub fn with_aod(mut self, aod: Option<f64>) -> Self {
        self.aod = aod;
        self
    }
}

#[derive(Clone)]
pub struct PredictionService {
    resolver: LocationResolver,
    weather: Arc<dyn WeatherProvider>,
    predictor: Predictor,
    aod_placeholder: f64,
}

impl PredictionService {
    pub fn new(
        resolver: LocationResolver,
        weather: Arc<dyn WeatherProvider>,
        predictor: Predictor,
        aod_placeholder: f64,
    ) -> Self {
        Self {
            resolver,
            weather,
            predictor,
            aod_placeholder,
        }
    }

    /// Wire the production clients and load the model named in `config`
    pub fn from_config(config: &AqiConfig) -> anyhow::Result<Self> {
        let http = build_client(&config.http)?;

        let resolver = LocationResolver::new(
            Arc::new(GeoapifyClient::new(http.clone(), &config.geocoding)),
            Arc::new(IpInfoClient::new(http.clone(), &config.ip_location)),
        );
        let weather = Arc::new(OpenWeatherClient::new(http, &config.weather));
        let predictor = Predictor::load(&config.model.path).with_context(|| {
            format!(
                "Failed to load PM2.5 model from {}",
                config.model.path.display()
            )
        })?;

        Ok(Self::new(
            resolver,
            weather,
            predictor,
            config.model.aod_placeholder,
        ))
    }

    #[must_use]
    pub fn model_kind(&self) -> &'static str {
        self.predictor.model_kind()
    }

    /// Run the resolve → weather → predict chain for one request
    #[instrument(skip(self), fields(mode = %request.input.mode()))]
    pub async fn run(&self, request: &PredictionRequest) -> Result<PredictionReport> {
        let mode = request.input.mode();
        let aod = self.aod_for(request)?;

        let location = self
            .resolver
            .resolve_location(&request.input)
            .await
            .inspect_err(|e| warn!("Location step failed: {}", e))?;

        let weather = self
            .weather
            .fetch(location.latitude, location.longitude)
            .await
            .inspect_err(|e| warn!("Weather step failed: {}", e))?;

        let pm25 = self
            .predictor
            .predict_features(&FeatureVector::new(aod, &weather))
            .inspect_err(|e| warn!("Prediction step failed: {}", e))?;

        info!("Predicted PM2.5 for {}: {:.2} µg/m³", location.city, pm25);

        Ok(PredictionReport {
            mode,
            location,
            weather,
            aod,
            pm25,
            generated_at: Utc::now(),
        })
    }

    fn aod_for(&self, request: &PredictionRequest) -> Result<Aod> {
        match request.aod {
            Some(value) if !value.is_finite() => {
                Err(AqiError::validation("AOD must be a finite number."))
            }
            Some(value) => Ok(Aod::Measured(value)),
            None => Ok(Aod::Placeholder(self.aod_placeholder)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geocoding::Geocoder;
    use crate::ip_location::IpLocator;
    use crate::models::{Location, PredictionMode, WeatherReading};
    use crate::predictor::Pm25Model;
    use async_trait::async_trait;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FakeGeocoder(Option<Location>);

    #[async_trait]
    impl Geocoder for FakeGeocoder {
        async fn resolve_by_name(&self, city: &str) -> Result<Location> {
            self.0
                .clone()
                .ok_or_else(|| AqiError::geocoding(format!("City not found: {city}")))
        }
    }

    struct FakeIpLocator(Option<Location>);

    #[async_trait]
    impl IpLocator for FakeIpLocator {
        async fn resolve_by_ip(&self) -> Result<Location> {
            self.0
                .clone()
                .ok_or_else(|| AqiError::ip_location("service reported failure"))
        }
    }

    #[derive(Default)]
    struct FakeWeather {
        reading: Option<WeatherReading>,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl WeatherProvider for FakeWeather {
        async fn fetch(&self, _lat: f64, _lon: f64) -> Result<WeatherReading> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.reading
                .ok_or_else(|| AqiError::weather("Weather API returned status 500"))
        }
    }

    /// Records the rows it is asked about and returns their sum
    #[derive(Default)]
    struct RecordingModel {
        rows: Mutex<Vec<[f64; 4]>>,
    }

    impl Pm25Model for RecordingModel {
        fn kind(&self) -> &'static str {
            "recording"
        }

        fn predict_row(&self, row: &[f64; 4]) -> Result<f64> {
            self.rows.lock().unwrap().push(*row);
            Ok(row.iter().sum())
        }
    }

    fn delhi() -> Location {
        Location::new(28.7, 77.1, "Delhi").unwrap()
    }

    fn delhi_weather() -> WeatherReading {
        WeatherReading {
            temperature: 30.0,
            humidity: 40.0,
            wind_speed: 3.2,
        }
    }

    struct Harness {
        service: PredictionService,
        weather: Arc<FakeWeather>,
        model: Arc<RecordingModel>,
    }

    fn harness(
        geocoded: Option<Location>,
        ip_located: Option<Location>,
        reading: Option<WeatherReading>,
    ) -> Harness {
        let weather = Arc::new(FakeWeather {
            reading,
            ..Default::default()
        });
        let model = Arc::new(RecordingModel::default());
        let resolver = LocationResolver::new(
            Arc::new(FakeGeocoder(geocoded)),
            Arc::new(FakeIpLocator(ip_located)),
        );
        let service = PredictionService::new(
            resolver,
            weather.clone(),
            Predictor::new(model.clone()),
            0.6,
        );
        Harness {
            service,
            weather,
            model,
        }
    }

    #[tokio::test]
    async fn test_manual_mode_success() {
        let h = harness(Some(delhi()), None, Some(delhi_weather()));

        let report = h
            .service
            .run(&PredictionRequest::manual("Delhi"))
            .await
            .unwrap();

        assert_eq!(report.mode, PredictionMode::Manual);
        assert_eq!(report.location.city, "Delhi");
        assert_eq!(report.weather, delhi_weather());
        assert_eq!(report.aod, Aod::Placeholder(0.6));
        assert_eq!(*h.model.rows.lock().unwrap(), vec![[0.6, 30.0, 40.0, 3.2]]);
        assert!((report.pm25 - 73.8).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_city_not_found_stops_chain() {
        let h = harness(None, None, Some(delhi_weather()));

        let err = h
            .service
            .run(&PredictionRequest::manual("Nowhereville"))
            .await
            .unwrap_err();

        assert_eq!(err.user_message(PredictionMode::Manual), "City not found.");
        assert_eq!(h.weather.calls.load(Ordering::SeqCst), 0);
        assert!(h.model.rows.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_ip_location_unavailable() {
        let h = harness(Some(delhi()), None, Some(delhi_weather()));

        let err = h.service.run(&PredictionRequest::auto()).await.unwrap_err();

        assert_eq!(
            err.user_message(PredictionMode::Auto),
            "IP location not available."
        );
        assert_eq!(h.weather.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_auto_mode_weather_failure_skips_prediction() {
        let h = harness(None, Some(delhi()), None);

        let err = h.service.run(&PredictionRequest::auto()).await.unwrap_err();

        assert_eq!(err.user_message(PredictionMode::Auto), "Weather data failed.");
        assert_eq!(h.weather.calls.load(Ordering::SeqCst), 1);
        assert!(h.model.rows.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_manual_mode_weather_failure_message() {
        let h = harness(Some(delhi()), None, None);

        let err = h
            .service
            .run(&PredictionRequest::manual("Delhi"))
            .await
            .unwrap_err();

        assert_eq!(
            err.user_message(PredictionMode::Manual),
            "Couldn't fetch weather."
        );
    }

    #[tokio::test]
    async fn test_measured_aod_used_when_supplied() {
        let h = harness(None, Some(delhi()), Some(delhi_weather()));

        let report = h
            .service
            .run(&PredictionRequest::auto().with_aod(Some(0.25)))
            .await
            .unwrap();

        assert_eq!(report.aod, Aod::Measured(0.25));
        assert_eq!(h.model.rows.lock().unwrap()[0][0], 0.25);
    }

    #[tokio::test]
    async fn test_non_finite_aod_rejected_before_lookup() {
        let h = harness(Some(delhi()), None, Some(delhi_weather()));

        let err = h
            .service
            .run(&PredictionRequest::manual("Delhi").with_aod(Some(f64::NAN)))
            .await
            .unwrap_err();

        assert!(matches!(err, AqiError::Validation { .. }));
        assert_eq!(h.weather.calls.load(Ordering::SeqCst), 0);
    }
}
