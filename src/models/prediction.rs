//! Prediction inputs and the rendered result of one interaction

use std::fmt::Display;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Location, WeatherReading};

/// Column labels the model was trained with, in training order.
pub const FEATURE_NAMES: [&str; 4] = ["AOD", "Temperature", "Humidity", "WindSpeed"];

/// Value used for AOD when no measurement is available.
pub const DEFAULT_AOD_PLACEHOLDER: f64 = 0.6;

/// How the location for a prediction is obtained
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PredictionMode {
    /// City typed by the user
    Manual,
    /// Caller's IP address
    Auto,
}

impl Display for PredictionMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PredictionMode::Manual => write!(f, "manual"),
            PredictionMode::Auto => write!(f, "auto"),
        }
    }
}

/// Aerosol optical depth input.
///
/// No service in the chain provides AOD, so unless the caller supplies a
/// measurement the value is a stub and is labeled as such everywhere it is
/// shown.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "source", content = "value", rename_all = "lowercase")]
pub enum Aod {
    Placeholder(f64),
    Measured(f64),
}

impl Aod {
    #[must_use]
    pub fn value(&self) -> f64 {
        match self {
            Aod::Placeholder(v) | Aod::Measured(v) => *v,
        }
    }

    #[must_use]
    pub fn is_placeholder(&self) -> bool {
        matches!(self, Aod::Placeholder(_))
    }
}

impl Default for Aod {
    fn default() -> Self {
        Aod::Placeholder(DEFAULT_AOD_PLACEHOLDER)
    }
}

/// Model input row, ordered as [`FEATURE_NAMES`]
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FeatureVector {
    pub aod: f64,
    pub temperature: f64,
    pub humidity: f64,
    pub wind_speed: f64,
}

impl FeatureVector {
    #[must_use]
    pub fn new(aod: Aod, weather: &WeatherReading) -> Self {
        Self {
            aod: aod.value(),
            temperature: weather.temperature,
            humidity: weather.humidity,
            wind_speed: weather.wind_speed,
        }
    }

    #[must_use]
    pub fn as_row(&self) -> [f64; 4] {
        [self.aod, self.temperature, self.humidity, self.wind_speed]
    }

    /// Pairs each value with its column label.
    pub fn labeled(&self) -> impl Iterator<Item = (&'static str, f64)> {
        FEATURE_NAMES.into_iter().zip(self.as_row())
    }
}

/// Successful outcome of one prediction chain
#[derive(Debug, Clone, Serialize)]
pub struct PredictionReport {
    pub mode: PredictionMode,
    pub location: Location,
    pub weather: WeatherReading,
    pub aod: Aod,
    /// Predicted PM2.5 concentration in µg/m³
    pub pm25: f64,
    pub generated_at: DateTime<Utc>,
}

impl PredictionReport {
    #[must_use]
    pub fn format_pm25(&self) -> String {
        format!("{:.2} µg/m³", self.pm25)
    }
}

impl Display for PredictionReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "📍 Location: {}", self.location.city)?;
        writeln!(f, "### 💨 Predicted PM2.5: `{}`", self.format_pm25())?;
        writeln!(f, "- 🌡️ Temp: `{}`", self.weather.format_temperature())?;
        writeln!(f, "- 💧 Humidity: `{}`", self.weather.format_humidity())?;
        writeln!(f, "- 🌬️ Wind Speed: `{}`", self.weather.format_wind())?;
        if self.aod.is_placeholder() {
            writeln!(f, "- 🛰️ AOD: `{}` (placeholder, not measured)", self.aod.value())?;
        } else {
            writeln!(f, "- 🛰️ AOD: `{}`", self.aod.value())?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn delhi_report(pm25: f64, aod: Aod) -> PredictionReport {
        PredictionReport {
            mode: PredictionMode::Manual,
            location: Location::new(28.7, 77.1, "Delhi").unwrap(),
            weather: WeatherReading {
                temperature: 30.0,
                humidity: 40.0,
                wind_speed: 3.2,
            },
            aod,
            pm25,
            generated_at: Utc::now(),
        }
    }

    #[test]
    fn test_feature_vector_order() {
        let weather = WeatherReading {
            temperature: 30.0,
            humidity: 40.0,
            wind_speed: 3.2,
        };
        let features = FeatureVector::new(Aod::default(), &weather);
        assert_eq!(features.as_row(), [0.6, 30.0, 40.0, 3.2]);

        let labels: Vec<_> = features.labeled().map(|(name, _)| name).collect();
        assert_eq!(labels, FEATURE_NAMES);
    }

    #[test]
    fn test_aod_default_is_labeled_placeholder() {
        let aod = Aod::default();
        assert!(aod.is_placeholder());
        assert_eq!(aod.value(), DEFAULT_AOD_PLACEHOLDER);
        assert!(!Aod::Measured(0.3).is_placeholder());
    }

    #[test]
    fn test_report_display() {
        let rendered = delhi_report(87.456, Aod::default()).to_string();
        assert!(rendered.contains("📍 Location: Delhi"));
        assert!(rendered.contains("`87.46 µg/m³`"));
        assert!(rendered.contains("`30 °C`"));
        assert!(rendered.contains("`40 %`"));
        assert!(rendered.contains("`3.2 m/s`"));
        assert!(rendered.contains("placeholder"));
    }

    #[test]
    fn test_report_display_measured_aod() {
        let rendered = delhi_report(12.0, Aod::Measured(0.25)).to_string();
        assert!(rendered.contains("`12.00 µg/m³`"));
        assert!(rendered.contains("`0.25`"));
        assert!(!rendered.contains("placeholder"));
    }

    #[test]
    fn test_report_serializes_aod_source() {
        let json = serde_json::to_value(delhi_report(1.0, Aod::default())).unwrap();
        assert_eq!(json["mode"], "manual");
        assert_eq!(json["aod"]["source"], "placeholder");
        assert_eq!(json["aod"]["value"], 0.6);
        assert_eq!(json["location"]["city"], "Delhi");
    }
}
