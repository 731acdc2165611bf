//! Weather reading model and display methods

use serde::{Deserialize, Serialize};

/// Current weather observation used as model input
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
pub struct WeatherReading {
    /// Temperature in Celsius
    pub temperature: f64,
    /// Relative humidity in percent
    pub humidity: f64,
    /// Wind speed in m/s
    pub wind_speed: f64,
}

impl WeatherReading {
    #[must_use]
    pub fn format_temperature(&self) -> String {
        format!("{} °C", self.temperature)
    }

    #[must_use]
    pub fn format_humidity(&self) -> String {
        format!("{} %", self.humidity)
    }

    #[must_use]
    pub fn format_wind(&self) -> String {
        format!("{} m/s", self.wind_speed)
    }
}
