//! Location model for resolved coordinates

use serde::{Deserialize, Serialize};

use crate::AqiError;

/// A resolved location
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Location {
    /// Latitude in decimal degrees
    pub latitude: f64,
    /// Longitude in decimal degrees
    pub longitude: f64,
    /// City label shown to the user
    pub city: String,
}

impl Location {
    /// Create a location, rejecting coordinates outside the valid ranges.
    pub fn new(latitude: f64, longitude: f64, city: impl Into<String>) -> crate::Result<Self> {
        if !(-90.0..=90.0).contains(&latitude) {
            return Err(AqiError::validation(format!(
                "Latitude {latitude} is outside [-90, 90]"
            )));
        }
        if !(-180.0..=180.0).contains(&longitude) {
            return Err(AqiError::validation(format!(
                "Longitude {longitude} is outside [-180, 180]"
            )));
        }
        Ok(Self {
            latitude,
            longitude,
            city: city.into(),
        })
    }

    /// Format location as coordinates string
    #[must_use]
    pub fn format_coordinates(&self) -> String {
        format!("{:.4}, {:.4}", self.latitude, self.longitude)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_location_new() {
        let location = Location::new(28.7, 77.1, "Delhi").unwrap();
        assert_eq!(location.latitude, 28.7);
        assert_eq!(location.longitude, 77.1);
        assert_eq!(location.city, "Delhi");
        assert_eq!(location.format_coordinates(), "28.7000, 77.1000");
    }

    #[rstest]
    #[case(90.0, 180.0)]
    #[case(-90.0, -180.0)]
    #[case(0.0, 0.0)]
    fn test_location_bounds_inclusive(#[case] lat: f64, #[case] lon: f64) {
        assert!(Location::new(lat, lon, "Edge").is_ok());
    }

    #[rstest]
    #[case(90.1, 0.0)]
    #[case(-91.0, 0.0)]
    #[case(0.0, 180.5)]
    #[case(0.0, -200.0)]
    #[case(f64::NAN, 0.0)]
    fn test_location_out_of_range(#[case] lat: f64, #[case] lon: f64) {
        let err = Location::new(lat, lon, "Nowhere").unwrap_err();
        assert!(matches!(err, AqiError::Validation { .. }));
    }
}
