//! PM2.5 inference over a pre-trained regression model
//!
//! The model is loaded once and shared read-only. Callers hand in the four
//! inputs; the predictor assembles them in training order and returns the
//! model's single scalar output. Inputs are not range-checked.

pub mod artifact;

use std::path::Path;
use std::sync::Arc;

use tracing::debug;

use crate::Result;
use crate::models::FeatureVector;

pub use artifact::RegressionModel;

/// A model taking one `[AOD, Temperature, Humidity, WindSpeed]` row
pub trait Pm25Model: Send + Sync {
    fn kind(&self) -> &'static str;
    fn predict_row(&self, row: &[f64; 4]) -> Result<f64>;
}

#[derive(Clone)]
pub struct Predictor {
    model: Arc<dyn Pm25Model>,
}

impl Predictor {
    pub fn new(model: Arc<dyn Pm25Model>) -> Self {
        Self { model }
    }

    /// Load the model artifact at `path`
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let model = RegressionModel::from_file(path)?;
        Ok(Self::new(Arc::new(model)))
    }

    #[must_use]
    pub fn model_kind(&self) -> &'static str {
        self.model.kind()
    }

    pub fn predict(
        &self,
        aod: f64,
        temperature: f64,
        humidity: f64,
        wind_speed: f64,
    ) -> Result<f64> {
        self.predict_features(&FeatureVector {
            aod,
            temperature,
            humidity,
            wind_speed,
        })
    }

    pub fn predict_features(&self, features: &FeatureVector) -> Result<f64> {
        debug!(
            "Predicting PM2.5 from {:?}",
            features.labeled().collect::<Vec<_>>()
        );
        let pm25 = self.model.predict_row(&features.as_row())?;
        debug!("Predicted PM2.5: {:.2}", pm25);
        Ok(pm25)
    }
}
