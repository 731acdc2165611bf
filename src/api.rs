//! JSON API behind the prediction page

use axum::{
    Router,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    response::Json,
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::AqiError;
use crate::models::{PredictionMode, PredictionReport};
use crate::prediction_service::{PredictionRequest, PredictionService};

#[derive(Debug, Deserialize)]
pub struct ApiPredictRequest {
    pub mode: PredictionMode,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub aod: Option<f64>,
}

impl From<ApiPredictRequest> for PredictionRequest {
    fn from(request: ApiPredictRequest) -> Self {
        let base = match request.mode {
            PredictionMode::Manual => PredictionRequest::manual(request.city.unwrap_or_default()),
            PredictionMode::Auto => PredictionRequest::auto(),
        };
        base.with_aod(request.aod)
    }
}

/// Error body; `mode` is absent when the request itself could not be read
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiError {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<PredictionMode>,
    pub error: String,
}

type ApiResult<T> = Result<Json<T>, (StatusCode, Json<ApiError>)>;

/// Shown when the body is not valid JSON or names an unknown mode
pub const INVALID_REQUEST_MESSAGE: &str =
    "Invalid request. Expected {\"mode\": \"manual\" | \"auto\", \"city\"?: string}.";

#[derive(Debug, Serialize, Deserialize)]
pub struct ApiHealth {
    pub status: String,
    pub model: String,
    pub version: String,
}

pub fn router() -> Router<PredictionService> {
    Router::new()
        .route("/predict", post(predict))
        .route("/health", get(health))
}

async fn predict(
    State(service): State<PredictionService>,
    payload: Result<Json<ApiPredictRequest>, JsonRejection>,
) -> ApiResult<PredictionReport> {
    let Json(payload) = payload.map_err(|rejection| {
        warn!("Rejected prediction request: {}", rejection.body_text());
        (
            StatusCode::BAD_REQUEST,
            Json(ApiError {
                mode: None,
                error: INVALID_REQUEST_MESSAGE.to_string(),
            }),
        )
    })?;

    let mode = payload.mode;
    let request = PredictionRequest::from(payload);

    service.run(&request).await.map(Json).map_err(|err| {
        let status = match err {
            AqiError::Validation { .. } => StatusCode::BAD_REQUEST,
            _ => StatusCode::UNPROCESSABLE_ENTITY,
        };
        (
            status,
            Json(ApiError {
                mode: Some(mode),
                error: err.user_message(mode),
            }),
        )
    })
}

async fn health(State(service): State<PredictionService>) -> Json<ApiHealth> {
    Json(ApiHealth {
        status: "ok".to_string(),
        model: service.model_kind().to_string(),
        version: crate::VERSION.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::location_resolver::LocationInput;

    #[test]
    fn test_manual_request_conversion() {
        let payload: ApiPredictRequest =
            serde_json::from_str(r#"{"mode": "manual", "city": "Delhi", "aod": 0.3}"#).unwrap();
        let request = PredictionRequest::from(payload);
        assert_eq!(request.input, LocationInput::City("Delhi".to_string()));
        assert_eq!(request.aod, Some(0.3));
    }

    #[test]
    fn test_manual_request_without_city_becomes_empty_input() {
        let payload: ApiPredictRequest = serde_json::from_str(r#"{"mode": "manual"}"#).unwrap();
        let request = PredictionRequest::from(payload);
        assert_eq!(request.input, LocationInput::City(String::new()));
    }

    #[test]
    fn test_auto_request_ignores_city() {
        let payload: ApiPredictRequest =
            serde_json::from_str(r#"{"mode": "auto", "city": "Delhi"}"#).unwrap();
        let request = PredictionRequest::from(payload);
        assert_eq!(request.input, LocationInput::Auto);
        assert_eq!(request.aod, None);
    }

    #[test]
    fn test_unknown_mode_rejected() {
        let result: Result<ApiPredictRequest, _> = serde_json::from_str(r#"{"mode": "gps"}"#);
        assert!(result.is_err());
    }
}
