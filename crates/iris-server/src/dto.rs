use axum::extract::FromRequest;
use axum::http::StatusCode;
use serde::{Deserialize, Serialize};

use crate::error::AppError;

// === HTTP DTOs ===

pub use iris_core::{FeatureInput as PredictRequest, PredictionResult as PredictResponse};

pub const WELCOME_MESSAGE: &str = "Welcome to the Iris Classifier API";

/// Decodes a `/predict` body. Only a JSON object with named fields is
/// accepted; a bare array would bind features by position.
pub fn parse_predict_request(body: serde_json::Value) -> Result<PredictRequest, AppError> {
    if !body.is_object() {
        return Err(AppError::Validation {
            status: StatusCode::UNPROCESSABLE_ENTITY,
            message: "Request body must be a JSON object with fields sepal_length, sepal_width, petal_length, petal_width".into(),
        });
    }
    serde_json::from_value(body).map_err(|e| AppError::Validation {
        status: StatusCode::UNPROCESSABLE_ENTITY,
        message: format!("Failed to deserialize the JSON body into the target type: {}", e),
    })
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RootResponse {
    pub message: String,
    pub status: String,
}

impl RootResponse {
    pub fn running() -> Self {
        Self {
            message: WELCOME_MESSAGE.to_string(),
            status: "running".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Unhealthy,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: HealthStatus,
    pub model_loaded: bool,
}

impl HealthResponse {
    pub fn from_model_loaded(model_loaded: bool) -> Self {
        let status = if model_loaded { HealthStatus::Healthy } else { HealthStatus::Unhealthy };
        Self { status, model_loaded }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

// === Extractors ===

/// `Json` extractor whose rejections render as [`ErrorResponse`].
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct AppJson<T>(pub T);
