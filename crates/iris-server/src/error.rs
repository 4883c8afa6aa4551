//! Application error types and Axum response conversion.

use std::any::Any;

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use iris_core::PredictionError;
use tracing::error;

use crate::dto::ErrorResponse;

/// Application-level errors with HTTP status code mapping.
#[derive(Debug)]
pub enum AppError {
    /// Request body failed to deserialize into the expected shape.
    Validation { status: StatusCode, message: String },
    Unavailable(String),
    Internal(String),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation { status, .. } => *status,
            AppError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::Validation {
            status: rejection.status(),
            message: rejection.body_text(),
        }
    }
}

impl From<PredictionError> for AppError {
    fn from(e: PredictionError) -> Self {
        match e {
            PredictionError::ModelUnavailable => AppError::Unavailable(e.to_string()),
            PredictionError::InvalidPrediction(_) | PredictionError::InferenceFailure(_) => {
                AppError::Internal(format!("Prediction failed: {}", e))
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match self {
            AppError::Validation { message, .. } => message,
            AppError::Unavailable(message) | AppError::Internal(message) => message,
        };
        (status, Json(ErrorResponse { error: message })).into_response()
    }
}

/// Converts a handler panic into a 500 response.
pub fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "unknown panic".to_string()
    };
    error!("Handler panicked: {}", detail);
    AppError::Internal(format!("Prediction failed: {}", detail)).into_response()
}
