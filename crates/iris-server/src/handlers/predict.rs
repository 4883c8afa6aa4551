//! Prediction HTTP handler.

use std::sync::Arc;

use axum::{extract::State, Json};
use tracing::{error, info};

use crate::dto::{parse_predict_request, AppJson, PredictResponse};
use crate::error::AppError;
use crate::ServerState;

/// POST /predict - Classifies a single flower.
pub async fn predict(
    State(state): State<Arc<ServerState>>,
    AppJson(body): AppJson<serde_json::Value>,
) -> Result<Json<PredictResponse>, AppError> {
    let req = parse_predict_request(body)?;
    let result = state.predictor.predict(&req).map_err(|e| {
        error!("Error during prediction: {}", e);
        AppError::from(e)
    })?;

    info!(
        predicted_class = %result.predicted_class,
        predicted_index = result.predicted_index,
        "Prediction served"
    );
    Ok(Json(result))
}
