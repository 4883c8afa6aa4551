//! HTTP route handlers for the prediction server.

pub mod predict;

use std::sync::Arc;

use axum::{extract::State, Json};

use crate::dto::{HealthResponse, RootResponse};
use crate::ServerState;

/// Root endpoint.
pub async fn root() -> Json<RootResponse> {
    Json(RootResponse::running())
}

/// Health check endpoint. Always 200; the body reports whether the model loaded.
pub async fn health(State(state): State<Arc<ServerState>>) -> Json<HealthResponse> {
    Json(HealthResponse::from_model_loaded(state.predictor.is_ready()))
}
