mod dto;
mod error;
mod handlers;
mod router;

use std::sync::Arc;

use anyhow::Result;
use iris_config::ServerConfig;
use iris_core::PredictionService;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

pub struct ServerState {
    pub predictor: PredictionService,
}

impl ServerState {
    pub fn new(predictor: PredictionService) -> Self {
        Self { predictor }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let config = ServerConfig::from_env()?;

    tracing_subscriber::fmt()
        .with_target(false)
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .or_else(|_| EnvFilter::try_new(&config.log_filter))
                .unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .compact()
        .init();

    let model = iris_model::load_handle(&config.model_path);
    if !model.is_ready() {
        warn!("Model unavailable, /predict will return 503 until restart");
    }

    let state = Arc::new(ServerState::new(PredictionService::new(model)));
    let app = router::build_router(state);

    let addr = config.addr();
    info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
