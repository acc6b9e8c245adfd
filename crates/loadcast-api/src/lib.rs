//! loadcast-api — HTTP surface for the prediction pipeline.
//!
//! # API Routes
//!
//! | Method | Path | Description |
//! |---|---|---|
//! | POST | `/predict` | Forecast the next point of a request-count series |
//! | GET | `/health` | Liveness and whether a model is available |
//! | GET | `/metrics` | Prometheus exposition |

pub mod handlers;

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use loadcast_predict::PredictionPipeline;

/// Shared state for API handlers.
#[derive(Clone)]
pub struct ApiState {
    pub pipeline: Arc<PredictionPipeline>,
}

/// Build the complete API router.
pub fn build_router(pipeline: Arc<PredictionPipeline>) -> Router {
    let state = ApiState { pipeline };

    Router::new()
        .route("/predict", post(handlers::predict))
        .route("/health", get(handlers::health))
        .route("/metrics", get(handlers::prometheus_metrics))
        .with_state(state)
}
