//! HTTP handlers.
//!
//! Successful responses are the bare result JSON. Failures are
//! `{"detail": "..."}`: 400 for validation errors, 500 for everything
//! else.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use tracing::error;

use loadcast_core::TimestampedSeries;
use loadcast_predict::{ErrorClass, PredictError};

use crate::ApiState;

#[derive(serde::Serialize)]
struct ErrorBody {
    detail: String,
}

fn error_response(detail: String, status: StatusCode) -> Response {
    (status, Json(ErrorBody { detail })).into_response()
}

fn predict_error_response(e: &PredictError) -> Response {
    match e.class() {
        ErrorClass::Client => error_response(e.to_string(), StatusCode::BAD_REQUEST),
        ErrorClass::Server => error_response(
            format!("Prediction error: {e}"),
            StatusCode::INTERNAL_SERVER_ERROR,
        ),
    }
}

/// POST /predict
pub async fn predict(
    State(state): State<ApiState>,
    Json(series): Json<TimestampedSeries>,
) -> Response {
    let pipeline = Arc::clone(&state.pipeline);
    // Retraining and artifact writes block; keep them off the async workers.
    let outcome = tokio::task::spawn_blocking(move || pipeline.predict(&series)).await;

    match outcome {
        Ok(Ok(result)) => Json(result).into_response(),
        Ok(Err(e)) => predict_error_response(&e),
        Err(e) => {
            error!(error = %e, "prediction task failed");
            error_response(
                format!("Prediction error: {e}"),
                StatusCode::INTERNAL_SERVER_ERROR,
            )
        }
    }
}

/// GET /health
pub async fn health(State(state): State<ApiState>) -> impl IntoResponse {
    Json(state.pipeline.health())
}

/// GET /metrics
pub async fn prometheus_metrics(State(state): State<ApiState>) -> impl IntoResponse {
    let body = loadcast_metrics::render_prometheus(&state.pipeline.metrics().snapshot());
    (
        StatusCode::OK,
        [("content-type", "text/plain; version=0.0.4; charset=utf-8")],
        body,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;
    use loadcast_model::ModelStore;
    use loadcast_predict::{PipelineSettings, PredictionPipeline};

    fn test_state() -> ApiState {
        let store = ModelStore::open_in_memory().unwrap();
        let pipeline = PredictionPipeline::new(store, PipelineSettings::default()).unwrap();
        ApiState {
            pipeline: Arc::new(pipeline),
        }
    }

    async fn body_json(resp: Response) -> serde_json::Value {
        let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn predict_fallback_is_ok() {
        let series = TimestampedSeries::new(vec!["2024-01-01T00:00:00Z".into()], vec![10]);
        let resp = predict(State(test_state()), Json(series)).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let body = body_json(resp).await;
        assert_eq!(body["predictedLoad"], 30.0);
        assert_eq!(body["confidence"], 0.1);
        assert_eq!(body["nextTimestamp"], "2024-01-01T00:00:00Z");
    }

    #[tokio::test]
    async fn empty_series_is_bad_request() {
        let resp = predict(State(test_state()), Json(TimestampedSeries::default())).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(resp).await["detail"], "empty data provided");
    }

    #[tokio::test]
    async fn malformed_timestamp_is_server_error() {
        let series = TimestampedSeries::new(vec!["garbage".into()], vec![1]);
        let resp = predict(State(test_state()), Json(series)).await;
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let detail = body_json(resp).await["detail"].as_str().unwrap().to_string();
        assert!(detail.starts_with("Prediction error:"));
        assert!(detail.contains("garbage"));
    }

    #[tokio::test]
    async fn health_reports_model_absent() {
        let resp = health(State(test_state())).await.into_response();
        assert_eq!(resp.status(), StatusCode::OK);

        let body = body_json(resp).await;
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["modelLoaded"], false);
    }

    #[tokio::test]
    async fn prometheus_endpoint_returns_text() {
        let resp = prometheus_metrics(State(test_state())).await.into_response();
        assert_eq!(resp.status(), StatusCode::OK);
        let content_type = resp.headers().get("content-type").unwrap().to_str().unwrap();
        assert!(content_type.contains("text/plain"));
    }
}
