//! Request and response types shared across Loadcast crates.

use serde::{Deserialize, Serialize};

/// A short history of request counts, as parallel arrays.
///
/// Shape is validated by the prediction pipeline, not here, so a
/// malformed series can still be deserialized and rejected with a
/// meaningful error.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimestampedSeries {
    pub timestamps: Vec<String>,
    pub request_counts: Vec<u64>,
}

impl TimestampedSeries {
    pub fn new(timestamps: Vec<String>, request_counts: Vec<u64>) -> Self {
        Self {
            timestamps,
            request_counts,
        }
    }

    /// Number of samples, counted on the timestamp side.
    pub fn len(&self) -> usize {
        self.timestamps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }
}

/// Forecast for the point after the series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PredictionResult {
    /// Predicted load, clamped to the configured bounds.
    pub predicted_load: f64,
    /// Sample-count heuristic, not a statistical interval.
    pub confidence: f64,
    pub next_timestamp: String,
}

/// Liveness report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthReport {
    pub status: String,
    /// True when the model store holds a loaded or trained model.
    pub model_loaded: bool,
}

impl HealthReport {
    pub fn healthy(model_loaded: bool) -> Self {
        Self {
            status: "healthy".to_string(),
            model_loaded,
        }
    }
}
