//! Pipeline metrics — lock-free counters updated on the request path.
//!
//! Float gauges are stored as `f64` bit patterns in `AtomicU64`.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use serde::Serialize;

/// Counters and gauges for one prediction pipeline.
#[derive(Debug, Default)]
pub struct PipelineMetrics {
    model_predictions: AtomicU64,
    fallback_predictions: AtomicU64,
    trainings: AtomicU64,
    training_failures: AtomicU64,
    persistence_failures: AtomicU64,
    dropped_training_jobs: AtomicU64,
    validation_errors: AtomicU64,
    internal_errors: AtomicU64,
    model_ready: AtomicBool,
    last_predicted_load: AtomicU64,
    last_confidence: AtomicU64,
}

/// Point-in-time copy of [`PipelineMetrics`].
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MetricsSnapshot {
    pub model_predictions: u64,
    pub fallback_predictions: u64,
    pub trainings: u64,
    pub training_failures: u64,
    pub persistence_failures: u64,
    pub dropped_training_jobs: u64,
    pub validation_errors: u64,
    pub internal_errors: u64,
    pub model_ready: bool,
    pub last_predicted_load: f64,
    pub last_confidence: f64,
}

impl PipelineMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// A prediction answered by a trained or loaded model.
    pub fn record_prediction(&self, predicted_load: f64, confidence: f64) {
        self.model_predictions.fetch_add(1, Ordering::Relaxed);
        self.set_last(predicted_load, confidence);
    }

    /// A prediction answered with the no-model fallback.
    pub fn record_fallback(&self, predicted_load: f64, confidence: f64) {
        self.fallback_predictions.fetch_add(1, Ordering::Relaxed);
        self.set_last(predicted_load, confidence);
    }

    /// A finished training round; `persisted` is false if the save failed.
    pub fn record_training(&self, persisted: bool) {
        self.trainings.fetch_add(1, Ordering::Relaxed);
        if !persisted {
            self.persistence_failures.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn record_training_failure(&self) {
        self.training_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_dropped_job(&self) {
        self.dropped_training_jobs.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_validation_error(&self) {
        self.validation_errors.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_internal_error(&self) {
        self.internal_errors.fetch_add(1, Ordering::Relaxed);
    }

    pub fn set_model_ready(&self, ready: bool) {
        self.model_ready.store(ready, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            model_predictions: self.model_predictions.load(Ordering::Relaxed),
            fallback_predictions: self.fallback_predictions.load(Ordering::Relaxed),
            trainings: self.trainings.load(Ordering::Relaxed),
            training_failures: self.training_failures.load(Ordering::Relaxed),
            persistence_failures: self.persistence_failures.load(Ordering::Relaxed),
            dropped_training_jobs: self.dropped_training_jobs.load(Ordering::Relaxed),
            validation_errors: self.validation_errors.load(Ordering::Relaxed),
            internal_errors: self.internal_errors.load(Ordering::Relaxed),
            model_ready: self.model_ready.load(Ordering::Relaxed),
            last_predicted_load: f64::from_bits(self.last_predicted_load.load(Ordering::Relaxed)),
            last_confidence: f64::from_bits(self.last_confidence.load(Ordering::Relaxed)),
        }
    }

    fn set_last(&self, predicted_load: f64, confidence: f64) {
        self.last_predicted_load
            .store(predicted_load.to_bits(), Ordering::Relaxed);
        self.last_confidence
            .store(confidence.to_bits(), Ordering::Relaxed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_at_zero() {
        let snap = PipelineMetrics::new().snapshot();
        assert_eq!(snap, MetricsSnapshot::default());
    }

    #[test]
    fn counts_predictions_by_source() {
        let metrics = PipelineMetrics::new();
        metrics.record_prediction(42.5, 0.54);
        metrics.record_prediction(40.0, 0.6);
        metrics.record_fallback(30.0, 0.1);

        let snap = metrics.snapshot();
        assert_eq!(snap.model_predictions, 2);
        assert_eq!(snap.fallback_predictions, 1);
        assert_eq!(snap.last_predicted_load, 30.0);
        assert_eq!(snap.last_confidence, 0.1);
    }

    #[test]
    fn unpersisted_training_counts_as_persistence_failure() {
        let metrics = PipelineMetrics::new();
        metrics.record_training(true);
        metrics.record_training(false);

        let snap = metrics.snapshot();
        assert_eq!(snap.trainings, 2);
        assert_eq!(snap.persistence_failures, 1);
    }
}
