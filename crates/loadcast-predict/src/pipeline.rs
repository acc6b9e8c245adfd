//! PredictionPipeline — encode, conditionally retrain, predict, clamp.
//!
//! All methods are blocking: inline retraining and artifact I/O run on
//! the caller's thread. Async callers should go through
//! `spawn_blocking`.

use std::sync::Arc;

use tracing::{debug, error, info};

use loadcast_core::config::{LoadcastConfig, TrainingMode};
use loadcast_core::{
    FeatureVector, HealthReport, PredictionResult, TimeFeatureEncoder, Timestamp,
    TimestampedSeries,
};
use loadcast_metrics::PipelineMetrics;
use loadcast_model::ModelStore;

use crate::error::{PredictError, PredictResult, ValidationError};
use crate::trainer::TrainingWorker;

/// Tunables for one pipeline. Defaults reproduce the documented contract.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineSettings {
    pub min_training_samples: usize,
    pub horizon_minutes: i64,
    pub training: TrainingMode,
    pub training_queue: usize,
    pub load_min: f64,
    pub load_max: f64,
    pub confidence_base: f64,
    pub confidence_cap: f64,
    pub confidence_divisor: f64,
    pub fallback_load: f64,
    pub fallback_confidence: f64,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self::from(&LoadcastConfig::default())
    }
}

impl From<&LoadcastConfig> for PipelineSettings {
    fn from(config: &LoadcastConfig) -> Self {
        let m = &config.model;
        Self {
            min_training_samples: m.min_training_samples,
            horizon_minutes: m.horizon_minutes,
            training: m.training,
            training_queue: m.training_queue,
            load_min: m.load_min,
            load_max: m.load_max,
            confidence_base: m.confidence_base,
            confidence_cap: m.confidence_cap,
            confidence_divisor: m.confidence_divisor,
            fallback_load: config.fallback.predicted_load,
            fallback_confidence: config.fallback.confidence,
        }
    }
}

impl PipelineSettings {
    /// `min(cap, base + samples / divisor)`.
    pub fn confidence(&self, samples: usize) -> f64 {
        (self.confidence_base + samples as f64 / self.confidence_divisor).min(self.confidence_cap)
    }

    /// Clamp a raw regression output into `[load_min, load_max]`.
    pub fn clamp_load(&self, raw: f64) -> f64 {
        raw.max(self.load_min).min(self.load_max)
    }
}

/// The forecasting pipeline shared by every request.
pub struct PredictionPipeline {
    store: ModelStore,
    encoder: TimeFeatureEncoder,
    settings: PipelineSettings,
    metrics: Arc<PipelineMetrics>,
    trainer: Option<TrainingWorker>,
}

impl PredictionPipeline {
    /// Build a pipeline over `store`. Starts the training thread when
    /// `settings.training` is `Background`.
    pub fn new(store: ModelStore, settings: PipelineSettings) -> PredictResult<Self> {
        let metrics = Arc::new(PipelineMetrics::new());
        metrics.set_model_ready(store.is_ready());

        let trainer = match settings.training {
            TrainingMode::Inline => None,
            TrainingMode::Background => Some(
                TrainingWorker::spawn(store.clone(), Arc::clone(&metrics), settings.training_queue)
                    .map_err(|e| {
                        PredictError::Unexpected(format!("failed to start training worker: {e}"))
                    })?,
            ),
        };

        Ok(Self {
            store,
            encoder: TimeFeatureEncoder,
            settings,
            metrics,
            trainer,
        })
    }

    /// Restore the persisted model. Call once before serving; the result
    /// is advisory and serving proceeds either way.
    pub fn initialize(&self) -> bool {
        let loaded = self.store.load();
        self.metrics.set_model_ready(self.store.is_ready());
        if loaded {
            info!("pipeline initialized with persisted model");
        } else {
            info!("pipeline initialized without a model, serving fallback until trained");
        }
        loaded
    }

    /// Forecast the point after `series`.
    pub fn predict(&self, series: &TimestampedSeries) -> PredictResult<PredictionResult> {
        if let Err(e) = validate(series) {
            self.metrics.record_validation_error();
            debug!(error = %e, "rejected prediction request");
            return Err(e.into());
        }

        self.run(series).inspect_err(|e| {
            self.metrics.record_internal_error();
            error!(error = %e, samples = series.len(), "Prediction error");
        })
    }

    /// Liveness plus whether a usable model is present. No side effects.
    pub fn health(&self) -> HealthReport {
        HealthReport::healthy(self.store.is_ready())
    }

    pub fn metrics(&self) -> Arc<PipelineMetrics> {
        Arc::clone(&self.metrics)
    }

    pub fn store(&self) -> &ModelStore {
        &self.store
    }

    pub fn settings(&self) -> &PipelineSettings {
        &self.settings
    }

    /// Stop the background trainer, if any, after it drains its queue.
    pub fn shutdown(self) {
        if let Some(trainer) = self.trainer {
            trainer.shutdown();
        }
    }

    fn run(&self, series: &TimestampedSeries) -> PredictResult<PredictionResult> {
        let samples = series.len();
        let features = self.encoder.encode(&series.timestamps)?;

        if samples >= self.settings.min_training_samples {
            self.retrain(features, &series.request_counts)?;
        }

        let last_raw = series
            .timestamps
            .last()
            .ok_or(ValidationError::EmptyData)?;

        let Some(state) = self.store.snapshot() else {
            let result = PredictionResult {
                predicted_load: self.settings.fallback_load,
                confidence: self.settings.fallback_confidence,
                next_timestamp: last_raw.clone(),
            };
            self.metrics.record_fallback(result.predicted_load, result.confidence);
            debug!(samples, "no model available, returning fallback");
            return Ok(result);
        };

        let next = Timestamp::parse(last_raw)?.plus_minutes(self.settings.horizon_minutes)?;
        let raw = state.predict(&self.encoder.encode_one(&next));
        if !raw.is_finite() {
            return Err(PredictError::Unexpected(format!(
                "model produced non-finite prediction {raw}"
            )));
        }

        let result = PredictionResult {
            predicted_load: self.settings.clamp_load(raw),
            confidence: self.settings.confidence(samples),
            next_timestamp: next.to_string(),
        };
        self.metrics.record_prediction(result.predicted_load, result.confidence);
        debug!(
            samples,
            raw,
            predicted = result.predicted_load,
            confidence = result.confidence,
            next = %result.next_timestamp,
            "prediction made"
        );
        Ok(result)
    }

    /// Fit a fresh model on this window only, inline or via the worker.
    fn retrain(&self, features: Vec<FeatureVector>, counts: &[u64]) -> PredictResult<()> {
        let targets: Vec<f64> = counts.iter().map(|&c| c as f64).collect();

        if let Some(trainer) = &self.trainer {
            // A dropped job is counted and logged by the worker handle.
            let _ = trainer.submit(features, targets);
            return Ok(());
        }

        match self.store.train(&features, &targets) {
            Ok(outcome) => {
                self.metrics.record_training(outcome.persisted);
                self.metrics.set_model_ready(true);
                Ok(())
            }
            Err(e) => {
                self.metrics.record_training_failure();
                Err(e.into())
            }
        }
    }
}

fn validate(series: &TimestampedSeries) -> Result<(), ValidationError> {
    if series.timestamps.is_empty() || series.request_counts.is_empty() {
        return Err(ValidationError::EmptyData);
    }
    if series.timestamps.len() != series.request_counts.len() {
        return Err(ValidationError::LengthMismatch);
    }
    Ok(())
}
