//! loadcast-predict — the request-level forecasting pipeline.
//!
//! ```text
//! predict(series)
//!   ├── validate        empty / length mismatch → ValidationError
//!   ├── encode          TimeFeatureEncoder → N × 6 features
//!   ├── retrain         N ≥ min_training_samples → ModelStore::train
//!   │                   (inline, or queued on the TrainingWorker)
//!   ├── snapshot        ModelStore::snapshot()
//!   └── predict         last + horizon → scale → regress → clamp
//!                       no model → fixed fallback, timestamp unchanged
//! ```
//!
//! Errors carry their kind through every stage and are collapsed to a
//! client/server class only at the boundary (`PredictError::class`).

pub mod error;
pub mod pipeline;
pub mod trainer;

pub use error::{ErrorClass, PredictError, PredictResult, ValidationError};
pub use pipeline::{PipelineSettings, PredictionPipeline};
pub use trainer::TrainingWorker;
