//! loadcast-metrics — observability for the prediction pipeline.
//!
//! # Architecture
//!
//! ```text
//! PipelineMetrics
//!   ├── record_*()  ← called by the pipeline per request / training round
//!   └── snapshot()  → MetricsSnapshot (plain values)
//!
//! Prometheus exposition
//!   └── render_prometheus() → text/plain for the /metrics endpoint
//! ```

pub mod collector;
pub mod prometheus;

pub use collector::{MetricsSnapshot, PipelineMetrics};
pub use prometheus::render_prometheus;
