//! loadcast-model — the single global forecasting model.
//!
//! Holds the current `(LinearModel, Scaler)` pair as one immutable
//! `ModelState`, swaps it wholesale after each training round, and keeps a
//! durable copy in [redb](https://docs.rs/redb).
//!
//! # Architecture
//!
//! ```text
//! ModelStore
//!   ├── train()    fit scaler + OLS, swap state, persist both artifacts
//!   ├── snapshot() Arc<ModelState> for lock-free prediction
//!   └── load()     read artifacts back at startup
//!
//! ArtifactStore (redb, table `artifacts`)
//!   ├── "scaler" → {"mean": [6], "scale": [6]}
//!   └── "model"  → {"weights": [6], "intercept": f}
//! ```
//!
//! Both artifacts are written in one redb write transaction, so the
//! on-disk pair is always from the same training round.

pub mod artifacts;
pub mod error;
pub mod regression;
pub mod store;
pub mod tables;
#[cfg(any(test, feature = "testing"))]
pub mod testing;
pub mod types;

pub use artifacts::ArtifactStore;
pub use error::{ArtifactError, ArtifactResult, ModelError, ModelResult};
pub use store::{ModelStatus, ModelStore, TrainOutcome};
pub use types::{LinearModel, ModelState, Scaler};
