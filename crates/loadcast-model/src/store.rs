//! ModelStore — the single current `ModelState` and its durable copy.
//!
//! The state lives behind one `RwLock`. `train` and `load` take the write
//! lock for the swap *and* the artifact I/O, so persistence is serialized
//! with every other mutation; `snapshot` takes the read lock just long
//! enough to clone an `Arc`. A reader therefore always gets a model and
//! scaler from the same completed round.

use std::path::Path;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use tracing::{debug, error, info, warn};

use loadcast_core::FeatureVector;

use crate::artifacts::ArtifactStore;
use crate::error::ModelResult;
use crate::types::ModelState;

/// Where the current model came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelStatus {
    /// Nothing loaded or trained yet.
    Uninitialized,
    /// Restored from persisted artifacts.
    Loaded,
    /// Produced by a training round in this process.
    Trained,
}

/// Result of a successful `train` call.
#[derive(Debug, Clone)]
pub struct TrainOutcome {
    pub state: Arc<ModelState>,
    /// False when the fit succeeded but writing the artifacts failed.
    pub persisted: bool,
}

#[derive(Debug)]
struct Current {
    state: Option<Arc<ModelState>>,
    status: ModelStatus,
}

/// Shared handle to the global model. Cloning shares the same state.
#[derive(Clone)]
pub struct ModelStore {
    artifacts: ArtifactStore,
    current: Arc<RwLock<Current>>,
}

impl ModelStore {
    /// Open a store persisting to the redb file at `path`.
    ///
    /// Does not read the artifacts; call [`ModelStore::load`] for that.
    pub fn open(path: &Path) -> ModelResult<Self> {
        Ok(Self::with_artifacts(ArtifactStore::open(path)?))
    }

    /// Create a store with an in-memory artifact backend (for testing).
    pub fn open_in_memory() -> ModelResult<Self> {
        Ok(Self::with_artifacts(ArtifactStore::open_in_memory()?))
    }

    pub fn with_artifacts(artifacts: ArtifactStore) -> Self {
        Self {
            artifacts,
            current: Arc::new(RwLock::new(Current {
                state: None,
                status: ModelStatus::Uninitialized,
            })),
        }
    }

    /// Restore the persisted model. Returns false, leaving the current
    /// state untouched, when the artifacts are missing or unreadable.
    pub fn load(&self) -> bool {
        let mut current = self.write();
        match self.artifacts.load() {
            Ok((model, scaler)) => {
                current.state = Some(Arc::new(ModelState { model, scaler }));
                current.status = ModelStatus::Loaded;
                info!("model loaded from artifact store");
                true
            }
            Err(e) => {
                error!(error = %e, "error loading model");
                false
            }
        }
    }

    /// Fit a brand-new model from this batch alone and make it current.
    ///
    /// A failed artifact write is logged and reported through
    /// `TrainOutcome::persisted`; the new model stays current in memory.
    pub fn train(&self, features: &[FeatureVector], targets: &[f64]) -> ModelResult<TrainOutcome> {
        let state = Arc::new(ModelState::fit(features, targets)?);

        let mut current = self.write();
        current.state = Some(Arc::clone(&state));
        current.status = ModelStatus::Trained;

        let persisted = match self.artifacts.save(&state.model, &state.scaler) {
            Ok(()) => true,
            Err(e) => {
                error!(error = %e, "failed to persist model artifacts");
                false
            }
        };
        drop(current);

        if persisted {
            info!(samples = targets.len(), "model trained and saved");
        } else {
            warn!(samples = targets.len(), "model trained but not saved");
        }
        Ok(TrainOutcome { state, persisted })
    }

    /// The current model, if any. The returned state is immutable.
    pub fn snapshot(&self) -> Option<Arc<ModelState>> {
        let state = self.read().state.clone();
        debug!(present = state.is_some(), "model snapshot taken");
        state
    }

    pub fn status(&self) -> ModelStatus {
        self.read().status
    }

    /// True once a model has been loaded or trained.
    pub fn is_ready(&self) -> bool {
        self.read().state.is_some()
    }

    fn read(&self) -> RwLockReadGuard<'_, Current> {
        self.current.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Current> {
        self.current.write().unwrap_or_else(PoisonError::into_inner)
    }
}
