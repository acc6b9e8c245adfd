//! ArtifactStore — redb-backed persistence of the model/scaler pair.
//!
//! Both records go into one write transaction, so readers never see a
//! model from one training round next to a scaler from another. Values
//! are JSON so the artifacts stay inspectable.

use std::path::Path;
use std::sync::Arc;

use redb::{Database, ReadableDatabase, ReadableTable, StorageBackend};
use tracing::debug;

use crate::error::{ArtifactError, ArtifactResult};
use crate::tables::{ARTIFACTS, MODEL_KEY, SCALER_KEY};
use crate::types::{LinearModel, Scaler};

/// Convert any `Display` error into an `ArtifactError` variant via a closure factory.
macro_rules! map_err {
    ($variant:ident) => {
        |e| ArtifactError::$variant(e.to_string())
    };
}

/// Thread-safe artifact store backed by redb.
#[derive(Clone)]
pub struct ArtifactStore {
    db: Arc<Database>,
}

impl ArtifactStore {
    /// Open (or create) a persistent artifact store at the given path.
    pub fn open(path: &Path) -> ArtifactResult<Self> {
        let db = Database::create(path).map_err(map_err!(Open))?;
        let store = Self { db: Arc::new(db) };
        store.ensure_tables()?;
        debug!(?path, "artifact store opened");
        Ok(store)
    }

    /// Create an ephemeral in-memory artifact store (for testing).
    pub fn open_in_memory() -> ArtifactResult<Self> {
        let store = Self::open_with_backend(redb::backends::InMemoryBackend::new())?;
        debug!("in-memory artifact store opened");
        Ok(store)
    }

    /// Open an artifact store over a caller-supplied redb backend.
    pub fn open_with_backend(backend: impl StorageBackend) -> ArtifactResult<Self> {
        let db = Database::builder()
            .create_with_backend(backend)
            .map_err(map_err!(Open))?;
        let store = Self { db: Arc::new(db) };
        store.ensure_tables()?;
        Ok(store)
    }

    fn ensure_tables(&self) -> ArtifactResult<()> {
        let txn = self.db.begin_write().map_err(map_err!(Transaction))?;
        txn.open_table(ARTIFACTS).map_err(map_err!(Table))?;
        txn.commit().map_err(map_err!(Transaction))?;
        Ok(())
    }

    /// Write scaler then model, committed together.
    pub fn save(&self, model: &LinearModel, scaler: &Scaler) -> ArtifactResult<()> {
        let scaler_bytes = serde_json::to_vec(scaler).map_err(map_err!(Serialize))?;
        let model_bytes = serde_json::to_vec(model).map_err(map_err!(Serialize))?;

        let txn = self.db.begin_write().map_err(map_err!(Transaction))?;
        {
            let mut table = txn.open_table(ARTIFACTS).map_err(map_err!(Table))?;
            table
                .insert(SCALER_KEY, scaler_bytes.as_slice())
                .map_err(map_err!(Write))?;
            table
                .insert(MODEL_KEY, model_bytes.as_slice())
                .map_err(map_err!(Write))?;
        }
        txn.commit().map_err(map_err!(Transaction))?;
        debug!("model artifacts saved");
        Ok(())
    }

    /// Read both artifacts. Either one missing is an error.
    pub fn load(&self) -> ArtifactResult<(LinearModel, Scaler)> {
        let txn = self.db.begin_read().map_err(map_err!(Transaction))?;
        let table = txn.open_table(ARTIFACTS).map_err(map_err!(Table))?;

        let model: LinearModel = match table.get(MODEL_KEY).map_err(map_err!(Read))? {
            Some(guard) => serde_json::from_slice(guard.value()).map_err(map_err!(Deserialize))?,
            None => return Err(ArtifactError::Missing(MODEL_KEY)),
        };
        let scaler: Scaler = match table.get(SCALER_KEY).map_err(map_err!(Read))? {
            Some(guard) => serde_json::from_slice(guard.value()).map_err(map_err!(Deserialize))?,
            None => return Err(ArtifactError::Missing(SCALER_KEY)),
        };

        Ok((model, scaler))
    }

    /// Store raw bytes under an artifact key, bypassing serialization.
    #[cfg(test)]
    pub(crate) fn put_raw(&self, key: &str, value: &[u8]) -> ArtifactResult<()> {
        let txn = self.db.begin_write().map_err(map_err!(Transaction))?;
        {
            let mut table = txn.open_table(ARTIFACTS).map_err(map_err!(Table))?;
            table.insert(key, value).map_err(map_err!(Write))?;
        }
        txn.commit().map_err(map_err!(Transaction))?;
        Ok(())
    }
}
