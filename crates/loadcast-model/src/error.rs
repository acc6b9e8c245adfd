//! Error types for the model store.

use thiserror::Error;

/// Result type alias for artifact storage operations.
pub type ArtifactResult<T> = Result<T, ArtifactError>;

/// Result type alias for model operations.
pub type ModelResult<T> = Result<T, ModelError>;

/// Errors from the durable artifact store.
#[derive(Debug, Error)]
pub enum ArtifactError {
    #[error("failed to open database: {0}")]
    Open(String),

    #[error("transaction error: {0}")]
    Transaction(String),

    #[error("table error: {0}")]
    Table(String),

    #[error("read error: {0}")]
    Read(String),

    #[error("write error: {0}")]
    Write(String),

    #[error("serialization error: {0}")]
    Serialize(String),

    #[error("deserialization error: {0}")]
    Deserialize(String),

    #[error("artifact missing: {0}")]
    Missing(&'static str),
}

/// Errors from fitting or persisting a model.
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("training set is empty")]
    EmptyTrainingSet,

    #[error("feature rows ({features}) and targets ({targets}) differ in length")]
    LengthMismatch { features: usize, targets: usize },

    #[error("regression fit failed: {0}")]
    Fit(String),

    #[error("artifact storage: {0}")]
    Persistence(#[from] ArtifactError),
}
