//! Prediction error taxonomy.

use thiserror::Error;

use loadcast_core::ParseError;
use loadcast_model::ModelError;

pub type PredictResult<T> = Result<T, PredictError>;

/// Caller-fault problems with the submitted series.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("empty data provided")]
    EmptyData,

    #[error("timestamps and requestCounts must have the same length")]
    LengthMismatch,
}

/// Everything that can fail inside the pipeline.
#[derive(Debug, Error)]
pub enum PredictError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error("{0}")]
    Unexpected(String),
}

/// Boundary category: only validation failures are the caller's fault.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    Client,
    Server,
}

impl PredictError {
    pub fn class(&self) -> ErrorClass {
        match self {
            PredictError::Validation(_) => ErrorClass::Client,
            _ => ErrorClass::Server,
        }
    }
}

/// Artifact failures are recovered inside `ModelStore`; whatever model
/// error still reaches the pipeline is unexpected.
impl From<ModelError> for PredictError {
    fn from(e: ModelError) -> Self {
        PredictError::Unexpected(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_validation_is_client_fault() {
        assert_eq!(PredictError::from(ValidationError::EmptyData).class(), ErrorClass::Client);
        assert_eq!(
            PredictError::from(ParseError::Invalid("x".into())).class(),
            ErrorClass::Server
        );
        assert_eq!(
            PredictError::from(ModelError::EmptyTrainingSet).class(),
            ErrorClass::Server
        );
    }

    #[test]
    fn validation_messages_are_verbatim() {
        assert_eq!(
            PredictError::from(ValidationError::EmptyData).to_string(),
            "empty data provided"
        );
        assert_eq!(
            PredictError::from(ValidationError::LengthMismatch).to_string(),
            "timestamps and requestCounts must have the same length"
        );
    }

    #[test]
    fn model_errors_are_unexpected() {
        let e = PredictError::from(ModelError::Fit("singular".into()));
        assert!(matches!(e, PredictError::Unexpected(ref m) if m.contains("singular")));
    }
}
