//! Error types for the trainer

use thiserror::Error;

/// Result type for training operations
pub type Result<T> = std::result::Result<T, Error>;

/// Training errors
#[derive(Debug, Error)]
pub enum Error {
    /// Another training run holds the singleton guard
    #[error("A training run is already in progress")]
    TrainingInProgress,

    /// Historical transaction query failed
    #[error("History query failed: {0}")]
    History(String),

    /// Dataset construction failed
    #[error("Training data error: {0}")]
    Data(String),

    /// Audit sink rejected an append
    #[error("Audit append failed: {0}")]
    Audit(String),
}

impl From<risk_engine::Error> for Error {
    fn from(err: risk_engine::Error) -> Self {
        Error::History(err.to_string())
    }
}

impl From<audit_log::AuditError> for Error {
    fn from(err: audit_log::AuditError) -> Self {
        Error::Audit(err.to_string())
    }
}
