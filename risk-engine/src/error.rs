//! Error types for the risk engine

use thiserror::Error;

/// Result type
pub type Result<T> = std::result::Result<T, Error>;

/// Risk engine error
#[derive(Debug, Error)]
pub enum Error {
    /// Historical transaction query failed
    #[error("History query failed: {0}")]
    History(String),

    /// Profile store operation failed
    #[error("Profile store error: {0}")]
    Profile(String),

    /// A single analyzer failed
    #[error("Analyzer '{factor}' failed: {message}")]
    Analyzer {
        /// Which factor failed
        factor: &'static str,
        /// What went wrong
        message: String,
    },

    /// Enforcement action failed
    #[error("Enforcement failed: {0}")]
    Enforcement(String),

    /// Audit sink rejected an append
    #[error("Audit append failed: {0}")]
    Audit(String),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<audit_log::AuditError> for Error {
    fn from(err: audit_log::AuditError) -> Self {
        Error::Audit(err.to_string())
    }
}
