//! Error types for the audit log

use thiserror::Error;

/// Result type for audit operations
pub type Result<T> = std::result::Result<T, AuditError>;

/// Audit log errors
#[derive(Error, Debug)]
pub enum AuditError {
    /// IO error writing or reading the backing file
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Hash chain verification failed
    #[error("Integrity check failed: {0}")]
    IntegrityFailure(String),
}
