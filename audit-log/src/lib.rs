//! Tamper-evident audit log for risk decisions
//!
//! Append-only log where every record embeds a SHA-256 hash over its own
//! canonical content concatenated with the previous record's hash. Any
//! retroactive edit breaks the chain and is caught by `verify_integrity`.
//!
//! The scoring engine, enforcement, and the model trainer all write here;
//! nothing in this crate ever mutates or deletes an existing record.

#![forbid(unsafe_code)]

pub mod chain;
pub mod error;
pub mod types;

pub use chain::HashChainLog;
pub use error::{AuditError, Result};
pub use types::{AuditKind, AuditRecord, AuditSink};
