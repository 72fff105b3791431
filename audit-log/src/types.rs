//! Audit record types and the sink trait

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::Result;

/// What kind of event a record describes
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AuditKind {
    /// A risk analysis produced for a transaction
    RiskDecision,

    /// Enforcement ran against a blocked actor
    Enforcement,

    /// Operator added or removed a blocklist identifier
    BlocklistAdmin,

    /// Training run passed the deployment gate
    TrainingDeployed,

    /// Training run failed the deployment gate
    TrainingRejected,

    /// Training run skipped (insufficient data)
    TrainingSkipped,

    /// Training run aborted on an internal error
    TrainingFailed,
}

/// One immutable entry in the audit chain
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditRecord {
    /// Unique record ID
    pub record_id: Uuid,

    /// When the record was appended
    pub recorded_at: DateTime<Utc>,

    /// Event kind
    pub kind: AuditKind,

    /// Who produced the event (component or operator name)
    pub actor: String,

    /// Structured payload (the decision, the enforcement result, the report)
    pub detail: serde_json::Value,

    /// Hash of the previous record (empty for the genesis record)
    pub previous_hash: String,

    /// SHA-256 over this record's canonical content + previous_hash
    pub hash: String,
}

impl AuditRecord {
    /// Build a record and seal it against the previous hash.
    pub fn new(
        kind: AuditKind,
        actor: impl Into<String>,
        detail: serde_json::Value,
        previous_hash: String,
    ) -> Self {
        let mut record = Self {
            record_id: Uuid::now_v7(),
            recorded_at: Utc::now(),
            kind,
            actor: actor.into(),
            detail,
            previous_hash,
            hash: String::new(),
        };
        record.hash = record.compute_hash();
        record
    }

    /// SHA-256 over the canonical content of the record.
    ///
    /// Every field except `hash` itself participates, so changing any part of
    /// a stored record (or its position in the chain) invalidates the digest.
    pub fn compute_hash(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.record_id.as_bytes());
        hasher.update(self.recorded_at.to_rfc3339().as_bytes());
        hasher.update(kind_tag(self.kind).as_bytes());
        hasher.update(self.actor.as_bytes());
        hasher.update(self.detail.to_string().as_bytes());
        hasher.update(self.previous_hash.as_bytes());
        hex::encode(hasher.finalize())
    }

    /// Check that the stored hash matches the record's content.
    pub fn verify_hash(&self) -> bool {
        self.hash == self.compute_hash()
    }
}

fn kind_tag(kind: AuditKind) -> &'static str {
    match kind {
        AuditKind::RiskDecision => "risk_decision",
        AuditKind::Enforcement => "enforcement",
        AuditKind::BlocklistAdmin => "blocklist_admin",
        AuditKind::TrainingDeployed => "training_deployed",
        AuditKind::TrainingRejected => "training_rejected",
        AuditKind::TrainingSkipped => "training_skipped",
        AuditKind::TrainingFailed => "training_failed",
    }
}

/// Append-only sink the engine and trainer write to.
///
/// Implementations must never mutate or drop existing records.
pub trait AuditSink: Send + Sync {
    /// Append one record to the chain.
    fn append(&self, kind: AuditKind, actor: &str, detail: serde_json::Value)
        -> Result<AuditRecord>;
}
