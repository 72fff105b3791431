//! Block enforcement
//!
//! When a transaction is blocked, enforcement adds the actor to the
//! blocklist, cancels their active sessions, and writes an audit entry.
//! Every step is fire-and-log: enforcement failures never unwind into the
//! scoring caller's response path; a failed cancellation is picked up by the
//! session-lifecycle reconciliation job, not retried here.

use std::sync::Arc;

use audit_log::{AuditKind, AuditSink};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use tracing::{error, info};
use uuid::Uuid;

use crate::blocklist::Blocklist;
use crate::types::TransactionContext;
use crate::Result;

/// Cancellation reason stamped on sessions cancelled by enforcement
pub const FRAUD_CANCELLATION_REASON: &str = "cancelled by fraud enforcement";

/// Lifecycle phase of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionPhase {
    /// Booked, payment not confirmed
    Pending,
    /// Payment confirmed
    Approved,
    /// Cancelled (by user, provider, or enforcement)
    Cancelled,
    /// Completed normally
    Completed,
}

/// One session as seen by the enforcement collaborator
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionRecord {
    /// Session ID
    pub session_id: Uuid,

    /// Owning user
    pub user_id: String,

    /// Current phase
    pub phase: SessionPhase,

    /// Why the session was cancelled, when it was
    pub cancellation_reason: Option<String>,
}

/// Session lifecycle collaborator
///
/// Owned by the surrounding system; the engine only asks it to cancel a
/// blocked user's active sessions.
pub trait SessionControl: Send + Sync {
    /// Cancel all of the user's pending-or-approved sessions, tagging them
    /// with the given reason. Returns how many sessions were cancelled.
    fn cancel_active_sessions(&self, user_id: &str, reason: &str) -> Result<usize>;
}

/// In-memory session store backing tests and the demo
#[derive(Default)]
pub struct InMemorySessions {
    sessions: DashMap<Uuid, SessionRecord>,
}

impl InMemorySessions {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a session in the given phase
    pub fn add(&self, user_id: &str, phase: SessionPhase) -> Uuid {
        let session_id = Uuid::new_v4();
        self.sessions.insert(
            session_id,
            SessionRecord {
                session_id,
                user_id: user_id.to_string(),
                phase,
                cancellation_reason: None,
            },
        );
        session_id
    }

    /// Look up a session's current state
    pub fn get(&self, session_id: Uuid) -> Option<SessionRecord> {
        self.sessions.get(&session_id).map(|r| r.clone())
    }
}

impl SessionControl for InMemorySessions {
    fn cancel_active_sessions(&self, user_id: &str, reason: &str) -> Result<usize> {
        let mut cancelled = 0;
        for mut entry in self.sessions.iter_mut() {
            let record = entry.value_mut();
            if record.user_id == user_id
                && matches!(record.phase, SessionPhase::Pending | SessionPhase::Approved)
            {
                record.phase = SessionPhase::Cancelled;
                record.cancellation_reason = Some(reason.to_string());
                cancelled += 1;
            }
        }
        Ok(cancelled)
    }
}

/// Executes the block side effects for one transaction
pub struct Enforcement {
    blocklist: Arc<Blocklist>,
    sessions: Arc<dyn SessionControl>,
    audit: Arc<dyn AuditSink>,
    actor: String,
}

impl Enforcement {
    /// Create the enforcement executor
    pub fn new(
        blocklist: Arc<Blocklist>,
        sessions: Arc<dyn SessionControl>,
        audit: Arc<dyn AuditSink>,
        actor: impl Into<String>,
    ) -> Self {
        Self {
            blocklist,
            sessions,
            audit,
            actor: actor.into(),
        }
    }

    /// Enforce a block decision.
    ///
    /// Idempotently blocklists both the user id and the phone number,
    /// cancels the user's active sessions, and audits the action. Never
    /// returns an error: the decision has already been made and internal
    /// failures here must not reach the scoring caller.
    pub fn enforce_block(&self, ctx: &TransactionContext) {
        let user_added = self.blocklist.add(ctx.user_id.clone());
        let phone_added = self.blocklist.add(ctx.phone_number.clone());

        let cancelled = match self
            .sessions
            .cancel_active_sessions(&ctx.user_id, FRAUD_CANCELLATION_REASON)
        {
            Ok(count) => count,
            Err(e) => {
                error!(user_id = %ctx.user_id, error = %e,
                    "session cancellation failed during enforcement");
                0
            }
        };

        info!(user_id = %ctx.user_id, cancelled, "block enforced");

        let detail = serde_json::json!({
            "user_id": ctx.user_id,
            "phone_number": ctx.phone_number,
            "user_newly_blocked": user_added,
            "phone_newly_blocked": phone_added,
            "sessions_cancelled": cancelled,
            "reason": FRAUD_CANCELLATION_REASON,
        });
        if let Err(e) = self.audit.append(AuditKind::Enforcement, &self.actor, detail) {
            error!(user_id = %ctx.user_id, error = %e,
                "failed to append enforcement audit record");
        }
    }
}

/// A session store that always fails, for exercising the fire-and-log path
#[cfg(test)]
pub(crate) struct FailingSessions;

#[cfg(test)]
impl SessionControl for FailingSessions {
    fn cancel_active_sessions(&self, _user_id: &str, _reason: &str) -> Result<usize> {
        Err(crate::Error::Enforcement(
            "session service unavailable".to_string(),
        ))
    }
}
