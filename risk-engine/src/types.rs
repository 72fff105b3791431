//! Core types for the risk engine

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Risk score (0-100)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RiskScore(u8);

impl RiskScore {
    /// Maximum score, assigned to blocklisted actors
    pub const MAX: RiskScore = RiskScore(100);

    /// Minimum score, used by the fail-open fallback
    pub const MIN: RiskScore = RiskScore(0);

    /// Create new risk score, clamped to 0-100
    pub fn new(score: u8) -> Self {
        Self(score.min(100))
    }

    /// Get raw score
    pub fn value(&self) -> u8 {
        self.0
    }
}

/// Outcome of the decision engine for one transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Decision {
    /// Let the payment proceed
    Allow,
    /// Flag for manual review, payment proceeds
    Review,
    /// Refuse the payment and enforce a block
    Block,
}

impl Decision {
    /// Short uppercase label for logs and dashboards
    pub fn as_str(&self) -> &'static str {
        match self {
            Decision::Allow => "ALLOW",
            Decision::Review => "REVIEW",
            Decision::Block => "BLOCK",
        }
    }
}

/// Immutable input to one scoring pass
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionContext {
    /// User attempting the payment
    pub user_id: String,

    /// Session (booking) the payment belongs to
    pub session_id: Uuid,

    /// Payment amount (positive)
    pub amount: Decimal,

    /// Payer phone number
    pub phone_number: String,

    /// Device fingerprint, when the client supplied one
    pub device_fingerprint: Option<String>,

    /// Client IP address
    pub ip_address: String,

    /// Session type (e.g. "individual", "group", "workshop")
    pub session_type: String,

    /// When the payment attempt happened
    pub timestamp: DateTime<Utc>,
}

/// Per-factor scores, each 0-100
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FactorScores {
    /// Deviation of amount from the user's own history
    pub amount_deviation: u8,

    /// Unusual time-of-day
    pub time_pattern: u8,

    /// Failed-payment velocity and counterparty spread
    pub frequency: u8,

    /// Device fingerprint reputation
    pub device_fingerprint: u8,

    /// Consistency with the user's behavioral profile
    pub behavior_history: u8,

    /// External blocklist / fraud pattern match
    pub external_database: u8,
}

/// Result of one analyzer: a sub-score and its human-readable reasons
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FactorOutcome {
    /// Sub-score in 0-100
    pub score: u8,

    /// Why the analyzer scored what it did
    pub reasons: Vec<String>,
}

impl FactorOutcome {
    /// Outcome with a score and no reasons
    pub fn score(score: u8) -> Self {
        Self {
            score: score.min(100),
            reasons: Vec::new(),
        }
    }

    /// Outcome with a score and one reason
    pub fn with_reason(score: u8, reason: impl Into<String>) -> Self {
        Self {
            score: score.min(100),
            reasons: vec![reason.into()],
        }
    }
}

/// Complete risk analysis for one transaction
///
/// Produced once per scoring pass, appended to the audit sink immediately,
/// never mutated afterward.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskAnalysis {
    /// Unique analysis ID
    pub analysis_id: Uuid,

    /// User that was scored
    pub user_id: String,

    /// Session the payment belongs to
    pub session_id: Uuid,

    /// Per-factor sub-scores
    pub factors: FactorScores,

    /// Aggregate score (0-100)
    pub score: RiskScore,

    /// Decision derived from the score
    pub decision: Decision,

    /// Ordered reasons collected from all analyzers
    pub reasons: Vec<String>,

    /// Wall-clock time spent scoring, in milliseconds
    pub processing_time_ms: u64,

    /// Version of the reported evaluation model
    pub model_version: String,

    /// When the analysis completed
    pub assessed_at: DateTime<Utc>,
}

/// Terminal and non-terminal payment outcomes of stored transactions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentOutcome {
    /// Payment not yet resolved
    Pending,
    /// Payment settled
    Paid,
    /// Payment attempted and failed
    Failed,
    /// Payment refused by the risk engine
    Blocked,
}

impl PaymentOutcome {
    /// Whether this outcome is final (usable as a training label)
    pub fn is_terminal(&self) -> bool {
        !matches!(self, PaymentOutcome::Pending)
    }
}

/// One historical transaction as returned by the history collaborator
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredTransaction {
    /// Transaction ID
    pub transaction_id: Uuid,

    /// Paying user
    pub user_id: String,

    /// Counterparty (e.g. provider) on the other side of the session
    pub counterparty_id: String,

    /// Amount
    pub amount: Decimal,

    /// Payer phone number
    pub phone_number: String,

    /// Device fingerprint, when recorded
    pub device_fingerprint: Option<String>,

    /// Client IP address at the time of payment
    pub ip_address: String,

    /// Session type
    pub session_type: String,

    /// Payment outcome
    pub outcome: PaymentOutcome,

    /// Whether the risk engine flagged this transaction for review
    pub review_required: bool,

    /// When the transaction happened
    pub created_at: DateTime<Utc>,

    /// When the paying user's account was created
    pub account_created_at: DateTime<Utc>,
}
