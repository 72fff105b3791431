//! PayGuard Risk Engine
//!
//! Real-time fraud risk scoring for payment attempts.
//!
//! # Architecture
//!
//! - **Six independent analyzers**: amount deviation, time-of-day, velocity,
//!   device fingerprint, behavioral consistency, external blocklist/patterns
//! - **Weighted aggregation**: fixed weights combine factor scores into one
//!   0-100 risk score
//! - **Deterministic decisions**: two ordered thresholds map the score to
//!   allow / review / block
//! - **Fail-open**: the engine's own faults never block a payment; only a
//!   blocklist hit or a genuinely high score produces a block

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod aggregator;
pub mod analyzers;
pub mod blocklist;
pub mod config;
pub mod decision;
pub mod enforcement;
pub mod engine;
pub mod error;
pub mod history;
pub mod metrics;
pub mod model;
pub mod profile;
pub mod types;

pub use aggregator::FactorWeights;
pub use blocklist::Blocklist;
pub use config::RiskConfig;
pub use decision::DecisionThresholds;
pub use enforcement::{
    Enforcement, InMemorySessions, SessionControl, SessionPhase, SessionRecord,
    FRAUD_CANCELLATION_REASON,
};
pub use engine::{EngineSnapshot, RiskEngine};
pub use error::{Error, Result};
pub use history::{InMemoryHistory, TransactionHistory};
pub use model::{ModelSnapshot, ModelStatus, ValidationMetrics};
pub use profile::{ProfileStore, UserRiskProfile};
pub use types::*;
