//! Score-to-decision mapping

use serde::{Deserialize, Serialize};

use crate::types::{Decision, RiskScore};

/// Ordered decision thresholds
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct DecisionThresholds {
    /// Scores at or above this block the payment
    pub block: u8,

    /// Scores at or above this (and below `block`) go to manual review
    pub review: u8,
}

impl Default for DecisionThresholds {
    fn default() -> Self {
        Self {
            block: 90,
            review: 70,
        }
    }
}

impl DecisionThresholds {
    /// Map an aggregate score to a decision.
    ///
    /// Pure and deterministic: the decision is a function of the score alone.
    pub fn decide(&self, score: RiskScore) -> Decision {
        let value = score.value();
        if value >= self.block {
            Decision::Block
        } else if value >= self.review {
            Decision::Review
        } else {
            Decision::Allow
        }
    }
}
