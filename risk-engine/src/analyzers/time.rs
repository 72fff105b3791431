//! Time-of-day pattern analyzer

use chrono::Timelike;

use crate::types::{FactorOutcome, TransactionContext};
use crate::Result;

/// Scores payment attempts by hour of day
///
/// Late-night payments (23:00-05:00) are the strongest signal; early-morning
/// ones (05:00-07:00) are mildly unusual; everything else is baseline.
#[derive(Debug, Default)]
pub struct TimePatternAnalyzer;

impl TimePatternAnalyzer {
    /// Create the analyzer
    pub fn new() -> Self {
        Self
    }

    /// Score the transaction timestamp
    pub fn evaluate(&self, ctx: &TransactionContext) -> Result<FactorOutcome> {
        let hour = ctx.timestamp.hour();

        let outcome = if hour >= 23 || hour < 5 {
            FactorOutcome::with_reason(60, "payment at unusual hours")
        } else if hour < 7 {
            FactorOutcome::with_reason(30, "payment in early morning")
        } else {
            FactorOutcome::score(10)
        };

        Ok(outcome)
    }
}
