//! Amount deviation analyzer

use rust_decimal::prelude::ToPrimitive;

use crate::profile::UserRiskProfile;
use crate::types::{FactorOutcome, TransactionContext};
use crate::Result;

/// Score for users with too little history to model
const NEW_USER_SCORE: u8 = 30;

/// Paid transactions required before deviation statistics apply
const MIN_HISTORY: u64 = 5;

/// Scores how far the amount strays from the user's own payment history
#[derive(Debug, Default)]
pub struct AmountDeviationAnalyzer;

impl AmountDeviationAnalyzer {
    /// Create the analyzer
    pub fn new() -> Self {
        Self
    }

    /// Score the transaction amount against the user's rolling statistics
    pub fn evaluate(
        &self,
        ctx: &TransactionContext,
        profile: Option<&UserRiskProfile>,
    ) -> Result<FactorOutcome> {
        let profile = match profile {
            Some(p) if p.transaction_count >= MIN_HISTORY => p,
            _ => {
                return Ok(FactorOutcome::with_reason(
                    NEW_USER_SCORE,
                    "insufficient payment history for amount modeling",
                ))
            }
        };

        let amount = ctx.amount.to_f64().unwrap_or(0.0);
        let average = profile.average_amount;
        let stddev = profile.stddev_amount();

        let deviation = if stddev > f64::EPSILON {
            (amount - average).abs() / stddev
        } else {
            0.0
        };

        if deviation > 3.0 {
            let score = (40.0 + deviation * 10.0).min(80.0) as u8;
            return Ok(FactorOutcome::with_reason(
                score,
                format!("amount deviates {:.1} std devs from user average", deviation),
            ));
        }

        if average > 0.0 && amount > 5.0 * average {
            return Ok(FactorOutcome::with_reason(
                70,
                "amount exceeds 5x user average",
            ));
        }

        Ok(FactorOutcome::score((deviation * 15.0).min(50.0) as u8))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::ProfileStore;
    use chrono::Utc;
    use rust_decimal::Decimal;
    use uuid::Uuid;

    fn ctx(amount: u64) -> TransactionContext {
        TransactionContext {
            user_id: "u1".to_string(),
            session_id: Uuid::new_v4(),
            amount: Decimal::from(amount),
            phone_number: "254700000001".to_string(),
            device_fingerprint: None,
            ip_address: "10.0.0.1".to_string(),
            session_type: "individual".to_string(),
            timestamp: Utc::now(),
        }
    }

    fn profile_from(amounts: &[u64]) -> UserRiskProfile {
        let store = ProfileStore::new();
        for &amount in amounts {
            store.record_observation(&ctx(amount));
        }
        store.snapshot("u1").unwrap()
    }

    #[test]
    fn new_user_scores_30() {
        let analyzer = AmountDeviationAnalyzer::new();

        let outcome = analyzer.evaluate(&ctx(50_000), None).unwrap();
        assert_eq!(outcome.score, 30);

        let thin = profile_from(&[2_500, 2_500, 2_500]);
        let outcome = analyzer.evaluate(&ctx(50_000), Some(&thin)).unwrap();
        assert_eq!(outcome.score, 30);
    }

    #[test]
    fn large_deviation_caps_at_80() {
        let analyzer = AmountDeviationAnalyzer::new();
        let profile = profile_from(&[2_000, 2_500, 3_000, 2_500, 2_500]);

        let outcome = analyzer.evaluate(&ctx(50_000), Some(&profile)).unwrap();
        assert_eq!(outcome.score, 80);
        assert!(!outcome.reasons.is_empty());
    }

    #[test]
    fn five_times_average_scores_70_when_stddev_degenerate() {
        let analyzer = AmountDeviationAnalyzer::new();
        // Identical amounts: stddev 0, so only the 5x-average rule can fire
        let profile = profile_from(&[2_500, 2_500, 2_500, 2_500, 2_500]);

        let outcome = analyzer.evaluate(&ctx(50_000), Some(&profile)).unwrap();
        assert_eq!(outcome.score, 70);
    }

    #[test]
    fn typical_amount_scores_low() {
        let analyzer = AmountDeviationAnalyzer::new();
        let profile = profile_from(&[2_000, 2_500, 3_000, 2_500, 2_500]);

        let outcome = analyzer.evaluate(&ctx(2_600), Some(&profile)).unwrap();
        assert!(outcome.score <= 10, "got {}", outcome.score);
    }
}
