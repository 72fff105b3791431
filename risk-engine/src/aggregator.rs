//! Weighted aggregation of factor scores

use serde::{Deserialize, Serialize};

use crate::types::{FactorScores, RiskScore};

/// Fixed weights applied to the six factor scores
///
/// The defaults sum to 1.0. The model trainer reports metrics for a shadow
/// model and never adjusts these weights at runtime.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct FactorWeights {
    /// Weight for amount deviation
    pub amount_deviation: f64,

    /// Weight for time-of-day pattern
    pub time_pattern: f64,

    /// Weight for failed-payment velocity
    pub frequency: f64,

    /// Weight for device fingerprint reputation
    pub device_fingerprint: f64,

    /// Weight for behavioral consistency
    pub behavior_history: f64,

    /// Weight for external blocklist / pattern match
    pub external_database: f64,
}

impl Default for FactorWeights {
    fn default() -> Self {
        Self {
            amount_deviation: 0.25,
            time_pattern: 0.20,
            frequency: 0.15,
            device_fingerprint: 0.15,
            behavior_history: 0.15,
            external_database: 0.10,
        }
    }
}

impl FactorWeights {
    /// Sum of all weights (1.0 for the defaults)
    pub fn total(&self) -> f64 {
        self.amount_deviation
            + self.time_pattern
            + self.frequency
            + self.device_fingerprint
            + self.behavior_history
            + self.external_database
    }

    /// Combine the six factor scores into one aggregate score.
    ///
    /// `round(clamp(sum(score_i * weight_i), 0, 100))`; pure, no shared state.
    pub fn aggregate(&self, factors: &FactorScores) -> RiskScore {
        let weighted = f64::from(factors.amount_deviation) * self.amount_deviation
            + f64::from(factors.time_pattern) * self.time_pattern
            + f64::from(factors.frequency) * self.frequency
            + f64::from(factors.device_fingerprint) * self.device_fingerprint
            + f64::from(factors.behavior_history) * self.behavior_history
            + f64::from(factors.external_database) * self.external_database;

        RiskScore::new(weighted.clamp(0.0, 100.0).round() as u8)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_weights_sum_to_one() {
        let weights = FactorWeights::default();
        assert!((weights.total() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn aggregate_of_zeroes_is_zero() {
        let weights = FactorWeights::default();
        assert_eq!(weights.aggregate(&FactorScores::default()).value(), 0);
    }

    #[test]
    fn aggregate_of_max_scores_is_100() {
        let weights = FactorWeights::default();
        let factors = FactorScores {
            amount_deviation: 100,
            time_pattern: 100,
            frequency: 100,
            device_fingerprint: 100,
            behavior_history: 100,
            external_database: 100,
        };
        assert_eq!(weights.aggregate(&factors).value(), 100);
    }

    #[test]
    fn aggregate_is_deterministic() {
        let weights = FactorWeights::default();
        let factors = FactorScores {
            amount_deviation: 70,
            time_pattern: 60,
            frequency: 90,
            device_fingerprint: 50,
            behavior_history: 25,
            external_database: 0,
        };
        let first = weights.aggregate(&factors);
        let second = weights.aggregate(&factors);
        assert_eq!(first, second);
    }

    #[test]
    fn high_amount_factor_contributes_its_weight() {
        // amount factor 70 at weight 0.25 alone contributes 17.5 -> 18 rounded
        let weights = FactorWeights::default();
        let factors = FactorScores {
            amount_deviation: 70,
            ..FactorScores::default()
        };
        assert_eq!(weights.aggregate(&factors).value(), 18);
    }
}
