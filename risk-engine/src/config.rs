//! Configuration for the risk engine

use serde::{Deserialize, Serialize};

use crate::aggregator::FactorWeights;
use crate::decision::DecisionThresholds;

/// Risk engine configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskConfig {
    /// Service name used as the audit actor
    pub service_name: String,

    /// Version label reported for the rule-based scorer until a trained
    /// model is deployed
    pub model_version: String,

    /// Decision thresholds
    pub thresholds: DecisionThresholds,

    /// Factor weights
    pub weights: FactorWeights,

    /// Soft latency budget for one scoring pass; overruns are logged as
    /// warnings, never enforced as timeouts
    pub latency_budget_ms: u64,
}

impl Default for RiskConfig {
    fn default() -> Self {
        Self {
            service_name: "risk-engine".to_string(),
            model_version: "heuristic-v1".to_string(),
            thresholds: DecisionThresholds::default(),
            weights: FactorWeights::default(),
            latency_budget_ms: 2_000,
        }
    }
}

impl RiskConfig {
    /// Load from a TOML file
    pub fn from_file(path: impl AsRef<std::path::Path>) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: RiskConfig = toml::from_str(&content)
            .map_err(|e| crate::Error::Config(format!("Failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Load defaults overridden by environment variables
    pub fn from_env() -> crate::Result<Self> {
        let mut config = RiskConfig::default();

        if let Ok(name) = std::env::var("RISK_SERVICE_NAME") {
            config.service_name = name;
        }

        if let Ok(budget) = std::env::var("RISK_LATENCY_BUDGET_MS") {
            config.latency_budget_ms = budget
                .parse()
                .map_err(|e| crate::Error::Config(format!("Invalid latency budget: {}", e)))?;
        }

        config.validate()?;
        Ok(config)
    }

    /// Check internal consistency of thresholds and weights
    pub fn validate(&self) -> crate::Result<()> {
        if self.thresholds.review >= self.thresholds.block {
            return Err(crate::Error::Config(format!(
                "Review threshold {} must be below block threshold {}",
                self.thresholds.review, self.thresholds.block
            )));
        }

        let total = self.weights.total();
        if (total - 1.0).abs() > 1e-6 {
            return Err(crate::Error::Config(format!(
                "Factor weights must sum to 1.0, got {}",
                total
            )));
        }

        Ok(())
    }
}
