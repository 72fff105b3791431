//! Prometheus metrics for the scoring pipeline
//!
//! # Metrics
//!
//! - `risk_decisions_total{decision}` - decisions by outcome
//! - `risk_score` - histogram of aggregate scores
//! - `risk_scoring_duration_seconds` - histogram of scoring latencies
//! - `risk_blocklist_size` - current blocklist size
//! - `risk_profile_cache_size` - cached user profiles

use std::sync::Arc;

use prometheus::{Histogram, HistogramOpts, IntCounterVec, IntGauge, Opts, Registry};

use crate::types::Decision;

/// Metrics collector for the risk engine
#[derive(Clone)]
pub struct EngineMetrics {
    /// Decisions by outcome
    pub decisions_total: IntCounterVec,

    /// Aggregate score distribution
    pub score: Histogram,

    /// Scoring latency distribution
    pub scoring_duration: Histogram,

    /// Current blocklist size
    pub blocklist_size: IntGauge,

    /// Cached profile count
    pub profile_cache_size: IntGauge,

    /// Prometheus registry
    pub registry: Arc<Registry>,
}

impl EngineMetrics {
    /// Create a collector with its own registry
    pub fn new() -> prometheus::Result<Self> {
        let registry = Arc::new(Registry::new());

        let decisions_total = IntCounterVec::new(
            Opts::new("risk_decisions_total", "Decisions by outcome"),
            &["decision"],
        )?;
        registry.register(Box::new(decisions_total.clone()))?;

        let score = Histogram::with_opts(
            HistogramOpts::new("risk_score", "Aggregate risk score distribution").buckets(vec![
                10.0, 20.0, 30.0, 40.0, 50.0, 60.0, 70.0, 80.0, 90.0, 100.0,
            ]),
        )?;
        registry.register(Box::new(score.clone()))?;

        let scoring_duration = Histogram::with_opts(
            HistogramOpts::new(
                "risk_scoring_duration_seconds",
                "Scoring latency distribution",
            )
            .buckets(vec![0.001, 0.005, 0.010, 0.050, 0.100, 0.500, 1.0, 2.0, 5.0]),
        )?;
        registry.register(Box::new(scoring_duration.clone()))?;

        let blocklist_size =
            IntGauge::new("risk_blocklist_size", "Current blocklist size")?;
        registry.register(Box::new(blocklist_size.clone()))?;

        let profile_cache_size =
            IntGauge::new("risk_profile_cache_size", "Cached user profiles")?;
        registry.register(Box::new(profile_cache_size.clone()))?;

        Ok(Self {
            decisions_total,
            score,
            scoring_duration,
            blocklist_size,
            profile_cache_size,
            registry,
        })
    }

    /// Record one completed scoring pass
    pub fn record_decision(&self, decision: Decision, score: u8, duration_seconds: f64) {
        self.decisions_total
            .with_label_values(&[decision.as_str()])
            .inc();
        self.score.observe(f64::from(score));
        self.scoring_duration.observe(duration_seconds);
    }

    /// Refresh the cache-size gauges
    pub fn update_cache_sizes(&self, blocklist: usize, profiles: usize) {
        self.blocklist_size.set(blocklist as i64);
        self.profile_cache_size.set(profiles as i64);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn metrics_creation() {
        let metrics = EngineMetrics::new().unwrap();
        assert_eq!(
            metrics
                .decisions_total
                .with_label_values(&["ALLOW"])
                .get(),
            0
        );
    }

    #[test]
    fn record_decision_increments_counter() {
        let metrics = EngineMetrics::new().unwrap();
        metrics.record_decision(Decision::Allow, 12, 0.002);
        metrics.record_decision(Decision::Block, 95, 0.004);
        metrics.record_decision(Decision::Allow, 30, 0.001);

        assert_eq!(
            metrics.decisions_total.with_label_values(&["ALLOW"]).get(),
            2
        );
        assert_eq!(
            metrics.decisions_total.with_label_values(&["BLOCK"]).get(),
            1
        );
    }

    #[test]
    fn gauges_track_cache_sizes() {
        let metrics = EngineMetrics::new().unwrap();
        metrics.update_cache_sizes(3, 17);
        assert_eq!(metrics.blocklist_size.get(), 3);
        assert_eq!(metrics.profile_cache_size.get(), 17);
    }

    #[test]
    fn separate_collectors_do_not_collide() {
        let first = EngineMetrics::new().unwrap();
        let second = EngineMetrics::new().unwrap();
        first.record_decision(Decision::Review, 75, 0.001);
        assert_eq!(
            second.decisions_total.with_label_values(&["REVIEW"]).get(),
            0
        );
    }
}
