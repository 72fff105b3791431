//! Property-based tests for scoring invariants
//!
//! - Aggregate score is always within [0, 100]
//! - Decision is a pure function of the aggregate score
//! - The weighting function is deterministic for identical inputs

use std::sync::Arc;

use audit_log::HashChainLog;
use chrono::{TimeZone, Utc};
use proptest::prelude::*;
use rust_decimal::Decimal;
use uuid::Uuid;

use risk_engine::{
    Decision, FactorScores, FactorWeights, InMemoryHistory, InMemorySessions, RiskConfig,
    RiskEngine, TransactionContext,
};

fn fresh_engine() -> RiskEngine {
    RiskEngine::new(
        RiskConfig::default(),
        Arc::new(InMemoryHistory::new()),
        Arc::new(InMemorySessions::new()),
        Arc::new(HashChainLog::in_memory()),
    )
    .unwrap()
}

/// Strategy for well-formed transaction contexts
fn context_strategy() -> impl Strategy<Value = TransactionContext> {
    (
        "[a-z]{4,12}",
        1u64..500_000_000,
        "2547[0-9]{8}",
        proptest::option::of("[a-f0-9]{12}"),
        (0u8..=255u8, 0u8..=255u8, 0u8..=255u8, 0u8..=255u8),
        prop_oneof![Just("individual"), Just("group"), Just("workshop")],
        0u32..24,
    )
        .prop_map(
            |(user_id, cents, phone, fingerprint, (a, b, c, d), session, hour)| {
                TransactionContext {
                    user_id,
                    session_id: Uuid::new_v4(),
                    amount: Decimal::new(cents as i64, 2),
                    phone_number: phone,
                    device_fingerprint: fingerprint,
                    ip_address: format!("{}.{}.{}.{}", a, b, c, d),
                    session_type: session.to_string(),
                    timestamp: Utc.with_ymd_and_hms(2024, 6, 15, hour, 30, 0).unwrap(),
                }
            },
        )
}

/// Strategy for arbitrary factor score combinations
fn factor_scores_strategy() -> impl Strategy<Value = FactorScores> {
    (
        0u8..=100,
        0u8..=100,
        0u8..=100,
        0u8..=100,
        0u8..=100,
        0u8..=100,
    )
        .prop_map(
            |(amount, time, frequency, device, behavior, external)| FactorScores {
                amount_deviation: amount,
                time_pattern: time,
                frequency,
                device_fingerprint: device,
                behavior_history: behavior,
                external_database: external,
            },
        )
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Property: every well-formed context scores within [0, 100] and the
    /// decision follows the documented threshold bands
    #[test]
    fn prop_score_bounded_and_decision_deterministic(ctx in context_strategy()) {
        let engine = fresh_engine();
        let analysis = engine.analyze(&ctx);

        let score = analysis.score.value();
        prop_assert!(score <= 100);

        let expected = if score >= 90 {
            Decision::Block
        } else if score >= 70 {
            Decision::Review
        } else {
            Decision::Allow
        };
        prop_assert_eq!(analysis.decision, expected);
    }

    /// Property: scoring the same context against an identical fresh store
    /// yields identical results
    #[test]
    fn prop_identical_inputs_identical_scores(ctx in context_strategy()) {
        let first = fresh_engine().analyze(&ctx);
        let second = fresh_engine().analyze(&ctx);

        prop_assert_eq!(first.score, second.score);
        prop_assert_eq!(first.decision, second.decision);
        prop_assert_eq!(first.factors, second.factors);
    }

    /// Property: the weighting function is pure and bounded
    #[test]
    fn prop_aggregator_pure_and_bounded(factors in factor_scores_strategy()) {
        let weights = FactorWeights::default();
        let first = weights.aggregate(&factors);
        let second = weights.aggregate(&factors);

        prop_assert_eq!(first, second);
        prop_assert!(first.value() <= 100);
    }

    /// Property: a blocklisted phone always yields exactly score 100 / block
    #[test]
    fn prop_blocklisted_phone_always_blocks(ctx in context_strategy()) {
        let engine = fresh_engine();
        engine.add_to_blocklist(&ctx.phone_number);

        let analysis = engine.analyze(&ctx);
        prop_assert_eq!(analysis.score.value(), 100);
        prop_assert_eq!(analysis.decision, Decision::Block);
    }
}
