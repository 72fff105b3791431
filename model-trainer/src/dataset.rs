//! Training dataset construction
//!
//! Turns stored transactions with terminal payment outcomes into labeled
//! feature vectors. A transaction is labeled fraudulent when it was blocked,
//! or when it was flagged for review and then failed.

use std::collections::HashMap;

use chrono::{DateTime, Timelike, Utc};
use rust_decimal::prelude::ToPrimitive;

use risk_engine::{PaymentOutcome, StoredTransaction};

/// Labeled samples required before a training run proceeds
pub const MIN_TRAINING_SAMPLES: usize = 100;

/// Features per sample: amount, hour-of-day, account age (days),
/// amount percentile within the set, user frequency within the set
pub const FEATURE_COUNT: usize = 5;

/// One labeled training sample
#[derive(Debug, Clone)]
pub struct LabeledSample {
    /// Feature vector
    pub features: [f64; FEATURE_COUNT],

    /// Fraud label derived from the payment outcome
    pub is_fraud: bool,

    /// When the underlying transaction happened (for chronological splits)
    pub occurred_at: DateTime<Utc>,
}

/// Fraud label for one transaction; `None` for non-terminal outcomes
fn label(tx: &StoredTransaction) -> Option<bool> {
    match tx.outcome {
        PaymentOutcome::Pending => None,
        PaymentOutcome::Blocked => Some(true),
        PaymentOutcome::Failed => Some(tx.review_required),
        PaymentOutcome::Paid => Some(false),
    }
}

/// Build labeled feature vectors from a window of stored transactions.
///
/// Non-terminal transactions are dropped. The percentile and frequency
/// features are computed within the training window itself. Samples come
/// back in chronological order.
pub fn build_dataset(transactions: &[StoredTransaction]) -> Vec<LabeledSample> {
    let labeled: Vec<(&StoredTransaction, bool)> = transactions
        .iter()
        .filter_map(|tx| label(tx).map(|is_fraud| (tx, is_fraud)))
        .collect();

    let mut amounts: Vec<f64> = labeled
        .iter()
        .map(|(tx, _)| tx.amount.to_f64().unwrap_or(0.0))
        .collect();
    amounts.sort_by(|a, b| a.total_cmp(b));

    let mut user_counts: HashMap<&str, usize> = HashMap::new();
    for (tx, _) in &labeled {
        *user_counts.entry(tx.user_id.as_str()).or_insert(0) += 1;
    }

    let total = labeled.len() as f64;
    let mut samples: Vec<LabeledSample> = labeled
        .iter()
        .map(|(tx, is_fraud)| {
            let amount = tx.amount.to_f64().unwrap_or(0.0);
            let rank = amounts.partition_point(|&a| a <= amount);
            let percentile = if total > 0.0 {
                rank as f64 / total * 100.0
            } else {
                0.0
            };
            let account_age_days =
                (tx.created_at - tx.account_created_at).num_days().max(0) as f64;
            let frequency = user_counts
                .get(tx.user_id.as_str())
                .copied()
                .unwrap_or(0) as f64;

            LabeledSample {
                features: [
                    amount,
                    f64::from(tx.created_at.hour()),
                    account_age_days,
                    percentile,
                    frequency,
                ],
                is_fraud: *is_fraud,
                occurred_at: tx.created_at,
            }
        })
        .collect();

    samples.sort_by_key(|s| s.occurred_at);
    samples
}

/// Split samples chronologically: the oldest `1 - holdout_fraction` train,
/// the newest `holdout_fraction` validate.
pub fn chronological_split(
    samples: Vec<LabeledSample>,
    holdout_fraction: f64,
) -> (Vec<LabeledSample>, Vec<LabeledSample>) {
    let holdout_fraction = holdout_fraction.clamp(0.0, 1.0);
    let train_len =
        ((samples.len() as f64) * (1.0 - holdout_fraction)).round() as usize;
    let train_len = train_len.min(samples.len());

    let mut train = samples;
    let holdout = train.split_off(train_len);
    (train, holdout)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use rust_decimal::Decimal;
    use uuid::Uuid;

    fn tx(
        user: &str,
        amount: u64,
        outcome: PaymentOutcome,
        review_required: bool,
        days_ago: i64,
    ) -> StoredTransaction {
        let now = Utc::now();
        StoredTransaction {
            transaction_id: Uuid::new_v4(),
            user_id: user.to_string(),
            counterparty_id: "p1".to_string(),
            amount: Decimal::from(amount),
            phone_number: "254700000001".to_string(),
            device_fingerprint: None,
            ip_address: "10.0.0.1".to_string(),
            session_type: "individual".to_string(),
            outcome,
            review_required,
            created_at: now - Duration::days(days_ago),
            account_created_at: now - Duration::days(days_ago + 30),
        }
    }

    #[test]
    fn labels_follow_outcomes() {
        assert_eq!(label(&tx("u", 100, PaymentOutcome::Blocked, false, 1)), Some(true));
        assert_eq!(label(&tx("u", 100, PaymentOutcome::Failed, true, 1)), Some(true));
        assert_eq!(label(&tx("u", 100, PaymentOutcome::Failed, false, 1)), Some(false));
        assert_eq!(label(&tx("u", 100, PaymentOutcome::Paid, false, 1)), Some(false));
        assert_eq!(label(&tx("u", 100, PaymentOutcome::Pending, true, 1)), None);
    }

    #[test]
    fn pending_transactions_are_dropped() {
        let transactions = vec![
            tx("u1", 100, PaymentOutcome::Paid, false, 3),
            tx("u1", 100, PaymentOutcome::Pending, false, 2),
            tx("u2", 100, PaymentOutcome::Blocked, false, 1),
        ];
        let samples = build_dataset(&transactions);
        assert_eq!(samples.len(), 2);
    }

    #[test]
    fn samples_are_chronological() {
        let transactions = vec![
            tx("u1", 100, PaymentOutcome::Paid, false, 1),
            tx("u2", 200, PaymentOutcome::Paid, false, 5),
            tx("u3", 300, PaymentOutcome::Paid, false, 3),
        ];
        let samples = build_dataset(&transactions);
        for pair in samples.windows(2) {
            assert!(pair[0].occurred_at <= pair[1].occurred_at);
        }
    }

    #[test]
    fn percentile_and_frequency_features() {
        let transactions = vec![
            tx("u1", 100, PaymentOutcome::Paid, false, 4),
            tx("u1", 200, PaymentOutcome::Paid, false, 3),
            tx("u2", 300, PaymentOutcome::Paid, false, 2),
            tx("u2", 400, PaymentOutcome::Paid, false, 1),
        ];
        let samples = build_dataset(&transactions);

        // Oldest sample is the 100 amount: lowest quartile
        assert!((samples[0].features[3] - 25.0).abs() < 1e-9);
        // Newest sample is the 400 amount: top of the set
        assert!((samples[3].features[3] - 100.0).abs() < 1e-9);
        // Both users appear twice in the window
        assert!((samples[0].features[4] - 2.0).abs() < 1e-9);
    }

    #[test]
    fn split_is_chronological_80_20() {
        let transactions: Vec<StoredTransaction> = (0..10)
            .map(|i| tx("u1", 100 + i as u64, PaymentOutcome::Paid, false, 10 - i))
            .collect();
        let samples = build_dataset(&transactions);
        let (train, holdout) = chronological_split(samples, 0.2);

        assert_eq!(train.len(), 8);
        assert_eq!(holdout.len(), 2);
        let newest_train = train.last().unwrap().occurred_at;
        assert!(holdout.iter().all(|s| s.occurred_at >= newest_train));
    }
}
