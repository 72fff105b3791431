//! Read-only access to historical transactions
//!
//! The engine and the trainer only ever read transaction history; storage is
//! owned by the surrounding system. Reads are eventually consistent and
//! stale results are tolerated by every caller.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;

use crate::types::{PaymentOutcome, StoredTransaction};
use crate::Result;

/// Read-only query interface over stored transactions
pub trait TransactionHistory: Send + Sync {
    /// All transactions created in `[from, to)`, oldest first
    fn transactions_in_range(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<StoredTransaction>>;

    /// A user's transactions created at or after `since`, oldest first
    fn user_transactions_since(
        &self,
        user_id: &str,
        since: DateTime<Utc>,
    ) -> Result<Vec<StoredTransaction>>;

    /// A user's paid transactions, oldest first
    fn paid_transactions(&self, user_id: &str) -> Result<Vec<StoredTransaction>>;

    /// Count of a user's failed payments at or after `since`
    fn failed_payment_count(&self, user_id: &str, since: DateTime<Utc>) -> Result<usize>;

    /// Number of distinct counterparties the user transacted with at or
    /// after `since`
    fn distinct_counterparties_since(&self, user_id: &str, since: DateTime<Utc>)
        -> Result<usize>;

    /// Number of distinct users that have transacted with the given device
    /// fingerprint
    fn device_user_count(&self, fingerprint: &str) -> Result<usize>;
}

/// In-memory history backing tests and the demo
#[derive(Default)]
pub struct InMemoryHistory {
    rows: RwLock<Vec<StoredTransaction>>,
}

impl InMemoryHistory {
    /// Create an empty history
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one transaction
    pub fn record(&self, transaction: StoredTransaction) {
        self.rows.write().push(transaction);
    }

    /// Total number of stored transactions
    pub fn len(&self) -> usize {
        self.rows.read().len()
    }

    /// True when no transactions are stored
    pub fn is_empty(&self) -> bool {
        self.rows.read().is_empty()
    }
}

impl TransactionHistory for InMemoryHistory {
    fn transactions_in_range(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<StoredTransaction>> {
        let mut rows: Vec<StoredTransaction> = self
            .rows
            .read()
            .iter()
            .filter(|t| t.created_at >= from && t.created_at < to)
            .cloned()
            .collect();
        rows.sort_by_key(|t| t.created_at);
        Ok(rows)
    }

    fn user_transactions_since(
        &self,
        user_id: &str,
        since: DateTime<Utc>,
    ) -> Result<Vec<StoredTransaction>> {
        let mut rows: Vec<StoredTransaction> = self
            .rows
            .read()
            .iter()
            .filter(|t| t.user_id == user_id && t.created_at >= since)
            .cloned()
            .collect();
        rows.sort_by_key(|t| t.created_at);
        Ok(rows)
    }

    fn paid_transactions(&self, user_id: &str) -> Result<Vec<StoredTransaction>> {
        let mut rows: Vec<StoredTransaction> = self
            .rows
            .read()
            .iter()
            .filter(|t| t.user_id == user_id && t.outcome == PaymentOutcome::Paid)
            .cloned()
            .collect();
        rows.sort_by_key(|t| t.created_at);
        Ok(rows)
    }

    fn failed_payment_count(&self, user_id: &str, since: DateTime<Utc>) -> Result<usize> {
        Ok(self
            .rows
            .read()
            .iter()
            .filter(|t| {
                t.user_id == user_id
                    && t.outcome == PaymentOutcome::Failed
                    && t.created_at >= since
            })
            .count())
    }

    fn distinct_counterparties_since(
        &self,
        user_id: &str,
        since: DateTime<Utc>,
    ) -> Result<usize> {
        let rows = self.rows.read();
        let counterparties: HashSet<&str> = rows
            .iter()
            .filter(|t| t.user_id == user_id && t.created_at >= since)
            .map(|t| t.counterparty_id.as_str())
            .collect();
        Ok(counterparties.len())
    }

    fn device_user_count(&self, fingerprint: &str) -> Result<usize> {
        let rows = self.rows.read();
        let users: HashSet<&str> = rows
            .iter()
            .filter(|t| t.device_fingerprint.as_deref() == Some(fingerprint))
            .map(|t| t.user_id.as_str())
            .collect();
        Ok(users.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use rust_decimal::Decimal;
    use uuid::Uuid;

    fn tx(user: &str, outcome: PaymentOutcome, minutes_ago: i64) -> StoredTransaction {
        let now = Utc::now();
        StoredTransaction {
            transaction_id: Uuid::new_v4(),
            user_id: user.to_string(),
            counterparty_id: "provider-1".to_string(),
            amount: Decimal::from(2_500),
            phone_number: "254700000001".to_string(),
            device_fingerprint: Some("dev-a".to_string()),
            ip_address: "10.0.0.1".to_string(),
            session_type: "individual".to_string(),
            outcome,
            review_required: false,
            created_at: now - Duration::minutes(minutes_ago),
            account_created_at: now - Duration::days(90),
        }
    }

    #[test]
    fn failed_count_respects_window() {
        let history = InMemoryHistory::new();
        history.record(tx("u1", PaymentOutcome::Failed, 2));
        history.record(tx("u1", PaymentOutcome::Failed, 5));
        history.record(tx("u1", PaymentOutcome::Failed, 60));
        history.record(tx("u2", PaymentOutcome::Failed, 2));

        let since = Utc::now() - Duration::minutes(10);
        assert_eq!(history.failed_payment_count("u1", since).unwrap(), 2);
    }

    #[test]
    fn paid_transactions_filters_outcome() {
        let history = InMemoryHistory::new();
        history.record(tx("u1", PaymentOutcome::Paid, 10));
        history.record(tx("u1", PaymentOutcome::Failed, 5));
        history.record(tx("u1", PaymentOutcome::Paid, 1));

        let paid = history.paid_transactions("u1").unwrap();
        assert_eq!(paid.len(), 2);
        // Oldest first
        assert!(paid[0].created_at < paid[1].created_at);
    }

    #[test]
    fn device_user_count_is_distinct() {
        let history = InMemoryHistory::new();
        history.record(tx("u1", PaymentOutcome::Paid, 1));
        history.record(tx("u1", PaymentOutcome::Paid, 2));
        history.record(tx("u2", PaymentOutcome::Paid, 3));

        assert_eq!(history.device_user_count("dev-a").unwrap(), 2);
        assert_eq!(history.device_user_count("dev-unknown").unwrap(), 0);
    }

    #[test]
    fn distinct_counterparties_counts_unique() {
        let history = InMemoryHistory::new();
        let mut a = tx("u1", PaymentOutcome::Paid, 1);
        a.counterparty_id = "p1".to_string();
        let mut b = tx("u1", PaymentOutcome::Paid, 2);
        b.counterparty_id = "p2".to_string();
        let mut c = tx("u1", PaymentOutcome::Paid, 3);
        c.counterparty_id = "p1".to_string();
        history.record(a);
        history.record(b);
        history.record(c);

        let since = Utc::now() - Duration::hours(1);
        assert_eq!(history.distinct_counterparties_since("u1", since).unwrap(), 2);
    }
}
