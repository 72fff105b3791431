//! Failed-payment velocity analyzer

use std::sync::Arc;

use chrono::{Duration, NaiveTime};

use crate::history::TransactionHistory;
use crate::types::{FactorOutcome, TransactionContext};
use crate::Result;

/// Trailing window for counting failed payments
const FAILURE_WINDOW_MINUTES: i64 = 10;

/// Distinct same-day counterparties above which a flat floor applies
const COUNTERPARTY_LIMIT: usize = 3;

/// Scores rapid payment failures and unusual counterparty spread
pub struct FrequencyAnalyzer {
    history: Arc<dyn TransactionHistory>,
}

impl FrequencyAnalyzer {
    /// Create the analyzer over the given history
    pub fn new(history: Arc<dyn TransactionHistory>) -> Self {
        Self { history }
    }

    /// Score the user's recent failure velocity
    pub fn evaluate(&self, ctx: &TransactionContext) -> Result<FactorOutcome> {
        let since = ctx.timestamp - Duration::minutes(FAILURE_WINDOW_MINUTES);
        let failures = self.history.failed_payment_count(&ctx.user_id, since)?;

        let mut outcome = if failures >= 3 {
            FactorOutcome::with_reason(
                90,
                format!("{} failed payments within 10 minutes", failures),
            )
        } else if failures == 2 {
            FactorOutcome::with_reason(60, "2 failed payments within 10 minutes")
        } else {
            FactorOutcome::score(((failures as u64 * 15).min(30)) as u8)
        };

        let midnight = ctx.timestamp.date_naive().and_time(NaiveTime::MIN).and_utc();
        let counterparties = self
            .history
            .distinct_counterparties_since(&ctx.user_id, midnight)?;
        if counterparties > COUNTERPARTY_LIMIT {
            outcome.score = outcome.score.max(50);
            outcome.reasons.push(format!(
                "{} distinct counterparties booked today",
                counterparties
            ));
        }

        Ok(outcome)
    }
}
