//! Device fingerprint analyzer

use std::sync::Arc;

use crate::history::TransactionHistory;
use crate::profile::UserRiskProfile;
use crate::types::{FactorOutcome, TransactionContext};
use crate::Result;

/// Distinct users above which a shared fingerprint is suspect
const SHARED_DEVICE_LIMIT: usize = 5;

/// Scores the reputation of the client's device fingerprint
pub struct DeviceFingerprintAnalyzer {
    history: Arc<dyn TransactionHistory>,
}

impl DeviceFingerprintAnalyzer {
    /// Create the analyzer over the given history
    pub fn new(history: Arc<dyn TransactionHistory>) -> Self {
        Self { history }
    }

    /// Score the transaction's device fingerprint
    pub fn evaluate(
        &self,
        ctx: &TransactionContext,
        profile: Option<&UserRiskProfile>,
    ) -> Result<FactorOutcome> {
        let fingerprint = match &ctx.device_fingerprint {
            Some(fp) => fp,
            None => {
                return Ok(FactorOutcome::with_reason(
                    40,
                    "no device fingerprint supplied",
                ))
            }
        };

        let known = profile
            .map(|p| p.known_devices.contains(fingerprint))
            .unwrap_or(false);
        if !known {
            return Ok(FactorOutcome::with_reason(
                50,
                "device not previously used by this user",
            ));
        }

        let shared_users = self.history.device_user_count(fingerprint)?;
        if shared_users > SHARED_DEVICE_LIMIT {
            return Ok(FactorOutcome::with_reason(
                70,
                format!("device shared across {} users", shared_users),
            ));
        }

        Ok(FactorOutcome::score(
            ((shared_users as u64) * 8).min(40) as u8,
        ))
    }
}
