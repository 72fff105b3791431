//! Behavioral consistency analyzer

use crate::profile::{location_key, UserRiskProfile};
use crate::types::{FactorOutcome, TransactionContext};
use crate::Result;

/// Conservative default for users without a profile
const NEW_USER_SCORE: u8 = 25;

/// Added when the session type is outside the user's preferred set
const UNFAMILIAR_SESSION_SCORE: u8 = 20;

/// Added when the IP-derived location is outside the user's known set
const UNFAMILIAR_LOCATION_SCORE: u8 = 30;

/// Upper bound on the combined behavioral score
const SCORE_CAP: u8 = 80;

/// Scores how consistent a transaction is with the user's own habits
///
/// Reads a profile snapshot only; the engine folds the transaction into the
/// profile after scoring, so a transaction never raises its own risk.
#[derive(Debug, Default)]
pub struct BehaviorAnalyzer;

impl BehaviorAnalyzer {
    /// Create the analyzer
    pub fn new() -> Self {
        Self
    }

    /// Score the transaction against the user's behavioral profile
    pub fn evaluate(
        &self,
        ctx: &TransactionContext,
        profile: Option<&UserRiskProfile>,
    ) -> Result<FactorOutcome> {
        let profile = match profile {
            Some(p) => p,
            None => {
                return Ok(FactorOutcome::with_reason(
                    NEW_USER_SCORE,
                    "no behavioral history for user",
                ))
            }
        };

        let mut outcome = FactorOutcome::score(0);

        if !profile.preferred_session_types.contains(&ctx.session_type) {
            outcome.score += UNFAMILIAR_SESSION_SCORE;
            outcome
                .reasons
                .push(format!("unfamiliar session type '{}'", ctx.session_type));
        }

        if !profile
            .known_locations
            .contains(&location_key(&ctx.ip_address))
        {
            outcome.score += UNFAMILIAR_LOCATION_SCORE;
            outcome.reasons.push("payment from unfamiliar location".to_string());
        }

        outcome.score = outcome.score.min(SCORE_CAP);
        Ok(outcome)
    }
}
