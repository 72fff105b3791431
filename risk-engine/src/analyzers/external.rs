//! External blocklist and fraud-pattern analyzer

use std::sync::Arc;

use regex::Regex;
use tracing::warn;

use crate::blocklist::Blocklist;
use crate::types::{FactorOutcome, TransactionContext};
use crate::Result;

/// Phone number shapes observed in past fraud campaigns
const FRAUD_PATTERNS: &[&str] = &[
    // Single digit repeated through the whole number
    r"^(?:0{9,}|1{9,}|2{9,}|3{9,}|4{9,}|5{9,}|6{9,}|7{9,}|8{9,}|9{9,})$",
    // Retired carrier test range, only seen in replayed payloads
    r"^254999\d{6}$",
    // International premium-rate prefixes
    r"^(?:\+?1900|\+?979)\d+$",
];

/// Checks the payer against the blocklist and known fraud patterns
///
/// Lookup failures contribute 0 (fail open): an unreachable reference
/// source must never block the payment path.
pub struct ExternalCheckAnalyzer {
    blocklist: Arc<Blocklist>,
    patterns: Vec<Regex>,
}

impl ExternalCheckAnalyzer {
    /// Create the analyzer over the shared blocklist
    pub fn new(blocklist: Arc<Blocklist>) -> Self {
        let patterns = FRAUD_PATTERNS
            .iter()
            .filter_map(|pattern| match Regex::new(pattern) {
                Ok(re) => Some(re),
                Err(e) => {
                    warn!(pattern, error = %e, "skipping unparseable fraud pattern");
                    None
                }
            })
            .collect();

        Self { blocklist, patterns }
    }

    /// Score the payer's phone number against external references
    pub fn evaluate(&self, ctx: &TransactionContext) -> Result<FactorOutcome> {
        if self.blocklist.is_blocked(&ctx.phone_number) {
            return Ok(FactorOutcome::with_reason(
                100,
                "phone number is blocklisted",
            ));
        }

        if self
            .patterns
            .iter()
            .any(|re| re.is_match(&ctx.phone_number))
        {
            return Ok(FactorOutcome::with_reason(
                80,
                "phone number matches known fraud pattern",
            ));
        }

        Ok(FactorOutcome::score(0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rust_decimal::Decimal;
    use uuid::Uuid;

    fn ctx(phone: &str) -> TransactionContext {
        TransactionContext {
            user_id: "u1".to_string(),
            session_id: Uuid::new_v4(),
            amount: Decimal::from(2_500),
            phone_number: phone.to_string(),
            device_fingerprint: None,
            ip_address: "10.0.0.1".to_string(),
            session_type: "individual".to_string(),
            timestamp: Utc::now(),
        }
    }

    #[test]
    fn blocklisted_phone_scores_100() {
        let blocklist = Arc::new(Blocklist::new());
        blocklist.add("254700000001");

        let analyzer = ExternalCheckAnalyzer::new(blocklist);
        let outcome = analyzer.evaluate(&ctx("254700000001")).unwrap();
        assert_eq!(outcome.score, 100);
    }

    #[test]
    fn fraud_pattern_scores_80() {
        let analyzer = ExternalCheckAnalyzer::new(Arc::new(Blocklist::new()));

        assert_eq!(analyzer.evaluate(&ctx("777777777")).unwrap().score, 80);
        assert_eq!(analyzer.evaluate(&ctx("254999123456")).unwrap().score, 80);
        assert_eq!(analyzer.evaluate(&ctx("1900555123")).unwrap().score, 80);
    }

    #[test]
    fn clean_phone_scores_zero() {
        let analyzer = ExternalCheckAnalyzer::new(Arc::new(Blocklist::new()));
        assert_eq!(analyzer.evaluate(&ctx("254700000001")).unwrap().score, 0);
    }

    #[test]
    fn blocklist_takes_precedence_over_patterns() {
        let blocklist = Arc::new(Blocklist::new());
        blocklist.add("777777777");

        let analyzer = ExternalCheckAnalyzer::new(blocklist);
        assert_eq!(analyzer.evaluate(&ctx("777777777")).unwrap().score, 100);
    }
}
