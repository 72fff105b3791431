//! End-to-end demo: seed synthetic history, score a batch of payment
//! attempts, run one training pass, and print the engine snapshot plus the
//! training report.
//!
//! ```text
//! RUST_LOG=info cargo run --bin simulate
//! ```

use std::sync::Arc;

use anyhow::Result;
use chrono::{Duration, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rust_decimal::Decimal;
use tracing::info;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

use audit_log::HashChainLog;
use model_trainer::{ModelTrainer, TrainerConfig, TrainingOutcome};
use risk_engine::{
    InMemoryHistory, InMemorySessions, PaymentOutcome, RiskConfig, RiskEngine, StoredTransaction,
    TransactionContext,
};

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let mut rng = StdRng::seed_from_u64(7);

    let history = Arc::new(InMemoryHistory::new());
    seed_history(&history, &mut rng);
    info!(transactions = history.len(), "synthetic history seeded");

    let audit = Arc::new(HashChainLog::in_memory());
    let engine = RiskEngine::new(
        RiskConfig::default(),
        history.clone(),
        Arc::new(InMemorySessions::new()),
        audit.clone(),
    )?;

    // Score a few representative payment attempts
    for (label, ctx) in scenarios(&mut rng) {
        let analysis = engine.analyze(&ctx);
        println!(
            "{label:<28} score={:>3} decision={:<6} reasons={:?}",
            analysis.score.value(),
            analysis.decision.as_str(),
            analysis.reasons
        );
    }

    // One offline training pass over the same history
    let trainer = ModelTrainer::new(
        TrainerConfig::default(),
        history,
        engine.model_status(),
        audit.clone(),
    );
    match trainer.run_once()? {
        TrainingOutcome::Deployed(report) | TrainingOutcome::Rejected(report) => {
            println!("\n{}", report.render());
        }
        TrainingOutcome::Skipped { samples } => {
            println!("\nTraining skipped: only {} labeled samples", samples);
        }
    }

    println!(
        "Engine snapshot:\n{}",
        serde_json::to_string_pretty(&engine.snapshot())?
    );

    audit.verify_integrity()?;
    println!("Audit chain intact: {} records", audit.len());

    Ok(())
}

/// Ninety days of mostly legitimate payments with a fraud cluster
fn seed_history(history: &InMemoryHistory, rng: &mut StdRng) {
    let now = Utc::now();

    for i in 0..400u32 {
        let user = format!("user-{}", i % 40);
        let fraudulent = i % 8 == 0;
        let minutes_ago = rng.gen_range(60..(90 * 24 * 60));
        let created_at = now - Duration::minutes(minutes_ago);

        let (amount, outcome, review_required, account_age_days) = if fraudulent {
            (
                rng.gen_range(40_000..80_000),
                PaymentOutcome::Blocked,
                true,
                rng.gen_range(0..5),
            )
        } else {
            (
                rng.gen_range(1_500..4_000),
                PaymentOutcome::Paid,
                false,
                rng.gen_range(90..800),
            )
        };

        history.record(StoredTransaction {
            transaction_id: Uuid::new_v4(),
            user_id: user.clone(),
            counterparty_id: format!("provider-{}", i % 12),
            amount: Decimal::from(amount),
            phone_number: format!("2547{:08}", i),
            device_fingerprint: Some(format!("device-{}", i % 60)),
            ip_address: format!("41.90.{}.{}", i % 250, (i * 7) % 250),
            session_type: "individual".to_string(),
            outcome,
            review_required,
            created_at,
            account_created_at: created_at - Duration::days(account_age_days),
        });
    }
}

fn scenarios(rng: &mut StdRng) -> Vec<(&'static str, TransactionContext)> {
    let now = Utc::now();
    let base = TransactionContext {
        user_id: "user-1".to_string(),
        session_id: Uuid::new_v4(),
        amount: Decimal::from(2_500),
        phone_number: "254700000001".to_string(),
        device_fingerprint: Some("device-1".to_string()),
        ip_address: "41.90.10.10".to_string(),
        session_type: "individual".to_string(),
        timestamp: now,
    };

    let mut oversized = base.clone();
    oversized.user_id = "user-2".to_string();
    oversized.amount = Decimal::from(65_000);

    let mut night_owl = base.clone();
    night_owl.user_id = "user-3".to_string();
    night_owl.timestamp = now
        .date_naive()
        .and_hms_opt(3, 0, 0)
        .map(|t| t.and_utc())
        .unwrap_or(now);

    let mut no_device = base.clone();
    no_device.user_id = format!("guest-{}", rng.gen_range(1000..9999));
    no_device.device_fingerprint = None;

    vec![
        ("typical payment", base),
        ("oversized amount", oversized),
        ("3am payment", night_owl),
        ("new user, no fingerprint", no_device),
    ]
}
