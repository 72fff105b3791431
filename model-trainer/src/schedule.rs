//! Interval schedule for training runs
//!
//! A thin tokio loop that drives [`ModelTrainer::run_once`] on a fixed
//! period. Failures (including rejected overlapping runs) are logged and
//! the loop keeps going; the external cron owner can also trigger runs
//! directly through the trainer handle.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::MissedTickBehavior;
use tracing::{error, info, warn};

use crate::trainer::{ModelTrainer, TrainingOutcome};

/// Recurring training schedule
#[derive(Debug, Clone, Copy)]
pub struct TrainingSchedule {
    interval: Duration,
}

impl TrainingSchedule {
    /// Schedule with a custom period
    pub fn new(interval: Duration) -> Self {
        Self { interval }
    }

    /// The default weekly cadence
    pub fn weekly() -> Self {
        Self::new(Duration::from_secs(7 * 24 * 60 * 60))
    }

    /// Configured period
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Run the schedule loop forever.
    ///
    /// The first run fires immediately, then once per interval. Training is
    /// CPU-bound, so each run executes on the blocking pool.
    pub async fn run(self, trainer: Arc<ModelTrainer>) {
        info!(interval_secs = self.interval.as_secs(), "training schedule started");

        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;

            let trainer = trainer.clone();
            match tokio::task::spawn_blocking(move || trainer.run_once()).await {
                Ok(Ok(TrainingOutcome::Deployed(report))) => {
                    info!(version = %report.version, "scheduled training deployed a model");
                }
                Ok(Ok(TrainingOutcome::Rejected(report))) => {
                    warn!(version = %report.version, "scheduled training rejected a model");
                }
                Ok(Ok(TrainingOutcome::Skipped { samples })) => {
                    info!(samples, "scheduled training skipped: insufficient data");
                }
                Ok(Err(e)) => {
                    warn!(error = %e, "scheduled training run failed");
                }
                Err(e) => {
                    error!(error = %e, "training task panicked");
                }
            }
        }
    }
}
