//! The training job
//!
//! A singleton background task: one in-process flag guards against
//! overlapping runs (rejected outright, never queued), and a drop guard
//! releases the flag on every exit path, including panics. A run moves
//! Idle -> Training -> {Deployed | Rejected} -> Idle; only the deployment
//! gate decides whether the engine's reported metrics change.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use audit_log::{AuditKind, AuditSink};
use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use risk_engine::{ModelSnapshot, ModelStatus, TransactionHistory};

use crate::dataset::{build_dataset, chronological_split, MIN_TRAINING_SAMPLES};
use crate::error::{Error, Result};
use crate::logistic::{LogisticModel, TrainingParams};
use crate::report::TrainingReport;
use crate::validation::evaluate;

/// Trainer configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainerConfig {
    /// Days of history pulled per run
    pub window_days: i64,

    /// Labeled samples required before training proceeds
    pub min_samples: usize,

    /// Gradient descent hyperparameters
    pub params: TrainingParams,

    /// Fraction of samples held out for validation
    pub holdout_fraction: f64,

    /// Precision/recall/F1 floor for deployment
    pub deploy_threshold: f64,
}

impl Default for TrainerConfig {
    fn default() -> Self {
        Self {
            window_days: 90,
            min_samples: MIN_TRAINING_SAMPLES,
            params: TrainingParams::default(),
            holdout_fraction: 0.2,
            deploy_threshold: 0.85,
        }
    }
}

/// Observable trainer state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrainerState {
    /// No run in progress
    Idle,
    /// A run holds the guard
    Training,
}

/// How one run ended
#[derive(Debug, Clone)]
pub enum TrainingOutcome {
    /// Passed the gate; metrics published
    Deployed(TrainingReport),

    /// Failed the gate; previous metrics remain authoritative
    Rejected(TrainingReport),

    /// Too few labeled samples; nothing changed
    Skipped {
        /// How many labeled samples the window held
        samples: usize,
    },
}

/// Releases the running flag however the run exits
struct RunGuard<'a>(&'a AtomicBool);

impl Drop for RunGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// Offline model trainer
pub struct ModelTrainer {
    config: TrainerConfig,
    history: Arc<dyn TransactionHistory>,
    status: Arc<ModelStatus>,
    audit: Arc<dyn AuditSink>,
    running: AtomicBool,
    deployments: AtomicU64,
}

impl ModelTrainer {
    /// Build the trainer over the shared history, model status, and audit sink
    pub fn new(
        config: TrainerConfig,
        history: Arc<dyn TransactionHistory>,
        status: Arc<ModelStatus>,
        audit: Arc<dyn AuditSink>,
    ) -> Self {
        Self {
            config,
            history,
            status,
            audit,
            running: AtomicBool::new(false),
            deployments: AtomicU64::new(0),
        }
    }

    /// Current trainer state
    pub fn state(&self) -> TrainerState {
        if self.running.load(Ordering::SeqCst) {
            TrainerState::Training
        } else {
            TrainerState::Idle
        }
    }

    /// Execute one training run.
    ///
    /// Rejects immediately with [`Error::TrainingInProgress`] if another run
    /// holds the guard. Internal failures are audited as failed runs before
    /// being returned; in every case the guard is released.
    pub fn run_once(&self) -> Result<TrainingOutcome> {
        if self
            .running
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            warn!("training run rejected: another run is in progress");
            return Err(Error::TrainingInProgress);
        }
        let _guard = RunGuard(&self.running);

        info!(window_days = self.config.window_days, "training run started");
        let result = self.execute();

        if let Err(e) = &result {
            error!(error = %e, "training run failed");
            self.append_audit(
                AuditKind::TrainingFailed,
                serde_json::json!({ "error": e.to_string() }),
            );
        }

        result
    }

    fn execute(&self) -> Result<TrainingOutcome> {
        let now = Utc::now();
        let from = now - Duration::days(self.config.window_days);
        let transactions = self.history.transactions_in_range(from, now)?;

        let samples = build_dataset(&transactions);
        if samples.len() < self.config.min_samples {
            info!(
                samples = samples.len(),
                required = self.config.min_samples,
                "insufficient labeled samples, skipping training run"
            );
            self.append_audit(
                AuditKind::TrainingSkipped,
                serde_json::json!({
                    "samples": samples.len(),
                    "required": self.config.min_samples,
                }),
            );
            return Ok(TrainingOutcome::Skipped {
                samples: samples.len(),
            });
        }

        let sample_count = samples.len();
        let (train_set, holdout) = chronological_split(samples, self.config.holdout_fraction);

        let model = LogisticModel::train(&train_set, self.config.params);
        let metrics = evaluate(&model, &holdout);

        let version = format!("model-v{}", self.deployments.load(Ordering::SeqCst) + 1);
        let previous_metrics = self.status.metrics();
        let deployed = metrics.meets_threshold(self.config.deploy_threshold);

        let report = TrainingReport {
            version: version.clone(),
            trained_at: now,
            sample_count,
            training_count: train_set.len(),
            validation_count: holdout.len(),
            metrics,
            previous_metrics,
            deployed,
            recommendations: TrainingReport::recommendations_for(&metrics),
        };

        let report_detail = serde_json::to_value(&report)
            .unwrap_or_else(|_| serde_json::json!({ "version": version }));

        if deployed {
            let snapshot = ModelSnapshot {
                version: version.clone(),
                weights: model.weights.to_vec(),
                bias: model.bias,
                trained_at: now,
                metrics,
            };
            self.status.publish(&snapshot);
            self.deployments.fetch_add(1, Ordering::SeqCst);

            info!(version = %version, precision = metrics.precision,
                recall = metrics.recall, f1 = metrics.f1, "model deployed");
            self.append_audit(AuditKind::TrainingDeployed, report_detail);
            Ok(TrainingOutcome::Deployed(report))
        } else {
            // Degradation alert: the gate failed, previous metrics stand.
            error!(version = %version, precision = metrics.precision,
                recall = metrics.recall, f1 = metrics.f1,
                threshold = self.config.deploy_threshold,
                "model performance degradation: run rejected");
            self.append_audit(AuditKind::TrainingRejected, report_detail);
            Ok(TrainingOutcome::Rejected(report))
        }
    }

    fn append_audit(&self, kind: AuditKind, detail: serde_json::Value) {
        if let Err(e) = self.audit.append(kind, "model-trainer", detail) {
            error!(error = %e, "failed to append training audit record");
        }
    }
}
