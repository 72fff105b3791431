//! Reported model state
//!
//! The trainer runs as a shadow model: it publishes a version string and
//! validation metrics into `ModelStatus`, which the engine reports through
//! its metrics surface and stamps onto every `RiskAnalysis`. The trained
//! weights are retained on the snapshot but are never wired into the live
//! aggregator weights.

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

/// Quality metrics from a validation run on held-out data
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ValidationMetrics {
    /// True positives over predicted positives
    pub precision: f64,

    /// True positives over actual positives
    pub recall: f64,

    /// Harmonic mean of precision and recall
    pub f1: f64,

    /// False positives over actual negatives
    pub false_positive_rate: f64,

    /// Correct predictions over all predictions
    pub accuracy: f64,
}

impl ValidationMetrics {
    /// Whether precision, recall and F1 all meet the deployment threshold
    pub fn meets_threshold(&self, threshold: f64) -> bool {
        self.precision >= threshold && self.recall >= threshold && self.f1 >= threshold
    }
}

/// One trained model: weights plus the metrics that qualified it
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelSnapshot {
    /// Version string (e.g. "model-v3")
    pub version: String,

    /// Trained feature weights
    pub weights: Vec<f64>,

    /// Trained bias term
    pub bias: f64,

    /// When training finished
    pub trained_at: DateTime<Utc>,

    /// Metrics on the held-out validation split
    pub metrics: ValidationMetrics,
}

struct StatusInner {
    version: String,
    metrics: Option<ValidationMetrics>,
    trained_at: Option<DateTime<Utc>>,
}

/// Shared handle to the currently reported model
///
/// The engine reads it on every scoring pass; the trainer writes it only
/// when a run passes the deployment gate.
pub struct ModelStatus {
    inner: RwLock<StatusInner>,
}

impl ModelStatus {
    /// Create a status reporting the given initial version and no metrics
    pub fn new(initial_version: impl Into<String>) -> Self {
        Self {
            inner: RwLock::new(StatusInner {
                version: initial_version.into(),
                metrics: None,
                trained_at: None,
            }),
        }
    }

    /// Currently reported model version
    pub fn version(&self) -> String {
        self.inner.read().version.clone()
    }

    /// Last validated metrics, if any run has ever deployed
    pub fn metrics(&self) -> Option<ValidationMetrics> {
        self.inner.read().metrics
    }

    /// When the reported model was trained, if ever
    pub fn trained_at(&self) -> Option<DateTime<Utc>> {
        self.inner.read().trained_at
    }

    /// Replace the reported version and metrics with a deployed snapshot.
    ///
    /// Only the version and metrics are published; the snapshot's weights
    /// stay with the trainer.
    pub fn publish(&self, snapshot: &ModelSnapshot) {
        let mut inner = self.inner.write();
        inner.version = snapshot.version.clone();
        inner.metrics = Some(snapshot.metrics);
        inner.trained_at = Some(snapshot.trained_at);
    }
}
