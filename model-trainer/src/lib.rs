//! Offline model training for the risk engine
//!
//! Periodically rebuilds a logistic-regression fraud classifier from labeled
//! payment outcomes, validates it on a chronological holdout, and publishes
//! version + metrics into the running engine when the deployment gate
//! passes. The trained model is a shadow: it monitors quality and never
//! replaces the engine's rule-based factor weights.

#![forbid(unsafe_code)]

pub mod dataset;
pub mod error;
pub mod logistic;
pub mod report;
pub mod schedule;
pub mod trainer;
pub mod validation;

pub use dataset::{build_dataset, chronological_split, LabeledSample, MIN_TRAINING_SAMPLES};
pub use error::{Error, Result};
pub use logistic::{LogisticModel, TrainingParams};
pub use report::TrainingReport;
pub use schedule::TrainingSchedule;
pub use trainer::{ModelTrainer, TrainerConfig, TrainerState, TrainingOutcome};
