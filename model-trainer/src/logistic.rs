//! From-scratch logistic regression
//!
//! A plain batch gradient-descent loop over the full feature set,
//! O(epochs * samples * features). Features are z-score standardized
//! against the training set before fitting so the raw amount scale cannot
//! swamp the gradient.

use serde::{Deserialize, Serialize};

use crate::dataset::{LabeledSample, FEATURE_COUNT};

/// Gradient descent hyperparameters
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct TrainingParams {
    /// Fixed learning rate
    pub learning_rate: f64,

    /// Full passes over the training set
    pub epochs: usize,
}

impl Default for TrainingParams {
    fn default() -> Self {
        Self {
            learning_rate: 0.01,
            epochs: 1_000,
        }
    }
}

/// Per-feature standardization fitted on the training set
#[derive(Debug, Clone, Serialize, Deserialize)]
struct FeatureScaler {
    means: [f64; FEATURE_COUNT],
    stddevs: [f64; FEATURE_COUNT],
}

impl FeatureScaler {
    fn fit(samples: &[LabeledSample]) -> Self {
        let n = samples.len().max(1) as f64;
        let mut means = [0.0; FEATURE_COUNT];
        for sample in samples {
            for (mean, value) in means.iter_mut().zip(sample.features.iter()) {
                *mean += value / n;
            }
        }

        let mut stddevs = [0.0; FEATURE_COUNT];
        for sample in samples {
            for i in 0..FEATURE_COUNT {
                let delta = sample.features[i] - means[i];
                stddevs[i] += delta * delta / n;
            }
        }
        for stddev in stddevs.iter_mut() {
            *stddev = stddev.sqrt();
        }

        Self { means, stddevs }
    }

    fn transform(&self, features: &[f64; FEATURE_COUNT]) -> [f64; FEATURE_COUNT] {
        let mut scaled = [0.0; FEATURE_COUNT];
        for i in 0..FEATURE_COUNT {
            scaled[i] = if self.stddevs[i] > f64::EPSILON {
                (features[i] - self.means[i]) / self.stddevs[i]
            } else {
                0.0
            };
        }
        scaled
    }
}

/// Trained logistic-regression classifier
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogisticModel {
    /// Learned feature weights (standardized space)
    pub weights: [f64; FEATURE_COUNT],

    /// Learned bias term
    pub bias: f64,

    scaler: FeatureScaler,
}

impl LogisticModel {
    /// Fit a model on the training samples with the given hyperparameters
    pub fn train(samples: &[LabeledSample], params: TrainingParams) -> Self {
        let scaler = FeatureScaler::fit(samples);
        let scaled: Vec<[f64; FEATURE_COUNT]> = samples
            .iter()
            .map(|s| scaler.transform(&s.features))
            .collect();
        let labels: Vec<f64> = samples
            .iter()
            .map(|s| if s.is_fraud { 1.0 } else { 0.0 })
            .collect();

        let n = samples.len().max(1) as f64;
        let mut weights = [0.0; FEATURE_COUNT];
        let mut bias = 0.0;

        for _ in 0..params.epochs {
            let mut weight_gradients = [0.0; FEATURE_COUNT];
            let mut bias_gradient = 0.0;

            for (features, label) in scaled.iter().zip(labels.iter()) {
                let error = sigmoid(dot(&weights, features) + bias) - label;
                for i in 0..FEATURE_COUNT {
                    weight_gradients[i] += error * features[i];
                }
                bias_gradient += error;
            }

            for i in 0..FEATURE_COUNT {
                weights[i] -= params.learning_rate * weight_gradients[i] / n;
            }
            bias -= params.learning_rate * bias_gradient / n;
        }

        Self {
            weights,
            bias,
            scaler,
        }
    }

    /// Fraud probability for a raw (unstandardized) feature vector
    pub fn predict_proba(&self, features: &[f64; FEATURE_COUNT]) -> f64 {
        let scaled = self.scaler.transform(features);
        sigmoid(dot(&self.weights, &scaled) + self.bias)
    }

    /// Hard classification at the 0.5 decision boundary
    pub fn predict(&self, features: &[f64; FEATURE_COUNT]) -> bool {
        self.predict_proba(features) >= 0.5
    }
}

fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

fn dot(weights: &[f64; FEATURE_COUNT], features: &[f64; FEATURE_COUNT]) -> f64 {
    weights
        .iter()
        .zip(features.iter())
        .map(|(w, x)| w * x)
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    fn sample(features: [f64; FEATURE_COUNT], is_fraud: bool, seq: i64) -> LabeledSample {
        LabeledSample {
            features,
            is_fraud,
            occurred_at: Utc::now() - Duration::minutes(1_000 - seq),
        }
    }

    fn separable_samples() -> Vec<LabeledSample> {
        let mut samples = Vec::new();
        for i in 0..60 {
            // Legitimate: modest daytime amounts on aged accounts
            samples.push(sample([2_500.0, 14.0, 200.0, 40.0, 3.0], false, i * 2));
            // Fraud: large small-hours amounts on fresh accounts
            samples.push(sample([50_000.0, 3.0, 2.0, 99.0, 8.0], true, i * 2 + 1));
        }
        samples
    }

    #[test]
    fn sigmoid_bounds() {
        assert!(sigmoid(0.0) > 0.49 && sigmoid(0.0) < 0.51);
        assert!(sigmoid(50.0) > 0.99);
        assert!(sigmoid(-50.0) < 0.01);
    }

    #[test]
    fn learns_separable_data() {
        let samples = separable_samples();
        let model = LogisticModel::train(&samples, TrainingParams::default());

        assert!(model.predict(&[48_000.0, 2.0, 1.0, 98.0, 7.0]));
        assert!(!model.predict(&[2_400.0, 13.0, 180.0, 35.0, 2.0]));
    }

    #[test]
    fn probabilities_stay_in_unit_interval() {
        let samples = separable_samples();
        let model = LogisticModel::train(&samples, TrainingParams::default());

        for features in [
            [0.0, 0.0, 0.0, 0.0, 0.0],
            [1e9, 23.0, 10_000.0, 100.0, 500.0],
        ] {
            let p = model.predict_proba(&features);
            assert!((0.0..=1.0).contains(&p), "probability out of range: {}", p);
        }
    }

    #[test]
    fn conflicting_labels_stay_uncertain() {
        // Identical features with contradictory labels cannot be separated
        let mut samples = Vec::new();
        for i in 0..40 {
            samples.push(sample([1_000.0, 12.0, 100.0, 50.0, 1.0], i % 2 == 0, i));
        }
        let model = LogisticModel::train(&samples, TrainingParams::default());
        let p = model.predict_proba(&[1_000.0, 12.0, 100.0, 50.0, 1.0]);
        assert!((p - 0.5).abs() < 0.05, "expected ~0.5, got {}", p);
    }
}
