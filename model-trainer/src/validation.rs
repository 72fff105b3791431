//! Holdout validation

use risk_engine::ValidationMetrics;

use crate::dataset::LabeledSample;
use crate::logistic::LogisticModel;

/// Score a trained model against held-out samples.
///
/// Ratios with empty denominators (no predicted positives, no actual
/// positives, no actual negatives) evaluate to 0 rather than NaN.
pub fn evaluate(model: &LogisticModel, holdout: &[LabeledSample]) -> ValidationMetrics {
    let mut true_positives = 0u64;
    let mut false_positives = 0u64;
    let mut true_negatives = 0u64;
    let mut false_negatives = 0u64;

    for sample in holdout {
        let predicted = model.predict(&sample.features);
        match (predicted, sample.is_fraud) {
            (true, true) => true_positives += 1,
            (true, false) => false_positives += 1,
            (false, false) => true_negatives += 1,
            (false, true) => false_negatives += 1,
        }
    }

    let precision = ratio(true_positives, true_positives + false_positives);
    let recall = ratio(true_positives, true_positives + false_negatives);
    let f1 = if precision + recall > 0.0 {
        2.0 * precision * recall / (precision + recall)
    } else {
        0.0
    };
    let false_positive_rate = ratio(false_positives, false_positives + true_negatives);
    let accuracy = ratio(
        true_positives + true_negatives,
        true_positives + false_positives + true_negatives + false_negatives,
    );

    ValidationMetrics {
        precision,
        recall,
        f1,
        false_positive_rate,
        accuracy,
    }
}

fn ratio(numerator: u64, denominator: u64) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f64 / denominator as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logistic::TrainingParams;
    use chrono::{Duration, Utc};

    fn sample(features: [f64; 5], is_fraud: bool, seq: i64) -> LabeledSample {
        LabeledSample {
            features,
            is_fraud,
            occurred_at: Utc::now() - Duration::minutes(1_000 - seq),
        }
    }

    #[test]
    fn perfect_model_scores_ones() {
        let mut samples = Vec::new();
        for i in 0..50 {
            samples.push(sample([2_500.0, 14.0, 200.0, 40.0, 3.0], false, i * 2));
            samples.push(sample([50_000.0, 3.0, 2.0, 99.0, 8.0], true, i * 2 + 1));
        }
        let model = LogisticModel::train(&samples, TrainingParams::default());
        let metrics = evaluate(&model, &samples);

        assert!(metrics.precision > 0.99);
        assert!(metrics.recall > 0.99);
        assert!(metrics.f1 > 0.99);
        assert!(metrics.false_positive_rate < 0.01);
        assert!(metrics.accuracy > 0.99);
    }

    #[test]
    fn empty_denominators_yield_zero_not_nan() {
        // All-negative holdout: no actual positives, and a model trained on
        // negatives only predicts nothing positive
        let samples: Vec<LabeledSample> = (0..20)
            .map(|i| sample([2_500.0, 14.0, 200.0, 40.0, 3.0], false, i))
            .collect();
        let model = LogisticModel::train(&samples, TrainingParams::default());
        let metrics = evaluate(&model, &samples);

        assert_eq!(metrics.precision, 0.0);
        assert_eq!(metrics.recall, 0.0);
        assert_eq!(metrics.f1, 0.0);
        assert!(metrics.accuracy > 0.99);
        assert!(!metrics.false_positive_rate.is_nan());
    }
}
