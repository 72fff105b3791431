//! Training run reports

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use risk_engine::ValidationMetrics;

/// Structured summary of one training run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingReport {
    /// Version the run produced
    pub version: String,

    /// When the run finished
    pub trained_at: DateTime<Utc>,

    /// Labeled samples in the window
    pub sample_count: usize,

    /// Samples used for fitting
    pub training_count: usize,

    /// Samples held out for validation
    pub validation_count: usize,

    /// Metrics on the holdout
    pub metrics: ValidationMetrics,

    /// Metrics reported before this run, when any existed
    pub previous_metrics: Option<ValidationMetrics>,

    /// Whether the run passed the deployment gate
    pub deployed: bool,

    /// Qualitative follow-ups derived from the metrics
    pub recommendations: Vec<String>,
}

impl TrainingReport {
    /// Derive qualitative recommendations from validation metrics
    pub fn recommendations_for(metrics: &ValidationMetrics) -> Vec<String> {
        let mut recommendations = Vec::new();
        if metrics.precision < 0.9 {
            recommendations.push(
                "Precision below 90%: consider additional features to cut false positives"
                    .to_string(),
            );
        }
        if metrics.recall < 0.9 {
            recommendations.push(
                "Recall below 90%: expand the labeled fraud sample window".to_string(),
            );
        }
        if metrics.false_positive_rate > 0.1 {
            recommendations.push(
                "False positive rate above 10%: review the manual-review threshold".to_string(),
            );
        }
        if recommendations.is_empty() {
            recommendations.push("Metrics within targets; continue weekly retraining".to_string());
        }
        recommendations
    }

    /// Human-readable report block for logs and operator review
    pub fn render(&self) -> String {
        let mut out = String::new();
        out.push_str(&format!("Model performance report: {}\n", self.version));
        out.push_str(&format!(
            "Trained {} | samples: {} (train {}, validate {})\n",
            self.trained_at.format("%Y-%m-%d %H:%M UTC"),
            self.sample_count,
            self.training_count,
            self.validation_count,
        ));
        out.push_str(&format!(
            "Precision: {}  Recall: {}  F1: {}\n",
            pct(self.metrics.precision, self.previous_metrics.map(|p| p.precision)),
            pct(self.metrics.recall, self.previous_metrics.map(|p| p.recall)),
            pct(self.metrics.f1, self.previous_metrics.map(|p| p.f1)),
        ));
        out.push_str(&format!(
            "False positive rate: {}  Accuracy: {}\n",
            pct(
                self.metrics.false_positive_rate,
                self.previous_metrics.map(|p| p.false_positive_rate)
            ),
            pct(self.metrics.accuracy, self.previous_metrics.map(|p| p.accuracy)),
        ));
        out.push_str(if self.deployed {
            "Status: DEPLOYED\n"
        } else {
            "Status: REJECTED (previous metrics remain authoritative)\n"
        });
        for recommendation in &self.recommendations {
            out.push_str(&format!("- {}\n", recommendation));
        }
        out
    }
}

/// Format a ratio as a percentage with its delta versus the prior value
fn pct(value: f64, previous: Option<f64>) -> String {
    match previous {
        Some(prev) => format!("{:.1}% ({:+.1} pts)", value * 100.0, (value - prev) * 100.0),
        None => format!("{:.1}%", value * 100.0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn metrics(precision: f64, recall: f64) -> ValidationMetrics {
        let f1 = if precision + recall > 0.0 {
            2.0 * precision * recall / (precision + recall)
        } else {
            0.0
        };
        ValidationMetrics {
            precision,
            recall,
            f1,
            false_positive_rate: 0.04,
            accuracy: 0.93,
        }
    }

    #[test]
    fn low_precision_recommends_features() {
        let recommendations = TrainingReport::recommendations_for(&metrics(0.86, 0.95));
        assert!(recommendations.iter().any(|r| r.contains("features")));
    }

    #[test]
    fn healthy_metrics_recommend_continuing() {
        let recommendations = TrainingReport::recommendations_for(&metrics(0.95, 0.95));
        assert_eq!(recommendations.len(), 1);
        assert!(recommendations[0].contains("within targets"));
    }

    #[test]
    fn render_includes_deltas_when_previous_exists() {
        let report = TrainingReport {
            version: "model-v2".to_string(),
            trained_at: Utc::now(),
            sample_count: 150,
            training_count: 120,
            validation_count: 30,
            metrics: metrics(0.92, 0.9),
            previous_metrics: Some(metrics(0.88, 0.91)),
            deployed: true,
            recommendations: TrainingReport::recommendations_for(&metrics(0.92, 0.9)),
        };
        let rendered = report.render();
        assert!(rendered.contains("model-v2"));
        assert!(rendered.contains("DEPLOYED"));
        assert!(rendered.contains("pts"));
    }

    #[test]
    fn render_marks_rejected_runs() {
        let report = TrainingReport {
            version: "model-v3".to_string(),
            trained_at: Utc::now(),
            sample_count: 150,
            training_count: 120,
            validation_count: 30,
            metrics: metrics(0.5, 0.4),
            previous_metrics: None,
            deployed: false,
            recommendations: TrainingReport::recommendations_for(&metrics(0.5, 0.4)),
        };
        assert!(report.render().contains("REJECTED"));
    }
}
