//! Scoring pipeline orchestration
//!
//! Ties the profile store, analyzers, aggregator, decision thresholds,
//! enforcement, and audit sink into one facade. The caller-facing
//! [`RiskEngine::analyze`] never fails: any internal fault is converted into
//! the fail-open allow outcome at this single boundary.

use std::sync::Arc;
use std::time::Instant;

use audit_log::{AuditKind, AuditSink};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::analyzers::{
    AmountDeviationAnalyzer, BehaviorAnalyzer, DeviceFingerprintAnalyzer, ExternalCheckAnalyzer,
    FrequencyAnalyzer, TimePatternAnalyzer, MODERATE_FALLBACK_SCORE,
};
use crate::blocklist::Blocklist;
use crate::config::RiskConfig;
use crate::decision::DecisionThresholds;
use crate::enforcement::{Enforcement, SessionControl};
use crate::error::{Error, Result};
use crate::history::TransactionHistory;
use crate::metrics::EngineMetrics;
use crate::model::{ModelStatus, ValidationMetrics};
use crate::profile::ProfileStore;
use crate::types::{
    Decision, FactorOutcome, FactorScores, RiskAnalysis, RiskScore, TransactionContext,
};

/// Reason attached when a blocklisted identifier short-circuits scoring
const BLOCKED_REASON: &str = "blocked";

/// Reason attached when an internal fault forces the fail-open outcome
const FAIL_OPEN_REASON: &str = "analysis failed, defaulting to allow";

/// Snapshot of engine state for dashboards
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineSnapshot {
    /// Currently reported model version
    pub model_version: String,

    /// Last validated model metrics, if a training run has deployed
    pub model_metrics: Option<ValidationMetrics>,

    /// Active decision thresholds
    pub thresholds: DecisionThresholds,

    /// Number of blocked identifiers
    pub blocklist_size: usize,

    /// Number of cached user profiles
    pub profile_cache_size: usize,
}

/// The risk scoring engine
///
/// Constructed once at process start with its collaborators injected; there
/// is no global state. Scoring is synchronous and request-scoped.
pub struct RiskEngine {
    config: RiskConfig,
    history: Arc<dyn TransactionHistory>,
    blocklist: Arc<Blocklist>,
    profiles: Arc<ProfileStore>,
    audit: Arc<dyn AuditSink>,
    model: Arc<ModelStatus>,
    metrics: EngineMetrics,
    enforcement: Enforcement,
    amount: AmountDeviationAnalyzer,
    time: TimePatternAnalyzer,
    frequency: FrequencyAnalyzer,
    device: DeviceFingerprintAnalyzer,
    behavior: BehaviorAnalyzer,
    external: ExternalCheckAnalyzer,
}

impl RiskEngine {
    /// Build the engine from its collaborators
    pub fn new(
        config: RiskConfig,
        history: Arc<dyn TransactionHistory>,
        sessions: Arc<dyn SessionControl>,
        audit: Arc<dyn AuditSink>,
    ) -> Result<Self> {
        config.validate()?;

        let blocklist = Arc::new(Blocklist::new());
        let profiles = Arc::new(ProfileStore::new());
        let model = Arc::new(ModelStatus::new(&config.model_version));
        let metrics = EngineMetrics::new()
            .map_err(|e| Error::Config(format!("Failed to register metrics: {}", e)))?;
        let enforcement = Enforcement::new(
            blocklist.clone(),
            sessions,
            audit.clone(),
            &config.service_name,
        );

        Ok(Self {
            amount: AmountDeviationAnalyzer::new(),
            time: TimePatternAnalyzer::new(),
            frequency: FrequencyAnalyzer::new(history.clone()),
            device: DeviceFingerprintAnalyzer::new(history.clone()),
            behavior: BehaviorAnalyzer::new(),
            external: ExternalCheckAnalyzer::new(blocklist.clone()),
            config,
            history,
            blocklist,
            profiles,
            audit,
            model,
            metrics,
            enforcement,
        })
    }

    /// Shared blocklist handle, for operator tooling
    pub fn blocklist(&self) -> Arc<Blocklist> {
        self.blocklist.clone()
    }

    /// Shared model-status handle, written by the trainer on deployment
    pub fn model_status(&self) -> Arc<ModelStatus> {
        self.model.clone()
    }

    /// Prometheus registry backing the engine's metrics
    pub fn metrics_registry(&self) -> Arc<prometheus::Registry> {
        self.metrics.registry.clone()
    }

    /// Add an identifier to the blocklist (operator action, audited)
    pub fn add_to_blocklist(&self, identifier: &str) {
        let added = self.blocklist.add(identifier.to_string());
        info!(identifier, added, "blocklist add requested");
        self.audit_admin(identifier, "add", added);
    }

    /// Remove an identifier from the blocklist (operator action, audited)
    pub fn remove_from_blocklist(&self, identifier: &str) {
        let removed = self.blocklist.remove(identifier);
        info!(identifier, removed, "blocklist remove requested");
        self.audit_admin(identifier, "remove", removed);
    }

    fn audit_admin(&self, identifier: &str, action: &str, changed: bool) {
        let detail = serde_json::json!({
            "identifier": identifier,
            "action": action,
            "changed": changed,
        });
        if let Err(e) = self
            .audit
            .append(AuditKind::BlocklistAdmin, &self.config.service_name, detail)
        {
            error!(identifier, error = %e, "failed to audit blocklist change");
        }
    }

    /// State snapshot for external dashboards
    pub fn snapshot(&self) -> EngineSnapshot {
        EngineSnapshot {
            model_version: self.model.version(),
            model_metrics: self.model.metrics(),
            thresholds: self.config.thresholds,
            blocklist_size: self.blocklist.len(),
            profile_cache_size: self.profiles.len(),
        }
    }

    /// Score one transaction. Always resolves.
    ///
    /// This is the fail-open boundary: any fault escaping the pipeline is
    /// logged and converted into an allow with score 0, so the payment path
    /// is never blocked by the engine's own internals.
    pub fn analyze(&self, ctx: &TransactionContext) -> RiskAnalysis {
        match self.evaluate(ctx) {
            Ok(analysis) => analysis,
            Err(e) => {
                error!(user_id = %ctx.user_id, error = %e,
                    "risk analysis failed, defaulting to allow");
                let analysis = self.fail_open_analysis(ctx);
                self.append_decision_record(&analysis);
                self.metrics
                    .record_decision(analysis.decision, analysis.score.value(), 0.0);
                analysis
            }
        }
    }

    /// The fallible scoring pipeline behind [`analyze`](Self::analyze)
    pub fn evaluate(&self, ctx: &TransactionContext) -> Result<RiskAnalysis> {
        let started = Instant::now();

        // A blocklisted actor is never scored back down by a lucky
        // transaction: short-circuit before any analyzer runs.
        if self.blocklist.is_blocked(&ctx.user_id) || self.blocklist.is_blocked(&ctx.phone_number)
        {
            let analysis = self.blocked_analysis(ctx, started);
            self.append_decision_record(&analysis);
            self.enforcement.enforce_block(ctx);
            self.metrics
                .record_decision(analysis.decision, 100, started.elapsed().as_secs_f64());
            self.metrics
                .update_cache_sizes(self.blocklist.len(), self.profiles.len());
            return Ok(analysis);
        }

        // Profile lookup failing is a pipeline-level fault (three analyzers
        // depend on it); it propagates to the fail-open boundary. Failures
        // inside individual analyzers stay isolated below.
        let profile = self.profiles.get_or_build(&ctx.user_id, self.history.as_ref())?;

        let amount = self.run_factor(
            "amount_deviation",
            MODERATE_FALLBACK_SCORE,
            self.amount.evaluate(ctx, profile.as_ref()),
        );
        let time = self.run_factor(
            "time_pattern",
            MODERATE_FALLBACK_SCORE,
            self.time.evaluate(ctx),
        );
        let frequency = self.run_factor(
            "frequency",
            MODERATE_FALLBACK_SCORE,
            self.frequency.evaluate(ctx),
        );
        let device = self.run_factor(
            "device_fingerprint",
            MODERATE_FALLBACK_SCORE,
            self.device.evaluate(ctx, profile.as_ref()),
        );
        let behavior = self.run_factor(
            "behavior_history",
            MODERATE_FALLBACK_SCORE,
            self.behavior.evaluate(ctx, profile.as_ref()),
        );
        // External reference checks fail open: an unreachable source
        // contributes nothing rather than a moderate default.
        let external = self.run_factor("external_database", 0, self.external.evaluate(ctx));

        let factors = FactorScores {
            amount_deviation: amount.score,
            time_pattern: time.score,
            frequency: frequency.score,
            device_fingerprint: device.score,
            behavior_history: behavior.score,
            external_database: external.score,
        };

        let mut reasons = Vec::new();
        for outcome in [&amount, &time, &frequency, &device, &behavior, &external] {
            reasons.extend(outcome.reasons.iter().cloned());
        }

        let score = self.config.weights.aggregate(&factors);
        let decision = self.config.thresholds.decide(score);

        let elapsed = started.elapsed();
        let processing_time_ms = elapsed.as_millis() as u64;
        if processing_time_ms > self.config.latency_budget_ms {
            warn!(
                user_id = %ctx.user_id,
                processing_time_ms,
                budget_ms = self.config.latency_budget_ms,
                "scoring exceeded latency budget"
            );
        }

        let analysis = RiskAnalysis {
            analysis_id: Uuid::now_v7(),
            user_id: ctx.user_id.clone(),
            session_id: ctx.session_id,
            factors,
            score,
            decision,
            reasons,
            processing_time_ms,
            model_version: self.model.version(),
            assessed_at: Utc::now(),
        };

        debug!(
            user_id = %ctx.user_id,
            score = score.value(),
            decision = decision.as_str(),
            "transaction scored"
        );

        self.append_decision_record(&analysis);

        if decision == Decision::Block {
            self.enforcement.enforce_block(ctx);
        }

        // Strictly after scoring, so the transaction cannot bias its own
        // risk assessment.
        self.profiles.record_observation(ctx);

        self.metrics
            .record_decision(decision, score.value(), elapsed.as_secs_f64());
        self.metrics
            .update_cache_sizes(self.blocklist.len(), self.profiles.len());

        Ok(analysis)
    }

    fn run_factor(
        &self,
        factor: &'static str,
        fallback: u8,
        result: Result<FactorOutcome>,
    ) -> FactorOutcome {
        match result {
            Ok(outcome) => outcome,
            Err(e) => {
                warn!(factor, error = %e, "analyzer failed, substituting fallback score");
                FactorOutcome::with_reason(fallback, format!("{} check unavailable", factor))
            }
        }
    }

    fn blocked_analysis(&self, ctx: &TransactionContext, started: Instant) -> RiskAnalysis {
        RiskAnalysis {
            analysis_id: Uuid::now_v7(),
            user_id: ctx.user_id.clone(),
            session_id: ctx.session_id,
            factors: FactorScores {
                external_database: 100,
                ..FactorScores::default()
            },
            score: RiskScore::MAX,
            decision: Decision::Block,
            reasons: vec![BLOCKED_REASON.to_string()],
            processing_time_ms: started.elapsed().as_millis() as u64,
            model_version: self.model.version(),
            assessed_at: Utc::now(),
        }
    }

    fn fail_open_analysis(&self, ctx: &TransactionContext) -> RiskAnalysis {
        RiskAnalysis {
            analysis_id: Uuid::now_v7(),
            user_id: ctx.user_id.clone(),
            session_id: ctx.session_id,
            factors: FactorScores::default(),
            score: RiskScore::MIN,
            decision: Decision::Allow,
            reasons: vec![FAIL_OPEN_REASON.to_string()],
            processing_time_ms: 0,
            model_version: self.model.version(),
            assessed_at: Utc::now(),
        }
    }

    // The decision is already made when this runs; an append failure is
    // logged rather than unwound into the caller's response.
    fn append_decision_record(&self, analysis: &RiskAnalysis) {
        let detail = serde_json::to_value(analysis).unwrap_or_else(|_| {
            serde_json::json!({ "analysis_id": analysis.analysis_id.to_string() })
        });
        if let Err(e) = self
            .audit
            .append(AuditKind::RiskDecision, &self.config.service_name, detail)
        {
            error!(analysis_id = %analysis.analysis_id, error = %e,
                "failed to append decision audit record");
        }
    }
}
