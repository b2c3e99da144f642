//! Engagement suitability evaluation pipeline.
//!
//! Pure, synchronous evaluators over immutable inputs: scoring produces the
//! ESL composite, the decision gate applies pack policy to the signal set,
//! and the policy gate layers temporal/safety guardrails on top. The engine
//! below wires them into a single per-request report.

pub mod bands;
pub mod decision;
pub mod domain;
pub mod policy;
pub mod scoring;

#[cfg(test)]
mod tests;

pub use bands::resolve as resolve_band;
pub use decision::CORE_BANNED_SIGNALS;
pub use domain::{
    Decision, DecisionResult, EslExplain, EvaluationInput, PressureSnapshot, PriorityBand,
    ReasonCode, Recommendation, RecommendationTier, SignalEvent, SignalEventCategory, SignalSet,
};
pub use policy::DEFAULT_STABILITY_CAP;

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::packs::Pack;

/// Combined output of one evaluation: the audit record, the decision gate's
/// verdict, the policy gate's recommendation, and the optional priority band.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationReport {
    pub explain: EslExplain,
    pub decision: DecisionResult,
    pub recommendation: Recommendation,
    pub band: Option<PriorityBand>,
    /// Checksum of the pack in effect, if any, for drift auditing.
    pub config_checksum: Option<String>,
}

/// Stateless evaluator over a shared, read-only pack.
///
/// The pack is held behind `Arc` so one loaded bundle serves any number of
/// concurrent evaluations; without a pack the engine runs in legacy mode.
#[derive(Debug, Clone, Default)]
pub struct EvaluationEngine {
    pack: Option<Arc<Pack>>,
}

impl EvaluationEngine {
    pub fn new(pack: Option<Arc<Pack>>) -> Self {
        Self { pack }
    }

    pub fn legacy() -> Self {
        Self { pack: None }
    }

    pub fn pack(&self) -> Option<&Pack> {
        self.pack.as_deref()
    }

    pub fn evaluate(&self, input: &EvaluationInput) -> EvaluationReport {
        evaluate(input, self.pack())
    }
}

/// Run the full pipeline for one caller-assembled input.
pub fn evaluate(input: &EvaluationInput, pack: Option<&Pack>) -> EvaluationReport {
    let empty_weights = std::collections::BTreeMap::new();
    let weights = pack
        .map(|pack| pack.surface().weights())
        .unwrap_or(&empty_weights);

    let explain = scoring::explain(input, weights);
    let decision = decision::evaluate(&input.signals, pack);

    let mut recommendation = policy::check(
        explain.cadence_blocked,
        explain.stability_modifier,
        input.alignment_ok == Some(true),
        pack,
    );

    // A suppression from the decision gate overrides whatever the policy
    // gate would otherwise permit.
    if decision.decision == Decision::Suppress {
        recommendation.tier = RecommendationTier::ObserveOnly;
        recommendation.should_generate_draft = false;
        recommendation.safeguards_triggered.push(format!(
            "Outreach suppressed by policy rule: {}",
            decision.reason_code.as_str()
        ));
    } else if let Some(cap) = decision
        .tone_constraint
        .as_deref()
        .and_then(RecommendationTier::from_label)
    {
        if recommendation.tier > cap {
            recommendation.tier = cap;
        }
    }

    let band = bands::resolve((explain.esl_composite * 100.0).round_ties_even() as i64, pack);

    EvaluationReport {
        explain,
        decision,
        recommendation,
        band,
        config_checksum: pack.map(|pack| pack.config_checksum.clone()),
    }
}
