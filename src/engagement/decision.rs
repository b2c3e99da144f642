//! Rule-precedence decision gate over an account's signal set.

use super::domain::{Decision, DecisionResult, ReasonCode, SignalSet};
use crate::packs::Pack;

/// Process-wide hard-ban list that no pack may relax. Reserved for future
/// ethics overrides; currently empty.
pub const CORE_BANNED_SIGNALS: &[&str] = &[];

/// Evaluate pack policy against the observed signals. Rules run in fixed
/// precedence and the first match is terminal; without a pack the gate
/// degrades to the backward-compatible legacy allow.
pub fn evaluate(signals: &SignalSet, pack: Option<&Pack>) -> DecisionResult {
    let Some(pack) = pack else {
        return DecisionResult {
            decision: Decision::Allow,
            reason_code: ReasonCode::Legacy,
            sensitivity_level: None,
            tone_constraint: None,
        };
    };

    if CORE_BANNED_SIGNALS
        .iter()
        .any(|banned| signals.contains(banned))
    {
        return DecisionResult {
            decision: Decision::Suppress,
            reason_code: ReasonCode::CoreBan,
            sensitivity_level: None,
            tone_constraint: None,
        };
    }

    let policy = pack.surface().policy();

    if policy
        .blocked_signals
        .iter()
        .any(|blocked| signals.contains(blocked))
    {
        return DecisionResult {
            decision: Decision::Suppress,
            reason_code: ReasonCode::BlockedSignal,
            sensitivity_level: None,
            tone_constraint: None,
        };
    }

    // Unordered containment: the pair matches however the caller supplied
    // the signals.
    if policy
        .prohibited_combinations
        .iter()
        .any(|(first, second)| signals.contains(first) && signals.contains(second))
    {
        return DecisionResult {
            decision: Decision::Suppress,
            reason_code: ReasonCode::ProhibitedCombination,
            sensitivity_level: None,
            tone_constraint: None,
        };
    }

    let sensitivity_level = sensitivity_level(signals, pack);

    if let Some(rule) = policy
        .downgrade_rules
        .iter()
        .find(|rule| signals.contains(&rule.trigger_signal))
    {
        return DecisionResult {
            decision: Decision::AllowWithConstraints,
            reason_code: ReasonCode::DowngradeRule,
            sensitivity_level,
            tone_constraint: Some(rule.max_recommendation.clone()),
        };
    }

    DecisionResult {
        decision: Decision::Allow,
        reason_code: ReasonCode::None,
        sensitivity_level,
        tone_constraint: None,
    }
}

/// Severity annotation for the present signals: prefer "high", then
/// "medium", then "low"; an unrecognized label wins only when no recognized
/// one is present. `None` when no present signal is mapped.
fn sensitivity_level(signals: &SignalSet, pack: &Pack) -> Option<String> {
    let mapping = &pack.surface().policy().sensitivity_mapping;
    let labels: Vec<&str> = signals
        .iter()
        .filter_map(|signal| mapping.get(signal).map(String::as_str))
        .collect();

    for preferred in ["high", "medium", "low"] {
        if labels.iter().any(|label| *label == preferred) {
            return Some(preferred.to_string());
        }
    }
    labels.first().map(|label| label.to_string())
}
