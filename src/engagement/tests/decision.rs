use super::common::sample_pack;
use crate::engagement::decision::evaluate;
use crate::engagement::domain::{Decision, ReasonCode, SignalSet};

#[test]
fn legacy_mode_always_allows() {
    for signals in [
        SignalSet::default(),
        SignalSet::new(["litigation_active"]),
        SignalSet::new(["layoffs_announced", "funding_round"]),
    ] {
        let result = evaluate(&signals, None);
        assert_eq!(result.decision, Decision::Allow);
        assert_eq!(result.reason_code, ReasonCode::Legacy);
        assert_eq!(result.sensitivity_level, None);
        assert_eq!(result.tone_constraint, None);
    }
}

#[test]
fn empty_signal_set_allows_with_no_sensitivity() {
    let pack = sample_pack();
    let result = evaluate(&SignalSet::default(), Some(&pack));
    assert_eq!(result.decision, Decision::Allow);
    assert_eq!(result.reason_code, ReasonCode::None);
    assert_eq!(result.sensitivity_level, None);
}

#[test]
fn blocked_signal_suppresses_even_when_downgrade_also_matches() {
    // `litigation_active` carries both a block and a downgrade rule in the
    // sample pack; the block must win.
    let pack = sample_pack();
    let result = evaluate(&SignalSet::new(["litigation_active"]), Some(&pack));
    assert_eq!(result.decision, Decision::Suppress);
    assert_eq!(result.reason_code, ReasonCode::BlockedSignal);
    assert_eq!(result.tone_constraint, None);
}

#[test]
fn prohibited_pair_suppresses_in_either_order() {
    let pack = sample_pack();
    for signals in [
        SignalSet::new(["layoffs_announced", "funding_round"]),
        SignalSet::new(["funding_round", "layoffs_announced"]),
        SignalSet::new(["hiring_surge", "funding_round", "layoffs_announced"]),
    ] {
        let result = evaluate(&signals, Some(&pack));
        assert_eq!(result.decision, Decision::Suppress);
        assert_eq!(result.reason_code, ReasonCode::ProhibitedCombination);
    }
}

#[test]
fn single_member_of_prohibited_pair_allows() {
    let pack = sample_pack();
    let result = evaluate(&SignalSet::new(["funding_round"]), Some(&pack));
    assert_eq!(result.decision, Decision::Allow);
    assert_eq!(result.reason_code, ReasonCode::None);
}

#[test]
fn downgrade_rule_constrains_tone_and_keeps_sensitivity() {
    let pack = sample_pack();
    let result = evaluate(
        &SignalSet::new(["leadership_change", "hiring_surge"]),
        Some(&pack),
    );
    assert_eq!(result.decision, Decision::AllowWithConstraints);
    assert_eq!(result.reason_code, ReasonCode::DowngradeRule);
    assert_eq!(result.tone_constraint.as_deref(), Some("Soft Value Share"));
    // Sensitivity is still computed on the downgrade branch.
    assert_eq!(result.sensitivity_level.as_deref(), Some("medium"));
}

#[test]
fn sensitivity_prefers_high_over_lower_labels() {
    let pack = sample_pack();
    let result = evaluate(
        &SignalSet::new(["layoffs_announced", "hiring_surge"]),
        Some(&pack),
    );
    assert_eq!(result.decision, Decision::Allow);
    assert_eq!(result.sensitivity_level.as_deref(), Some("high"));
}

#[test]
fn unrecognized_sensitivity_label_passes_through_when_alone() {
    let pack = sample_pack();
    let result = evaluate(&SignalSet::new(["funding_round"]), Some(&pack));
    assert_eq!(result.sensitivity_level.as_deref(), Some("critical"));
}
