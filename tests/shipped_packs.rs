use std::path::PathBuf;

use chrono::NaiveDate;
use outreach_ai::engagement::{
    evaluate, Decision, EvaluationInput, PriorityBand, ReasonCode, RecommendationTier, SignalSet,
};
use outreach_ai::packs::{validate_root, PackError, PackOutcome, PackStore};

fn packs_root() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("packs")
}

fn as_of() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 11, 14).expect("valid date")
}

#[test]
fn shipped_default_pack_is_valid() {
    let store = PackStore::new(packs_root());
    let pack = store.load("core-default", "1").expect("default pack loads");
    assert_eq!(pack.schema_version, "1");
    assert!(pack.playbooks.contains_key("email"));
}

#[test]
fn shipped_invalid_fixture_fails_validation() {
    let store = PackStore::new(packs_root());
    match store.load("fixture-invalid", "1") {
        Err(PackError::ValidationFailure { violations }) => {
            assert!(violations.len() >= 3, "got {violations:?}");
        }
        other => panic!("expected ValidationFailure, got {other:?}"),
    }
}

#[test]
fn shipped_root_validates_clean_with_the_fixture_skipped() {
    let store = PackStore::new(packs_root());
    let report = validate_root(&store, &["fixture-invalid"]).expect("root listable");

    assert!(report.all_valid(), "outcomes: {:?}", report.outcomes);
    assert!(report
        .outcomes
        .iter()
        .any(|(id, outcome)| id == "fixture-invalid" && matches!(outcome, PackOutcome::Skipped)));
    assert!(report.outcomes.iter().any(|(id, outcome)| {
        id == "core-default"
            && matches!(outcome, PackOutcome::Passed { checksum, .. } if checksum.len() == 64)
    }));
}

#[test]
fn shipped_root_fails_validation_when_the_fixture_is_not_skipped() {
    let store = PackStore::new(packs_root());
    let report = validate_root(&store, &[]).expect("root listable");

    assert!(!report.all_valid());
    assert_eq!(report.failed(), 1);
    assert!(report.outcomes.iter().any(|(id, outcome)| {
        id == "fixture-invalid"
            && matches!(
                outcome,
                PackOutcome::Failed(PackError::ValidationFailure { .. })
            )
    }));
}

#[test]
fn end_to_end_evaluation_against_default_pack() {
    let store = PackStore::new(packs_root());
    let pack = store.load("core-default", "1").expect("default pack loads");

    let input = EvaluationInput {
        trs: 85.0,
        signals: SignalSet::new(["hiring_surge"]),
        events: Vec::new(),
        pressure_snapshots: Vec::new(),
        last_outreach_on: None,
        alignment_ok: Some(true),
        as_of: as_of(),
    };
    let report = evaluate(&input, Some(&pack));

    assert_eq!(report.decision.decision, Decision::Allow);
    assert_eq!(report.decision.reason_code, ReasonCode::None);
    assert_eq!(report.decision.sensitivity_level.as_deref(), Some("low"));
    assert_eq!(report.recommendation.tier, RecommendationTier::LowPressureIntro);
    assert_eq!(report.band, Some(PriorityBand::HighPriority));
    assert_eq!(
        report.config_checksum.as_deref(),
        Some(pack.config_checksum.as_str())
    );

    let suppressed = EvaluationInput {
        signals: SignalSet::new(["litigation_active"]),
        ..input
    };
    let report = evaluate(&suppressed, Some(&pack));
    assert_eq!(report.decision.decision, Decision::Suppress);
    assert!(!report.recommendation.should_generate_draft);
}
