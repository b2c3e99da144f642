use std::collections::BTreeMap;
use std::collections::BTreeSet;

use chrono::NaiveDate;

use crate::packs::{BandThresholds, DowngradeRule, Pack, PolicyConfig, ScoringConfig};

pub(super) fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid date")
}

pub(super) fn as_of() -> NaiveDate {
    date(2025, 11, 14)
}

/// In-memory pack covering every rule family the gate evaluates.
///
/// `litigation_active` is both blocked and downgraded so precedence between
/// the two rule families is observable.
pub(super) fn sample_pack() -> Pack {
    let taxonomy: BTreeSet<String> = [
        "funding_round",
        "hiring_surge",
        "layoffs_announced",
        "leadership_change",
        "litigation_active",
    ]
    .into_iter()
    .map(str::to_string)
    .collect();

    let weights: BTreeMap<String, f64> = [
        ("hiring_surge".to_string(), 0.4),
        ("funding_round".to_string(), 0.3),
    ]
    .into_iter()
    .collect();

    let sensitivity_mapping: BTreeMap<String, String> = [
        ("layoffs_announced", "high"),
        ("leadership_change", "medium"),
        ("hiring_surge", "low"),
        ("funding_round", "critical"),
    ]
    .into_iter()
    .map(|(signal, label)| (signal.to_string(), label.to_string()))
    .collect();

    Pack {
        pack_id: "sample".to_string(),
        version: "1".to_string(),
        schema_version: "1".to_string(),
        taxonomy,
        scoring: ScoringConfig {
            weights,
            recommendation_bands: Some(BandThresholds {
                ignore_max: 34.0,
                watch_max: 69.0,
                high_priority_min: 70.0,
            }),
        },
        policy: PolicyConfig {
            blocked_signals: ["litigation_active".to_string()].into_iter().collect(),
            prohibited_combinations: vec![(
                "layoffs_announced".to_string(),
                "funding_round".to_string(),
            )],
            downgrade_rules: vec![
                DowngradeRule {
                    trigger_signal: "leadership_change".to_string(),
                    max_recommendation: "Soft Value Share".to_string(),
                },
                DowngradeRule {
                    trigger_signal: "litigation_active".to_string(),
                    max_recommendation: "Observe Only".to_string(),
                },
            ],
            sensitivity_mapping,
            stability_cap_threshold: Some(0.7),
        },
        playbooks: BTreeMap::new(),
        config_checksum: "0123abcd".to_string(),
    }
}
