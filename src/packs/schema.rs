//! Structural validation for loaded pack documents.
//!
//! Every check appends to a shared violation list instead of returning early,
//! so one validation run reports everything an operator needs to fix.

use std::collections::{BTreeMap, BTreeSet};

use serde_yaml::Value;

use super::{BandThresholds, DowngradeRule, PackManifest, PolicyConfig, ScoringConfig};
use crate::engagement::RecommendationTier;

const SUPPORTED_SCHEMA_VERSIONS: &[&str] = &["1"];

pub(crate) struct ParsedDocuments<'a> {
    pub manifest: &'a Value,
    pub taxonomy: &'a Value,
    pub scoring: &'a Value,
    pub policy: &'a Value,
    pub playbooks: &'a [(String, Value)],
}

#[derive(Debug)]
pub(crate) struct ValidatedBundle {
    pub manifest: PackManifest,
    pub taxonomy: BTreeSet<String>,
    pub scoring: ScoringConfig,
    pub policy: PolicyConfig,
}

pub(crate) fn validate(documents: &ParsedDocuments<'_>) -> Result<ValidatedBundle, Vec<String>> {
    let mut violations = Vec::new();

    let manifest = validate_manifest(documents.manifest, &mut violations);
    let taxonomy = validate_taxonomy(documents.taxonomy, &mut violations);
    let scoring = validate_scoring(documents.scoring, &taxonomy, &mut violations);
    let policy = validate_policy(documents.policy, &taxonomy, &mut violations);

    for (name, playbook) in documents.playbooks {
        if playbook.as_mapping().is_none() {
            violations.push(format!("playbook '{name}': document must be a mapping"));
        }
    }

    if violations.is_empty() {
        Ok(ValidatedBundle {
            manifest,
            taxonomy,
            scoring,
            policy,
        })
    } else {
        Err(violations)
    }
}

fn validate_manifest(manifest: &Value, violations: &mut Vec<String>) -> PackManifest {
    let id = required_string(manifest, "manifest", "id", violations);
    let version = required_string(manifest, "manifest", "version", violations);
    let schema_version = required_string(manifest, "manifest", "schema_version", violations);

    if !schema_version.is_empty()
        && !SUPPORTED_SCHEMA_VERSIONS.contains(&schema_version.as_str())
    {
        violations.push(format!(
            "manifest: unsupported schema_version '{schema_version}' (supported: {})",
            SUPPORTED_SCHEMA_VERSIONS.join(", ")
        ));
    }

    PackManifest {
        id,
        version,
        schema_version,
    }
}

fn validate_taxonomy(taxonomy: &Value, violations: &mut Vec<String>) -> BTreeSet<String> {
    let mut signals = BTreeSet::new();

    match taxonomy.get("signals").and_then(Value::as_sequence) {
        Some(entries) if !entries.is_empty() => {
            for entry in entries {
                match entry.as_str() {
                    Some(signal) => {
                        if !signals.insert(signal.to_string()) {
                            violations.push(format!("taxonomy: duplicate signal '{signal}'"));
                        }
                    }
                    None => violations
                        .push("taxonomy: signals entries must be strings".to_string()),
                }
            }
        }
        Some(_) => violations.push("taxonomy: signals must not be empty".to_string()),
        None => violations.push("taxonomy: missing required key 'signals'".to_string()),
    }

    signals
}

fn validate_scoring(
    scoring: &Value,
    taxonomy: &BTreeSet<String>,
    violations: &mut Vec<String>,
) -> ScoringConfig {
    let mut weights = BTreeMap::new();

    match scoring.get("weights").and_then(Value::as_mapping) {
        Some(entries) => {
            for (key, entry) in entries {
                let Some(signal) = key.as_str() else {
                    violations.push("scoring: weight keys must be strings".to_string());
                    continue;
                };
                if !taxonomy.is_empty() && !taxonomy.contains(signal) {
                    violations.push(format!(
                        "scoring: weight references unknown signal '{signal}'"
                    ));
                }
                match entry.as_f64() {
                    Some(weight) if weight.is_finite() => {
                        weights.insert(signal.to_string(), weight);
                    }
                    _ => violations.push(format!(
                        "scoring: weight for '{signal}' must be a finite number"
                    )),
                }
            }
        }
        None => violations.push("scoring: missing required key 'weights'".to_string()),
    }

    // Band thresholds are deliberately permissive: a missing or partially
    // specified section means "bands not configured", which the resolver
    // reports as None rather than a load failure.
    let recommendation_bands = band_thresholds(scoring);

    ScoringConfig {
        weights,
        recommendation_bands,
    }
}

fn band_thresholds(scoring: &Value) -> Option<BandThresholds> {
    let bands = scoring.get("recommendation_bands")?;
    Some(BandThresholds {
        ignore_max: bands.get("ignore_max")?.as_f64()?,
        watch_max: bands.get("watch_max")?.as_f64()?,
        high_priority_min: bands.get("high_priority_min")?.as_f64()?,
    })
}

fn validate_policy(
    policy: &Value,
    taxonomy: &BTreeSet<String>,
    violations: &mut Vec<String>,
) -> PolicyConfig {
    let mut config = PolicyConfig::default();

    if let Some(blocked) = policy.get("blocked_signals") {
        match blocked.as_sequence() {
            Some(entries) => {
                for entry in entries {
                    match entry.as_str() {
                        Some(signal) => {
                            check_signal(taxonomy, signal, "policy.blocked_signals", violations);
                            config.blocked_signals.insert(signal.to_string());
                        }
                        None => violations
                            .push("policy: blocked_signals entries must be strings".to_string()),
                    }
                }
            }
            None => violations.push("policy: blocked_signals must be a list".to_string()),
        }
    }

    if let Some(combinations) = policy.get("prohibited_combinations") {
        match combinations.as_sequence() {
            Some(entries) => {
                for entry in entries {
                    let pair = entry.as_sequence().map(|items| {
                        items
                            .iter()
                            .filter_map(Value::as_str)
                            .collect::<Vec<&str>>()
                    });
                    match pair.as_deref() {
                        Some([first, second]) => {
                            check_signal(
                                taxonomy,
                                first,
                                "policy.prohibited_combinations",
                                violations,
                            );
                            check_signal(
                                taxonomy,
                                second,
                                "policy.prohibited_combinations",
                                violations,
                            );
                            config
                                .prohibited_combinations
                                .push((first.to_string(), second.to_string()));
                        }
                        _ => violations.push(
                            "policy: prohibited_combinations entries must be pairs of signals"
                                .to_string(),
                        ),
                    }
                }
            }
            None => violations.push("policy: prohibited_combinations must be a list".to_string()),
        }
    }

    if let Some(rules) = policy.get("downgrade_rules") {
        match rules.as_sequence() {
            Some(entries) => {
                for entry in entries {
                    let trigger = entry.get("trigger_signal").and_then(Value::as_str);
                    let max = entry.get("max_recommendation").and_then(Value::as_str);
                    match (trigger, max) {
                        (Some(trigger), Some(max)) => {
                            check_signal(taxonomy, trigger, "policy.downgrade_rules", violations);
                            if RecommendationTier::from_label(max).is_none() {
                                violations.push(format!(
                                    "policy: downgrade rule for '{trigger}' names unknown tier '{max}'"
                                ));
                            }
                            config.downgrade_rules.push(DowngradeRule {
                                trigger_signal: trigger.to_string(),
                                max_recommendation: max.to_string(),
                            });
                        }
                        _ => violations.push(
                            "policy: downgrade rules require trigger_signal and max_recommendation"
                                .to_string(),
                        ),
                    }
                }
            }
            None => violations.push("policy: downgrade_rules must be a list".to_string()),
        }
    }

    if let Some(mapping) = policy.get("sensitivity_mapping") {
        match mapping.as_mapping() {
            Some(entries) => {
                for (key, entry) in entries {
                    match (key.as_str(), entry.as_str()) {
                        (Some(signal), Some(label)) if !label.is_empty() => {
                            check_signal(taxonomy, signal, "policy.sensitivity_mapping", violations);
                            config
                                .sensitivity_mapping
                                .insert(signal.to_string(), label.to_string());
                        }
                        _ => violations.push(
                            "policy: sensitivity_mapping entries must map signals to labels"
                                .to_string(),
                        ),
                    }
                }
            }
            None => violations.push("policy: sensitivity_mapping must be a mapping".to_string()),
        }
    }

    if let Some(threshold) = policy.get("stability_cap_threshold") {
        match threshold.as_f64() {
            Some(value) if (0.0..=1.0).contains(&value) => {
                config.stability_cap_threshold = Some(value);
            }
            _ => violations.push(
                "policy: stability_cap_threshold must be a number in [0, 1]".to_string(),
            ),
        }
    }

    config
}

fn check_signal(
    taxonomy: &BTreeSet<String>,
    signal: &str,
    context: &str,
    violations: &mut Vec<String>,
) {
    // An empty taxonomy already produced its own violation; avoid flagging
    // every downstream reference a second time.
    if !taxonomy.is_empty() && !taxonomy.contains(signal) {
        violations.push(format!("{context}: unknown signal '{signal}'"));
    }
}

fn required_string(
    document: &Value,
    document_name: &str,
    key: &str,
    violations: &mut Vec<String>,
) -> String {
    match document.get(key).and_then(Value::as_str) {
        Some(value) if !value.is_empty() => value.to_string(),
        Some(_) => {
            violations.push(format!("{document_name}: key '{key}' must not be empty"));
            String::new()
        }
        None => {
            violations.push(format!(
                "{document_name}: missing required string key '{key}'"
            ));
            String::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(raw: &str) -> Value {
        serde_yaml::from_str(raw).expect("fixture yaml parses")
    }

    fn documents<'a>(
        manifest: &'a Value,
        taxonomy: &'a Value,
        scoring: &'a Value,
        policy: &'a Value,
    ) -> ParsedDocuments<'a> {
        ParsedDocuments {
            manifest,
            taxonomy,
            scoring,
            policy,
            playbooks: &[],
        }
    }

    #[test]
    fn collects_every_violation_in_one_pass() {
        let manifest = parse("id: demo\nschema_version: '9'\n");
        let taxonomy = parse("signals: [hiring_surge]\n");
        let scoring = parse("weights:\n  unknown_signal: 0.4\n");
        let policy = parse("blocked_signals: [another_unknown]\n");

        let err = validate(&documents(&manifest, &taxonomy, &scoring, &policy))
            .expect_err("validation fails");

        assert!(err.iter().any(|v| v.contains("'version'")));
        assert!(err.iter().any(|v| v.contains("unsupported schema_version")));
        assert!(err.iter().any(|v| v.contains("unknown_signal")));
        assert!(err.iter().any(|v| v.contains("another_unknown")));
        assert!(err.len() >= 4, "expected aggregated violations, got {err:?}");
    }

    #[test]
    fn partial_band_thresholds_become_unconfigured_not_invalid() {
        let manifest = parse("id: demo\nversion: '1'\nschema_version: '1'\n");
        let taxonomy = parse("signals: [hiring_surge]\n");
        let scoring = parse("weights:\n  hiring_surge: 0.4\nrecommendation_bands:\n  ignore_max: 34\n");
        let policy = parse("{}");

        let bundle =
            validate(&documents(&manifest, &taxonomy, &scoring, &policy)).expect("valid bundle");
        assert!(bundle.scoring.recommendation_bands.is_none());
    }

    #[test]
    fn rejects_out_of_range_stability_cap() {
        let manifest = parse("id: demo\nversion: '1'\nschema_version: '1'\n");
        let taxonomy = parse("signals: [hiring_surge]\n");
        let scoring = parse("weights: {}\n");
        let policy = parse("stability_cap_threshold: 1.4\n");

        let err = validate(&documents(&manifest, &taxonomy, &scoring, &policy))
            .expect_err("threshold out of range");
        assert!(err.iter().any(|v| v.contains("stability_cap_threshold")));
    }
}
