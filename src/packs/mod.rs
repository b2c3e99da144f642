//! Versioned configuration bundles ("packs") driving scoring and gating.
//!
//! A pack is loaded once per `(pack_id, version)`, validated, checksummed, and
//! never mutated afterwards, so callers may share it freely across evaluation
//! threads. The raw YAML documents are discarded after validation; only the
//! typed view below is retained downstream.

mod checksum;
mod schema;
mod store;
mod validate;

pub use store::{PackError, PackStore};
pub use validate::{validate_root, PackOutcome, ValidationReport};

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

/// Identity and schema declaration carried by a bundle's manifest document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackManifest {
    pub id: String,
    pub version: String,
    pub schema_version: String,
}

/// Policy rule capping the recommendation tier when a trigger signal is present.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DowngradeRule {
    pub trigger_signal: String,
    pub max_recommendation: String,
}

/// Gating rules declared by the pack's policy document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct PolicyConfig {
    pub blocked_signals: BTreeSet<String>,
    pub prohibited_combinations: Vec<(String, String)>,
    pub downgrade_rules: Vec<DowngradeRule>,
    pub sensitivity_mapping: BTreeMap<String, String>,
    pub stability_cap_threshold: Option<f64>,
}

/// Priority band cutoffs for integer composite scores.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BandThresholds {
    pub ignore_max: f64,
    pub watch_max: f64,
    pub high_priority_min: f64,
}

/// Weight map and band thresholds from the pack's scoring document.
///
/// `recommendation_bands` is `None` when the document omits the section or
/// leaves it partially specified; band resolution treats that as
/// "not configured" rather than an error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ScoringConfig {
    pub weights: BTreeMap<String, f64>,
    pub recommendation_bands: Option<BandThresholds>,
}

/// Immutable, validated configuration bundle for one product line.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Pack {
    pub pack_id: String,
    pub version: String,
    pub schema_version: String,
    pub taxonomy: BTreeSet<String>,
    pub scoring: ScoringConfig,
    pub policy: PolicyConfig,
    /// Raw playbook bodies keyed by file stem, kept for content tooling.
    pub playbooks: BTreeMap<String, String>,
    /// Deterministic digest over canonicalized bundle content, used by
    /// callers to detect configuration drift between deployments.
    pub config_checksum: String,
}

impl Pack {
    /// Accessor surface the evaluators read configuration through, keyed by
    /// the manifest's `schema_version`. A future schema revision adds a
    /// variant here instead of touching the evaluators.
    pub fn surface(&self) -> ConfigSurface<'_> {
        ConfigSurface::V1(self)
    }
}

/// Schema-versioned view over a pack's scoring and policy configuration.
#[derive(Debug, Clone, Copy)]
pub enum ConfigSurface<'a> {
    V1(&'a Pack),
}

impl<'a> ConfigSurface<'a> {
    pub fn weights(&self) -> &'a BTreeMap<String, f64> {
        match self {
            ConfigSurface::V1(pack) => &pack.scoring.weights,
        }
    }

    pub fn band_thresholds(&self) -> Option<BandThresholds> {
        match self {
            ConfigSurface::V1(pack) => pack.scoring.recommendation_bands,
        }
    }

    pub fn stability_cap_threshold(&self) -> Option<f64> {
        match self {
            ConfigSurface::V1(pack) => pack.policy.stability_cap_threshold,
        }
    }

    pub fn policy(&self) -> &'a PolicyConfig {
        match self {
            ConfigSurface::V1(pack) => &pack.policy,
        }
    }
}
