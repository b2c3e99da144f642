use std::collections::BTreeMap;
use std::collections::BTreeSet;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Unordered set of signal identifiers observed for one account at one
/// evaluation instant. No identity beyond its membership.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SignalSet {
    ids: BTreeSet<String>,
}

impl SignalSet {
    pub fn new<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            ids: ids.into_iter().map(Into::into).collect(),
        }
    }

    pub fn contains(&self, signal_id: &str) -> bool {
        self.ids.contains(signal_id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.ids.iter().map(String::as_str)
    }
}

/// Classification of an observed account event feeding the stress indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignalEventCategory {
    /// Language indicating urgency or distress in account communications.
    UrgencyLanguage,
    /// Everything else; counts toward consistency but not volatility.
    Routine,
}

/// A dated, confidence-weighted observation about the account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalEvent {
    pub category: SignalEventCategory,
    /// Extraction confidence in [0, 1].
    pub confidence: f64,
    pub observed_on: NaiveDate,
}

/// Point-in-time organizational pressure reading (0-100 scale).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PressureSnapshot {
    pub pressure: f64,
    pub observed_on: NaiveDate,
}

/// Everything one evaluation consumes, assembled by the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationInput {
    /// Raw TRS engagement score on the 0-100 scale.
    pub trs: f64,
    #[serde(default)]
    pub signals: SignalSet,
    #[serde(default)]
    pub events: Vec<SignalEvent>,
    #[serde(default)]
    pub pressure_snapshots: Vec<PressureSnapshot>,
    #[serde(default)]
    pub last_outreach_on: Option<NaiveDate>,
    /// Strategic alignment confirmation; absence is treated permissively.
    #[serde(default)]
    pub alignment_ok: Option<bool>,
    pub as_of: NaiveDate,
}

/// Discrete outreach aggressiveness tiers, ordered from most to least
/// conservative.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RecommendationTier {
    #[serde(rename = "Observe Only")]
    ObserveOnly,
    #[serde(rename = "Soft Value Share")]
    SoftValueShare,
    #[serde(rename = "Low-Pressure Intro")]
    LowPressureIntro,
    #[serde(rename = "Standard Outreach")]
    StandardOutreach,
    #[serde(rename = "Direct Strategic Outreach")]
    DirectStrategicOutreach,
}

impl RecommendationTier {
    pub fn label(&self) -> &'static str {
        match self {
            RecommendationTier::ObserveOnly => "Observe Only",
            RecommendationTier::SoftValueShare => "Soft Value Share",
            RecommendationTier::LowPressureIntro => "Low-Pressure Intro",
            RecommendationTier::StandardOutreach => "Standard Outreach",
            RecommendationTier::DirectStrategicOutreach => "Direct Strategic Outreach",
        }
    }

    /// Parse a pack-provided tier label, e.g. from a downgrade rule.
    pub fn from_label(raw: &str) -> Option<Self> {
        match raw {
            "Observe Only" => Some(RecommendationTier::ObserveOnly),
            "Soft Value Share" => Some(RecommendationTier::SoftValueShare),
            "Low-Pressure Intro" => Some(RecommendationTier::LowPressureIntro),
            "Standard Outreach" => Some(RecommendationTier::StandardOutreach),
            "Direct Strategic Outreach" => Some(RecommendationTier::DirectStrategicOutreach),
            _ => None,
        }
    }
}

impl std::fmt::Display for RecommendationTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Whether outreach may proceed, and under what constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Decision {
    Allow,
    AllowWithConstraints,
    Suppress,
}

/// Audit code naming the rule branch that produced a decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReasonCode {
    Legacy,
    CoreBan,
    BlockedSignal,
    ProhibitedCombination,
    DowngradeRule,
    None,
}

impl ReasonCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReasonCode::Legacy => "legacy",
            ReasonCode::CoreBan => "core_ban",
            ReasonCode::BlockedSignal => "blocked_signal",
            ReasonCode::ProhibitedCombination => "prohibited_combination",
            ReasonCode::DowngradeRule => "downgrade_rule",
            ReasonCode::None => "none",
        }
    }
}

/// Outcome of the rule-precedence gate for one evaluation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionResult {
    pub decision: Decision,
    pub reason_code: ReasonCode,
    pub sensitivity_level: Option<String>,
    /// Tier label capping the recommendation, from a matched downgrade rule.
    pub tone_constraint: Option<String>,
}

/// Final externally-visible outreach recommendation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub tier: RecommendationTier,
    pub should_generate_draft: bool,
    pub safeguards_triggered: Vec<String>,
}

/// Coarse priority band derived from an integer composite score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PriorityBand {
    #[serde(rename = "IGNORE")]
    Ignore,
    #[serde(rename = "WATCH")]
    Watch,
    #[serde(rename = "HIGH_PRIORITY")]
    HighPriority,
}

/// Flat audit record of every intermediate factor behind an ESL evaluation.
///
/// Persisted downstream as a primitive-valued record, so nothing here may be
/// nested beyond the weight map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EslExplain {
    pub base_engageability: f64,
    pub stress_volatility_index: f64,
    pub sustained_pressure_index: f64,
    pub consistency_index: f64,
    pub stability_modifier: f64,
    pub cadence_modifier: f64,
    pub alignment_modifier: f64,
    pub esl_composite: f64,
    pub recommendation_tier: RecommendationTier,
    pub cadence_blocked: bool,
    pub outreach_score: i64,
    pub weights: BTreeMap<String, f64>,
}
