//! Exact ESL factor formulas.
//!
//! Decision audits and historical backfills compare against persisted values
//! computed by these functions, so every formula here is bit-for-bit
//! reproducible: no randomness, no platform-dependent ordering, and banker's
//! rounding for the legacy outreach score.

use std::collections::BTreeMap;

use chrono::NaiveDate;

use super::domain::{
    EslExplain, EvaluationInput, PressureSnapshot, RecommendationTier, SignalEvent,
    SignalEventCategory,
};

/// Days after an outreach during which cadence fully vetoes the composite.
pub const COOLDOWN_DAYS: i64 = 60;

/// Exponential decay constant (days) for urgency-language contributions.
const SVI_DECAY_DAYS: f64 = 90.0;
/// Aggregate urgency mass that saturates the volatility index at 1.
const SVI_SATURATION: f64 = 3.0;

/// Minimum pressure reading that counts toward sustained pressure.
const SPI_PRESSURE_FLOOR: f64 = 60.0;
/// Sustained duration (days) at which the duration factor saturates.
const SPI_FULL_DURATION_DAYS: f64 = 60.0;
/// Pressure magnitude at which the magnitude factor saturates.
const SPI_FULL_PRESSURE: f64 = 90.0;

/// Largest silence gap (days) that leaves consistency untouched.
const CSI_GAP_GRACE_DAYS: f64 = 45.0;
/// Additional gap days over which the penalty ramps to its ceiling.
const CSI_GAP_RAMP_DAYS: f64 = 270.0;
/// Consistency never drops below this floor.
const CSI_PENALTY_CEILING: f64 = 0.6;

const SVI_STABILITY_WEIGHT: f64 = 0.6;
const SPI_STABILITY_WEIGHT: f64 = 0.4;

/// TRS mapped onto [0, 1], clamping out-of-range inputs.
pub fn base_engageability(trs: f64) -> f64 {
    trs.clamp(0.0, 100.0) / 100.0
}

/// Weighted combination of the three stability sub-indices.
///
/// Strictly decreasing in `svi` and `spi` whenever `csi > 0`; equal to `csi`
/// under all-low-stress inputs, so a quiet account with default consistency
/// scores 1.
pub fn stability_modifier(svi: f64, spi: f64, csi: f64) -> f64 {
    let combined =
        csi * (1.0 - SVI_STABILITY_WEIGHT * svi) * (1.0 - SPI_STABILITY_WEIGHT * spi);
    combined.clamp(0.0, 1.0)
}

/// Stress/volatility index: time-decayed, confidence-weighted mass of
/// urgency-language events observed on or before `as_of`. Zero when no such
/// events exist.
pub fn stress_volatility_index(events: &[SignalEvent], as_of: NaiveDate) -> f64 {
    let mut mass = 0.0;
    for event in events {
        if event.category != SignalEventCategory::UrgencyLanguage {
            continue;
        }
        let age_days = (as_of - event.observed_on).num_days();
        if age_days < 0 {
            continue;
        }
        let decay = (-(age_days as f64) / SVI_DECAY_DAYS).exp();
        mass += event.confidence.clamp(0.0, 1.0) * decay;
    }

    (mass / SVI_SATURATION).clamp(0.0, 1.0)
}

/// Sustained pressure index: zero unless some snapshot on or before `as_of`
/// reads at or above the pressure floor; otherwise the product of a duration
/// factor (days since the earliest qualifying snapshot, saturating at 60) and
/// a magnitude factor (peak pressure, saturating at 90).
pub fn sustained_pressure_index(snapshots: &[PressureSnapshot], as_of: NaiveDate) -> f64 {
    let mut earliest: Option<NaiveDate> = None;
    let mut peak = 0.0_f64;
    for snapshot in snapshots {
        if snapshot.observed_on > as_of || snapshot.pressure < SPI_PRESSURE_FLOOR {
            continue;
        }
        peak = peak.max(snapshot.pressure);
        earliest = Some(match earliest {
            Some(current) => current.min(snapshot.observed_on),
            None => snapshot.observed_on,
        });
    }

    let Some(earliest) = earliest else {
        return 0.0;
    };

    let sustained_days = (as_of - earliest).num_days() as f64;
    let duration_factor = (sustained_days / SPI_FULL_DURATION_DAYS).min(1.0);
    let magnitude_factor = (peak / SPI_FULL_PRESSURE).min(1.0);
    (duration_factor * magnitude_factor).clamp(0.0, 1.0)
}

/// Consistency index: defaults to 1 with no events or no silence gap beyond
/// the grace window; decreases linearly as the largest gap (between
/// consecutive events, and from the last event to `as_of`) grows.
pub fn consistency_index(events: &[SignalEvent], as_of: NaiveDate) -> f64 {
    let mut dates: Vec<NaiveDate> = events
        .iter()
        .filter(|event| event.observed_on <= as_of)
        .map(|event| event.observed_on)
        .collect();
    if dates.is_empty() {
        return 1.0;
    }
    dates.sort();

    let mut max_gap_days = (as_of - dates[dates.len() - 1]).num_days();
    for pair in dates.windows(2) {
        max_gap_days = max_gap_days.max((pair[1] - pair[0]).num_days());
    }

    let excess = max_gap_days as f64 - CSI_GAP_GRACE_DAYS;
    if excess <= 0.0 {
        return 1.0;
    }

    let penalty = (excess / CSI_GAP_RAMP_DAYS).min(CSI_PENALTY_CEILING);
    (1.0 - penalty).clamp(0.0, 1.0)
}

/// Hard cadence veto: 0 when the last outreach is within the cooldown window
/// of `as_of` (inclusive), 1 when older or when no outreach history exists.
pub fn cadence_modifier(last_outreach_on: Option<NaiveDate>, as_of: NaiveDate) -> f64 {
    match last_outreach_on {
        Some(last) if (as_of - last).num_days() <= COOLDOWN_DAYS => 0.0,
        _ => 1.0,
    }
}

/// Permissive alignment factor: only an explicit mismatch halves the score.
pub fn alignment_modifier(alignment_ok: Option<bool>) -> f64 {
    match alignment_ok {
        Some(false) => 0.5,
        _ => 1.0,
    }
}

/// Multiplicative composite; any zero factor (notably cadence inside the
/// cooldown window) drives the result to exactly 0.
pub fn esl_composite(
    base_engageability: f64,
    stability_modifier: f64,
    cadence_modifier: f64,
    alignment_modifier: f64,
) -> f64 {
    base_engageability * stability_modifier * cadence_modifier * alignment_modifier
}

/// Tier bands over the composite, lower-inclusive at every boundary.
pub fn recommendation_tier(esl: f64) -> RecommendationTier {
    if esl < 0.2 {
        RecommendationTier::ObserveOnly
    } else if esl < 0.4 {
        RecommendationTier::SoftValueShare
    } else if esl < 0.7 {
        RecommendationTier::LowPressureIntro
    } else if esl < 0.9 {
        RecommendationTier::StandardOutreach
    } else {
        RecommendationTier::DirectStrategicOutreach
    }
}

/// Legacy outreach score. Banker's rounding is mandatory for parity with
/// historically persisted values.
pub fn outreach_score(trs: f64, stability_modifier: f64) -> i64 {
    (trs * stability_modifier).round_ties_even() as i64
}

/// Assemble every intermediate factor plus the final tier as a flat record
/// for audit persistence.
pub fn explain(input: &EvaluationInput, weights: &BTreeMap<String, f64>) -> EslExplain {
    let base = base_engageability(input.trs);
    let svi = stress_volatility_index(&input.events, input.as_of);
    let spi = sustained_pressure_index(&input.pressure_snapshots, input.as_of);
    let csi = consistency_index(&input.events, input.as_of);
    let stability = stability_modifier(svi, spi, csi);
    let cadence = cadence_modifier(input.last_outreach_on, input.as_of);
    let alignment = alignment_modifier(input.alignment_ok);
    let composite = esl_composite(base, stability, cadence, alignment);

    EslExplain {
        base_engageability: base,
        stress_volatility_index: svi,
        sustained_pressure_index: spi,
        consistency_index: csi,
        stability_modifier: stability,
        cadence_modifier: cadence,
        alignment_modifier: alignment,
        esl_composite: composite,
        recommendation_tier: recommendation_tier(composite),
        cadence_blocked: cadence == 0.0,
        outreach_score: outreach_score(input.trs, stability),
        weights: weights.clone(),
    }
}
