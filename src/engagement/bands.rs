//! Integer composite score to coarse priority band mapping.

use super::domain::PriorityBand;
use crate::packs::Pack;

/// Resolve the priority band for an integer composite score.
///
/// `None` is the deliberate "not configured" outcome, distinct from an
/// error: no pack, missing or partial thresholds, a misordered threshold
/// triple, or a composite falling in an uncovered gap all yield `None`.
pub fn resolve(composite: i64, pack: Option<&Pack>) -> Option<PriorityBand> {
    let thresholds = pack?.surface().band_thresholds()?;

    if !(thresholds.ignore_max < thresholds.watch_max
        && thresholds.watch_max < thresholds.high_priority_min)
    {
        return None;
    }

    let composite = composite as f64;
    if composite <= thresholds.ignore_max {
        Some(PriorityBand::Ignore)
    } else if composite <= thresholds.watch_max {
        Some(PriorityBand::Watch)
    } else if composite >= thresholds.high_priority_min {
        Some(PriorityBand::HighPriority)
    } else {
        None
    }
}
