//! Operational guardrails applied on top of scoring and the decision gate.

use super::domain::{Recommendation, RecommendationTier};
use crate::packs::Pack;

/// Stability cap applied when the pack does not configure one.
pub const DEFAULT_STABILITY_CAP: f64 = 0.7;

/// Pick the final recommendation tier and whether draft generation is
/// permitted. Cooldown is checked first and takes precedence over the
/// stability cap.
pub fn check(
    cooldown_active: bool,
    stability_modifier: f64,
    alignment_high: bool,
    pack: Option<&Pack>,
) -> Recommendation {
    let threshold = pack
        .and_then(|pack| pack.surface().stability_cap_threshold())
        .filter(|value| (0.0..=1.0).contains(value))
        .unwrap_or(DEFAULT_STABILITY_CAP);

    if cooldown_active {
        return Recommendation {
            tier: RecommendationTier::ObserveOnly,
            should_generate_draft: false,
            safeguards_triggered: vec!["Cooldown active → Do not contact".to_string()],
        };
    }

    if stability_modifier < threshold {
        return Recommendation {
            tier: RecommendationTier::SoftValueShare,
            should_generate_draft: true,
            safeguards_triggered: vec![format!(
                "Stability modifier below cap {threshold:.2} → limit to value-share outreach"
            )],
        };
    }

    if alignment_high {
        return Recommendation {
            tier: RecommendationTier::LowPressureIntro,
            should_generate_draft: true,
            safeguards_triggered: Vec::new(),
        };
    }

    // Alignment not confirmed high: stay conservative without flagging a
    // safeguard.
    Recommendation {
        tier: RecommendationTier::SoftValueShare,
        should_generate_draft: true,
        safeguards_triggered: Vec::new(),
    }
}
