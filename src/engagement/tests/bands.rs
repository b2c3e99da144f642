use super::common::sample_pack;
use crate::engagement::bands::resolve;
use crate::engagement::domain::PriorityBand;

#[test]
fn resolves_bands_against_sample_thresholds() {
    let pack = sample_pack();
    let table = [
        (0, Some(PriorityBand::Ignore)),
        (34, Some(PriorityBand::Ignore)),
        (35, Some(PriorityBand::Watch)),
        (50, Some(PriorityBand::Watch)),
        (69, Some(PriorityBand::Watch)),
        (70, Some(PriorityBand::HighPriority)),
        (100, Some(PriorityBand::HighPriority)),
    ];
    for (composite, expected) in table {
        assert_eq!(resolve(composite, Some(&pack)), expected, "composite={composite}");
    }
}

#[test]
fn missing_pack_or_thresholds_yields_none() {
    assert_eq!(resolve(50, None), None);

    let mut pack = sample_pack();
    pack.scoring.recommendation_bands = None;
    assert_eq!(resolve(50, Some(&pack)), None);
}

#[test]
fn misordered_thresholds_yield_none() {
    let mut pack = sample_pack();
    let mut bands = pack.scoring.recommendation_bands.expect("sample has bands");
    bands.watch_max = bands.ignore_max;
    pack.scoring.recommendation_bands = Some(bands);
    assert_eq!(resolve(10, Some(&pack)), None);
}
