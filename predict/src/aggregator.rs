//! Weighted aggregator: re-normalizes factor weights over whichever factors
//! actually produced a score, so a horse missing one or two factors isn't
//! penalized by treating the missing ones as zero.

use rustc_hash::FxHashMap;

use crate::domain::FactorName;
use crate::weights::FactorWeights;

pub fn total_score(
    factor_scores: &FxHashMap<FactorName, Option<f64>>,
    weights: &FactorWeights,
) -> Option<f64> {
    let mut weighted_sum = 0.0;
    let mut weight_total = 0.0;

    for &name in FactorName::ALL.iter() {
        if let Some(Some(value)) = factor_scores.get(&name) {
            let weight = weights.get(name);
            weighted_sum += weight * value;
            weight_total += weight;
        }
    }

    if weight_total == 0.0 {
        return None;
    }
    Some(weighted_sum / weight_total)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scores(pairs: &[(FactorName, Option<f64>)]) -> FxHashMap<FactorName, Option<f64>> {
        pairs.iter().cloned().collect()
    }

    #[test]
    fn all_missing_is_missing() {
        let weights = FactorWeights::default();
        let map = scores(&FactorName::ALL.map(|n| (n, None)));
        assert_eq!(None, total_score(&map, &weights));
    }

    #[test]
    fn all_present_stays_in_bounds() {
        let weights = FactorWeights::default();
        let map = scores(&FactorName::ALL.map(|n| (n, Some(60.0))));
        let total = total_score(&map, &weights).unwrap();
        assert_float_eq::assert_float_relative_eq!(60.0, total, 1e-9);
    }

    #[test]
    fn partial_missing_renormalizes() {
        let weights = FactorWeights::default();
        let mut map = scores(&FactorName::ALL.map(|n| (n, Some(50.0))));
        map.insert(FactorName::Pedigree, None);
        let total = total_score(&map, &weights).unwrap();
        assert!((0.0..=100.0).contains(&total));
        assert_float_eq::assert_float_relative_eq!(50.0, total, 1e-9);
    }
}
