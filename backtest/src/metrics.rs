//! Race-grouped Precision@K (§4.K): the only correct form, since pooling
//! predictions across races before computing precision lets large fields
//! dominate the metric. Both ML-ranked and factor-ranked variants are
//! computed from the same [`RaceBacktestResult`] so they're always reported
//! side by side.

use rustc_hash::FxHashMap;

use shutuba_predict::domain::{FactorName, PredictionResult};

use crate::engine::RaceBacktestResult;

/// Precision@1, Precision@3 and hit-rate-rank-{1,2,3}, averaged over races.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RaceMetrics {
    pub precision_at_1: f64,
    pub precision_at_3: f64,
    pub hit_rate_rank_1: f64,
    pub hit_rate_rank_2: f64,
    pub hit_rate_rank_3: f64,
    pub races: usize,
}

/// ML-driven and factor-driven variants computed over the same race set.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DualMetrics {
    pub ml: RaceMetrics,
    pub factor: RaceMetrics,
}

pub fn compute_dual_metrics(results: &[RaceBacktestResult]) -> DualMetrics {
    DualMetrics {
        ml: compute_race_metrics(results, rank_by_ml_probability),
        factor: compute_race_metrics(results, rank_by_total_score),
    }
}

fn rank_by_ml_probability(predictions: &[PredictionResult]) -> Vec<u8> {
    let mut ranked: Vec<&PredictionResult> = predictions.iter().collect();
    ranked.sort_by(|a, b| {
        b.ml_probability
            .partial_cmp(&a.ml_probability)
            .unwrap()
            .then_with(|| a.horse_number.cmp(&b.horse_number))
    });
    ranked.into_iter().map(|p| p.horse_number).collect()
}

fn rank_by_total_score(predictions: &[PredictionResult]) -> Vec<u8> {
    let mut ranked: Vec<&PredictionResult> = predictions.iter().collect();
    ranked.sort_by(|a, b| match (a.total_score, b.total_score) {
        (Some(x), Some(y)) => y.partial_cmp(&x).unwrap().then_with(|| a.horse_number.cmp(&b.horse_number)),
        (Some(_), None) => std::cmp::Ordering::Less,
        (None, Some(_)) => std::cmp::Ordering::Greater,
        (None, None) => a.horse_number.cmp(&b.horse_number),
    });
    ranked.into_iter().map(|p| p.horse_number).collect()
}

fn compute_race_metrics(
    results: &[RaceBacktestResult],
    rank: impl Fn(&[PredictionResult]) -> Vec<u8>,
) -> RaceMetrics {
    let mut precision_1_sum = 0.0;
    let mut precision_3_sum = 0.0;
    let mut hit_rank = [0.0f64; 3];
    let mut races = 0usize;

    for race in results {
        let top3: std::collections::HashSet<u8> = race
            .actual_results
            .iter()
            .filter(|r| r.finished_in_top3())
            .map(|r| r.horse_number)
            .collect();
        if top3.is_empty() {
            continue;
        }

        let ranked = rank(&race.predictions);
        if ranked.is_empty() {
            continue;
        }

        races += 1;
        if top3.contains(&ranked[0]) {
            precision_1_sum += 1.0;
        }
        let top3_predicted: std::collections::HashSet<u8> = ranked.iter().take(3).copied().collect();
        precision_3_sum += top3_predicted.intersection(&top3).count() as f64 / 3.0;

        for (k, slot) in hit_rank.iter_mut().enumerate() {
            if let Some(&horse_number) = ranked.get(k) {
                if top3.contains(&horse_number) {
                    *slot += 1.0;
                }
            }
        }
    }

    if races == 0 {
        return RaceMetrics {
            precision_at_1: f64::NAN,
            precision_at_3: f64::NAN,
            hit_rate_rank_1: f64::NAN,
            hit_rate_rank_2: f64::NAN,
            hit_rate_rank_3: f64::NAN,
            races: 0,
        };
    }

    RaceMetrics {
        precision_at_1: precision_1_sum / races as f64,
        precision_at_3: precision_3_sum / races as f64,
        hit_rate_rank_1: hit_rank[0] / races as f64,
        hit_rate_rank_2: hit_rank[1] / races as f64,
        hit_rate_rank_3: hit_rank[2] / races as f64,
        races,
    }
}

/// Mean factor score per [`FactorName`] across a result set, skipping
/// missing values rather than treating them as zero. Used by the reporter's
/// supplementary factor-coverage block.
pub fn mean_factor_scores(results: &[RaceBacktestResult]) -> FxHashMap<FactorName, f64> {
    let mut sums: FxHashMap<FactorName, f64> = FxHashMap::default();
    let mut counts: FxHashMap<FactorName, usize> = FxHashMap::default();

    for race in results {
        for prediction in &race.predictions {
            for (name, score) in &prediction.factor_scores {
                if let Some(value) = score {
                    *sums.entry(*name).or_insert(0.0) += value;
                    *counts.entry(*name).or_insert(0) += 1;
                }
            }
        }
    }

    sums.into_iter()
        .filter_map(|(name, sum)| counts.get(&name).map(|&count| (name, sum / count as f64)))
        .collect()
}
