//! Orchestrates factor calculation, aggregation, feature building and
//! inference for a whole race field, then ranks entries by combined score.

use crate::aggregator;
use crate::domain::{PredictionResult, ShutubaData};
use crate::factors::{self, FactorContext, StyleWinRateTable};
use crate::features;
use crate::model::Predictor;
use crate::pedigree::PedigreeMaster;
use crate::repository::{HorseRepository, PastResultsRepository, DEFAULT_PAST_RESULTS_LIMIT};
use crate::weights::FactorWeights;

pub struct PredictionService<R: PastResultsRepository, H: HorseRepository> {
    repository: R,
    horses: H,
    weights: FactorWeights,
    pedigree_master: PedigreeMaster,
    style_table: StyleWinRateTable,
    predictor: Option<Predictor>,
}

impl<R: PastResultsRepository, H: HorseRepository> PredictionService<R, H> {
    pub fn new(repository: R, horses: H, predictor: Option<Predictor>) -> Self {
        Self {
            repository,
            horses,
            weights: FactorWeights::default(),
            pedigree_master: PedigreeMaster::default(),
            style_table: StyleWinRateTable::default(),
            predictor,
        }
    }

    pub fn with_weights(mut self, weights: FactorWeights) -> Self {
        self.weights = weights;
        self
    }

    pub fn with_style_table(mut self, style_table: StyleWinRateTable) -> Self {
        self.style_table = style_table;
        self
    }

    pub async fn predict_race(&self, shutuba: &ShutubaData) -> anyhow::Result<Vec<PredictionResult>> {
        let field_size = shutuba.field_size();
        let mut factor_score_maps = Vec::with_capacity(field_size);
        let mut feature_rows = Vec::with_capacity(field_size);

        for entry in &shutuba.entries {
            let past_results = self
                .repository
                .get_past_results(&entry.horse_id, shutuba.date, DEFAULT_PAST_RESULTS_LIMIT)
                .await?;
            let horse = self.horses.get_horse(&entry.horse_id).await?;

            let context = FactorContext {
                venue_name: &shutuba.venue_name,
                target_surface: shutuba.surface,
                target_distance_metres: shutuba.distance_metres,
                track_condition: shutuba.track_condition,
                sire_name: horse.as_ref().and_then(|h| h.sire_name.as_deref()),
                dam_sire_name: horse.as_ref().and_then(|h| h.dam_sire_name.as_deref()),
                odds: entry.odds,
                popularity_rank: entry.popularity,
                field_size: field_size as u16,
                current_date: shutuba.date,
                pedigree_master: &self.pedigree_master,
                style_table: &self.style_table,
            };

            let factor_scores = factors::compute_all(&entry.horse_id, &past_results, &context);
            let row = features::build_row(&factor_scores, entry, field_size, &past_results, shutuba.date);

            factor_score_maps.push(factor_scores);
            feature_rows.push(row);
        }

        let total_scores: Vec<Option<f64>> = factor_score_maps
            .iter()
            .map(|scores| aggregator::total_score(scores, &self.weights))
            .collect();

        let ml_probabilities = match &self.predictor {
            Some(predictor) => predictor.predict_probabilities(&features::build_matrix(&feature_rows))?,
            None => vec![0.0; field_size],
        };

        let max_ml_probability = ml_probabilities.iter().copied().fold(0.0_f64, f64::max);

        let mut results: Vec<PredictionResult> = shutuba
            .entries
            .iter()
            .enumerate()
            .map(|(i, entry)| {
                let total_score = total_scores[i];
                let ml_probability = ml_probabilities[i];
                let combined_score = combined_score(ml_probability, max_ml_probability, total_score);

                PredictionResult {
                    horse_number: entry.horse_number,
                    horse_name: entry.horse_name.clone(),
                    horse_id: entry.horse_id.clone(),
                    ml_probability,
                    factor_scores: std::mem::take(&mut factor_score_maps[i]),
                    total_score,
                    combined_score,
                    rank: 0,
                }
            })
            .collect();

        rank_by_combined_score(&mut results);
        Ok(results)
    }
}

/// `sqrt((ml_probability / max_ml_probability) * 100 * total_score)`, with
/// the documented zero-max-probability and missing-operand escape hatches.
fn combined_score(ml_probability: f64, max_ml_probability: f64, total_score: Option<f64>) -> Option<f64> {
    let total_score = total_score?;
    if max_ml_probability == 0.0 {
        return Some(total_score);
    }
    let normalized = ml_probability / max_ml_probability * 100.0 * total_score;
    Some(normalized.max(0.0).sqrt())
}

fn rank_by_combined_score(results: &mut [PredictionResult]) {
    results.sort_by(|a, b| {
        match (a.combined_score, b.combined_score) {
            (Some(x), Some(y)) => y
                .partial_cmp(&x)
                .unwrap()
                .then_with(|| b.ml_probability.partial_cmp(&a.ml_probability).unwrap())
                .then_with(|| a.horse_number.cmp(&b.horse_number)),
            (Some(_), None) => std::cmp::Ordering::Less,
            (None, Some(_)) => std::cmp::Ordering::Greater,
            (None, None) => a.horse_number.cmp(&b.horse_number),
        }
    });
    for (index, result) in results.iter_mut().enumerate() {
        result.rank = index as u32 + 1;
    }
}
