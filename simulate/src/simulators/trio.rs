//! Trio (sanrenpuku) simulator (§4.J): a single bet on the unordered triple
//! of the top-3 predictions; hits if it equals the actual unordered top 3.

use async_trait::async_trait;
use chrono::NaiveDate;

use shutuba_predict::domain::{PredictionResult, Race};
use shutuba_predict::race_id::RaceId;
use shutuba_predict::reconstruction::race_display_name;
use shutuba_predict::repository::{HorseRepository, PastResultsRepository, RaceDatabase};

use crate::base::{BaseSimulator, TicketSimulator};
use crate::fetcher::PayoutFetcher;
use crate::ticket::{summarize, Summary, TicketRaceRecord};

const TRIO_SIZE: usize = 3;

fn sorted_triple(a: u8, b: u8, c: u8) -> (u8, u8, u8) {
    let mut values = [a, b, c];
    values.sort_unstable();
    (values[0], values[1], values[2])
}

/// The single unordered triple from the top-3 predictions, or `None` when
/// fewer than 3 candidates exist and no trio bet can be formed.
fn predicted_trio(predictions: &[PredictionResult]) -> Option<(u8, u8, u8)> {
    if predictions.len() < TRIO_SIZE {
        return None;
    }
    Some(sorted_triple(predictions[0].horse_number, predictions[1].horse_number, predictions[2].horse_number))
}

#[derive(Debug, Clone, PartialEq)]
pub struct TrioRaceRecord {
    pub race_id: RaceId,
    pub race_name: String,
    pub venue: String,
    pub race_date: NaiveDate,
    pub investment: u32,
    pub payout_total: u32,
    pub predicted_trio: Option<(u8, u8, u8)>,
    pub actual_trio: Option<(u8, u8, u8)>,
    pub hit: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TrioSummary {
    pub period_from: NaiveDate,
    pub period_to: NaiveDate,
    pub total_races: usize,
    pub total_hits: usize,
    pub hit_rate: f64,
    pub total_investment: u64,
    pub total_payout: u64,
    pub return_rate: f64,
    pub race_results: Vec<TrioRaceRecord>,
}

pub struct TrioSimulator<D, F, R, H> {
    pub base: BaseSimulator<D, F, R, H>,
}

impl<D, F, R, H> TrioSimulator<D, F, R, H>
where
    D: RaceDatabase,
    F: PayoutFetcher,
    R: PastResultsRepository,
    H: HorseRepository,
{
    pub fn new(base: BaseSimulator<D, F, R, H>) -> Self {
        Self { base }
    }
}

#[async_trait]
impl<D, F, R, H> TicketSimulator for TrioSimulator<D, F, R, H>
where
    D: RaceDatabase + Sync,
    F: PayoutFetcher + Sync,
    R: PastResultsRepository + Sync,
    H: HorseRepository + Sync,
{
    type Record = TrioRaceRecord;
    type Summary = TrioSummary;

    async fn simulate_race(&self, race: &Race) -> anyhow::Result<Self::Record> {
        let (predictions, _results) = crate::base::score_race(&self.base, race).await?;
        let predicted = predicted_trio(&predictions);
        let investment = if predicted.is_some() { 100 } else { 0 };

        if predicted.is_none() {
            return Ok(TrioRaceRecord {
                race_id: race.id.clone(),
                race_name: race_display_name(race),
                venue: race.venue_name.clone(),
                race_date: race.date,
                investment,
                payout_total: 0,
                predicted_trio: None,
                actual_trio: None,
                hit: false,
            });
        }

        let trio_payout = match self.base.fetcher.fetch_trio_payout(&race.id).await {
            Ok(payout) => payout,
            Err(err) => {
                tracing::warn!(race_id = %race.id, error = %err, "trio payout unavailable, treating as absent");
                None
            }
        };

        let (actual_trio, hit, payout_total) = match trio_payout {
            Some((trio, payout)) if Some(trio) == predicted => (Some(trio), true, payout),
            Some((trio, _)) => (Some(trio), false, 0),
            None => (None, false, 0),
        };

        Ok(TrioRaceRecord {
            race_id: race.id.clone(),
            race_name: race_display_name(race),
            venue: race.venue_name.clone(),
            race_date: race.date,
            investment,
            payout_total,
            predicted_trio: predicted,
            actual_trio,
            hit,
        })
    }

    fn build_summary(&self, from: NaiveDate, to: NaiveDate, records: Vec<Self::Record>) -> Self::Summary {
        let ticket_records: Vec<TicketRaceRecord> = records
            .iter()
            .map(|r| TicketRaceRecord { race_id: r.race_id.clone(), hit: r.hit, investment: r.investment, payout: r.payout_total })
            .collect();
        let Summary { races_evaluated, hits, total_investment, total_payout } = summarize(&ticket_records);

        TrioSummary {
            period_from: from,
            period_to: to,
            total_races: races_evaluated,
            total_hits: hits,
            hit_rate: if races_evaluated == 0 { 0.0 } else { hits as f64 / races_evaluated as f64 },
            total_investment,
            total_payout,
            return_rate: if total_investment == 0 { 0.0 } else { total_payout as f64 / total_investment as f64 },
            race_results: records,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rustc_hash::FxHashMap as Map;

    fn prediction(horse_number: u8, rank: u32) -> PredictionResult {
        PredictionResult {
            horse_number,
            horse_name: String::new(),
            horse_id: horse_number.to_string(),
            ml_probability: 0.5,
            factor_scores: Map::default(),
            total_score: Some(1.0),
            combined_score: Some(1.0),
            rank,
        }
    }

    #[test]
    fn miss_scenario_matches_spec_example() {
        let predictions = vec![prediction(5, 1), prediction(3, 2), prediction(8, 3)];
        let predicted = predicted_trio(&predictions).unwrap();
        let actual = sorted_triple(5, 3, 7);
        assert_ne!(predicted, actual);
        assert_eq!(sorted_triple(5, 3, 8), predicted);
    }

    #[test]
    fn fewer_than_three_candidates_yields_no_bet() {
        let predictions = vec![prediction(5, 1), prediction(3, 2)];
        assert_eq!(None, predicted_trio(&predictions));
    }
}
