//! Quinella (umaren) simulator (§4.J): bets on all unordered pairs among the
//! top-3 predictions; hits if the predicted pair equals the actual unordered
//! 1st/2nd finishers.

use async_trait::async_trait;
use chrono::NaiveDate;

use shutuba_predict::domain::{PredictionResult, Race};
use shutuba_predict::race_id::RaceId;
use shutuba_predict::reconstruction::race_display_name;
use shutuba_predict::repository::{HorseRepository, PastResultsRepository, RaceDatabase};

use crate::base::{BaseSimulator, TicketSimulator};
use crate::fetcher::PayoutFetcher;
use crate::ticket::{summarize, Summary, TicketRaceRecord};

const TOP_N_CANDIDATES: usize = 3;

/// All unordered pairs among the top `TOP_N_CANDIDATES` predictions, in a
/// stable order. With fewer than 2 candidates no bet can be formed.
fn pair_combinations(predictions: &[PredictionResult]) -> Vec<(u8, u8)> {
    let candidates: Vec<u8> = predictions.iter().take(TOP_N_CANDIDATES).map(|p| p.horse_number).collect();
    let mut combos = Vec::new();
    for i in 0..candidates.len() {
        for j in (i + 1)..candidates.len() {
            combos.push(sorted_pair(candidates[i], candidates[j]));
        }
    }
    combos
}

fn sorted_pair(a: u8, b: u8) -> (u8, u8) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct QuinellaRaceRecord {
    pub race_id: RaceId,
    pub race_name: String,
    pub venue: String,
    pub race_date: NaiveDate,
    pub investment: u32,
    pub payout_total: u32,
    pub bet_combinations: Vec<(u8, u8)>,
    pub actual_pair: Option<(u8, u8)>,
    pub hit: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct QuinellaSummary {
    pub period_from: NaiveDate,
    pub period_to: NaiveDate,
    pub total_races: usize,
    pub total_hits: usize,
    pub hit_rate: f64,
    pub total_investment: u64,
    pub total_payout: u64,
    pub return_rate: f64,
    pub race_results: Vec<QuinellaRaceRecord>,
}

pub struct QuinellaSimulator<D, F, R, H> {
    pub base: BaseSimulator<D, F, R, H>,
}

impl<D, F, R, H> QuinellaSimulator<D, F, R, H>
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
impl<D, F, R, H> TicketSimulator for QuinellaSimulator<D, F, R, H>
where
    D: RaceDatabase + Sync,
    F: PayoutFetcher + Sync,
    R: PastResultsRepository + Sync,
    H: HorseRepository + Sync,
{
    type Record = QuinellaRaceRecord;
    type Summary = QuinellaSummary;

    async fn simulate_race(&self, race: &Race) -> anyhow::Result<Self::Record> {
        let (predictions, _results) = crate::base::score_race(&self.base, race).await?;
        let bet_combinations = pair_combinations(&predictions);
        let investment = bet_combinations.len() as u32 * 100;

        let quinella_payout = match self.base.fetcher.fetch_quinella_payout(&race.id).await {
            Ok(payout) => payout,
            Err(err) => {
                tracing::warn!(race_id = %race.id, error = %err, "quinella payout unavailable, treating as absent");
                None
            }
        };

        let (actual_pair, hit, payout_total) = match quinella_payout {
            Some((pair, payout)) if bet_combinations.contains(&pair) => (Some(pair), true, payout),
            Some((pair, _)) => (Some(pair), false, 0),
            None => (None, false, 0),
        };

        Ok(QuinellaRaceRecord {
            race_id: race.id.clone(),
            race_name: race_display_name(race),
            venue: race.venue_name.clone(),
            race_date: race.date,
            investment,
            payout_total,
            bet_combinations,
            actual_pair,
            hit,
        })
    }

    fn build_summary(&self, from: NaiveDate, to: NaiveDate, records: Vec<Self::Record>) -> Self::Summary {
        let ticket_records: Vec<TicketRaceRecord> = records
            .iter()
            .map(|r| TicketRaceRecord { race_id: r.race_id.clone(), hit: r.hit, investment: r.investment, payout: r.payout_total })
            .collect();
        let Summary { races_evaluated, hits, total_investment, total_payout } = summarize(&ticket_records);

        QuinellaSummary {
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
    fn hit_scenario_matches_spec_example() {
        let predictions = vec![prediction(5, 1), prediction(3, 2), prediction(8, 3)];
        let combos = pair_combinations(&predictions);
        assert_eq!(3, combos.len());
        for expected in [sorted_pair(5, 3), sorted_pair(5, 8), sorted_pair(3, 8)] {
            assert!(combos.contains(&expected));
        }
        let actual = sorted_pair(5, 3);
        assert!(combos.contains(&actual));
        assert_eq!(300, combos.len() as u32 * 100);
    }

    #[test]
    fn fewer_than_two_candidates_yields_no_bet() {
        let predictions = vec![prediction(5, 1)];
        let combos = pair_combinations(&predictions);
        assert!(combos.is_empty());
    }
}
