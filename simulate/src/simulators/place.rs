//! Place (fukusho) simulator (§4.J): bets 100 on each of the top-N
//! predicted horses; hits on any selected horse finishing in the top 3.

use async_trait::async_trait;
use chrono::NaiveDate;
use rustc_hash::FxHashMap;

use shutuba_predict::domain::Race;
use shutuba_predict::race_id::RaceId;
use shutuba_predict::reconstruction::race_display_name;
use shutuba_predict::repository::{HorseRepository, PastResultsRepository, RaceDatabase};

use crate::base::{top_n_horse_numbers, BaseSimulator, TicketSimulator};
use crate::fetcher::PayoutFetcher;
use crate::ticket::{summarize, Summary, TicketRaceRecord};

#[derive(Debug, Clone, PartialEq)]
pub struct PlaceRaceRecord {
    pub race_id: RaceId,
    pub race_name: String,
    pub venue: String,
    pub race_date: NaiveDate,
    pub investment: u32,
    pub payout_total: u32,
    pub top_n_predictions: Vec<u8>,
    pub fukusho_horses: Vec<u8>,
    pub hits: Vec<u8>,
    pub per_hit_payouts: FxHashMap<u8, u32>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlaceSummary {
    pub period_from: NaiveDate,
    pub period_to: NaiveDate,
    pub total_races: usize,
    pub total_hits: usize,
    pub hit_rate: f64,
    pub total_investment: u64,
    pub total_payout: u64,
    pub return_rate: f64,
    pub race_results: Vec<PlaceRaceRecord>,
}

pub struct PlaceSimulator<D, F, R, H> {
    pub base: BaseSimulator<D, F, R, H>,
}

impl<D, F, R, H> PlaceSimulator<D, F, R, H>
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
impl<D, F, R, H> TicketSimulator for PlaceSimulator<D, F, R, H>
where
    D: RaceDatabase + Sync,
    F: PayoutFetcher + Sync,
    R: PastResultsRepository + Sync,
    H: HorseRepository + Sync,
{
    type Record = PlaceRaceRecord;
    type Summary = PlaceSummary;

    async fn simulate_race(&self, race: &Race) -> anyhow::Result<Self::Record> {
        let (predictions, _results) = crate::base::score_race(&self.base, race).await?;
        let selected = top_n_horse_numbers(&predictions, self.base.top_n);
        let investment = selected.len() as u32 * 100;

        let payouts = self.base.fetcher.fetch_place_payouts(&race.id).await;
        let (fukusho_horses, per_hit_payouts) = match payouts {
            Ok(payouts) => {
                let horses: Vec<u8> = payouts.iter().map(|(n, _)| *n).collect();
                let map: FxHashMap<u8, u32> = payouts.into_iter().collect();
                (horses, map)
            }
            Err(err) => {
                tracing::warn!(race_id = %race.id, error = %err, "place payout unavailable, treating as absent");
                (Vec::new(), FxHashMap::default())
            }
        };

        let hits: Vec<u8> = selected.iter().copied().filter(|n| per_hit_payouts.contains_key(n)).collect();
        let payout_total: u32 = hits.iter().map(|n| per_hit_payouts.get(n).copied().unwrap_or(0)).sum();

        Ok(PlaceRaceRecord {
            race_id: race.id.clone(),
            race_name: race_display_name(race),
            venue: race.venue_name.clone(),
            race_date: race.date,
            investment,
            payout_total,
            top_n_predictions: selected,
            fukusho_horses,
            hits,
            per_hit_payouts,
        })
    }

    fn build_summary(&self, from: NaiveDate, to: NaiveDate, records: Vec<Self::Record>) -> Self::Summary {
        let ticket_records: Vec<TicketRaceRecord> = records
            .iter()
            .map(|r| TicketRaceRecord {
                race_id: r.race_id.clone(),
                hit: !r.hits.is_empty(),
                investment: r.investment,
                payout: r.payout_total,
            })
            .collect();
        let Summary { races_evaluated, hits, total_investment, total_payout } = summarize(&ticket_records);
        let total_hits = hits;

        PlaceSummary {
            period_from: from,
            period_to: to,
            total_races: races_evaluated,
            total_hits,
            hit_rate: if races_evaluated == 0 { 0.0 } else { total_hits as f64 / races_evaluated as f64 },
            total_investment,
            total_payout,
            return_rate: if total_investment == 0 { 0.0 } else { total_payout as f64 / total_investment as f64 },
            race_results: records,
        }
    }
}
