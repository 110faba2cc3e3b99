//! Win (tansho) simulator (§4.J): bets 100 on each of the top-N predicted
//! horses; hits if any of them won.

use async_trait::async_trait;
use chrono::NaiveDate;

use shutuba_predict::domain::Race;
use shutuba_predict::race_id::RaceId;
use shutuba_predict::reconstruction::race_display_name;
use shutuba_predict::repository::{HorseRepository, PastResultsRepository, RaceDatabase};

use crate::base::{top_n_horse_numbers, BaseSimulator, TicketSimulator};
use crate::fetcher::PayoutFetcher;
use crate::ticket::{summarize, Summary, TicketRaceRecord};

#[derive(Debug, Clone, PartialEq)]
pub struct WinRaceRecord {
    pub race_id: RaceId,
    pub race_name: String,
    pub venue: String,
    pub race_date: NaiveDate,
    pub investment: u32,
    pub payout_total: u32,
    pub top_n_predictions: Vec<u8>,
    pub winning_horse: Option<u8>,
    pub hit: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WinSummary {
    pub period_from: NaiveDate,
    pub period_to: NaiveDate,
    pub total_races: usize,
    pub total_hits: usize,
    pub hit_rate: f64,
    pub total_investment: u64,
    pub total_payout: u64,
    pub return_rate: f64,
    pub race_results: Vec<WinRaceRecord>,
}

pub struct WinSimulator<D, F, R, H> {
    pub base: BaseSimulator<D, F, R, H>,
}

impl<D, F, R, H> WinSimulator<D, F, R, H>
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
impl<D, F, R, H> TicketSimulator for WinSimulator<D, F, R, H>
where
    D: RaceDatabase + Sync,
    F: PayoutFetcher + Sync,
    R: PastResultsRepository + Sync,
    H: HorseRepository + Sync,
{
    type Record = WinRaceRecord;
    type Summary = WinSummary;

    async fn simulate_race(&self, race: &Race) -> anyhow::Result<Self::Record> {
        let (predictions, _results) = crate::base::score_race(&self.base, race).await?;
        let selected = top_n_horse_numbers(&predictions, self.base.top_n);
        let investment = selected.len() as u32 * 100;

        let win_payout = match self.base.fetcher.fetch_win_payout(&race.id).await {
            Ok(payout) => payout,
            Err(err) => {
                tracing::warn!(race_id = %race.id, error = %err, "win payout unavailable, treating as absent");
                None
            }
        };

        let (winning_horse, hit, payout_total) = match win_payout {
            Some((winner, payout)) if selected.contains(&winner) => (Some(winner), true, payout),
            Some((winner, _)) => (Some(winner), false, 0),
            None => (None, false, 0),
        };

        Ok(WinRaceRecord {
            race_id: race.id.clone(),
            race_name: race_display_name(race),
            venue: race.venue_name.clone(),
            race_date: race.date,
            investment,
            payout_total,
            top_n_predictions: selected,
            winning_horse,
            hit,
        })
    }

    fn build_summary(&self, from: NaiveDate, to: NaiveDate, records: Vec<Self::Record>) -> Self::Summary {
        let ticket_records: Vec<TicketRaceRecord> = records
            .iter()
            .map(|r| TicketRaceRecord { race_id: r.race_id.clone(), hit: r.hit, investment: r.investment, payout: r.payout_total })
            .collect();
        let Summary { races_evaluated, hits, total_investment, total_payout } = summarize(&ticket_records);

        WinSummary {
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
