//! The templated simulator (§4.I): a shared loop over a race window —
//! reconstruct the shutuba, run the prediction service, apply the ticket's
//! selection rule, settle against the payout fetcher — with only the
//! selection/settlement/summary rules varying per ticket type. Rust has no
//! template-method inheritance, so the shared state and loop live in
//! [`BaseSimulator`] and the two varying "hook" steps are a [`TicketSimulator`]
//! trait implemented once per ticket kind.

use async_trait::async_trait;
use chrono::NaiveDate;

use shutuba_predict::domain::PredictionResult;
use shutuba_predict::reconstruction::reconstruct_shutuba;
use shutuba_predict::repository::{HorseRepository, PastResultsRepository, RaceDatabase};
use shutuba_predict::service::PredictionService;

use crate::fetcher::PayoutFetcher;

/// Default `top_n` for the place and win simulators (§6).
pub const DEFAULT_TOP_N: usize = 3;

/// Everything every ticket simulator needs regardless of ticket kind: the
/// database, the payout fetcher, the prediction service and the venue
/// filter. Built once and reused across the whole period (§5: one fetcher
/// instance for the simulator's lifetime).
pub struct BaseSimulator<D, F, R, H> {
    pub database: D,
    pub fetcher: F,
    pub prediction_service: PredictionService<R, H>,
    pub top_n: usize,
    pub venues: Option<Vec<String>>,
}

impl<D, F, R, H> BaseSimulator<D, F, R, H>
where
    D: RaceDatabase,
    F: PayoutFetcher,
    R: PastResultsRepository,
    H: HorseRepository,
{
    pub fn new(database: D, fetcher: F, prediction_service: PredictionService<R, H>) -> Self {
        Self { database, fetcher, prediction_service, top_n: DEFAULT_TOP_N, venues: None }
    }

    pub fn with_top_n(mut self, top_n: usize) -> Self {
        self.top_n = top_n;
        self
    }

    pub fn with_venues(mut self, venues: Vec<String>) -> Self {
        self.venues = Some(venues);
        self
    }

    /// Reconstructs a leak-free shutuba for `race_id`, scores it and returns
    /// the ranked predictions alongside the recorded results. Shared by every
    /// [`TicketSimulator::simulate_race`] implementation.
    async fn predict_and_fetch_results(
        &self,
        race: &shutuba_predict::domain::Race,
    ) -> anyhow::Result<(Vec<PredictionResult>, Vec<shutuba_predict::domain::RaceResult>)> {
        let results = self.database.fetch_race_results(&race.id).await?;
        let horse_ids: Vec<String> = results.iter().map(|r| r.horse_id.clone()).collect();
        let horses = self.database.fetch_horses_batch(&horse_ids).await?;
        let shutuba = reconstruct_shutuba(race, &results, &horses);

        let predictions = self.prediction_service.predict_race(&shutuba).await?;
        Ok((predictions, results))
    }
}

/// The two per-ticket "hooks" in the template: selecting and settling one
/// race, and folding per-race records into a summary. `Record`/`Summary` are
/// associated types so each ticket kind can carry its own record shape
/// (§4.J) while sharing the surrounding loop in [`simulate_period`].
#[async_trait]
pub trait TicketSimulator {
    type Record: Send;
    type Summary: Send;

    async fn simulate_race(&self, race: &shutuba_predict::domain::Race) -> anyhow::Result<Self::Record>;

    fn build_summary(&self, from: NaiveDate, to: NaiveDate, records: Vec<Self::Record>) -> Self::Summary;
}

/// Drives one ticket simulator across `[from, to]`: fetch the race window
/// (optionally filtered to `venues`), call `simulate_race` per race with
/// per-race errors caught and logged rather than aborting the run, then
/// `build_summary` once over everything collected.
pub async fn simulate_period<S, D>(
    simulator: &S,
    database: &D,
    from: NaiveDate,
    to: NaiveDate,
    venues: Option<&[String]>,
) -> anyhow::Result<S::Summary>
where
    S: TicketSimulator + Sync,
    D: RaceDatabase,
{
    let races = database.fetch_races_in_window(from, to, venues).await?;
    let mut records = Vec::with_capacity(races.len());

    for race in &races {
        match simulator.simulate_race(race).await {
            Ok(record) => records.push(record),
            Err(err) => {
                tracing::error!(race_id = %race.id, error = %err, "skipping race after simulation failure");
            }
        }
    }

    Ok(simulator.build_summary(from, to, records))
}

/// Picks the top `top_n` predictions by rank (already sorted by
/// `combined_score` with the documented tie-break), returning their horse
/// numbers in rank order.
pub fn top_n_horse_numbers(predictions: &[PredictionResult], top_n: usize) -> Vec<u8> {
    predictions.iter().take(top_n).map(|p| p.horse_number).collect()
}

/// Helper used by every ticket simulator's `predict_and_fetch_results` hook.
pub async fn score_race<D, F, R, H>(
    base: &BaseSimulator<D, F, R, H>,
    race: &shutuba_predict::domain::Race,
) -> anyhow::Result<(Vec<PredictionResult>, Vec<shutuba_predict::domain::RaceResult>)>
where
    D: RaceDatabase,
    F: PayoutFetcher,
    R: PastResultsRepository,
    H: HorseRepository,
{
    base.predict_and_fetch_results(race).await
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use shutuba_predict::domain::{Grade, Horse, RaceResult, Sex, Surface, TrackCondition};
    use shutuba_predict::race_id::RaceId;
    use shutuba_predict::service::PredictionService;
    use shutuba_testing::{InMemoryHorseRepository, InMemoryPastResultsRepository, InMemoryRaceDatabase, ScriptedPayoutFetcher};

    use crate::simulators::PlaceSimulator;

    use super::simulate_period;

    fn horse_result(race_id: &RaceId, horse_number: u8) -> RaceResult {
        RaceResult {
            race_id: race_id.clone(),
            horse_id: horse_number.to_string(),
            finish_position: horse_number,
            bracket_number: horse_number,
            horse_number,
            odds: Some(5.0),
            popularity: Some(horse_number),
            body_weight: Some(480),
            body_weight_delta: Some(0),
            finish_time_seconds: Some(95.0),
            margin: None,
            last_3f_seconds: Some(34.5),
            sex: Sex::Colt,
            age: 4,
            impost_kg: 55.0,
            passing_order: Some("3-3-2-1".into()),
        }
    }

    /// Runs the full template loop (`simulate_period` → `PlaceSimulator` →
    /// `BaseSimulator`) over one race with no model and no past history, so
    /// every entry's combined score is tied and selection falls back to the
    /// documented horse-number tie-break (§8 "Selection stability").
    #[tokio::test]
    async fn simulate_period_drives_place_simulator_end_to_end() {
        let race = shutuba_predict::domain::Race {
            id: RaceId::parse("202506010801").unwrap(),
            date: NaiveDate::from_ymd_opt(2025, 6, 1).unwrap(),
            venue_name: "Tokyo".into(),
            race_number: 8,
            distance_metres: 1600,
            surface: Surface::Turf,
            track_condition: TrackCondition::Good,
            grade: Grade::G3,
            weather: "Clear".into(),
        };
        let results = vec![horse_result(&race.id, 1), horse_result(&race.id, 2), horse_result(&race.id, 3)];

        let database = InMemoryRaceDatabase::new()
            .with_race(race.clone(), results)
            .with_horse(Horse { id: "1".into(), name: "One".into(), sex: Sex::Colt, birth_year: 2021, sire_name: None, dam_sire_name: None })
            .with_horse(Horse { id: "2".into(), name: "Two".into(), sex: Sex::Colt, birth_year: 2021, sire_name: None, dam_sire_name: None })
            .with_horse(Horse { id: "3".into(), name: "Three".into(), sex: Sex::Colt, birth_year: 2021, sire_name: None, dam_sire_name: None });

        let fetcher = ScriptedPayoutFetcher::new().with_place(race.id.clone(), vec![(1, 150), (2, 280)]);
        let prediction_service =
            PredictionService::new(InMemoryPastResultsRepository::default(), InMemoryHorseRepository::default(), None);
        let base = BaseSimulator::new(database.clone(), fetcher, prediction_service).with_top_n(3);
        let simulator = PlaceSimulator::new(base);

        let summary = simulate_period(&simulator, &database, race.date, race.date, None).await.unwrap();

        assert_eq!(1, summary.total_races);
        assert_eq!(300, summary.total_investment);
        assert_eq!(430, summary.total_payout);
        assert_eq!(1, summary.total_hits);
        assert_eq!(vec![1, 2, 3], summary.race_results[0].top_n_predictions);
    }
}
