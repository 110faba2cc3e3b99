//! In-memory test doubles for every capability interface the core depends
//! on: the two narrow repositories, the batch-oriented database contract,
//! and the payout fetcher. Each is built from a handful of rows rather than
//! wired to a real backend, so unit tests can construct exactly the
//! scenario they need without touching SQLite or the network.

use std::sync::Mutex;

use async_trait::async_trait;
use chrono::NaiveDate;
use rustc_hash::FxHashMap;

use shutuba_predict::domain::{Horse, PastResultRecord, Race, RaceResult};
use shutuba_predict::race_id::RaceId;
use shutuba_predict::repository::{HorseRepository, PastResultsRepository, RaceDatabase};
use shutuba_simulate::fetcher::{FetchError, PayoutFetcher};

#[derive(Debug, Default, Clone)]
pub struct InMemoryPastResultsRepository {
    pub rows: FxHashMap<String, Vec<PastResultRecord>>,
}

impl InMemoryPastResultsRepository {
    pub fn new(rows: FxHashMap<String, Vec<PastResultRecord>>) -> Self {
        Self { rows }
    }
}

#[async_trait]
impl PastResultsRepository for InMemoryPastResultsRepository {
    async fn get_past_results(
        &self,
        horse_id: &str,
        before_date: NaiveDate,
        limit: usize,
    ) -> anyhow::Result<Vec<PastResultRecord>> {
        Ok(self
            .rows
            .get(horse_id)
            .cloned()
            .unwrap_or_default()
            .into_iter()
            .filter(|r| r.race_date < before_date)
            .take(limit)
            .collect())
    }
}

#[derive(Debug, Default, Clone)]
pub struct InMemoryHorseRepository {
    pub horses: FxHashMap<String, Horse>,
}

impl InMemoryHorseRepository {
    pub fn new(horses: FxHashMap<String, Horse>) -> Self {
        Self { horses }
    }
}

#[async_trait]
impl HorseRepository for InMemoryHorseRepository {
    async fn get_horse(&self, horse_id: &str) -> anyhow::Result<Option<Horse>> {
        Ok(self.horses.get(horse_id).cloned())
    }
}

/// Everything the walk-forward backtest engine and the ticket simulators
/// need, assembled by hand in tests rather than queried from SQLite.
#[derive(Debug, Default, Clone)]
pub struct InMemoryRaceDatabase {
    pub races: Vec<Race>,
    pub results: FxHashMap<RaceId, Vec<RaceResult>>,
    pub past_results: FxHashMap<String, Vec<PastResultRecord>>,
    pub horses: FxHashMap<String, Horse>,
}

impl InMemoryRaceDatabase {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_race(mut self, race: Race, results: Vec<RaceResult>) -> Self {
        self.results.insert(race.id.clone(), results);
        self.races.push(race);
        self
    }

    pub fn with_past_results(mut self, horse_id: impl Into<String>, rows: Vec<PastResultRecord>) -> Self {
        self.past_results.insert(horse_id.into(), rows);
        self
    }

    pub fn with_horse(mut self, horse: Horse) -> Self {
        self.horses.insert(horse.id.clone(), horse);
        self
    }
}

#[async_trait]
impl RaceDatabase for InMemoryRaceDatabase {
    async fn fetch_race(&self, race_id: &RaceId) -> anyhow::Result<Option<Race>> {
        Ok(self.races.iter().find(|r| &r.id == race_id).cloned())
    }

    async fn fetch_race_results(&self, race_id: &RaceId) -> anyhow::Result<Vec<RaceResult>> {
        Ok(self.results.get(race_id).cloned().unwrap_or_default())
    }

    async fn fetch_past_results_batch(
        &self,
        horse_ids: &[String],
        before_date: NaiveDate,
        per_horse_limit: usize,
    ) -> anyhow::Result<FxHashMap<String, Vec<PastResultRecord>>> {
        let mut batch = FxHashMap::default();
        for horse_id in horse_ids {
            let rows = self
                .past_results
                .get(horse_id)
                .cloned()
                .unwrap_or_default()
                .into_iter()
                .filter(|r| r.race_date < before_date)
                .take(per_horse_limit)
                .collect();
            batch.insert(horse_id.clone(), rows);
        }
        Ok(batch)
    }

    async fn fetch_horses_batch(&self, horse_ids: &[String]) -> anyhow::Result<FxHashMap<String, Horse>> {
        Ok(horse_ids
            .iter()
            .filter_map(|id| self.horses.get(id).cloned().map(|h| (id.clone(), h)))
            .collect())
    }

    async fn fetch_races_in_window(
        &self,
        from_date: NaiveDate,
        to_date: NaiveDate,
        venues: Option<&[String]>,
    ) -> anyhow::Result<Vec<Race>> {
        let mut races: Vec<Race> = self
            .races
            .iter()
            .filter(|r| r.date >= from_date && r.date <= to_date)
            .filter(|r| venues.map(|vs| vs.iter().any(|v| v == &r.venue_name)).unwrap_or(true))
            .cloned()
            .collect();
        races.sort_by(|a, b| a.date.cmp(&b.date).then_with(|| a.race_number.cmp(&b.race_number)));
        Ok(races)
    }
}

/// A scripted [`PayoutFetcher`]: returns whatever was registered for a
/// race_id, or the "absent" shape (empty/`None`) when nothing was scripted,
/// mirroring a race that hasn't settled yet. Every call is recorded so tests
/// can assert on pacing and call counts without a real clock.
#[derive(Default)]
pub struct ScriptedPayoutFetcher {
    place: FxHashMap<RaceId, Vec<(u8, u32)>>,
    win: FxHashMap<RaceId, (u8, u32)>,
    quinella: FxHashMap<RaceId, ((u8, u8), u32)>,
    trio: FxHashMap<RaceId, ((u8, u8, u8), u32)>,
    calls: Mutex<Vec<String>>,
}

impl ScriptedPayoutFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_place(mut self, race_id: RaceId, payouts: Vec<(u8, u32)>) -> Self {
        self.place.insert(race_id, payouts);
        self
    }

    pub fn with_win(mut self, race_id: RaceId, payout: (u8, u32)) -> Self {
        self.win.insert(race_id, payout);
        self
    }

    pub fn with_quinella(mut self, race_id: RaceId, payout: ((u8, u8), u32)) -> Self {
        self.quinella.insert(race_id, payout);
        self
    }

    pub fn with_trio(mut self, race_id: RaceId, payout: ((u8, u8, u8), u32)) -> Self {
        self.trio.insert(race_id, payout);
        self
    }

    pub fn call_log(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl PayoutFetcher for ScriptedPayoutFetcher {
    async fn fetch_place_payouts(&self, race_id: &RaceId) -> Result<Vec<(u8, u32)>, FetchError> {
        self.calls.lock().unwrap().push(format!("place:{race_id}"));
        Ok(self.place.get(race_id).cloned().unwrap_or_default())
    }

    async fn fetch_win_payout(&self, race_id: &RaceId) -> Result<Option<(u8, u32)>, FetchError> {
        self.calls.lock().unwrap().push(format!("win:{race_id}"));
        Ok(self.win.get(race_id).copied())
    }

    async fn fetch_quinella_payout(&self, race_id: &RaceId) -> Result<Option<((u8, u8), u32)>, FetchError> {
        self.calls.lock().unwrap().push(format!("quinella:{race_id}"));
        Ok(self.quinella.get(race_id).copied())
    }

    async fn fetch_trio_payout(&self, race_id: &RaceId) -> Result<Option<((u8, u8, u8), u32)>, FetchError> {
        self.calls.lock().unwrap().push(format!("trio:{race_id}"));
        Ok(self.trio.get(race_id).copied())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn scripted_fetcher_returns_absent_for_unscripted_race() {
        let fetcher = ScriptedPayoutFetcher::new();
        let race_id = RaceId::parse("202506010801").unwrap();
        assert!(fetcher.fetch_place_payouts(&race_id).await.unwrap().is_empty());
        assert_eq!(None, fetcher.fetch_win_payout(&race_id).await.unwrap());
        assert_eq!(1, fetcher.call_log().len());
    }

    #[tokio::test]
    async fn in_memory_database_filters_window_and_venue() {
        use shutuba_predict::domain::{Grade, Surface, TrackCondition};

        let race_a = Race {
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
        let race_b = Race { venue_name: "Hanshin".into(), ..race_a.clone() };

        let database = InMemoryRaceDatabase::new()
            .with_race(race_a.clone(), vec![])
            .with_race(race_b, vec![]);

        let races = database
            .fetch_races_in_window(race_a.date, race_a.date, Some(&["Tokyo".to_string()]))
            .await
            .unwrap();
        assert_eq!(1, races.len());
        assert_eq!("Tokyo", races[0].venue_name);
    }
}
