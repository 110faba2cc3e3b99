//! The walk-forward engine itself: one race at a time, retraining on
//! cadence, batching lookups into a single database call per race when
//! scoring and once per training window when retraining.

use anyhow::Result;
use async_trait::async_trait;
use chrono::NaiveDate;
use rustc_hash::FxHashMap;

use shutuba::leak::NoLeakAssertion;
use shutuba_predict::domain::{Horse, PastResultRecord, Race, RaceResult};
use shutuba_predict::factors::StyleWinRateTable;
use shutuba_predict::features;
use shutuba_predict::model::{ModelTrainer, Predictor, TrainingProfile};
use shutuba_predict::pedigree::PedigreeMaster;
use shutuba_predict::reconstruct_shutuba;
use shutuba_predict::repository::{HorseRepository, PastResultsRepository};
use shutuba_predict::service::PredictionService;
use shutuba_predict::weights::FactorWeights;

use crate::cadence::RetrainCadence;
use crate::constants::{DEFAULT_FINISH_POSITION, MAX_PAST_RESULTS_PER_HORSE, MIN_TRAINING_SAMPLES};
use crate::database::RaceDatabase;
use crate::state::{RetrainTracker, TrainingState};

pub struct BacktestEngineConfig {
    pub cadence: RetrainCadence,
    pub lightweight_training: bool,
    pub max_past_results_per_horse: usize,
    pub min_training_samples: usize,
}

impl Default for BacktestEngineConfig {
    fn default() -> Self {
        Self {
            cadence: RetrainCadence::Weekly,
            lightweight_training: true,
            max_past_results_per_horse: MAX_PAST_RESULTS_PER_HORSE,
            min_training_samples: MIN_TRAINING_SAMPLES,
        }
    }
}

/// One race's outcome of the backtest: the ranked predictions (carrying
/// both `ml_probability` and `total_score` so ML-driven and factor-driven
/// metrics can be derived later from the same list) alongside the actual
/// recorded results.
pub struct RaceBacktestResult {
    pub race: Race,
    pub predictions: Vec<shutuba_predict::domain::PredictionResult>,
    pub actual_results: Vec<RaceResult>,
    pub training_state: TrainingState,
}

pub struct BacktestEngine<D: RaceDatabase> {
    database: D,
    config: BacktestEngineConfig,
    tracker: RetrainTracker,
    weights: FactorWeights,
    pedigree_master: PedigreeMaster,
    style_table: StyleWinRateTable,
    predictor: Option<Predictor>,
}

impl<D: RaceDatabase> BacktestEngine<D> {
    pub fn new(database: D, config: BacktestEngineConfig) -> Self {
        let tracker = RetrainTracker::new(config.cadence, config.min_training_samples);
        Self {
            database,
            config,
            tracker,
            weights: FactorWeights::default(),
            pedigree_master: PedigreeMaster::default(),
            style_table: StyleWinRateTable::default(),
            predictor: None,
        }
    }

    pub fn training_state(&self) -> TrainingState {
        self.tracker.current_state()
    }

    /// Walks `[from_date, to_date]` in order, calling `on_result` once per
    /// race as soon as it's scored. Nothing beyond the current race's batch
    /// results is ever held in memory at once.
    pub async fn run<F>(&mut self, from_date: NaiveDate, to_date: NaiveDate, mut on_result: F) -> Result<()>
    where
        F: FnMut(RaceBacktestResult),
    {
        let races = self.database.fetch_races_in_window(from_date, to_date, None).await?;

        for race in races {
            if self.tracker.cadence_elapsed(race.date) {
                let (features_matrix, labels, race_groups) =
                    self.gather_training_data(from_date, race.date).await?;
                let decision = self.tracker.evaluate(race.date, features_matrix.rows());

                if decision.should_attempt_retrain {
                    match decision.state {
                        TrainingState::Ready => {
                            let profile = if self.config.lightweight_training {
                                TrainingProfile::Lightweight
                            } else {
                                TrainingProfile::Normal
                            };
                            let trainer = ModelTrainer::new(profile);
                            let timed = shutuba::timed::Timed::result(|| {
                                trainer.train(&features_matrix, &labels, &race_groups)
                            })?;
                            tracing::info!(
                                race_date = %race.date,
                                samples = features_matrix.rows(),
                                elapsed_ms = timed.elapsed.as_millis(),
                                "retrained model"
                            );
                            let (booster, _metrics) = timed.value;
                            self.predictor = Some(Predictor::new(booster));
                        }
                        TrainingState::Degraded => {
                            self.predictor = None;
                        }
                        TrainingState::NeedsRetrain => unreachable!("evaluate() never returns NeedsRetrain"),
                    }
                }
            }

            let result = self.score_race(&race).await?;
            on_result(result);
        }

        Ok(())
    }

    async fn score_race(&self, race: &Race) -> Result<RaceBacktestResult> {
        let actual_results = self.database.fetch_race_results(&race.id).await?;
        let horse_ids: Vec<String> = actual_results.iter().map(|r| r.horse_id.clone()).collect();

        let past_results_batch = self
            .database
            .fetch_past_results_batch(&horse_ids, race.date, self.config.max_past_results_per_horse)
            .await?;
        assert_no_leakage(&past_results_batch, race.date)?;
        let horses_batch = self.database.fetch_horses_batch(&horse_ids).await?;

        let shutuba = reconstruct_shutuba(race, &actual_results, &horses_batch);

        let repository = BatchPastResultsRepository { rows: &past_results_batch };
        let horse_repository = BatchHorseRepository { horses: &horses_batch };
        let service = PredictionService::new(repository, horse_repository, self.predictor.clone())
            .with_weights(self.weights)
            .with_style_table(self.style_table.clone());

        let predictions = service.predict_race(&shutuba).await?;

        Ok(RaceBacktestResult {
            race: race.clone(),
            predictions,
            actual_results,
            training_state: self.tracker.current_state(),
        })
    }

    /// Assembles the (X, y, race-group) training set from every race in
    /// `[from_date, cutoff_date)`. `cutoff_date` is exclusive, so no row
    /// from the race about to be scored can leak into its own training data.
    ///
    /// Batches the past-results and horse-master lookups once across the
    /// whole window rather than once per race (§5), fetching each horse's
    /// full history as of `cutoff_date` and then slicing it back in memory
    /// to each training race's own, earlier cutoff. Only `fetch_race_results`
    /// stays per-race: the database contract has no batched multi-race
    /// results lookup.
    async fn gather_training_data(
        &self,
        from_date: NaiveDate,
        cutoff_date: NaiveDate,
    ) -> Result<(shutuba::linear::matrix::Matrix<f64>, Vec<u8>, Vec<u32>)> {
        let training_races = self
            .database
            .fetch_races_in_window(from_date, cutoff_date.pred_opt().unwrap_or(from_date), None)
            .await?;
        let training_races: Vec<Race> = training_races.into_iter().filter(|r| r.date < cutoff_date).collect();

        let mut results_by_race = Vec::with_capacity(training_races.len());
        let mut all_horse_ids: Vec<String> = Vec::new();
        for training_race in &training_races {
            let results = self.database.fetch_race_results(&training_race.id).await?;
            all_horse_ids.extend(results.iter().map(|r| r.horse_id.clone()));
            results_by_race.push(results);
        }
        all_horse_ids.sort_unstable();
        all_horse_ids.dedup();

        // Fetched once as of the window's cutoff so every race's own, earlier
        // slice can be taken from it in memory; the per-race limit is applied
        // after that slice, not before, so an earlier race never loses rows to
        // a later race's more-recent starts sharing the same horse.
        let window_batch = self
            .database
            .fetch_past_results_batch(&all_horse_ids, cutoff_date, usize::MAX)
            .await?;
        let horses_batch = self.database.fetch_horses_batch(&all_horse_ids).await?;

        let mut rows = Vec::new();
        let mut labels = Vec::new();
        let mut race_groups = Vec::new();

        for (group_index, (training_race, results)) in training_races.iter().zip(results_by_race.iter()).enumerate() {
            let past_batch: FxHashMap<String, Vec<PastResultRecord>> = window_batch
                .iter()
                .map(|(horse_id, history)| {
                    let sliced: Vec<PastResultRecord> = history
                        .iter()
                        .filter(|r| r.race_date < training_race.date)
                        .take(self.config.max_past_results_per_horse)
                        .cloned()
                        .collect();
                    (horse_id.clone(), sliced)
                })
                .collect();
            assert_no_leakage(&past_batch, training_race.date)?;
            let shutuba = reconstruct_shutuba(training_race, results, &horses_batch);

            for (entry, result) in shutuba.entries.iter().zip(results.iter()) {
                if result.did_not_finish() {
                    continue;
                }
                let past_results = past_batch.get(&entry.horse_id).map(Vec::as_slice).unwrap_or(&[]);
                let context = shutuba_predict::factors::FactorContext {
                    venue_name: &shutuba.venue_name,
                    target_surface: shutuba.surface,
                    target_distance_metres: shutuba.distance_metres,
                    track_condition: shutuba.track_condition,
                    sire_name: horses_batch.get(&entry.horse_id).and_then(|h| h.sire_name.as_deref()),
                    dam_sire_name: horses_batch.get(&entry.horse_id).and_then(|h| h.dam_sire_name.as_deref()),
                    odds: entry.odds,
                    popularity_rank: entry.popularity,
                    field_size: shutuba.field_size() as u16,
                    current_date: shutuba.date,
                    pedigree_master: &self.pedigree_master,
                    style_table: &self.style_table,
                };
                let factor_scores = shutuba_predict::factors::compute_all(&entry.horse_id, past_results, &context);
                let row = features::build_row(&factor_scores, entry, shutuba.field_size(), past_results, shutuba.date);
                rows.push(row);
                labels.push(if result.finished_in_top3() { 1u8 } else { 0u8 });
                race_groups.push(group_index as u32);
            }
        }

        Ok((features::build_matrix(&rows), labels, race_groups))
    }
}

fn assert_no_leakage(batch: &FxHashMap<String, Vec<PastResultRecord>>, cutoff: NaiveDate) -> Result<()> {
    let assertion = NoLeakAssertion { cutoff };
    for rows in batch.values() {
        assertion.check_all(rows.iter().map(|r| &r.race_date))?;
    }
    Ok(())
}

/// Sorts actual results by recorded finish position, treating
/// [`DEFAULT_FINISH_POSITION`] as "last" for unsettled rows. Only ever used
/// for display ordering — never for labels or features.
pub fn sort_key_for_display(result: &RaceResult) -> u8 {
    if result.did_not_finish() {
        DEFAULT_FINISH_POSITION
    } else {
        result.finish_position
    }
}

struct BatchPastResultsRepository<'a> {
    rows: &'a FxHashMap<String, Vec<PastResultRecord>>,
}

#[async_trait]
impl<'a> PastResultsRepository for BatchPastResultsRepository<'a> {
    async fn get_past_results(
        &self,
        horse_id: &str,
        before_date: NaiveDate,
        limit: usize,
    ) -> Result<Vec<PastResultRecord>> {
        let rows = self.rows.get(horse_id).cloned().unwrap_or_default();
        Ok(rows
            .into_iter()
            .filter(|r| r.race_date < before_date)
            .take(limit)
            .collect())
    }
}

struct BatchHorseRepository<'a> {
    horses: &'a FxHashMap<String, Horse>,
}

#[async_trait]
impl<'a> HorseRepository for BatchHorseRepository<'a> {
    async fn get_horse(&self, horse_id: &str) -> Result<Option<Horse>> {
        Ok(self.horses.get(horse_id).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shutuba_predict::domain::{Grade, Sex, Surface, TrackCondition};
    use shutuba_predict::race_id::RaceId;
    use shutuba_testing::InMemoryRaceDatabase;

    fn race(id: &str, date: NaiveDate, race_number: u8) -> Race {
        Race {
            id: RaceId::parse(id).unwrap(),
            date,
            venue_name: "Tokyo".into(),
            race_number,
            distance_metres: 1600,
            surface: Surface::Turf,
            track_condition: TrackCondition::Good,
            grade: Grade::G3,
            weather: "Clear".into(),
        }
    }

    fn result(race_id: &RaceId, horse_id: &str, horse_number: u8, finish_position: u8) -> RaceResult {
        RaceResult {
            race_id: race_id.clone(),
            horse_id: horse_id.into(),
            finish_position,
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

    fn horse(id: &str) -> Horse {
        Horse {
            id: id.into(),
            name: format!("Horse {id}"),
            sex: Sex::Colt,
            birth_year: 2021,
            sire_name: None,
            dam_sire_name: None,
        }
    }

    /// Walks two races a week apart with a daily cadence (so every race
    /// attempts retraining) but a `min_training_samples` no amount of
    /// two-race history can satisfy, so the model never actually trains and
    /// every race is scored with factor-only (`ml_probability == 0.0`)
    /// predictions. Exercises the ordering guarantee (§8) and the
    /// `Degraded` path without invoking the GBDT trainer.
    #[tokio::test]
    async fn walk_forward_yields_races_in_order_and_stays_degraded() {
        let race_a = race("202506010801", NaiveDate::from_ymd_opt(2025, 6, 1).unwrap(), 8);
        let race_b = race("202506020801", NaiveDate::from_ymd_opt(2025, 6, 8).unwrap(), 8);

        let results_a = vec![
            result(&race_a.id, "horse-1", 1, 1),
            result(&race_a.id, "horse-2", 2, 2),
            result(&race_a.id, "horse-3", 3, 3),
        ];
        let results_b = vec![
            result(&race_b.id, "horse-1", 1, 2),
            result(&race_b.id, "horse-2", 2, 1),
            result(&race_b.id, "horse-3", 3, 3),
        ];

        let database = InMemoryRaceDatabase::new()
            .with_race(race_a.clone(), results_a)
            .with_race(race_b.clone(), results_b)
            .with_horse(horse("horse-1"))
            .with_horse(horse("horse-2"))
            .with_horse(horse("horse-3"));

        let config = BacktestEngineConfig {
            cadence: RetrainCadence::Daily,
            lightweight_training: true,
            max_past_results_per_horse: MAX_PAST_RESULTS_PER_HORSE,
            min_training_samples: 1_000,
        };
        let mut engine = BacktestEngine::new(database, config);

        let mut seen_dates = Vec::new();
        let mut states = Vec::new();
        engine
            .run(race_a.date, race_b.date, |result| {
                assert!(result.predictions.iter().all(|p| p.ml_probability == 0.0));
                seen_dates.push(result.race.date);
                states.push(result.training_state);
            })
            .await
            .unwrap();

        assert_eq!(vec![race_a.date, race_b.date], seen_dates);
        assert_eq!(vec![TrainingState::Degraded, TrainingState::Degraded], states);
    }
}
