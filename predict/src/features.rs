//! Assembles the 19-slot feature vector consumed by the trainer and the
//! predictor. Slot order is a public contract: it must match between
//! training and inference, so it's named once here via an ordinal enum
//! rather than by raw array position at each call site.

use chrono::NaiveDate;
use ordinalizer::Ordinal;
use rustc_hash::FxHashMap;
use strum_macros::{Display, EnumCount, EnumIter};

use crate::domain::{FactorName, PastResultRecord, RaceEntry};

/// Encodes a missing value. Chosen to fall outside every legitimate feature
/// range (rates in [0,1], positions >= 1, ages >= 2, impost >= 48kg, ...) so
/// a tree model can split on "missing" as its own branch.
pub const MISSING_SENTINEL: f64 = -1.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Ordinal, EnumCount, EnumIter, Display)]
pub enum FeatureSlot {
    PastResultsScore,
    CourseFitScore,
    TimeIndexScore,
    Last3fScore,
    PopularityScore,
    PedigreeScore,
    RunningStyleScore,
    Odds,
    Popularity,
    Weight,
    WeightDiff,
    Age,
    Impost,
    HorseNumber,
    FieldSize,
    WinRate,
    Top3Rate,
    AvgFinishPosition,
    DaysSinceLastRace,
}

impl From<FeatureSlot> for usize {
    fn from(slot: FeatureSlot) -> Self {
        slot.ordinal()
    }
}

pub const FEATURE_COUNT: usize = FeatureSlot::COUNT;

fn factor_or_sentinel(factor_scores: &FxHashMap<FactorName, Option<f64>>, name: FactorName) -> f64 {
    factor_scores.get(&name).copied().flatten().unwrap_or(MISSING_SENTINEL)
}

/// Builds one horse's feature row. `past_results` must already be the
/// leak-free, most-recent-first sequence for this horse as of `current_date`.
pub fn build_row(
    factor_scores: &FxHashMap<FactorName, Option<f64>>,
    entry: &RaceEntry,
    field_size: usize,
    past_results: &[PastResultRecord],
    current_date: NaiveDate,
) -> [f64; FEATURE_COUNT] {
    let mut row = [MISSING_SENTINEL; FEATURE_COUNT];

    row[FeatureSlot::PastResultsScore.ordinal()] = factor_or_sentinel(factor_scores, FactorName::PastResults);
    row[FeatureSlot::CourseFitScore.ordinal()] = factor_or_sentinel(factor_scores, FactorName::CourseFit);
    row[FeatureSlot::TimeIndexScore.ordinal()] = factor_or_sentinel(factor_scores, FactorName::TimeIndex);
    row[FeatureSlot::Last3fScore.ordinal()] = factor_or_sentinel(factor_scores, FactorName::Last3f);
    row[FeatureSlot::PopularityScore.ordinal()] = factor_or_sentinel(factor_scores, FactorName::Popularity);
    row[FeatureSlot::PedigreeScore.ordinal()] = factor_or_sentinel(factor_scores, FactorName::Pedigree);
    row[FeatureSlot::RunningStyleScore.ordinal()] =
        factor_or_sentinel(factor_scores, FactorName::RunningStyle);

    row[FeatureSlot::Odds.ordinal()] = entry.odds.unwrap_or(MISSING_SENTINEL);
    row[FeatureSlot::Popularity.ordinal()] = entry.popularity.map(f64::from).unwrap_or(MISSING_SENTINEL);
    row[FeatureSlot::Weight.ordinal()] = entry.body_weight.map(f64::from).unwrap_or(MISSING_SENTINEL);
    row[FeatureSlot::WeightDiff.ordinal()] =
        entry.body_weight_delta.map(f64::from).unwrap_or(MISSING_SENTINEL);
    row[FeatureSlot::Age.ordinal()] = entry.age.map(f64::from).unwrap_or(MISSING_SENTINEL);
    row[FeatureSlot::Impost.ordinal()] = entry.impost_kg;
    row[FeatureSlot::HorseNumber.ordinal()] = entry.horse_number as f64;
    row[FeatureSlot::FieldSize.ordinal()] = field_size as f64;

    let finished: Vec<&PastResultRecord> = past_results.iter().filter(|r| !r.did_not_finish()).collect();
    if !finished.is_empty() {
        let wins = finished.iter().filter(|r| r.finish_position == 1).count();
        let top3 = finished.iter().filter(|r| r.finish_position <= 3).count();
        row[FeatureSlot::WinRate.ordinal()] = wins as f64 / finished.len() as f64;
        row[FeatureSlot::Top3Rate.ordinal()] = top3 as f64 / finished.len() as f64;
        let sum: u32 = finished.iter().map(|r| r.finish_position as u32).sum();
        row[FeatureSlot::AvgFinishPosition.ordinal()] = sum as f64 / finished.len() as f64;
    }
    if let Some(most_recent) = past_results.first() {
        let days = (current_date - most_recent.race_date).num_days();
        row[FeatureSlot::DaysSinceLastRace.ordinal()] = days as f64;
    }

    row
}

/// Stacks per-horse rows into the (N, 19) matrix the trainer and predictor
/// consume.
pub fn build_matrix(rows: &[[f64; FEATURE_COUNT]]) -> shutuba::linear::matrix::Matrix<f64> {
    let mut matrix = shutuba::linear::matrix::Matrix::allocate(rows.len(), FEATURE_COUNT);
    for (i, row) in rows.iter().enumerate() {
        matrix.row_slice_mut(i).copy_from_slice(row);
    }
    matrix
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Surface;
    use crate::race_id::RaceId;

    fn entry() -> RaceEntry {
        RaceEntry {
            horse_id: "h1".into(),
            horse_name: "Example Horse".into(),
            horse_number: 5,
            bracket_number: 3,
            jockey_id: "j1".into(),
            jockey_name: "Example Jockey".into(),
            impost_kg: 55.0,
            sex: None,
            age: None,
            odds: None,
            popularity: None,
            body_weight: None,
            body_weight_delta: None,
        }
    }

    #[test]
    fn empty_history_fills_sentinels() {
        let factor_scores = FxHashMap::default();
        let row = build_row(
            &factor_scores,
            &entry(),
            10,
            &[],
            NaiveDate::from_ymd_opt(2025, 6, 1).unwrap(),
        );
        assert_eq!(MISSING_SENTINEL, row[FeatureSlot::WinRate.ordinal()]);
        assert_eq!(MISSING_SENTINEL, row[FeatureSlot::DaysSinceLastRace.ordinal()]);
        assert_eq!(55.0, row[FeatureSlot::Impost.ordinal()]);
        assert_eq!(5.0, row[FeatureSlot::HorseNumber.ordinal()]);
    }

    #[test]
    fn win_rate_and_top3_rate_computed() {
        let factor_scores = FxHashMap::default();
        let past = vec![
            PastResultRecord {
                race_id: RaceId::parse("202506010801").unwrap(),
                race_date: NaiveDate::from_ymd_opt(2025, 5, 1).unwrap(),
                surface: Surface::Turf,
                distance_metres: 2000,
                finish_position: 1,
                field_size: 10,
                finish_time_seconds: None,
                last_3f_seconds: None,
                odds: None,
                popularity: None,
                passing_order: None,
                total_runners: 10,
            },
            PastResultRecord {
                race_id: RaceId::parse("202506010802").unwrap(),
                race_date: NaiveDate::from_ymd_opt(2025, 4, 1).unwrap(),
                surface: Surface::Turf,
                distance_metres: 2000,
                finish_position: 5,
                field_size: 10,
                finish_time_seconds: None,
                last_3f_seconds: None,
                odds: None,
                popularity: None,
                passing_order: None,
                total_runners: 10,
            },
        ];
        let row = build_row(
            &factor_scores,
            &entry(),
            10,
            &past,
            NaiveDate::from_ymd_opt(2025, 6, 1).unwrap(),
        );
        assert_float_eq::assert_float_relative_eq!(0.5, row[FeatureSlot::WinRate.ordinal()], 1e-9);
        assert_float_eq::assert_float_relative_eq!(0.5, row[FeatureSlot::Top3Rate.ordinal()], 1e-9);
        assert_float_eq::assert_float_relative_eq!(31.0, row[FeatureSlot::DaysSinceLastRace.ordinal()], 1e-9);
    }

    /// A DNF row must count toward neither the win/top3 numerators nor their
    /// denominators, which are `finished.len()`, not `past_results.len()`.
    #[test]
    fn dnf_rows_excluded_from_rate_denominators() {
        let factor_scores = FxHashMap::default();
        let past = vec![
            PastResultRecord {
                race_id: RaceId::parse("202506010801").unwrap(),
                race_date: NaiveDate::from_ymd_opt(2025, 5, 1).unwrap(),
                surface: Surface::Turf,
                distance_metres: 2000,
                finish_position: 1,
                field_size: 10,
                finish_time_seconds: None,
                last_3f_seconds: None,
                odds: None,
                popularity: None,
                passing_order: None,
                total_runners: 10,
            },
            PastResultRecord {
                race_id: RaceId::parse("202506010802").unwrap(),
                race_date: NaiveDate::from_ymd_opt(2025, 4, 1).unwrap(),
                surface: Surface::Turf,
                distance_metres: 2000,
                finish_position: 5,
                field_size: 10,
                finish_time_seconds: None,
                last_3f_seconds: None,
                odds: None,
                popularity: None,
                passing_order: None,
                total_runners: 10,
            },
            PastResultRecord {
                race_id: RaceId::parse("202506010803").unwrap(),
                race_date: NaiveDate::from_ymd_opt(2025, 3, 1).unwrap(),
                surface: Surface::Turf,
                distance_metres: 2000,
                finish_position: 0,
                field_size: 10,
                finish_time_seconds: None,
                last_3f_seconds: None,
                odds: None,
                popularity: None,
                passing_order: None,
                total_runners: 10,
            },
        ];
        let row = build_row(
            &factor_scores,
            &entry(),
            10,
            &past,
            NaiveDate::from_ymd_opt(2025, 6, 1).unwrap(),
        );
        assert_float_eq::assert_float_relative_eq!(0.5, row[FeatureSlot::WinRate.ordinal()], 1e-9);
        assert_float_eq::assert_float_relative_eq!(0.5, row[FeatureSlot::Top3Rate.ordinal()], 1e-9);
        assert_float_eq::assert_float_relative_eq!(3.0, row[FeatureSlot::AvgFinishPosition.ordinal()], 1e-9);
    }
}
