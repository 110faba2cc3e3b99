//! Top-3 rate over past results on the same surface, within 100m of the
//! target distance.

use super::{clip_score, FactorContext};
use crate::domain::PastResultRecord;

const DISTANCE_TOLERANCE_METRES: i32 = 100;
const MIN_MATCHING_ROWS: usize = 3;

pub fn score(_horse_id: &str, past_results: &[PastResultRecord], context: &FactorContext) -> Option<f64> {
    let matching: Vec<&PastResultRecord> = past_results
        .iter()
        .filter(|r| matches_course(r, context) && !r.did_not_finish())
        .collect();

    if matching.len() < MIN_MATCHING_ROWS {
        return None;
    }

    let top3 = matching.iter().filter(|r| r.finish_position <= 3).count();
    Some(clip_score(top3 as f64 / matching.len() as f64 * 100.0))
}

fn matches_course(row: &PastResultRecord, context: &FactorContext) -> bool {
    row.surface == context.target_surface
        && (row.distance_metres as i32 - context.target_distance_metres as i32).abs()
            <= DISTANCE_TOLERANCE_METRES
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Surface;
    use crate::factors::test_support::default_context;
    use crate::factors::StyleWinRateTable;
    use crate::pedigree::PedigreeMaster;
    use chrono::NaiveDate;

    fn row(surface: Surface, distance: u16, finish_position: u8) -> PastResultRecord {
        PastResultRecord {
            race_id: crate::race_id::RaceId::parse("202506010801").unwrap(),
            race_date: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            surface,
            distance_metres: distance,
            finish_position,
            field_size: 10,
            finish_time_seconds: None,
            last_3f_seconds: None,
            odds: None,
            popularity: None,
            passing_order: None,
            total_runners: 10,
        }
    }

    #[test]
    fn fewer_than_three_matches_is_missing() {
        let master = PedigreeMaster::default();
        let table = StyleWinRateTable::default();
        let context = default_context(&master, &table);
        let rows = vec![row(Surface::Turf, 2000, 1), row(Surface::Turf, 2050, 2)];
        assert_eq!(None, score("h1", &rows, &context));
    }

    #[test]
    fn distance_outside_tolerance_excluded() {
        let master = PedigreeMaster::default();
        let table = StyleWinRateTable::default();
        let context = default_context(&master, &table);
        let rows = vec![
            row(Surface::Turf, 2000, 1),
            row(Surface::Turf, 2090, 2),
            row(Surface::Turf, 2300, 1),
        ];
        assert_eq!(None, score("h1", &rows, &context));
    }

    #[test]
    fn top3_rate_computed_over_matches() {
        let master = PedigreeMaster::default();
        let table = StyleWinRateTable::default();
        let context = default_context(&master, &table);
        let rows = vec![
            row(Surface::Turf, 2000, 1),
            row(Surface::Turf, 2050, 5),
            row(Surface::Turf, 1950, 2),
            row(Surface::Turf, 2080, 8),
        ];
        let s = score("h1", &rows, &context).unwrap();
        assert_float_eq::assert_float_relative_eq!(50.0, s, 1e-9);
    }

    #[test]
    fn dnf_rows_excluded_from_denominator() {
        let master = PedigreeMaster::default();
        let table = StyleWinRateTable::default();
        let context = default_context(&master, &table);
        // Four course-matching rows, one a DNF. Without excluding it, the
        // DNF would count toward the denominator but never the numerator.
        let rows = vec![
            row(Surface::Turf, 2000, 1),
            row(Surface::Turf, 2050, 2),
            row(Surface::Turf, 1950, 5),
            row(Surface::Turf, 2080, 0),
        ];
        let s = score("h1", &rows, &context).unwrap();
        assert_float_eq::assert_float_relative_eq!(200.0 / 3.0, s, 1e-9);
    }
}
