//! Weighted average of relative finish position over a horse's last five
//! starts, most recent weighted highest.

use super::{clip_score, FactorContext};
use crate::domain::PastResultRecord;

const RECENCY_WEIGHTS: [f64; 5] = [0.35, 0.25, 0.20, 0.12, 0.08];

pub fn score(_horse_id: &str, past_results: &[PastResultRecord], _context: &FactorContext) -> Option<f64> {
    let mut weighted_sum = 0.0;
    let mut weight_total = 0.0;

    for (row, &weight) in past_results.iter().filter(|r| !r.did_not_finish()).zip(RECENCY_WEIGHTS.iter()) {
        let relative_position =
            (row.field_size as f64 - row.finish_position as f64 + 1.0) / row.field_size as f64;
        weighted_sum += weight * relative_position * 100.0;
        weight_total += weight;
    }

    if weight_total == 0.0 {
        return None;
    }
    Some(clip_score(weighted_sum / weight_total))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Surface;
    use crate::factors::test_support::default_context;
    use crate::factors::StyleWinRateTable;
    use crate::pedigree::PedigreeMaster;
    use chrono::NaiveDate;

    fn row(finish_position: u8, field_size: u16) -> PastResultRecord {
        PastResultRecord {
            race_id: crate::race_id::RaceId::parse("202506010801").unwrap(),
            race_date: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            surface: Surface::Turf,
            distance_metres: 2000,
            finish_position,
            field_size,
            finish_time_seconds: None,
            last_3f_seconds: None,
            odds: None,
            popularity: None,
            passing_order: None,
            total_runners: field_size,
        }
    }

    #[test]
    fn no_results_is_missing() {
        let master = PedigreeMaster::default();
        let table = StyleWinRateTable::default();
        let context = default_context(&master, &table);
        assert_eq!(None, score("h1", &[], &context));
    }

    #[test]
    fn dnfs_are_excluded() {
        let master = PedigreeMaster::default();
        let table = StyleWinRateTable::default();
        let context = default_context(&master, &table);
        let mut dnf = row(1, 10);
        dnf.finish_position = 0;
        let rows = vec![dnf];
        assert_eq!(None, score("h1", &rows, &context));
    }

    #[test]
    fn single_win_scores_perfect() {
        let master = PedigreeMaster::default();
        let table = StyleWinRateTable::default();
        let context = default_context(&master, &table);
        let rows = vec![row(1, 10)];
        let s = score("h1", &rows, &context).unwrap();
        assert_float_eq::assert_float_relative_eq!(100.0, s, 1e-9);
    }
}
