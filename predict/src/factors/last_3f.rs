//! Best last-three-furlong time across a horse's last five starts, mapped
//! linearly onto [0,100].

use super::{clip_score, FactorContext};
use crate::domain::PastResultRecord;

const LOOKBACK: usize = 5;
const FAST_ANCHOR_SECONDS: f64 = 33.0;
const SLOW_ANCHOR_SECONDS: f64 = 38.0;

pub fn score(_horse_id: &str, past_results: &[PastResultRecord], _context: &FactorContext) -> Option<f64> {
    let best = past_results
        .iter()
        .take(LOOKBACK)
        .filter_map(|r| r.last_3f_seconds)
        .min_by(|a, b| a.partial_cmp(b).unwrap())?;

    let raw = (SLOW_ANCHOR_SECONDS - best) / (SLOW_ANCHOR_SECONDS - FAST_ANCHOR_SECONDS) * 100.0;
    Some(clip_score(raw))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Surface;
    use crate::factors::test_support::default_context;
    use crate::factors::StyleWinRateTable;
    use crate::pedigree::PedigreeMaster;
    use chrono::NaiveDate;

    fn row(last_3f_seconds: Option<f64>) -> PastResultRecord {
        PastResultRecord {
            race_id: crate::race_id::RaceId::parse("202506010801").unwrap(),
            race_date: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            surface: Surface::Turf,
            distance_metres: 2000,
            finish_position: 1,
            field_size: 10,
            finish_time_seconds: None,
            last_3f_seconds,
            odds: None,
            popularity: None,
            passing_order: None,
            total_runners: 10,
        }
    }

    #[test]
    fn no_observations_is_missing() {
        let master = PedigreeMaster::default();
        let table = StyleWinRateTable::default();
        let context = default_context(&master, &table);
        let rows = vec![row(None), row(None)];
        assert_eq!(None, score("h1", &rows, &context));
    }

    #[test]
    fn fast_anchor_maps_to_hundred() {
        let master = PedigreeMaster::default();
        let table = StyleWinRateTable::default();
        let context = default_context(&master, &table);
        let rows = vec![row(Some(33.0))];
        let s = score("h1", &rows, &context).unwrap();
        assert_float_eq::assert_float_relative_eq!(100.0, s, 1e-9);
    }

    #[test]
    fn slow_anchor_maps_to_zero() {
        let master = PedigreeMaster::default();
        let table = StyleWinRateTable::default();
        let context = default_context(&master, &table);
        let rows = vec![row(Some(38.0))];
        let s = score("h1", &rows, &context).unwrap();
        assert_float_eq::assert_float_relative_eq!(0.0, s, 1e-9);
    }

    #[test]
    fn picks_best_among_last_five() {
        let master = PedigreeMaster::default();
        let table = StyleWinRateTable::default();
        let context = default_context(&master, &table);
        let rows = vec![row(Some(35.0)), row(Some(34.0)), row(Some(36.0))];
        let s = score("h1", &rows, &context).unwrap();
        let expected = (38.0 - 34.0) / 5.0 * 100.0;
        assert_float_eq::assert_float_relative_eq!(expected, s, 1e-9);
    }
}
