//! Running-style factor: classifies the horse's habitual racing position
//! from first-corner passing order, then scores it against a course-specific
//! style win-rate table.

use rustc_hash::FxHashMap;

use super::{clip_score, FactorContext};
use crate::domain::PastResultRecord;
use crate::pedigree::DistanceBand;

const LOOKBACK: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RunningStyle {
    Escape,
    Front,
    Stalker,
    Closer,
}

impl RunningStyle {
    fn classify(first_corner_ratio: f64) -> Self {
        if first_corner_ratio <= 0.15 {
            RunningStyle::Escape
        } else if first_corner_ratio <= 0.40 {
            RunningStyle::Front
        } else if first_corner_ratio <= 0.70 {
            RunningStyle::Stalker
        } else {
            RunningStyle::Closer
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct StyleWinRates {
    pub escape: f64,
    pub front: f64,
    pub stalker: f64,
    pub closer: f64,
}

impl StyleWinRates {
    pub fn default_fallback() -> Self {
        Self { escape: 0.15, front: 0.35, stalker: 0.35, closer: 0.15 }
    }

    fn get(&self, style: RunningStyle) -> f64 {
        match style {
            RunningStyle::Escape => self.escape,
            RunningStyle::Front => self.front,
            RunningStyle::Stalker => self.stalker,
            RunningStyle::Closer => self.closer,
        }
    }
}

/// Course-specific win rates per running style, keyed by venue and distance
/// band, falling back to [`StyleWinRates::default_fallback`] when a course
/// has no recorded table yet.
#[derive(Debug, Clone, Default)]
pub struct StyleWinRateTable {
    rates: FxHashMap<(String, u8), StyleWinRates>,
}

impl StyleWinRateTable {
    pub fn insert(&mut self, venue_name: impl Into<String>, band: DistanceBand, rates: StyleWinRates) {
        self.rates.insert((venue_name.into(), band_index(band)), rates);
    }

    fn lookup(&self, venue_name: &str, band: DistanceBand) -> StyleWinRates {
        self.rates
            .get(&(venue_name.to_string(), band_index(band)))
            .copied()
            .unwrap_or_else(StyleWinRates::default_fallback)
    }
}

fn band_index(band: DistanceBand) -> u8 {
    match band {
        DistanceBand::Sprint => 0,
        DistanceBand::Mile => 1,
        DistanceBand::Middle => 2,
        DistanceBand::Long => 3,
    }
}

fn first_corner_ratio(row: &PastResultRecord) -> Option<f64> {
    let passing_order = row.passing_order.as_ref()?;
    let p1: f64 = passing_order.split('-').next()?.parse().ok()?;
    if row.total_runners == 0 {
        return None;
    }
    Some(p1 / row.total_runners as f64)
}

fn mode(styles: &[RunningStyle]) -> Option<RunningStyle> {
    let mut counts: Vec<(RunningStyle, u32)> = Vec::new();
    for &style in styles {
        if let Some(entry) = counts.iter_mut().find(|(s, _)| *s == style) {
            entry.1 += 1;
        } else {
            counts.push((style, 1));
        }
    }
    counts.into_iter().max_by_key(|&(_, count)| count).map(|(s, _)| s)
}

pub fn score(_horse_id: &str, past_results: &[PastResultRecord], context: &FactorContext) -> Option<f64> {
    let styles: Vec<RunningStyle> = past_results
        .iter()
        .take(LOOKBACK)
        .filter_map(first_corner_ratio)
        .map(RunningStyle::classify)
        .collect();

    let tendency = mode(&styles)?;
    let band = DistanceBand::classify(context.target_distance_metres);
    let rates = context.style_table.lookup(context.venue_name, band);
    let win_rate = rates.get(tendency);

    Some(clip_score((win_rate - 0.05) / 0.35 * 100.0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Surface;
    use crate::factors::test_support::default_context;
    use crate::pedigree::PedigreeMaster;
    use chrono::NaiveDate;

    fn row(passing_order: Option<&str>, total_runners: u16) -> PastResultRecord {
        PastResultRecord {
            race_id: crate::race_id::RaceId::parse("202506010801").unwrap(),
            race_date: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            surface: Surface::Turf,
            distance_metres: 2000,
            finish_position: 1,
            field_size: total_runners,
            finish_time_seconds: None,
            last_3f_seconds: None,
            odds: None,
            popularity: None,
            passing_order: passing_order.map(str::to_string),
            total_runners,
        }
    }

    #[test]
    fn no_classifiable_result_is_missing() {
        let master = PedigreeMaster::default();
        let table = StyleWinRateTable::default();
        let context = default_context(&master, &table);
        let rows = vec![row(None, 10)];
        assert_eq!(None, score("h1", &rows, &context));
    }

    #[test]
    fn escape_style_boundary() {
        assert_eq!(RunningStyle::Escape, RunningStyle::classify(0.15));
        assert_eq!(RunningStyle::Front, RunningStyle::classify(0.16));
        assert_eq!(RunningStyle::Front, RunningStyle::classify(0.40));
        assert_eq!(RunningStyle::Stalker, RunningStyle::classify(0.41));
        assert_eq!(RunningStyle::Stalker, RunningStyle::classify(0.70));
        assert_eq!(RunningStyle::Closer, RunningStyle::classify(0.71));
    }

    #[test]
    fn fallback_table_scores_escape() {
        let master = PedigreeMaster::default();
        let table = StyleWinRateTable::default();
        let context = default_context(&master, &table);
        let rows = vec![row(Some("1-1-1-1"), 10)];
        let s = score("h1", &rows, &context).unwrap();
        let expected = (0.15 - 0.05) / 0.35 * 100.0;
        assert_float_eq::assert_float_relative_eq!(expected, s, 1e-9);
    }
}
