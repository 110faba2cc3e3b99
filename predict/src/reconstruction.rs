//! Rebuilds the shutuba (entry list) a prediction service would have seen
//! at race time from recorded results. Shared by the backtest engine and
//! the ticket simulators: both replay completed races and must feed the
//! prediction service the same shape of input it would have received
//! before the result existed, with no result-derived field (finish
//! position, payouts, ...) anywhere in sight.

use rustc_hash::FxHashMap;

use crate::domain::{Horse, Race, RaceEntry, RaceResult, ShutubaData};

pub fn reconstruct_shutuba(
    race: &Race,
    results: &[RaceResult],
    horses: &FxHashMap<String, Horse>,
) -> ShutubaData {
    let entries = results
        .iter()
        .map(|result| RaceEntry {
            horse_id: result.horse_id.clone(),
            horse_name: horses.get(&result.horse_id).map(|h| h.name.clone()).unwrap_or_default(),
            horse_number: result.horse_number,
            bracket_number: result.bracket_number,
            jockey_id: String::new(),
            jockey_name: String::new(),
            impost_kg: result.impost_kg,
            sex: Some(result.sex),
            age: Some(result.age),
            odds: result.odds,
            popularity: result.popularity,
            body_weight: result.body_weight,
            body_weight_delta: result.body_weight_delta,
        })
        .collect();

    ShutubaData {
        race_id: race.id.clone(),
        race_name: race_display_name(race),
        race_number: race.race_number,
        venue_name: race.venue_name.clone(),
        distance_metres: race.distance_metres,
        surface: race.surface,
        track_condition: race.track_condition,
        date: race.date,
        entries,
    }
}

/// The read-only race contract (§6) doesn't track a free-text race name, so
/// one is derived from venue and race number for display purposes.
pub fn race_display_name(race: &Race) -> String {
    format!("{} {}R", race.venue_name, race.race_number)
}
