//! The seven factor calculators and the typed context threaded through all
//! of them. Every calculator has the shape `(horse_id, past_results,
//! context) -> Option<f64>`; `None` means missing, never zero.

mod course_fit;
mod last_3f;
mod past_results;
mod pedigree;
mod popularity;
mod running_style;
mod time_index;

pub use running_style::{RunningStyle, StyleWinRates, StyleWinRateTable};

use chrono::NaiveDate;
use rustc_hash::FxHashMap;

use crate::domain::{FactorName, PastResultRecord, Surface, TrackCondition};
use crate::pedigree::PedigreeMaster;

/// Everything a factor calculator needs beyond a horse's own history. A
/// single typed record stands in for what would otherwise be a variadic
/// keyword-argument bag.
pub struct FactorContext<'a> {
    pub venue_name: &'a str,
    pub target_surface: Surface,
    pub target_distance_metres: u16,
    pub track_condition: TrackCondition,
    pub sire_name: Option<&'a str>,
    pub dam_sire_name: Option<&'a str>,
    pub odds: Option<f64>,
    pub popularity_rank: Option<u8>,
    pub field_size: u16,
    pub current_date: NaiveDate,
    pub pedigree_master: &'a PedigreeMaster,
    pub style_table: &'a StyleWinRateTable,
}

/// Clips a raw score into the [0, 100] contract every factor promises.
fn clip_score(raw: f64) -> f64 {
    raw.clamp(0.0, 100.0)
}

/// Runs all seven calculators for one horse and returns a map keyed by
/// factor name. Never panics on missing data — each entry is `None` for
/// missing rather than omitted, so downstream consumers can distinguish
/// "computed as zero" from "not computable".
pub fn compute_all(
    horse_id: &str,
    past_results: &[PastResultRecord],
    context: &FactorContext,
) -> FxHashMap<FactorName, Option<f64>> {
    let mut scores = FxHashMap::default();
    scores.insert(
        FactorName::PastResults,
        past_results::score(horse_id, past_results, context),
    );
    scores.insert(
        FactorName::CourseFit,
        course_fit::score(horse_id, past_results, context),
    );
    scores.insert(
        FactorName::TimeIndex,
        time_index::score(horse_id, past_results, context),
    );
    scores.insert(
        FactorName::Last3f,
        last_3f::score(horse_id, past_results, context),
    );
    scores.insert(
        FactorName::Popularity,
        popularity::score(horse_id, past_results, context),
    );
    scores.insert(
        FactorName::Pedigree,
        pedigree::score(horse_id, past_results, context),
    );
    scores.insert(
        FactorName::RunningStyle,
        running_style::score(horse_id, past_results, context),
    );
    scores
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use crate::domain::{Surface, TrackCondition};
    use chrono::NaiveDate;

    pub fn default_context<'a>(
        pedigree_master: &'a PedigreeMaster,
        style_table: &'a StyleWinRateTable,
    ) -> FactorContext<'a> {
        FactorContext {
            venue_name: "Tokyo",
            target_surface: Surface::Turf,
            target_distance_metres: 2000,
            track_condition: TrackCondition::Good,
            sire_name: None,
            dam_sire_name: None,
            odds: None,
            popularity_rank: None,
            field_size: 10,
            current_date: NaiveDate::from_ymd_opt(2025, 6, 1).unwrap(),
            pedigree_master,
            style_table,
        }
    }
}
