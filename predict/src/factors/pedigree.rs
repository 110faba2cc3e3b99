//! Pedigree factor: combines sire and dam-sire line aptitudes for the
//! target distance band and track type.

use super::{clip_score, FactorContext};
use crate::domain::PastResultRecord;
use crate::pedigree::{DistanceBand, SireLine};

pub fn score(_horse_id: &str, _past_results: &[PastResultRecord], context: &FactorContext) -> Option<f64> {
    let sire_name = context.sire_name?;
    let track_type = context.track_condition.track_type()?;

    let master = context.pedigree_master;
    let sire_line = master.classify(sire_name);
    let dam_sire_line = context
        .dam_sire_name
        .map(|name| master.classify(name))
        .unwrap_or(SireLine::Other);

    let band = DistanceBand::classify(context.target_distance_metres);

    let dist_combined =
        0.7 * master.distance_aptitude(sire_line, band) + 0.3 * master.distance_aptitude(dam_sire_line, band);
    let track_combined = 0.7 * master.track_aptitude(sire_line, track_type)
        + 0.3 * master.track_aptitude(dam_sire_line, track_type);

    Some(clip_score((dist_combined + track_combined) / 2.0 * 100.0))
}
