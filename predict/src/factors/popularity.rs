//! Popularity factor: derived from the current race's own odds or
//! popularity rank, never from history.

use super::{clip_score, FactorContext};
use crate::domain::PastResultRecord;

pub fn score(_horse_id: &str, _past_results: &[PastResultRecord], context: &FactorContext) -> Option<f64> {
    if let Some(odds) = context.odds {
        return Some(clip_score(100.0 - (10.0 * odds.log10()).min(50.0)));
    }
    if let Some(popularity_rank) = context.popularity_rank {
        if context.field_size == 0 {
            return None;
        }
        let value = (context.field_size as f64 - popularity_rank as f64 + 1.0) / context.field_size as f64
            * 100.0;
        return Some(clip_score(value));
    }
    None
}
