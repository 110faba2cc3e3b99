//! Distance-normalized finish-time index: each matching past result's
//! finish time is compared to the median of the same filtered set, since no
//! external corpus-wide baseline is threaded through the context.

use super::{clip_score, FactorContext};
use crate::domain::PastResultRecord;

const DISTANCE_TOLERANCE_METRES: i32 = 100;
const MIN_MATCHING_ROWS: usize = 2;

pub fn score(_horse_id: &str, past_results: &[PastResultRecord], context: &FactorContext) -> Option<f64> {
    let times: Vec<f64> = past_results
        .iter()
        .filter(|r| matches_course(r, context))
        .filter_map(|r| r.finish_time_seconds)
        .collect();

    if times.len() < MIN_MATCHING_ROWS {
        return None;
    }

    let baseline = median(&times);
    let std_dev = std_deviation(&times, baseline);

    if std_dev == 0.0 {
        return Some(50.0);
    }

    let avg_z: f64 = times.iter().map(|&t| (baseline - t) / std_dev).sum::<f64>() / times.len() as f64;
    Some(clip_score(50.0 + 5.0 * avg_z))
}

fn matches_course(row: &PastResultRecord, context: &FactorContext) -> bool {
    row.surface == context.target_surface
        && (row.distance_metres as i32 - context.target_distance_metres as i32).abs()
            <= DISTANCE_TOLERANCE_METRES
}

fn median(values: &[f64]) -> f64 {
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap());
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}

fn std_deviation(values: &[f64], mean: f64) -> f64 {
    let variance =
        values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / values.len() as f64;
    variance.sqrt()
}
