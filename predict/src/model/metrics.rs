//! Fold-level metric computations shared by the trainer: log-loss, AUC and
//! race-grouped precision-at-k.

const LOG_LOSS_EPSILON: f64 = 1e-15;

pub fn log_loss(predictions: &[f64], labels: &[u8]) -> f64 {
    let n = predictions.len() as f64;
    let sum: f64 = predictions
        .iter()
        .zip(labels)
        .map(|(&p, &y)| {
            let clipped = p.clamp(LOG_LOSS_EPSILON, 1.0 - LOG_LOSS_EPSILON);
            let y = y as f64;
            -(y * clipped.ln() + (1.0 - y) * (1.0 - clipped).ln())
        })
        .sum();
    sum / n
}

/// Rank-based AUC (Mann-Whitney U). Returns `None` when the holdout has a
/// single class, since AUC is undefined there.
pub fn auc(predictions: &[f64], labels: &[u8]) -> Option<f64> {
    let positives = labels.iter().filter(|&&y| y == 1).count();
    let negatives = labels.len() - positives;
    if positives == 0 || negatives == 0 {
        return None;
    }

    let mut ranked: Vec<(f64, u8)> = predictions.iter().copied().zip(labels.iter().copied()).collect();
    ranked.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap());

    let mut rank_sum_positive = 0.0;
    let mut i = 0;
    while i < ranked.len() {
        let mut j = i;
        while j < ranked.len() && ranked[j].0 == ranked[i].0 {
            j += 1;
        }
        let average_rank = (i + 1 + j) as f64 / 2.0;
        for item in ranked.iter().take(j).skip(i) {
            if item.1 == 1 {
                rank_sum_positive += average_rank;
            }
        }
        i = j;
    }

    let u = rank_sum_positive - (positives as f64 * (positives as f64 + 1.0)) / 2.0;
    Some(u / (positives as f64 * negatives as f64))
}

/// Precision@1 and Precision@3 computed per race group and averaged, per the
/// race-grouped definition: treating each race independently is the only
/// correct form (global-level precision mixes fields of different sizes).
pub fn precision_at_k_grouped(predictions: &[f64], labels: &[u8], groups: &[u32]) -> (f64, f64) {
    use rustc_hash::FxHashMap;

    let mut by_group: FxHashMap<u32, Vec<(f64, u8)>> = FxHashMap::default();
    for ((&p, &y), &g) in predictions.iter().zip(labels).zip(groups) {
        by_group.entry(g).or_default().push((p, y));
    }

    let mut p1_sum = 0.0;
    let mut p3_sum = 0.0;
    let race_count = by_group.len() as f64;

    for rows in by_group.values_mut() {
        rows.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap());
        if let Some(&(_, top1_label)) = rows.first() {
            p1_sum += if top1_label == 1 { 1.0 } else { 0.0 };
        }
        let top3_hits = rows.iter().take(3).filter(|&&(_, y)| y == 1).count();
        p3_sum += top3_hits as f64 / 3.0;
    }

    if race_count == 0.0 {
        return (0.0, 0.0);
    }
    (p1_sum / race_count, p3_sum / race_count)
}
