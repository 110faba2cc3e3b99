//! Fits the gradient-boosted probability model with stratified K-fold
//! cross-validation, then refits on the full dataset for the artifact
//! that's actually served.

use lightgbm::{Booster, Dataset};
use serde_json::json;
use thiserror::Error;
use tinyrand::{Rand, RandRange, Seeded, StdRand};

use shutuba::linear::matrix::Matrix;

use super::metrics;

pub const MIN_TRAINING_SAMPLES: usize = 100;
const DEFAULT_K_FOLDS: usize = 5;
const FOLD_SEED: u64 = 0x5255_4d42_4159; // fixed so reruns are bit-identical

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrainingProfile {
    /// 31 leaves, lr 0.05, 100 estimators, 0.9 feature / 0.8 row subsample every 5th iteration.
    Normal,
    /// 15 leaves, lr 0.10, 50 estimators — used for frequent backtest retraining.
    Lightweight,
}

impl TrainingProfile {
    fn params(&self) -> serde_json::Value {
        match self {
            TrainingProfile::Normal => json!({
                "objective": "binary",
                "num_leaves": 31,
                "learning_rate": 0.05,
                "num_iterations": 100,
                "feature_fraction": 0.9,
                "bagging_fraction": 0.8,
                "bagging_freq": 5,
                "verbosity": -1,
            }),
            TrainingProfile::Lightweight => json!({
                "objective": "binary",
                "num_leaves": 15,
                "learning_rate": 0.10,
                "num_iterations": 50,
                "verbosity": -1,
            }),
        }
    }
}

#[derive(Debug, Error)]
pub enum TrainerError {
    #[error("insufficient training data: {0} samples, need at least {1}")]
    InsufficientTrainingData(usize, usize),

    #[error("model training failed")]
    Training(#[source] anyhow::Error),
}

#[derive(Debug, Clone, Copy, Default)]
pub struct FoldMetrics {
    pub precision_at_1: f64,
    pub precision_at_3: f64,
    pub auc: Option<f64>,
    pub log_loss: f64,
}

/// The full metrics bundle produced by one training run: per-fold detail
/// plus the aggregate used for reporting.
#[derive(Debug, Clone, Default)]
pub struct MetricsBundle {
    pub fold_metrics: Vec<FoldMetrics>,
    pub mean_precision_at_1: f64,
    pub mean_precision_at_3: f64,
    /// `None` only if every fold's holdout was single-class.
    pub mean_auc: Option<f64>,
    pub mean_log_loss: f64,
    /// Whether precision-at-k was computed race-grouped. Always `true` in
    /// this implementation: the trainer requires a race-group index.
    pub race_grouped: bool,
}

pub struct ModelTrainer {
    profile: TrainingProfile,
    k_folds: usize,
}

impl ModelTrainer {
    pub fn new(profile: TrainingProfile) -> Self {
        Self { profile, k_folds: DEFAULT_K_FOLDS }
    }

    /// `race_groups[i]` identifies which race row `i` belongs to, so that
    /// Precision@K can be computed per-race rather than across the whole
    /// holdout as if it were one undifferentiated pool.
    pub fn train(
        &self,
        features: &Matrix<f64>,
        labels: &[u8],
        race_groups: &[u32],
    ) -> Result<(Booster, MetricsBundle), TrainerError> {
        let n = features.rows();
        if n < MIN_TRAINING_SAMPLES {
            return Err(TrainerError::InsufficientTrainingData(n, MIN_TRAINING_SAMPLES));
        }

        let fold_assignment = self.stratified_fold_assignment(labels);
        let mut fold_metrics = Vec::with_capacity(self.k_folds);

        for fold in 0..self.k_folds {
            let train_idx: Vec<usize> = (0..n).filter(|&i| fold_assignment[i] != fold).collect();
            let holdout_idx: Vec<usize> = (0..n).filter(|&i| fold_assignment[i] == fold).collect();
            if holdout_idx.is_empty() || train_idx.is_empty() {
                continue;
            }

            let train_rows: Vec<Vec<f64>> =
                train_idx.iter().map(|&i| features.row_slice(i).to_vec()).collect();
            let train_labels: Vec<f32> = train_idx.iter().map(|&i| labels[i] as f32).collect();
            let holdout_rows: Vec<Vec<f64>> =
                holdout_idx.iter().map(|&i| features.row_slice(i).to_vec()).collect();
            let holdout_labels: Vec<u8> = holdout_idx.iter().map(|&i| labels[i]).collect();
            let holdout_groups: Vec<u32> = holdout_idx.iter().map(|&i| race_groups[i]).collect();

            let dataset = Dataset::from_mat(train_rows, train_labels)
                .map_err(|e| TrainerError::Training(anyhow::anyhow!(e)))?;
            let booster = Booster::train(dataset, &self.profile.params())
                .map_err(|e| TrainerError::Training(anyhow::anyhow!(e)))?;
            let predictions = booster
                .predict(holdout_rows)
                .map_err(|e| TrainerError::Training(anyhow::anyhow!(e)))?;

            let (precision_at_1, precision_at_3) =
                metrics::precision_at_k_grouped(&predictions, &holdout_labels, &holdout_groups);
            fold_metrics.push(FoldMetrics {
                precision_at_1,
                precision_at_3,
                auc: metrics::auc(&predictions, &holdout_labels),
                log_loss: metrics::log_loss(&predictions, &holdout_labels),
            });
        }

        let bundle = aggregate(fold_metrics);

        let all_rows: Vec<Vec<f64>> = (0..n).map(|i| features.row_slice(i).to_vec()).collect();
        let all_labels: Vec<f32> = labels.iter().map(|&l| l as f32).collect();
        let full_dataset = Dataset::from_mat(all_rows, all_labels)
            .map_err(|e| TrainerError::Training(anyhow::anyhow!(e)))?;
        let final_model = Booster::train(full_dataset, &self.profile.params())
            .map_err(|e| TrainerError::Training(anyhow::anyhow!(e)))?;

        Ok((final_model, bundle))
    }

    /// Assigns each row to one of `k_folds`, stratified by label: positives
    /// and negatives are independently shuffled (fixed seed) then dealt out
    /// round-robin, so every fold gets a similar positive rate.
    fn stratified_fold_assignment(&self, labels: &[u8]) -> Vec<usize> {
        let mut rand = StdRand::seed(FOLD_SEED);
        let mut positive: Vec<usize> = (0..labels.len()).filter(|&i| labels[i] == 1).collect();
        let mut negative: Vec<usize> = (0..labels.len()).filter(|&i| labels[i] == 0).collect();
        fisher_yates(&mut positive, &mut rand);
        fisher_yates(&mut negative, &mut rand);

        let mut assignment = vec![0usize; labels.len()];
        for (rank, &idx) in positive.iter().enumerate() {
            assignment[idx] = rank % self.k_folds;
        }
        for (rank, &idx) in negative.iter().enumerate() {
            assignment[idx] = rank % self.k_folds;
        }
        assignment
    }
}

fn fisher_yates(items: &mut [usize], rand: &mut StdRand) {
    for i in (1..items.len()).rev() {
        let j = rand.next_range(0..(i as u64 + 1)) as usize;
        items.swap(i, j);
    }
}

fn aggregate(fold_metrics: Vec<FoldMetrics>) -> MetricsBundle {
    let count = fold_metrics.len() as f64;
    if count == 0.0 {
        return MetricsBundle { race_grouped: true, ..Default::default() };
    }

    let mean_precision_at_1 = fold_metrics.iter().map(|m| m.precision_at_1).sum::<f64>() / count;
    let mean_precision_at_3 = fold_metrics.iter().map(|m| m.precision_at_3).sum::<f64>() / count;
    let mean_log_loss = fold_metrics.iter().map(|m| m.log_loss).sum::<f64>() / count;

    let auc_values: Vec<f64> = fold_metrics.iter().filter_map(|m| m.auc).collect();
    let mean_auc = if auc_values.is_empty() {
        None
    } else {
        Some(auc_values.iter().sum::<f64>() / auc_values.len() as f64)
    };

    MetricsBundle {
        fold_metrics,
        mean_precision_at_1,
        mean_precision_at_3,
        mean_auc,
        mean_log_loss,
        race_grouped: true,
    }
}
