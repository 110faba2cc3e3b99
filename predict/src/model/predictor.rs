//! Runs a fitted model over a race field and ranks the result by predicted
//! probability.

use std::sync::Arc;

use lightgbm::Booster;

use shutuba::linear::matrix::Matrix;

#[derive(Debug, Clone, PartialEq)]
pub struct RankedPrediction {
    pub horse_id: String,
    pub probability: f64,
    /// 1-based: the favourite by predicted probability is rank 1.
    pub rank: u32,
}

/// Cheaply `Clone`-able: the backtest engine holds one predictor per
/// retraining round and hands a clone to each race's prediction service
/// without re-loading the underlying model.
#[derive(Clone)]
pub struct Predictor {
    model: Arc<Booster>,
}

impl Predictor {
    pub fn new(model: Booster) -> Self {
        Self { model: Arc::new(model) }
    }

    /// `horse_ids[i]` must correspond to `features` row `i`.
    pub fn predict(&self, features: &Matrix<f64>, horse_ids: &[String]) -> anyhow::Result<Vec<RankedPrediction>> {
        let probabilities = self.predict_probabilities(features)?;

        let mut ranked: Vec<(String, f64)> =
            horse_ids.iter().cloned().zip(probabilities).collect();
        ranked.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap());

        Ok(ranked
            .into_iter()
            .enumerate()
            .map(|(index, (horse_id, probability))| RankedPrediction {
                horse_id,
                probability,
                rank: index as u32 + 1,
            })
            .collect())
    }

    /// Raw per-row probabilities, in the same order as `features`'s rows —
    /// no sorting or rank annotation. Used where the caller imposes its own
    /// ordering downstream (the prediction service ranks by combined score).
    pub fn predict_probabilities(&self, features: &Matrix<f64>) -> anyhow::Result<Vec<f64>> {
        let rows: Vec<Vec<f64>> = (0..features.rows()).map(|i| features.row_slice(i).to_vec()).collect();
        Ok(self.model.predict(rows)?)
    }
}
