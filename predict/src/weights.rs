//! The fixed factor-weight table consumed by the aggregator.

use crate::domain::FactorName;

/// Per-factor weight, summing to 1.0 within a small tolerance. Values are a
/// house configuration, not derived from the source corpus.
#[derive(Debug, Clone, Copy)]
pub struct FactorWeights {
    pub past_results: f64,
    pub course_fit: f64,
    pub time_index: f64,
    pub last_3f: f64,
    pub popularity: f64,
    pub pedigree: f64,
    pub running_style: f64,
}

pub const WEIGHT_SUM_TOLERANCE: f64 = 0.001;

impl Default for FactorWeights {
    fn default() -> Self {
        Self {
            past_results: 0.20,
            course_fit: 0.15,
            time_index: 0.15,
            last_3f: 0.15,
            popularity: 0.10,
            pedigree: 0.10,
            running_style: 0.15,
        }
    }
}

impl FactorWeights {
    pub fn get(&self, name: FactorName) -> f64 {
        match name {
            FactorName::PastResults => self.past_results,
            FactorName::CourseFit => self.course_fit,
            FactorName::TimeIndex => self.time_index,
            FactorName::Last3f => self.last_3f,
            FactorName::Popularity => self.popularity,
            FactorName::Pedigree => self.pedigree,
            FactorName::RunningStyle => self.running_style,
        }
    }

    pub fn sum(&self) -> f64 {
        FactorName::ALL.iter().map(|&name| self.get(name)).sum()
    }

    pub fn is_normalized(&self) -> bool {
        (self.sum() - 1.0).abs() <= WEIGHT_SUM_TOLERANCE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_weights_sum_to_one() {
        assert!(FactorWeights::default().is_normalized());
    }
}
