//! The per-window retraining state machine.

use chrono::NaiveDate;

use crate::cadence::RetrainCadence;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrainingState {
    /// No model has been trained yet, or the cadence has elapsed and a
    /// retraining attempt is due before the next race can be scored.
    NeedsRetrain,
    /// A model trained on sufficient data is current for this cadence window.
    Ready,
    /// The cadence elapsed but too few training samples were available;
    /// inference proceeds using factor scores only.
    Degraded,
}

/// What the engine should do before scoring the next race.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetrainDecision {
    pub state: TrainingState,
    pub should_attempt_retrain: bool,
}

pub struct RetrainTracker {
    cadence: RetrainCadence,
    min_training_samples: usize,
    last_attempt_date: Option<NaiveDate>,
    state: TrainingState,
}

impl RetrainTracker {
    pub fn new(cadence: RetrainCadence, min_training_samples: usize) -> Self {
        Self {
            cadence,
            min_training_samples,
            last_attempt_date: None,
            state: TrainingState::NeedsRetrain,
        }
    }

    /// Called once per race, before scoring it. `available_samples` is the
    /// count of labeled training rows strictly before `current_race_date`.
    pub fn evaluate(&mut self, current_race_date: NaiveDate, available_samples: usize) -> RetrainDecision {
        if !self.cadence.has_elapsed(self.last_attempt_date, current_race_date) {
            return RetrainDecision { state: self.state, should_attempt_retrain: false };
        }

        self.last_attempt_date = Some(current_race_date);
        self.state = if available_samples >= self.min_training_samples {
            TrainingState::Ready
        } else {
            TrainingState::Degraded
        };
        RetrainDecision { state: self.state, should_attempt_retrain: true }
    }

    pub fn current_state(&self) -> TrainingState {
        self.state
    }

    /// Pure check, used to decide whether the (possibly expensive) training
    /// sample count even needs gathering before calling [`Self::evaluate`].
    pub fn cadence_elapsed(&self, current_race_date: NaiveDate) -> bool {
        self.cadence.has_elapsed(self.last_attempt_date, current_race_date)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_race_always_attempts_retrain() {
        let mut tracker = RetrainTracker::new(RetrainCadence::Weekly, 100);
        let date = NaiveDate::from_ymd_opt(2025, 10, 22).unwrap();
        let decision = tracker.evaluate(date, 150);
        assert!(decision.should_attempt_retrain);
        assert_eq!(TrainingState::Ready, decision.state);
    }

    #[test]
    fn insufficient_samples_degrades() {
        let mut tracker = RetrainTracker::new(RetrainCadence::Daily, 100);
        let date = NaiveDate::from_ymd_opt(2025, 10, 22).unwrap();
        let decision = tracker.evaluate(date, 10);
        assert_eq!(TrainingState::Degraded, decision.state);
    }

    #[test]
    fn subsequent_race_within_cadence_does_not_retrain() {
        let mut tracker = RetrainTracker::new(RetrainCadence::Weekly, 100);
        let monday = NaiveDate::from_ymd_opt(2025, 10, 20).unwrap();
        let wednesday = NaiveDate::from_ymd_opt(2025, 10, 22).unwrap();
        tracker.evaluate(monday, 150);
        let decision = tracker.evaluate(wednesday, 150);
        assert!(!decision.should_attempt_retrain);
        assert_eq!(TrainingState::Ready, decision.state);
    }

    #[test]
    fn next_cadence_window_retrains_again() {
        let mut tracker = RetrainTracker::new(RetrainCadence::Weekly, 100);
        let monday = NaiveDate::from_ymd_opt(2025, 10, 20).unwrap();
        let next_monday = NaiveDate::from_ymd_opt(2025, 10, 27).unwrap();
        tracker.evaluate(monday, 150);
        let decision = tracker.evaluate(next_monday, 150);
        assert!(decision.should_attempt_retrain);
    }
}
