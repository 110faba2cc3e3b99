//! Retraining cadence: the date-floor at which a retraining round becomes
//! eligible.

use chrono::{Datelike, Duration, NaiveDate, Weekday};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetrainCadence {
    Daily,
    Weekly,
    Monthly,
}

impl RetrainCadence {
    /// The cadence bucket `date` falls into. Two dates with the same floor
    /// are considered "within the same cadence window" — a retraining round
    /// already covering one covers the other too.
    pub fn floor_date(&self, date: NaiveDate) -> NaiveDate {
        match self {
            RetrainCadence::Daily => date,
            RetrainCadence::Weekly => {
                let days_since_monday = date.weekday().num_days_from_monday() as i64;
                date - Duration::days(days_since_monday)
            }
            RetrainCadence::Monthly => {
                NaiveDate::from_ymd_opt(date.year(), date.month(), 1).expect("valid year/month")
            }
        }
    }

    /// Whether the cadence has elapsed between the date of the last
    /// training round and the date of the race under consideration.
    pub fn has_elapsed(&self, last_trained: Option<NaiveDate>, current_race_date: NaiveDate) -> bool {
        match last_trained {
            None => true,
            Some(last_trained) => self.floor_date(last_trained) != self.floor_date(current_race_date),
        }
    }
}
