//! The no-leakage assertion shared by every query boundary that promises
//! leak-free history: a row dated on or after the cutoff must never reach a
//! caller. This is a programmer-error check, not a recoverable outcome, so it
//! fails loudly rather than degrading like a factor calculator would.

use chrono::NaiveDate;
use thiserror::Error;

#[derive(Debug, Error)]
#[error("data leak: row dated {row_date} is not strictly before cutoff {cutoff}")]
pub struct DataLeak {
    pub row_date: NaiveDate,
    pub cutoff: NaiveDate,
}

#[derive(Debug, Clone, Copy)]
pub struct NoLeakAssertion {
    pub cutoff: NaiveDate,
}

impl NoLeakAssertion {
    pub fn check(&self, row_date: NaiveDate) -> Result<(), DataLeak> {
        if row_date < self.cutoff {
            Ok(())
        } else {
            Err(DataLeak {
                row_date,
                cutoff: self.cutoff,
            })
        }
    }

    pub fn check_all<'a>(
        &self,
        row_dates: impl IntoIterator<Item = &'a NaiveDate>,
    ) -> Result<(), DataLeak> {
        for &row_date in row_dates {
            self.check(row_date)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn strictly_before_cutoff_passes() {
        let assertion = NoLeakAssertion {
            cutoff: date(2025, 6, 1),
        };
        assertion.check(date(2025, 5, 31)).unwrap();
    }

    #[test]
    fn same_day_as_cutoff_fails() {
        let assertion = NoLeakAssertion {
            cutoff: date(2025, 6, 1),
        };
        let err = assertion.check(date(2025, 6, 1)).unwrap_err();
        assert_eq!(date(2025, 6, 1), err.row_date);
        assert_eq!(date(2025, 6, 1), err.cutoff);
    }

    #[test]
    fn after_cutoff_fails() {
        let assertion = NoLeakAssertion {
            cutoff: date(2025, 6, 1),
        };
        assert!(assertion.check(date(2025, 6, 2)).is_err());
    }

    #[test]
    fn check_all_stops_at_first_leak() {
        let assertion = NoLeakAssertion {
            cutoff: date(2025, 6, 1),
        };
        let dates = [date(2025, 5, 1), date(2025, 5, 20), date(2025, 6, 1)];
        let err = assertion.check_all(dates.iter()).unwrap_err();
        assert_eq!(date(2025, 6, 1), err.row_date);
    }
}
