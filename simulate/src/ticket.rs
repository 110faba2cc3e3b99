//! Shared summary shape for every ticket variant (§4.J): per-race records
//! roll up into one totals structure regardless of which ticket type
//! produced them, since the monetary identities (`total_investment`,
//! `return_rate`) hold the same way for all four.

use shutuba_predict::race_id::RaceId;

/// One race's outcome for a single ticket type. `payout` is `0` both when
/// the ticket missed and when the payout lookup failed or the race was
/// skipped for missing data (§4.J) — `hit` is the only field that
/// distinguishes those cases, since hit/miss is always derived from the
/// settled [`shutuba_predict::domain::RaceResult`] rows, independent of
/// whether the payout fetch itself succeeded.
#[derive(Debug, Clone, PartialEq)]
pub struct TicketRaceRecord {
    pub race_id: RaceId,
    pub hit: bool,
    pub investment: u32,
    pub payout: u32,
}

impl TicketRaceRecord {
    pub fn profit(&self) -> i64 {
        self.payout as i64 - self.investment as i64
    }
}

/// Totals and rates across a run of races for one ticket type.
#[derive(Debug, Clone, PartialEq)]
pub struct Summary {
    pub races_evaluated: usize,
    pub hits: usize,
    pub total_investment: u64,
    pub total_payout: u64,
}

impl Summary {
    pub fn hit_rate(&self) -> f64 {
        if self.races_evaluated == 0 {
            0.0
        } else {
            self.hits as f64 / self.races_evaluated as f64
        }
    }

    /// `total_payout / total_investment`, `0.0` when nothing was invested so
    /// a race window with zero qualifying bets never divides by zero.
    pub fn return_rate(&self) -> f64 {
        if self.total_investment == 0 {
            0.0
        } else {
            self.total_payout as f64 / self.total_investment as f64
        }
    }

    pub fn profit(&self) -> i64 {
        self.total_payout as i64 - self.total_investment as i64
    }
}

/// Folds a run's [`TicketRaceRecord`]s into one [`Summary`]. The monetary
/// identity `total_investment = sum(race.investment)` holds by construction
/// here rather than being asserted after the fact.
pub fn summarize(records: &[TicketRaceRecord]) -> Summary {
    let mut summary = Summary {
        races_evaluated: records.len(),
        hits: 0,
        total_investment: 0,
        total_payout: 0,
    };
    for record in records {
        if record.hit {
            summary.hits += 1;
        }
        summary.total_investment += record.investment as u64;
        summary.total_payout += record.payout as u64;
    }
    summary
}

#[cfg(test)]
mod tests {
    use super::*;

    fn race_id(n: &str) -> RaceId {
        RaceId::parse(n).unwrap()
    }

    #[test]
    fn summary_identities_hold_over_mixed_records() {
        let records = vec![
            TicketRaceRecord { race_id: race_id("202506010801"), hit: true, investment: 100, payout: 350 },
            TicketRaceRecord { race_id: race_id("202506010802"), hit: false, investment: 100, payout: 0 },
            TicketRaceRecord { race_id: race_id("202506010803"), hit: true, investment: 200, payout: 0 },
        ];
        let summary = summarize(&records);
        assert_eq!(3, summary.races_evaluated);
        assert_eq!(2, summary.hits);
        assert_eq!(400, summary.total_investment);
        assert_eq!(350, summary.total_payout);
        assert!((summary.return_rate() - 0.875).abs() < 1e-9);
        assert!((summary.hit_rate() - (2.0 / 3.0)).abs() < 1e-9);
    }

    #[test]
    fn zero_investment_return_rate_is_zero() {
        let summary = summarize(&[]);
        assert_eq!(0.0, summary.return_rate());
        assert_eq!(0.0, summary.hit_rate());
    }
}
