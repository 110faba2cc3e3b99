//! The read-only database contract the backtest engine queries against.
//! This is the same batch-oriented [`RaceDatabase`] contract the ticket
//! simulators use (§6), so both subsystems can be driven off one concrete
//! SQL-backed implementation without duplicating the trait.

pub use shutuba_predict::repository::RaceDatabase;
