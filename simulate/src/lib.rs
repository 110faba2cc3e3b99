#![allow(clippy::too_many_arguments)]

//! The ticket simulator framework: a templated base simulator that reuses a
//! single rate-limited payout fetcher across four ticket variants (place,
//! win, quinella, trio), each with its own selection, settlement and
//! summary rules.

pub mod fetcher;
pub mod ticket;
pub mod base;
pub mod simulators;
pub mod reporter;

pub use base::{simulate_period, BaseSimulator, TicketSimulator};
pub use fetcher::{FetchError, PayoutFetcher, RateLimitedFetcher, RateLimiter};
