//! Shared primitives for the shutuba workspace: a dense matrix for feature and
//! price data, JSON/bincode file helpers for model artifacts, the
//! leak-free-query assertion reused by the past-results repository and the
//! backtest engine, and a timing helper for retraining telemetry.

#![allow(clippy::too_many_arguments)]

pub mod file;
pub mod leak;
pub mod linear;
pub mod timed;
