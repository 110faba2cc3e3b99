#![allow(clippy::too_many_arguments)]

//! The prediction core: race/horse domain types, the seven factor
//! calculators, the weighted aggregator, the leakage-safe feature builder and
//! the gradient-boosted probability model, wired together by a prediction
//! service.

pub mod race_id;
pub mod domain;
pub mod repository;
pub mod reconstruction;
pub mod pedigree;
pub mod weights;
pub mod factors;
pub mod aggregator;
pub mod features;
pub mod model;
pub mod service;

pub use reconstruction::reconstruct_shutuba;
