//! Fixed constants shared across the engine.

/// A race must have at least this many labeled training samples available
/// before its date for retraining to move past `NeedsRetrain`.
pub const MIN_TRAINING_SAMPLES: usize = 100;

/// Per-horse cap on past results fetched for factor computation.
pub const MAX_PAST_RESULTS_PER_HORSE: usize = 20;

/// Placeholder finish position for a result that hasn't been recorded yet.
/// Used only to sort DNF/unsettled rows to the back; it must never reach a
/// training label or a feature slot.
pub const DEFAULT_FINISH_POSITION: u8 = 99;
