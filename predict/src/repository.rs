//! Storage abstraction for a horse's prior race history.
//!
//! Every caller — factor calculators during live prediction, the walk-forward
//! backtest engine during training — goes through this one narrow interface,
//! never a raw query, so the leak-free cutoff is enforced in exactly one
//! place regardless of backend.

use anyhow::Result;
use async_trait::async_trait;
use chrono::NaiveDate;
use rustc_hash::FxHashMap;

use crate::domain::{Horse, PastResultRecord, Race, RaceResult};
use crate::race_id::RaceId;

/// Default cap on how many past results a single lookup returns, most-recent
/// first. Factor calculators only ever look at a handful of recent starts;
/// a bounded limit keeps a single query O(1) regardless of a horse's career
/// length.
pub const DEFAULT_PAST_RESULTS_LIMIT: usize = 20;

/// Read-only access to a horse's past results, strictly before a cutoff date.
#[async_trait]
pub trait PastResultsRepository: Send + Sync {
    /// Returns up to `limit` results for `horse_id` dated strictly before
    /// `before_date`, ordered race date descending then race number
    /// descending (most recent start first).
    async fn get_past_results(
        &self,
        horse_id: &str,
        before_date: NaiveDate,
        limit: usize,
    ) -> Result<Vec<PastResultRecord>>;
}

/// Read-only access to horse master data (sire line, dam-sire line, ...),
/// kept separate from past-results lookups since the pedigree factor needs
/// the current horse's own lineage, not its race history.
#[async_trait]
pub trait HorseRepository: Send + Sync {
    async fn get_horse(&self, horse_id: &str) -> Result<Option<Horse>>;
}

/// The broader, batch-oriented read contract behind both the walk-forward
/// backtest engine and the ticket simulators (§6). Unlike
/// [`PastResultsRepository`], every lookup here is shaped to avoid an N+1
/// query storm when scoring a whole race field or scanning a date window —
/// callers that only need one horse's history at a time should prefer the
/// narrower repositories above.
#[async_trait]
pub trait RaceDatabase: Send + Sync {
    async fn fetch_race(&self, race_id: &RaceId) -> Result<Option<Race>>;

    async fn fetch_race_results(&self, race_id: &RaceId) -> Result<Vec<RaceResult>>;

    /// One round-trip for every horse in `horse_ids`, each capped at
    /// `per_horse_limit` rows strictly before `before_date`.
    async fn fetch_past_results_batch(
        &self,
        horse_ids: &[String],
        before_date: NaiveDate,
        per_horse_limit: usize,
    ) -> Result<FxHashMap<String, Vec<PastResultRecord>>>;

    async fn fetch_horses_batch(&self, horse_ids: &[String]) -> Result<FxHashMap<String, Horse>>;

    /// Races in `[from_date, to_date]`, ascending by date then race number,
    /// optionally restricted to `venues`.
    async fn fetch_races_in_window(
        &self,
        from_date: NaiveDate,
        to_date: NaiveDate,
        venues: Option<&[String]>,
    ) -> Result<Vec<Race>>;
}
