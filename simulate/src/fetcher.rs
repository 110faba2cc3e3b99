//! The `PayoutFetcher` capability (§6): the only scraper touch point the
//! core depends on. The actual HTML scraping of individual payout pages is
//! out of scope — this module owns only what IS in scope around it: the
//! shared rate limiter (§5, "single instance per simulator... a global
//! minimum inter-request interval") and the retry/backoff policy on
//! transient HTTP failures, wrapped as a decorator around any concrete
//! [`PayoutFetcher`] implementation.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use governor::{DefaultDirectRateLimiter, Quota, RateLimiter as GovernorRateLimiter};
use thiserror::Error;

use shutuba_predict::race_id::RaceId;

/// Default per-simulator HTTP timeout (§5).
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Default global pacing floor between requests (§6 `request_delay`).
pub const DEFAULT_REQUEST_DELAY_SECONDS: f64 = 1.0;

const BACKOFF_DELAYS: [Duration; 3] =
    [Duration::from_secs(5), Duration::from_secs(10), Duration::from_secs(30)];

#[derive(Debug, Error, Clone)]
pub enum FetchError {
    #[error("network error fetching payout for {race_id} (status {status:?}): {message}")]
    Network { race_id: RaceId, status: Option<u16>, message: String },

    #[error("failed to parse payout response for {race_id}: {message}")]
    Parse { race_id: RaceId, message: String },

    #[error("{race_id} is not yet settled")]
    NotYetSettled { race_id: RaceId },

    #[error("retries exhausted fetching payout for {race_id} after {attempts} attempts")]
    RetryExhausted { race_id: RaceId, attempts: usize },
}

impl FetchError {
    /// HTTP 403/429/503 are transient rate-limiting/availability signals
    /// worth retrying with backoff; everything else (parse failures,
    /// not-yet-settled) is terminal on the first attempt.
    fn is_retryable(&self) -> bool {
        matches!(self, FetchError::Network { status: Some(403 | 429 | 503), .. })
    }

    pub fn race_id(&self) -> &RaceId {
        match self {
            FetchError::Network { race_id, .. }
            | FetchError::Parse { race_id, .. }
            | FetchError::NotYetSettled { race_id }
            | FetchError::RetryExhausted { race_id, .. } => race_id,
        }
    }
}

/// The four settlement lookups a ticket simulator needs, expressed as one
/// capability interface rather than four free functions, so a rate-limited
/// decorator or an in-memory test double can substitute for the real
/// HTML-backed scraper without inheritance.
#[async_trait]
pub trait PayoutFetcher: Send + Sync {
    async fn fetch_place_payouts(&self, race_id: &RaceId) -> Result<Vec<(u8, u32)>, FetchError>;

    async fn fetch_win_payout(&self, race_id: &RaceId) -> Result<Option<(u8, u32)>, FetchError>;

    async fn fetch_quinella_payout(&self, race_id: &RaceId) -> Result<Option<((u8, u8), u32)>, FetchError>;

    async fn fetch_trio_payout(&self, race_id: &RaceId) -> Result<Option<((u8, u8, u8), u32)>, FetchError>;
}

/// An explicit pacing clock shared across every fetcher instance that's
/// meant to share one "one request in flight at a time" cadence — a value
/// passed into `Fetcher(RateLimiter)` once and reused, rather than
/// process-global mutable state (§9 design note). Cheap to clone: the
/// underlying governor limiter is reference-counted.
#[derive(Clone)]
pub struct RateLimiter {
    inner: Arc<DefaultDirectRateLimiter>,
}

impl RateLimiter {
    /// `min_interval` is the floor between consecutive requests, process-wide
    /// for every fetcher sharing this limiter (`request_delay` in §6).
    pub fn new(min_interval: Duration) -> Self {
        let quota = Quota::with_period(min_interval).unwrap_or_else(|| Quota::per_second(std::num::NonZeroU32::new(1).unwrap()));
        Self { inner: Arc::new(GovernorRateLimiter::direct(quota)) }
    }

    pub async fn until_ready(&self) {
        self.inner.until_ready().await;
    }
}

/// Wraps any [`PayoutFetcher`] with the global pacing floor and the fixed
/// backoff schedule [5s, 10s, 30s] on HTTP 403/429/503, up to 3 retries
/// (§5). The pacing clock advances on every attempt, including failed ones,
/// so a burst of retries doesn't let pacing catch up and fire back-to-back.
pub struct RateLimitedFetcher<F> {
    inner: F,
    rate_limiter: RateLimiter,
}

impl<F: PayoutFetcher> RateLimitedFetcher<F> {
    pub fn new(inner: F, rate_limiter: RateLimiter) -> Self {
        Self { inner, rate_limiter }
    }

    async fn paced<T, Fut>(&self, race_id: &RaceId, mut call: impl FnMut() -> Fut) -> Result<T, FetchError>
    where
        Fut: std::future::Future<Output = Result<T, FetchError>>,
    {
        let mut attempt = 0usize;
        loop {
            self.rate_limiter.until_ready().await;
            match call().await {
                Ok(value) => return Ok(value),
                Err(err) if err.is_retryable() && attempt < BACKOFF_DELAYS.len() => {
                    tracing::warn!(race_id = %race_id, attempt, error = %err, "retrying payout fetch after backoff");
                    tokio::time::sleep(BACKOFF_DELAYS[attempt]).await;
                    attempt += 1;
                }
                Err(err) if err.is_retryable() => {
                    return Err(FetchError::RetryExhausted { race_id: race_id.clone(), attempts: attempt });
                }
                Err(err) => return Err(err),
            }
        }
    }
}

#[async_trait]
impl<F: PayoutFetcher> PayoutFetcher for RateLimitedFetcher<F> {
    async fn fetch_place_payouts(&self, race_id: &RaceId) -> Result<Vec<(u8, u32)>, FetchError> {
        self.paced(race_id, || self.inner.fetch_place_payouts(race_id)).await
    }

    async fn fetch_win_payout(&self, race_id: &RaceId) -> Result<Option<(u8, u32)>, FetchError> {
        self.paced(race_id, || self.inner.fetch_win_payout(race_id)).await
    }

    async fn fetch_quinella_payout(&self, race_id: &RaceId) -> Result<Option<((u8, u8), u32)>, FetchError> {
        self.paced(race_id, || self.inner.fetch_quinella_payout(race_id)).await
    }

    async fn fetch_trio_payout(&self, race_id: &RaceId) -> Result<Option<((u8, u8, u8), u32)>, FetchError> {
        self.paced(race_id, || self.inner.fetch_trio_payout(race_id)).await
    }
}
