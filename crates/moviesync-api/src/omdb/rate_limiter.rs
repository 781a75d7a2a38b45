//! OMDb API request pacing.

use std::time::{Duration, Instant};

/// Default minimum interval between requests.
const DEFAULT_MIN_INTERVAL: Duration = Duration::from_millis(100);

/// Spaces consecutive requests at least `min_interval` apart.
///
/// OMDb publishes no per-second limit, only a daily quota per key, so this
/// keeps bulk runs (`fill --all-partial`) from bursting.
#[derive(Debug)]
#[allow(clippy::module_name_repetitions)]
pub struct OmdbRateLimiter {
    /// Minimum interval between requests. `Duration::ZERO` disables pacing.
    min_interval: Duration,
    /// When the previous request was released.
    last_request: Option<Instant>,
}

impl OmdbRateLimiter {
    /// Creates a limiter with the given minimum interval.
    pub(crate) const fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            last_request: None,
        }
    }

    /// Creates a limiter with the default interval (100ms).
    pub(crate) const fn default_interval() -> Self {
        Self::new(DEFAULT_MIN_INTERVAL)
    }

    /// Sleeps until the next request may be sent, then records it.
    pub async fn wait(&mut self) {
        if let Some(last) = self.last_request {
            let remaining = self.min_interval.saturating_sub(last.elapsed());
            if !remaining.is_zero() {
                tokio::time::sleep(remaining).await;
            }
        }

        self.last_request = Some(Instant::now());
    }
}
