//! Global spacing between external calls.

use std::time::Duration;

use tokio::time::{sleep_until, Instant};

/// Enforces a minimum gap between consecutive external calls
#[derive(Debug)]
pub struct RateLimiter {
    min_interval: Duration,
    last_call: Option<Instant>,
}

impl RateLimiter {
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            last_call: None,
        }
    }

    pub fn min_interval(&self) -> Duration {
        self.min_interval
    }

    /// How long the next call would wait right now
    pub fn wait_time(&self, now: Instant) -> Duration {
        self.last_call
            .map(|last| (last + self.min_interval).saturating_duration_since(now))
            .unwrap_or(Duration::ZERO)
    }

    /// Waits until `last_call + min_interval`, then marks a new call
    pub async fn acquire(&mut self) {
        if let Some(last) = self.last_call {
            let ready_at = last + self.min_interval;
            if ready_at > Instant::now() {
                tracing::debug!("Rate limited, waiting {:?}", ready_at - Instant::now());
                sleep_until(ready_at).await;
            }
        }
        self.last_call = Some(Instant::now());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_calls_are_spaced() {
        let mut limiter = RateLimiter::new(Duration::from_millis(1_000));
        let start = Instant::now();

        limiter.acquire().await;
        assert_eq!(start.elapsed(), Duration::ZERO);

        limiter.acquire().await;
        assert!(start.elapsed() >= Duration::from_millis(1_000));

        limiter.acquire().await;
        assert!(start.elapsed() >= Duration::from_millis(2_000));
    }

    #[tokio::test(start_paused = true)]
    async fn test_idle_gap_means_no_wait() {
        let mut limiter = RateLimiter::new(Duration::from_millis(500));
        limiter.acquire().await;
        tokio::time::advance(Duration::from_millis(800)).await;

        assert_eq!(limiter.wait_time(Instant::now()), Duration::ZERO);
        let before = Instant::now();
        limiter.acquire().await;
        assert_eq!(before.elapsed(), Duration::ZERO);
    }
}
