//! Consecutive-failure tracking for the external service.
//!
//! Failures are counted inside a trailing window. Crossing the threshold
//! queues one [`FailureNotice`]; further notices are held back until the
//! window starts over.

use std::collections::VecDeque;
use std::time::Duration;

use tokio::time::Instant;

const NOTICE_CAPACITY: usize = 16;

/// Raised when the service keeps failing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailureNotice {
    pub consecutive_failures: u32,
    pub window: Duration,
    pub last_error: String,
}

#[derive(Debug)]
pub struct ErrorTracker {
    window: Duration,
    threshold: u32,
    consecutive: u32,
    window_start: Option<Instant>,
    notified: bool,
    notices: VecDeque<FailureNotice>,
}

impl ErrorTracker {
    pub fn new(window: Duration, threshold: u32) -> Self {
        Self {
            window,
            threshold,
            consecutive: 0,
            window_start: None,
            notified: false,
            notices: VecDeque::new(),
        }
    }

    pub fn consecutive_failures(&self) -> u32 {
        self.consecutive
    }

    pub fn record_failure(&mut self, now: Instant, error: &str) {
        let expired = self
            .window_start
            .map_or(true, |start| now.saturating_duration_since(start) > self.window);
        if expired {
            self.window_start = Some(now);
            self.consecutive = 0;
            self.notified = false;
        }
        self.consecutive += 1;

        if self.consecutive > self.threshold && !self.notified {
            self.notified = true;
            tracing::info!(
                "LLM service failed {} times in a row, using local decisions",
                self.consecutive
            );
            while self.notices.len() >= NOTICE_CAPACITY {
                self.notices.pop_front();
            }
            self.notices.push_back(FailureNotice {
                consecutive_failures: self.consecutive,
                window: self.window,
                last_error: error.to_string(),
            });
        }
    }

    pub fn record_success(&mut self) {
        self.consecutive = 0;
        self.window_start = None;
        self.notified = false;
    }

    /// Drains queued notices
    pub fn take_notices(&mut self) -> Vec<FailureNotice> {
        self.notices.drain(..).collect()
    }
}
