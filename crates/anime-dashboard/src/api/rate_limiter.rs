//! Request throttling for the Jikan API.
//!
//! Enforces a minimum spacing between permitted requests, plus an optional
//! sliding per-minute ceiling. One limiter is shared by every endpoint.

use shared::config::RateLimitConfig;
use std::collections::VecDeque;
use std::time::Duration;
use tokio::time::{sleep, Instant};

const WINDOW: Duration = Duration::from_secs(60);

/// Rate limiter with a fixed minimum interval and a per-minute window
#[derive(Debug)]
pub struct RateLimiter {
    /// Minimum spacing between two permitted requests
    min_interval: Duration,
    /// Maximum requests per minute (0 = no window)
    max_per_minute: u32,
    /// Last permitted request
    last_request: Option<Instant>,
    /// Permitted requests in the last minute, oldest first
    recent_requests: VecDeque<Instant>,
}

impl RateLimiter {
    /// Create a new rate limiter
    pub fn new(min_interval: Duration, max_per_minute: u32) -> Self {
        Self {
            min_interval,
            max_per_minute,
            last_request: None,
            recent_requests: VecDeque::with_capacity(max_per_minute as usize),
        }
    }

    pub fn from_config(config: &RateLimitConfig) -> Self {
        Self::new(
            Duration::from_millis(config.min_interval_ms),
            config.requests_per_minute,
        )
    }

    pub fn min_interval(&self) -> Duration {
        self.min_interval
    }

    /// Wait until a request may proceed, then record it as permitted
    pub async fn acquire(&mut self) {
        // Per-minute window
        if self.max_per_minute > 0 {
            self.prune(Instant::now());
            if self.recent_requests.len() >= self.max_per_minute as usize {
                if let Some(&oldest) = self.recent_requests.front() {
                    let wait_time = WINDOW.saturating_sub(Instant::now().duration_since(oldest));
                    if !wait_time.is_zero() {
                        tracing::debug!(
                            wait_ms = wait_time.as_millis(),
                            "Rate limit: waiting for per-minute limit"
                        );
                        sleep(wait_time).await;
                    }
                }
                self.prune(Instant::now());
            }
        }

        // Minimum spacing since the previous permitted request
        if let Some(last) = self.last_request {
            let elapsed = Instant::now().duration_since(last);
            if elapsed < self.min_interval {
                let wait_time = self.min_interval - elapsed;
                tracing::debug!(
                    wait_ms = wait_time.as_millis(),
                    "Rate limit: waiting for minimum interval"
                );
                sleep(wait_time).await;
            }
        }

        let request_time = Instant::now();
        self.last_request = Some(request_time);
        if self.max_per_minute > 0 {
            self.recent_requests.push_back(request_time);
        }
    }

    /// Get the current number of requests in the last minute
    pub fn current_minute_count(&mut self) -> usize {
        self.prune(Instant::now());
        self.recent_requests.len()
    }

    fn prune(&mut self, now: Instant) {
        while let Some(&oldest) = self.recent_requests.front() {
            if now.duration_since(oldest) < WINDOW {
                break;
            }
            self.recent_requests.pop_front();
        }
    }
}
