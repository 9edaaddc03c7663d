// In-memory per-requester rate limiter for command endpoints.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

/// Error returned when a rate limit is exceeded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateLimitError {
    pub max: usize,
    pub window: Duration,
}

impl std::fmt::Display for RateLimitError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Rate limit exceeded: max {} commands per {} seconds",
            self.max,
            self.window.as_secs()
        )
    }
}

/// Thread-safe sliding-window rate limiter keyed by requester.
#[derive(Debug, Clone)]
pub struct RateLimiter {
    inner: Arc<Mutex<HashMap<String, Vec<Instant>>>>,
    max: usize,
    window: Duration,
}

impl RateLimiter {
    pub fn new(max: usize, window: Duration) -> Self {
        Self {
            inner: Arc::new(Mutex::new(HashMap::new())),
            max,
            window,
        }
    }

    /// Limiter allowing `max` commands per minute. Zero disables limiting.
    pub fn per_minute(max: usize) -> Self {
        Self::new(max, Duration::from_secs(60))
    }

    /// Check if the requester is within the limit.
    /// If within limits, records the event and returns Ok(()).
    pub fn check_limit(&self, requester: &str) -> Result<(), RateLimitError> {
        if self.max == 0 {
            return Ok(());
        }
        let mut map = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        let now = Instant::now();
        let entries = map.entry(requester.to_string()).or_default();

        // Remove expired entries
        entries.retain(|t| now.duration_since(*t) < self.window);

        if entries.len() >= self.max {
            return Err(RateLimitError {
                max: self.max,
                window: self.window,
            });
        }

        entries.push(now);
        Ok(())
    }

    /// Get the current count for a requester (for testing/diagnostics).
    pub fn current_count(&self, requester: &str) -> usize {
        let mut map = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        let now = Instant::now();

        if let Some(entries) = map.get_mut(requester) {
            entries.retain(|t| now.duration_since(*t) < self.window);
            entries.len()
        } else {
            0
        }
    }
}
