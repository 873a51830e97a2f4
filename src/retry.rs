//! Retry backoff policy.
//!
//! The transport executor decides *whether* to retry from
//! [`EdgenError::is_retryable`](crate::error::EdgenError::is_retryable); this
//! module decides *how long to wait* before the next attempt: exponential
//! backoff with bounded jitter, floored by any `Retry-After` hint the server
//! sent.

use std::time::Duration;

use rand::Rng;
use reqwest::header::HeaderMap;

/// Backoff configuration for retried attempts.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Delay before the first retry.
    pub initial_delay: Duration,
    /// Ceiling for the computed backoff (a `Retry-After` hint may exceed it).
    pub max_delay: Duration,
    /// Backoff multiplier per attempt (exponential schedule).
    pub backoff_multiplier: f64,
    /// Whether to add jitter to delays.
    pub use_jitter: bool,
    /// Maximum jitter fraction (0.0 to 1.0). Must stay below 0.5 so the
    /// schedule remains non-decreasing across attempts.
    pub jitter_factor: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            initial_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(8),
            backoff_multiplier: 2.0,
            use_jitter: true,
            jitter_factor: 0.25,
        }
    }
}

impl RetryPolicy {
    /// Create a new retry policy with the default schedule.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the initial delay.
    pub const fn with_initial_delay(mut self, delay: Duration) -> Self {
        self.initial_delay = delay;
        self
    }

    /// Set the maximum delay.
    pub const fn with_max_delay(mut self, delay: Duration) -> Self {
        self.max_delay = delay;
        self
    }

    /// Set the backoff multiplier.
    pub const fn with_backoff_multiplier(mut self, multiplier: f64) -> Self {
        self.backoff_multiplier = multiplier;
        self
    }

    /// Enable or disable jitter.
    pub const fn with_jitter(mut self, use_jitter: bool) -> Self {
        self.use_jitter = use_jitter;
        self
    }

    /// Set the jitter factor, clamped to `[0.0, 0.5)`.
    pub fn with_jitter_factor(mut self, factor: f64) -> Self {
        self.jitter_factor = factor.clamp(0.0, 0.499);
        self
    }

    /// The unjittered backoff for a given attempt (0-based), clamped to
    /// `max_delay`.
    pub fn base_delay(&self, attempt: u32) -> Duration {
        let millis =
            self.initial_delay.as_millis() as f64 * self.backoff_multiplier.powi(attempt as i32);
        Duration::from_millis(millis as u64).min(self.max_delay)
    }

    /// The delay to sleep before re-issuing attempt `attempt + 1`.
    ///
    /// Jitter is applied to the exponential schedule; a server-provided
    /// `Retry-After` hint acts as a floor on the result.
    pub fn delay_for(&self, attempt: u32, retry_after: Option<Duration>) -> Duration {
        let mut delay = self.base_delay(attempt);
        if self.use_jitter {
            delay = self.add_jitter(delay);
        }
        match retry_after {
            Some(hint) => delay.max(hint),
            None => delay,
        }
    }

    fn add_jitter(&self, delay: Duration) -> Duration {
        let mut rng = rand::thread_rng();
        let jitter_range = delay.as_millis() as f64 * self.jitter_factor;
        let jitter = rng.gen_range(-jitter_range..=jitter_range);
        let millis = delay.as_millis() as f64 + jitter;
        Duration::from_millis(millis.max(0.0) as u64)
    }
}

/// Parse the server's retry hint from response headers.
///
/// `retry-after-ms` (milliseconds) takes precedence over `retry-after`
/// (integer seconds). HTTP-date forms of `Retry-After` are ignored.
pub(crate) fn retry_after_hint(headers: &HeaderMap) -> Option<Duration> {
    if let Some(ms) = header_u64(headers, "retry-after-ms") {
        return Some(Duration::from_millis(ms));
    }
    header_u64(headers, "retry-after").map(Duration::from_secs)
}

fn header_u64(headers: &HeaderMap, name: &str) -> Option<u64> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.trim().parse::<u64>().ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::HeaderValue;

    #[test]
    fn base_delay_doubles_and_clamps() {
        let policy = RetryPolicy::new()
            .with_initial_delay(Duration::from_millis(100))
            .with_max_delay(Duration::from_millis(350))
            .with_jitter(false);

        assert_eq!(policy.base_delay(0), Duration::from_millis(100));
        assert_eq!(policy.base_delay(1), Duration::from_millis(200));
        // 400ms clamps to the 350ms ceiling.
        assert_eq!(policy.base_delay(2), Duration::from_millis(350));
        assert_eq!(policy.base_delay(5), Duration::from_millis(350));
    }

    #[test]
    fn jittered_delays_stay_non_decreasing_across_attempts() {
        let policy = RetryPolicy::default();
        for attempt in 1..4u32 {
            for _ in 0..50 {
                let delay = policy.delay_for(attempt, None);
                // With jitter_factor < 0.5, attempt n's worst case still
                // exceeds attempt n-1's unjittered schedule.
                assert!(delay >= policy.base_delay(attempt - 1));
            }
        }
    }

    #[test]
    fn jitter_stays_within_bounds() {
        let policy = RetryPolicy::new()
            .with_initial_delay(Duration::from_millis(1000))
            .with_jitter_factor(0.25);
        for _ in 0..100 {
            let delay = policy.delay_for(0, None);
            assert!(delay >= Duration::from_millis(750));
            assert!(delay <= Duration::from_millis(1250));
        }
    }

    #[test]
    fn retry_after_floors_the_backoff() {
        let policy = RetryPolicy::new().with_jitter(false);
        let hint = Some(Duration::from_secs(30));
        assert_eq!(policy.delay_for(0, hint), Duration::from_secs(30));
        // A hint smaller than the backoff leaves the backoff in place.
        let small = Some(Duration::from_millis(1));
        assert_eq!(policy.delay_for(0, small), policy.base_delay(0));
    }

    #[test]
    fn retry_after_headers_parse() {
        let mut headers = HeaderMap::new();
        headers.insert("retry-after", HeaderValue::from_static("7"));
        assert_eq!(retry_after_hint(&headers), Some(Duration::from_secs(7)));

        headers.insert("retry-after-ms", HeaderValue::from_static("250"));
        assert_eq!(retry_after_hint(&headers), Some(Duration::from_millis(250)));

        let mut dated = HeaderMap::new();
        dated.insert(
            "retry-after",
            HeaderValue::from_static("Wed, 21 Oct 2015 07:28:00 GMT"),
        );
        assert_eq!(retry_after_hint(&dated), None);
    }
}
