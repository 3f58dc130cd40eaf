//! Implicit wait: bounded polling applied to every element lookup.
//!
//! A lookup is retried at a fixed interval until it yields something or the
//! timeout elapses. Errors raised by the probe itself are never retried.

use crate::result::ProbeResult;
use std::future::Future;
use std::time::{Duration, Instant};

/// Default implicit wait applied to element lookups (3 seconds)
pub const DEFAULT_IMPLICIT_WAIT_MS: u64 = 3_000;

/// Default polling interval (100ms)
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 100;

/// Options for wait operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitOptions {
    /// Timeout in milliseconds
    pub timeout_ms: u64,
    /// Polling interval in milliseconds
    pub poll_interval_ms: u64,
}

impl Default for WaitOptions {
    fn default() -> Self {
        Self {
            timeout_ms: DEFAULT_IMPLICIT_WAIT_MS,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
        }
    }
}

impl WaitOptions {
    /// Create new wait options with defaults
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set timeout in milliseconds
    #[must_use]
    pub const fn with_timeout(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    /// Set polling interval in milliseconds
    #[must_use]
    pub const fn with_poll_interval(mut self, poll_interval_ms: u64) -> Self {
        self.poll_interval_ms = poll_interval_ms;
        self
    }

    /// Get timeout as Duration
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Get poll interval as Duration
    #[must_use]
    pub const fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

/// Outcome of a polling loop
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Polled<T> {
    /// Value produced by the probe, `None` on timeout
    pub value: Option<T>,
    /// Number of probe invocations
    pub attempts: u32,
    /// Time spent waiting
    pub elapsed: Duration,
}

impl<T> Polled<T> {
    /// Whether the wait timed out
    #[must_use]
    pub const fn timed_out(&self) -> bool {
        self.value.is_none()
    }
}

/// Poll `probe` until it yields `Some`, or until the timeout elapses.
///
/// The probe always runs at least once, even with a zero timeout.
pub async fn poll_until<T, F, Fut>(options: &WaitOptions, mut probe: F) -> ProbeResult<Polled<T>>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = ProbeResult<Option<T>>>,
{
    let start = Instant::now();
    let timeout = options.timeout();
    let mut attempts = 0;

    loop {
        attempts += 1;
        if let Some(value) = probe().await? {
            return Ok(Polled {
                value: Some(value),
                attempts,
                elapsed: start.elapsed(),
            });
        }

        let elapsed = start.elapsed();
        if elapsed >= timeout {
            tracing::trace!(attempts, ?elapsed, "wait timed out");
            return Ok(Polled {
                value: None,
                attempts,
                elapsed,
            });
        }

        tokio::time::sleep(options.poll_interval().min(timeout - elapsed)).await;
    }
}
