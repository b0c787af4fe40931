//! Bounded waits.
//!
//! Conditions are checked, and when unmet the task yields for one poll
//! interval before checking again. A wait ends at the first success, at the
//! first driver error, or when the deadline passes.

use crate::result::{VerifyError, VerifyResult};
use std::future::Future;
use std::time::Duration;
use tokio::time::Instant;

// =============================================================================
// CONSTANTS
// =============================================================================

/// Default timeout for auto-waiting (5 seconds)
pub const DEFAULT_TIMEOUT_MS: u64 = 5_000;

/// Default polling interval for auto-waiting (100ms)
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 100;

// =============================================================================
// WAIT OPTIONS
// =============================================================================

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
            timeout_ms: DEFAULT_TIMEOUT_MS,
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

// =============================================================================
// CHECK
// =============================================================================

/// Outcome of one check of a wait condition
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Check<T> {
    /// Condition holds
    Ready(T),
    /// Condition does not hold yet; carries the observed state
    Pending(String),
}

// =============================================================================
// WAIT RESULT
// =============================================================================

/// Result of a successful wait operation
#[derive(Debug, Clone)]
pub struct WaitResult<T> {
    /// Value produced by the final check
    pub value: T,
    /// Time spent waiting
    pub elapsed: Duration,
    /// Number of checks made
    pub attempts: u32,
    /// Description of what was waited for
    pub waited_for: String,
}

// =============================================================================
// POLLING
// =============================================================================

/// Check `condition` until it is ready or the timeout elapses.
///
/// The condition is checked at least once, even with a zero timeout. On
/// timeout the error carries the state reported by the last check.
pub async fn poll_until<T, F, Fut>(
    options: &WaitOptions,
    waited_for: impl Into<String>,
    mut condition: F,
) -> VerifyResult<WaitResult<T>>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = VerifyResult<Check<T>>>,
{
    let waited_for = waited_for.into();
    let start = Instant::now();
    let deadline = start + options.timeout();
    let mut attempts: u32 = 0;

    loop {
        attempts = attempts.saturating_add(1);
        let last_state = match condition().await? {
            Check::Ready(value) => {
                tracing::debug!(
                    waited_for = %waited_for,
                    attempts,
                    elapsed_ms = start.elapsed().as_millis() as u64,
                    "condition met"
                );
                return Ok(WaitResult {
                    value,
                    elapsed: start.elapsed(),
                    attempts,
                    waited_for,
                });
            }
            Check::Pending(state) => state,
        };

        let now = Instant::now();
        if now >= deadline {
            tracing::debug!(waited_for = %waited_for, attempts, last_state = %last_state, "wait timed out");
            return Err(VerifyError::AssertionTimeout {
                condition: waited_for,
                timeout_ms: options.timeout_ms,
                last_state,
            });
        }

        let pause = options.poll_interval().min(deadline - now);
        tokio::time::sleep(pause).await;
    }
}

// =============================================================================
// TESTS
// =============================================================================
