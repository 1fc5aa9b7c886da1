//! Retry policy for map loading.
//!
//! # Policy Types
//!
//! - [`RetryPolicy::None`]: single attempt
//! - [`RetryPolicy::Fixed`]: constant delay between attempts
//! - [`RetryPolicy::Linear`]: `base_delay × attempt` between attempts
//!
//! Only retryable [`MapError`]s are retried. Non-retryable failures propagate
//! immediately without waiting.

use std::time::Duration;

use tracing::{error, info, warn};

use super::error::MapError;
use super::loader::MapLoader;

// =============================================================================
// Retry Policy Constants
// =============================================================================

/// Default maximum attempts (including the first).
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// Default base delay for linear backoff (1 second).
pub const DEFAULT_BASE_DELAY_MS: u64 = 1000;

/// How a failed load is retried.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RetryPolicy {
    /// No retries - fail immediately on error.
    None,

    /// Fixed number of attempts with constant delay between them.
    Fixed {
        /// Maximum number of attempts (including the initial attempt).
        max_attempts: u32,
        /// Delay between attempts.
        delay: Duration,
    },

    /// Delay grows linearly: `base_delay × attempt`.
    Linear {
        /// Maximum number of attempts (including the initial attempt).
        max_attempts: u32,
        /// Delay after the first failure.
        base_delay: Duration,
    },
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::linear(DEFAULT_MAX_ATTEMPTS, Duration::from_millis(DEFAULT_BASE_DELAY_MS))
    }
}

impl RetryPolicy {
    /// Creates a linear backoff policy.
    pub fn linear(max_attempts: u32, base_delay: Duration) -> Self {
        Self::Linear {
            max_attempts,
            base_delay,
        }
    }

    /// Creates a fixed-delay policy.
    pub fn fixed(max_attempts: u32, delay: Duration) -> Self {
        Self::Fixed {
            max_attempts,
            delay,
        }
    }

    /// Delay to wait after failed attempt number `attempt` (1-based), or
    /// `None` if no further attempt is allowed.
    pub fn delay_for_attempt(&self, attempt: u32) -> Option<Duration> {
        match self {
            Self::None => None,
            Self::Fixed {
                max_attempts,
                delay,
            } => (attempt < *max_attempts).then_some(*delay),
            Self::Linear {
                max_attempts,
                base_delay,
            } => (attempt < *max_attempts).then(|| base_delay.saturating_mul(attempt)),
        }
    }

    /// Maximum number of attempts for this policy.
    pub fn max_attempts(&self) -> u32 {
        match self {
            Self::None => 1,
            Self::Fixed { max_attempts, .. } => *max_attempts,
            Self::Linear { max_attempts, .. } => *max_attempts,
        }
    }
}

/// Load the map SDK, retrying retryable failures per `policy`.
///
/// Returns the last error once attempts are exhausted.
pub async fn load_with_retry(loader: &MapLoader, policy: &RetryPolicy) -> Result<(), MapError> {
    let mut attempt = 1;
    loop {
        match loader.load().await {
            Ok(()) => {
                if attempt > 1 {
                    info!(attempt, "Map SDK loaded after retry");
                }
                return Ok(());
            }
            Err(e) if !e.retryable => {
                error!(kind = %e.kind, details = ?e.details, "Map load failed, not retryable");
                return Err(e);
            }
            Err(e) => match policy.delay_for_attempt(attempt) {
                Some(delay) => {
                    warn!(
                        attempt,
                        max_attempts = policy.max_attempts(),
                        delay_ms = delay.as_millis() as u64,
                        kind = %e.kind,
                        "Map load failed, retrying"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                None => {
                    error!(attempt, kind = %e.kind, details = ?e.details, "Map load failed, giving up");
                    return Err(e);
                }
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_policy_is_linear() {
        assert_eq!(
            RetryPolicy::default(),
            RetryPolicy::Linear {
                max_attempts: DEFAULT_MAX_ATTEMPTS,
                base_delay: Duration::from_millis(DEFAULT_BASE_DELAY_MS),
            }
        );
    }

    #[test]
    fn test_none_policy() {
        let policy = RetryPolicy::None;
        assert_eq!(policy.max_attempts(), 1);
        assert_eq!(policy.delay_for_attempt(1), None);
    }

    #[test]
    fn test_fixed_policy() {
        let policy = RetryPolicy::fixed(3, Duration::from_millis(250));
        assert_eq!(policy.delay_for_attempt(1), Some(Duration::from_millis(250)));
        assert_eq!(policy.delay_for_attempt(2), Some(Duration::from_millis(250)));
        assert_eq!(policy.delay_for_attempt(3), None);
    }

    #[test]
    fn test_linear_policy_scales_with_attempt() {
        let policy = RetryPolicy::linear(4, Duration::from_millis(500));
        assert_eq!(policy.delay_for_attempt(1), Some(Duration::from_millis(500)));
        assert_eq!(policy.delay_for_attempt(2), Some(Duration::from_millis(1000)));
        assert_eq!(policy.delay_for_attempt(3), Some(Duration::from_millis(1500)));
        assert_eq!(policy.delay_for_attempt(4), None);
        assert_eq!(policy.max_attempts(), 4);
    }
}
