//! Configuration for the cycling controller.

use std::time::Duration;

use crate::catalog::{Region, DEFAULT_RECENT_BOUND};

/// Default time between automatic advances (10 seconds).
pub const DEFAULT_CYCLE_INTERVAL: Duration = Duration::from_secs(10);

/// Default quiet period after an interaction before cycling resumes (30 seconds).
pub const DEFAULT_IDLE_TIMEOUT: Duration = Duration::from_secs(30);

/// Delay before resuming once timeout prevention is lifted.
///
/// Debounces rapid on/off toggles of the override.
pub const OVERRIDE_SETTLE_DELAY: Duration = Duration::from_millis(100);

/// Cycling controller configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct CyclingConfig {
    /// Time between automatic advances.
    pub cycle_interval: Duration,
    /// Quiet period after an interaction before cycling resumes.
    pub idle_timeout: Duration,
    /// Start cycling on construction and when timeout prevention is lifted
    /// while stopped.
    pub auto_start: bool,
    /// Initial value of the timeout prevention override.
    pub timeout_prevented: bool,
    /// How many recently shown locations to avoid.
    pub recent_bound: usize,
    /// Restrict cycling to one region.
    pub region: Option<Region>,
}

impl Default for CyclingConfig {
    fn default() -> Self {
        Self {
            cycle_interval: DEFAULT_CYCLE_INTERVAL,
            idle_timeout: DEFAULT_IDLE_TIMEOUT,
            auto_start: true,
            timeout_prevented: false,
            recent_bound: DEFAULT_RECENT_BOUND,
            region: None,
        }
    }
}

impl CyclingConfig {
    pub fn with_cycle_interval(mut self, interval: Duration) -> Self {
        self.cycle_interval = interval;
        self
    }

    pub fn with_idle_timeout(mut self, timeout: Duration) -> Self {
        self.idle_timeout = timeout;
        self
    }

    pub fn with_auto_start(mut self, auto_start: bool) -> Self {
        self.auto_start = auto_start;
        self
    }

    pub fn with_timeout_prevented(mut self, prevented: bool) -> Self {
        self.timeout_prevented = prevented;
        self
    }

    pub fn with_recent_bound(mut self, bound: usize) -> Self {
        self.recent_bound = bound;
        self
    }

    pub fn with_region(mut self, region: Region) -> Self {
        self.region = Some(region);
        self
    }
}
