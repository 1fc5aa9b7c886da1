//! Cancellable tokio timers.
//!
//! A [`Timer`] owns a spawned task. Dropping the handle cancels the task, so
//! replacing or clearing an `Option<Timer>` is all the teardown needed.
//! Each timer carries a generation number that its callback receives, letting
//! the owner ignore a callback that raced with cancellation.

use std::time::Duration;

use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

#[derive(Debug)]
pub(crate) struct Timer {
    generation: u64,
    token: CancellationToken,
}

impl Timer {
    /// Fire `tick` every `period`, first after one full period.
    pub(crate) fn repeating<F>(period: Duration, generation: u64, tick: F) -> Self
    where
        F: Fn(u64) + Send + 'static,
    {
        let token = CancellationToken::new();
        let cancelled = token.clone();
        let first = Instant::now() + period;
        tokio::spawn(async move {
            let mut interval = tokio::time::interval_at(first, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    biased;
                    _ = cancelled.cancelled() => break,
                    _ = interval.tick() => tick(generation),
                }
            }
        });
        Self { generation, token }
    }

    /// Fire `fire` once after `delay`.
    pub(crate) fn once<F>(delay: Duration, generation: u64, fire: F) -> Self
    where
        F: FnOnce(u64) + Send + 'static,
    {
        let token = CancellationToken::new();
        let cancelled = token.clone();
        let deadline = Instant::now() + delay;
        tokio::spawn(async move {
            tokio::select! {
                biased;
                _ = cancelled.cancelled() => {}
                _ = tokio::time::sleep_until(deadline) => fire(generation),
            }
        });
        Self { generation, token }
    }

    pub(crate) fn generation(&self) -> u64 {
        self.generation
    }
}

impl Drop for Timer {
    fn drop(&mut self) {
        self.token.cancel();
    }
}
