//! Bounded readiness polling
//!
//! `Poller::wait_until` checks a predicate up to `max_attempts` times, sleeping
//! `interval` between attempts and stopping early when the run is cancelled.

use std::time::Duration;

use super::cancel::CancellationToken;
use crate::error::DeployResult;

/// How long to keep polling
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    pub max_attempts: u32,
    pub interval: Duration,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 50,
            interval: Duration::from_millis(500),
        }
    }
}

/// Result of a bounded poll
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollOutcome<T> {
    /// The predicate produced a value on attempt `attempts` (1-based)
    Ready { value: T, attempts: u32 },
    TimedOut { attempts: u32 },
    Cancelled,
}

type SleepFn = Box<dyn Fn(Duration) + Send + Sync>;

/// Bounded poll loop with an injectable sleep
pub struct Poller {
    policy: PollPolicy,
    sleep: SleepFn,
}

impl Poller {
    pub fn new(policy: PollPolicy) -> Self {
        Self {
            policy,
            sleep: Box::new(std::thread::sleep),
        }
    }

    /// Replace the sleep function (tests pass a no-op)
    pub fn with_sleep(mut self, sleep: impl Fn(Duration) + Send + Sync + 'static) -> Self {
        self.sleep = Box::new(sleep);
        self
    }

    pub fn policy(&self) -> PollPolicy {
        self.policy
    }

    pub fn sleep(&self, duration: Duration) {
        (self.sleep)(duration)
    }

    /// Poll `check` until it yields `Some`, the budget runs out, or `cancel` fires
    ///
    /// Errors from `check` abort the poll, unless the run was cancelled
    /// meanwhile.
    pub fn wait_until<T>(
        &self,
        cancel: &CancellationToken,
        mut check: impl FnMut() -> DeployResult<Option<T>>,
    ) -> DeployResult<PollOutcome<T>> {
        for attempt in 1..=self.policy.max_attempts {
            if cancel.is_cancelled() {
                return Ok(PollOutcome::Cancelled);
            }
            let checked = match check() {
                // an interrupt also kills child processes of the check
                Err(_) if cancel.is_cancelled() => return Ok(PollOutcome::Cancelled),
                other => other?,
            };
            if let Some(value) = checked {
                tracing::debug!(attempt, "poll satisfied");
                return Ok(PollOutcome::Ready {
                    value,
                    attempts: attempt,
                });
            }
            if attempt < self.policy.max_attempts {
                (self.sleep)(self.policy.interval);
            }
        }
        if cancel.is_cancelled() {
            return Ok(PollOutcome::Cancelled);
        }
        Ok(PollOutcome::TimedOut {
            attempts: self.policy.max_attempts,
        })
    }
}

impl std::fmt::Debug for Poller {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Poller").field("policy", &self.policy).finish()
    }
}
