use std::fmt::Display;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::browser::driver::Browser;
use crate::error::{SuiteError, SuiteResult};

/// How long to wait for a condition, and how often to check it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Poll {
    pub timeout_ms: u64,
    pub interval_ms: u64,
}

impl Poll {
    pub const fn new(timeout_ms: u64, interval_ms: u64) -> Self {
        Self { timeout_ms, interval_ms }
    }

    /// Pause between checks. A zero interval is treated as 1ms so the
    /// timeout still bounds the wait.
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms.max(1))
    }

    /// Number of checks made before giving up.
    pub fn attempts(&self) -> u64 {
        (self.timeout_ms / self.interval_ms.max(1)).saturating_add(1)
    }
}

/// Check `condition` until it yields a value or the poll budget is spent.
///
/// Pauses go through `Browser::pause` so a scripted browser can run this
/// without sleeping.
pub fn wait_until<T>(
    browser: &mut dyn Browser,
    poll: Poll,
    what: &str,
    mut condition: impl FnMut(&mut dyn Browser) -> SuiteResult<Option<T>>,
) -> SuiteResult<T> {
    let attempts = poll.attempts();
    for attempt in 1..=attempts {
        if let Some(value) = condition(&mut *browser)? {
            debug!(what, attempt, "condition met");
            return Ok(value);
        }
        if attempt < attempts {
            browser.pause(poll.interval());
        }
    }
    Err(SuiteError::Timeout {
        what: what.to_string(),
        timeout_ms: poll.timeout_ms,
    })
}

/// Bounded retry for a single flaky interaction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RetryPolicy {
    /// Total tries, including the first one
    pub max_attempts: u32,

    /// Pause after the first failure
    pub backoff_ms: u64,

    /// Multiplier applied to the pause after each further failure
    #[serde(default = "default_factor")]
    pub backoff_factor: f64,
}

fn default_factor() -> f64 { 2.0 }

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 2,
            backoff_ms: 250,
            backoff_factor: default_factor(),
        }
    }
}

impl RetryPolicy {
    /// Never retry.
    pub fn once() -> Self {
        Self {
            max_attempts: 1,
            backoff_ms: 0,
            backoff_factor: 1.0,
        }
    }

    /// Pause after the given failed attempt (1-based).
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1) as i32;
        let ms = self.backoff_ms as f64 * self.backoff_factor.max(1.0).powi(exponent);
        Duration::from_millis(ms.round() as u64)
    }

    /// Run `op`, retrying failures `retryable` accepts until `max_attempts`
    /// is reached. Returns the last error.
    pub fn run<T, E: Display>(
        &self,
        browser: &mut dyn Browser,
        what: &str,
        retryable: impl Fn(&E) -> bool,
        mut op: impl FnMut(&mut dyn Browser) -> Result<T, E>,
    ) -> Result<T, E> {
        let attempts = self.max_attempts.max(1);
        let mut attempt = 1;
        loop {
            match op(&mut *browser) {
                Ok(value) => return Ok(value),
                Err(e) if attempt < attempts && retryable(&e) => {
                    warn!(what, attempt, "{} failed, retrying: {}", what, e);
                    browser.pause(self.delay_for(attempt));
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}
