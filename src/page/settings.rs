use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::fixtures::accounts::EXPECTED_TITLE;
use crate::page::wait::{Poll, RetryPolicy};

pub const DEFAULT_BASE_URL: &str = "https://www.saucedemo.com/";

/// Tuning for the login page object. Loaded from the `page:` section of the
/// config file; every field has a default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PageSettings {
    pub base_url: String,

    pub expected_title: String,

    /// Repair values / clicks through injected scripts when native
    /// WebDriver input does not take effect.
    pub script_fallback: bool,

    /// Waiting for the login form after navigation
    pub page_ready: Poll,

    /// Waiting for a field or button to become visible
    pub element_wait: Poll,

    /// Waiting for the error banner
    pub error_wait: Poll,

    /// Waiting for the inventory view after submit
    pub login_wait: Poll,

    /// Same, for slow accounts
    pub slow_login_wait: Poll,

    pub input_settle_ms: u64,

    pub submit_settle_ms: u64,

    /// Extra pause before submitting for slow accounts
    pub slow_pre_submit_ms: u64,

    pub retry: RetryPolicy,
}

impl Default for PageSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            expected_title: EXPECTED_TITLE.to_string(),
            script_fallback: true,
            page_ready: Poll::new(10_000, 100),
            element_wait: Poll::new(10_000, 100),
            error_wait: Poll::new(5_000, 250),
            login_wait: Poll::new(10_000, 500),
            slow_login_wait: Poll::new(150_000, 2_000),
            input_settle_ms: 200,
            submit_settle_ms: 1_500,
            slow_pre_submit_ms: 2_000,
            retry: RetryPolicy::default(),
        }
    }
}

impl PageSettings {
    pub fn input_settle(&self) -> Duration {
        Duration::from_millis(self.input_settle_ms)
    }

    pub fn submit_settle(&self) -> Duration {
        Duration::from_millis(self.submit_settle_ms)
    }

    pub fn slow_pre_submit(&self) -> Duration {
        Duration::from_millis(self.slow_pre_submit_ms)
    }

    /// Host part of `base_url`, e.g. `www.saucedemo.com`.
    pub fn host(&self) -> &str {
        host_of(&self.base_url)
    }
}

/// Host of an absolute URL, without scheme, port, or path.
pub fn host_of(url: &str) -> &str {
    let rest = url.split_once("://").map(|(_, r)| r).unwrap_or(url);
    let authority = rest.split(['/', '?', '#']).next().unwrap_or("");
    authority.split(':').next().unwrap_or("")
}

/// Path of an absolute URL without query or fragment; `/` when empty.
pub fn path_of(url: &str) -> &str {
    let rest = url.split_once("://").map(|(_, r)| r).unwrap_or(url);
    let rest = rest.split(['?', '#']).next().unwrap_or("");
    match rest.find('/') {
        Some(idx) => &rest[idx..],
        None => "/",
    }
}
