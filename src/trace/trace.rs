use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

/// One journal line: a step or assertion outcome.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StepEvent {
    pub timestamp_ms: u128,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub browser: Option<String>,

    pub scenario: String,
    pub step: usize,

    /// Step action or assertion kind
    pub action: String,

    pub passed: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl StepEvent {
    pub fn now(scenario: &str, step: usize, action: &str) -> Self {
        Self {
            timestamp_ms: SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|d| d.as_millis())
                .unwrap_or(0),
            browser: None,
            scenario: scenario.to_string(),
            step,
            action: action.to_string(),
            passed: true,
            detail: None,
        }
    }

    pub fn with_browser(mut self, browser: &str) -> Self {
        self.browser = Some(browser.to_string());
        self
    }

    pub fn with_outcome(mut self, passed: bool) -> Self {
        self.passed = passed;
        self
    }

    pub fn with_detail(mut self, detail: impl ToString) -> Self {
        self.detail = Some(detail.to_string());
        self
    }
}
