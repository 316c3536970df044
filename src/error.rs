use thiserror::Error;

use crate::browser::error::BrowserError;

#[derive(Error, Debug)]
pub enum SuiteError {
    #[error(transparent)]
    Browser(#[from] BrowserError),

    /// No element matched the locator before the wait ran out
    #[error("Element '{element}' was not found in DOM within {timeout_ms}ms")]
    ElementNotFound { element: String, timeout_ms: u64 },

    /// Element exists but never became visible
    #[error("Element '{element}' was not displayed within {timeout_ms}ms")]
    ElementNotDisplayed { element: String, timeout_ms: u64 },

    /// A polled condition never held
    #[error("Timed out after {timeout_ms}ms waiting for {what}")]
    Timeout { what: String, timeout_ms: u64 },

    /// Typing / clearing did not leave the expected value in the DOM
    #[error("Field '{field}' holds '{actual}' instead of '{expected}'")]
    ValueNotApplied {
        field: String,
        expected: String,
        actual: String,
    },

    #[error("Unknown account '{0}' (not in the fixture table)")]
    UnknownAccount(String),

    #[error("Invalid scenario '{scenario}': {reason}")]
    InvalidScenario { scenario: String, reason: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Invalid pattern: {0}")]
    Regex(#[from] regex::Error),
}

impl SuiteError {
    /// Browser interaction failures worth another try. Wait timeouts are
    /// final: the wait already spent its budget.
    pub fn is_transient(&self) -> bool {
        matches!(self, SuiteError::Browser(e) if e.is_transient())
    }
}

pub type SuiteResult<T> = Result<T, SuiteError>;
