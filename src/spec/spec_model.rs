use serde::{Deserialize, Serialize};

use crate::error::{SuiteError, SuiteResult};
use crate::fixtures::accounts::{
    EMPTY_CREDENTIALS, MISSING_PASSWORD, VALID_ACCOUNTS, find_account,
};

/// A login scenario. Deserialized from YAML, or built in code by the catalog.
///
/// With `examples` set the scenario is an outline: it expands to one
/// scenario per fixture row, with `<username>`, `<password>`,
/// `<description>` and `<expected_error>` substituted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Scenario {
    /// Human-readable name for this scenario
    pub name: String,

    /// Feature the scenario belongs to
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feature: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,

    /// Fixture table to expand this outline over
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub examples: Option<ExampleTable>,

    /// Ordered list of steps to execute
    pub steps: Vec<TestStep>,
}

/// A single step in a scenario.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum TestStep {
    /// Open the login page (skipped when already there)
    Open,

    EnterUsername { value: String },

    EnterPassword { value: String },

    ClearUsername,

    ClearPassword,

    ClickLogin,

    /// Fill both fields for a fixture account and submit
    Login { account: String },

    /// Fixed pause
    Pause { duration_ms: u64 },

    /// Run assertions against the current page state
    Assert { assertions: Vec<AssertionSpec> },
}

/// A single assertion to evaluate against the page.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AssertionSpec {
    /// Error banner appears and contains the text (case-insensitive)
    ErrorContains { expected: String },

    /// Error banner appears and matches the pattern (case-insensitive)
    ErrorMatches { pattern: String },

    /// No error banner is shown right now
    ErrorAbsent,

    /// The inventory view is reached
    LoggedIn,

    /// Browser title equals exactly
    TitleEquals { expected: String },

    /// Current URL contains the expected substring
    UrlContains { expected: String },
}

/// Result of evaluating a single assertion.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AssertionResult {
    /// Which step this assertion belongs to (0-indexed)
    pub step_index: usize,

    /// The assertion that was evaluated
    pub spec: AssertionSpec,

    pub passed: bool,

    /// Actual value found (for debugging failed assertions)
    pub actual: Option<String>,

    /// Human-readable failure message
    pub message: Option<String>,
}

/// Result of running one scenario on one browser.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestResult {
    pub spec_name: String,

    /// Browser target label, e.g. "chrome"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub browser: Option<String>,

    /// Whether all steps and assertions passed
    pub passed: bool,

    /// Number of steps that were executed
    pub steps_run: usize,

    pub assertion_results: Vec<AssertionResult>,

    /// Error message if the scenario stopped on a step error
    pub error: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<u128>,

    /// Screenshot captured after a failure
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub screenshot: Option<String>,
}

impl TestResult {
    /// A result for a scenario that never got to run.
    pub fn not_run(spec_name: &str, browser: Option<&str>, error: String) -> Self {
        Self {
            spec_name: spec_name.to_string(),
            browser: browser.map(str::to_string),
            passed: false,
            steps_run: 0,
            assertion_results: Vec::new(),
            error: Some(error),
            duration_ms: None,
            screenshot: None,
        }
    }

    /// Name with the browser label, e.g. "[chrome] UC-1 ...".
    pub fn display_name(&self) -> String {
        match &self.browser {
            Some(b) => format!("[{}] {}", b, self.spec_name),
            None => self.spec_name.clone(),
        }
    }
}

// ============================================================================
// Scenario outlines
// ============================================================================

/// Fixture tables a scenario outline can expand over.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ExampleTable {
    ValidAccounts,
    MissingPassword,
    EmptyCredentials,
}

/// One row of an example table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExampleRow {
    pub description: String,
    pub username: String,
    pub password: String,
    pub expected_error: String,
}

impl ExampleTable {
    pub fn rows(&self) -> Vec<ExampleRow> {
        match self {
            ExampleTable::ValidAccounts => VALID_ACCOUNTS
                .iter()
                .map(|a| ExampleRow {
                    description: a.description.to_string(),
                    username: a.username.to_string(),
                    password: a.password.to_string(),
                    expected_error: String::new(),
                })
                .collect(),
            ExampleTable::MissingPassword => MISSING_PASSWORD
                .iter()
                .map(|c| ExampleRow {
                    description: c.description.to_string(),
                    username: c.username.to_string(),
                    password: c.password.to_string(),
                    expected_error: c.expected_error.to_string(),
                })
                .collect(),
            ExampleTable::EmptyCredentials => vec![ExampleRow {
                description: EMPTY_CREDENTIALS.description.to_string(),
                username: EMPTY_CREDENTIALS.username.to_string(),
                password: EMPTY_CREDENTIALS.password.to_string(),
                expected_error: EMPTY_CREDENTIALS.expected_error.to_string(),
            }],
        }
    }
}

impl ExampleRow {
    pub fn substitute(&self, template: &str) -> String {
        template
            .replace("<username>", &self.username)
            .replace("<password>", &self.password)
            .replace("<description>", &self.description)
            .replace("<expected_error>", &self.expected_error)
    }
}

impl TestStep {
    /// Snake-case action name, as written in YAML.
    pub fn label(&self) -> &'static str {
        match self {
            TestStep::Open => "open",
            TestStep::EnterUsername { .. } => "enter_username",
            TestStep::EnterPassword { .. } => "enter_password",
            TestStep::ClearUsername => "clear_username",
            TestStep::ClearPassword => "clear_password",
            TestStep::ClickLogin => "click_login",
            TestStep::Login { .. } => "login",
            TestStep::Pause { .. } => "pause",
            TestStep::Assert { .. } => "assert",
        }
    }

    fn substitute(&self, row: &ExampleRow) -> TestStep {
        match self {
            TestStep::EnterUsername { value } => TestStep::EnterUsername {
                value: row.substitute(value),
            },
            TestStep::EnterPassword { value } => TestStep::EnterPassword {
                value: row.substitute(value),
            },
            TestStep::Login { account } => TestStep::Login {
                account: row.substitute(account),
            },
            TestStep::Assert { assertions } => TestStep::Assert {
                assertions: assertions.iter().map(|a| a.substitute(row)).collect(),
            },
            other => other.clone(),
        }
    }
}

impl AssertionSpec {
    /// Variant name for reports.
    pub fn kind(&self) -> &'static str {
        match self {
            AssertionSpec::ErrorContains { .. } => "ErrorContains",
            AssertionSpec::ErrorMatches { .. } => "ErrorMatches",
            AssertionSpec::ErrorAbsent => "ErrorAbsent",
            AssertionSpec::LoggedIn => "LoggedIn",
            AssertionSpec::TitleEquals { .. } => "TitleEquals",
            AssertionSpec::UrlContains { .. } => "UrlContains",
        }
    }

    fn substitute(&self, row: &ExampleRow) -> AssertionSpec {
        match self {
            AssertionSpec::ErrorContains { expected } => AssertionSpec::ErrorContains {
                expected: row.substitute(expected),
            },
            AssertionSpec::ErrorMatches { pattern } => AssertionSpec::ErrorMatches {
                pattern: row.substitute(pattern),
            },
            AssertionSpec::TitleEquals { expected } => AssertionSpec::TitleEquals {
                expected: row.substitute(expected),
            },
            AssertionSpec::UrlContains { expected } => AssertionSpec::UrlContains {
                expected: row.substitute(expected),
            },
            other => other.clone(),
        }
    }
}

impl Scenario {
    /// Expand an outline into concrete scenarios and validate them.
    /// Plain scenarios come back as a single validated copy.
    pub fn expand(&self) -> SuiteResult<Vec<Scenario>> {
        let expanded = match self.examples {
            None => vec![self.clone()],
            Some(table) => table
                .rows()
                .iter()
                .map(|row| {
                    let name = if self.name.contains('<') {
                        row.substitute(&self.name)
                    } else {
                        format!("{} [{}]", self.name, row.description)
                    };
                    Scenario {
                        name,
                        feature: self.feature.clone(),
                        tags: self.tags.clone(),
                        examples: None,
                        steps: self.steps.iter().map(|s| s.substitute(row)).collect(),
                    }
                })
                .collect(),
        };

        for scenario in &expanded {
            scenario.validate()?;
        }
        Ok(expanded)
    }

    /// Reject scenarios that could only fail for reasons unrelated to the page.
    pub fn validate(&self) -> SuiteResult<()> {
        let invalid = |reason: String| SuiteError::InvalidScenario {
            scenario: self.name.clone(),
            reason,
        };

        if self.steps.is_empty() {
            return Err(invalid("no steps".into()));
        }

        for step in &self.steps {
            match step {
                TestStep::Login { account } if find_account(account).is_none() => {
                    return Err(invalid(format!("unknown account '{}'", account)));
                }
                TestStep::Assert { assertions } => {
                    for assertion in assertions {
                        if let AssertionSpec::ErrorMatches { pattern } = assertion {
                            regex::Regex::new(pattern)
                                .map_err(|e| invalid(format!("bad pattern '{}': {}", pattern, e)))?;
                        }
                    }
                }
                _ => {}
            }
        }
        Ok(())
    }
}

/// Expand every outline in a list, keeping order.
pub fn expand_all(scenarios: &[Scenario]) -> SuiteResult<Vec<Scenario>> {
    let mut out = Vec::new();
    for scenario in scenarios {
        out.extend(scenario.expand()?);
    }
    Ok(out)
}
