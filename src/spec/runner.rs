use std::time::{Duration, Instant};

use regex::RegexBuilder;
use tracing::{error, info, warn};

use crate::browser::driver::Browser;
use crate::error::{SuiteError, SuiteResult};
use crate::fixtures::accounts::{find_account, is_accepted, is_slow_account, log_case};
use crate::page::login_page::{LoginOutcome, LoginPage};
use crate::page::settings::PageSettings;
use crate::page::wait::wait_until;
use crate::spec::context::TestContext;
use crate::spec::spec_model::{AssertionResult, AssertionSpec, Scenario, TestResult, TestStep};
use crate::trace::{logger::TraceLogger, trace::StepEvent};

/// Executes a scenario step-by-step through the login page object.
pub struct TestRunner<'a> {
    settings: &'a PageSettings,
    trace: Option<&'a TraceLogger>,
    browser_label: Option<String>,
}

impl<'a> TestRunner<'a> {
    pub fn new(settings: &'a PageSettings) -> Self {
        Self {
            settings,
            trace: None,
            browser_label: None,
        }
    }

    pub fn with_trace(mut self, trace: &'a TraceLogger) -> Self {
        self.trace = Some(trace);
        self
    }

    pub fn with_browser_label(mut self, label: &str) -> Self {
        self.browser_label = Some(label.to_string());
        self
    }

    /// Run one expanded scenario against a browser.
    ///
    /// Stops at the first step error. Assertion failures do not stop the
    /// scenario; they are collected and decide `passed` at the end.
    pub fn run(&self, scenario: &Scenario, browser: &mut dyn Browser) -> TestResult {
        let start = Instant::now();
        let mut ctx = TestContext::new();
        let mut page = LoginPage::new(browser, self.settings);
        let label = self.browser_label.as_deref();

        info!(scenario = %scenario.name, browser = label.unwrap_or("-"), "scenario started");

        for (i, step) in scenario.steps.iter().enumerate() {
            if let Err(e) = self.execute_step(scenario, step, i, &mut page, &mut ctx) {
                error!(scenario = %scenario.name, step = i, action = step.label(), "step failed: {}", e);
                self.journal(scenario, i, step.label(), false, Some(e.to_string()));
                return TestResult {
                    spec_name: scenario.name.clone(),
                    browser: label.map(str::to_string),
                    passed: false,
                    steps_run: i + 1,
                    assertion_results: ctx.assertion_results,
                    error: Some(format!("Step {} failed: {}", i, e)),
                    duration_ms: Some(start.elapsed().as_millis()),
                    screenshot: None,
                };
            }

            if !matches!(step, TestStep::Assert { .. }) {
                self.journal(scenario, i, step.label(), true, None);
            }
        }

        let passed = ctx.all_passed();
        info!(
            scenario = %scenario.name,
            passed,
            assertions = ctx.assertion_results.len(),
            failed = ctx.fail_count(),
            "scenario completed"
        );

        TestResult {
            spec_name: scenario.name.clone(),
            browser: label.map(str::to_string),
            passed,
            steps_run: scenario.steps.len(),
            assertion_results: ctx.assertion_results,
            error: None,
            duration_ms: Some(start.elapsed().as_millis()),
            screenshot: None,
        }
    }

    fn journal(&self, scenario: &Scenario, step: usize, action: &str, passed: bool, detail: Option<String>) {
        let Some(trace) = self.trace else {
            return;
        };
        let mut event = StepEvent::now(&scenario.name, step, action).with_outcome(passed);
        if let Some(label) = &self.browser_label {
            event = event.with_browser(label);
        }
        if let Some(detail) = detail {
            event = event.with_detail(detail);
        }
        trace.log(&event);
    }

    fn execute_step(
        &self,
        scenario: &Scenario,
        step: &TestStep,
        step_index: usize,
        page: &mut LoginPage<'_>,
        ctx: &mut TestContext,
    ) -> SuiteResult<()> {
        match step {
            TestStep::Open => page.open(),

            TestStep::EnterUsername { value } => {
                if is_accepted(value) {
                    info!(username = %value, "username is in the accepted usernames list");
                }
                page.enter_username(value)?;
                ctx.username = Some(value.clone());
                Ok(())
            }

            TestStep::EnterPassword { value } => page.enter_password(value),

            TestStep::ClearUsername => {
                page.clear_username()?;
                ctx.username = None;
                Ok(())
            }

            TestStep::ClearPassword => page.clear_password(),

            TestStep::ClickLogin => self.submit(page, ctx),

            TestStep::Login { account } => {
                let account = find_account(account)
                    .ok_or_else(|| SuiteError::UnknownAccount(account.clone()))?;
                log_case(account.description, account.username, account.password, "success");
                page.enter_username(account.username)?;
                ctx.username = Some(account.username.to_string());
                page.enter_password(account.password)?;
                self.submit(page, ctx)
            }

            TestStep::Pause { duration_ms } => {
                page.browser().pause(Duration::from_millis(*duration_ms));
                Ok(())
            }

            TestStep::Assert { assertions } => {
                let results: Vec<AssertionResult> = assertions
                    .iter()
                    .map(|a| self.evaluate_one(scenario, a, step_index, page, ctx))
                    .collect();
                for r in &results {
                    if !r.passed {
                        warn!(
                            assertion = r.spec.kind(),
                            "assertion failed: {}",
                            r.message.as_deref().unwrap_or("assertion failed")
                        );
                    }
                }
                ctx.record_assertions(results);
                Ok(())
            }
        }
    }

    /// Submit the form, giving slow accounts a head start.
    fn submit(&self, page: &mut LoginPage<'_>, ctx: &TestContext) -> SuiteResult<()> {
        if ctx.username.as_deref().is_some_and(is_slow_account) {
            info!("slow account detected, waiting before login");
            page.browser().pause(self.settings.slow_pre_submit());
        }
        page.submit()
    }

    /// Evaluate a single assertion and journal it.
    fn evaluate_one(
        &self,
        scenario: &Scenario,
        spec: &AssertionSpec,
        step_index: usize,
        page: &mut LoginPage<'_>,
        ctx: &TestContext,
    ) -> AssertionResult {
        let (passed, actual, message) = self.check(spec, page, ctx);
        self.journal(scenario, step_index, spec.kind(), passed, message.clone());
        AssertionResult {
            step_index,
            spec: spec.clone(),
            passed,
            actual,
            message,
        }
    }

    fn check(
        &self,
        spec: &AssertionSpec,
        page: &mut LoginPage<'_>,
        ctx: &TestContext,
    ) -> (bool, Option<String>, Option<String>) {
        match spec {
            AssertionSpec::ErrorContains { expected } => {
                let needle = expected.to_lowercase();
                match self.wait_for_error(page, |text| text.to_lowercase().contains(&needle)) {
                    (true, text) => (true, text, None),
                    (false, Some(text)) => (
                        false,
                        Some(text.clone()),
                        Some(format!("Error message '{}' does not contain '{}'", text, expected)),
                    ),
                    (false, None) => (
                        false,
                        None,
                        Some("Error message did not appear".to_string()),
                    ),
                }
            }

            AssertionSpec::ErrorMatches { pattern } => {
                let re = match RegexBuilder::new(pattern).case_insensitive(true).build() {
                    Ok(re) => re,
                    Err(e) => {
                        return (false, None, Some(format!("Invalid pattern '{}': {}", pattern, e)));
                    }
                };
                match self.wait_for_error(page, |text| re.is_match(text)) {
                    (true, text) => (true, text, None),
                    (false, Some(text)) => (
                        false,
                        Some(text.clone()),
                        Some(format!("Error message '{}' does not match /{}/i", text, pattern)),
                    ),
                    (false, None) => (
                        false,
                        None,
                        Some("Error message did not appear".to_string()),
                    ),
                }
            }

            AssertionSpec::ErrorAbsent => match page.error_message() {
                None => (true, None, None),
                Some(text) => (
                    false,
                    Some(text.clone()),
                    Some(format!("Login failed: {}", text)),
                ),
            },

            AssertionSpec::LoggedIn => {
                let slow = ctx.username.as_deref().is_some_and(is_slow_account);
                let poll = if slow {
                    self.settings.slow_login_wait
                } else {
                    self.settings.login_wait
                };
                match page.wait_for_outcome(poll) {
                    LoginOutcome::LoggedIn => (true, page.current_url().ok(), None),
                    LoginOutcome::Rejected(text) => (
                        false,
                        Some(text.clone()),
                        Some(format!("Login rejected: {}", text)),
                    ),
                    LoginOutcome::Pending => (
                        false,
                        page.current_url().ok(),
                        Some(format!(
                            "Login was not successful within {}ms - page title \"{}\" did not appear",
                            poll.timeout_ms, self.settings.expected_title
                        )),
                    ),
                }
            }

            AssertionSpec::TitleEquals { expected } => match page.page_title() {
                Ok(title) => {
                    let passed = title == *expected;
                    let message =
                        (!passed).then(|| format!("Title '{}' does not equal '{}'", title, expected));
                    (passed, Some(title), message)
                }
                Err(e) => (false, None, Some(format!("Failed to get title: {}", e))),
            },

            AssertionSpec::UrlContains { expected } => match page.current_url() {
                Ok(url) => {
                    let passed = url.contains(expected.as_str());
                    let message = (!passed).then(|| format!("URL does not contain '{}'", expected));
                    (passed, Some(url), message)
                }
                Err(e) => (false, None, Some(format!("Failed to get URL: {}", e))),
            },
        }
    }

    /// Wait for an error banner raised by the last submit whose text
    /// satisfies `accept`. Returns whether it did, and the last text seen.
    fn wait_for_error(
        &self,
        page: &mut LoginPage<'_>,
        accept: impl Fn(&str) -> bool,
    ) -> (bool, Option<String>) {
        let mut last: Option<String> = None;
        let banner = page.error.clone();
        let stale = page.stale_error().map(str::to_string);
        let waited = wait_until(page.browser(), self.settings.error_wait, "error message", |b| {
            let text = banner.message(b).filter(|t| stale.as_deref() != Some(t.as_str()));
            let matched = text.as_deref().is_some_and(&accept);
            if text.is_some() {
                last = text;
            }
            Ok(matched.then_some(()))
        });
        if let Some(text) = &last {
            info!(message = %text, "error message displayed");
        }
        (waited.is_ok(), last)
    }
}
