use serde::{Deserialize, Serialize};

use crate::spec::spec_model::TestResult;

/// Aggregated report for one suite run across all browser targets.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestSuiteReport {
    pub suite_name: String,

    pub total: usize,
    pub passed: usize,
    pub failed: usize,

    /// Wall time of the whole run in milliseconds
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<u128>,

    pub test_results: Vec<TestResult>,
}

/// Pass/fail counts for a single browser target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BrowserSummary {
    pub browser: String,
    pub passed: usize,
    pub failed: usize,
}

impl TestSuiteReport {
    pub fn from_results(suite_name: &str, results: Vec<TestResult>) -> Self {
        let total = results.len();
        let passed = results.iter().filter(|r| r.passed).count();
        Self {
            suite_name: suite_name.to_string(),
            total,
            passed,
            failed: total - passed,
            duration_ms: None,
            test_results: results,
        }
    }

    pub fn with_duration(mut self, duration_ms: u128) -> Self {
        self.duration_ms = Some(duration_ms);
        self
    }

    pub fn all_passed(&self) -> bool {
        self.failed == 0
    }

    /// Counts per browser label, in first-seen order. Results without a
    /// label are grouped under "-".
    pub fn by_browser(&self) -> Vec<BrowserSummary> {
        let mut out: Vec<BrowserSummary> = Vec::new();
        for result in &self.test_results {
            let label = result.browser.as_deref().unwrap_or("-");
            let idx = match out.iter().position(|s| s.browser == label) {
                Some(i) => i,
                None => {
                    out.push(BrowserSummary {
                        browser: label.to_string(),
                        passed: 0,
                        failed: 0,
                    });
                    out.len() - 1
                }
            };
            if result.passed {
                out[idx].passed += 1;
            } else {
                out[idx].failed += 1;
            }
        }
        out
    }
}
