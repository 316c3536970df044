use crate::spec::spec_model::AssertionResult;

/// Tracks the execution state and results of a running scenario.
#[derive(Debug, Clone, Default)]
pub struct TestContext {
    /// All assertion results collected during execution
    pub assertion_results: Vec<AssertionResult>,

    /// Username currently typed into the form, if any
    pub username: Option<String>,
}

impl TestContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_assertions(&mut self, results: Vec<AssertionResult>) {
        self.assertion_results.extend(results);
    }

    pub fn all_passed(&self) -> bool {
        self.assertion_results.iter().all(|r| r.passed)
    }

    pub fn fail_count(&self) -> usize {
        self.assertion_results.iter().filter(|r| !r.passed).count()
    }
}
