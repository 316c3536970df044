use crate::report::report_model::TestSuiteReport;

// ============================================================================
// Console reporter
// ============================================================================

/// Format a suite report for the terminal.
///
/// ```text
/// === Test Suite: login-suite ===
///
/// ✓ PASS  [chrome] UC-1 Login with empty username and password (8 steps, 1 assertions) 2.3s
/// ✗ FAIL  [firefox] UC-3 Successful login: Standard user (5 steps, 4 assertions) 11.0s
///     [FAIL] Step 4: LoggedIn: Login rejected: Epic sadface: ...
///     [SCREENSHOT] screenshots/firefox_UC-3_Successful_login.png
///
///   chrome: 6 passed, 0 failed
///   firefox: 5 passed, 1 failed
///
/// === Results: 11 passed, 1 failed (12 total) in 41.2s ===
/// ```
pub fn format_console_report(report: &TestSuiteReport) -> String {
    let mut out = String::new();

    out.push_str(&format!("=== Test Suite: {} ===\n\n", report.suite_name));

    for result in &report.test_results {
        let marker = if result.passed {
            "\u{2713} PASS"
        } else {
            "\u{2717} FAIL"
        };
        let timing = result
            .duration_ms
            .map(|ms| format!(" {:.1}s", ms as f64 / 1000.0))
            .unwrap_or_default();

        out.push_str(&format!(
            "{}  {} ({} steps, {} assertions){}\n",
            marker,
            result.display_name(),
            result.steps_run,
            result.assertion_results.len(),
            timing
        ));

        if let Some(ref error) = result.error {
            out.push_str(&format!("    [ERROR] {}\n", error));
        }

        for ar in result.assertion_results.iter().filter(|ar| !ar.passed) {
            let detail = ar.message.as_deref().unwrap_or("assertion failed");
            out.push_str(&format!(
                "    [FAIL] Step {}: {}: {}\n",
                ar.step_index,
                ar.spec.kind(),
                detail
            ));
        }

        if let Some(ref shot) = result.screenshot {
            out.push_str(&format!("    [SCREENSHOT] {}\n", shot));
        }
    }

    let browsers = report.by_browser();
    if browsers.len() > 1 {
        out.push('\n');
        for b in &browsers {
            out.push_str(&format!("  {}: {} passed, {} failed\n", b.browser, b.passed, b.failed));
        }
    }

    out.push_str(&format!(
        "\n=== Results: {} passed, {} failed ({} total)",
        report.passed, report.failed, report.total
    ));

    if let Some(ms) = report.duration_ms {
        out.push_str(&format!(" in {:.1}s", ms as f64 / 1000.0));
    }

    out.push_str(" ===\n");
    out
}
