use crate::report::report_model::TestSuiteReport;

/// Generate a JUnit XML report for CI.
///
/// ```xml
/// <?xml version="1.0" encoding="UTF-8"?>
/// <testsuite name="login-suite" tests="2" failures="1" time="12.345">
///   <testcase name="UC-1 ..." classname="login-suite.chrome" time="2.100" />
///   <testcase name="UC-3 ..." classname="login-suite.firefox" time="10.245">
///     <failure message="1 assertion(s) failed" type="AssertionFailure">Step 4: ...</failure>
///     <system-out>screenshot: screenshots/firefox_UC-3.png</system-out>
///   </testcase>
/// </testsuite>
/// ```
pub fn generate_junit_xml(report: &TestSuiteReport) -> String {
    let time_attr = report
        .duration_ms
        .map(|ms| format!(" time=\"{:.3}\"", ms as f64 / 1000.0))
        .unwrap_or_default();

    let mut cases = String::new();
    for result in &report.test_results {
        let classname = format!("login-suite.{}", result.browser.as_deref().unwrap_or("default"));
        let case_time = result
            .duration_ms
            .map(|ms| format!(" time=\"{:.3}\"", ms as f64 / 1000.0))
            .unwrap_or_default();

        if result.passed {
            cases.push_str(&format!(
                "  <testcase name=\"{}\" classname=\"{}\"{} />\n",
                escape_xml(&result.spec_name),
                escape_xml(&classname),
                case_time
            ));
        } else {
            let failed_assertions: Vec<String> = result
                .assertion_results
                .iter()
                .filter(|ar| !ar.passed)
                .map(|ar| {
                    let msg = ar.message.as_deref().unwrap_or("assertion failed");
                    format!("Step {}: {}", ar.step_index, msg)
                })
                .collect();

            let failure_count = failed_assertions.len();
            let error_detail = result
                .error
                .as_ref()
                .map(|e| format!("Error: {}", e))
                .unwrap_or_default();

            let mut body_parts = failed_assertions;
            if !error_detail.is_empty() {
                body_parts.push(error_detail);
            }
            let failure_body = body_parts.join("\n");

            let failure_message = if failure_count > 0 {
                format!("{} assertion(s) failed", failure_count)
            } else {
                "execution error".to_string()
            };

            let failure_type = if failure_count > 0 {
                "AssertionFailure"
            } else {
                "StepError"
            };

            let system_out = result
                .screenshot
                .as_ref()
                .map(|s| format!("    <system-out>screenshot: {}</system-out>\n", escape_xml(s)))
                .unwrap_or_default();

            cases.push_str(&format!(
                "  <testcase name=\"{name}\" classname=\"{classname}\"{time}>\n    <failure message=\"{message}\" type=\"{kind}\">{body}</failure>\n{system_out}  </testcase>\n",
                name = escape_xml(&result.spec_name),
                classname = escape_xml(&classname),
                time = case_time,
                message = escape_xml(&failure_message),
                kind = failure_type,
                body = escape_xml(&failure_body),
                system_out = system_out,
            ));
        }
    }

    format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<testsuite name=\"{name}\" tests=\"{tests}\" failures=\"{failures}\"{time}>\n{cases}</testsuite>\n",
        name = escape_xml(&report.suite_name),
        tests = report.total,
        failures = report.failed,
        time = time_attr,
        cases = cases,
    )
}

/// Escape XML special characters.
pub fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}
