use crate::report::report_model::TestSuiteReport;
use crate::spec::spec_model::TestResult;

const PASS_COLOR: &str = "#2e7d32";
const FAIL_COLOR: &str = "#c62828";

const STYLE: &str = "\
body { font-family: system-ui, sans-serif; margin: 0; background: #fafafa; color: #212121; }
header { color: #fff; padding: 16px 28px; }
header h1 { margin: 0; font-size: 22px; }
header p { margin: 4px 0 0; }
main { max-width: 960px; margin: 16px auto; padding: 0 16px; }
table { width: 100%; border-collapse: collapse; margin-bottom: 20px; background: #fff; }
th, td { text-align: left; padding: 6px 10px; border-bottom: 1px solid #e0e0e0; font-size: 14px; }
tr.pass td.status { color: #2e7d32; }
tr.fail td.status { color: #c62828; font-weight: bold; }
tr.detail td { background: #fff8f8; }
.error { color: #c62828; font-weight: bold; margin: 2px 0; }
.failures { margin: 2px 0; padding-left: 18px; color: #c62828; }
";

/// Self-contained HTML report: a per-browser summary table, then one table
/// of cases per browser. Failure screenshots are linked by path.
pub fn generate_html_report(report: &TestSuiteReport) -> String {
    let (color, status) = if report.all_passed() {
        (PASS_COLOR, "ALL TESTS PASSED")
    } else {
        (FAIL_COLOR, "SOME TESTS FAILED")
    };
    let suite = escape_html(&report.suite_name);
    let duration = report.duration_ms.map(seconds).map(|s| format!(" in {}", s)).unwrap_or_default();

    let mut body = String::new();
    body.push_str("<table class=\"summary\">\n<tr><th>Browser</th><th>Passed</th><th>Failed</th></tr>\n");
    for summary in report.by_browser() {
        body.push_str(&format!(
            "<tr><td>{}</td><td>{}</td><td>{}</td></tr>\n",
            escape_html(&summary.browser),
            summary.passed,
            summary.failed
        ));
    }
    body.push_str("</table>\n");

    for summary in report.by_browser() {
        let results = report
            .test_results
            .iter()
            .filter(|r| r.browser.as_deref().unwrap_or("-") == summary.browser);
        body.push_str(&browser_section(&summary.browser, results));
    }

    format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"UTF-8\">\n\
         <title>{suite} Test Report</title>\n<style>\n{STYLE}</style>\n</head>\n<body>\n\
         <header style=\"background: {color}\">\n<h1>{status}</h1>\n\
         <p>{suite}: {passed} passed, {failed} failed ({total} total){duration}</p>\n</header>\n\
         <main>\n{body}</main>\n</body>\n</html>\n",
        passed = report.passed,
        failed = report.failed,
        total = report.total,
    )
}

fn browser_section<'r>(browser: &str, results: impl Iterator<Item = &'r TestResult>) -> String {
    let mut out = format!(
        "<h2>Browser: {}</h2>\n<table class=\"cases\">\n\
         <tr><th></th><th>Scenario</th><th>Steps</th><th>Assertions</th><th>Time</th></tr>\n",
        escape_html(browser)
    );
    for result in results {
        out.push_str(&case_rows(result));
    }
    out.push_str("</table>\n");
    out
}

/// One summary row per case, plus a detail row when there is something to
/// show.
fn case_rows(result: &TestResult) -> String {
    let (class, marker) = if result.passed {
        ("pass", "\u{2713}")
    } else {
        ("fail", "\u{2717}")
    };
    let mut out = format!(
        "<tr class=\"{class}\"><td class=\"status\">{marker}</td><td>{name}</td><td>{steps}</td><td>{assertions}</td><td>{time}</td></tr>\n",
        name = escape_html(&result.spec_name),
        steps = result.steps_run,
        assertions = result.assertion_results.len(),
        time = result.duration_ms.map(seconds).unwrap_or_default(),
    );

    let mut detail = String::new();
    if let Some(error) = &result.error {
        detail.push_str(&format!("<p class=\"error\">Error: {}</p>\n", escape_html(error)));
    }
    let failed: Vec<_> = result.assertion_results.iter().filter(|a| !a.passed).collect();
    if !failed.is_empty() {
        detail.push_str("<ul class=\"failures\">\n");
        for a in failed {
            detail.push_str(&format!(
                "<li>Step {} {}: {}</li>\n",
                a.step_index,
                a.spec.kind(),
                escape_html(a.message.as_deref().unwrap_or("assertion failed"))
            ));
        }
        detail.push_str("</ul>\n");
    }
    if let Some(shot) = &result.screenshot {
        let path = escape_html(shot);
        detail.push_str(&format!("<p>Screenshot: <a href=\"{path}\">{path}</a></p>\n"));
    }

    if !detail.is_empty() {
        out.push_str(&format!("<tr class=\"detail\"><td></td><td colspan=\"4\">\n{detail}</td></tr>\n"));
    }
    out
}

fn seconds(ms: u128) -> String {
    format!("{:.1}s", ms as f64 / 1000.0)
}

fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}
