use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use tracing::{error, info, warn};

use crate::browser::capabilities::BrowserTarget;
use crate::browser::driver::Browser;
use crate::browser::webdriver::WebDriverSession;
use crate::cli::config::{AppConfig, select_targets};
use crate::error::SuiteResult;
use crate::fixtures::accounts::{
    EMPTY_CREDENTIALS, MISSING_PASSWORD, VALID_ACCOUNTS, mask_secret,
};
use crate::report::console::format_console_report;
use crate::report::html::generate_html_report;
use crate::report::junit::generate_junit_xml;
use crate::report::report_model::TestSuiteReport;
use crate::spec::catalog::builtin_scenarios;
use crate::spec::runner::TestRunner;
use crate::spec::spec_model::{Scenario, TestResult, expand_all};
use crate::trace::logger::TraceLogger;

pub const SUITE_NAME: &str = "login-suite";

// ============================================================================
// run subcommand
// ============================================================================

/// Run the scenarios on every selected browser and return whether all passed.
#[allow(clippy::too_many_arguments)]
pub fn cmd_run(
    config: &AppConfig,
    spec_path: Option<&str>,
    browser: &str,
    format: Option<&str>,
    output: Option<&str>,
    webdriver_url: Option<&str>,
    headless: Option<bool>,
) -> Result<bool, Box<dyn std::error::Error>> {
    let scenarios = load_scenarios(spec_path)?;
    if scenarios.is_empty() {
        eprintln!("No scenarios found at: {}", spec_path.unwrap_or("<built-in>"));
        return Ok(true);
    }

    let targets = select_targets(config, browser, webdriver_url, headless)?;
    let trace = if config.run.trace_file.is_empty() {
        TraceLogger::disabled()
    } else {
        TraceLogger::new(&config.run.trace_file)
    };

    info!(
        scenarios = scenarios.len(),
        browsers = targets.len(),
        max_instances = config.max_instances,
        "starting run"
    );

    let start = Instant::now();
    let results = run_targets(config, &targets, &scenarios, &trace);
    let duration = start.elapsed().as_millis();

    let report = TestSuiteReport::from_results(SUITE_NAME, results).with_duration(duration);
    let all_passed = report.all_passed();

    let format = format.unwrap_or(config.run.format.as_str());
    let output_content = render_report(&report, format);

    match output.or(config.run.output.as_deref()) {
        Some(path) => {
            std::fs::write(path, &output_content)?;
            info!(path, "report written");
        }
        None => print!("{}", output_content),
    }

    Ok(all_passed)
}

/// Run every target, at most `max_instances` sessions at a time. Results
/// keep target order.
pub fn run_targets(
    config: &AppConfig,
    targets: &[BrowserTarget],
    scenarios: &[Scenario],
    trace: &TraceLogger,
) -> Vec<TestResult> {
    let mut results = Vec::new();
    for chunk in targets.chunks(config.max_instances.max(1)) {
        let chunk_results: Vec<Vec<TestResult>> = std::thread::scope(|scope| {
            let handles: Vec<_> = chunk
                .iter()
                .map(|target| scope.spawn(move || run_target(config, target, scenarios, trace)))
                .collect();

            handles
                .into_iter()
                .zip(chunk)
                .map(|(handle, target)| {
                    handle.join().unwrap_or_else(|_| {
                        not_run_all(scenarios, &target.name, "browser thread panicked")
                    })
                })
                .collect()
        });
        results.extend(chunk_results.into_iter().flatten());
    }
    results
}

/// Open one session on `target` and run all scenarios in it.
pub fn run_target(
    config: &AppConfig,
    target: &BrowserTarget,
    scenarios: &[Scenario],
    trace: &TraceLogger,
) -> Vec<TestResult> {
    let http_timeout = Duration::from_millis(config.run.http_timeout_ms);
    let mut session = match WebDriverSession::launch(target, http_timeout) {
        Ok(s) => s,
        Err(e) => {
            error!(browser = %target.name, "could not start browser session: {}", e);
            return not_run_all(scenarios, &target.name, &format!("Browser session failed: {}", e));
        }
    };

    info!(browser = %target.name, session = session.session_id(), "browser session started");

    if let Err(e) = session.set_timeouts(config.timeouts) {
        warn!(browser = %target.name, "could not set session timeouts: {}", e);
    }

    let results = run_on_browser(&mut session, &target.name, scenarios, config, trace);

    if let Err(e) = session.quit() {
        warn!(browser = %target.name, "failed to close session: {}", e);
    }
    results
}

/// Run scenarios serially on an already open browser, screenshotting each
/// failure into the configured directory.
pub fn run_on_browser(
    browser: &mut dyn Browser,
    label: &str,
    scenarios: &[Scenario],
    config: &AppConfig,
    trace: &TraceLogger,
) -> Vec<TestResult> {
    let runner = TestRunner::new(&config.page)
        .with_trace(trace)
        .with_browser_label(label);

    scenarios
        .iter()
        .map(|scenario| {
            let mut result = runner.run(scenario, browser);
            if !result.passed && !config.run.screenshot_dir.is_empty() {
                let dir = Path::new(&config.run.screenshot_dir);
                match capture_screenshot(browser, dir, label, &scenario.name) {
                    Ok(path) => result.screenshot = Some(path.display().to_string()),
                    Err(e) => warn!(scenario = %scenario.name, "screenshot failed: {}", e),
                }
            }
            result
        })
        .collect()
}

/// Save a PNG of the current page as `<dir>/<browser>_<scenario>.png`.
pub fn capture_screenshot(
    browser: &mut dyn Browser,
    dir: &Path,
    label: &str,
    scenario: &str,
) -> SuiteResult<PathBuf> {
    let png = browser.screenshot_png()?;
    std::fs::create_dir_all(dir)?;
    let path = dir.join(format!("{}_{}.png", sanitize_filename(label), sanitize_filename(scenario)));
    std::fs::write(&path, png)?;
    info!(path = %path.display(), "screenshot saved");
    Ok(path)
}

fn not_run_all(scenarios: &[Scenario], label: &str, reason: &str) -> Vec<TestResult> {
    scenarios
        .iter()
        .map(|s| TestResult::not_run(&s.name, Some(label), reason.to_string()))
        .collect()
}

/// Format a report as console text, HTML or JUnit XML.
pub fn render_report(report: &TestSuiteReport, format: &str) -> String {
    match format {
        "html" => generate_html_report(report),
        "junit" => generate_junit_xml(report),
        _ => format_console_report(report),
    }
}

// ============================================================================
// list / accounts subcommands
// ============================================================================

pub fn cmd_list(spec_path: Option<&str>) -> Result<(), Box<dyn std::error::Error>> {
    let scenarios = load_scenarios(spec_path)?;
    for scenario in &scenarios {
        let tags = if scenario.tags.is_empty() {
            String::new()
        } else {
            format!(" [{}]", scenario.tags.join(", "))
        };
        println!("{} ({} steps){}", scenario.name, scenario.steps.len(), tags);
    }
    println!("{} scenarios", scenarios.len());
    Ok(())
}

pub fn cmd_accounts() {
    println!("Valid accounts:");
    for account in VALID_ACCOUNTS {
        let slow = if account.slow { " (slow)" } else { "" };
        println!(
            "  {:<26} {:<4} {}{}",
            account.username,
            mask_secret(account.password),
            account.description,
            slow
        );
    }

    println!("Validation cases:");
    for case in std::iter::once(&EMPTY_CREDENTIALS).chain(MISSING_PASSWORD) {
        let username = if case.username.is_empty() { "N/A" } else { case.username };
        println!(
            "  {:<26} {:<4} {} -> \"{}\"",
            username,
            mask_secret(case.password),
            case.description,
            case.expected_error
        );
    }
}

// ============================================================================
// Scenario loading
// ============================================================================

/// Built-in scenarios or the ones at `path`, expanded and validated.
pub fn load_scenarios(path: Option<&str>) -> SuiteResult<Vec<Scenario>> {
    let outlines = match path {
        Some(p) => load_specs(p)?,
        None => builtin_scenarios(),
    };
    expand_all(&outlines)
}

/// Load scenarios from a single YAML file or a directory of YAML files.
pub fn load_specs(path: &str) -> SuiteResult<Vec<Scenario>> {
    let metadata = std::fs::metadata(path)?;
    if metadata.is_dir() {
        let mut specs = Vec::new();
        for entry in std::fs::read_dir(path)? {
            let p = entry?.path();
            if p.extension().is_some_and(|e| e == "yaml" || e == "yml") {
                let content = std::fs::read_to_string(&p)?;
                let spec: Scenario = serde_yaml::from_str(&content)?;
                specs.push(spec);
            }
        }
        // Sort by name for deterministic order
        specs.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(specs)
    } else {
        let content = std::fs::read_to_string(path)?;
        let spec: Scenario = serde_yaml::from_str(&content)?;
        Ok(vec![spec])
    }
}

/// Sanitize a name into a safe filename.
pub fn sanitize_filename(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect::<String>()
        .to_lowercase()
}
