mod common;

use std::path::Path;

use clap::Parser;
use login_suite::browser::capabilities::{BrowserKind, BrowserTarget};
use login_suite::cli::commands::{
    capture_screenshot, load_scenarios, load_specs, render_report, run_on_browser,
    run_targets, sanitize_filename,
};
use login_suite::cli::config::{AppConfig, Cli, Commands, load_config, parse_config, select_targets};
use login_suite::report::report_model::TestSuiteReport;
use login_suite::spec::catalog::valid_credentials;
use login_suite::trace::logger::TraceLogger;

use common::fake_site::FakeSite;

// ============================================================================
// CLI Argument Parsing Tests
// ============================================================================

#[test]
fn cli_parse_run_defaults() {
    let cli = Cli::parse_from(["login-suite", "run"]);
    assert_eq!(cli.verbose, 0);
    assert!(cli.config.is_none());
    match cli.command {
        Commands::Run {
            spec,
            browser,
            format,
            output,
            webdriver_url,
            headless,
        } => {
            assert!(spec.is_none());
            assert_eq!(browser, "all");
            assert!(format.is_none());
            assert!(output.is_none());
            assert!(webdriver_url.is_none());
            assert!(headless.is_none());
        }
        _ => panic!("Expected Run command"),
    }
}

#[test]
fn cli_parse_run_all_options() {
    let cli = Cli::parse_from([
        "login-suite",
        "-vv",
        "--config",
        "ci.yaml",
        "run",
        "--spec",
        "scenarios",
        "--browser",
        "firefox",
        "--format",
        "junit",
        "-o",
        "report.xml",
        "--webdriver-url",
        "http://selenium:4444",
        "--headless",
        "false",
    ]);
    assert_eq!(cli.verbose, 2);
    assert_eq!(cli.config.as_deref(), Some("ci.yaml"));
    match cli.command {
        Commands::Run {
            spec,
            browser,
            format,
            output,
            webdriver_url,
            headless,
        } => {
            assert_eq!(spec.as_deref(), Some("scenarios"));
            assert_eq!(browser, "firefox");
            assert_eq!(format.as_deref(), Some("junit"));
            assert_eq!(output.as_deref(), Some("report.xml"));
            assert_eq!(webdriver_url.as_deref(), Some("http://selenium:4444"));
            assert_eq!(headless, Some(false));
        }
        _ => panic!("Expected Run command"),
    }
}

#[test]
fn cli_parse_list_and_accounts() {
    let cli = Cli::parse_from(["login-suite", "list", "--spec", "scenarios/uc1.yaml"]);
    assert!(matches!(cli.command, Commands::List { spec: Some(ref s) } if s == "scenarios/uc1.yaml"));

    let cli = Cli::parse_from(["login-suite", "accounts"]);
    assert!(matches!(cli.command, Commands::Accounts));
}

#[test]
fn cli_rejects_unknown_subcommand() {
    assert!(Cli::try_parse_from(["login-suite", "explore"]).is_err());
}

// ============================================================================
// Config File Tests
// ============================================================================

#[test]
fn config_defaults() {
    let config = AppConfig::default();
    assert_eq!(config.max_instances, 2);
    assert_eq!(config.browsers.len(), 2);
    assert_eq!(config.browsers[0].kind, BrowserKind::Chrome);
    assert_eq!(config.browsers[1].kind, BrowserKind::Firefox);
    assert_eq!(config.timeouts.implicit_ms, 0);
    assert_eq!(config.run.format, "console");
    assert_eq!(config.run.screenshot_dir, "screenshots");
    assert_eq!(config.run.trace_file, "logs/login-suite.jsonl");
    assert!(config.page.script_fallback);
    assert_eq!(config.page.base_url, "https://www.saucedemo.com/");
}

#[test]
fn config_partial_yaml_keeps_other_defaults() {
    let yaml = r#"
max_instances: 1
browsers:
  - name: chrome-grid
    kind: chrome
    webdriver_url: http://grid:4444/wd/hub
    args: ["--lang=en"]
page:
  script_fallback: false
  login_wait:
    timeout_ms: 20000
    interval_ms: 1000
run:
  format: junit
"#;
    let config = parse_config(yaml).unwrap();
    assert_eq!(config.max_instances, 1);
    assert_eq!(config.browsers.len(), 1);
    assert!(config.browsers[0].headless);
    assert_eq!(config.browsers[0].args, vec!["--lang=en".to_string()]);
    assert!(!config.page.script_fallback);
    assert_eq!(config.page.login_wait.timeout_ms, 20_000);
    assert_eq!(config.page.error_wait.timeout_ms, 5_000);
    assert_eq!(config.run.format, "junit");
    assert_eq!(config.run.screenshot_dir, "screenshots");
}

#[test]
fn config_missing_file_falls_back_to_defaults() {
    let config = load_config(Some("/nonexistent/login-suite.yaml"));
    assert_eq!(config.max_instances, 2);
}

#[test]
fn config_malformed_file_falls_back_to_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("login-suite.yaml");
    std::fs::write(&path, "max_instances: [not a number").unwrap();
    let config = load_config(path.to_str());
    assert_eq!(config.max_instances, 2);
}

#[test]
fn config_loaded_from_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("login-suite.yaml");
    std::fs::write(&path, "run:\n  screenshot_dir: out/shots\n").unwrap();
    let config = load_config(path.to_str());
    assert_eq!(config.run.screenshot_dir, "out/shots");
}

// ============================================================================
// Target selection
// ============================================================================

#[test]
fn select_all_targets_with_overrides() {
    let config = AppConfig::default();
    let targets = select_targets(&config, "all", Some("http://selenium:4444"), Some(false)).unwrap();
    assert_eq!(targets.len(), 2);
    assert!(targets.iter().all(|t| t.webdriver_url == "http://selenium:4444" && !t.headless));
}

#[test]
fn select_single_kind() {
    let config = AppConfig::default();
    let targets = select_targets(&config, "Firefox", None, None).unwrap();
    assert_eq!(targets.len(), 1);
    assert_eq!(targets[0].name, "firefox");
    assert_eq!(targets[0].webdriver_url, "http://localhost:4444");
}

#[test]
fn select_kind_missing_from_config_uses_default_target() {
    let config = AppConfig {
        browsers: vec![BrowserTarget::new(BrowserKind::Chrome)],
        ..AppConfig::default()
    };
    let targets = select_targets(&config, "firefox", None, None).unwrap();
    assert_eq!(targets, vec![BrowserTarget::new(BrowserKind::Firefox)]);
}

#[test]
fn select_rejects_unknown_browser_and_empty_config() {
    let config = AppConfig::default();
    assert_eq!(
        select_targets(&config, "safari", None, None).unwrap_err(),
        "unknown browser 'safari'"
    );

    let empty = AppConfig {
        browsers: Vec::new(),
        ..AppConfig::default()
    };
    assert!(select_targets(&empty, "all", None, None).is_err());
}

// ============================================================================
// Scenario loading
// ============================================================================

const UC1_YAML: &str = r#"
name: "UC-1 Empty credentials"
steps:
  - action: open
  - action: click_login
  - action: assert
    assertions:
      - type: error_contains
        expected: Username is required
"#;

const UC3_YAML: &str = r#"
name: "A valid login: <description>"
examples: valid_accounts
steps:
  - action: open
  - action: login
    account: "<username>"
  - action: assert
    assertions:
      - type: logged_in
"#;

#[test]
fn load_specs_from_directory_sorted_by_name() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("b.yaml"), UC1_YAML).unwrap();
    std::fs::write(dir.path().join("a.yml"), UC3_YAML).unwrap();
    std::fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

    let specs = load_specs(dir.path().to_str().unwrap()).unwrap();
    assert_eq!(specs.len(), 2);
    assert_eq!(specs[0].name, "A valid login: <description>");
    assert_eq!(specs[1].name, "UC-1 Empty credentials");
}

#[test]
fn load_scenarios_expands_outlines() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("uc3.yaml");
    std::fs::write(&path, UC3_YAML).unwrap();

    let scenarios = load_scenarios(path.to_str()).unwrap();
    assert_eq!(scenarios.len(), 3);
    assert_eq!(scenarios[2].name, "A valid login: Valid Performance Glitch User");
}

#[test]
fn load_scenarios_defaults_to_builtin() {
    assert_eq!(load_scenarios(None).unwrap().len(), 6);
}

#[test]
fn load_specs_missing_path_is_an_error() {
    assert!(load_specs("/nonexistent/scenarios").is_err());
}

#[test]
fn bundled_scenario_files_load() {
    let dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("scenarios");
    let scenarios = load_scenarios(dir.to_str()).unwrap();
    assert_eq!(scenarios.len(), 6);
}

// ============================================================================
// Running on a browser
// ============================================================================

fn test_config(screenshot_dir: &Path) -> AppConfig {
    let mut config = AppConfig::default();
    config.run.screenshot_dir = screenshot_dir.to_string_lossy().into_owned();
    config
}

#[test]
fn run_on_browser_screenshots_failures_only() {
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(dir.path());
    let scenarios = valid_credentials().expand().unwrap();

    let mut site = FakeSite::new();
    site.inventory_title = "Broken".into();
    let results = run_on_browser(&mut site, "chrome", &scenarios, &config, &TraceLogger::disabled());

    assert_eq!(results.len(), 3);
    for result in &results {
        assert!(!result.passed);
        let shot = result.screenshot.as_deref().expect("failure screenshot");
        assert!(shot.contains("chrome_uc-3_successful_login"));
        let bytes = std::fs::read(shot).unwrap();
        assert_eq!(&bytes[1..4], b"PNG");
    }

    let mut site = FakeSite::new();
    let results = run_on_browser(&mut site, "chrome", &scenarios, &config, &TraceLogger::disabled());
    assert!(results.iter().all(|r| r.passed && r.screenshot.is_none()));
}

#[test]
fn screenshot_failure_does_not_fail_the_run() {
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(dir.path());
    let scenarios = valid_credentials().expand().unwrap();

    let mut site = FakeSite::new();
    site.inventory_title = "Broken".into();
    site.screenshot_fails = true;
    let results = run_on_browser(&mut site, "firefox", &scenarios[..1], &config, &TraceLogger::disabled());
    assert!(!results[0].passed);
    assert!(results[0].screenshot.is_none());
}

#[test]
fn capture_screenshot_names_file_after_browser_and_scenario() {
    let dir = tempfile::tempdir().unwrap();
    let mut site = FakeSite::new();
    let path = capture_screenshot(&mut site, &dir.path().join("shots"), "chrome", "UC-1: Empty?").unwrap();
    assert_eq!(path.file_name().unwrap(), "chrome_uc-1__empty_.png");
    assert!(path.exists());
}

#[test]
fn unreachable_driver_marks_every_scenario_failed() {
    let config = AppConfig::default();
    let targets = vec![
        BrowserTarget::new(BrowserKind::Chrome).with_webdriver_url("http://127.0.0.1:9"),
        BrowserTarget::new(BrowserKind::Firefox).with_webdriver_url("http://127.0.0.1:9"),
    ];
    let scenarios = valid_credentials().expand().unwrap();

    let results = run_targets(&config, &targets, &scenarios, &TraceLogger::disabled());

    assert_eq!(results.len(), 6);
    assert!(results.iter().all(|r| !r.passed && r.steps_run == 0));
    assert_eq!(results[0].browser.as_deref(), Some("chrome"));
    assert_eq!(results[5].browser.as_deref(), Some("firefox"));
    assert!(results[0].error.as_deref().unwrap().starts_with("Browser session failed"));
}

#[test]
fn render_report_picks_format() {
    let report = TestSuiteReport::from_results("login-suite", Vec::new());
    assert!(render_report(&report, "junit").starts_with("<?xml"));
    assert!(render_report(&report, "html").starts_with("<!DOCTYPE html>"));
    assert!(render_report(&report, "console").starts_with("=== Test Suite"));
    assert!(render_report(&report, "anything").starts_with("=== Test Suite"));
}

// ============================================================================
// Utility Tests
// ============================================================================

#[test]
fn sanitize_filename_basic() {
    assert_eq!(sanitize_filename("UC-3 Successful login: Valid Standard User"), "uc-3_successful_login__valid_standard_user");
    assert_eq!(sanitize_filename("[chrome]"), "_chrome_");
}
