use std::str::FromStr;

use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::browser::capabilities::{BrowserKind, BrowserTarget, default_targets};
use crate::browser::driver::SessionTimeouts;
use crate::page::settings::PageSettings;

pub const DEFAULT_CONFIG_FILE: &str = "login-suite.yaml";

// ============================================================================
// CLI Argument Parsing (clap derive)
// ============================================================================

#[derive(Parser, Debug)]
#[command(
    name = "login-suite",
    version,
    about = "End-to-end login checks for the Swag Labs demo store"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to config file (default: login-suite.yaml in current dir)
    #[arg(long, global = true)]
    pub config: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the login scenarios against the configured browsers
    Run {
        /// Scenario YAML file or directory (default: built-in scenarios)
        #[arg(long)]
        spec: Option<String>,

        /// Browser to run: chrome, firefox or all
        #[arg(long, default_value = "all")]
        browser: String,

        /// Output format: console, html, junit (default from config)
        #[arg(long)]
        format: Option<String>,

        /// Output file path (default: stdout)
        #[arg(short, long)]
        output: Option<String>,

        /// Override the WebDriver endpoint of every selected browser
        #[arg(long)]
        webdriver_url: Option<String>,

        /// Run browsers headless
        #[arg(long, action = clap::ArgAction::Set)]
        headless: Option<bool>,
    },

    /// List scenarios after outline expansion
    List {
        /// Scenario YAML file or directory (default: built-in scenarios)
        #[arg(long)]
        spec: Option<String>,
    },

    /// Show the fixture accounts with masked passwords
    Accounts,
}

// ============================================================================
// Config File Model (optional YAML)
// ============================================================================

/// Optional YAML config file: `login-suite.yaml`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_targets")]
    pub browsers: Vec<BrowserTarget>,

    /// Browser sessions running at the same time
    #[serde(default = "default_max_instances")]
    pub max_instances: usize,

    #[serde(default)]
    pub timeouts: SessionTimeouts,

    #[serde(default)]
    pub page: PageSettings,

    #[serde(default)]
    pub run: RunConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            browsers: default_targets(),
            max_instances: default_max_instances(),
            timeouts: SessionTimeouts::default(),
            page: PageSettings::default(),
            run: RunConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunConfig {
    #[serde(default = "default_console")]
    pub format: String,

    pub output: Option<String>,

    /// Where failure screenshots go
    #[serde(default = "default_screenshot_dir")]
    pub screenshot_dir: String,

    /// JSON-lines step journal; empty disables it
    #[serde(default = "default_trace_file")]
    pub trace_file: String,

    /// Per-request timeout for WebDriver HTTP calls
    #[serde(default = "default_http_timeout")]
    pub http_timeout_ms: u64,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            format: default_console(),
            output: None,
            screenshot_dir: default_screenshot_dir(),
            trace_file: default_trace_file(),
            http_timeout_ms: default_http_timeout(),
        }
    }
}

// Serde default helpers
fn default_max_instances() -> usize { 2 }
fn default_console() -> String { "console".to_string() }
fn default_screenshot_dir() -> String { "screenshots".to_string() }
fn default_trace_file() -> String { "logs/login-suite.jsonl".to_string() }
fn default_http_timeout() -> u64 { 180_000 }

// ============================================================================
// Config File Loading
// ============================================================================

/// Load config from a YAML file. Returns defaults if the file is missing or
/// malformed; a malformed file is reported as a warning.
pub fn load_config(path: Option<&str>) -> AppConfig {
    let config_path = path.unwrap_or(DEFAULT_CONFIG_FILE);
    match std::fs::read_to_string(config_path) {
        Ok(content) => parse_config(&content).unwrap_or_else(|e| {
            warn!("ignoring malformed config '{}': {}", config_path, e);
            AppConfig::default()
        }),
        Err(_) => AppConfig::default(),
    }
}

pub fn parse_config(content: &str) -> Result<AppConfig, serde_yaml::Error> {
    serde_yaml::from_str(content)
}

// ============================================================================
// Config Builders (merge CLI args with config file)
// ============================================================================

/// Pick the browser targets for a run.
///
/// `filter` is `all` or a browser kind. Targets of the requested kind come
/// from the config; if the config has none, one is made on the default
/// driver port.
pub fn select_targets(
    config: &AppConfig,
    filter: &str,
    webdriver_url: Option<&str>,
    headless: Option<bool>,
) -> Result<Vec<BrowserTarget>, String> {
    let mut targets = if filter.eq_ignore_ascii_case("all") {
        config.browsers.clone()
    } else {
        let kind = BrowserKind::from_str(filter)?;
        let matching: Vec<BrowserTarget> = config
            .browsers
            .iter()
            .filter(|t| t.kind == kind)
            .cloned()
            .collect();
        if matching.is_empty() {
            vec![BrowserTarget::new(kind)]
        } else {
            matching
        }
    };

    if targets.is_empty() {
        return Err("no browsers configured".to_string());
    }

    for target in &mut targets {
        if let Some(url) = webdriver_url {
            target.webdriver_url = url.to_string();
        }
        if let Some(h) = headless {
            target.headless = h;
        }
    }
    Ok(targets)
}
