use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

/// Headless Chrome flags used for CI runs.
pub const CHROME_HEADLESS_ARGS: &[&str] = &[
    "--headless",
    "--window-size=1920,1080",
    "--no-sandbox",
    "--disable-dev-shm-usage",
    "--disable-software-rasterizer",
    "--disable-extensions",
    "--disable-background-timer-throttling",
    "--disable-backgrounding-occluded-windows",
    "--disable-renderer-backgrounding",
    "--disable-features=TranslateUI",
    "--disable-ipc-flooding-protection",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BrowserKind {
    Chrome,
    Firefox,
}

impl BrowserKind {
    pub fn browser_name(&self) -> &'static str {
        match self {
            BrowserKind::Chrome => "chrome",
            BrowserKind::Firefox => "firefox",
        }
    }

    /// Where chromedriver / geckodriver listen by default.
    pub fn default_webdriver_url(&self) -> &'static str {
        match self {
            BrowserKind::Chrome => "http://localhost:9515",
            BrowserKind::Firefox => "http://localhost:4444",
        }
    }
}

impl fmt::Display for BrowserKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.browser_name())
    }
}

impl FromStr for BrowserKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "chrome" | "chromium" => Ok(BrowserKind::Chrome),
            "firefox" | "gecko" => Ok(BrowserKind::Firefox),
            other => Err(format!("unknown browser '{}'", other)),
        }
    }
}

/// One browser the suite runs against.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BrowserTarget {
    /// Label used in reports and screenshot names
    pub name: String,

    pub kind: BrowserKind,

    /// WebDriver endpoint, e.g. http://localhost:9515
    pub webdriver_url: String,

    #[serde(default = "default_true")]
    pub headless: bool,

    /// Extra browser command-line arguments
    #[serde(default)]
    pub args: Vec<String>,
}

fn default_true() -> bool { true }

impl BrowserTarget {
    pub fn new(kind: BrowserKind) -> Self {
        Self {
            name: kind.browser_name().to_string(),
            kind,
            webdriver_url: kind.default_webdriver_url().to_string(),
            headless: true,
            args: Vec::new(),
        }
    }

    pub fn with_webdriver_url(mut self, url: &str) -> Self {
        self.webdriver_url = url.to_string();
        self
    }

    pub fn with_headless(mut self, headless: bool) -> Self {
        self.headless = headless;
        self
    }

    /// Browser arguments after applying the headless preset.
    pub fn browser_args(&self) -> Vec<String> {
        let mut args: Vec<String> = Vec::new();
        if self.headless {
            match self.kind {
                BrowserKind::Chrome => {
                    args.extend(CHROME_HEADLESS_ARGS.iter().map(|a| a.to_string()))
                }
                BrowserKind::Firefox => args.push("--headless".to_string()),
            }
        }
        for extra in &self.args {
            if !args.contains(extra) {
                args.push(extra.clone());
            }
        }
        args
    }

    /// Body for `POST /session`.
    pub fn new_session_body(&self) -> Value {
        let args = self.browser_args();
        let always_match = match self.kind {
            BrowserKind::Chrome => json!({
                "browserName": "chrome",
                "goog:chromeOptions": { "args": args },
            }),
            BrowserKind::Firefox => json!({
                "browserName": "firefox",
                "moz:firefoxOptions": { "args": args },
            }),
        };
        json!({ "capabilities": { "alwaysMatch": always_match } })
    }
}

/// Chrome and Firefox on their default driver ports.
pub fn default_targets() -> Vec<BrowserTarget> {
    vec![
        BrowserTarget::new(BrowserKind::Chrome),
        BrowserTarget::new(BrowserKind::Firefox),
    ]
}
