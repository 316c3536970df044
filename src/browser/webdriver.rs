use std::time::Duration;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use reqwest::Method;
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::browser::capabilities::BrowserTarget;
use crate::browser::driver::{Browser, ElementRef, SessionTimeouts};
use crate::browser::error::BrowserError;

/// Request body for a WebDriver command.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum WireRequest {
    NavigateTo {
        url: String,
    },
    FindElements {
        using: &'static str,
        value: String,
    },
    SendKeys {
        text: String,
    },
    ExecuteScript {
        script: String,
        args: Vec<Value>,
    },
    Timeouts {
        implicit: u64,
        #[serde(rename = "pageLoad")]
        page_load: u64,
        script: u64,
    },
    Empty {},
}

impl WireRequest {
    pub fn navigate(url: &str) -> Self {
        WireRequest::NavigateTo {
            url: url.to_string(),
        }
    }

    pub fn find_css(selector: &str) -> Self {
        WireRequest::FindElements {
            using: "css selector",
            value: selector.to_string(),
        }
    }

    pub fn send_keys(text: &str) -> Self {
        WireRequest::SendKeys {
            text: text.to_string(),
        }
    }

    pub fn execute(script: &str, args: Vec<Value>) -> Self {
        WireRequest::ExecuteScript {
            script: script.to_string(),
            args,
        }
    }

    pub fn timeouts(t: SessionTimeouts) -> Self {
        WireRequest::Timeouts {
            implicit: t.implicit_ms,
            page_load: t.page_load_ms,
            script: t.script_ms,
        }
    }

    pub fn empty() -> Self {
        WireRequest::Empty {}
    }
}

/// W3C error object found under `value` in failed replies.
#[derive(Debug, Deserialize)]
pub struct WireError {
    pub error: String,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub stacktrace: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WireReply {
    #[serde(default)]
    value: Value,
}

/// Turn a raw reply body into the `value` payload or a `BrowserError`.
pub fn parse_wire_reply(success: bool, body: &str, command: &str) -> Result<Value, BrowserError> {
    let reply: WireReply = serde_json::from_str(body).map_err(|e| BrowserError::Json {
        context: format!("{} reply", command),
        source: e,
    })?;

    if success {
        return Ok(reply.value);
    }

    match serde_json::from_value::<WireError>(reply.value) {
        Ok(err) => Err(BrowserError::WebDriver {
            command: command.to_string(),
            error: err.error,
            message: err.message,
        }),
        Err(_) => Err(BrowserError::Protocol {
            command: command.to_string(),
            message: format!("error reply without W3C error object: {}", body),
        }),
    }
}

/// Pull the element handles out of a find-elements reply.
pub fn parse_elements(value: &Value) -> Result<Vec<ElementRef>, BrowserError> {
    let items = value.as_array().ok_or_else(|| BrowserError::Protocol {
        command: "find_elements".into(),
        message: "expected an array of elements".into(),
    })?;
    items
        .iter()
        .map(|item| {
            ElementRef::from_wire(item).ok_or_else(|| BrowserError::Protocol {
                command: "find_elements".into(),
                message: format!("not an element reference: {}", item),
            })
        })
        .collect()
}

/// A live W3C WebDriver session (chromedriver, geckodriver, Selenium).
///
/// Every command is a blocking HTTP round trip. The session is deleted on
/// `quit()` or when dropped.
pub struct WebDriverSession {
    client: Client,
    endpoint: String,
    session_id: String,
    closed: bool,
}

impl WebDriverSession {
    /// Create a new browser session on the target's WebDriver endpoint.
    pub fn launch(target: &BrowserTarget, http_timeout: Duration) -> Result<Self, BrowserError> {
        let client = Client::builder().timeout(http_timeout).build()?;
        let endpoint = target.webdriver_url.trim_end_matches('/').to_string();

        debug!(browser = %target.name, endpoint = %endpoint, "creating WebDriver session");

        let response = client
            .post(format!("{}/session", endpoint))
            .json(&target.new_session_body())
            .send()?;
        let success = response.status().is_success();
        let body = response.text()?;
        let value = parse_wire_reply(success, &body, "new_session")?;

        let session_id = value["sessionId"]
            .as_str()
            .ok_or_else(|| BrowserError::Protocol {
                command: "new_session".into(),
                message: "no sessionId in reply".into(),
            })?
            .to_string();

        debug!(browser = %target.name, session = %session_id, "session started");

        Ok(WebDriverSession {
            client,
            endpoint,
            session_id,
            closed: false,
        })
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    /// Send a command and return its `value` payload.
    fn send(
        &self,
        method: Method,
        path: &str,
        body: Option<&WireRequest>,
        command: &str,
    ) -> Result<Value, BrowserError> {
        if self.closed {
            return Err(BrowserError::SessionClosed);
        }

        let url = format!("{}/session/{}{}", self.endpoint, self.session_id, path);
        let mut request = self.client.request(method, &url);
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send()?;
        let success = response.status().is_success();
        let text = response.text()?;
        parse_wire_reply(success, &text, command)
    }

    fn element_path(element: &ElementRef, suffix: &str) -> String {
        format!("/element/{}{}", element.0, suffix)
    }

    fn expect_string(value: Value, command: &str) -> Result<String, BrowserError> {
        match value {
            Value::String(s) => Ok(s),
            Value::Null => Ok(String::new()),
            other => Err(BrowserError::Protocol {
                command: command.into(),
                message: format!("expected a string, got {}", other),
            }),
        }
    }
}

impl Browser for WebDriverSession {
    fn navigate(&mut self, url: &str) -> Result<(), BrowserError> {
        self.send(Method::POST, "/url", Some(&WireRequest::navigate(url)), "navigate")?;
        Ok(())
    }

    fn current_url(&mut self) -> Result<String, BrowserError> {
        let value = self.send(Method::GET, "/url", None, "current_url")?;
        Self::expect_string(value, "current_url")
    }

    fn title(&mut self) -> Result<String, BrowserError> {
        let value = self.send(Method::GET, "/title", None, "title")?;
        Self::expect_string(value, "title")
    }

    fn find_all(&mut self, css: &str) -> Result<Vec<ElementRef>, BrowserError> {
        let value = self.send(
            Method::POST,
            "/elements",
            Some(&WireRequest::find_css(css)),
            "find_elements",
        )?;
        parse_elements(&value)
    }

    fn is_displayed(&mut self, element: &ElementRef) -> Result<bool, BrowserError> {
        let path = Self::element_path(element, "/displayed");
        let value = self.send(Method::GET, &path, None, "is_displayed")?;
        Ok(value.as_bool().unwrap_or(false))
    }

    fn text(&mut self, element: &ElementRef) -> Result<String, BrowserError> {
        let path = Self::element_path(element, "/text");
        let value = self.send(Method::GET, &path, None, "text")?;
        Self::expect_string(value, "text")
    }

    fn value(&mut self, element: &ElementRef) -> Result<String, BrowserError> {
        let path = Self::element_path(element, "/property/value");
        let value = self.send(Method::GET, &path, None, "value")?;
        Self::expect_string(value, "value")
    }

    fn send_keys(&mut self, element: &ElementRef, text: &str) -> Result<(), BrowserError> {
        let path = Self::element_path(element, "/value");
        self.send(Method::POST, &path, Some(&WireRequest::send_keys(text)), "send_keys")?;
        Ok(())
    }

    fn clear(&mut self, element: &ElementRef) -> Result<(), BrowserError> {
        let path = Self::element_path(element, "/clear");
        self.send(Method::POST, &path, Some(&WireRequest::empty()), "clear")?;
        Ok(())
    }

    fn click(&mut self, element: &ElementRef) -> Result<(), BrowserError> {
        let path = Self::element_path(element, "/click");
        self.send(Method::POST, &path, Some(&WireRequest::empty()), "click")?;
        Ok(())
    }

    fn execute(&mut self, script: &str, args: Vec<Value>) -> Result<Value, BrowserError> {
        self.send(
            Method::POST,
            "/execute/sync",
            Some(&WireRequest::execute(script, args)),
            "execute",
        )
    }

    fn set_timeouts(&mut self, timeouts: SessionTimeouts) -> Result<(), BrowserError> {
        self.send(
            Method::POST,
            "/timeouts",
            Some(&WireRequest::timeouts(timeouts)),
            "timeouts",
        )?;
        Ok(())
    }

    fn screenshot_png(&mut self) -> Result<Vec<u8>, BrowserError> {
        let value = self.send(Method::GET, "/screenshot", None, "screenshot")?;
        let encoded = Self::expect_string(value, "screenshot")?;
        Ok(STANDARD.decode(encoded.as_bytes())?)
    }

    fn quit(&mut self) -> Result<(), BrowserError> {
        if self.closed {
            return Ok(());
        }
        let url = format!("{}/session/{}", self.endpoint, self.session_id);
        let result = self.client.delete(&url).send();
        self.closed = true;
        result?;
        Ok(())
    }
}

impl Drop for WebDriverSession {
    fn drop(&mut self) {
        if let Err(e) = self.quit() {
            warn!(session = %self.session_id, "failed to delete WebDriver session: {}", e);
        }
    }
}
