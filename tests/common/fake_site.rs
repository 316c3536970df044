use std::time::Duration;

use serde_json::Value;

use login_suite::browser::driver::{
    Browser, ElementRef, SELECT_ALL_DELETE, SessionTimeouts, scripts,
};
use login_suite::browser::error::BrowserError;
use login_suite::fixtures::accounts::{ACCEPTED_USERNAMES, VALID_PASSWORD};
use login_suite::page::login_page::{
    APP_LOGO_CSS, ERROR_CONTAINER_CSS, ERROR_DISMISS_CSS, ERROR_TEXT_CSS, INVENTORY_CSS,
    LOGIN_BUTTON_CSS, PASSWORD_CSS, USERNAME_CSS,
};

pub const LOGIN_URL: &str = "https://www.saucedemo.com/";
pub const INVENTORY_URL: &str = "https://www.saucedemo.com/inventory.html";

const USERNAME_ID: &str = "el-username";
const PASSWORD_ID: &str = "el-password";
const BUTTON_ID: &str = "el-login";
const ERROR_CONTAINER_ID: &str = "el-error-container";
const ERROR_TEXT_ID: &str = "el-error-h3";
const ERROR_DISMISS_ID: &str = "el-error-button";
const LOGO_ID: &str = "el-logo";
const INVENTORY_ID: &str = "el-inventory";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
    Blank,
    Login,
    Inventory,
}

/// In-memory stand-in for the Swag Labs login page.
///
/// Applies the site's validation rules on submit and can be told to
/// misbehave the way real browsers do under load.
pub struct FakeSite {
    pub page: Page,
    pub username: String,
    pub password: String,
    pub error: Option<String>,

    /// Remaining `current_url` polls before a pending login lands
    pending_login: Option<u32>,

    // Knobs
    pub drop_keystrokes: u32,
    pub failing_clicks: u32,
    pub ignored_clicks: u32,
    pub sticky_error: bool,
    pub nav_delay_polls: u32,
    pub inventory_title: String,
    pub screenshot_fails: bool,
    pub unreachable: bool,

    // Records
    pub scripts: Vec<String>,
    pub navigations: usize,
    pub submits: usize,
    pub native_clicks: usize,
    pub dismissals: usize,
    pub paused: Duration,
    pub timeouts: Option<SessionTimeouts>,
    pub quit: bool,
}

impl FakeSite {
    pub fn new() -> Self {
        Self {
            page: Page::Blank,
            username: String::new(),
            password: String::new(),
            error: None,
            pending_login: None,
            drop_keystrokes: 0,
            failing_clicks: 0,
            ignored_clicks: 0,
            sticky_error: false,
            nav_delay_polls: 0,
            inventory_title: "Swag Labs".to_string(),
            screenshot_fails: false,
            unreachable: false,
            scripts: Vec::new(),
            navigations: 0,
            submits: 0,
            native_clicks: 0,
            dismissals: 0,
            paused: Duration::ZERO,
            timeouts: None,
            quit: false,
        }
    }

    /// Already sitting on the login form.
    pub fn on_login_page() -> Self {
        let mut site = Self::new();
        site.page = Page::Login;
        site
    }

    pub fn used_script(&self, script: &str) -> bool {
        self.scripts.iter().any(|s| s == script)
    }

    fn submit(&mut self) {
        self.submits += 1;
        if self.pending_login.is_some() {
            return;
        }

        let message = if self.username.is_empty() {
            Some("Epic sadface: Username is required")
        } else if self.password.is_empty() {
            Some("Epic sadface: Password is required")
        } else if self.username == "locked_out_user" && self.password == VALID_PASSWORD {
            Some("Epic sadface: Sorry, this user has been locked out.")
        } else if ACCEPTED_USERNAMES.contains(&self.username.as_str())
            && self.password == VALID_PASSWORD
        {
            None
        } else {
            Some("Epic sadface: Username and password do not match any user in this service")
        };

        match message {
            Some(m) => self.error = Some(m.to_string()),
            None if self.nav_delay_polls > 0 => self.pending_login = Some(self.nav_delay_polls),
            None => self.land_on_inventory(),
        }
    }

    fn land_on_inventory(&mut self) {
        self.pending_login = None;
        self.page = Page::Inventory;
        self.error = None;
    }

    fn field(&mut self, element: &ElementRef) -> Result<&mut String, BrowserError> {
        match (self.page, element.0.as_str()) {
            (Page::Login, USERNAME_ID) => Ok(&mut self.username),
            (Page::Login, PASSWORD_ID) => Ok(&mut self.password),
            _ => Err(stale(element)),
        }
    }

    fn on_page(&self, element: &ElementRef) -> bool {
        match self.page {
            Page::Blank => false,
            Page::Login => matches!(
                element.0.as_str(),
                USERNAME_ID | PASSWORD_ID | BUTTON_ID | ERROR_CONTAINER_ID
            ) || (matches!(element.0.as_str(), ERROR_TEXT_ID | ERROR_DISMISS_ID)
                && self.error.is_some()),
            Page::Inventory => matches!(element.0.as_str(), LOGO_ID | INVENTORY_ID),
        }
    }
}

impl Default for FakeSite {
    fn default() -> Self {
        Self::new()
    }
}

fn stale(element: &ElementRef) -> BrowserError {
    BrowserError::WebDriver {
        command: "element".into(),
        error: "stale element reference".into(),
        message: format!("{} is not attached to the page document", element.0),
    }
}

fn el(id: &str) -> ElementRef {
    ElementRef(id.to_string())
}

impl Browser for FakeSite {
    fn navigate(&mut self, url: &str) -> Result<(), BrowserError> {
        if self.unreachable {
            return Err(BrowserError::WebDriver {
                command: "navigate".into(),
                error: "unknown error".into(),
                message: "net::ERR_NAME_NOT_RESOLVED".into(),
            });
        }
        self.navigations += 1;
        self.pending_login = None;
        self.username.clear();
        self.password.clear();
        self.error = None;
        self.page = if url.contains("inventory") {
            Page::Inventory
        } else {
            Page::Login
        };
        Ok(())
    }

    fn current_url(&mut self) -> Result<String, BrowserError> {
        if let Some(left) = self.pending_login {
            if left <= 1 {
                self.land_on_inventory();
            } else {
                self.pending_login = Some(left - 1);
            }
        }
        Ok(match self.page {
            Page::Blank => "about:blank".to_string(),
            Page::Login => LOGIN_URL.to_string(),
            Page::Inventory => INVENTORY_URL.to_string(),
        })
    }

    fn title(&mut self) -> Result<String, BrowserError> {
        Ok(match self.page {
            Page::Blank => String::new(),
            Page::Login => "Swag Labs".to_string(),
            Page::Inventory => self.inventory_title.clone(),
        })
    }

    fn find_all(&mut self, css: &str) -> Result<Vec<ElementRef>, BrowserError> {
        let found = match (self.page, css) {
            (Page::Login, USERNAME_CSS) => vec![el(USERNAME_ID)],
            (Page::Login, PASSWORD_CSS) => vec![el(PASSWORD_ID)],
            (Page::Login, LOGIN_BUTTON_CSS) => vec![el(BUTTON_ID)],
            (Page::Login, ERROR_CONTAINER_CSS) => vec![el(ERROR_CONTAINER_ID)],
            (Page::Login, ERROR_TEXT_CSS) if self.error.is_some() => vec![el(ERROR_TEXT_ID)],
            (Page::Login, ERROR_DISMISS_CSS) if self.error.is_some() => vec![el(ERROR_DISMISS_ID)],
            (Page::Inventory, APP_LOGO_CSS) => vec![el(LOGO_ID)],
            (Page::Inventory, INVENTORY_CSS) => vec![el(INVENTORY_ID)],
            _ => Vec::new(),
        };
        Ok(found)
    }

    fn is_displayed(&mut self, element: &ElementRef) -> Result<bool, BrowserError> {
        if self.on_page(element) {
            Ok(true)
        } else {
            Err(stale(element))
        }
    }

    fn text(&mut self, element: &ElementRef) -> Result<String, BrowserError> {
        if !self.on_page(element) {
            return Err(stale(element));
        }
        Ok(match element.0.as_str() {
            ERROR_CONTAINER_ID | ERROR_TEXT_ID => self.error.clone().unwrap_or_default(),
            LOGO_ID => "Swag Labs".to_string(),
            _ => String::new(),
        })
    }

    fn value(&mut self, element: &ElementRef) -> Result<String, BrowserError> {
        Ok(self.field(element)?.clone())
    }

    fn send_keys(&mut self, element: &ElementRef, text: &str) -> Result<(), BrowserError> {
        let dropped = self.drop_keystrokes > 0;
        if dropped && text != SELECT_ALL_DELETE {
            self.drop_keystrokes -= 1;
        }
        let field = self.field(element)?;
        if text == SELECT_ALL_DELETE {
            field.clear();
        } else if !dropped {
            field.push_str(text);
        }
        Ok(())
    }

    fn clear(&mut self, element: &ElementRef) -> Result<(), BrowserError> {
        self.field(element)?.clear();
        Ok(())
    }

    fn click(&mut self, element: &ElementRef) -> Result<(), BrowserError> {
        if !self.on_page(element) {
            return Err(stale(element));
        }
        if element.0 == ERROR_DISMISS_ID {
            self.dismissals += 1;
            if !self.sticky_error {
                self.error = None;
            }
            return Ok(());
        }
        if element.0 != BUTTON_ID {
            return Ok(());
        }
        self.native_clicks += 1;
        if self.failing_clicks > 0 {
            self.failing_clicks -= 1;
            return Err(BrowserError::WebDriver {
                command: "click".into(),
                error: "element click intercepted".into(),
                message: "Other element would receive the click".into(),
            });
        }
        if self.ignored_clicks > 0 {
            self.ignored_clicks -= 1;
            return Ok(());
        }
        self.submit();
        Ok(())
    }

    fn execute(&mut self, script: &str, args: Vec<Value>) -> Result<Value, BrowserError> {
        self.scripts.push(script.to_string());
        let target = args
            .first()
            .and_then(ElementRef::from_wire)
            .ok_or_else(|| BrowserError::Protocol {
                command: "execute".into(),
                message: "missing element argument".into(),
            })?;

        if script == scripts::SET_VALUE {
            let value = args.get(1).and_then(Value::as_str).unwrap_or_default().to_string();
            *self.field(&target)? = value.clone();
            Ok(Value::String(value))
        } else if script == scripts::CLEAR_VALUE {
            self.field(&target)?.clear();
            Ok(Value::String(String::new()))
        } else if script == scripts::CLICK {
            if !self.on_page(&target) {
                return Err(stale(&target));
            }
            if target.0 == BUTTON_ID {
                self.submit();
            }
            Ok(Value::Null)
        } else {
            Ok(Value::Null)
        }
    }

    fn set_timeouts(&mut self, timeouts: SessionTimeouts) -> Result<(), BrowserError> {
        self.timeouts = Some(timeouts);
        Ok(())
    }

    fn screenshot_png(&mut self) -> Result<Vec<u8>, BrowserError> {
        if self.screenshot_fails {
            return Err(BrowserError::SessionClosed);
        }
        Ok(vec![0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A])
    }

    fn quit(&mut self) -> Result<(), BrowserError> {
        self.quit = true;
        Ok(())
    }

    fn pause(&mut self, duration: Duration) {
        self.paused += duration;
    }
}
