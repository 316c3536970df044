use tracing::{info, warn};

use crate::browser::driver::Browser;
use crate::error::SuiteResult;
use crate::fixtures::accounts::mask_secret;
use crate::page::components::{Button, ErrorBanner, FormField};
use crate::page::element::Locator;
use crate::page::settings::{PageSettings, host_of, path_of};
use crate::page::wait::{Poll, wait_until};

// Fixed DOM of the Swag Labs login page.
pub const USERNAME_CSS: &str = "#user-name";
pub const PASSWORD_CSS: &str = "#password";
pub const LOGIN_BUTTON_CSS: &str = "#login-button";
pub const ERROR_CONTAINER_CSS: &str = ".error-message-container";
pub const ERROR_TEXT_CSS: &str = ".error-message-container h3";
pub const ERROR_DISMISS_CSS: &str = ".error-message-container .error-button";
pub const APP_LOGO_CSS: &str = ".app_logo";
pub const INVENTORY_CSS: &str = ".inventory_list, .inventory_container, #inventory_container";

/// Where a login attempt currently stands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginOutcome {
    /// Inventory view reached
    LoggedIn,

    /// Page shows a validation / credential error
    Rejected(String),

    /// Neither yet
    Pending,
}

/// Page object for the login form.
///
/// Borrows the browser for the duration of a test case and remembers the
/// last credentials typed so they can be restored if the page resets the
/// form before submit.
///
/// An error banner is only ever reported as the result of a submit when it
/// appeared after that submit. Banners left over from an earlier attempt
/// are dismissed, or remembered as stale when they cannot be.
pub struct LoginPage<'a> {
    browser: &'a mut dyn Browser,
    settings: &'a PageSettings,

    pub username: FormField,
    pub password: FormField,
    pub login_button: Button,
    pub error: ErrorBanner,
    pub error_dismiss: Locator,
    pub logo: Locator,
    pub inventory: Locator,

    last_username: Option<String>,
    last_password: Option<String>,

    /// Banner text that was already shown before the last click
    stale_error: Option<String>,
}

impl<'a> LoginPage<'a> {
    pub fn new(browser: &'a mut dyn Browser, settings: &'a PageSettings) -> Self {
        Self {
            browser,
            settings,
            username: FormField::new(USERNAME_CSS, "Username"),
            password: FormField::new(PASSWORD_CSS, "Password").secret(),
            login_button: Button::new(LOGIN_BUTTON_CSS, "Login Button"),
            error: ErrorBanner::new(ERROR_CONTAINER_CSS, ERROR_TEXT_CSS),
            error_dismiss: Locator::new(ERROR_DISMISS_CSS, "Error Dismiss Button"),
            logo: Locator::new(APP_LOGO_CSS, "Page Title"),
            inventory: Locator::new(INVENTORY_CSS, "Inventory"),
            last_username: None,
            last_password: None,
            stale_error: None,
        }
    }

    pub fn settings(&self) -> &PageSettings {
        self.settings
    }

    /// Direct access to the borrowed browser.
    pub fn browser(&mut self) -> &mut dyn Browser {
        &mut *self.browser
    }

    /// True when `url` is the login view of the configured target.
    pub fn is_login_url(&self, url: &str) -> bool {
        host_of(url) == self.settings.host()
            && matches!(path_of(url), "/" | "/index.html")
    }

    /// Navigate to the login page unless the browser is already on it with
    /// no error left from a previous attempt.
    pub fn open(&mut self) -> SuiteResult<()> {
        if let Ok(url) = self.browser.current_url() {
            if self.is_login_url(&url) && self.username.locator.exists(self.browser) {
                if self.dismiss_error() {
                    info!("already on login page, skipping navigation");
                    return Ok(());
                }
                info!("previous error banner would not close, reloading login page");
            }
        }

        info!(url = %self.settings.base_url, "navigating to login page");
        self.browser.navigate(&self.settings.base_url)?;
        self.stale_error = None;
        self.username
            .locator
            .wait_for_exists(self.browser, self.settings.page_ready)
    }

    pub fn enter_username(&mut self, username: &str) -> SuiteResult<()> {
        info!(username, "entering username");
        self.username.enter_value(self.browser, username, self.settings)?;
        self.last_username = Some(username.to_string());
        Ok(())
    }

    pub fn enter_password(&mut self, password: &str) -> SuiteResult<()> {
        info!(password = mask_secret(password), "entering password");
        self.password.enter_value(self.browser, password, self.settings)?;
        self.last_password = Some(password.to_string());
        Ok(())
    }

    pub fn clear_username(&mut self) -> SuiteResult<()> {
        self.username.clear_field(self.browser, self.settings)?;
        self.last_username = None;
        Ok(())
    }

    pub fn clear_password(&mut self) -> SuiteResult<()> {
        self.password.clear_field(self.browser, self.settings)?;
        self.last_password = None;
        Ok(())
    }

    /// Put back a remembered value the page dropped. Returns whether a
    /// restore happened.
    fn restore_if_reset(&mut self, username_field: bool) -> SuiteResult<bool> {
        let (field, remembered) = if username_field {
            (&self.username, self.last_username.as_deref())
        } else {
            (&self.password, self.last_password.as_deref())
        };
        let Some(expected) = remembered.filter(|v| !v.is_empty()) else {
            return Ok(false);
        };
        if !field.value(self.browser)?.is_empty() {
            return Ok(false);
        }

        warn!(field = %field.locator.name, "form value was reset before submit, restoring via script");
        if let Some(el) = field.locator.first(self.browser)? {
            self.browser.set_value_by_script(&el, expected)?;
        }
        Ok(true)
    }

    /// Close the error banner if one is shown. Returns whether the page is
    /// left without a banner.
    pub fn dismiss_error(&mut self) -> bool {
        if self.error.message(self.browser).is_none() {
            self.stale_error = None;
            return true;
        }

        info!("closing error banner from a previous attempt");
        if let Ok(Some(el)) = self.error_dismiss.first(self.browser) {
            if let Err(e) = self.browser.click(&el) {
                info!("error banner close failed: {}", e);
            }
        }

        let cleared = self.error.message(self.browser).is_none();
        if cleared {
            self.stale_error = None;
        }
        cleared
    }

    /// Banner text shown before the last submit that is still on screen.
    pub fn stale_error(&self) -> Option<&str> {
        self.stale_error.as_deref()
    }

    /// Click the login button, repairing the form and the click when the
    /// page does not react.
    pub fn submit(&mut self) -> SuiteResult<()> {
        if self.settings.script_fallback {
            self.restore_if_reset(true)?;
            self.restore_if_reset(false)?;
        }

        if !self.dismiss_error() {
            self.stale_error = self.error.message(self.browser);
            warn!(
                message = self.stale_error.as_deref().unwrap_or_default(),
                "error banner from a previous attempt is still shown"
            );
        }

        info!("clicking login button");
        self.login_button.click(self.browser, self.settings)?;
        self.browser.pause(self.settings.submit_settle());

        if self.settings.script_fallback && self.outcome() == LoginOutcome::Pending {
            // Best effort: the page may be navigating away under us.
            if let Ok(Some(el)) = self.login_button.locator.first(self.browser) {
                info!("click did not navigate or show an error, dispatching script click");
                if let Err(e) = self.browser.click_by_script(&el) {
                    info!("script click skipped: {}", e);
                }
                self.browser.pause(self.settings.submit_settle());
            }
        }
        Ok(())
    }

    pub fn login(&mut self, username: &str, password: &str) -> SuiteResult<()> {
        self.enter_username(username)?;
        self.enter_password(password)?;
        self.submit()
    }

    /// Error banner text, if an error is currently shown.
    pub fn error_message(&mut self) -> Option<String> {
        self.error.message(self.browser)
    }

    /// Error banner text, unless it is the stale one from before the last
    /// submit.
    pub fn fresh_error_message(&mut self) -> Option<String> {
        let text = self.error.message(self.browser)?;
        (self.stale_error.as_deref() != Some(text.as_str())).then_some(text)
    }

    pub fn is_error_displayed(&mut self) -> bool {
        self.error.is_displayed(self.browser)
    }

    /// Wait for the error banner and return its text.
    pub fn read_error(&mut self) -> SuiteResult<String> {
        let text = self.error.read(self.browser, self.settings.error_wait)?;
        info!(message = %text, "error message displayed");
        Ok(text)
    }

    /// One check of the login result. Browser errors and a stale banner
    /// count as pending.
    pub fn outcome(&mut self) -> LoginOutcome {
        check_outcome(
            self.browser,
            self.settings,
            &self.error,
            &self.inventory,
            self.stale_error.as_deref(),
        )
    }

    pub fn is_login_successful(&mut self) -> bool {
        self.outcome() == LoginOutcome::LoggedIn
    }

    /// Poll until the login resolves either way. `Pending` means the poll
    /// budget ran out.
    pub fn wait_for_outcome(&mut self, poll: Poll) -> LoginOutcome {
        let (settings, error, inventory) = (self.settings, &self.error, &self.inventory);
        let stale = self.stale_error.as_deref();
        wait_until(self.browser, poll, "login to resolve", |b| {
            match check_outcome(b, settings, error, inventory, stale) {
                LoginOutcome::Pending => Ok(None),
                done => Ok(Some(done)),
            }
        })
        .unwrap_or(LoginOutcome::Pending)
    }

    pub fn page_title(&mut self) -> SuiteResult<String> {
        Ok(self.browser.title()?)
    }

    pub fn current_url(&mut self) -> SuiteResult<String> {
        Ok(self.browser.current_url()?)
    }

    /// Text of the header logo on the inventory view.
    pub fn logo_text(&mut self) -> SuiteResult<String> {
        self.logo.text(self.browser, self.settings.element_wait)
    }
}

fn check_outcome(
    browser: &mut dyn Browser,
    settings: &PageSettings,
    error: &ErrorBanner,
    inventory: &Locator,
    stale_error: Option<&str>,
) -> LoginOutcome {
    let on_inventory = browser
        .current_url()
        .map(|url| url.contains("/inventory"))
        .unwrap_or(false);

    if on_inventory {
        let title_ok = browser
            .title()
            .map(|t| t == settings.expected_title)
            .unwrap_or(false);
        if title_ok || inventory.exists(browser) {
            return LoginOutcome::LoggedIn;
        }
        return LoginOutcome::Pending;
    }

    match error.message(browser) {
        Some(message) if stale_error != Some(message.as_str()) => LoginOutcome::Rejected(message),
        _ => LoginOutcome::Pending,
    }
}
