use tracing::{debug, info, warn};

use crate::browser::driver::{Browser, SELECT_ALL_DELETE};
use crate::error::{SuiteError, SuiteResult};
use crate::fixtures::accounts::mask_secret;
use crate::page::element::Locator;
use crate::page::settings::PageSettings;
use crate::page::wait::{Poll, wait_until};

// ============================================================================
// FormField: text input with value verification
// ============================================================================

#[derive(Debug, Clone)]
pub struct FormField {
    pub locator: Locator,

    /// Mask the value in logs and errors
    pub secret: bool,
}

impl FormField {
    pub fn new(css: &str, name: &str) -> Self {
        Self {
            locator: Locator::new(css, name),
            secret: false,
        }
    }

    pub fn secret(mut self) -> Self {
        self.secret = true;
        self
    }

    fn shown<'v>(&self, value: &'v str) -> &'v str {
        if self.secret { mask_secret(value) } else { value }
    }

    /// Current DOM value of the field.
    pub fn value(&self, browser: &mut dyn Browser) -> SuiteResult<String> {
        match self.locator.first(browser)? {
            Some(el) => Ok(browser.value(&el)?),
            None => Ok(String::new()),
        }
    }

    /// Replace the field content with `value` and verify the DOM took it.
    pub fn enter_value(
        &self,
        browser: &mut dyn Browser,
        value: &str,
        settings: &PageSettings,
    ) -> SuiteResult<()> {
        let el = self.locator.wait_for_displayed(browser, settings.element_wait)?;
        browser.clear(&el)?;
        browser.send_keys(&el, value)?;
        browser.pause(settings.input_settle());

        let mut actual = browser.value(&el)?;
        if actual == value {
            return Ok(());
        }

        if settings.script_fallback {
            warn!(
                field = %self.locator.name,
                expected = self.shown(value),
                actual = self.shown(&actual),
                "value mismatch after typing, setting via script"
            );
            browser.set_value_by_script(&el, value)?;
            actual = browser.value(&el)?;
            if actual == value {
                return Ok(());
            }
        }

        debug!(field = %self.locator.name, "retyping after focus");
        browser.click(&el)?;
        browser.clear(&el)?;
        browser.send_keys(&el, value)?;
        browser.pause(settings.input_settle());
        actual = browser.value(&el)?;

        if actual == value {
            Ok(())
        } else {
            Err(SuiteError::ValueNotApplied {
                field: self.locator.name.clone(),
                expected: self.shown(value).to_string(),
                actual: self.shown(&actual).to_string(),
            })
        }
    }

    /// Empty the field the way a user would, then make sure it is empty.
    pub fn clear_field(&self, browser: &mut dyn Browser, settings: &PageSettings) -> SuiteResult<()> {
        let el = self.locator.wait_for_displayed(browser, settings.element_wait)?;
        browser.click(&el)?;
        browser.send_keys(&el, SELECT_ALL_DELETE)?;
        browser.clear(&el)?;

        let mut actual = browser.value(&el)?;
        if !actual.is_empty() && settings.script_fallback {
            warn!(field = %self.locator.name, "field not empty after clearing, clearing via script");
            browser.clear_by_script(&el)?;
            actual = browser.value(&el)?;
        }

        if actual.is_empty() {
            Ok(())
        } else {
            Err(SuiteError::ValueNotApplied {
                field: self.locator.name.clone(),
                expected: String::new(),
                actual: self.shown(&actual).to_string(),
            })
        }
    }
}

// ============================================================================
// Button: click with retry and script fallback
// ============================================================================

#[derive(Debug, Clone)]
pub struct Button {
    pub locator: Locator,
}

impl Button {
    pub fn new(css: &str, name: &str) -> Self {
        Self {
            locator: Locator::new(css, name),
        }
    }

    pub fn click(&self, browser: &mut dyn Browser, settings: &PageSettings) -> SuiteResult<()> {
        let what = format!("click {}", self.locator.name);
        let native = settings.retry.run(browser, &what, SuiteError::is_transient, |b| {
            self.locator.click(b, settings.element_wait)
        });

        // A script click only helps when the button was there to click.
        match native {
            Ok(()) => Ok(()),
            Err(e @ SuiteError::Browser(_)) if settings.script_fallback => {
                info!(button = %self.locator.name, "native click failed ({}), using script click", e);
                self.click_by_script(browser, settings)
            }
            Err(e) => Err(e),
        }
    }

    pub fn click_by_script(&self, browser: &mut dyn Browser, settings: &PageSettings) -> SuiteResult<()> {
        let el = self.locator.wait_for_displayed(browser, settings.element_wait)?;
        browser.click_by_script(&el)?;
        Ok(())
    }
}

// ============================================================================
// ErrorBanner: validation message shown under the form
// ============================================================================

#[derive(Debug, Clone)]
pub struct ErrorBanner {
    pub container: Locator,
    pub text: Locator,
}

impl ErrorBanner {
    pub fn new(container_css: &str, text_css: &str) -> Self {
        Self {
            container: Locator::new(container_css, "Error Message"),
            text: Locator::new(text_css, "Error Message Text"),
        }
    }

    /// The banner text, when the banner is shown with non-blank text.
    ///
    /// The container stays in the DOM while empty, so presence alone does
    /// not mean an error is displayed.
    pub fn message(&self, browser: &mut dyn Browser) -> Option<String> {
        if !self.container.is_displayed(browser) {
            return None;
        }

        if let Ok(Some(el)) = self.text.first(browser) {
            if let Ok(text) = browser.text(&el) {
                if !text.trim().is_empty() {
                    return Some(text.trim().to_string());
                }
            }
        }

        let el = self.container.first(browser).ok().flatten()?;
        let text = browser.text(&el).ok()?;
        let text = text.trim();
        (!text.is_empty()).then(|| text.to_string())
    }

    pub fn is_displayed(&self, browser: &mut dyn Browser) -> bool {
        self.message(browser).is_some()
    }

    /// Wait for the banner to show a message.
    pub fn read(&self, browser: &mut dyn Browser, poll: Poll) -> SuiteResult<String> {
        wait_until(browser, poll, "error message to appear", |b| Ok(self.message(b)))
    }
}
