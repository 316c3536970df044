use crate::browser::driver::{Browser, ElementRef};
use crate::error::{SuiteError, SuiteResult};
use crate::page::wait::{Poll, wait_until};

/// A CSS locator with a human-readable name for messages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Locator {
    pub css: String,
    pub name: String,
}

impl Locator {
    pub fn new(css: &str, name: &str) -> Self {
        Self {
            css: css.to_string(),
            name: name.to_string(),
        }
    }

    /// First matching element, if any.
    pub fn first(&self, browser: &mut dyn Browser) -> SuiteResult<Option<ElementRef>> {
        Ok(browser.find_all(&self.css)?.into_iter().next())
    }

    pub fn exists(&self, browser: &mut dyn Browser) -> bool {
        matches!(self.first(browser), Ok(Some(_)))
    }

    /// Whether the first match is displayed. Lookup errors count as hidden.
    pub fn is_displayed(&self, browser: &mut dyn Browser) -> bool {
        match self.first(browser) {
            Ok(Some(el)) => browser.is_displayed(&el).unwrap_or(false),
            _ => false,
        }
    }

    /// Wait until the first match exists and is displayed, and return it.
    pub fn wait_for_displayed(
        &self,
        browser: &mut dyn Browser,
        poll: Poll,
    ) -> SuiteResult<ElementRef> {
        let what = format!("{} to be displayed", self.name);
        let waited = wait_until(browser, poll, &what, |b| {
            let Ok(Some(el)) = self.first(b) else {
                return Ok(None);
            };
            Ok(b.is_displayed(&el).unwrap_or(false).then_some(el))
        });

        match waited {
            Ok(el) => Ok(el),
            Err(SuiteError::Timeout { timeout_ms, .. }) => {
                if self.exists(browser) {
                    Err(SuiteError::ElementNotDisplayed {
                        element: self.name.clone(),
                        timeout_ms,
                    })
                } else {
                    Err(SuiteError::ElementNotFound {
                        element: self.name.clone(),
                        timeout_ms,
                    })
                }
            }
            Err(e) => Err(e),
        }
    }

    /// Wait until at least one match exists (visible or not).
    pub fn wait_for_exists(&self, browser: &mut dyn Browser, poll: Poll) -> SuiteResult<()> {
        let what = format!("{} to exist", self.name);
        wait_until(browser, poll, &what, |b| Ok(self.exists(b).then_some(())))
            .map_err(|_| SuiteError::ElementNotFound {
                element: self.name.clone(),
                timeout_ms: poll.timeout_ms,
            })
    }

    pub fn click(&self, browser: &mut dyn Browser, poll: Poll) -> SuiteResult<()> {
        let el = self.wait_for_displayed(browser, poll)?;
        browser.click(&el)?;
        Ok(())
    }

    pub fn text(&self, browser: &mut dyn Browser, poll: Poll) -> SuiteResult<String> {
        let el = self.wait_for_displayed(browser, poll)?;
        Ok(browser.text(&el)?)
    }
}
