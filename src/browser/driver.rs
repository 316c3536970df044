use std::thread;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::browser::error::BrowserError;

/// W3C web element identifier key.
pub const ELEMENT_KEY: &str = "element-6066-11e4-a52e-4f735466cecf";

/// Key chord that selects the whole field content and deletes it
/// (Control + "a", then Delete, in WebDriver key codepoints).
pub const SELECT_ALL_DELETE: &str = "\u{E009}a\u{E000}\u{E017}";

// ============================================================================
// Scripts used by the script-backed fallbacks
// ============================================================================

pub mod scripts {
    /// `arguments[0]` = element, `arguments[1]` = value. Returns the new value.
    pub const SET_VALUE: &str = "const el = arguments[0]; const v = arguments[1]; \
el.value = v; el.setAttribute('value', v); \
['input', 'change'].forEach(t => el.dispatchEvent(new Event(t, { bubbles: true, cancelable: true }))); \
return el.value;";

    /// `arguments[0]` = element.
    pub const CLEAR_VALUE: &str = "const el = arguments[0]; el.value = ''; \
el.dispatchEvent(new Event('input', { bubbles: true })); return el.value;";

    /// `arguments[0]` = element.
    pub const CLICK: &str = "arguments[0].dispatchEvent(new MouseEvent('click', \
{ bubbles: true, cancelable: true, view: window }));";
}

/// Opaque handle to an element in the current page.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ElementRef(pub String);

impl ElementRef {
    /// Wire form used when passing the element as a script argument.
    pub fn to_wire(&self) -> Value {
        json!({ ELEMENT_KEY: self.0 })
    }

    /// Parse the wire form returned by find-element commands.
    pub fn from_wire(value: &Value) -> Option<Self> {
        value[ELEMENT_KEY].as_str().map(|id| ElementRef(id.to_string()))
    }
}

/// Session timeouts, in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionTimeouts {
    #[serde(default)]
    pub implicit_ms: u64,
    #[serde(default = "default_page_load")]
    pub page_load_ms: u64,
    #[serde(default = "default_script")]
    pub script_ms: u64,
}

impl Default for SessionTimeouts {
    fn default() -> Self {
        Self {
            implicit_ms: 0,
            page_load_ms: default_page_load(),
            script_ms: default_script(),
        }
    }
}

fn default_page_load() -> u64 { 30_000 }
fn default_script() -> u64 { 30_000 }

/// Primitive browser operations the page object is built on.
///
/// `WebDriverSession` implements this against a real driver; tests implement
/// it with an in-memory site.
pub trait Browser {
    fn navigate(&mut self, url: &str) -> Result<(), BrowserError>;

    fn current_url(&mut self) -> Result<String, BrowserError>;

    fn title(&mut self) -> Result<String, BrowserError>;

    /// All elements matching a CSS selector. Empty when nothing matches.
    fn find_all(&mut self, css: &str) -> Result<Vec<ElementRef>, BrowserError>;

    fn is_displayed(&mut self, element: &ElementRef) -> Result<bool, BrowserError>;

    fn text(&mut self, element: &ElementRef) -> Result<String, BrowserError>;

    /// Current DOM `value` property of an input.
    fn value(&mut self, element: &ElementRef) -> Result<String, BrowserError>;

    /// Type into an element. Appends to the existing value.
    fn send_keys(&mut self, element: &ElementRef, text: &str) -> Result<(), BrowserError>;

    fn clear(&mut self, element: &ElementRef) -> Result<(), BrowserError>;

    fn click(&mut self, element: &ElementRef) -> Result<(), BrowserError>;

    fn execute(&mut self, script: &str, args: Vec<Value>) -> Result<Value, BrowserError>;

    fn set_timeouts(&mut self, timeouts: SessionTimeouts) -> Result<(), BrowserError>;

    fn screenshot_png(&mut self) -> Result<Vec<u8>, BrowserError>;

    fn quit(&mut self) -> Result<(), BrowserError>;

    fn pause(&mut self, duration: Duration) {
        thread::sleep(duration);
    }

    /// Assign a value directly in the DOM and fire `input`/`change`.
    fn set_value_by_script(&mut self, element: &ElementRef, value: &str) -> Result<(), BrowserError> {
        self.execute(scripts::SET_VALUE, vec![element.to_wire(), Value::String(value.to_string())])?;
        Ok(())
    }

    fn clear_by_script(&mut self, element: &ElementRef) -> Result<(), BrowserError> {
        self.execute(scripts::CLEAR_VALUE, vec![element.to_wire()])?;
        Ok(())
    }

    /// Dispatch a bubbling click event instead of a native pointer click.
    fn click_by_script(&mut self, element: &ElementRef) -> Result<(), BrowserError> {
        self.execute(scripts::CLICK, vec![element.to_wire()])?;
        Ok(())
    }
}
