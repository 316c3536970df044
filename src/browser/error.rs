use thiserror::Error;

/// Failures talking to the browser: transport, wire format, or a WebDriver
/// error reply.
#[derive(Error, Debug)]
pub enum BrowserError {
    /// HTTP transport failed (driver not running, connection reset, timeout)
    #[error("HTTP error talking to WebDriver: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON (de)serialization of a WebDriver payload failed
    #[error("JSON error ({context}): {source}")]
    Json {
        context: String,
        source: serde_json::Error,
    },

    /// The driver answered with a W3C error object
    #[error("WebDriver '{command}' failed: {error}: {message}")]
    WebDriver {
        command: String,
        error: String,
        message: String,
    },

    /// The driver answered with something that is not the expected shape
    #[error("Unexpected WebDriver reply to '{command}': {message}")]
    Protocol { command: String, message: String },

    /// Screenshot payload could not be decoded
    #[error("Screenshot decode failed: {0}")]
    Screenshot(#[from] base64::DecodeError),

    /// The session was already deleted
    #[error("Browser session is closed")]
    SessionClosed,
}

impl BrowserError {
    /// W3C error code, if this came from the driver.
    pub fn code(&self) -> Option<&str> {
        match self {
            BrowserError::WebDriver { error, .. } => Some(error.as_str()),
            _ => None,
        }
    }

    /// True for element interaction failures that are worth retrying.
    pub fn is_transient(&self) -> bool {
        matches!(
            self.code(),
            Some(
                "element click intercepted"
                    | "element not interactable"
                    | "stale element reference"
                    | "no such element"
            )
        )
    }
}
