use serde::Serialize;
use tracing::info;

// ============================================================================
// Static fixture tables for the Swag Labs login page
// ============================================================================

pub const VALID_PASSWORD: &str = "secret_sauce";

/// Title shown by the inventory view after a successful login.
pub const EXPECTED_TITLE: &str = "Swag Labs";

pub const INVENTORY_PATH: &str = "/inventory.html";

pub const USERNAME_REQUIRED: &str = "Username is required";

pub const PASSWORD_REQUIRED: &str = "Password is required";

/// Every username the target page accepts.
pub const ACCEPTED_USERNAMES: &[&str] = &[
    "standard_user",
    "locked_out_user",
    "problem_user",
    "performance_glitch_user",
    "error_user",
    "visual_user",
];

/// A login account the suite knows how to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Account {
    pub username: &'static str,
    pub password: &'static str,
    pub description: &'static str,

    /// Login takes several seconds; waits are stretched for it
    pub slow: bool,
}

pub const VALID_ACCOUNTS: &[Account] = &[
    Account {
        username: "standard_user",
        password: VALID_PASSWORD,
        description: "Valid Standard User",
        slow: false,
    },
    Account {
        username: "problem_user",
        password: VALID_PASSWORD,
        description: "Valid Problem User",
        slow: false,
    },
    Account {
        username: "performance_glitch_user",
        password: VALID_PASSWORD,
        description: "Valid Performance Glitch User",
        slow: true,
    },
];

/// A credentials pair the page must reject with a validation message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ValidationCase {
    pub description: &'static str,
    pub username: &'static str,
    pub password: &'static str,
    pub expected_error: &'static str,
}

pub const EMPTY_CREDENTIALS: ValidationCase = ValidationCase {
    description: "Empty Credentials",
    username: "",
    password: "",
    expected_error: USERNAME_REQUIRED,
};

pub const MISSING_PASSWORD: &[ValidationCase] = &[
    ValidationCase {
        description: "Missing Password - Standard User",
        username: "standard_user",
        password: "",
        expected_error: PASSWORD_REQUIRED,
    },
    ValidationCase {
        description: "Missing Password - Problem User",
        username: "problem_user",
        password: "",
        expected_error: PASSWORD_REQUIRED,
    },
];

/// Typed into both fields and then cleared by the empty-credentials case.
pub const TEMPORARY_CREDENTIALS: (&str, &str) = ("test_user", "test_password");

// ============================================================================
// Lookups
// ============================================================================

pub fn find_account(username: &str) -> Option<&'static Account> {
    VALID_ACCOUNTS.iter().find(|a| a.username == username)
}

pub fn is_accepted(username: &str) -> bool {
    ACCEPTED_USERNAMES.contains(&username)
}

pub fn is_slow_account(username: &str) -> bool {
    find_account(username).is_some_and(|a| a.slow)
}

/// Render a secret for logs.
pub fn mask_secret(value: &str) -> &'static str {
    if value.is_empty() { "N/A" } else { "***" }
}

/// Log the data a test case is about to use.
pub fn log_case(name: &str, username: &str, password: &str, expected: &str) {
    info!(
        case = name,
        username = if username.is_empty() { "N/A" } else { username },
        password = mask_secret(password),
        expected = expected,
        "test data"
    );
}
