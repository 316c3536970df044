use crate::fixtures::accounts::{
    EMPTY_CREDENTIALS, EXPECTED_TITLE, INVENTORY_PATH, TEMPORARY_CREDENTIALS,
};
use crate::spec::spec_model::{AssertionSpec, ExampleTable, Scenario, TestStep};

/// UC-1: both fields typed, then cleared, then submitted.
pub fn empty_credentials() -> Scenario {
    let (temp_user, temp_password) = TEMPORARY_CREDENTIALS;
    Scenario {
        name: "UC-1 Login with empty username and password".into(),
        feature: Some("Login Form - Empty Credentials".into()),
        tags: vec!["uc1".into(), "validation".into()],
        examples: None,
        steps: vec![
            TestStep::Open,
            TestStep::EnterUsername {
                value: temp_user.into(),
            },
            TestStep::EnterPassword {
                value: temp_password.into(),
            },
            TestStep::ClearUsername,
            TestStep::ClearPassword,
            TestStep::Pause { duration_ms: 500 },
            TestStep::ClickLogin,
            TestStep::Assert {
                assertions: vec![AssertionSpec::ErrorContains {
                    expected: EMPTY_CREDENTIALS.expected_error.into(),
                }],
            },
        ],
    }
}

/// UC-2: a username with the password left empty.
pub fn username_only() -> Scenario {
    Scenario {
        name: "UC-2 Login with username only: <description>".into(),
        feature: Some("Login Form - Username Only".into()),
        tags: vec!["uc2".into(), "validation".into()],
        examples: Some(ExampleTable::MissingPassword),
        steps: vec![
            TestStep::Open,
            TestStep::EnterUsername {
                value: "<username>".into(),
            },
            TestStep::ClearPassword,
            TestStep::ClickLogin,
            TestStep::Assert {
                assertions: vec![AssertionSpec::ErrorContains {
                    expected: "<expected_error>".into(),
                }],
            },
        ],
    }
}

/// UC-3: every valid account reaches the inventory view.
pub fn valid_credentials() -> Scenario {
    Scenario {
        name: "UC-3 Successful login: <description>".into(),
        feature: Some("Login Form - Valid Credentials".into()),
        tags: vec!["uc3".into(), "login".into()],
        examples: Some(ExampleTable::ValidAccounts),
        steps: vec![
            TestStep::Open,
            TestStep::EnterUsername {
                value: "<username>".into(),
            },
            TestStep::EnterPassword {
                value: "<password>".into(),
            },
            TestStep::ClickLogin,
            TestStep::Assert {
                assertions: vec![
                    AssertionSpec::LoggedIn,
                    AssertionSpec::ErrorAbsent,
                    AssertionSpec::TitleEquals {
                        expected: EXPECTED_TITLE.into(),
                    },
                    AssertionSpec::UrlContains {
                        expected: INVENTORY_PATH.into(),
                    },
                ],
            },
        ],
    }
}

/// The built-in suite, as outlines. Expand with `expand_all`.
pub fn builtin_scenarios() -> Vec<Scenario> {
    vec![empty_credentials(), username_only(), valid_credentials()]
}
