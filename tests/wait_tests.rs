mod common;

use std::time::Duration;

use login_suite::browser::error::BrowserError;
use login_suite::error::SuiteError;
use login_suite::page::wait::{Poll, RetryPolicy, wait_until};

use common::fake_site::FakeSite;

// ============================================================================
// Poll
// ============================================================================

#[test]
fn poll_attempts_cover_the_timeout() {
    assert_eq!(Poll::new(10_000, 500).attempts(), 21);
    assert_eq!(Poll::new(150_000, 2_000).attempts(), 76);
}

#[test]
fn zero_interval_still_waits_out_the_timeout() {
    let poll = Poll::new(1_000, 0);
    assert_eq!(poll.attempts(), 1_001);
    assert_eq!(poll.interval(), Duration::from_millis(1));

    let mut site = FakeSite::new();
    let err = wait_until::<()>(&mut site, Poll::new(20, 0), "never", |_| Ok(None)).unwrap_err();
    assert!(matches!(err, SuiteError::Timeout { timeout_ms: 20, .. }));
    assert_eq!(site.paused, Duration::from_millis(20));
}

#[test]
fn huge_timeout_does_not_overflow_attempts() {
    assert_eq!(Poll::new(u64::MAX, 1).attempts(), u64::MAX);
    assert_eq!(Poll::new(u64::MAX, 0).attempts(), u64::MAX);

    let poll: Poll = serde_yaml::from_str("timeout_ms: 18446744073709551615\ninterval_ms: 1\n").unwrap();
    let mut site = FakeSite::new();
    let mut calls = 0;
    let value = wait_until(&mut site, poll, "second call", |_| {
        calls += 1;
        Ok((calls == 2).then_some(calls))
    })
    .unwrap();
    assert_eq!(value, 2);
}

#[test]
fn wait_until_returns_first_value() {
    let mut site = FakeSite::new();
    let mut calls = 0;
    let value = wait_until(&mut site, Poll::new(1_000, 100), "third call", |_| {
        calls += 1;
        Ok((calls == 3).then_some(calls))
    })
    .unwrap();
    assert_eq!(value, 3);
    assert_eq!(site.paused, Duration::from_millis(200));
}

#[test]
fn wait_until_times_out_without_extra_pause() {
    let mut site = FakeSite::new();
    let err = wait_until::<()>(&mut site, Poll::new(300, 100), "never", |_| Ok(None)).unwrap_err();
    match err {
        SuiteError::Timeout { what, timeout_ms } => {
            assert_eq!(what, "never");
            assert_eq!(timeout_ms, 300);
        }
        other => panic!("unexpected error: {other}"),
    }
    // 4 checks, 3 pauses in between
    assert_eq!(site.paused, Duration::from_millis(300));
}

#[test]
fn wait_until_propagates_condition_errors() {
    let mut site = FakeSite::new();
    let err = wait_until::<()>(&mut site, Poll::new(1_000, 100), "broken", |_| {
        Err(SuiteError::UnknownAccount("ghost".into()))
    })
    .unwrap_err();
    assert!(matches!(err, SuiteError::UnknownAccount(_)));
    assert_eq!(site.paused, Duration::ZERO);
}

// ============================================================================
// RetryPolicy
// ============================================================================

#[test]
fn retry_delay_grows_by_factor() {
    let policy = RetryPolicy {
        max_attempts: 4,
        backoff_ms: 100,
        backoff_factor: 2.0,
    };
    assert_eq!(policy.delay_for(1), Duration::from_millis(100));
    assert_eq!(policy.delay_for(2), Duration::from_millis(200));
    assert_eq!(policy.delay_for(3), Duration::from_millis(400));
}

#[test]
fn retry_recovers_after_failures() {
    let mut site = FakeSite::new();
    let policy = RetryPolicy {
        max_attempts: 3,
        backoff_ms: 50,
        backoff_factor: 2.0,
    };
    let mut tries = 0;
    let result: Result<u32, String> = policy.run(&mut site, "flaky", |_| true, |_| {
        tries += 1;
        if tries < 3 { Err(format!("try {tries}")) } else { Ok(tries) }
    });
    assert_eq!(result, Ok(3));
    assert_eq!(site.paused, Duration::from_millis(150));
}

#[test]
fn retry_returns_last_error() {
    let mut site = FakeSite::new();
    let mut tries = 0;
    let result: Result<(), String> = RetryPolicy::default().run(&mut site, "always", |_| true, |_| {
        tries += 1;
        Err(format!("try {tries}"))
    });
    assert_eq!(result, Err("try 2".to_string()));
}

#[test]
fn retry_once_never_pauses() {
    let mut site = FakeSite::new();
    let result: Result<(), &str> = RetryPolicy::once().run(&mut site, "single", |_| true, |_| Err("no"));
    assert!(result.is_err());
    assert_eq!(site.paused, Duration::ZERO);
}

#[test]
fn retry_stops_at_first_final_error() {
    let mut site = FakeSite::new();
    let policy = RetryPolicy {
        max_attempts: 5,
        backoff_ms: 100,
        backoff_factor: 2.0,
    };
    let mut tries = 0;
    let result: Result<(), SuiteError> = policy.run(&mut site, "click", SuiteError::is_transient, |_| {
        tries += 1;
        Err(SuiteError::ElementNotFound {
            element: "Login Button".into(),
            timeout_ms: 10_000,
        })
    });
    assert!(matches!(result, Err(SuiteError::ElementNotFound { .. })));
    assert_eq!(tries, 1);
    assert_eq!(site.paused, Duration::ZERO);
}

#[test]
fn only_flaky_browser_errors_are_transient() {
    let intercepted = SuiteError::Browser(BrowserError::WebDriver {
        command: "click".into(),
        error: "element click intercepted".into(),
        message: "Other element would receive the click".into(),
    });
    let invalid_session = SuiteError::Browser(BrowserError::WebDriver {
        command: "click".into(),
        error: "invalid session id".into(),
        message: "session deleted".into(),
    });
    assert!(intercepted.is_transient());
    assert!(!invalid_session.is_transient());
    assert!(!SuiteError::Timeout { what: "x".into(), timeout_ms: 1 }.is_transient());
}

#[test]
fn retry_policy_factor_defaults_when_omitted() {
    let policy: RetryPolicy = serde_yaml::from_str("max_attempts: 3\nbackoff_ms: 100\n").unwrap();
    assert_eq!(policy.backoff_factor, 2.0);
}
