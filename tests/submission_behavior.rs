//! Behavior-driven tests for the guarded submission state machine and
//! the element resolver, all against the scripted browser fake.

use std::time::Duration;

use sakiyomi_tests::{fast_timeouts, test_profile, CountingDiagnosticSink, ScriptedPage};

use sakiyomi_core::{
    Credentials, ElementResolver, ForecastAmount, Selector, Stage, SubmissionMachine,
    SubmissionOutcome,
};

fn credentials() -> Credentials {
    Credentials::new("user@example.jp", "secret").expect("valid")
}

fn amount() -> ForecastAmount {
    ForecastAmount::from_price(50320.5).expect("valid")
}

fn ready_page() -> ScriptedPage {
    ScriptedPage::new()
        .with_visible(&Selector::css("#login"))
        .with_enabled(&Selector::css("#login"))
        .with_visible(&Selector::link_text("TOP"))
        .with_visible(&Selector::css("#major"))
        .with_visible(&Selector::css("#minor"))
        .with_visible(&Selector::css("#submit"))
        .with_body("forecast accepted")
}

// =============================================================================
// Happy path
// =============================================================================

#[tokio::test]
async fn full_sequence_succeeds_and_types_the_two_part_amount() {
    let page = ready_page();
    let sink = CountingDiagnosticSink::new();
    let machine =
        SubmissionMachine::new(&page, &sink, test_profile()).with_timeouts(fast_timeouts());

    let outcome = machine.run(&credentials(), &amount()).await;

    assert!(outcome.is_success());
    assert_eq!(sink.count(), 0, "no diagnostics on success");

    let actions = page.actions();
    assert!(actions.contains(&String::from("goto:https://forecast.test/login")));
    assert!(actions.contains(&String::from("type:css:#id=user@example.jp")));
    assert!(actions.contains(&String::from("type:css:#pw=secret")));
    assert!(actions.contains(&String::from("click:css:#login")));
    assert!(actions.contains(&String::from("click:link:TOP")));
    assert!(actions.contains(&String::from("type:css:#major=50320")));
    assert!(actions.contains(&String::from("type:css:#minor=50")));
    assert!(actions.contains(&String::from("click:css:#submit")));
}

#[tokio::test]
async fn minor_amount_is_always_typed_with_two_digits() {
    let page = ready_page();
    let sink = CountingDiagnosticSink::new();
    let machine =
        SubmissionMachine::new(&page, &sink, test_profile()).with_timeouts(fast_timeouts());

    let amount = ForecastAmount::from_price(50320.05).expect("valid");
    let outcome = machine.run(&credentials(), &amount).await;

    assert!(outcome.is_success());
    assert!(page.actions().contains(&String::from("type:css:#minor=05")));
}

// =============================================================================
// Failure semantics
// =============================================================================

#[tokio::test]
async fn login_control_never_enabling_fails_the_login_stage_with_a_timeout() {
    // End-to-end scenario: the login control stays disabled forever
    let page = ScriptedPage::new().with_visible(&Selector::css("#login"));
    let sink = CountingDiagnosticSink::new();
    let machine =
        SubmissionMachine::new(&page, &sink, test_profile()).with_timeouts(fast_timeouts());

    let outcome = machine.run(&credentials(), &amount()).await;

    match outcome {
        SubmissionOutcome::Failed(failure) => {
            assert_eq!(failure.stage, Stage::Login);
            assert!(
                failure.cause.contains("timed out"),
                "cause should name the timeout: {}",
                failure.cause
            );
        }
        SubmissionOutcome::Success => panic!("login must not succeed"),
    }

    // Diagnostics captured exactly once, labeled by the failing stage
    assert_eq!(sink.count(), 1);
    assert_eq!(sink.labels(), vec![String::from("login")]);
}

#[tokio::test]
async fn missing_top_link_fails_the_navigate_stage() {
    let page = ScriptedPage::new()
        .with_visible(&Selector::css("#login"))
        .with_enabled(&Selector::css("#login"));
    let sink = CountingDiagnosticSink::new();
    let machine =
        SubmissionMachine::new(&page, &sink, test_profile()).with_timeouts(fast_timeouts());

    let outcome = machine.run(&credentials(), &amount()).await;

    match outcome {
        SubmissionOutcome::Failed(failure) => {
            assert_eq!(failure.stage, Stage::Navigate);
            assert!(failure.cause.contains("top link"));
        }
        SubmissionOutcome::Success => panic!("navigation must not succeed"),
    }
    assert_eq!(sink.count(), 1);
}

#[tokio::test]
async fn missing_amount_fields_fail_the_fill_stage() {
    let page = ScriptedPage::new()
        .with_visible(&Selector::css("#login"))
        .with_enabled(&Selector::css("#login"))
        .with_visible(&Selector::link_text("TOP"));
    let sink = CountingDiagnosticSink::new();
    let machine =
        SubmissionMachine::new(&page, &sink, test_profile()).with_timeouts(fast_timeouts());

    let outcome = machine.run(&credentials(), &amount()).await;

    match outcome {
        SubmissionOutcome::Failed(failure) => assert_eq!(failure.stage, Stage::Fill),
        SubmissionOutcome::Success => panic!("fill must not succeed"),
    }
    assert_eq!(sink.count(), 1);
}

#[tokio::test]
async fn no_stage_is_attempted_after_the_first_failure() {
    // Login fails (control disabled); nothing downstream may run
    let page = ScriptedPage::new().with_visible(&Selector::css("#login"));
    let sink = CountingDiagnosticSink::new();
    let machine =
        SubmissionMachine::new(&page, &sink, test_profile()).with_timeouts(fast_timeouts());

    let _ = machine.run(&credentials(), &amount()).await;

    let actions = page.actions();
    assert!(!actions.iter().any(|a| a.starts_with("click:link:TOP")));
    assert!(!actions.iter().any(|a| a.starts_with("type:css:#major")));
    assert!(!actions.iter().any(|a| a.starts_with("click:css:#submit")));
}

// =============================================================================
// Ambiguous confirmation
// =============================================================================

#[tokio::test]
async fn missing_confirmation_tokens_still_yield_success() {
    // End-to-end scenario: the landing page shows none of the expected
    // tokens; the outcome is Success, not a failure
    let page = ready_page().with_body("ご利用ありがとうございます");
    let sink = CountingDiagnosticSink::new();
    let machine =
        SubmissionMachine::new(&page, &sink, test_profile()).with_timeouts(fast_timeouts());

    let outcome = machine.run(&credentials(), &amount()).await;

    assert!(outcome.is_success());
    assert_eq!(sink.count(), 0);
}

// =============================================================================
// Element resolution
// =============================================================================

#[tokio::test]
async fn resolver_prefers_earlier_candidates_when_both_match() {
    let a = Selector::css("#specific");
    let b = Selector::css("input[type='text']");
    let page = ScriptedPage::new().with_visible(&a).with_visible(&b);
    let resolver = ElementResolver::new(Duration::from_millis(100), Duration::from_millis(10));

    let resolved = resolver
        .resolve(&page, "amount field", &[a.clone(), b])
        .await
        .expect("no browser error");

    assert_eq!(resolved, Some(a));
}

#[tokio::test]
async fn resolver_falls_through_absent_candidates_to_the_generic_one() {
    let a = Selector::css("#specific");
    let b = Selector::css("input[type='text']");
    let page = ScriptedPage::new().with_visible(&b);
    let resolver = ElementResolver::new(Duration::from_millis(100), Duration::from_millis(10));

    let resolved = resolver
        .resolve(&page, "amount field", &[a, b.clone()])
        .await
        .expect("no browser error");

    assert_eq!(resolved, Some(b));
}

#[tokio::test]
async fn resolver_returns_none_when_nothing_matches_within_budget() {
    let page = ScriptedPage::new();
    let resolver = ElementResolver::new(Duration::from_millis(50), Duration::from_millis(10));

    let resolved = resolver
        .resolve(
            &page,
            "missing role",
            &[Selector::css("#a"), Selector::css("#b")],
        )
        .await
        .expect("no browser error");

    assert_eq!(resolved, None);
}
