//! Registration flow against a scripted session

mod common;

use autoex_common::seeded_rng;
use autoex_e2e::selectors::{data_qa, logged_in_as, text};
use autoex_e2e::{register_user, site, E2eError};
use common::{filled, Call, Failure, ScriptedSession};

#[tokio::test]
async fn registration_fills_the_fixed_profile_and_returns_credentials() {
    let mut session = ScriptedSession::new();
    let mut rng = seeded_rng(99);

    let creds = register_user(&mut session, &mut rng).await.unwrap();
    let calls = session.calls();

    assert_eq!(creds.username, "John Doe");
    assert!(creds.email.starts_with("john.doe"));
    assert!(creds.email.ends_with("@example.com"));
    assert_eq!(creds.password.len(), 10);
    assert!(creds.password.chars().all(|c| c.is_ascii_alphanumeric()));

    assert_eq!(calls.first(), Some(&Call::Goto("/".into())));
    assert_eq!(filled(&calls, r#"input[name="name"]"#).as_deref(), Some("John Doe"));
    assert_eq!(
        filled(&calls, &data_qa("input", "signup-email")),
        Some(creds.email.clone())
    );
    assert_eq!(
        filled(&calls, &data_qa("input", "password")),
        Some(creds.password.clone())
    );

    for (select, value) in [("days", "1"), ("months", "January"), ("years", "1990")] {
        assert!(
            calls.contains(&Call::Select(data_qa("select", select), value.into())),
            "missing {select}={value}"
        );
    }
    assert!(calls.contains(&Call::Check("input#newsletter".into())));
    assert!(calls.contains(&Call::Check("input#optin".into())));
    assert!(calls.contains(&Call::Select(
        data_qa("select", "country"),
        "United States".into()
    )));
    assert_eq!(
        filled(&calls, &data_qa("input", "zipcode")).as_deref(),
        Some("10001")
    );
    assert_eq!(
        filled(&calls, &data_qa("input", "mobile_number")).as_deref(),
        Some("1234567890")
    );
}

#[tokio::test]
async fn registration_steps_run_in_order_and_end_logged_in() {
    let mut session = ScriptedSession::new();
    let creds = register_user(&mut session, &mut seeded_rng(1)).await.unwrap();
    let calls = session.calls();

    let position = |call: &Call| calls.iter().position(|c| c == call).unwrap();
    let signup = position(&Call::Click(data_qa("button", "signup-button")));
    let info = position(&Call::ExpectVisible(text(site::ENTER_ACCOUNT_INFORMATION)));
    let create = position(&Call::Click(data_qa("button", "create-account")));
    let created = position(&Call::ExpectVisible(text(site::ACCOUNT_CREATED)));
    let cont = position(&Call::Click(data_qa("a", "continue-button")));

    assert!(signup < info && info < create && create < created && created < cont);
    assert_eq!(
        calls.last(),
        Some(&Call::ExpectVisible(logged_in_as(&creds.username)))
    );
}

#[tokio::test]
async fn missing_confirmation_still_returns_credentials() {
    let mut session =
        ScriptedSession::new().failing_on(&text(site::ACCOUNT_CREATED), Failure::Timeout);

    let err = register_user(&mut session, &mut seeded_rng(5))
        .await
        .unwrap_err();

    match &err {
        E2eError::VerificationTimeout { credentials, .. } => {
            assert!(credentials.email.starts_with("john.doe"));
            assert_eq!(credentials.password.len(), 10);
        }
        other => panic!("expected VerificationTimeout, got {other:?}"),
    }
    assert!(err.is_timeout());

    // Nothing runs after the failed confirmation, and nothing is retried
    let calls = session.calls();
    assert_eq!(
        calls.last(),
        Some(&Call::ExpectVisible(text(site::ACCOUNT_CREATED)))
    );
    let attempts = calls
        .iter()
        .filter(|c| **c == Call::Click(data_qa("button", "create-account")))
        .count();
    assert_eq!(attempts, 1);
}

#[tokio::test]
async fn interaction_failures_propagate_unchanged() {
    let mut session =
        ScriptedSession::new().failing_on(&data_qa("button", "signup-button"), Failure::Timeout);

    let err = register_user(&mut session, &mut seeded_rng(5))
        .await
        .unwrap_err();

    assert!(matches!(err, E2eError::Timeout(_)));
    assert!(err.credentials().is_none());
}

#[tokio::test]
async fn same_seed_registers_same_account() {
    let a = register_user(&mut ScriptedSession::new(), &mut seeded_rng(2024))
        .await
        .unwrap();
    let b = register_user(&mut ScriptedSession::new(), &mut seeded_rng(2024))
        .await
        .unwrap();
    assert_eq!(a, b);
}
