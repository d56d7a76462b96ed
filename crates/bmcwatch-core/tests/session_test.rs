#![allow(clippy::unwrap_used)]

mod common;

use std::sync::Arc;
use std::sync::atomic::Ordering;
use std::time::Duration;

use bmcwatch_core::{
    AlertSink, ConnectionState, CoreError, Credentials, RepairError, RepairFlow, Session,
    connection_issue_id,
};
use pretty_assertions::assert_eq;
use tokio::time::sleep;

use common::{FakeFactory, GOOD_PASSWORD, RecordingSink};

fn session(factory: &Arc<FakeFactory>, sink: &Arc<RecordingSink>, password: &str) -> Session {
    Session::new(
        "e1",
        common::connection(password),
        common::config(),
        common::factory_handle(factory),
        sink.clone(),
    )
}

// ── Start and stop ───────────────────────────────────────────────────

#[tokio::test(start_paused = true)]
async fn start_connects_and_loads_data() {
    let factory = FakeFactory::new();
    let s = session(&factory, &RecordingSink::new(), GOOD_PASSWORD);
    assert_eq!(s.state(), ConnectionState::Disconnected);

    let coordinator = s.start().await.unwrap();
    assert_eq!(s.state(), ConnectionState::Connected);
    assert!(coordinator.current_snapshot().is_some());
    assert_eq!(coordinator.entry_id(), "e1");

    let client = factory.last();
    assert_eq!(client.connect_calls.load(Ordering::SeqCst), 1);
    assert_eq!(client.dynamic_calls(), 1);

    // Scheduled polling is running.
    sleep(Duration::from_secs(31)).await;
    assert_eq!(client.dynamic_calls(), 2);
    s.stop().await;
}

#[tokio::test(start_paused = true)]
async fn stop_disconnects_and_halts_polling() {
    let factory = FakeFactory::new();
    let s = session(&factory, &RecordingSink::new(), GOOD_PASSWORD);
    let coordinator = s.start().await.unwrap();

    s.stop().await;
    assert_eq!(s.state(), ConnectionState::Disconnected);
    assert!(s.coordinator().await.is_none());
    assert!(coordinator.is_shut_down());

    let client = factory.last();
    assert_eq!(client.disconnect_calls.load(Ordering::SeqCst), 1);
    sleep(Duration::from_secs(120)).await;
    assert_eq!(client.dynamic_calls(), 1);
}

#[tokio::test]
async fn wrong_password_requires_reauth() {
    let factory = FakeFactory::new();
    let s = session(&factory, &RecordingSink::new(), "wrong");

    let err = s.start().await.unwrap_err();
    assert!(matches!(err, CoreError::ReauthRequired { .. }));
    assert_eq!(s.state(), ConnectionState::ReauthRequired);
    assert!(s.coordinator().await.is_none());
    assert_eq!(factory.last().disconnect_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn unreachable_bmc_is_not_ready() {
    let factory = FakeFactory::new();
    factory.set_reachable(false);
    let s = session(&factory, &RecordingSink::new(), GOOD_PASSWORD);

    let err = s.start().await.unwrap_err();
    assert!(matches!(err, CoreError::NotReady { ref host, .. } if host == common::HOST));
    assert_eq!(s.state(), ConnectionState::Failed);
    assert_eq!(factory.last().disconnect_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn first_refresh_failure_aborts_start() {
    let factory = FakeFactory::new();
    factory.fail_next_dynamic(common::connection_failed());
    let s = session(&factory, &RecordingSink::new(), GOOD_PASSWORD);

    let err = s.start().await.unwrap_err();
    assert!(matches!(err, CoreError::NotReady { .. }));
    assert_eq!(s.state(), ConnectionState::Failed);
    assert!(s.coordinator().await.is_none());

    // A later attempt builds a fresh client and succeeds.
    s.start().await.unwrap();
    assert_eq!(factory.built_count(), 2);
    assert_eq!(s.state(), ConnectionState::Connected);
    s.stop().await;
}

#[tokio::test]
async fn malformed_first_response_is_a_refresh_failure() {
    let factory = FakeFactory::new();
    factory.fail_next_dynamic(common::unexpected());
    let s = session(&factory, &RecordingSink::new(), GOOD_PASSWORD);

    let err = s.start().await.unwrap_err();
    assert!(matches!(err, CoreError::RefreshFailed { .. }));
    assert_eq!(s.state(), ConnectionState::Failed);
}

#[tokio::test(start_paused = true)]
async fn auth_error_while_polling_updates_state() {
    let factory = FakeFactory::new();
    let s = session(&factory, &RecordingSink::new(), GOOD_PASSWORD);
    let mut state = s.connection_state();
    s.start().await.unwrap();

    factory.last().fail_dynamic(common::auth_failed());
    sleep(Duration::from_secs(31)).await;
    assert_eq!(s.state(), ConnectionState::ReauthRequired);
    assert_eq!(*state.borrow_and_update(), ConnectionState::ReauthRequired);
    s.stop().await;
}

// ── Credentials ──────────────────────────────────────────────────────

#[tokio::test]
async fn reauthenticate_validates_before_changing_anything() {
    let factory = FakeFactory::new();
    let s = session(&factory, &RecordingSink::new(), GOOD_PASSWORD);
    s.start().await.unwrap();

    let err = s
        .reauthenticate(Credentials::new("ADMIN", "nope"))
        .await
        .unwrap_err();
    assert!(err.is_auth());
    assert_eq!(s.state(), ConnectionState::Connected);
    // Only the validation client was built.
    assert_eq!(factory.built_count(), 2);

    s.reauthenticate(Credentials::new("operator", GOOD_PASSWORD))
        .await
        .unwrap();
    assert_eq!(s.state(), ConnectionState::Connected);
    assert_eq!(s.connection().await.credentials.username, "operator");
    // Validation client plus the reloaded session client.
    assert_eq!(factory.built_count(), 4);
    s.stop().await;
}

#[tokio::test]
async fn reauth_after_wrong_password() {
    let factory = FakeFactory::new();
    let s = session(&factory, &RecordingSink::new(), "wrong");
    s.start().await.unwrap_err();

    s.reauthenticate(Credentials::new("ADMIN", GOOD_PASSWORD))
        .await
        .unwrap();
    assert_eq!(s.state(), ConnectionState::Connected);
    s.stop().await;
}

// ── Repair flow ──────────────────────────────────────────────────────

/// Start a session and let scheduled polling fail until the issue is raised.
async fn session_with_issue(factory: &Arc<FakeFactory>, sink: &Arc<RecordingSink>) -> Session {
    let s = session(factory, sink, GOOD_PASSWORD);
    s.start().await.unwrap();
    let client = factory.last();
    for _ in 0..3 {
        client.fail_dynamic(common::connection_failed());
    }
    sleep(Duration::from_secs(91)).await;
    assert!(sink.registry.get(&connection_issue_id("e1")).is_some());
    s
}

#[tokio::test(start_paused = true)]
async fn repair_requires_an_open_fixable_issue() {
    let factory = FakeFactory::new();
    let sink = RecordingSink::new();
    let s = session(&factory, &sink, GOOD_PASSWORD);

    let err = RepairFlow::for_session(s.clone()).err().unwrap();
    assert_eq!(
        err,
        RepairError::IssueNotFound {
            issue_id: "connection_failed_e1".into()
        }
    );
    assert_eq!(err.code(), "issue_not_found");

    // Another entry's issue cannot be repaired through this session.
    sink.registry
        .raise(bmcwatch_core::Issue::connection_failed("e2", "10.0.0.6", 3));
    let err = RepairFlow::new(s, connection_issue_id("e2")).err().unwrap();
    assert_eq!(err.code(), "not_fixable");
}

#[tokio::test(start_paused = true)]
async fn repair_with_bad_credentials_leaves_issue_open() {
    let factory = FakeFactory::new();
    let sink = RecordingSink::new();
    let s = session_with_issue(&factory, &sink).await;

    let flow = RepairFlow::for_session(s.clone()).unwrap();
    assert_eq!(flow.host().await, common::HOST);
    let err = flow
        .submit(Credentials::new("ADMIN", "still-wrong"))
        .await
        .unwrap_err();
    assert_eq!(err, RepairError::InvalidAuth);
    assert!(flow.issue().is_some());
    assert_eq!(s.connection().await.credentials.username, "ADMIN");

    factory.set_reachable(false);
    let err = flow
        .submit(Credentials::new("ADMIN", GOOD_PASSWORD))
        .await
        .unwrap_err();
    assert_eq!(err, RepairError::CannotConnect);
    assert!(flow.issue().is_some());
    s.stop().await;
}

#[tokio::test(start_paused = true)]
async fn repair_clears_issue_and_reloads() {
    let factory = FakeFactory::new();
    let sink = RecordingSink::new();
    let s = session_with_issue(&factory, &sink).await;
    let before = factory.built_count();

    let flow = RepairFlow::for_session(s.clone()).unwrap();
    let coordinator = flow
        .submit(Credentials::new("ADMIN", GOOD_PASSWORD))
        .await
        .unwrap();

    assert!(flow.issue().is_none());
    assert!(sink.registry.is_empty());
    assert_eq!(s.state(), ConnectionState::Connected);
    assert_eq!(coordinator.consecutive_connection_errors(), 0);
    // Validation client plus the reloaded session client.
    assert_eq!(factory.built_count(), before + 2);
    s.stop().await;
}

#[tokio::test(start_paused = true)]
async fn repair_during_failing_refresh_keeps_issue_cleared() {
    let factory = FakeFactory::new();
    let sink = RecordingSink::new();
    let s = session_with_issue(&factory, &sink).await;
    let old = factory.last();
    old.set_delay(Duration::from_secs(10));
    old.fail_dynamic(common::connection_failed());
    let calls = old.dynamic_calls();

    // The t=120 tick is still waiting on the BMC when the repair lands.
    sleep(Duration::from_secs(30)).await;
    assert_eq!(old.dynamic_calls(), calls + 1);

    let flow = RepairFlow::for_session(s.clone()).unwrap();
    let coordinator = flow
        .submit(Credentials::new("ADMIN", GOOD_PASSWORD))
        .await
        .unwrap();
    assert!(flow.issue().is_none());
    assert_eq!(sink.raises(), 1);

    sleep(Duration::from_secs(15)).await;
    assert!(sink.registry.get(&connection_issue_id("e1")).is_none());
    assert_eq!(sink.raises(), 1);
    assert_eq!(s.state(), ConnectionState::Connected);
    assert_eq!(coordinator.consecutive_connection_errors(), 0);
    s.stop().await;
}
