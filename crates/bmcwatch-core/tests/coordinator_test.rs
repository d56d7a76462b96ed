#![allow(clippy::unwrap_used)]

mod common;

use std::sync::Arc;
use std::time::Duration;

use bmcwatch_core::{
    AlertSink, Command, Coordinator, CoreError, FanModeType, Health, IndicatorLed, MergedSnapshot,
    connection_issue_id,
};
use pretty_assertions::assert_eq;
use tokio::time::{Instant, sleep};

use common::{RecordingSink, ScriptedClient};

fn coordinator(client: &Arc<ScriptedClient>, sink: &Arc<RecordingSink>) -> Coordinator {
    Coordinator::new("e1", client.clone(), sink.clone(), common::config())
}

fn watts(snapshot: &MergedSnapshot) -> Option<f64> {
    snapshot.power.power_control.first()?.power_consumed_watts
}

fn bios(snapshot: &MergedSnapshot) -> Option<&str> {
    snapshot.system.bios_version.as_deref()
}

// ── Static cache ─────────────────────────────────────────────────────

#[tokio::test(start_paused = true)]
async fn static_data_is_reused_until_max_age() {
    let client = ScriptedClient::new();
    let c = coordinator(&client, &RecordingSink::new());

    let first = c.refresh().await.unwrap();
    assert_eq!(client.static_calls(), 1);
    assert_eq!(bios(&first), Some("static-1"));

    sleep(Duration::from_secs(30)).await;
    let second = c.refresh().await.unwrap();
    assert_eq!(client.dynamic_calls(), 2);
    assert_eq!(client.static_calls(), 1);
    assert_eq!(watts(&second), Some(2.0));
    assert_eq!(bios(&second), Some("static-1"));

    sleep(Duration::from_secs(271)).await;
    let third = c.refresh().await.unwrap();
    assert_eq!(client.static_calls(), 2);
    assert_eq!(bios(&third), Some("static-2"));
}

#[tokio::test(start_paused = true)]
async fn forced_static_refresh_bypasses_cache() {
    let client = ScriptedClient::new();
    let c = coordinator(&client, &RecordingSink::new());

    c.refresh().await.unwrap();
    let forced = c.force_static_refresh().await.unwrap();
    assert_eq!(client.static_calls(), 2);
    assert_eq!(bios(&forced), Some("static-2"));

    // The force is consumed; the next cycle uses the cache again.
    c.refresh().await.unwrap();
    assert_eq!(client.static_calls(), 2);
}

#[tokio::test(start_paused = true)]
async fn status_reports_static_age() {
    let client = ScriptedClient::new();
    let c = coordinator(&client, &RecordingSink::new());
    assert_eq!(c.status().await.static_age_secs, None);

    c.refresh().await.unwrap();
    sleep(Duration::from_secs(42)).await;
    let status = c.status().await;
    assert!(status.has_snapshot);
    assert_eq!(status.static_age_secs, Some(42));
    assert_eq!(status.health, Health::Normal);
}

// ── Failure policy ───────────────────────────────────────────────────

#[tokio::test]
async fn third_connection_error_raises_issue() {
    let client = ScriptedClient::new();
    let sink = RecordingSink::new();
    let c = coordinator(&client, &sink);
    let issue_id = connection_issue_id("e1");
    for _ in 0..4 {
        client.fail_dynamic(common::connection_failed());
    }

    for expected in 1..=2 {
        let err = c.refresh().await.unwrap_err();
        assert!(err.is_connection());
        assert_eq!(c.consecutive_connection_errors(), expected);
        assert!(sink.registry.get(&issue_id).is_none());
        assert_eq!(c.health(), Health::Normal);
    }

    c.refresh().await.unwrap_err();
    let issue = sink.registry.get(&issue_id).unwrap();
    assert_eq!(issue.error_count, 3);
    assert_eq!(issue.host, common::HOST);
    assert_eq!(sink.raises(), 1);
    assert_eq!(c.health(), Health::Degraded);

    // Further failures update the same issue.
    c.refresh().await.unwrap_err();
    assert_eq!(sink.registry.len(), 1);
    assert_eq!(sink.registry.get(&issue_id).unwrap().error_count, 4);
}

#[tokio::test]
async fn success_resets_counter_but_issue_persists() {
    let client = ScriptedClient::new();
    let sink = RecordingSink::new();
    let c = coordinator(&client, &sink);
    let mut health = c.subscribe_health();
    for _ in 0..3 {
        client.fail_dynamic(common::connection_failed());
    }
    for _ in 0..3 {
        c.refresh().await.unwrap_err();
    }
    assert_eq!(*health.borrow_and_update(), Health::Degraded);

    c.refresh().await.unwrap();
    assert_eq!(c.consecutive_connection_errors(), 0);
    assert_eq!(*health.borrow_and_update(), Health::Normal);
    assert!(sink.registry.get(&connection_issue_id("e1")).is_some());

    // The count starts over: two failures do not re-raise, a third does.
    for _ in 0..3 {
        client.fail_dynamic(common::connection_failed());
    }
    c.refresh().await.unwrap_err();
    c.refresh().await.unwrap_err();
    assert_eq!(sink.raises(), 1);
    c.refresh().await.unwrap_err();
    assert_eq!(sink.raises(), 2);
}

#[tokio::test]
async fn static_fetch_connection_error_counts() {
    let client = ScriptedClient::new();
    let c = coordinator(&client, &RecordingSink::new());
    client.fail_static(common::connection_failed());

    let err = c.refresh().await.unwrap_err();
    assert!(err.is_connection());
    assert_eq!(c.consecutive_connection_errors(), 1);
    assert!(c.current_snapshot().is_none());
}

#[tokio::test]
async fn auth_error_requires_reauth_without_counting() {
    let client = ScriptedClient::new();
    let sink = RecordingSink::new();
    let c = coordinator(&client, &sink);
    client.fail_dynamic(common::auth_failed());

    let err = c.refresh().await.unwrap_err();
    assert!(matches!(err, CoreError::ReauthRequired { ref host, .. } if host == common::HOST));
    assert!(c.reauth_required());
    assert_eq!(c.consecutive_connection_errors(), 0);
    assert!(sink.registry.is_empty());
}

#[tokio::test]
async fn unexpected_error_leaves_counter_alone() {
    let client = ScriptedClient::new();
    let c = coordinator(&client, &RecordingSink::new());
    client.fail_dynamic(common::connection_failed());
    client.fail_dynamic(common::unexpected());

    c.refresh().await.unwrap_err();
    let err = c.refresh().await.unwrap_err();
    assert!(matches!(err, CoreError::RefreshFailed { .. }));
    assert_eq!(c.consecutive_connection_errors(), 1);
    assert!(!c.reauth_required());
}

#[tokio::test]
async fn failed_refresh_keeps_previous_snapshot() {
    let client = ScriptedClient::new();
    let c = coordinator(&client, &RecordingSink::new());

    let good = c.refresh().await.unwrap();
    client.fail_dynamic(common::connection_failed());
    c.refresh().await.unwrap_err();

    let current = c.current_snapshot().unwrap();
    assert!(Arc::ptr_eq(&current, &good));
}

#[tokio::test]
async fn failures_after_shutdown_do_not_alert() {
    let client = ScriptedClient::new();
    let sink = RecordingSink::new();
    let c = coordinator(&client, &sink);
    c.shutdown().await;
    for _ in 0..3 {
        client.fail_dynamic(common::connection_failed());
    }
    client.fail_dynamic(common::auth_failed());

    for _ in 0..3 {
        assert!(c.refresh().await.unwrap_err().is_connection());
    }
    c.refresh().await.unwrap_err();
    assert_eq!(c.consecutive_connection_errors(), 0);
    assert_eq!(sink.raises(), 0);
    assert_eq!(c.health(), Health::Normal);
    assert!(!c.reauth_required());
}

// ── Coalescing ───────────────────────────────────────────────────────

#[tokio::test(start_paused = true)]
async fn concurrent_refreshes_share_one_fetch() {
    let client = ScriptedClient::new();
    client.set_delay(Duration::from_secs(1));
    let c = coordinator(&client, &RecordingSink::new());

    let (a, b) = tokio::join!(c.refresh(), c.refresh());
    let (a, b) = (a.unwrap(), b.unwrap());
    assert!(Arc::ptr_eq(&a, &b));
    assert_eq!(client.dynamic_calls(), 1);
    assert_eq!(client.static_calls(), 1);

    // Once settled, the next request starts a new cycle.
    let c2 = c.refresh().await.unwrap();
    assert!(!Arc::ptr_eq(&a, &c2));
    assert_eq!(client.dynamic_calls(), 2);
}

#[tokio::test(start_paused = true)]
async fn coalesced_callers_share_the_error() {
    let client = ScriptedClient::new();
    client.set_delay(Duration::from_secs(1));
    client.fail_dynamic(common::connection_failed());
    let c = coordinator(&client, &RecordingSink::new());

    let (a, b) = tokio::join!(c.refresh(), c.refresh());
    assert!(a.unwrap_err().is_connection());
    assert!(b.unwrap_err().is_connection());
    // One cycle, one count.
    assert_eq!(c.consecutive_connection_errors(), 1);
}

// ── Burst mode ───────────────────────────────────────────────────────

#[tokio::test(start_paused = true)]
async fn burst_polls_fast_for_its_duration() {
    let client = ScriptedClient::new();
    let c = coordinator(&client, &RecordingSink::new());

    c.enable_burst_mode().await;
    assert!(c.burst_active().await);

    sleep(Duration::from_secs(61)).await;
    // Every 5s from t=5 through t=60.
    assert_eq!(client.dynamic_calls(), 12);
    assert_eq!(client.static_calls(), 1);
    assert!(!c.burst_active().await);

    sleep(Duration::from_secs(60)).await;
    assert_eq!(client.dynamic_calls(), 12);
}

#[tokio::test(start_paused = true)]
async fn reenabling_burst_restarts_the_window() {
    let client = ScriptedClient::new();
    let c = coordinator(&client, &RecordingSink::new());
    let t0 = Instant::now();

    c.enable_burst_mode().await;
    assert_eq!(c.burst_deadline().await, Some(t0 + Duration::from_secs(60)));

    sleep(Duration::from_secs(30)).await;
    c.enable_burst_mode().await;
    assert_eq!(c.burst_deadline().await, Some(t0 + Duration::from_secs(90)));

    sleep(Duration::from_secs(45)).await;
    assert!(c.burst_active().await);
    sleep(Duration::from_secs(20)).await;
    assert!(!c.burst_active().await);
    c.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn restarting_burst_keeps_inflight_refresh() {
    let client = ScriptedClient::new();
    let c = coordinator(&client, &RecordingSink::new());
    // Warm the static cache so only the dynamic fetch is slow.
    c.refresh().await.unwrap();
    client.set_delay(Duration::from_secs(3));

    c.enable_burst_mode().await;
    sleep(Duration::from_secs(6)).await;
    // The t=5 refresh is waiting on the BMC.
    assert_eq!(client.dynamic_calls(), 2);
    c.enable_burst_mode().await;

    sleep(Duration::from_secs(3)).await;
    assert_eq!(client.dynamic_calls(), 2);
    assert_eq!(watts(&c.current_snapshot().unwrap()), Some(2.0));
    c.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn burst_stops_when_reauth_required() {
    let client = ScriptedClient::new();
    client.fail_dynamic(common::auth_failed());
    let c = coordinator(&client, &RecordingSink::new());

    c.enable_burst_mode().await;
    sleep(Duration::from_secs(61)).await;
    assert!(c.reauth_required());
    assert_eq!(client.dynamic_calls(), 1);
}

#[tokio::test(start_paused = true)]
async fn shutdown_ends_burst_and_blocks_new_ones() {
    let client = ScriptedClient::new();
    let c = coordinator(&client, &RecordingSink::new());

    c.enable_burst_mode().await;
    sleep(Duration::from_secs(11)).await;
    c.shutdown().await;
    let calls = client.dynamic_calls();
    assert!(!c.burst_active().await);

    c.enable_burst_mode().await;
    sleep(Duration::from_secs(61)).await;
    assert_eq!(client.dynamic_calls(), calls);
    assert!(!c.burst_active().await);
}

// ── Commands ─────────────────────────────────────────────────────────

#[tokio::test(start_paused = true)]
async fn command_refetches_static_and_enters_burst() {
    let client = ScriptedClient::new();
    let c = coordinator(&client, &RecordingSink::new());
    c.refresh().await.unwrap();

    c.execute(Command::SetIndicatorLed(IndicatorLed::Lit))
        .await
        .unwrap();
    assert_eq!(
        client.executed.lock().unwrap().as_slice(),
        &[Command::SetIndicatorLed(IndicatorLed::Lit)]
    );
    assert_eq!(client.dynamic_calls(), 2);
    assert_eq!(client.static_calls(), 2);
    assert!(c.burst_active().await);
    c.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn fan_mode_command_keeps_static_cache() {
    let client = ScriptedClient::new();
    let c = coordinator(&client, &RecordingSink::new());
    c.refresh().await.unwrap();

    c.execute(Command::SetFanMode(FanModeType::FullSpeed))
        .await
        .unwrap();
    assert_eq!(client.dynamic_calls(), 2);
    assert_eq!(client.static_calls(), 1);
    c.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn rejected_command_skips_refresh() {
    let client = ScriptedClient::new();
    client.fail_execute(CoreError::Rejected {
        status: 400,
        message: "ActionParameterNotSupported".into(),
    });
    let c = coordinator(&client, &RecordingSink::new());

    let err = c
        .execute(Command::ResetIntrusionSensor)
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::Rejected { status: 400, .. }));
    assert_eq!(client.dynamic_calls(), 0);
    assert!(!c.burst_active().await);
}

#[tokio::test(start_paused = true)]
async fn failed_follow_up_refresh_still_reports_success() {
    let client = ScriptedClient::new();
    let c = coordinator(&client, &RecordingSink::new());
    client.fail_dynamic(common::connection_failed());

    c.execute(Command::SetFanMode(FanModeType::Standard))
        .await
        .unwrap();
    assert_eq!(c.consecutive_connection_errors(), 1);
    c.shutdown().await;
}

// ── Subscriptions and scheduling ─────────────────────────────────────

#[tokio::test]
async fn subscribers_see_published_snapshots() {
    let client = ScriptedClient::new();
    let c = coordinator(&client, &RecordingSink::new());
    let mut stream = c.subscribe();
    assert!(stream.current().is_none());

    let published = c.refresh().await.unwrap();
    let seen = stream.changed().await.unwrap();
    assert!(Arc::ptr_eq(&seen, &published));
}

#[tokio::test(start_paused = true)]
async fn polling_follows_scan_interval() {
    let client = ScriptedClient::new();
    let c = coordinator(&client, &RecordingSink::new());
    c.refresh().await.unwrap();

    c.start_polling().await;
    sleep(Duration::from_secs(29)).await;
    assert_eq!(client.dynamic_calls(), 1);
    sleep(Duration::from_secs(2)).await;
    assert_eq!(client.dynamic_calls(), 2);
    sleep(Duration::from_secs(30)).await;
    assert_eq!(client.dynamic_calls(), 3);

    c.shutdown().await;
    assert!(c.is_shut_down());
    sleep(Duration::from_secs(120)).await;
    assert_eq!(client.dynamic_calls(), 3);
}

#[tokio::test(start_paused = true)]
async fn polling_halts_on_auth_error() {
    let client = ScriptedClient::new();
    client.fail_dynamic(common::auth_failed());
    let c = coordinator(&client, &RecordingSink::new());

    c.start_polling().await;
    sleep(Duration::from_secs(150)).await;
    assert_eq!(client.dynamic_calls(), 1);
    assert!(c.reauth_required());
    c.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn polling_continues_through_connection_errors() {
    let client = ScriptedClient::new();
    let sink = RecordingSink::new();
    let c = coordinator(&client, &sink);
    for _ in 0..3 {
        client.fail_dynamic(common::connection_failed());
    }

    c.start_polling().await;
    sleep(Duration::from_secs(91)).await;
    assert_eq!(c.health(), Health::Degraded);
    sleep(Duration::from_secs(30)).await;
    assert_eq!(client.dynamic_calls(), 4);
    assert_eq!(c.health(), Health::Normal);
    assert!(c.current_snapshot().is_some());
    c.shutdown().await;
}
