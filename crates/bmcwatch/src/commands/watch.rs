//! `bmcwatch watch`: long-running polling with live output.
//!
//! Prints one line per published snapshot, reports the connection-failure
//! issue when it is raised, and with `--repair` walks the operator through
//! new credentials when the issue appears or the BMC rejects the login.

use std::io::IsTerminal;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use secrecy::ExposeSecret;
use serde::Serialize;

use bmcwatch_core::config::SCAN_INTERVAL;
use bmcwatch_core::entity::{FAN_MODE_NAMES, display_name};
use bmcwatch_core::{
    AlertSink, ConnectionState, Coordinator, CoordinatorStatus, Credentials, Health, Issue,
    IssueRegistry, MergedSnapshot, RepairError, RepairFlow, Session, connection_issue_id,
};

use crate::cli::{GlobalOpts, OutputFormat, WatchArgs};
use crate::config::Target;
use crate::error::CliError;
use crate::output::{self, Tone};

use super::util;

// ── Output line ──────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct WatchLine {
    pub at: DateTime<Utc>,
    pub power_state: Option<String>,
    pub consumed_watts: Option<f64>,
    pub max_temp_c: Option<f64>,
    pub fan_mode: Option<String>,
    pub health: Health,
    pub consecutive_connection_errors: u32,
    pub burst_active: bool,
}

pub fn watch_line(snap: &MergedSnapshot, status: &CoordinatorStatus) -> WatchLine {
    WatchLine {
        at: snap.dynamic_fetched_at,
        power_state: snap.system.power_state.map(|s| s.to_string()),
        consumed_watts: snap.power.consumed_watts(),
        max_temp_c: snap
            .thermal
            .temperatures
            .iter()
            .filter_map(|t| t.reading_celsius)
            .reduce(f64::max),
        fan_mode: snap
            .fan_mode
            .is_valid
            .then_some(snap.fan_mode.mode)
            .flatten()
            .map(|mode| display_name(FAN_MODE_NAMES, &mode.to_string())),
        health: status.health,
        consecutive_connection_errors: status.consecutive_connection_errors,
        burst_active: status.burst_active,
    }
}

fn render_line(line: &WatchLine, format: &OutputFormat, color: bool) -> String {
    match format {
        OutputFormat::Json | OutputFormat::JsonCompact | OutputFormat::Yaml => {
            output::render_json_compact(line)
        }
        OutputFormat::Table | OutputFormat::Plain => {
            let mut parts = vec![
                line.at.format("%H:%M:%S").to_string(),
                line.power_state.clone().unwrap_or_else(|| "-".into()),
                line.consumed_watts
                    .map_or_else(|| "- W".into(), |w| format!("{w:.0} W")),
                line.max_temp_c
                    .map_or_else(|| "max - °C".into(), |t| format!("max {t:.0} °C")),
            ];
            if let Some(ref mode) = line.fan_mode {
                parts.push(format!("fan {mode}"));
            }
            if line.burst_active {
                parts.push(output::paint("burst", Tone::Warn, color));
            }
            if line.health == Health::Degraded {
                parts.push(output::paint("degraded", Tone::Bad, color));
            }
            parts.join("  ")
        }
    }
}

// ── Handler ──────────────────────────────────────────────────────────

enum Event {
    Snapshot(Arc<MergedSnapshot>),
    Issues,
    State(ConnectionState),
    Stop,
}

pub async fn handle(target: Target, args: WatchArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let mut polling = target.polling;
    if let Some(secs) = args.scan_interval {
        polling.scan_interval = Duration::from_secs(SCAN_INTERVAL.validate(secs)?);
    }

    let issues = Arc::new(IssueRegistry::new());
    let session = Session::redfish(
        target.entry_id,
        target.connection,
        polling,
        Arc::clone(&issues) as Arc<dyn AlertSink>,
    );
    let profile = target.profile_name;
    let color = output::should_color(&global.color);
    let interactive = args.repair && std::io::stdin().is_terminal();

    let mut coordinator = match session.start().await {
        Ok(coordinator) => coordinator,
        Err(e) if e.is_auth() && interactive => {
            eprintln!("✗ {e}");
            prompt_reauth(&session, &profile).await?
        }
        Err(e) => return Err(e.into()),
    };
    if args.burst {
        coordinator.enable_burst_mode().await;
    }
    if !global.quiet {
        eprintln!(
            "Watching {} every {} (Ctrl-C to stop)",
            coordinator.host(),
            humantime::format_duration(polling.scan_interval)
        );
    }

    let mut snapshots = coordinator.subscribe();
    if let Some(snap) = snapshots.current().cloned() {
        print_snapshot(&coordinator, &snap, global, color).await;
    }
    let mut issue_rx = issues.subscribe();
    let mut state_rx = session.connection_state();
    let issue_id = connection_issue_id(session.entry_id());
    let mut issue_reported = false;

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        let event = tokio::select! {
            biased;
            _ = &mut ctrl_c => Event::Stop,
            snap = snapshots.changed() => snap.map_or(Event::Stop, Event::Snapshot),
            changed = issue_rx.changed() => match changed {
                Ok(()) => Event::Issues,
                Err(_) => Event::Stop,
            },
            changed = state_rx.changed() => match changed {
                Ok(()) => Event::State(*state_rx.borrow_and_update()),
                Err(_) => Event::Stop,
            },
        };

        match event {
            Event::Stop => break,
            Event::Snapshot(snap) => print_snapshot(&coordinator, &snap, global, color).await,
            Event::Issues => {
                let Some(issue) = issues.get(&issue_id) else {
                    issue_reported = false;
                    continue;
                };
                if issue_reported {
                    continue;
                }
                issue_reported = true;
                report_issue(&issue, color);

                if !interactive {
                    if args.repair {
                        eprintln!("  Repair needs an interactive terminal.");
                    }
                    continue;
                }
                if let Some(repaired) = run_repair(&session, &profile).await? {
                    coordinator = repaired;
                    snapshots = coordinator.subscribe();
                    issue_reported = false;
                    eprintln!("✓ Connection repaired");
                }
            }
            Event::State(ConnectionState::ReauthRequired) => {
                eprintln!(
                    "{} the BMC rejected the credentials; polling stopped",
                    output::paint("✗", Tone::Bad, color)
                );
                if !interactive {
                    session.stop().await;
                    return Err(CliError::AuthFailed {
                        message: "credentials rejected while polling".into(),
                    });
                }
                coordinator = prompt_reauth(&session, &profile).await?;
                snapshots = coordinator.subscribe();
            }
            Event::State(_) => {}
        }
    }

    session.stop().await;
    Ok(())
}

async fn print_snapshot(
    coordinator: &Coordinator,
    snap: &MergedSnapshot,
    global: &GlobalOpts,
    color: bool,
) {
    let status = coordinator.status().await;
    let line = watch_line(snap, &status);
    output::print_output(&render_line(&line, &global.output, color), global.quiet);
}

fn report_issue(issue: &Issue, color: bool) {
    eprintln!(
        "{} cannot reach {} ({} consecutive failures)",
        output::paint("⚠", Tone::Bad, color),
        issue.host,
        issue.error_count
    );
}

// ── Credential recovery ──────────────────────────────────────────────

/// Ask for credentials until the BMC accepts them or the operator gives up.
async fn prompt_reauth(session: &Session, profile: &str) -> Result<Coordinator, CliError> {
    let connection = session.connection().await;
    loop {
        let credentials =
            util::prompt_credentials(&connection.host, &connection.credentials.username)?;
        match session.reauthenticate(credentials.clone()).await {
            Ok(coordinator) => {
                persist_credentials(profile, &credentials)?;
                return Ok(coordinator);
            }
            Err(e) if e.is_auth() => {
                eprintln!("✗ {e}");
                if !util::confirm("Try again?", "reauthenticate", false)? {
                    return Err(e.into());
                }
            }
            Err(e) => return Err(e.into()),
        }
    }
}

/// Guided repair of the connection-failure issue. `None` when the operator
/// declines.
async fn run_repair(session: &Session, profile: &str) -> Result<Option<Coordinator>, CliError> {
    let flow = RepairFlow::for_session(session.clone())?;
    let host = flow.host().await;
    let username = session.connection().await.credentials.username;

    loop {
        if !util::confirm(
            &format!("Update the connection settings for {host}?"),
            "repair",
            false,
        )? {
            return Ok(None);
        }
        let credentials = util::prompt_credentials(&host, &username)?;
        match flow.submit(credentials.clone()).await {
            Ok(coordinator) => {
                persist_credentials(profile, &credentials)?;
                return Ok(Some(coordinator));
            }
            Err(e @ (RepairError::InvalidAuth | RepairError::CannotConnect)) => {
                eprintln!("✗ {e}");
            }
            Err(e) => return Err(e.into()),
        }
    }
}

/// Offer to save accepted credentials to the keyring and profile.
fn persist_credentials(profile: &str, credentials: &Credentials) -> Result<(), CliError> {
    if !util::confirm(
        &format!("Save the new credentials to profile '{profile}'?"),
        "save credentials",
        false,
    )? {
        return Ok(());
    }
    bmcwatch_config::store_password(profile, credentials.password.expose_secret())?;

    let mut cfg = bmcwatch_config::load_config()?;
    if let Some(p) = cfg.profiles.get_mut(profile) {
        if p.username.as_deref() != Some(credentials.username.as_str()) {
            p.username = Some(credentials.username.clone());
            bmcwatch_config::save_config(&cfg)?;
        }
    }
    eprintln!("✓ Credentials saved for profile '{profile}'");
    Ok(())
}
