//! `bmcwatch status`: identity, power and health at a glance.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;

use bmcwatch_core::{CoordinatorStatus, Health, MergedSnapshot};

use crate::cli::GlobalOpts;
use crate::config::Target;
use crate::error::CliError;
use crate::output::{self, Tone};

use super::util;

#[derive(Debug, Serialize)]
pub struct StatusView {
    pub host: String,
    pub title: String,
    pub power_state: Option<String>,
    pub health: Option<String>,
    pub consumed_watts: Option<f64>,
    pub indicator_led: Option<String>,
    pub fan_mode: Option<String>,
    pub intrusion: bool,
    pub bios_version: Option<String>,
    pub bmc_firmware: Option<String>,
    pub static_fetched_at: DateTime<Utc>,
    pub dynamic_fetched_at: DateTime<Utc>,
    pub coordinator: CoordinatorStatus,
}

pub fn status_view(host: &str, snap: &MergedSnapshot, status: CoordinatorStatus) -> StatusView {
    StatusView {
        host: host.to_owned(),
        title: snap.title(host),
        power_state: snap.system.power_state.map(|s| s.to_string()),
        health: snap
            .system
            .status
            .as_ref()
            .and_then(|s| s.health_rollup.as_ref().or(s.health.as_ref()))
            .map(ToString::to_string),
        consumed_watts: snap.power.consumed_watts(),
        indicator_led: snap
            .system
            .indicator_led
            .or(snap.chassis.indicator_led)
            .map(|led| led.to_string()),
        fan_mode: snap
            .fan_mode
            .is_valid
            .then_some(snap.fan_mode.mode)
            .flatten()
            .map(|mode| {
                bmcwatch_core::entity::display_name(
                    bmcwatch_core::entity::FAN_MODE_NAMES,
                    &mode.to_string(),
                )
            }),
        intrusion: snap.chassis.is_intruded(),
        bios_version: snap.system.bios_version.clone(),
        bmc_firmware: snap.manager.firmware_version.clone(),
        static_fetched_at: snap.static_fetched_at,
        dynamic_fetched_at: snap.dynamic_fetched_at,
        coordinator: status,
    }
}

fn or_dash(value: Option<&str>) -> String {
    value.unwrap_or("-").to_owned()
}

fn detail(view: &StatusView, color: bool) -> String {
    let power_tone = match view.power_state.as_deref() {
        Some("On") => Tone::Good,
        Some("Off") => Tone::Muted,
        _ => Tone::Warn,
    };
    let health_tone = match view.health.as_deref() {
        Some("OK") => Tone::Good,
        Some("Warning") => Tone::Warn,
        Some(_) => Tone::Bad,
        None => Tone::Muted,
    };
    let link = match view.coordinator.health {
        Health::Normal => output::paint("normal", Tone::Good, color),
        Health::Degraded => output::paint(
            &format!(
                "degraded ({} consecutive failures)",
                view.coordinator.consecutive_connection_errors
            ),
            Tone::Bad,
            color,
        ),
    };
    let intrusion = if view.intrusion {
        output::paint("DETECTED", Tone::Bad, color)
    } else {
        "none".to_owned()
    };
    let static_age = view.coordinator.static_age_secs.map_or_else(
        || "-".to_owned(),
        |secs| humantime::format_duration(Duration::from_secs(secs)).to_string(),
    );

    output::detail_lines(&[
        ("BMC", format!("{} ({})", view.title, view.host)),
        (
            "Power",
            output::paint(&or_dash(view.power_state.as_deref()), power_tone, color),
        ),
        (
            "Health",
            output::paint(&or_dash(view.health.as_deref()), health_tone, color),
        ),
        (
            "Consumption",
            view.consumed_watts
                .map_or_else(|| "-".to_owned(), |w| format!("{w:.0} W")),
        ),
        ("Fan mode", or_dash(view.fan_mode.as_deref())),
        ("Indicator LED", or_dash(view.indicator_led.as_deref())),
        ("Intrusion", intrusion),
        ("BIOS", or_dash(view.bios_version.as_deref())),
        ("BMC firmware", or_dash(view.bmc_firmware.as_deref())),
        ("Connection", link),
        ("Static data age", static_age),
        (
            "Updated",
            view.dynamic_fetched_at
                .format("%Y-%m-%d %H:%M:%S UTC")
                .to_string(),
        ),
    ])
}

pub async fn handle(target: Target, global: &GlobalOpts) -> Result<(), CliError> {
    let view = util::with_coordinator(target, |coordinator| async move {
        let snap = util::snapshot_of(&coordinator)?;
        let status = coordinator.status().await;
        Ok(status_view(coordinator.host(), &snap, status))
    })
    .await?;

    let color = output::should_color(&global.color);
    let out = output::render_single(
        &global.output,
        &view,
        |v| detail(v, color),
        |v| or_dash(v.power_state.as_deref()),
    );
    output::print_output(&out, global.quiet);
    Ok(())
}
