// ── Merged snapshot ──
//
// The externally visible state: a flat, field-wise combination of the
// latest static and dynamic snapshots. `merge` is pure; nothing here looks
// at earlier merges or the clock.

use bmcwatch_api::models::{
    Chassis, ComputerSystem, DynamicSnapshot, FanMode, License, Lldp, Manager, NetworkProtocol,
    Ntp, Power, Snooping, StaticSnapshot, Thermal,
};
use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MergedSnapshot {
    // ── From the static snapshot ──
    pub system: ComputerSystem,
    pub chassis: Chassis,
    pub manager: Manager,
    pub license: License,
    pub ntp: Ntp,
    pub lldp: Lldp,
    pub network_protocol: NetworkProtocol,
    pub static_fetched_at: DateTime<Utc>,

    // ── From the dynamic snapshot ──
    pub thermal: Thermal,
    pub power: Power,
    pub fan_mode: FanMode,
    pub snooping: Snooping,
    pub dynamic_fetched_at: DateTime<Utc>,
}

/// Combine a static and a dynamic snapshot. Every field is copied from
/// exactly one input.
pub fn merge(static_data: &StaticSnapshot, dynamic: &DynamicSnapshot) -> MergedSnapshot {
    MergedSnapshot {
        system: static_data.system.clone(),
        chassis: static_data.chassis.clone(),
        manager: static_data.manager.clone(),
        license: static_data.license.clone(),
        ntp: static_data.ntp.clone(),
        lldp: static_data.lldp.clone(),
        network_protocol: static_data.network_protocol.clone(),
        static_fetched_at: static_data.fetched_at,

        thermal: dynamic.thermal.clone(),
        power: dynamic.power.clone(),
        fan_mode: dynamic.fan_mode.clone(),
        snooping: dynamic.snooping.clone(),
        dynamic_fetched_at: dynamic.fetched_at,
    }
}

impl MergedSnapshot {
    /// Display title: `"{manufacturer} {model}"`, falling back to the host.
    pub fn title(&self, host: &str) -> String {
        match (&self.system.manufacturer, &self.system.model) {
            (Some(manufacturer), Some(model)) => format!("{manufacturer} {model}"),
            (None, Some(model)) => model.clone(),
            _ => format!("Supermicro BMC ({host})"),
        }
    }
}
