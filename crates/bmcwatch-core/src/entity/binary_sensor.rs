use bmcwatch_api::models::{Health, IntrusionSensor, Status};

use super::{EntityCategory, always};
use crate::snapshot::MergedSnapshot;

pub struct BinarySensorDescription {
    pub key: &'static str,
    pub name: &'static str,
    pub category: EntityCategory,
    /// `true` means "on" (powered, problem detected, enabled, ...).
    pub value_fn: fn(&MergedSnapshot) -> Option<bool>,
    pub available_fn: fn(&MergedSnapshot) -> bool,
}

/// `Some(true)` when health is reported and not OK; `None` when unreported.
fn health_problem(status: Option<&Status>) -> Option<bool> {
    status
        .and_then(|s| s.health.as_ref())
        .map(|health| *health != Health::Ok)
}

pub const BINARY_SENSORS: &[BinarySensorDescription] = &[
    BinarySensorDescription {
        key: "system_power",
        name: "System power",
        category: EntityCategory::Primary,
        value_fn: |data| Some(data.system.is_powered_on()),
        available_fn: always,
    },
    BinarySensorDescription {
        key: "system_health",
        name: "System health",
        category: EntityCategory::Diagnostic,
        value_fn: |data| health_problem(data.system.status.as_ref()),
        available_fn: always,
    },
    BinarySensorDescription {
        key: "chassis_health",
        name: "Chassis health",
        category: EntityCategory::Diagnostic,
        value_fn: |data| health_problem(data.chassis.status.as_ref()),
        available_fn: always,
    },
    BinarySensorDescription {
        key: "bmc_health",
        name: "BMC health",
        category: EntityCategory::Diagnostic,
        value_fn: |data| health_problem(data.manager.status.as_ref()),
        available_fn: always,
    },
    BinarySensorDescription {
        key: "intrusion",
        name: "Chassis intrusion",
        category: EntityCategory::Diagnostic,
        value_fn: |data| {
            data.chassis
                .physical_security
                .as_ref()
                .and_then(|security| security.intrusion_sensor)
                .map(|sensor| sensor != IntrusionSensor::Normal)
        },
        available_fn: always,
    },
    BinarySensorDescription {
        key: "license_active",
        name: "License active",
        category: EntityCategory::Diagnostic,
        value_fn: |data| data.license.is_licensed(),
        available_fn: |data| data.license.is_valid,
    },
    BinarySensorDescription {
        key: "cmos_battery",
        name: "CMOS battery",
        category: EntityCategory::Diagnostic,
        value_fn: |data| data.power.battery_health().map(|h| *h != Health::Ok),
        available_fn: |data| data.power.battery_health().is_some(),
    },
    BinarySensorDescription {
        key: "ntp_enabled",
        name: "NTP",
        category: EntityCategory::Diagnostic,
        value_fn: |data| data.ntp.enabled,
        available_fn: |data| data.ntp.is_valid,
    },
    BinarySensorDescription {
        key: "lldp_enabled",
        name: "LLDP",
        category: EntityCategory::Diagnostic,
        value_fn: |data| data.lldp.enabled,
        available_fn: |data| data.lldp.is_valid,
    },
];
