use bmcwatch_api::ClientStats;
use serde::Serialize;
use strum::Display;

use super::{EntityCategory, SensorValue, always};
use crate::snapshot::MergedSnapshot;

pub struct SensorDescription {
    pub key: &'static str,
    pub name: &'static str,
    pub unit: Option<&'static str>,
    pub category: EntityCategory,
    pub enabled_by_default: bool,
    pub value_fn: fn(&MergedSnapshot, Option<&ClientStats>) -> Option<SensorValue>,
    pub available_fn: fn(&MergedSnapshot) -> bool,
    /// Created regardless of availability at setup.
    pub always_created: bool,
}

impl SensorDescription {
    pub fn is_supported(&self, snapshot: &MergedSnapshot) -> bool {
        self.always_created || (self.available_fn)(snapshot)
    }
}

fn text(value: Option<&String>) -> Option<SensorValue> {
    value.cloned().map(SensorValue::Text)
}

pub const SENSORS: &[SensorDescription] = &[
    SensorDescription {
        key: "power_consumption",
        name: "Power consumption",
        unit: Some("W"),
        category: EntityCategory::Primary,
        enabled_by_default: true,
        value_fn: |data, _| data.power.consumed_watts().map(SensorValue::Number),
        available_fn: |data| data.power.consumed_watts().is_some(),
        always_created: false,
    },
    SensorDescription {
        key: "bios_version",
        name: "BIOS version",
        unit: None,
        category: EntityCategory::Diagnostic,
        enabled_by_default: false,
        value_fn: |data, _| text(data.system.bios_version.as_ref()),
        available_fn: always,
        always_created: false,
    },
    SensorDescription {
        key: "bmc_firmware",
        name: "BMC firmware",
        unit: None,
        category: EntityCategory::Diagnostic,
        enabled_by_default: false,
        value_fn: |data, _| text(data.manager.firmware_version.as_ref()),
        available_fn: always,
        always_created: false,
    },
    SensorDescription {
        key: "post_code",
        name: "POST code",
        unit: None,
        category: EntityCategory::Diagnostic,
        enabled_by_default: false,
        value_fn: |data, _| text(data.snooping.post_code.as_ref()),
        available_fn: |data| data.snooping.is_valid,
        always_created: false,
    },
    SensorDescription {
        key: "api_response_time",
        name: "API response time",
        unit: Some("ms"),
        category: EntityCategory::Diagnostic,
        enabled_by_default: false,
        value_fn: |_, stats| {
            stats
                .and_then(|s| s.average_response_ms)
                .map(|ms| SensorValue::Number((ms * 10.0).round() / 10.0))
        },
        available_fn: always,
        always_created: true,
    },
];

// ── Member sensors ───────────────────────────────────────────────────

/// Per-member sensors discovered from thermal and power data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum MemberKind {
    Temperature,
    Fan,
    Voltage,
}

impl MemberKind {
    pub fn unit(self) -> &'static str {
        match self {
            Self::Temperature => "°C",
            Self::Fan => "RPM",
            Self::Voltage => "V",
        }
    }

    pub fn category(self) -> EntityCategory {
        match self {
            Self::Temperature | Self::Fan => EntityCategory::Primary,
            Self::Voltage => EntityCategory::Diagnostic,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MemberSensor {
    pub kind: MemberKind,
    pub member_id: String,
    pub name: String,
}

impl MemberSensor {
    /// `{kind}_{member_id}`, e.g. `temperature_3`.
    pub fn key(&self) -> String {
        format!("{}_{}", self.kind, self.member_id)
    }

    pub fn value(&self, snapshot: &MergedSnapshot) -> Option<f64> {
        match self.kind {
            MemberKind::Temperature => snapshot
                .thermal
                .temperature(&self.member_id)
                .and_then(|t| t.reading_celsius),
            MemberKind::Fan => snapshot.thermal.fan(&self.member_id).and_then(|f| f.reading),
            MemberKind::Voltage => snapshot
                .power
                .voltage(&self.member_id)
                .and_then(|v| v.reading_volts),
        }
    }

    /// The member still exists, is present, and has a reading.
    pub fn available(&self, snapshot: &MergedSnapshot) -> bool {
        let present = match self.kind {
            MemberKind::Temperature => snapshot
                .thermal
                .temperature(&self.member_id)
                .is_some_and(|t| t.status.is_present()),
            MemberKind::Fan => snapshot
                .thermal
                .fan(&self.member_id)
                .is_some_and(|f| f.status.is_present()),
            MemberKind::Voltage => snapshot
                .power
                .voltage(&self.member_id)
                .is_some_and(|v| v.status.is_present()),
        };
        present && self.value(snapshot).is_some()
    }
}

/// Member sensors that are available in `snapshot`, in BMC order.
pub fn discover_member_sensors(snapshot: &MergedSnapshot) -> Vec<MemberSensor> {
    let temperatures = snapshot.thermal.temperatures.iter().map(|t| MemberSensor {
        kind: MemberKind::Temperature,
        member_id: t.member_id.clone(),
        name: t.name.clone().unwrap_or_else(|| format!("Temperature {}", t.member_id)),
    });
    let fans = snapshot.thermal.fans.iter().map(|f| MemberSensor {
        kind: MemberKind::Fan,
        member_id: f.member_id.clone(),
        name: f.name.clone().unwrap_or_else(|| format!("Fan {}", f.member_id)),
    });
    let voltages = snapshot.power.voltages.iter().map(|v| MemberSensor {
        kind: MemberKind::Voltage,
        member_id: v.member_id.clone(),
        name: v.name.clone().unwrap_or_else(|| format!("Voltage {}", v.member_id)),
    });

    temperatures
        .chain(fans)
        .chain(voltages)
        .filter(|sensor| sensor.available(snapshot))
        .collect()
}
