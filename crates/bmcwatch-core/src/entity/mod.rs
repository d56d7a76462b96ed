// ── Entity tables ──
//
// Declarative description of everything a consumer can show or toggle.
// Each table entry pairs a stable key with plain function pointers over
// `MergedSnapshot`; nothing here holds state. Availability is evaluated
// twice: once at setup (entries that are unavailable are not created) and
// on every read.

mod binary_sensor;
mod button;
mod select;
mod sensor;
mod switch;

pub use binary_sensor::{BINARY_SENSORS, BinarySensorDescription};
pub use button::{BUTTONS, ButtonDescription};
pub use select::{
    BOOT_SOURCE_NAMES, FAN_MODE_NAMES, SELECTS, SelectDescription, display_name, value_for,
};
pub use sensor::{MemberKind, MemberSensor, SENSORS, SensorDescription, discover_member_sensors};
pub use switch::{SWITCHES, SwitchDescription};

use std::fmt;

use bmcwatch_api::ClientStats;
use serde::Serialize;
use strum::Display;

use crate::snapshot::MergedSnapshot;

/// Where an entity belongs in a UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum EntityCategory {
    Primary,
    Diagnostic,
    Config,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Platform {
    Sensor,
    BinarySensor,
    Switch,
    Button,
    Select,
}

/// A sensor reading.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum SensorValue {
    Number(f64),
    Text(String),
}

impl fmt::Display for SensorValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

/// Stable identifier of an entity within one configured connection.
pub fn unique_id(entry_id: &str, key: &str) -> String {
    format!("{entry_id}_{key}")
}

pub(crate) fn always(_: &MergedSnapshot) -> bool {
    true
}

/// One rendered entity.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EntityReading {
    pub unique_id: String,
    pub key: String,
    pub platform: Platform,
    pub name: String,
    pub category: EntityCategory,
    pub value: Option<String>,
    pub unit: Option<&'static str>,
    pub available: bool,
}

/// Render every entity that applies to this snapshot.
///
/// Buttons have no value; switches render `on`/`off`.
pub fn readings(
    entry_id: &str,
    snapshot: &MergedSnapshot,
    stats: Option<&ClientStats>,
) -> Vec<EntityReading> {
    let mut out = Vec::new();

    for d in SENSORS.iter().filter(|d| d.is_supported(snapshot)) {
        out.push(EntityReading {
            unique_id: unique_id(entry_id, d.key),
            key: d.key.to_owned(),
            platform: Platform::Sensor,
            name: d.name.to_owned(),
            category: d.category,
            value: (d.value_fn)(snapshot, stats).map(|v| v.to_string()),
            unit: d.unit,
            available: (d.available_fn)(snapshot),
        });
    }

    for member in discover_member_sensors(snapshot) {
        let key = member.key();
        out.push(EntityReading {
            unique_id: unique_id(entry_id, &key),
            platform: Platform::Sensor,
            name: member.name.clone(),
            category: member.kind.category(),
            value: member.value(snapshot).map(|v| v.to_string()),
            unit: Some(member.kind.unit()),
            available: member.available(snapshot),
            key,
        });
    }

    for d in BINARY_SENSORS
        .iter()
        .filter(|d| (d.available_fn)(snapshot))
    {
        out.push(EntityReading {
            unique_id: unique_id(entry_id, d.key),
            key: d.key.to_owned(),
            platform: Platform::BinarySensor,
            name: d.name.to_owned(),
            category: d.category,
            value: (d.value_fn)(snapshot).map(on_off),
            unit: None,
            available: true,
        });
    }

    for d in SWITCHES.iter().filter(|d| (d.available_fn)(snapshot)) {
        out.push(EntityReading {
            unique_id: unique_id(entry_id, d.key),
            key: d.key.to_owned(),
            platform: Platform::Switch,
            name: d.name.to_owned(),
            category: d.category,
            value: (d.value_fn)(snapshot).map(on_off),
            unit: None,
            available: true,
        });
    }

    for d in SELECTS.iter().filter(|d| (d.available_fn)(snapshot)) {
        out.push(EntityReading {
            unique_id: unique_id(entry_id, d.key),
            key: d.key.to_owned(),
            platform: Platform::Select,
            name: d.name.to_owned(),
            category: d.category,
            value: (d.current_fn)(snapshot),
            unit: None,
            available: true,
        });
    }

    for d in BUTTONS {
        out.push(EntityReading {
            unique_id: unique_id(entry_id, d.key),
            key: d.key.to_owned(),
            platform: Platform::Button,
            name: d.name.to_owned(),
            category: d.category,
            value: None,
            unit: None,
            available: (d.available_fn)(snapshot),
        });
    }

    out
}

fn on_off(value: bool) -> String {
    if value { "on" } else { "off" }.to_owned()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests;
