// Composite fetch results
//
// The two data classes the coordinator polls at different cadences. Each is
// produced by one composite fetch and never mutated afterwards.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::chassis::Chassis;
use super::manager::{Manager, NetworkProtocol};
use super::oem::{FanMode, License, Lldp, Ntp, Snooping};
use super::power::Power;
use super::system::ComputerSystem;
use super::thermal::Thermal;

/// Identity and rarely-changing configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StaticSnapshot {
    pub system: ComputerSystem,
    pub chassis: Chassis,
    pub manager: Manager,
    pub license: License,
    pub ntp: Ntp,
    pub lldp: Lldp,
    pub network_protocol: NetworkProtocol,
    pub fetched_at: DateTime<Utc>,
}

/// Runtime telemetry, refetched on every tick.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DynamicSnapshot {
    pub thermal: Thermal,
    pub power: Power,
    pub fan_mode: FanMode,
    pub snooping: Snooping,
    pub fetched_at: DateTime<Utc>,
}
