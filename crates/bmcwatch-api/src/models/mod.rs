// Redfish response types
//
// Models for the subset of the Redfish schema Supermicro BMCs expose.
// Fields use `#[serde(default)]` liberally because presence varies across
// boards and firmware revisions.

pub mod chassis;
pub mod common;
pub mod manager;
pub mod oem;
pub mod power;
pub mod snapshot;
pub mod system;
pub mod thermal;

pub use chassis::{Chassis, IntrusionSensor, PhysicalSecurity};
pub use common::{Health, IndicatorLed, PowerState, ResetType, ResourceState, Status};
pub use manager::{Manager, NetworkProtocol, Protocol, ProtocolSetting};
pub use oem::{FanMode, FanModeType, License, Lldp, Ntp, Snooping};
pub use power::{Battery, Power, PowerControl, PowerOem, PowerSupply, SupermicroPowerOem, Voltage};
pub use snapshot::{DynamicSnapshot, StaticSnapshot};
pub use system::{Boot, BootSourceOverrideEnabled, ComputerSystem, MemorySummary, ProcessorSummary};
pub use thermal::{Fan, Temperature, Thermal};
