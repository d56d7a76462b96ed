use bmcwatch_api::models::ResetType;

use super::{EntityCategory, always};
use crate::command::Command;
use crate::snapshot::MergedSnapshot;

pub struct ButtonDescription {
    pub key: &'static str,
    pub name: &'static str,
    pub category: EntityCategory,
    pub enabled_by_default: bool,
    pub command_fn: fn() -> Command,
    pub available_fn: fn(&MergedSnapshot) -> bool,
}

pub const BUTTONS: &[ButtonDescription] = &[
    ButtonDescription {
        key: "power_on",
        name: "Power on",
        category: EntityCategory::Primary,
        enabled_by_default: true,
        command_fn: || Command::SystemReset(ResetType::On),
        available_fn: always,
    },
    ButtonDescription {
        key: "power_off",
        name: "Power off",
        category: EntityCategory::Primary,
        enabled_by_default: true,
        command_fn: || Command::SystemReset(ResetType::ForceOff),
        available_fn: always,
    },
    ButtonDescription {
        key: "graceful_shutdown",
        name: "Graceful shutdown",
        category: EntityCategory::Primary,
        enabled_by_default: true,
        command_fn: || Command::SystemReset(ResetType::GracefulShutdown),
        available_fn: always,
    },
    ButtonDescription {
        key: "graceful_restart",
        name: "Graceful restart",
        category: EntityCategory::Primary,
        enabled_by_default: true,
        command_fn: || Command::SystemReset(ResetType::GracefulRestart),
        available_fn: always,
    },
    ButtonDescription {
        key: "force_restart",
        name: "Force restart",
        category: EntityCategory::Primary,
        enabled_by_default: true,
        command_fn: || Command::SystemReset(ResetType::ForceRestart),
        available_fn: always,
    },
    ButtonDescription {
        key: "bmc_restart",
        name: "Restart BMC",
        category: EntityCategory::Diagnostic,
        enabled_by_default: false,
        command_fn: || Command::ManagerReset(ResetType::GracefulRestart),
        available_fn: always,
    },
    ButtonDescription {
        key: "send_nmi",
        name: "Send NMI",
        category: EntityCategory::Diagnostic,
        enabled_by_default: false,
        command_fn: || Command::SystemReset(ResetType::Nmi),
        available_fn: always,
    },
    ButtonDescription {
        key: "reset_intrusion",
        name: "Reset intrusion sensor",
        category: EntityCategory::Diagnostic,
        enabled_by_default: true,
        command_fn: || Command::ResetIntrusionSensor,
        available_fn: |data| data.chassis.is_intruded(),
    },
];
