use std::str::FromStr;

use bmcwatch_api::models::{BootSourceOverrideEnabled, FanModeType};

use super::EntityCategory;
use crate::command::Command;
use crate::error::CoreError;
use crate::snapshot::MergedSnapshot;

pub struct SelectDescription {
    pub key: &'static str,
    pub name: &'static str,
    pub category: EntityCategory,
    /// Display names of the selectable options.
    pub options_fn: fn(&MergedSnapshot) -> Vec<String>,
    /// Display name of the current option.
    pub current_fn: fn(&MergedSnapshot) -> Option<String>,
    pub available_fn: fn(&MergedSnapshot) -> bool,
    /// Command selecting an option given by display name or raw value.
    pub command_fn: fn(&str) -> Result<Command, CoreError>,
}

// ── Display names ────────────────────────────────────────────────────

/// Redfish fan mode → display name.
pub const FAN_MODE_NAMES: &[(&str, &str)] = &[
    ("Standard", "Standard"),
    ("FullSpeed", "Full Speed"),
    ("Optimal", "Optimal"),
    ("HeavyIO", "Heavy I/O"),
    ("PUEOptimal", "PUE Optimal"),
];

/// Redfish boot target → display name.
pub const BOOT_SOURCE_NAMES: &[(&str, &str)] = &[
    ("None", "None"),
    ("Pxe", "PXE"),
    ("Hdd", "HDD"),
    ("Cd", "CD/DVD"),
    ("Usb", "USB"),
    ("BiosSetup", "BIOS Setup"),
    ("UefiTarget", "UEFI Target"),
    ("Floppy", "Floppy"),
    ("SDCard", "SD Card"),
    ("UefiHttp", "UEFI HTTP"),
    ("RemoteDrive", "Remote Drive"),
    ("Diags", "Diagnostics"),
    ("Utilities", "Utilities"),
];

/// Display name for a raw value; unmapped values show as-is.
pub fn display_name(names: &[(&str, &str)], value: &str) -> String {
    names
        .iter()
        .find(|(raw, _)| *raw == value)
        .map_or_else(|| value.to_owned(), |(_, display)| (*display).to_owned())
}

/// Raw value for a display name.
pub fn value_for(names: &[(&'static str, &'static str)], display: &str) -> Option<&'static str> {
    names
        .iter()
        .find(|(_, name)| *name == display)
        .map(|(raw, _)| *raw)
}

// ── Fan mode ─────────────────────────────────────────────────────────

fn fan_mode_options(data: &MergedSnapshot) -> Vec<String> {
    let modes: &[FanModeType] = if data.fan_mode.allowable_modes.is_empty() {
        &FanModeType::SELECTABLE
    } else {
        &data.fan_mode.allowable_modes
    };
    modes
        .iter()
        .filter(|mode| **mode != FanModeType::Unknown)
        .map(|mode| display_name(FAN_MODE_NAMES, &mode.to_string()))
        .collect()
}

fn fan_mode_command(option: &str) -> Result<Command, CoreError> {
    let raw = value_for(FAN_MODE_NAMES, option).unwrap_or(option);
    match FanModeType::from_str(raw) {
        Ok(FanModeType::Unknown) | Err(_) => Err(CoreError::InvalidOption {
            message: format!("unknown fan mode: {option}"),
        }),
        Ok(mode) => Ok(Command::SetFanMode(mode)),
    }
}

// ── Boot source ──────────────────────────────────────────────────────

fn boot_options(data: &MergedSnapshot) -> Vec<String> {
    data.system
        .boot
        .as_ref()
        .map(|boot| {
            boot.allowable_targets
                .iter()
                .map(|target| display_name(BOOT_SOURCE_NAMES, target))
                .collect()
        })
        .unwrap_or_default()
}

fn boot_command(option: &str) -> Result<Command, CoreError> {
    if option.is_empty() {
        return Err(CoreError::InvalidOption {
            message: "boot target must not be empty".into(),
        });
    }
    let target = value_for(BOOT_SOURCE_NAMES, option).unwrap_or(option);
    Ok(Command::SetBootSource {
        target: target.to_owned(),
        enabled: BootSourceOverrideEnabled::Once,
    })
}

pub const SELECTS: &[SelectDescription] = &[
    SelectDescription {
        key: "fan_mode",
        name: "Fan mode",
        category: EntityCategory::Config,
        options_fn: fan_mode_options,
        current_fn: |data| {
            data.fan_mode
                .mode
                .map(|mode| display_name(FAN_MODE_NAMES, &mode.to_string()))
        },
        available_fn: |data| data.fan_mode.is_valid,
        command_fn: fan_mode_command,
    },
    SelectDescription {
        key: "boot_source",
        name: "Boot source",
        category: EntityCategory::Config,
        options_fn: boot_options,
        current_fn: |data| {
            data.system
                .boot
                .as_ref()
                .and_then(|boot| boot.boot_source_override_target.as_deref())
                .map(|target| display_name(BOOT_SOURCE_NAMES, target))
        },
        available_fn: |data| {
            data.system
                .boot
                .as_ref()
                .is_some_and(|boot| !boot.allowable_targets.is_empty())
        },
        command_fn: boot_command,
    },
];
