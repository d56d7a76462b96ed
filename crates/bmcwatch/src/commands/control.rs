//! Control command handlers: power, LED, fan mode, boot override,
//! protocols, intrusion re-arm and BMC reset.
//!
//! Every action runs through `Coordinator::execute`, which follows it with
//! a burst refresh.

use serde::Serialize;
use tabled::Tabled;

use bmcwatch_core::entity::{
    BOOT_SOURCE_NAMES, FAN_MODE_NAMES, SELECTS, SelectDescription, display_name,
};
use bmcwatch_core::{
    BootSourceOverrideEnabled, Command as CoreCommand, IndicatorLed, MergedSnapshot, Protocol,
    ResetType,
};

use crate::cli::{
    BootArgs, FanModeArgs, GlobalOpts, LedArgs, LedState, PowerAction, PowerArgs, ProtocolArgs,
    ProtocolName, Toggle,
};
use crate::config::Target;
use crate::error::CliError;
use crate::output;

use super::util;

// ── Shared ───────────────────────────────────────────────────────────

async fn run(target: Target, command: CoreCommand, global: &GlobalOpts) -> Result<(), CliError> {
    let label = command.to_string();
    util::with_coordinator(target, |coordinator| async move {
        coordinator.execute(command).await
    })
    .await?;
    if !global.quiet {
        eprintln!("✓ {label}");
    }
    Ok(())
}

fn select(key: &str) -> Result<&'static SelectDescription, CliError> {
    SELECTS
        .iter()
        .find(|s| s.key == key)
        .ok_or_else(|| CliError::Internal(format!("no select named {key}")))
}

/// The option a command selects, as a display name.
fn selected_label(command: &CoreCommand) -> Option<String> {
    match command {
        CoreCommand::SetFanMode(mode) => Some(display_name(FAN_MODE_NAMES, &mode.to_string())),
        CoreCommand::SetBootSource { target, .. } => Some(display_name(BOOT_SOURCE_NAMES, target)),
        _ => None,
    }
}

/// Turn user input into the command for a select, refusing options the
/// BMC does not offer. Display names match case-insensitively.
pub fn resolve_option(
    select: &SelectDescription,
    snap: &MergedSnapshot,
    input: &str,
) -> Result<CoreCommand, CliError> {
    let options = (select.options_fn)(snap);
    let not_available = || CliError::NotAvailable {
        option: select.name.to_owned(),
        value: input.to_owned(),
        available: if options.is_empty() {
            "(none)".into()
        } else {
            options.join(", ")
        },
    };
    if !(select.available_fn)(snap) {
        return Err(not_available());
    }

    let canonical = options
        .iter()
        .find(|o| o.eq_ignore_ascii_case(input))
        .map_or(input, String::as_str);
    let command = (select.command_fn)(canonical)?;

    match selected_label(&command) {
        Some(label) if options.contains(&label) => Ok(command),
        _ => Err(not_available()),
    }
}

#[derive(Debug, Serialize)]
struct OptionView {
    option: String,
    current: bool,
}

#[derive(Tabled)]
struct OptionRow {
    #[tabled(rename = "Option")]
    option: String,
    #[tabled(rename = "Current")]
    current: &'static str,
}

fn option_views(select: &SelectDescription, snap: &MergedSnapshot) -> Vec<OptionView> {
    let current = (select.current_fn)(snap);
    (select.options_fn)(snap)
        .into_iter()
        .map(|option| OptionView {
            current: current.as_deref() == Some(option.as_str()),
            option,
        })
        .collect()
}

/// Show or set one select.
async fn handle_select(
    target: Target,
    key: &str,
    value: Option<String>,
    adjust: impl FnOnce(CoreCommand) -> CoreCommand,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let select = select(key)?;

    let Some(value) = value else {
        let views = util::with_coordinator(target, |coordinator| async move {
            let snap = util::snapshot_of(&coordinator)?;
            Ok(option_views(select, &snap))
        })
        .await?;
        let out = output::render_list(
            &global.output,
            &views,
            |v| OptionRow {
                option: v.option.clone(),
                current: if v.current { "*" } else { "" },
            },
            |v| v.option.clone(),
        );
        output::print_output(&out, global.quiet);
        return Ok(());
    };

    let label = util::with_coordinator(target, |coordinator| async move {
        let snap = util::snapshot_of(&coordinator)?;
        let command = match resolve_option(select, &snap, &value) {
            Ok(command) => adjust(command),
            Err(e) => return Ok(Err(e)),
        };
        let label = command.to_string();
        coordinator.execute(command).await?;
        Ok(Ok(label))
    })
    .await??;

    if !global.quiet {
        eprintln!("✓ {label}");
    }
    Ok(())
}

// ── Handlers ─────────────────────────────────────────────────────────

pub async fn power(target: Target, args: PowerArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let (reset, prompt) = match args.action {
        PowerAction::On => (ResetType::On, None),
        PowerAction::Off => (ResetType::ForceOff, Some("Cut power to the host immediately?")),
        PowerAction::Shutdown => (ResetType::GracefulShutdown, Some("Shut down the host OS?")),
        PowerAction::Restart => (ResetType::GracefulRestart, Some("Restart the host OS?")),
        PowerAction::ForceRestart => (ResetType::ForceRestart, Some("Hard-reset the host?")),
        PowerAction::Nmi => (
            ResetType::Nmi,
            Some("Send an NMI? The OS will usually crash-dump."),
        ),
    };
    if let Some(prompt) = prompt {
        if !util::confirm(prompt, &format!("power {reset}"), global.yes)? {
            return Ok(());
        }
    }
    run(target, CoreCommand::SystemReset(reset), global).await
}

pub async fn bmc_reset(target: Target, global: &GlobalOpts) -> Result<(), CliError> {
    if !util::confirm(
        "Restart the BMC? It will be unreachable for a few minutes.",
        "bmc-reset",
        global.yes,
    )? {
        return Ok(());
    }
    run(
        target,
        CoreCommand::ManagerReset(ResetType::GracefulRestart),
        global,
    )
    .await
}

pub async fn led(target: Target, args: LedArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let state = match args.state {
        LedState::On => IndicatorLed::Lit,
        LedState::Off => IndicatorLed::Off,
        LedState::Blink => IndicatorLed::Blinking,
    };
    run(target, CoreCommand::SetIndicatorLed(state), global).await
}

pub async fn fan_mode(target: Target, args: FanModeArgs, global: &GlobalOpts) -> Result<(), CliError> {
    handle_select(target, "fan_mode", args.mode, |command| command, global).await
}

pub async fn boot(target: Target, args: BootArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let continuous = args.continuous;
    handle_select(
        target,
        "boot_source",
        args.target,
        move |command| match command {
            CoreCommand::SetBootSource { target, .. } if continuous => CoreCommand::SetBootSource {
                target,
                enabled: BootSourceOverrideEnabled::Continuous,
            },
            other => other,
        },
        global,
    )
    .await
}

pub async fn protocol(
    target: Target,
    args: ProtocolArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let protocol = match args.protocol {
        ProtocolName::Http => Protocol::Http,
        ProtocolName::Ssh => Protocol::Ssh,
        ProtocolName::Ipmi => Protocol::Ipmi,
        ProtocolName::Snmp => Protocol::Snmp,
    };
    let enabled = args.state == Toggle::On;
    if !enabled
        && !util::confirm(
            &format!("Disable {protocol} on the BMC?"),
            &format!("disable {protocol}"),
            global.yes,
        )?
    {
        return Ok(());
    }
    run(
        target,
        CoreCommand::SetProtocolEnabled { protocol, enabled },
        global,
    )
    .await
}

pub async fn intrusion_reset(target: Target, global: &GlobalOpts) -> Result<(), CliError> {
    run(target, CoreCommand::ResetIntrusionSensor, global).await
}
