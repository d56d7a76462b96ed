//! Command dispatch: bridges CLI args -> core Commands -> output formatting.

pub mod config_cmd;
pub mod control;
pub mod diagnostics;
pub mod sensors;
pub mod status;
pub mod util;
pub mod watch;

use crate::cli::{Command, GlobalOpts};
use crate::config::Target;
use crate::error::CliError;

/// Dispatch a BMC-bound command to the appropriate handler.
pub async fn dispatch(cmd: Command, target: Target, global: &GlobalOpts) -> Result<(), CliError> {
    match cmd {
        Command::Status => status::handle(target, global).await,
        Command::Sensors(args) => sensors::handle(target, args, global).await,
        Command::Watch(args) => watch::handle(target, args, global).await,
        Command::Power(args) => control::power(target, args, global).await,
        Command::BmcReset => control::bmc_reset(target, global).await,
        Command::Led(args) => control::led(target, args, global).await,
        Command::FanMode(args) => control::fan_mode(target, args, global).await,
        Command::Boot(args) => control::boot(target, args, global).await,
        Command::Protocol(args) => control::protocol(target, args, global).await,
        Command::IntrusionReset => control::intrusion_reset(target, global).await,
        Command::Diagnostics(args) => diagnostics::handle(target, args, global).await,
        // Config and Completions are handled before dispatch
        Command::Config(_) | Command::Completions(_) => unreachable!(),
    }
}
