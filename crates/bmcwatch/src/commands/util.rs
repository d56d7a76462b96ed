//! Shared helpers for command handlers.

use std::io::IsTerminal;

use bmcwatch_core::{Coordinator, CoreError, Credentials, MergedSnapshot, Session};

use crate::config::Target;
use crate::error::CliError;

/// Prompt for confirmation, auto-approving if `--yes` was passed.
///
/// Without a terminal to ask on, refuses instead of hanging.
pub fn confirm(message: &str, action: &str, yes_flag: bool) -> Result<bool, CliError> {
    if yes_flag {
        return Ok(true);
    }
    if !std::io::stdin().is_terminal() {
        return Err(CliError::NonInteractiveRequiresYes {
            action: action.into(),
        });
    }
    let confirmed = dialoguer::Confirm::new()
        .with_prompt(message)
        .default(false)
        .interact()
        .map_err(prompt_err)?;
    Ok(confirmed)
}

/// Map a dialoguer / interactive I/O failure into CliError.
pub fn prompt_err(e: impl std::fmt::Display) -> CliError {
    CliError::Validation {
        field: "interactive".into(),
        reason: format!("prompt failed: {e}"),
    }
}

/// Ask for a username (pre-filled) and a password.
pub fn prompt_credentials(host: &str, username: &str) -> Result<Credentials, CliError> {
    eprintln!("Credentials for {host}");
    let username: String = dialoguer::Input::new()
        .with_prompt("Username")
        .default(username.to_owned())
        .interact_text()
        .map_err(prompt_err)?;
    let password = rpassword::prompt_password("Password: ").map_err(prompt_err)?;
    if password.is_empty() {
        return Err(CliError::Validation {
            field: "password".into(),
            reason: "password cannot be empty".into(),
        });
    }
    Ok(Credentials::new(username, password))
}

/// Connect once, run `f` against the coordinator, disconnect.
pub async fn with_coordinator<F, Fut, T>(target: Target, f: F) -> Result<T, CliError>
where
    F: FnOnce(Coordinator) -> Fut,
    Fut: Future<Output = Result<T, CoreError>>,
{
    Session::oneshot(target.entry_id, target.connection, target.polling, f)
        .await
        .map_err(CliError::from)
}

/// The coordinator's snapshot, which exists after a successful start.
pub fn snapshot_of(coordinator: &Coordinator) -> Result<std::sync::Arc<MergedSnapshot>, CoreError> {
    coordinator
        .current_snapshot()
        .ok_or_else(|| CoreError::Internal("no snapshot after initial refresh".into()))
}
