//! CLI configuration: profile selection and translation of a profile plus
//! global flags into the connection and polling settings core consumes.
//!
//! Loading, saving and password resolution live in `bmcwatch-config`.

use secrecy::SecretString;

pub use bmcwatch_config::{Config, Profile, config_path};
use bmcwatch_core::{ConnectionConfig, CoordinatorConfig};

use crate::cli::GlobalOpts;
use crate::error::CliError;

/// Everything a BMC-bound command needs.
#[derive(Debug)]
pub struct Target {
    pub profile_name: String,
    pub entry_id: String,
    pub connection: ConnectionConfig,
    pub polling: CoordinatorConfig,
}

/// Resolve the active profile name from CLI flags and config.
pub fn active_profile_name(global: &GlobalOpts, config: &Config) -> String {
    global
        .profile
        .clone()
        .or_else(|| config.default_profile.clone())
        .unwrap_or_else(|| "default".into())
}

/// Translate the active profile + global flags into a [`Target`].
///
/// Without a matching profile the target is built from `--host`,
/// `--username` and `--password` alone.
pub fn resolve_target(global: &GlobalOpts, config: &Config) -> Result<Target, CliError> {
    let profile_name = active_profile_name(global, config);

    let mut profile = match config.profiles.get(&profile_name) {
        Some(profile) => profile.clone(),
        // An explicitly requested profile must exist.
        None if global.profile.is_some() => config.profile(&profile_name)?.clone(),
        None => {
            let host = global.host.clone().ok_or_else(|| CliError::NoConfig {
                path: config_path().display().to_string(),
            })?;
            Profile {
                host,
                ..Profile::default()
            }
        }
    };

    // Flag > env > profile
    if let Some(ref host) = global.host {
        profile.host.clone_from(host);
    }
    if let Some(ref username) = global.username {
        profile.username = Some(username.clone());
    }
    if global.insecure {
        profile.insecure = Some(true);
    }
    if let Some(timeout) = global.timeout {
        profile.timeout = Some(timeout);
    }

    let password = global.password.clone().map(SecretString::from);
    let connection =
        bmcwatch_config::connection_config(&profile, &profile_name, &config.defaults, password)?;
    let polling = bmcwatch_config::coordinator_config(&profile, &config.defaults)?;

    Ok(Target {
        entry_id: profile.entry_id(&profile_name),
        profile_name,
        connection,
        polling,
    })
}
