//! Config subcommand handlers.

use std::path::PathBuf;

use dialoguer::{Confirm, Input, Select};
use serde::Serialize;

use bmcwatch_config::{self as cfgstore, Config, Profile};

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts};
use crate::config::{self, config_path};
use crate::error::CliError;
use crate::output;

use super::util::prompt_err;

// ── Helpers ─────────────────────────────────────────────────────────

const REDACTED: &str = "********";

/// The config with every plaintext password replaced.
fn redacted(cfg: &Config) -> Config {
    let mut shown = cfg.clone();
    for profile in shown.profiles.values_mut() {
        if profile.password.is_some() {
            profile.password = Some(REDACTED.into());
        }
    }
    shown
}

fn parse_value<T: std::str::FromStr>(key: &str, value: &str, expected: &str) -> Result<T, CliError> {
    value.parse().map_err(|_| CliError::Validation {
        field: key.into(),
        reason: format!("must be {expected}"),
    })
}

/// Apply `config set <key> <value>` to a profile.
pub fn set_key(profile: &mut Profile, key: &str, value: String) -> Result<(), CliError> {
    let secs = |v: &str| parse_value::<u64>(key, v, "a number (seconds)");
    match key {
        "host" => profile.host = value,
        "username" => profile.username = Some(value),
        "password" => profile.password = Some(value),
        "password_env" | "password-env" => profile.password_env = Some(value),
        "entry_id" | "entry-id" => profile.entry_id = Some(value),
        "ca_cert" | "ca-cert" => profile.ca_cert = Some(PathBuf::from(value)),
        "insecure" => profile.insecure = Some(parse_value(key, &value, "'true' or 'false'")?),
        "timeout" => profile.timeout = Some(secs(&value)?),
        "scan_interval" | "scan-interval" => profile.scan_interval = Some(secs(&value)?),
        "burst_interval" | "burst-interval" => profile.burst_interval = Some(secs(&value)?),
        "burst_duration" | "burst-duration" => profile.burst_duration = Some(secs(&value)?),
        "static_interval" | "static-interval" => profile.static_interval = Some(secs(&value)?),
        "max_concurrent_requests" | "max-concurrent-requests" => {
            profile.max_concurrent_requests = Some(parse_value(key, &value, "a number")?);
        }
        other => {
            return Err(CliError::Validation {
                field: other.into(),
                reason: format!(
                    "unknown config key '{other}'. Valid keys: host, username, password, \
                     password_env, entry_id, ca_cert, insecure, timeout, scan_interval, \
                     burst_interval, burst_duration, static_interval, max_concurrent_requests"
                ),
            });
        }
    }
    Ok(())
}

#[derive(Serialize)]
struct ProfileEntry {
    name: String,
    host: String,
    default: bool,
}

#[derive(tabled::Tabled)]
struct ProfileRow {
    #[tabled(rename = "Profile")]
    name: String,
    #[tabled(rename = "Host")]
    host: String,
    #[tabled(rename = "Default")]
    default: &'static str,
}

// ── Handler ─────────────────────────────────────────────────────────

pub fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        ConfigCommand::Init => init(),

        // ── Show ────────────────────────────────────────────────────
        ConfigCommand::Show => {
            let cfg = redacted(&cfgstore::load_config()?);
            let out = output::render_single(
                &global.output,
                &cfg,
                |c| toml::to_string_pretty(c).unwrap_or_else(|e| format!("# {e}")),
                |_| config_path().display().to_string(),
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }

        // ── Set <key> <value> ───────────────────────────────────────
        ConfigCommand::Set { key, value } => {
            let mut cfg = cfgstore::load_config()?;
            let profile_name = config::active_profile_name(global, &cfg);
            let profile = cfg.profiles.entry(profile_name.clone()).or_default();
            set_key(profile, &key, value)?;

            // Reject values the profile could never connect with.
            cfgstore::coordinator_config(profile, &cfg.defaults)?;

            cfgstore::save_config(&cfg)?;
            eprintln!("✓ Set {key} on profile '{profile_name}'");
            Ok(())
        }

        // ── Profiles ────────────────────────────────────────────────
        ConfigCommand::Profiles => {
            let cfg = cfgstore::load_config()?;
            let default = cfg.default_profile.as_deref().unwrap_or("default");
            if cfg.profiles.is_empty() {
                eprintln!("No profiles configured. Run: bmcwatch config init");
                return Ok(());
            }
            let entries: Vec<ProfileEntry> = cfg
                .profile_names()
                .into_iter()
                .map(|name| ProfileEntry {
                    host: cfg.profiles[&name].host.clone(),
                    default: name == default,
                    name,
                })
                .collect();
            let out = output::render_list(
                &global.output,
                &entries,
                |e| ProfileRow {
                    name: e.name.clone(),
                    host: e.host.clone(),
                    default: if e.default { "*" } else { "" },
                },
                |e| e.name.clone(),
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }

        // ── Use <name> ─────────────────────────────────────────────
        ConfigCommand::Use { name } => {
            let mut cfg = cfgstore::load_config()?;
            cfg.profile(&name)?;
            cfg.default_profile = Some(name.clone());
            cfgstore::save_config(&cfg)?;
            eprintln!("✓ Default profile set to '{name}'");
            Ok(())
        }

        // ── SetPassword ─────────────────────────────────────────────
        ConfigCommand::SetPassword { profile } => {
            let cfg = cfgstore::load_config()?;
            let profile_name = profile.unwrap_or_else(|| config::active_profile_name(global, &cfg));
            cfg.profile(&profile_name)?;

            let password = rpassword::prompt_password("Password: ").map_err(prompt_err)?;
            if password.is_empty() {
                return Err(CliError::Validation {
                    field: "password".into(),
                    reason: "value cannot be empty".into(),
                });
            }
            cfgstore::store_password(&profile_name, &password)?;
            eprintln!("✓ Password stored in system keyring for profile '{profile_name}'");
            Ok(())
        }
    }
}

// ── Init: interactive wizard ────────────────────────────────────────

fn init() -> Result<(), CliError> {
    let path = config_path();
    eprintln!("bmcwatch configuration wizard");
    eprintln!("   Config path: {}\n", path.display());

    let mut cfg = cfgstore::load_config()?;

    // 1. Profile name
    let profile_name: String = Input::new()
        .with_prompt("Profile name")
        .default("default".into())
        .interact_text()
        .map_err(prompt_err)?;

    // 2. BMC address
    let host: String = Input::new()
        .with_prompt("BMC host or URL")
        .interact_text()
        .map_err(prompt_err)?;

    // 3. Credentials
    let username: String = Input::new()
        .with_prompt("Username")
        .default("ADMIN".into())
        .interact_text()
        .map_err(prompt_err)?;
    let password = rpassword::prompt_password("Password: ").map_err(prompt_err)?;
    if username.is_empty() || password.is_empty() {
        return Err(CliError::Validation {
            field: "credentials".into(),
            reason: "username and password cannot be empty".into(),
        });
    }

    let store_choices = &[
        "Store password in system keyring (recommended)",
        "Save to config file (plaintext)",
    ];
    let store_selection = Select::new()
        .with_prompt("Where to store the password?")
        .items(store_choices)
        .default(0)
        .interact()
        .map_err(prompt_err)?;
    let plaintext = if store_selection == 0 {
        cfgstore::store_password(&profile_name, &password)?;
        eprintln!("   ✓ Password stored in system keyring");
        None
    } else {
        Some(password)
    };

    // 4. TLS
    let verify = Confirm::new()
        .with_prompt("Verify the BMC's TLS certificate? (most ship self-signed)")
        .default(false)
        .interact()
        .map_err(prompt_err)?;

    // 5. Build the profile, keeping the entry id if the profile exists
    let mut profile = Profile::new(host);
    if let Some(existing) = cfg.profiles.get(&profile_name) {
        profile.entry_id.clone_from(&existing.entry_id);
    }
    profile.username = Some(username);
    profile.password = plaintext;
    profile.insecure = Some(!verify);

    cfg.profiles.insert(profile_name.clone(), profile);
    cfg.default_profile = Some(profile_name.clone());

    // 6. Write config
    let written = cfgstore::save_config(&cfg)?;

    eprintln!("\n✓ Configuration written to {}", written.display());
    eprintln!("  Active profile: {profile_name}");
    eprintln!("\n  Test it: bmcwatch status");
    Ok(())
}
