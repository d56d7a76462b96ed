//! Shared configuration for bmcwatch.
//!
//! TOML profiles, password resolution (env + keyring + plaintext),
//! and translation to `bmcwatch_core::{ConnectionConfig, CoordinatorConfig}`.
//! The CLI layers its `GlobalOpts` overrides on top.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use bmcwatch_core::config::{
    BURST_DURATION, BURST_INTERVAL, MAX_CONCURRENT_REQUESTS, SCAN_INTERVAL, STATIC_MAX_AGE,
};
use bmcwatch_core::{ConnectionConfig, CoordinatorConfig, Credentials, OptionRange, TlsVerification};

/// Keyring service name.
pub const KEYRING_SERVICE: &str = "bmcwatch";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("no password configured for profile '{profile}'")]
    NoCredentials { profile: String },

    #[error("profile '{name}' not found")]
    ProfileNotFound { name: String, available: Vec<String> },

    #[error("keyring error: {0}")]
    Keyring(#[from] keyring::Error),

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    /// Default profile name.
    pub default_profile: Option<String>,

    /// Global defaults.
    #[serde(default)]
    pub defaults: Defaults,

    /// Named BMC profiles.
    #[serde(default)]
    pub profiles: HashMap<String, Profile>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_profile: Some("default".into()),
            defaults: Defaults::default(),
            profiles: HashMap::new(),
        }
    }
}

impl Config {
    /// Look up a profile by name.
    pub fn profile(&self, name: &str) -> Result<&Profile, ConfigError> {
        self.profiles
            .get(name)
            .ok_or_else(|| ConfigError::ProfileNotFound {
                name: name.into(),
                available: self.profile_names(),
            })
    }

    /// Profile names, sorted.
    pub fn profile_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.profiles.keys().cloned().collect();
        names.sort();
        names
    }
}

/// Global defaults; every polling option can be overridden per profile.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_output")]
    pub output: String,

    /// BMCs ship self-signed certificates, so this defaults to `true`.
    #[serde(default = "default_insecure")]
    pub insecure: bool,

    #[serde(default = "default_timeout")]
    pub timeout: u64,

    #[serde(default = "default_scan_interval")]
    pub scan_interval: u64,

    #[serde(default = "default_burst_interval")]
    pub burst_interval: u64,

    #[serde(default = "default_burst_duration")]
    pub burst_duration: u64,

    #[serde(default = "default_static_interval")]
    pub static_interval: u64,

    #[serde(default = "default_max_concurrent_requests")]
    pub max_concurrent_requests: u64,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: default_output(),
            insecure: default_insecure(),
            timeout: default_timeout(),
            scan_interval: default_scan_interval(),
            burst_interval: default_burst_interval(),
            burst_duration: default_burst_duration(),
            static_interval: default_static_interval(),
            max_concurrent_requests: default_max_concurrent_requests(),
        }
    }
}

fn default_output() -> String {
    "table".into()
}
fn default_insecure() -> bool {
    true
}
fn default_timeout() -> u64 {
    30
}
fn default_scan_interval() -> u64 {
    SCAN_INTERVAL.default
}
fn default_burst_interval() -> u64 {
    BURST_INTERVAL.default
}
fn default_burst_duration() -> u64 {
    BURST_DURATION.default
}
fn default_static_interval() -> u64 {
    STATIC_MAX_AGE.default
}
fn default_max_concurrent_requests() -> u64 {
    MAX_CONCURRENT_REQUESTS.default
}

/// A named BMC profile.
#[derive(Debug, Default, Clone, Deserialize, Serialize)]
pub struct Profile {
    /// BMC host or base URL (e.g., "10.0.0.5" or "https://bmc.lan").
    pub host: String,

    /// Stable identifier for issues and entity ids. Generated by
    /// `config init`; falls back to the profile name.
    pub entry_id: Option<String>,

    pub username: Option<String>,

    /// Password (plaintext; prefer keyring or env var).
    pub password: Option<String>,

    /// Environment variable name containing the password.
    pub password_env: Option<String>,

    /// Path to custom CA certificate.
    pub ca_cert: Option<PathBuf>,

    /// Override insecure TLS setting.
    pub insecure: Option<bool>,

    /// Override timeout.
    pub timeout: Option<u64>,

    pub scan_interval: Option<u64>,
    pub burst_interval: Option<u64>,
    pub burst_duration: Option<u64>,
    pub static_interval: Option<u64>,
    pub max_concurrent_requests: Option<u64>,
}

impl Profile {
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            entry_id: Some(new_entry_id()),
            ..Self::default()
        }
    }

    pub fn entry_id(&self, profile_name: &str) -> String {
        self.entry_id
            .clone()
            .unwrap_or_else(|| profile_name.to_owned())
    }
}

/// A fresh entry id.
pub fn new_entry_id() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("com", "bmcwatch", "bmcwatch").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("bmcwatch");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the full Config from the canonical file + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load config from `path` merged with `BMCWATCH_` environment variables.
///
/// Nested keys use a double underscore:
/// `BMCWATCH_DEFAULTS__SCAN_INTERVAL=60`.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    debug!(path = %path.display(), "loading config");
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("BMCWATCH_").split("__"));

    let config: Config = figment.extract()?;
    Ok(config)
}

/// Load config, returning a default if the file doesn't exist.
pub fn load_config_or_default() -> Config {
    load_config().unwrap_or_default()
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write to the canonical config path.
pub fn save_config(cfg: &Config) -> Result<PathBuf, ConfigError> {
    let path = config_path();
    save_config_to(cfg, &path)?;
    Ok(path)
}

pub fn save_config_to(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

// ── Password resolution ─────────────────────────────────────────────

fn keyring_user(profile_name: &str) -> String {
    format!("{profile_name}/password")
}

/// Store a profile's password in the system keyring.
pub fn store_password(profile_name: &str, password: &str) -> Result<(), ConfigError> {
    let entry = keyring::Entry::new(KEYRING_SERVICE, &keyring_user(profile_name))?;
    entry.set_password(password)?;
    Ok(())
}

/// Resolve a profile's password: `password_env` → keyring → plaintext.
pub fn resolve_password(profile: &Profile, profile_name: &str) -> Result<SecretString, ConfigError> {
    resolve_password_with(
        profile,
        profile_name,
        |name| std::env::var(name).ok(),
        |user| {
            keyring::Entry::new(KEYRING_SERVICE, user)
                .and_then(|entry| entry.get_password())
                .ok()
        },
    )
}

fn resolve_password_with(
    profile: &Profile,
    profile_name: &str,
    env: impl Fn(&str) -> Option<String>,
    keyring: impl Fn(&str) -> Option<String>,
) -> Result<SecretString, ConfigError> {
    // 1. Profile's password_env → env var lookup
    if let Some(pw) = profile.password_env.as_deref().and_then(&env) {
        return Ok(SecretString::from(pw));
    }

    // 2. System keyring
    if let Some(pw) = keyring(&keyring_user(profile_name)) {
        return Ok(SecretString::from(pw));
    }

    // 3. Plaintext in config
    if let Some(ref pw) = profile.password {
        return Ok(SecretString::from(pw.clone()));
    }

    Err(ConfigError::NoCredentials {
        profile: profile_name.into(),
    })
}

// ── Translation to core types ───────────────────────────────────────

fn validated(range: &OptionRange, value: u64) -> Result<u64, ConfigError> {
    range.validate(value).map_err(|e| ConfigError::Validation {
        field: range.name.into(),
        reason: e.to_string(),
    })
}

/// Polling cadence for a profile, each value range-checked.
pub fn coordinator_config(
    profile: &Profile,
    defaults: &Defaults,
) -> Result<CoordinatorConfig, ConfigError> {
    let secs = |range: &OptionRange, value: Option<u64>, default: u64| {
        validated(range, value.unwrap_or(default)).map(Duration::from_secs)
    };
    Ok(CoordinatorConfig {
        scan_interval: secs(&SCAN_INTERVAL, profile.scan_interval, defaults.scan_interval)?,
        burst_interval: secs(&BURST_INTERVAL, profile.burst_interval, defaults.burst_interval)?,
        burst_duration: secs(&BURST_DURATION, profile.burst_duration, defaults.burst_duration)?,
        static_max_age: secs(&STATIC_MAX_AGE, profile.static_interval, defaults.static_interval)?,
    })
}

/// TLS strategy: explicit `insecure` wins, then a custom CA, then the
/// default.
pub fn tls_verification(profile: &Profile, defaults: &Defaults) -> TlsVerification {
    match (profile.insecure, &profile.ca_cert) {
        (Some(true), _) => TlsVerification::DangerAcceptInvalid,
        (_, Some(ca_path)) => TlsVerification::CustomCa(ca_path.clone()),
        (Some(false), None) => TlsVerification::SystemDefaults,
        (None, None) if defaults.insecure => TlsVerification::DangerAcceptInvalid,
        (None, None) => TlsVerification::SystemDefaults,
    }
}

/// Build a `ConnectionConfig` from a profile, no CLI flag overrides.
pub fn profile_to_connection_config(
    profile: &Profile,
    profile_name: &str,
    defaults: &Defaults,
) -> Result<ConnectionConfig, ConfigError> {
    connection_config(profile, profile_name, defaults, None)
}

/// Build a `ConnectionConfig`; an explicit `password` skips the
/// resolution chain.
pub fn connection_config(
    profile: &Profile,
    profile_name: &str,
    defaults: &Defaults,
    password: Option<SecretString>,
) -> Result<ConnectionConfig, ConfigError> {
    if profile.host.trim().is_empty() {
        return Err(ConfigError::Validation {
            field: "host".into(),
            reason: "must not be empty".into(),
        });
    }
    let max_concurrent = validated(
        &MAX_CONCURRENT_REQUESTS,
        profile
            .max_concurrent_requests
            .unwrap_or(defaults.max_concurrent_requests),
    )?;

    let username = profile
        .username
        .clone()
        .ok_or_else(|| ConfigError::NoCredentials {
            profile: profile_name.into(),
        })?;
    let password = match password {
        Some(password) => password,
        None => resolve_password(profile, profile_name)?,
    };

    Ok(ConnectionConfig {
        host: profile.host.clone(),
        credentials: Credentials { username, password },
        tls: tls_verification(profile, defaults),
        timeout: Duration::from_secs(profile.timeout.unwrap_or(defaults.timeout)),
        max_concurrent_requests: usize::try_from(max_concurrent).unwrap_or(1),
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;
    use secrecy::ExposeSecret;

    use super::*;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn loads_profiles_from_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
default_profile = "rack1"

[defaults]
scan_interval = 60

[profiles.rack1]
host = "10.0.0.5"
username = "ADMIN"
password = "hunter2"
burst_interval = 2
"#,
        )
        .unwrap();

        let cfg = load_config_from(&path).unwrap();
        assert_eq!(cfg.default_profile.as_deref(), Some("rack1"));
        assert_eq!(cfg.defaults.scan_interval, 60);
        assert_eq!(cfg.defaults.static_interval, 300);

        let profile = cfg.profile("rack1").unwrap();
        assert_eq!(profile.entry_id("rack1"), "rack1");
        let polling = coordinator_config(profile, &cfg.defaults).unwrap();
        assert_eq!(polling.scan_interval, Duration::from_secs(60));
        assert_eq!(polling.burst_interval, Duration::from_secs(2));
        assert_eq!(polling.burst_duration, Duration::from_secs(60));
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = load_config_from(&dir.path().join("absent.toml")).unwrap();
        assert!(cfg.profiles.is_empty());
        assert_eq!(cfg.defaults.output, "table");
        assert!(cfg.defaults.insecure);
    }

    #[test]
    fn save_round_trips_through_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let mut cfg = Config::default();
        let mut profile = Profile::new("bmc.lan");
        profile.username = Some("ADMIN".into());
        profile.static_interval = Some(600);
        let entry_id = profile.entry_id.clone().unwrap();
        cfg.profiles.insert("default".into(), profile);

        save_config_to(&cfg, &path).unwrap();
        let loaded = load_config_from(&path).unwrap();
        let profile = loaded.profile("default").unwrap();
        assert_eq!(profile.host, "bmc.lan");
        assert_eq!(profile.entry_id("default"), entry_id);
        assert_eq!(profile.static_interval, Some(600));
    }

    #[test]
    fn unknown_profile_lists_available() {
        let mut cfg = Config::default();
        cfg.profiles.insert("b".into(), Profile::new("h"));
        cfg.profiles.insert("a".into(), Profile::new("h"));
        match cfg.profile("c").unwrap_err() {
            ConfigError::ProfileNotFound { name, available } => {
                assert_eq!(name, "c");
                assert_eq!(available, vec!["a".to_owned(), "b".to_owned()]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn out_of_range_polling_is_rejected() {
        let profile = Profile {
            scan_interval: Some(5),
            ..Profile::new("h")
        };
        let err = coordinator_config(&profile, &Defaults::default()).unwrap_err();
        assert!(
            matches!(err, ConfigError::Validation { ref field, .. } if field == "scan_interval")
        );

        let profile = Profile {
            static_interval: Some(901),
            ..Profile::new("h")
        };
        assert!(coordinator_config(&profile, &Defaults::default()).is_err());
    }

    #[test]
    fn password_env_wins_over_keyring_and_plaintext() {
        let profile = Profile {
            password: Some("plain".into()),
            password_env: Some("BMC_PW".into()),
            ..Profile::new("h")
        };
        let pw = resolve_password_with(
            &profile,
            "rack1",
            |name| (name == "BMC_PW").then(|| "from-env".to_owned()),
            |_| Some("from-keyring".into()),
        )
        .unwrap();
        assert_eq!(pw.expose_secret(), "from-env");
    }

    #[test]
    fn keyring_is_keyed_by_profile() {
        let profile = Profile {
            password: Some("plain".into()),
            ..Profile::new("h")
        };
        let pw = resolve_password_with(&profile, "rack1", no_env, |user| {
            (user == "rack1/password").then(|| "from-keyring".to_owned())
        })
        .unwrap();
        assert_eq!(pw.expose_secret(), "from-keyring");

        let pw = resolve_password_with(&profile, "rack2", no_env, |_| None).unwrap();
        assert_eq!(pw.expose_secret(), "plain");
    }

    #[test]
    fn missing_password_is_an_error() {
        let err = resolve_password_with(&Profile::new("h"), "rack1", no_env, |_| None).unwrap_err();
        assert!(matches!(err, ConfigError::NoCredentials { ref profile } if profile == "rack1"));
    }

    #[test]
    fn tls_choice() {
        let defaults = Defaults::default();
        let mut profile = Profile::new("h");
        assert_eq!(
            tls_verification(&profile, &defaults),
            TlsVerification::DangerAcceptInvalid
        );

        profile.ca_cert = Some("/etc/bmc-ca.pem".into());
        assert_eq!(
            tls_verification(&profile, &defaults),
            TlsVerification::CustomCa("/etc/bmc-ca.pem".into())
        );

        profile.ca_cert = None;
        profile.insecure = Some(false);
        assert_eq!(
            tls_verification(&profile, &defaults),
            TlsVerification::SystemDefaults
        );
    }

    #[test]
    fn explicit_password_skips_resolution() {
        let profile = Profile {
            username: Some("ADMIN".into()),
            password_env: Some("UNSET_BMC_PW".into()),
            ..Profile::new("10.0.0.5")
        };
        let config = connection_config(
            &profile,
            "p",
            &Defaults::default(),
            Some(SecretString::from("flag".to_owned())),
        )
        .unwrap();
        assert_eq!(config.credentials.password.expose_secret(), "flag");
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert_eq!(config.tls, TlsVerification::DangerAcceptInvalid);
        assert_eq!(config.max_concurrent_requests, 5);
    }

    #[test]
    fn connection_config_validates_host_and_concurrency() {
        let defaults = Defaults::default();
        let profile = Profile {
            username: Some("ADMIN".into()),
            password: Some("pw".into()),
            ..Profile::new("  ")
        };
        let err = profile_to_connection_config(&profile, "p", &defaults).unwrap_err();
        assert!(matches!(err, ConfigError::Validation { ref field, .. } if field == "host"));

        let profile = Profile {
            host: "10.0.0.5".into(),
            max_concurrent_requests: Some(20),
            ..profile
        };
        let err = profile_to_connection_config(&profile, "p", &defaults).unwrap_err();
        assert!(
            matches!(err, ConfigError::Validation { ref field, .. } if field == "max_concurrent_requests")
        );
    }
}
