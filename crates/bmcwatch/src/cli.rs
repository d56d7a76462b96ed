//! Clap derive structures for the `bmcwatch` CLI.
//!
//! Defines the complete command tree, global flags, and shared types.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// bmcwatch -- monitor and control Supermicro BMCs over Redfish
#[derive(Debug, Parser)]
#[command(
    name = "bmcwatch",
    version,
    about = "Monitor and control Supermicro BMCs over Redfish",
    long_about = "Polls a Supermicro BMC through its Redfish API: sensors, power,\n\
        fan mode, firmware and protocol state, with control actions and a\n\
        long-running watch mode that adapts its polling rate after changes.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// BMC profile to use
    #[arg(long, short = 'p', env = "BMCWATCH_PROFILE", global = true)]
    pub profile: Option<String>,

    /// BMC host or URL (overrides profile)
    #[arg(long, short = 'H', env = "BMCWATCH_HOST", global = true)]
    pub host: Option<String>,

    /// BMC username (overrides profile)
    #[arg(long, short = 'u', env = "BMCWATCH_USERNAME", global = true)]
    pub username: Option<String>,

    /// BMC password (overrides keyring and profile)
    #[arg(long, env = "BMCWATCH_PASSWORD", global = true, hide_env_values = true)]
    pub password: Option<String>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "BMCWATCH_OUTPUT",
        default_value = "table",
        global = true
    )]
    pub output: OutputFormat,

    /// When to use color output
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorMode,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Skip confirmation prompts
    #[arg(long, short = 'y', global = true)]
    pub yes: bool,

    /// Accept self-signed TLS certificates
    #[arg(long, short = 'k', env = "BMCWATCH_INSECURE", global = true)]
    pub insecure: bool,

    /// Request timeout in seconds (overrides profile)
    #[arg(long, env = "BMCWATCH_TIMEOUT", global = true)]
    pub timeout: Option<u64>,
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// YAML
    Yaml,
    /// Plain text, one value per line (scripting)
    Plain,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect (color if terminal is interactive)
    Auto,
    /// Always emit color codes
    Always,
    /// Never emit color codes
    Never,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Show BMC identity, power and health at a glance
    #[command(alias = "st")]
    Status,

    /// List sensors, binary sensors and control states
    #[command(alias = "s")]
    Sensors(SensorsArgs),

    /// Poll continuously, printing each refresh
    #[command(alias = "w")]
    Watch(WatchArgs),

    /// Host power control
    Power(PowerArgs),

    /// Restart the BMC itself
    BmcReset,

    /// Set the chassis indicator LED
    Led(LedArgs),

    /// Show or set the fan control mode
    FanMode(FanModeArgs),

    /// Show or set the boot source override
    Boot(BootArgs),

    /// Enable or disable a BMC network protocol
    Protocol(ProtocolArgs),

    /// Re-arm the chassis intrusion sensor
    IntrusionReset,

    /// Export a redacted diagnostics document
    Diagnostics(DiagnosticsArgs),

    /// Manage CLI configuration and profiles
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── Sensors ──────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct SensorsArgs {
    /// Only show one platform
    #[arg(long, value_enum)]
    pub platform: Option<PlatformFilter>,

    /// Include unavailable entities and buttons
    #[arg(long, short = 'a')]
    pub all: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum PlatformFilter {
    Sensor,
    BinarySensor,
    Switch,
    Button,
    Select,
}

// ── Watch ────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct WatchArgs {
    /// Start in burst mode (fast polling for the burst duration)
    #[arg(long)]
    pub burst: bool,

    /// Offer to repair the connection when an issue is raised or the
    /// credentials are rejected
    #[arg(long)]
    pub repair: bool,

    /// Scan interval in seconds (overrides profile)
    #[arg(long)]
    pub scan_interval: Option<u64>,
}

// ── Control ──────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct PowerArgs {
    #[arg(value_enum)]
    pub action: PowerAction,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum PowerAction {
    /// Power on
    On,
    /// Immediate power off
    Off,
    /// Graceful OS shutdown
    Shutdown,
    /// Graceful OS restart
    Restart,
    /// Hard reset
    ForceRestart,
    /// Send a non-maskable interrupt
    Nmi,
}

#[derive(Debug, Args)]
pub struct LedArgs {
    #[arg(value_enum)]
    pub state: LedState,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LedState {
    On,
    Off,
    Blink,
}

#[derive(Debug, Args)]
pub struct FanModeArgs {
    /// New mode (e.g. "Standard", "Full Speed", "optimal"); omit to list
    pub mode: Option<String>,
}

#[derive(Debug, Args)]
pub struct BootArgs {
    /// Boot target (e.g. "PXE", "Hdd", "BIOS Setup"); omit to list
    pub target: Option<String>,

    /// Keep the override for every boot instead of the next one only
    #[arg(long)]
    pub continuous: bool,
}

#[derive(Debug, Args)]
pub struct ProtocolArgs {
    #[arg(value_enum)]
    pub protocol: ProtocolName,

    #[arg(value_enum)]
    pub state: Toggle,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ProtocolName {
    Http,
    Ssh,
    Ipmi,
    Snmp,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Toggle {
    On,
    Off,
}

// ── Diagnostics ──────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct DiagnosticsArgs {
    /// Write to a file instead of stdout
    #[arg(long, short = 'f')]
    pub file: Option<PathBuf>,
}

// ── Config ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Interactive setup wizard
    Init,

    /// Show the current configuration (passwords redacted)
    Show,

    /// Set a profile value
    Set {
        /// Key (host, username, password_env, insecure, timeout, ca_cert,
        /// scan_interval, burst_interval, burst_duration, static_interval,
        /// max_concurrent_requests)
        key: String,
        value: String,
    },

    /// List profiles
    Profiles,

    /// Set the default profile
    Use { name: String },

    /// Store a profile's password in the system keyring
    SetPassword {
        /// Profile (defaults to the active profile)
        #[arg(long)]
        profile: Option<String>,
    },
}

// ── Completions ──────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Target shell
    #[arg(value_enum)]
    pub shell: clap_complete::Shell,
}
