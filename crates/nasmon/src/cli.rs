//! Clap derive structures for the `nasmon` CLI.
//!
//! Defines the complete command tree, global flags, and shared types.

use std::time::Duration;

use clap::{Args, Parser, Subcommand, ValueEnum};
use nasmon_core::{DeviceType, HistoryType};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// nasmon -- monitor a NAS from the command line
#[derive(Debug, Parser)]
#[command(
    name = "nasmon",
    version,
    about = "Monitor NAS hardware, ZFS pools and host health from the command line",
    long_about = "A CLI for the NAS Monitor backend.\n\n\
        Reads inventory, metrics and latest values, toggles monitored devices,\n\
        and can watch the backend live with automatic reconnection.",
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
    /// Backend profile to use
    #[arg(long, short = 'p', env = "NASMON_PROFILE", global = true)]
    pub profile: Option<String>,

    /// Backend base URL (overrides profile)
    #[arg(long, short = 'a', env = "NASMON_API_BASE", global = true)]
    pub api_base: Option<String>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "NASMON_OUTPUT",
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
    #[arg(long, short = 'k', env = "NASMON_INSECURE", global = true)]
    pub insecure: bool,

    /// Request timeout in seconds (overrides profile)
    #[arg(long, env = "NASMON_TIMEOUT", global = true)]
    pub timeout: Option<u64>,
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// Plain text, one value per line (scripting)
    Plain,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
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
    /// Show the hardware inventory (pools, CPU, RAM, network, disks)
    #[command(alias = "inv")]
    Inventory,

    /// Show the backend's dashboard settings (poll intervals, SMART levels)
    Settings,

    /// Query metric time series
    #[command(alias = "m")]
    Metrics(MetricsArgs),

    /// Show the latest value per device and label
    Latest(LatestArgs),

    /// Manage monitored devices
    #[command(alias = "dev", alias = "d")]
    Devices(DevicesArgs),

    /// Host information
    #[command(alias = "sys")]
    System(SystemArgs),

    /// Host power actions
    Host(HostArgs),

    /// Follow the backend live, printing connectivity and latest values
    #[command(alias = "w")]
    Watch(WatchArgs),

    /// Manage CLI configuration and profiles
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── Metrics ──────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct MetricsArgs {
    /// Device name (e.g. "cpu", "sda", "tank")
    #[arg(long, short = 'n')]
    pub device: Option<String>,

    /// Device types to include when no device is named
    #[arg(long = "type", short = 't', value_delimiter = ',')]
    pub device_types: Vec<DeviceTypeArg>,

    /// Granularity
    #[arg(long, default_value = "raw")]
    pub history: HistoryArg,

    /// Lookback window in hours (raw granularity only)
    #[arg(long)]
    pub hours: Option<u32>,

    /// Only show the last N samples
    #[arg(long, short = 'l')]
    pub limit: Option<usize>,
}

#[derive(Debug, Args)]
pub struct LatestArgs {
    /// Device types to include (default: all)
    #[arg(long = "type", short = 't', value_delimiter = ',')]
    pub device_types: Vec<DeviceTypeArg>,
}

/// CLI mirror of [`DeviceType`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum DeviceTypeArg {
    Cpu,
    Ram,
    Network,
    Storage,
    ZfsPool,
}

impl From<DeviceTypeArg> for DeviceType {
    fn from(arg: DeviceTypeArg) -> Self {
        match arg {
            DeviceTypeArg::Cpu => DeviceType::Cpu,
            DeviceTypeArg::Ram => DeviceType::Ram,
            DeviceTypeArg::Network => DeviceType::Network,
            DeviceTypeArg::Storage => DeviceType::Storage,
            DeviceTypeArg::ZfsPool => DeviceType::ZfsPool,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum HistoryArg {
    /// Raw samples
    Raw,
    /// Daily rollups
    Daily,
    /// Full history
    History,
}

impl From<HistoryArg> for HistoryType {
    fn from(arg: HistoryArg) -> Self {
        match arg {
            HistoryArg::Raw => HistoryType::Raw,
            HistoryArg::Daily => HistoryType::Daily,
            HistoryArg::History => HistoryType::History,
        }
    }
}

// ── Devices ──────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct DevicesArgs {
    #[command(subcommand)]
    pub command: DevicesCommand,
}

#[derive(Debug, Subcommand)]
pub enum DevicesCommand {
    /// List registered devices
    #[command(alias = "ls")]
    List {
        /// Only show devices of this type
        #[arg(long = "type", short = 't')]
        device_type: Option<DeviceTypeArg>,
    },

    /// Resume monitoring a device
    Enable {
        /// Device name
        name: String,
    },

    /// Stop monitoring a device
    Disable {
        /// Device name
        name: String,
    },
}

// ── System & Host ────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct SystemArgs {
    #[command(subcommand)]
    pub command: SystemCommand,
}

#[derive(Debug, Subcommand)]
pub enum SystemCommand {
    /// Detailed host information
    Info,
}

#[derive(Debug, Args)]
pub struct HostArgs {
    #[command(subcommand)]
    pub command: HostCommand,
}

#[derive(Debug, Subcommand)]
pub enum HostCommand {
    /// Reboot the NAS host
    Reboot,

    /// Power off the NAS host
    #[command(alias = "shutdown")]
    Poweroff,
}

// ── Watch ────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct WatchArgs {
    /// Stop after this long (e.g. "30s", "5m"); default runs until Ctrl-C
    #[arg(long, short = 'd', value_parser = humantime::parse_duration)]
    pub duration: Option<Duration>,

    /// Reconnection probe period (e.g. "3s")
    #[arg(long, value_parser = humantime::parse_duration)]
    pub reconnect_every: Option<Duration>,
}

// ── Config ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show the effective configuration
    Show,

    /// Print the config file location
    Path,

    /// Create or update a profile
    Init {
        /// Backend base URL (e.g. "http://nas.local:8000")
        #[arg(long)]
        url: String,

        /// Profile name
        #[arg(long, default_value = "default")]
        name: String,

        /// Make this the default profile
        #[arg(long)]
        set_default: bool,
    },
}

// ── Completions ──────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Target shell
    pub shell: clap_complete::Shell,
}
