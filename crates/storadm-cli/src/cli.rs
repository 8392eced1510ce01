//! Command-line definitions
//!
//! Two levels of routing: the top-level command (`backend`, `monitor`)
//! selects a flag set, and a single positional action selects the handler.
//! Both levels are closed enums, so unknown names are rejected by the parser
//! with the list of valid values.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Parser, Subcommand, ValueEnum};

use storadm_core::config::{load_config, ConfigFile};
use storadm_core::{
    Address, BackendCommand, Categories, ConnectionConfig, ConnectionDefaults, GroupId, LogLevel,
    UsageError,
};

#[derive(Debug, Parser)]
#[command(name = "storadm")]
#[command(author, version, about = "Storage cluster administration tool")]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Control the backends of a storage node
    Backend(BackendArgs),

    /// Fetch monitor statistics from storage nodes
    Monitor(MonitorArgs),
}

impl Commands {
    /// Name of the selected top-level command
    pub fn name(&self) -> &'static str {
        match self {
            Commands::Backend(_) => "backend",
            Commands::Monitor(_) => "monitor",
        }
    }
}

/// Connection flags shared by every command
#[derive(Debug, Clone, Args)]
pub struct ConnectionArgs {
    /// Node to connect to (repeatable)
    #[arg(
        short = 'r',
        long = "remote",
        value_name = "HOST:PORT:FAMILY",
        required = true,
        env = "STORADM_REMOTE"
    )]
    pub remotes: Vec<Address>,

    /// Comma-separated group IDs [default: all groups in the routing table]
    #[arg(
        short = 'g',
        long,
        value_name = "GROUPS",
        value_delimiter = ',',
        env = "STORADM_GROUPS"
    )]
    pub groups: Vec<GroupId>,

    /// Log file [default: /dev/stderr]
    #[arg(short = 'l', long = "log", value_name = "PATH", env = "STORADM_LOG")]
    pub log: Option<PathBuf>,

    /// Log level, 0 (debug) to 4 (error) or a level name [default: error]
    #[arg(
        short = 'L',
        long = "log-level",
        value_name = "LEVEL",
        env = "STORADM_LOG_LEVEL"
    )]
    pub log_level: Option<LogLevel>,

    /// Per-request timeout in seconds [default: 5]
    #[arg(long, value_name = "SECONDS", env = "STORADM_WAIT_TIMEOUT")]
    pub wait_timeout: Option<u64>,

    /// Routing-table check timeout in seconds [default: 30]
    #[arg(long, value_name = "SECONDS", env = "STORADM_CHECK_TIMEOUT")]
    pub check_timeout: Option<u64>,

    /// TOML file overriding the built-in defaults
    #[arg(long, value_name = "PATH", env = "STORADM_CONFIG")]
    pub config: Option<PathBuf>,
}

impl ConnectionArgs {
    /// Defaults from `--config`, or the built-in ones
    pub fn defaults(&self) -> Result<ConnectionDefaults, UsageError> {
        match &self.config {
            Some(path) => {
                let file: ConfigFile = load_config(path)?;
                Ok(file.defaults)
            }
            None => Ok(ConnectionDefaults::default()),
        }
    }

    /// Build the connection configuration; performs no network I/O
    pub fn to_config(
        &self,
        defaults: &ConnectionDefaults,
        single_remote_required: bool,
    ) -> Result<ConnectionConfig, UsageError> {
        ConnectionConfig::builder()
            .remotes(self.remotes.iter().cloned())
            .groups(self.groups.iter().copied())
            .wait_timeout(self.wait_timeout.map(Duration::from_secs))
            .check_timeout(self.check_timeout.map(Duration::from_secs))
            .log_target(self.log.clone())
            .log_level(self.log_level)
            .single_remote_required(single_remote_required)
            .build(defaults)
    }
}

#[derive(Debug, Clone, Args)]
pub struct BackendArgs {
    /// Backend ID (required by every action except status)
    #[arg(long = "backend", value_name = "ID")]
    pub backend: Option<u32>,

    #[command(flatten)]
    pub connection: ConnectionArgs,

    /// Action to perform
    #[arg(value_enum)]
    pub action: BackendAction,
}

/// Backend actions
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
#[value(rename_all = "snake_case")]
pub enum BackendAction {
    /// Start the backend
    Enable,
    /// Stop the backend
    Disable,
    /// Start defragmentation
    Defrag,
    /// Start compaction
    Compact,
    /// Stop a running defragmentation
    StopDefrag,
    /// Reject writes
    MakeReadonly,
    /// Accept writes again
    MakeWritable,
    /// Show every backend of the node
    Status,
}

impl BackendAction {
    /// The state change this action requests, `None` for `status`
    pub fn command(self) -> Option<BackendCommand> {
        match self {
            BackendAction::Enable => Some(BackendCommand::Enable),
            BackendAction::Disable => Some(BackendCommand::Disable),
            BackendAction::Defrag => Some(BackendCommand::StartDefrag),
            BackendAction::Compact => Some(BackendCommand::StartCompact),
            BackendAction::StopDefrag => Some(BackendCommand::StopDefrag),
            BackendAction::MakeReadonly => Some(BackendCommand::MakeReadonly),
            BackendAction::MakeWritable => Some(BackendCommand::MakeWritable),
            BackendAction::Status => None,
        }
    }

    pub fn name(self) -> String {
        self.to_possible_value()
            .map(|v| v.get_name().to_string())
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, Args)]
pub struct MonitorArgs {
    /// Category bitmask, decimal or 0x-prefixed hex [default: all]
    #[arg(long, value_name = "N")]
    pub categories: Option<Categories>,

    #[command(flatten)]
    pub connection: ConnectionArgs,

    /// Action to perform
    #[arg(value_enum)]
    pub action: MonitorAction,
}

/// Monitor actions
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum MonitorAction {
    /// Query every node in the routing table
    All,
    /// Query only the configured remote
    One,
}
