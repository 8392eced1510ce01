//! Built-in and file-provided connection defaults

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use super::serde_utils::duration_secs;

/// Severity threshold for client logging
///
/// Numeric codes follow the cluster's log levels, so `-L 4` and `-L error`
/// are equivalent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", try_from = "RawLogLevel")]
pub enum LogLevel {
    Debug,
    Notice,
    Info,
    Warning,
    Error,
}

impl LogLevel {
    /// Look up a level by numeric severity code
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(LogLevel::Debug),
            1 => Some(LogLevel::Notice),
            2 => Some(LogLevel::Info),
            3 => Some(LogLevel::Warning),
            4 => Some(LogLevel::Error),
            _ => None,
        }
    }

    /// Equivalent `tracing` filter directive
    pub fn as_directive(self) -> &'static str {
        match self {
            LogLevel::Debug => "debug",
            LogLevel::Notice | LogLevel::Info => "info",
            LogLevel::Warning => "warn",
            LogLevel::Error => "error",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LogLevel::Debug => "debug",
            LogLevel::Notice => "notice",
            LogLevel::Info => "info",
            LogLevel::Warning => "warning",
            LogLevel::Error => "error",
        };
        f.write_str(name)
    }
}

impl FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Ok(code) = s.parse::<u8>() {
            return LogLevel::from_code(code)
                .ok_or_else(|| format!("unknown log level {} (expected 0-4)", code));
        }
        match s.to_ascii_lowercase().as_str() {
            "debug" => Ok(LogLevel::Debug),
            "notice" => Ok(LogLevel::Notice),
            "info" => Ok(LogLevel::Info),
            "warning" | "warn" => Ok(LogLevel::Warning),
            "error" => Ok(LogLevel::Error),
            _ => Err(format!("unknown log level '{}'", s)),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawLogLevel {
    Code(u8),
    Name(String),
}

impl TryFrom<RawLogLevel> for LogLevel {
    type Error = String;

    fn try_from(raw: RawLogLevel) -> Result<Self, String> {
        match raw {
            RawLogLevel::Code(code) => code.to_string().parse(),
            RawLogLevel::Name(name) => name.parse(),
        }
    }
}

/// Values used for connection flags the user did not pass
///
/// Passed explicitly into config construction; nothing reads process-wide
/// defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConnectionDefaults {
    /// How long to wait for a single request
    #[serde(with = "duration_secs")]
    pub wait_timeout: Duration,

    /// How long to wait for routing-table checks
    #[serde(with = "duration_secs")]
    pub check_timeout: Duration,

    /// Where client logs go
    #[serde(rename = "log")]
    pub log_target: PathBuf,

    /// Minimum severity that is logged
    pub log_level: LogLevel,
}

impl Default for ConnectionDefaults {
    fn default() -> Self {
        Self {
            wait_timeout: Duration::from_secs(5),
            check_timeout: Duration::from_secs(30),
            log_target: PathBuf::from("/dev/stderr"),
            log_level: LogLevel::Error,
        }
    }
}

/// Layout of the optional TOML defaults file
///
/// ```toml
/// [defaults]
/// wait_timeout = 10
/// check_timeout = 60
/// log = "/var/log/storadm.log"
/// log_level = "info"
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfigFile {
    pub defaults: ConnectionDefaults,
}
