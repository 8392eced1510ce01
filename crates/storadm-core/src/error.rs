//! Core error types for storadm
//!
//! Failures fall into two disjoint classes: [`UsageError`] for malformed
//! command-line input, detected before any network traffic, and
//! [`ClusterError`] for anything the cluster or the connection to it reports.

use std::path::PathBuf;
use storadm_protocol::ProtocolError;
use thiserror::Error;

/// Negative errno values used as cluster error codes
pub mod errno {
    pub const ENXIO: i32 = -6;
    pub const EIO: i32 = -5;
    pub const EPROTO: i32 = -71;
    pub const ETIMEDOUT: i32 = -110;
    pub const ECONNREFUSED: i32 = -111;
}

/// Error reported by the cluster or by the transport to it
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message} (code {code})")]
pub struct ClusterError {
    /// Numeric error code, a negative errno by convention
    pub code: i32,
    /// Human-readable description
    pub message: String,
}

impl ClusterError {
    /// Create a new cluster error
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    /// An operation did not complete within its timeout
    pub fn timeout(what: impl std::fmt::Display) -> Self {
        Self::new(errno::ETIMEDOUT, format!("{}: timed out", what))
    }

    /// The peer sent something that does not follow the protocol
    pub fn protocol(what: impl std::fmt::Display) -> Self {
        Self::new(errno::EPROTO, format!("protocol error: {}", what))
    }

    /// Convert an I/O error, keeping its errno when there is one
    pub fn io(context: impl std::fmt::Display, err: &std::io::Error) -> Self {
        let code = match err.kind() {
            std::io::ErrorKind::ConnectionRefused => errno::ECONNREFUSED,
            std::io::ErrorKind::TimedOut => errno::ETIMEDOUT,
            _ => err.raw_os_error().map(|e| -e).unwrap_or(errno::EIO),
        };
        Self::new(code, format!("{}: {}", context, err))
    }
}

impl From<ProtocolError> for ClusterError {
    fn from(err: ProtocolError) -> Self {
        match err {
            ProtocolError::Io(e) => ClusterError::io("transport", &e),
            other => ClusterError::protocol(other),
        }
    }
}

/// Malformed or incomplete command-line input
#[derive(Error, Debug)]
pub enum UsageError {
    /// No `--remote` was given
    #[error("at least one --remote is required")]
    NoRemotes,

    /// The command targets a single node but several remotes were given
    #[error("exactly one --remote is required, got {0}")]
    SingleRemoteRequired(usize),

    /// A backend action was invoked without `--backend`
    #[error("action '{0}' requires --backend")]
    MissingBackendId(String),

    /// The defaults file could not be loaded
    #[error("{0}")]
    Config(#[from] ConfigError),
}

/// Configuration-related errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Config file not found
    #[error("Config file not found: {0}")]
    NotFound(PathBuf),

    /// Invalid configuration
    #[error("Invalid config: {0}")]
    Invalid(String),

    /// TOML parse error
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
}
