//! storadm-core: Core abstractions and configuration for storadm
//!
//! This crate provides the connection configuration, error types, domain
//! types and the cluster session traits shared by the CLI and its tests.

pub mod config;
pub mod error;
pub mod traits;
pub mod types;

pub use config::{ConnectionConfig, ConnectionDefaults, LogLevel};
pub use error::{ClusterError, ConfigError, UsageError};
pub use traits::{ClusterSession, Connector, SessionOptions};
pub use types::{BackendTarget, Categories, GroupId, MonitorScope, MonitorStat};

pub use storadm_protocol::{
    Address, AddressFamily, BackendCommand, BackendState, BackendStatus, DefragState,
    RouteEntry, StartError, Timestamp,
};
