//! Per-invocation connection configuration

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::time::Duration;

use storadm_protocol::Address;

use super::{ConnectionDefaults, LogLevel};
use crate::error::UsageError;
use crate::traits::SessionOptions;
use crate::types::GroupId;

/// Validated connection settings for one invocation
///
/// Immutable once built. Construction performs no I/O; groups left empty are
/// resolved later from the routing table of an open session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionConfig {
    remotes: Vec<Address>,
    groups: BTreeSet<GroupId>,
    wait_timeout: Duration,
    check_timeout: Duration,
    log_target: PathBuf,
    log_level: LogLevel,
    single_remote_required: bool,
}

/// Builder for [`ConnectionConfig`]
///
/// Optional values fall back to the [`ConnectionDefaults`] handed to
/// [`ConnectionConfigBuilder::build`].
#[derive(Debug, Clone, Default)]
pub struct ConnectionConfigBuilder {
    remotes: Vec<Address>,
    groups: Vec<GroupId>,
    wait_timeout: Option<Duration>,
    check_timeout: Option<Duration>,
    log_target: Option<PathBuf>,
    log_level: Option<LogLevel>,
    single_remote_required: bool,
}

impl ConnectionConfigBuilder {
    pub fn remotes(mut self, remotes: impl IntoIterator<Item = Address>) -> Self {
        self.remotes = remotes.into_iter().collect();
        self
    }

    pub fn groups(mut self, groups: impl IntoIterator<Item = GroupId>) -> Self {
        self.groups = groups.into_iter().collect();
        self
    }

    pub fn wait_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.wait_timeout = timeout;
        self
    }

    pub fn check_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.check_timeout = timeout;
        self
    }

    pub fn log_target(mut self, target: Option<PathBuf>) -> Self {
        self.log_target = target;
        self
    }

    pub fn log_level(mut self, level: Option<LogLevel>) -> Self {
        self.log_level = level;
        self
    }

    pub fn single_remote_required(mut self, required: bool) -> Self {
        self.single_remote_required = required;
        self
    }

    /// Validate and freeze the configuration
    pub fn build(self, defaults: &ConnectionDefaults) -> Result<ConnectionConfig, UsageError> {
        match (self.remotes.len(), self.single_remote_required) {
            (0, _) => return Err(UsageError::NoRemotes),
            (1, _) | (_, false) => {}
            (n, true) => return Err(UsageError::SingleRemoteRequired(n)),
        }

        Ok(ConnectionConfig {
            remotes: self.remotes,
            groups: self.groups.into_iter().collect(),
            wait_timeout: self.wait_timeout.unwrap_or(defaults.wait_timeout),
            check_timeout: self.check_timeout.unwrap_or(defaults.check_timeout),
            log_target: self
                .log_target
                .unwrap_or_else(|| defaults.log_target.clone()),
            log_level: self.log_level.unwrap_or(defaults.log_level),
            single_remote_required: self.single_remote_required,
        })
    }
}

impl ConnectionConfig {
    /// Start building a configuration
    pub fn builder() -> ConnectionConfigBuilder {
        ConnectionConfigBuilder::default()
    }

    /// The first (for single-remote commands, the only) remote
    pub fn primary_remote(&self) -> &Address {
        // build() rejects an empty remote list
        &self.remotes[0]
    }

    /// Explicitly requested groups; empty means resolve from the routing table
    pub fn groups(&self) -> &BTreeSet<GroupId> {
        &self.groups
    }

    pub fn log_target(&self) -> &Path {
        &self.log_target
    }

    pub fn log_level(&self) -> LogLevel {
        self.log_level
    }

    /// Options handed to a [`Connector`](crate::traits::Connector)
    pub fn session_options(&self) -> SessionOptions {
        SessionOptions {
            remotes: self.remotes.clone(),
            wait_timeout: self.wait_timeout,
            check_timeout: self.check_timeout,
            skip_route_discovery: self.single_remote_required,
        }
    }
}
