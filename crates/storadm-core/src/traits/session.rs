//! Cluster session traits
//!
//! These traits are the seam between the command layer and whatever talks to
//! the cluster. The CLI ships a TCP implementation; tests use in-memory ones.

use async_trait::async_trait;
use std::collections::BTreeSet;
use std::time::Duration;

use storadm_protocol::{Address, BackendCommand, BackendStatus, RouteEntry};

use crate::error::ClusterError;
use crate::types::{BackendTarget, Categories, GroupId, MonitorScope, MonitorStat};

/// Parameters for opening a session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionOptions {
    /// Nodes to connect to
    pub remotes: Vec<Address>,
    /// Per-request timeout
    pub wait_timeout: Duration,
    /// Timeout for routing-table requests
    pub check_timeout: Duration,
    /// Do not fetch the routing table while opening
    pub skip_route_discovery: bool,
}

/// An open connection to the cluster
#[async_trait]
pub trait ClusterSession: Send + Sync {
    /// Groups operations are directed at
    fn groups(&self) -> &[GroupId];

    /// Replace the working group set
    fn set_groups(&mut self, groups: Vec<GroupId>);

    /// Current routing table as seen by the connected nodes
    async fn routes(&self) -> Result<Vec<RouteEntry>, ClusterError>;

    /// Apply a state change to one backend and return the node's backend list
    async fn backend_control(
        &self,
        target: &BackendTarget,
        command: BackendCommand,
    ) -> Result<Vec<BackendStatus>, ClusterError>;

    /// Return every backend of a node
    async fn backend_status(&self, address: &Address) -> Result<Vec<BackendStatus>, ClusterError>;

    /// Query monitor statistics, one entry per responding node
    async fn monitor_stat(
        &self,
        scope: MonitorScope,
        categories: Categories,
    ) -> Result<Vec<MonitorStat>, ClusterError>;

    /// Set the working groups to every group present in the routing table
    async fn resolve_groups(&mut self) -> Result<Vec<GroupId>, ClusterError> {
        let routes = self.routes().await?;
        let groups: Vec<GroupId> = routes
            .iter()
            .map(|route| route.group_id)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        tracing::debug!(?groups, "Resolved groups from routing table");
        self.set_groups(groups.clone());
        Ok(groups)
    }
}

/// Opens sessions
#[async_trait]
pub trait Connector: Send + Sync {
    async fn open(&self, options: &SessionOptions) -> Result<Box<dyn ClusterSession>, ClusterError>;
}
