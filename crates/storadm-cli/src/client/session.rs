//! Cluster session over TCP node connections

use std::collections::BTreeSet;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;

use storadm_core::error::errno;
use storadm_core::{
    Address, BackendCommand, BackendStatus, BackendTarget, Categories, ClusterError,
    ClusterSession, Connector, GroupId, MonitorScope, MonitorStat, RouteEntry, SessionOptions,
};
use storadm_protocol::{NodeRequest, NodeResponse};

use super::connection::NodeConnection;

/// Opens [`NodeSession`]s
#[derive(Debug, Clone, Copy, Default)]
pub struct TcpConnector;

#[async_trait]
impl Connector for TcpConnector {
    async fn open(&self, options: &SessionOptions) -> Result<Box<dyn ClusterSession>, ClusterError> {
        let session = NodeSession::open(options).await?;
        Ok(Box::new(session))
    }
}

/// Session holding one connection per reachable remote
///
/// Nodes outside the remote list (found through the routing table) get a
/// short-lived connection per request.
pub struct NodeSession {
    nodes: Vec<(Address, Mutex<NodeConnection>)>,
    /// Routing table, fetched at most once per session
    route_table: Mutex<Option<Vec<RouteEntry>>>,
    groups: Vec<GroupId>,
    wait_timeout: Duration,
    check_timeout: Duration,
}

impl NodeSession {
    /// Connect to every remote; at least one has to answer
    pub async fn open(options: &SessionOptions) -> Result<Self, ClusterError> {
        let attempts = futures::future::join_all(
            options
                .remotes
                .iter()
                .map(|address| NodeConnection::connect(address, options.wait_timeout)),
        )
        .await;

        let mut nodes = Vec::with_capacity(attempts.len());
        let mut first_error = None;
        for (address, attempt) in options.remotes.iter().zip(attempts) {
            match attempt {
                Ok(conn) => nodes.push((address.clone(), Mutex::new(conn))),
                Err(e) => {
                    tracing::warn!(%address, error = %e, "Failed to connect to remote");
                    first_error.get_or_insert(e);
                }
            }
        }

        if nodes.is_empty() {
            return Err(first_error
                .unwrap_or_else(|| ClusterError::new(errno::ENXIO, "no remotes to connect to")));
        }
        tracing::info!(connected = nodes.len(), "Cluster session opened");

        let session = Self {
            nodes,
            route_table: Mutex::new(None),
            groups: Vec::new(),
            wait_timeout: options.wait_timeout,
            check_timeout: options.check_timeout,
        };

        if !options.skip_route_discovery {
            let routes = session.routes().await?;
            tracing::debug!(entries = routes.len(), "Routing table discovered");
        }

        Ok(session)
    }

    /// Send a request to a node, reusing the session connection when there is one
    async fn request_to(
        &self,
        address: &Address,
        request: NodeRequest,
        timeout: Duration,
    ) -> Result<NodeResponse, ClusterError> {
        if let Some((_, conn)) = self.nodes.iter().find(|(a, _)| a == address) {
            return conn.lock().await.request(request, timeout).await;
        }

        tracing::debug!(%address, "Node is not a session remote, connecting");
        let mut conn = NodeConnection::connect(address, self.wait_timeout).await?;
        conn.request(request, timeout).await
    }

    async fn fetch_routes(&self) -> Result<Vec<RouteEntry>, ClusterError> {
        let mut first_error = None;
        for (address, conn) in &self.nodes {
            let response = conn
                .lock()
                .await
                .request(NodeRequest::RouteList, self.check_timeout)
                .await;
            match response {
                Ok(NodeResponse::Routes { routes }) => return Ok(routes),
                Ok(other) => {
                    first_error.get_or_insert(unexpected(address, "routes", &other));
                }
                Err(e) => {
                    tracing::warn!(%address, error = %e, "Failed to fetch routing table");
                    first_error.get_or_insert(e);
                }
            }
        }
        Err(first_error.unwrap_or_else(|| ClusterError::new(errno::ENXIO, "no connected nodes")))
    }

    async fn node_stat(
        &self,
        address: &Address,
        categories: Categories,
    ) -> Result<MonitorStat, ClusterError> {
        let request = NodeRequest::MonitorStat {
            categories: categories.bits(),
        };
        match self.request_to(address, request, self.wait_timeout).await? {
            NodeResponse::Stat { stat } => Ok(MonitorStat {
                address: address.clone(),
                stat,
            }),
            other => Err(unexpected(address, "stat", &other)),
        }
    }

    /// Distinct node addresses in the routing table, restricted to the working groups
    fn cluster_nodes(&self, routes: &[RouteEntry]) -> BTreeSet<Address> {
        routes
            .iter()
            .filter(|route| self.groups.is_empty() || self.groups.contains(&route.group_id))
            .map(|route| route.address.clone())
            .collect()
    }
}

fn unexpected(address: &Address, expected: &str, got: &NodeResponse) -> ClusterError {
    ClusterError::protocol(format!(
        "{} answered {:?}, expected {}",
        address, got, expected
    ))
}

fn backends(address: &Address, response: NodeResponse) -> Result<Vec<BackendStatus>, ClusterError> {
    match response {
        NodeResponse::Backends { backends } => Ok(backends),
        other => Err(unexpected(address, "backends", &other)),
    }
}

#[async_trait]
impl ClusterSession for NodeSession {
    fn groups(&self) -> &[GroupId] {
        &self.groups
    }

    fn set_groups(&mut self, groups: Vec<GroupId>) {
        self.groups = groups;
    }

    async fn routes(&self) -> Result<Vec<RouteEntry>, ClusterError> {
        let mut cached = self.route_table.lock().await;
        if let Some(routes) = cached.as_ref() {
            return Ok(routes.clone());
        }

        let routes = self.fetch_routes().await?;
        *cached = Some(routes.clone());
        Ok(routes)
    }

    async fn backend_control(
        &self,
        target: &BackendTarget,
        command: BackendCommand,
    ) -> Result<Vec<BackendStatus>, ClusterError> {
        let request = NodeRequest::BackendControl {
            backend_id: target.backend_id,
            command,
        };
        let response = self
            .request_to(&target.address, request, self.wait_timeout)
            .await?;
        backends(&target.address, response)
    }

    async fn backend_status(&self, address: &Address) -> Result<Vec<BackendStatus>, ClusterError> {
        let response = self
            .request_to(address, NodeRequest::BackendStatus, self.wait_timeout)
            .await?;
        backends(address, response)
    }

    async fn monitor_stat(
        &self,
        scope: MonitorScope,
        categories: Categories,
    ) -> Result<Vec<MonitorStat>, ClusterError> {
        let addresses = match scope {
            MonitorScope::Node(address) => {
                return Ok(vec![self.node_stat(&address, categories).await?]);
            }
            MonitorScope::Cluster => self.cluster_nodes(&self.routes().await?),
        };

        tracing::debug!(nodes = addresses.len(), "Querying monitor statistics");
        let results = futures::future::join_all(
            addresses
                .iter()
                .map(|address| self.node_stat(address, categories)),
        )
        .await;

        let mut stats = Vec::with_capacity(results.len());
        let mut first_error = None;
        for (address, result) in addresses.iter().zip(results) {
            match result {
                Ok(stat) => stats.push(stat),
                Err(e) => {
                    tracing::warn!(%address, error = %e, "Skipping node without statistics");
                    first_error.get_or_insert(e);
                }
            }
        }

        match first_error {
            Some(e) if stats.is_empty() => Err(e),
            _ => Ok(stats),
        }
    }
}
