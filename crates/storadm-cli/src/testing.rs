//! In-memory cluster used by unit tests

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use futures::{SinkExt, StreamExt};
use tokio::net::TcpListener;
use tokio_util::codec::Framed;

use storadm_core::{
    Address, BackendCommand, BackendState, BackendStatus, BackendTarget, Categories,
    ClusterError, ClusterSession, Connector, DefragState, GroupId, MonitorScope, MonitorStat,
    RouteEntry, SessionOptions,
};
use storadm_protocol::{JsonLinesCodec, NodeRequest, NodeResponse};

/// Shared state of a fake cluster, inspected by tests after a run
#[derive(Debug, Default)]
pub struct FakeCluster {
    /// Backends per node, in node order
    pub backends: BTreeMap<String, Vec<BackendStatus>>,
    /// Statistics per node; routes decide which nodes are asked
    pub stats: BTreeMap<String, serde_json::Value>,
    pub routes: Vec<RouteEntry>,
    /// Error returned by `open` instead of a session
    pub open_error: Option<ClusterError>,
    /// Error returned by every operation
    pub op_error: Option<ClusterError>,
    /// Calls made, in order
    pub calls: Vec<String>,
    /// Groups of the last session when it was dropped
    pub final_groups: Vec<GroupId>,
}

#[derive(Clone, Default)]
pub struct FakeConnector {
    pub cluster: Arc<Mutex<FakeCluster>>,
}

impl FakeConnector {
    pub fn new(cluster: FakeCluster) -> Self {
        Self {
            cluster: Arc::new(Mutex::new(cluster)),
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.cluster.lock().unwrap().calls.clone()
    }
}

#[async_trait]
impl Connector for FakeConnector {
    async fn open(&self, options: &SessionOptions) -> Result<Box<dyn ClusterSession>, ClusterError> {
        let mut cluster = self.cluster.lock().unwrap();
        cluster.calls.push(format!(
            "open skip_routes={}",
            options.skip_route_discovery
        ));
        if let Some(err) = cluster.open_error.clone() {
            return Err(err);
        }
        Ok(Box::new(FakeSession {
            cluster: Arc::clone(&self.cluster),
            groups: Vec::new(),
        }))
    }
}

pub struct FakeSession {
    cluster: Arc<Mutex<FakeCluster>>,
    groups: Vec<GroupId>,
}

impl FakeSession {
    fn record(&self, call: String) -> Result<(), ClusterError> {
        let mut cluster = self.cluster.lock().unwrap();
        cluster.calls.push(call);
        match cluster.op_error.clone() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

impl Drop for FakeSession {
    fn drop(&mut self) {
        if let Ok(mut cluster) = self.cluster.lock() {
            cluster.final_groups = self.groups.clone();
        }
    }
}

#[async_trait]
impl ClusterSession for FakeSession {
    fn groups(&self) -> &[GroupId] {
        &self.groups
    }

    fn set_groups(&mut self, groups: Vec<GroupId>) {
        self.groups = groups;
    }

    async fn routes(&self) -> Result<Vec<RouteEntry>, ClusterError> {
        self.record("routes".to_string())?;
        Ok(self.cluster.lock().unwrap().routes.clone())
    }

    async fn backend_control(
        &self,
        target: &BackendTarget,
        command: BackendCommand,
    ) -> Result<Vec<BackendStatus>, ClusterError> {
        self.record(format!("{} {}", command, target))?;

        let mut cluster = self.cluster.lock().unwrap();
        let backends = cluster
            .backends
            .entry(target.address.to_string())
            .or_default();
        let Some(backend) = backends
            .iter_mut()
            .find(|b| b.backend_id == target.backend_id)
        else {
            return Err(ClusterError::new(-2, "backend not found"));
        };

        match command {
            BackendCommand::Enable => backend.state = BackendState::Enabled,
            BackendCommand::Disable => backend.state = BackendState::Disabled,
            BackendCommand::StartDefrag => backend.defrag_state = DefragState::InProgress,
            BackendCommand::StartCompact => {
                backend.defrag_state = DefragState::CompactInProgress
            }
            BackendCommand::StopDefrag => backend.defrag_state = DefragState::NotStarted,
            BackendCommand::MakeReadonly => backend.read_only = true,
            BackendCommand::MakeWritable => backend.read_only = false,
        }
        Ok(backends.clone())
    }

    async fn backend_status(&self, address: &Address) -> Result<Vec<BackendStatus>, ClusterError> {
        self.record(format!("status {}", address))?;
        let cluster = self.cluster.lock().unwrap();
        Ok(cluster
            .backends
            .get(&address.to_string())
            .cloned()
            .unwrap_or_default())
    }

    async fn monitor_stat(
        &self,
        scope: MonitorScope,
        categories: Categories,
    ) -> Result<Vec<MonitorStat>, ClusterError> {
        let addresses: Vec<Address> = match &scope {
            MonitorScope::Node(address) => vec![address.clone()],
            MonitorScope::Cluster => {
                // reverse order, so callers cannot rely on arrival order
                let cluster = self.cluster.lock().unwrap();
                let mut addrs: Vec<Address> =
                    cluster.routes.iter().map(|r| r.address.clone()).collect();
                addrs.sort();
                addrs.dedup();
                addrs.reverse();
                addrs
            }
        };
        self.record(format!("monitor {:?} {}", scope, categories))?;

        let cluster = self.cluster.lock().unwrap();
        Ok(addresses
            .into_iter()
            .filter_map(|address| {
                let stat = cluster.stats.get(&address.to_string())?.clone();
                Some(MonitorStat { address, stat })
            })
            .collect())
    }
}

pub fn addr(s: &str) -> Address {
    s.parse().unwrap()
}

pub fn route(address: &str, group_id: GroupId) -> RouteEntry {
    RouteEntry {
        address: addr(address),
        group_id,
        backend_id: 0,
    }
}

/// Start a node on a local port answering with `handler`
///
/// `None` leaves the request unanswered, which keeps the connection open and
/// silent.
pub async fn spawn_node<F>(handler: F) -> Address
where
    F: Fn(NodeRequest) -> Option<NodeResponse> + Send + Sync + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    let handler = Arc::new(handler);

    tokio::spawn(async move {
        while let Ok((stream, _)) = listener.accept().await {
            let handler = Arc::clone(&handler);
            tokio::spawn(async move {
                let mut framed =
                    Framed::new(stream, JsonLinesCodec::<NodeRequest, NodeResponse>::new());
                while let Some(Ok(request)) = framed.next().await {
                    match handler(request) {
                        Some(response) => {
                            if framed.send(response).await.is_err() {
                                break;
                            }
                        }
                        None => futures::future::pending::<()>().await,
                    }
                }
            });
        }
    });

    addr(&format!("127.0.0.1:{}:2", port))
}

/// Address of a local port nobody listens on
pub fn dead_address() -> Address {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    addr(&format!("127.0.0.1:{}:2", port))
}
