//! Monitor command implementation

use storadm_core::{Categories, ClusterError, ClusterSession, ConnectionConfig, MonitorScope};

use crate::cli::{MonitorAction, MonitorArgs};
use crate::output::StatsReport;

/// A validated monitor query
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonitorRequest {
    pub scope: MonitorScope,
    pub categories: Categories,
}

impl MonitorRequest {
    pub fn from_args(args: &MonitorArgs, config: &ConnectionConfig) -> Self {
        let scope = match args.action {
            MonitorAction::All => MonitorScope::Cluster,
            MonitorAction::One => MonitorScope::Node(config.primary_remote().clone()),
        };

        Self {
            scope,
            categories: args.categories.unwrap_or_default(),
        }
    }
}

/// Execute a monitor query
///
/// Results are keyed by node address; the map keeps keys sorted no matter in
/// which order nodes answered.
pub async fn run_monitor(
    session: &dyn ClusterSession,
    request: &MonitorRequest,
) -> Result<StatsReport, ClusterError> {
    tracing::info!(
        scope = ?request.scope,
        categories = %request.categories,
        "Requesting monitor statistics"
    );

    let stats = session
        .monitor_stat(request.scope.clone(), request.categories)
        .await?;

    let mut report = StatsReport::new();
    for entry in stats {
        let key = entry.address.to_string();
        if report.insert(key.clone(), entry.stat).is_some() {
            tracing::warn!(address = %key, "Duplicate statistics for node, keeping the last");
        }
    }

    tracing::debug!(nodes = report.len(), "Monitor statistics received");
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{addr, route, FakeCluster, FakeConnector};
    use storadm_core::{Connector, SessionOptions};

    async fn open(cluster: FakeCluster) -> (FakeConnector, Box<dyn ClusterSession>) {
        let connector = FakeConnector::new(cluster);
        let session = connector
            .open(&SessionOptions {
                remotes: vec![addr("host1:1025:2")],
                wait_timeout: std::time::Duration::from_secs(5),
                check_timeout: std::time::Duration::from_secs(30),
                skip_route_discovery: true,
            })
            .await
            .unwrap();
        (connector, session)
    }

    fn three_nodes() -> FakeCluster {
        FakeCluster {
            routes: vec![
                route("host2:1025:2", 1),
                route("host1:1025:2", 1),
                route("host3:1025:2", 2),
                route("host1:1025:2", 2),
            ],
            stats: [
                ("host1:1025:2", serde_json::json!({ "io": { "queue": 1 } })),
                ("host2:1025:2", serde_json::json!({ "io": { "queue": 2 } })),
                ("host3:1025:2", serde_json::json!({ "io": { "queue": 3 } })),
            ]
            .into_iter()
            .map(|(k, v)| (k.to_string(), v))
            .collect(),
            ..FakeCluster::default()
        }
    }

    #[tokio::test]
    async fn test_all_keys_sorted() {
        let (_, session) = open(three_nodes()).await;
        let report = run_monitor(
            session.as_ref(),
            &MonitorRequest {
                scope: MonitorScope::Cluster,
                categories: Categories::ALL,
            },
        )
        .await
        .unwrap();

        let keys: Vec<&str> = report.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["host1:1025:2", "host2:1025:2", "host3:1025:2"]);
        assert_eq!(report["host3:1025:2"]["io"]["queue"], 3);

        let rendered = crate::output::render_json(&report).unwrap();
        let h1 = rendered.find("host1").unwrap();
        let h3 = rendered.find("host3").unwrap();
        assert!(h1 < h3);
    }

    #[tokio::test]
    async fn test_one_has_single_key() {
        let (connector, session) = open(three_nodes()).await;
        let report = run_monitor(
            session.as_ref(),
            &MonitorRequest {
                scope: MonitorScope::Node(addr("host1:1025:2")),
                categories: Categories(4),
            },
        )
        .await
        .unwrap();

        assert_eq!(report.len(), 1);
        assert!(report.contains_key("host1:1025:2"));
        assert!(connector.calls()[1].ends_with("0x4"));
    }

    #[tokio::test]
    async fn test_categories_default_to_all() {
        let (connector, session) = open(three_nodes()).await;
        let request = MonitorRequest {
            scope: MonitorScope::Node(addr("host2:1025:2")),
            categories: Categories::default(),
        };
        run_monitor(session.as_ref(), &request).await.unwrap();
        assert!(connector.calls()[1].ends_with(" all"));
    }

    #[tokio::test]
    async fn test_no_responding_nodes_is_empty_object() {
        let (_, session) = open(FakeCluster::default()).await;
        let report = run_monitor(
            session.as_ref(),
            &MonitorRequest {
                scope: MonitorScope::Cluster,
                categories: Categories::ALL,
            },
        )
        .await
        .unwrap();
        assert!(report.is_empty());
    }
}
