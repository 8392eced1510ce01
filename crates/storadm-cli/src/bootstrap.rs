//! Session bootstrap shared by every command
//!
//! Second phase of configuration: opens the session described by a
//! [`ConnectionConfig`] and fixes its working group set, querying the routing
//! table when no groups were given.

use storadm_core::{ClusterError, ClusterSession, ConnectionConfig, Connector};

/// Open a session and settle its groups
pub async fn open_session(
    config: &ConnectionConfig,
    connector: &dyn Connector,
) -> Result<Box<dyn ClusterSession>, ClusterError> {
    let options = config.session_options();
    tracing::debug!(
        remotes = ?options.remotes,
        wait_timeout = ?options.wait_timeout,
        check_timeout = ?options.check_timeout,
        skip_route_discovery = options.skip_route_discovery,
        "Opening cluster session"
    );

    let mut session = connector.open(&options).await?;

    if config.groups().is_empty() {
        let groups = session.resolve_groups().await?;
        tracing::info!(?groups, "Using groups from routing table");
    } else {
        session.set_groups(config.groups().iter().copied().collect());
    }

    Ok(session)
}
