//! Backend command implementation

use storadm_core::{
    Address, BackendCommand, BackendTarget, ClusterError, ClusterSession, ConnectionConfig,
    UsageError,
};

use crate::cli::BackendArgs;
use crate::output::BackendsReport;

/// What to do with the node's backends
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendOperation {
    /// Change one backend
    Control {
        backend_id: u32,
        command: BackendCommand,
    },
    /// List every backend
    Status,
}

/// A validated backend action against one node
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendRequest {
    pub address: Address,
    pub operation: BackendOperation,
}

impl BackendRequest {
    /// Check that state-changing actions carry a backend id
    pub fn from_args(args: &BackendArgs, config: &ConnectionConfig) -> Result<Self, UsageError> {
        let operation = match (args.action.command(), args.backend) {
            (None, _) => BackendOperation::Status,
            (Some(command), Some(backend_id)) => BackendOperation::Control {
                backend_id,
                command,
            },
            (Some(_), None) => return Err(UsageError::MissingBackendId(args.action.name())),
        };

        Ok(Self {
            address: config.primary_remote().clone(),
            operation,
        })
    }
}

/// Execute a backend action
///
/// Every action answers with the node's full backend list, in the order the
/// node reports it.
pub async fn run_backend(
    session: &dyn ClusterSession,
    request: &BackendRequest,
) -> Result<BackendsReport, ClusterError> {
    let backends = match request.operation {
        BackendOperation::Control {
            backend_id,
            command,
        } => {
            let target = BackendTarget::new(request.address.clone(), backend_id);
            tracing::info!(%target, %command, "Sending backend command");
            session.backend_control(&target, command).await?
        }
        BackendOperation::Status => {
            tracing::info!(address = %request.address, "Requesting backend status");
            session.backend_status(&request.address).await?
        }
    };

    tracing::debug!(count = backends.len(), "Backend list received");
    Ok(BackendsReport { backends })
}
