//! CLI command implementations
//!
//! [`prepare`] turns parsed arguments into an [`Invocation`] without any
//! network traffic; every usage error surfaces there. [`execute`] opens the
//! session and runs the one action.

mod backend;
mod monitor;

pub use backend::{run_backend, BackendOperation, BackendRequest};
pub use monitor::{run_monitor, MonitorRequest};

use storadm_core::{ClusterError, ConnectionConfig, Connector, UsageError};

use crate::bootstrap::open_session;
use crate::cli::Commands;
use crate::output::CommandOutput;

/// A fully validated command, ready to run
#[derive(Debug, Clone, PartialEq)]
pub struct Invocation {
    pub config: ConnectionConfig,
    pub request: Request,
}

/// The action an invocation performs
#[derive(Debug, Clone, PartialEq)]
pub enum Request {
    Backend(BackendRequest),
    Monitor(MonitorRequest),
}

/// Validate parsed arguments and build the invocation
pub fn prepare(command: &Commands) -> Result<Invocation, UsageError> {
    match command {
        Commands::Backend(args) => {
            let defaults = args.connection.defaults()?;
            let config = args.connection.to_config(&defaults, true)?;
            let request = BackendRequest::from_args(args, &config)?;
            Ok(Invocation {
                config,
                request: Request::Backend(request),
            })
        }
        Commands::Monitor(args) => {
            let defaults = args.connection.defaults()?;
            let config = args.connection.to_config(&defaults, true)?;
            let request = MonitorRequest::from_args(args, &config);
            Ok(Invocation {
                config,
                request: Request::Monitor(request),
            })
        }
    }
}

/// Open a session and run the invocation's action
pub async fn execute(
    invocation: &Invocation,
    connector: &dyn Connector,
) -> Result<CommandOutput, ClusterError> {
    let session = open_session(&invocation.config, connector).await?;

    match &invocation.request {
        Request::Backend(request) => run_backend(session.as_ref(), request)
            .await
            .map(CommandOutput::Backends),
        Request::Monitor(request) => run_monitor(session.as_ref(), request)
            .await
            .map(CommandOutput::Stats),
    }
}
