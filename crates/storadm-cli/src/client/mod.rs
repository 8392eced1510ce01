//! TCP client for storage nodes
//!
//! Nodes speak newline-delimited JSON: one [`NodeRequest`] per line, answered
//! by exactly one [`NodeResponse`]. [`TcpConnector`] is the production
//! [`Connector`](storadm_core::Connector) used by the binary.
//!
//! [`NodeRequest`]: storadm_protocol::NodeRequest
//! [`NodeResponse`]: storadm_protocol::NodeResponse

mod connection;
mod session;

pub use connection::NodeConnection;
pub use session::{NodeSession, TcpConnector};
