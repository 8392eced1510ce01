//! A single request/response connection to one node

use std::time::Duration;

use futures::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_util::codec::Framed;

use storadm_core::error::errno;
use storadm_core::{Address, ClusterError};
use storadm_protocol::{JsonLinesCodec, NodeRequest, NodeResponse};

type NodeFramed = Framed<TcpStream, JsonLinesCodec<NodeResponse, NodeRequest>>;

/// Connection to a storage node
///
/// Requests are strictly sequential: each one waits for its response before
/// the next is written.
pub struct NodeConnection {
    address: Address,
    framed: NodeFramed,
}

impl NodeConnection {
    /// Connect to a node, giving up after `timeout`
    pub async fn connect(address: &Address, timeout: Duration) -> Result<Self, ClusterError> {
        tracing::debug!(%address, "Connecting to node");

        let stream = match tokio::time::timeout(timeout, TcpStream::connect(address.socket_target()))
            .await
        {
            Ok(Ok(stream)) => stream,
            Ok(Err(e)) => return Err(ClusterError::io(format!("connect to {}", address), &e)),
            Err(_) => return Err(ClusterError::timeout(format!("connect to {}", address))),
        };
        stream
            .set_nodelay(true)
            .map_err(|e| ClusterError::io(format!("configure socket for {}", address), &e))?;

        tracing::debug!(%address, "Connected to node");
        Ok(Self {
            address: address.clone(),
            framed: Framed::new(stream, JsonLinesCodec::new()),
        })
    }

    /// Send one request and wait for its response
    ///
    /// An `error` response from the node becomes a [`ClusterError`] carrying
    /// the node's code and message.
    pub async fn request(
        &mut self,
        request: NodeRequest,
        timeout: Duration,
    ) -> Result<NodeResponse, ClusterError> {
        let address = self.address.clone();
        tokio::time::timeout(timeout, self.exchange(request))
            .await
            .map_err(|_| ClusterError::timeout(format!("request to {}", address)))?
    }

    async fn exchange(&mut self, request: NodeRequest) -> Result<NodeResponse, ClusterError> {
        tracing::debug!(address = %self.address, ?request, "Sending request");
        self.framed.send(request).await?;

        match self.framed.next().await {
            Some(Ok(NodeResponse::Error { code, message })) => {
                tracing::debug!(address = %self.address, code, %message, "Node returned error");
                Err(ClusterError::new(code, message))
            }
            Some(Ok(response)) => {
                tracing::trace!(address = %self.address, ?response, "Received response");
                Ok(response)
            }
            Some(Err(e)) => Err(e.into()),
            None => Err(ClusterError::new(
                errno::EIO,
                format!("{}: connection closed by node", self.address),
            )),
        }
    }
}

impl std::fmt::Debug for NodeConnection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NodeConnection")
            .field("address", &self.address)
            .finish_non_exhaustive()
    }
}
