//! Per-connection handler
//!
//! Reads the header of a freshly accepted connection, then either parks it
//! in the registry (agents) or pairs it with a parked agent and relays
//! (clients).

use std::sync::Arc;
use std::time::Duration;

use tokio::io::{AsyncRead, AsyncWrite};

use rv_core::{relay, Peer, RvError};
use rv_protocol::reply::{AGENT_OFFLINE, ALREADY_REGISTERED};
use rv_protocol::{Header, NodeId, ProtocolError, Reply, Role};

use crate::registry::Registry;

/// What a successfully handled connection turned into
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Agent is parked in the registry
    Registered { node_id: NodeId, pending: usize },
    /// Client was paired and the relay has finished
    Relayed {
        node_id: NodeId,
        to_agent: u64,
        to_client: u64,
    },
}

/// Handles connections for one broker
pub struct ConnectionHandler<S> {
    /// Shared agent registry
    registry: Arc<Registry<Peer<S>>>,
    /// Deadline for receiving the header line
    header_timeout: Duration,
}

impl<S> Clone for ConnectionHandler<S> {
    fn clone(&self) -> Self {
        Self {
            registry: Arc::clone(&self.registry),
            header_timeout: self.header_timeout,
        }
    }
}

impl<S> ConnectionHandler<S>
where
    S: AsyncRead + AsyncWrite + Unpin + Send + 'static,
{
    /// Create a handler backed by `registry`
    pub fn new(registry: Arc<Registry<Peer<S>>>, header_timeout: Duration) -> Self {
        Self {
            registry,
            header_timeout,
        }
    }

    /// Registry this handler parks agents in
    pub fn registry(&self) -> &Arc<Registry<Peer<S>>> {
        &self.registry
    }

    /// Handle one connection from header to completion.
    ///
    /// Rejections have already been reported to the peer when this returns
    /// an error.
    pub async fn handle(&self, mut peer: Peer<S>) -> Result<Outcome, RvError> {
        let header = match self.read_header(&mut peer).await {
            Ok(header) => header,
            Err(e) => {
                if let Some(reason) = e.reply_reason() {
                    reject(&mut peer, reason).await;
                }
                return Err(e.into());
            }
        };

        match header.role {
            Role::Agent => self.register(header.node_id, peer).await,
            Role::Client => self.connect(header.node_id, peer).await,
        }
    }

    async fn read_header(&self, peer: &mut Peer<S>) -> Result<Header, ProtocolError> {
        let line = tokio::time::timeout(self.header_timeout, peer.read_line())
            .await
            .map_err(|_| ProtocolError::HeaderTimeout)??;
        Header::parse(&line)
    }

    /// Park an agent under `node_id`, keeping any existing registration
    async fn register(&self, node_id: NodeId, mut peer: Peer<S>) -> Result<Outcome, RvError> {
        let Some(reservation) = self.registry.reserve(&node_id) else {
            tracing::warn!("Agent collision for node {}", node_id);
            reject(&mut peer, ALREADY_REGISTERED).await;
            return Err(RvError::RegistrationConflict(node_id));
        };

        // Dropping the reservation on failure frees the id again
        peer.send_line(&Reply::Ok.encode()).await?;
        let pending = reservation.fill(peer);

        tracing::info!("Agent registered: {} (pending: {})", node_id, pending);
        Ok(Outcome::Registered { node_id, pending })
    }

    /// Pair a client with the agent parked under `node_id` and relay
    async fn connect(&self, node_id: NodeId, mut client: Peer<S>) -> Result<Outcome, RvError> {
        let Some(agent) = self.registry.claim(&node_id) else {
            tracing::info!("Client asked for offline node {}", node_id);
            reject(&mut client, AGENT_OFFLINE).await;
            return Err(RvError::PeerUnavailable(node_id));
        };

        tracing::info!("Pairing client with {}", node_id);
        client.send_line(&Reply::Ok.encode()).await?;

        let stats = relay(agent, client).await;
        if !stats.is_clean() {
            tracing::debug!("Session {} ended with errors: {:?}", node_id, stats);
        }
        tracing::info!("Connection closed: {}", node_id);

        Ok(Outcome::Relayed {
            node_id,
            to_client: stats.a_to_b.bytes,
            to_agent: stats.b_to_a.bytes,
        })
    }
}

/// Send `ERROR: <reason>`; the caller drops the peer afterwards
async fn reject<S>(peer: &mut Peer<S>, reason: &str)
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    if let Err(e) = peer.send_line(&Reply::error(reason).encode()).await {
        tracing::debug!("Failed to send rejection ({}): {}", reason, e);
    }
}
