//! Outbound tunnel connector
//!
//! One attempt of the agent cycle: dial the broker, register, wait for the
//! ack, then dial the local service.

use thiserror::Error;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

use rv_core::{relay_until, Dialer, Peer, RelayStats, RvError};
use rv_protocol::{Header, NodeId, Reply, Role};

use crate::state::AgentState;

/// Failure of one attempt, tagged with the stage it happened in
#[derive(Debug, Error)]
#[error("{stage}: {source}")]
pub struct AttemptError {
    /// Stage the attempt failed in
    pub stage: AgentState,
    /// Underlying error
    #[source]
    pub source: RvError,
}

impl AttemptError {
    fn at(stage: AgentState) -> impl FnOnce(RvError) -> Self {
        move |source| Self { stage, source }
    }
}

/// Dials the broker and the local service for one registration
pub struct TunnelConnector<D> {
    /// Dialer used for both connections
    dialer: D,
    /// Broker address
    server: String,
    /// Node id to register as
    node_id: NodeId,
    /// Local service address
    local_address: String,
}

impl<D: Dialer> TunnelConnector<D> {
    /// Create a new tunnel connector
    pub fn new(
        dialer: D,
        server: impl Into<String>,
        node_id: NodeId,
        local_address: impl Into<String>,
    ) -> Self {
        Self {
            dialer,
            server: server.into(),
            node_id,
            local_address: local_address.into(),
        }
    }

    /// Broker address
    pub fn server(&self) -> &str {
        &self.server
    }

    /// Node id registered by this connector
    pub fn node_id(&self) -> &NodeId {
        &self.node_id
    }

    /// Register at the broker and connect the local service.
    ///
    /// `state` is updated as each stage begins.
    pub async fn connect(
        &self,
        state: &watch::Sender<AgentState>,
    ) -> Result<ActiveTunnel<D::Stream>, AttemptError> {
        state.send_replace(AgentState::Dialing);
        let mut broker = self
            .dialer
            .dial(&self.server)
            .await
            .map_err(AttemptError::at(AgentState::Dialing))?;

        state.send_replace(AgentState::Registering);
        let header = Header::new(Role::Agent, self.node_id.clone());
        broker
            .send_line(&header.encode())
            .await
            .map_err(|e| AttemptError::at(AgentState::Registering)(e.into()))?;

        state.send_replace(AgentState::AwaitAck);
        let line = broker
            .read_line()
            .await
            .map_err(|e| AttemptError::at(AgentState::AwaitAck)(e.into()))?;
        match Reply::parse(&line) {
            Reply::Ok => {}
            Reply::Error(reason) | Reply::Unexpected(reason) => {
                return Err(AttemptError::at(AgentState::AwaitAck)(RvError::Rejected(
                    reason,
                )));
            }
        }

        state.send_replace(AgentState::DialLocal);
        let local = self
            .dialer
            .dial(&self.local_address)
            .await
            .map_err(AttemptError::at(AgentState::DialLocal))?;

        Ok(ActiveTunnel { broker, local })
    }
}

/// A registered broker connection paired with a local service connection
pub struct ActiveTunnel<S> {
    /// Broker side, with anything read past the ack still buffered
    broker: Peer<S>,
    /// Local service side
    local: Peer<S>,
}

impl<S> ActiveTunnel<S>
where
    S: tokio::io::AsyncRead + tokio::io::AsyncWrite + Unpin + Send + 'static,
{
    /// Relay until both sides are done or `stop` is cancelled
    pub async fn relay(self, stop: CancellationToken) -> RelayStats {
        relay_until(self.broker, self.local, stop).await
    }
}
