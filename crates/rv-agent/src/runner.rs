//! Agent reconnect loop
//!
//! Cycles through dial, register, ack, local dial and relay forever, with a
//! fixed delay after every attempt whether it failed or relayed a client.
//! The only way out is the cancellation token.

use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

use rv_core::{Dialer, RvError};

use crate::state::AgentState;
use crate::tunnel::{FixedBackoff, TunnelConnector};

/// Long-running agent keeping one registration open at the broker
pub struct Agent<D> {
    connector: TunnelConnector<D>,
    backoff: FixedBackoff,
    state: watch::Sender<AgentState>,
}

impl<D: Dialer> Agent<D> {
    /// Create a new agent
    pub fn new(connector: TunnelConnector<D>, backoff: FixedBackoff) -> Self {
        let (state, _) = watch::channel(AgentState::Dialing);
        Self {
            connector,
            backoff,
            state,
        }
    }

    /// Watch the agent's current stage
    pub fn subscribe(&self) -> watch::Receiver<AgentState> {
        self.state.subscribe()
    }

    /// Run until `cancel` is cancelled.
    ///
    /// Cancellation is honoured between attempts, while connecting, while
    /// relaying and during the backoff sleep. Attempt failures are logged and
    /// retried, never returned.
    pub async fn run(&self, cancel: CancellationToken) -> Result<(), RvError> {
        let node_id = self.connector.node_id();
        tracing::info!(
            "Agent {} connecting to broker at {}",
            node_id,
            self.connector.server()
        );

        while !cancel.is_cancelled() {
            let attempt = tokio::select! {
                _ = cancel.cancelled() => break,
                attempt = self.connector.connect(&self.state) => attempt,
            };

            match attempt {
                Ok(tunnel) => {
                    self.state.send_replace(AgentState::Relaying);
                    tracing::info!("Registered as {}, piping traffic", node_id);
                    let stats = tunnel.relay(cancel.clone()).await;
                    tracing::info!(
                        "Client disconnected ({} bytes in, {} bytes out)",
                        stats.a_to_b.bytes,
                        stats.b_to_a.bytes
                    );
                }
                Err(e) => {
                    tracing::warn!("Agent error while {}: {}", e.stage, e.source);
                }
            }

            self.state.send_replace(AgentState::BackoffSleep);
            tracing::info!(
                "Reconnecting to broker in {:?}...",
                self.backoff.delay()
            );
            if !self.backoff.sleep(&cancel).await {
                break;
            }
        }

        tracing::info!("Agent {} stopped", node_id);
        Ok(())
    }
}
