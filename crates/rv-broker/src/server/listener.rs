//! Broker listener
//!
//! Accepts incoming connections and spawns a handler task for each one.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::net::{TcpListener, TcpStream};
use tokio_util::sync::CancellationToken;

use rv_core::config::BrokerConfig;
use rv_core::{Peer, RvError};

use crate::registry::Registry;
use crate::server::handler::{ConnectionHandler, Outcome};

/// Registry type used by a TCP broker
pub type AgentRegistry = Registry<Peer<TcpStream>>;

/// Rendezvous broker accepting agents and clients on one TCP port
pub struct Broker {
    /// Broker configuration
    config: BrokerConfig,
    /// Connection handler shared by all accepted connections
    handler: ConnectionHandler<TcpStream>,
    /// Cancellation token for graceful shutdown
    cancel: CancellationToken,
}

impl Broker {
    /// Create a broker with an empty registry
    pub fn new(config: BrokerConfig, cancel: CancellationToken) -> Self {
        let handler = ConnectionHandler::new(Arc::new(Registry::new()), config.header_timeout);
        Self {
            config,
            handler,
            cancel,
        }
    }

    /// Registry of pending agents
    pub fn registry(&self) -> &Arc<AgentRegistry> {
        self.handler.registry()
    }

    /// Bind the configured address and serve until cancelled
    pub async fn run(&self) -> Result<()> {
        let listener = TcpListener::bind(&self.config.bind_address)
            .await
            .with_context(|| format!("Failed to bind to {}", self.config.bind_address))?;
        self.serve(listener).await
    }

    /// Serve on an already bound listener until cancelled.
    ///
    /// Sessions that are already relaying keep running after this returns.
    pub async fn serve(&self, listener: TcpListener) -> Result<()> {
        let local_addr = listener.local_addr()?;
        tracing::info!("Broker listening on {}", local_addr);

        loop {
            tokio::select! {
                _ = self.cancel.cancelled() => {
                    tracing::info!("Broker shutting down");
                    break;
                }

                result = listener.accept() => {
                    match result {
                        Ok((socket, peer_addr)) => self.handle_connection(socket, peer_addr),
                        Err(e) => {
                            tracing::error!("Failed to accept connection: {}", e);
                        }
                    }
                }
            }
        }

        Ok(())
    }

    /// Spawn a task to handle one accepted connection
    fn handle_connection(&self, socket: TcpStream, peer_addr: SocketAddr) {
        tracing::debug!("New connection from {}", peer_addr);

        if let Err(e) = socket.set_nodelay(true) {
            tracing::trace!("Failed to set TCP_NODELAY for {}: {}", peer_addr, e);
        }

        let handler = self.handler.clone();
        tokio::spawn(async move {
            match handler.handle(Peer::tcp(socket)).await {
                Ok(Outcome::Registered { .. }) => {}
                Ok(Outcome::Relayed {
                    node_id,
                    to_agent,
                    to_client,
                }) => {
                    tracing::debug!(
                        "Session {} from {} done ({} bytes to agent, {} bytes to client)",
                        node_id,
                        peer_addr,
                        to_agent,
                        to_client
                    );
                }
                Err(RvError::Protocol(e)) => {
                    tracing::warn!("Rejected connection from {}: {}", peer_addr, e);
                }
                Err(e @ (RvError::RegistrationConflict(_) | RvError::PeerUnavailable(_))) => {
                    tracing::debug!("Connection from {} refused: {}", peer_addr, e);
                }
                Err(e) => {
                    tracing::warn!("Connection from {} failed: {}", peer_addr, e);
                }
            }
        });
    }
}
